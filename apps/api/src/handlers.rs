//! HTTP handlers, grouped by business area.

pub mod auditoria;
pub mod auth;
pub mod entities;
pub mod health;
pub mod seguridad;
