//! Application services and ports for the bakery back-office.
//!
//! Services own the permission-gated CRUD pipeline: every operation checks
//! the actor's role permissions first, then performs a conditional write
//! whose audit event is persisted atomically with the mutation.

#![forbid(unsafe_code)]

mod audit_service;
mod auth_service;
mod authorization_service;
mod entity_service;
mod ports;
mod security_service;
mod user_service;

pub use audit_service::AuditService;
pub use auth_service::{AuthService, LoginOutcome};
pub use authorization_service::AuthorizationService;
pub use entity_service::EntityService;
pub use ports::{
    AuditEvent, AuditStore, AuthorizationStore, EntityStore, PasswordHasher, SecurityStore,
    SessionStore, UserRecord, UserStore,
};
pub use security_service::SecurityService;
pub use user_service::{UserService, UsuarioDraft, UsuarioPatch};
