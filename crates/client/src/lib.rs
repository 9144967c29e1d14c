//! Headless client for the bakery back-office API.
//!
//! Holds the pieces a frontend needs besides rendering: the login
//! [`Session`], the HTTP [`ApiClient`], and the [`DataPanel`] state
//! machine that drives each entity's CRUD screen.

#![forbid(unsafe_code)]

mod api;
mod panel;
mod session;

pub use api::{ApiClient, ClientError, ClientResult};
pub use panel::{DataPanel, PanelState};
pub use session::Session;
