use panaderia_domain::Usuario;
use serde::{Deserialize, Serialize};

/// Confirmation payload returned by mutations.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// Wraps a confirmation message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Login credentials.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub nombre: String,
    pub contrasena: String,
}

/// Successful login: the bearer token plus the authenticated account.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub usuario: Usuario,
}

/// Self-service password change.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub contrasena_actual: String,
    pub contrasena_nueva: String,
}
