use serde::{Deserialize, Serialize};

/// Actor information decoded from the bearer token and carried through
/// request extensions into every service call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    id: i32,
    nombre: String,
    id_rol: i32,
    id_bitacora: i64,
}

impl AuthenticatedUser {
    /// Creates an actor context from authentication data.
    #[must_use]
    pub fn new(id: i32, nombre: impl Into<String>, id_rol: i32, id_bitacora: i64) -> Self {
        Self {
            id,
            nombre: nombre.into(),
            id_rol,
            id_bitacora,
        }
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the username.
    #[must_use]
    pub fn nombre(&self) -> &str {
        self.nombre.as_str()
    }

    /// Returns the role the user held when the token was minted.
    #[must_use]
    pub fn id_rol(&self) -> i32 {
        self.id_rol
    }

    /// Returns the audit-session correlation id opened at login.
    #[must_use]
    pub fn id_bitacora(&self) -> i64 {
        self.id_bitacora
    }
}
