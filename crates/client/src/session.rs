//! Login session state.
//!
//! The session is an explicit object handed to [`crate::ApiClient`] at
//! construction instead of living in a global. Login fills it, logout
//! empties it, and cloning shares the same state.

use std::sync::{Arc, RwLock};

use panaderia_domain::Usuario;

#[derive(Debug, Clone)]
struct Credentials {
    token: String,
    usuario: Usuario,
}

/// Shared token + profile of the signed-in user.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<Option<Credentials>>>,
}

impl Session {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the credentials returned by a successful login.
    pub fn begin(&self, token: String, usuario: Usuario) {
        *self.write() = Some(Credentials { token, usuario });
    }

    /// Forgets the credentials. Idempotent.
    pub fn clear(&self) {
        *self.write() = None;
    }

    /// Returns the bearer token, if signed in.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|c| c.token.clone())
    }

    /// Returns the signed-in user's profile.
    #[must_use]
    pub fn usuario(&self) -> Option<Usuario> {
        self.read().as_ref().map(|c| c.usuario.clone())
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.read().is_some()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Credentials>> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Credentials>> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use panaderia_domain::Usuario;

    use super::Session;

    fn usuario() -> Usuario {
        Usuario {
            id: 1,
            nombre: "ana".to_owned(),
            id_rol: 1,
        }
    }

    #[test]
    fn login_then_logout_lifecycle() {
        let session = Session::new();
        assert!(!session.is_active());
        assert_eq!(session.token(), None);

        session.begin("tok-123".to_owned(), usuario());
        assert!(session.is_active());
        assert_eq!(session.token().as_deref(), Some("tok-123"));
        assert_eq!(session.usuario().map(|u| u.nombre), Some("ana".to_owned()));

        session.clear();
        assert!(!session.is_active());
        assert_eq!(session.usuario(), None);
    }

    #[test]
    fn clones_share_the_same_state() {
        let session = Session::new();
        let shared = session.clone();

        session.begin("tok-456".to_owned(), usuario());
        assert_eq!(shared.token().as_deref(), Some("tok-456"));

        shared.clear();
        assert!(!session.is_active());
    }
}
