use std::sync::Arc;

use panaderia_core::{AppError, AppResult, AuthenticatedUser};
use panaderia_domain::{Metodo, Usuario};

use crate::{AuditEvent, PasswordHasher, SessionStore, UserStore};

/// Result of a successful login: the account plus the audit session opened
/// for it. The composition root mints the bearer token from this.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Authenticated account, without the credential hash.
    pub usuario: Usuario,
    /// Audit-session correlation id for the token.
    pub id_bitacora: i64,
}

/// Login, logout, profile, and password-change flows.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthService {
    /// Creates the service from its persistence and hashing ports.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            users,
            hasher,
            sessions,
        }
    }

    /// Verifies credentials and opens an audit session. The error never
    /// reveals whether the username exists.
    pub async fn login(&self, nombre: &str, contrasena: &str, ip: &str) -> AppResult<LoginOutcome> {
        let record = self
            .users
            .find_by_nombre(nombre)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !self
            .hasher
            .verify_password(contrasena, &record.contrasena_hash)?
        {
            return Err(invalid_credentials());
        }

        let id_bitacora = self.sessions.open(record.id, ip).await?;

        Ok(LoginOutcome {
            usuario: Usuario {
                id: record.id,
                nombre: record.nombre,
                id_rol: record.id_rol,
            },
            id_bitacora,
        })
    }

    /// Closes the actor's audit session.
    pub async fn logout(&self, actor: &AuthenticatedUser) -> AppResult<()> {
        self.sessions.close(actor.id_bitacora()).await
    }

    /// Returns the actor's own profile.
    pub async fn profile(&self, actor: &AuthenticatedUser) -> AppResult<Usuario> {
        let record = self
            .users
            .find_by_id(actor.id())
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_owned()))?;

        Ok(Usuario {
            id: record.id,
            nombre: record.nombre,
            id_rol: record.id_rol,
        })
    }

    /// Replaces the actor's own password after verifying the current one.
    pub async fn change_password(
        &self,
        actor: &AuthenticatedUser,
        actual: &str,
        nueva: &str,
    ) -> AppResult<()> {
        let record = self
            .users
            .find_by_id(actor.id())
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_owned()))?;

        if !self
            .hasher
            .verify_password(actual, &record.contrasena_hash)?
        {
            return Err(AppError::Unauthorized(
                "La contraseña actual es incorrecta".to_owned(),
            ));
        }

        let hash = self.hasher.hash_password(nueva)?;
        let audit = AuditEvent::new(
            actor,
            Metodo::Put,
            "api/cambiar_contrasena",
            format!("Usuario '{}' cambió su contraseña", actor.nombre()),
        );

        self.users.update_password(record.id, &hash, audit).await
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Credenciales inválidas".to_owned())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use panaderia_core::{AppError, AppResult, AuthenticatedUser};
    use panaderia_domain::{Bitacora, DetalleBitacora, Usuario};
    use tokio::sync::Mutex;

    use super::AuthService;
    use crate::{AuditEvent, PasswordHasher, SessionStore, UserRecord, UserStore};

    /// Reversal "hasher" good enough to tell passwords apart in tests.
    struct FakeHasher;

    impl PasswordHasher for FakeHasher {
        fn hash_password(&self, password: &str) -> AppResult<String> {
            Ok(password.chars().rev().collect())
        }

        fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
            Ok(self.hash_password(password)? == hash)
        }
    }

    struct FakeUserStore {
        records: Mutex<Vec<UserRecord>>,
    }

    #[async_trait]
    impl UserStore for FakeUserStore {
        async fn find_by_nombre(&self, nombre: &str) -> AppResult<Option<UserRecord>> {
            Ok(self
                .records
                .lock()
                .await
                .iter()
                .find(|record| record.nombre == nombre)
                .cloned())
        }

        async fn find_by_id(&self, id: i32) -> AppResult<Option<UserRecord>> {
            Ok(self
                .records
                .lock()
                .await
                .iter()
                .find(|record| record.id == id)
                .cloned())
        }

        async fn insert(
            &self,
            _nombre: &str,
            _contrasena_hash: &str,
            _id_rol: i32,
            _audit: AuditEvent,
        ) -> AppResult<Usuario> {
            Err(AppError::Internal("not used in this test".to_owned()))
        }

        async fn list(&self) -> AppResult<Vec<Usuario>> {
            Ok(Vec::new())
        }

        async fn update(
            &self,
            _nombre: &str,
            _id_rol: i32,
            _contrasena_hash: Option<&str>,
            _audit: AuditEvent,
        ) -> AppResult<Usuario> {
            Err(AppError::Internal("not used in this test".to_owned()))
        }

        async fn update_password(
            &self,
            id: i32,
            contrasena_hash: &str,
            _audit: AuditEvent,
        ) -> AppResult<()> {
            let mut records = self.records.lock().await;
            if let Some(record) = records.iter_mut().find(|record| record.id == id) {
                record.contrasena_hash = contrasena_hash.to_owned();
            }
            Ok(())
        }

        async fn delete(&self, _nombre: &str, _audit: AuditEvent) -> AppResult<Usuario> {
            Err(AppError::Internal("not used in this test".to_owned()))
        }
    }

    #[derive(Default)]
    struct FakeSessionStore {
        opened: Mutex<Vec<(i32, String)>>,
        closed: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl SessionStore for FakeSessionStore {
        async fn open(&self, id_usuario: i32, ip: &str) -> AppResult<i64> {
            let mut opened = self.opened.lock().await;
            opened.push((id_usuario, ip.to_owned()));
            Ok(opened.len() as i64)
        }

        async fn close(&self, id: i64) -> AppResult<()> {
            self.closed.lock().await.push(id);
            Ok(())
        }

        async fn list(&self) -> AppResult<Vec<Bitacora>> {
            Ok(Vec::new())
        }

        async fn find(&self, _id: i64) -> AppResult<Option<Bitacora>> {
            Ok(None)
        }

        async fn list_events(&self, _id_bitacora: i64) -> AppResult<Vec<DetalleBitacora>> {
            Ok(Vec::new())
        }
    }

    fn service() -> (AuthService, Arc<FakeSessionStore>) {
        let hasher = FakeHasher;
        let records = vec![UserRecord {
            id: 1,
            nombre: "ana".to_owned(),
            contrasena_hash: hasher.hash_password("secreta").unwrap_or_default(),
            id_rol: 1,
        }];
        let sessions = Arc::new(FakeSessionStore::default());
        let service = AuthService::new(
            Arc::new(FakeUserStore {
                records: Mutex::new(records),
            }),
            Arc::new(hasher),
            sessions.clone(),
        );
        (service, sessions)
    }

    #[tokio::test]
    async fn login_opens_a_session_for_valid_credentials() -> AppResult<()> {
        let (service, sessions) = service();

        let outcome = service.login("ana", "secreta", "10.0.0.1").await?;
        assert_eq!(outcome.usuario.nombre, "ana");
        assert_eq!(outcome.id_bitacora, 1);
        assert_eq!(
            sessions.opened.lock().await.as_slice(),
            &[(1, "10.0.0.1".to_owned())]
        );
        Ok(())
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_user_alike() {
        let (service, sessions) = service();

        let wrong = service.login("ana", "otra", "10.0.0.1").await;
        let unknown = service.login("nadie", "secreta", "10.0.0.1").await;

        for result in [wrong, unknown] {
            match result {
                Err(AppError::Unauthorized(message)) => {
                    assert_eq!(message, "Credenciales inválidas");
                }
                other => panic!("expected unauthorized, got {other:?}"),
            }
        }
        assert!(sessions.opened.lock().await.is_empty());
    }

    #[tokio::test]
    async fn logout_closes_the_actor_session() -> AppResult<()> {
        let (service, sessions) = service();
        let actor = AuthenticatedUser::new(1, "ana", 1, 42);

        service.logout(&actor).await?;
        assert_eq!(sessions.closed.lock().await.as_slice(), &[42]);
        Ok(())
    }

    #[tokio::test]
    async fn change_password_requires_the_current_one() -> AppResult<()> {
        let (service, _sessions) = service();
        let actor = AuthenticatedUser::new(1, "ana", 1, 42);

        let rejected = service.change_password(&actor, "equivocada", "nueva").await;
        assert!(matches!(rejected, Err(AppError::Unauthorized(_))));

        service.change_password(&actor, "secreta", "nueva").await?;
        let relogin = service.login("ana", "nueva", "10.0.0.1").await;
        assert!(relogin.is_ok());
        Ok(())
    }
}
