use std::sync::Arc;

use panaderia_core::{AppError, AppResult, AuthenticatedUser};
use panaderia_domain::{Accion, Metodo, Usuario};
use serde::{Deserialize, Serialize};

use crate::{AuditEvent, AuditStore, AuthorizationService, PasswordHasher, UserStore};

/// Payload to create a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsuarioDraft {
    /// Username; unique across live rows.
    pub nombre: String,
    /// Plaintext password, hashed before it reaches the store.
    pub contrasena: String,
    /// Assigned role; must exist.
    pub id_rol: i32,
}

/// Mutable account fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsuarioPatch {
    /// Assigned role; must exist.
    pub id_rol: i32,
    /// Optional password replacement.
    pub contrasena: Option<String>,
}

/// User account management. Follows the same permission-gated pipeline as
/// the generic entity controller, with password hashing layered on top.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    authorization: AuthorizationService,
    audit: Arc<dyn AuditStore>,
}

impl UserService {
    /// Creates the service from its ports.
    #[must_use]
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        authorization: AuthorizationService,
        audit: Arc<dyn AuditStore>,
    ) -> Self {
        Self {
            store,
            hasher,
            authorization,
            audit,
        }
    }

    /// Creates an account. `Conflict` when the username is taken.
    pub async fn create(&self, actor: &AuthenticatedUser, draft: UsuarioDraft) -> AppResult<Usuario> {
        self.authorization
            .require(actor, Accion::Crear, "USUARIO")
            .await?;

        let hash = self.hasher.hash_password(&draft.contrasena)?;
        let audit = AuditEvent::new(
            actor,
            Metodo::Post,
            "api/usuario",
            format!("Usuario '{}' creado", draft.nombre),
        );

        self.store
            .insert(&draft.nombre, &hash, draft.id_rol, audit)
            .await
    }

    /// Returns all accounts ordered by username.
    pub async fn list(&self, actor: &AuthenticatedUser) -> AppResult<Vec<Usuario>> {
        self.authorization
            .require(actor, Accion::Ver, "USUARIO")
            .await?;

        let rows = self.store.list().await?;

        self.audit
            .append(AuditEvent::new(
                actor,
                Metodo::Get,
                "api/usuario",
                "Consulta de todos los usuarios",
            ))
            .await?;

        Ok(rows)
    }

    /// Returns one account by username.
    pub async fn get(&self, actor: &AuthenticatedUser, nombre: &str) -> AppResult<Usuario> {
        self.authorization
            .require(actor, Accion::Ver, "USUARIO")
            .await?;

        let record = self
            .store
            .find_by_nombre(nombre)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_owned()))?;

        self.audit
            .append(AuditEvent::new(
                actor,
                Metodo::Get,
                format!("api/usuario/{nombre}"),
                format!("Consulta del usuario {nombre}"),
            ))
            .await?;

        Ok(Usuario {
            id: record.id,
            nombre: record.nombre,
            id_rol: record.id_rol,
        })
    }

    /// Updates role and, when given, the password of an account.
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        nombre: &str,
        patch: UsuarioPatch,
    ) -> AppResult<Usuario> {
        self.authorization
            .require(actor, Accion::Modificar, "USUARIO")
            .await?;

        let hash = patch
            .contrasena
            .as_deref()
            .map(|contrasena| self.hasher.hash_password(contrasena))
            .transpose()?;

        let audit = AuditEvent::new(
            actor,
            Metodo::Put,
            format!("api/usuario/{nombre}"),
            format!("Usuario '{nombre}' actualizado"),
        );

        self.store
            .update(nombre, patch.id_rol, hash.as_deref(), audit)
            .await
    }

    /// Removes an account.
    pub async fn delete(&self, actor: &AuthenticatedUser, nombre: &str) -> AppResult<Usuario> {
        self.authorization
            .require(actor, Accion::Eliminar, "USUARIO")
            .await?;

        let audit = AuditEvent::new(
            actor,
            Metodo::Delete,
            format!("api/usuario/{nombre}"),
            format!("Usuario '{nombre}' eliminado"),
        );

        self.store.delete(nombre, audit).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Arc;

    use async_trait::async_trait;
    use panaderia_core::{AppError, AppResult, AuthenticatedUser};
    use panaderia_domain::Usuario;
    use tokio::sync::Mutex;

    use super::{UserService, UsuarioDraft};
    use crate::{
        AuditEvent, AuditStore, AuthorizationService, AuthorizationStore, PasswordHasher,
        UserRecord, UserStore,
    };

    struct FakeHasher;

    impl PasswordHasher for FakeHasher {
        fn hash_password(&self, password: &str) -> AppResult<String> {
            Ok(format!("#{password}"))
        }

        fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
            Ok(self.hash_password(password)? == hash)
        }
    }

    #[derive(Default)]
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
            nombre: &str,
            contrasena_hash: &str,
            id_rol: i32,
            _audit: AuditEvent,
        ) -> AppResult<Usuario> {
            let mut records = self.records.lock().await;
            if records.iter().any(|record| record.nombre == nombre) {
                return Err(AppError::Conflict(
                    "El usuario con este nombre ya existe.".to_owned(),
                ));
            }
            let id = records.len() as i32 + 1;
            records.push(UserRecord {
                id,
                nombre: nombre.to_owned(),
                contrasena_hash: contrasena_hash.to_owned(),
                id_rol,
            });
            Ok(Usuario {
                id,
                nombre: nombre.to_owned(),
                id_rol,
            })
        }

        async fn list(&self) -> AppResult<Vec<Usuario>> {
            Ok(self
                .records
                .lock()
                .await
                .iter()
                .map(|record| Usuario {
                    id: record.id,
                    nombre: record.nombre.clone(),
                    id_rol: record.id_rol,
                })
                .collect())
        }

        async fn update(
            &self,
            nombre: &str,
            id_rol: i32,
            contrasena_hash: Option<&str>,
            _audit: AuditEvent,
        ) -> AppResult<Usuario> {
            let mut records = self.records.lock().await;
            let record = records
                .iter_mut()
                .find(|record| record.nombre == nombre)
                .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_owned()))?;
            record.id_rol = id_rol;
            if let Some(hash) = contrasena_hash {
                record.contrasena_hash = hash.to_owned();
            }
            Ok(Usuario {
                id: record.id,
                nombre: record.nombre.clone(),
                id_rol: record.id_rol,
            })
        }

        async fn update_password(
            &self,
            _id: i32,
            _contrasena_hash: &str,
            _audit: AuditEvent,
        ) -> AppResult<()> {
            Ok(())
        }

        async fn delete(&self, nombre: &str, _audit: AuditEvent) -> AppResult<Usuario> {
            let mut records = self.records.lock().await;
            let index = records
                .iter()
                .position(|record| record.nombre == nombre)
                .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_owned()))?;
            let removed = records.remove(index);
            Ok(Usuario {
                id: removed.id,
                nombre: removed.nombre,
                id_rol: removed.id_rol,
            })
        }
    }

    struct FakeAuthorizationStore;

    #[async_trait]
    impl AuthorizationStore for FakeAuthorizationStore {
        async fn permissions_for_role(&self, id_rol: i32) -> AppResult<BTreeSet<String>> {
            let roles = HashMap::from([(
                1,
                BTreeSet::from([
                    "CREAR_USUARIO".to_owned(),
                    "VER_USUARIO".to_owned(),
                    "MODIFICAR_USUARIO".to_owned(),
                    "ELIMINAR_USUARIO".to_owned(),
                ]),
            )]);
            Ok(roles.get(&id_rol).cloned().unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct NullAuditStore;

    #[async_trait]
    impl AuditStore for NullAuditStore {
        async fn append(&self, _event: AuditEvent) -> AppResult<()> {
            Ok(())
        }
    }

    fn service_over(store: Arc<FakeUserStore>) -> UserService {
        UserService::new(
            store,
            Arc::new(FakeHasher),
            AuthorizationService::new(Arc::new(FakeAuthorizationStore)),
            Arc::new(NullAuditStore),
        )
    }

    #[tokio::test]
    async fn create_stores_a_hash_not_the_password() -> AppResult<()> {
        let store = Arc::new(FakeUserStore::default());
        let service = service_over(store.clone());
        let actor = AuthenticatedUser::new(1, "admin", 1, 1);

        service
            .create(
                &actor,
                UsuarioDraft {
                    nombre: "ana".to_owned(),
                    contrasena: "secreta".to_owned(),
                    id_rol: 2,
                },
            )
            .await?;

        let records = store.records.lock().await;
        assert_eq!(records[0].contrasena_hash, "#secreta");
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() -> AppResult<()> {
        let service = service_over(Arc::new(FakeUserStore::default()));
        let actor = AuthenticatedUser::new(1, "admin", 1, 1);
        let draft = UsuarioDraft {
            nombre: "ana".to_owned(),
            contrasena: "secreta".to_owned(),
            id_rol: 2,
        };

        service.create(&actor, draft.clone()).await?;
        let second = service.create(&actor, draft).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn unprivileged_role_cannot_manage_users() {
        let service = service_over(Arc::new(FakeUserStore::default()));
        let outsider = AuthenticatedUser::new(5, "vend", 2, 1);

        let result = service.list(&outsider).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
