use std::sync::Arc;

use panaderia_core::{AppError, AppResult, AuthenticatedUser};
use panaderia_domain::Accion;

use crate::AuthorizationStore;

/// Permission guard: resolves the actor's role to its granted permission
/// set and rejects the request before any controller logic runs.
#[derive(Clone)]
pub struct AuthorizationService {
    store: Arc<dyn AuthorizationStore>,
}

impl AuthorizationService {
    /// Creates a guard from a permission store.
    #[must_use]
    pub fn new(store: Arc<dyn AuthorizationStore>) -> Self {
        Self { store }
    }

    /// Ensures the actor's role grants `accion` on `recurso`
    /// (e.g. `MODIFICAR_CLIENTE`); otherwise fails with `Forbidden`.
    pub async fn require(
        &self,
        actor: &AuthenticatedUser,
        accion: Accion,
        recurso: &str,
    ) -> AppResult<()> {
        let required = accion.permiso(recurso);
        let granted = self.store.permissions_for_role(actor.id_rol()).await?;

        if granted.contains(&required) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "No tiene el permiso '{required}'"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Arc;

    use async_trait::async_trait;
    use panaderia_core::{AppError, AppResult, AuthenticatedUser};
    use panaderia_domain::Accion;

    use super::AuthorizationService;
    use crate::AuthorizationStore;

    struct FakeAuthorizationStore {
        roles: HashMap<i32, BTreeSet<String>>,
    }

    #[async_trait]
    impl AuthorizationStore for FakeAuthorizationStore {
        async fn permissions_for_role(&self, id_rol: i32) -> AppResult<BTreeSet<String>> {
            Ok(self.roles.get(&id_rol).cloned().unwrap_or_default())
        }
    }

    fn actor(id_rol: i32) -> AuthenticatedUser {
        AuthenticatedUser::new(1, "ana", id_rol, 7)
    }

    #[tokio::test]
    async fn require_allows_granted_permission() {
        let store = FakeAuthorizationStore {
            roles: HashMap::from([(1, BTreeSet::from(["VER_CLIENTE".to_owned()]))]),
        };
        let guard = AuthorizationService::new(Arc::new(store));

        let result = guard.require(&actor(1), Accion::Ver, "CLIENTE").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn require_denies_missing_permission() {
        let store = FakeAuthorizationStore {
            roles: HashMap::from([(1, BTreeSet::from(["VER_CLIENTE".to_owned()]))]),
        };
        let guard = AuthorizationService::new(Arc::new(store));

        let result = guard.require(&actor(1), Accion::Eliminar, "CLIENTE").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn unknown_role_is_denied_not_crashed() {
        let store = FakeAuthorizationStore {
            roles: HashMap::new(),
        };
        let guard = AuthorizationService::new(Arc::new(store));

        let result = guard.require(&actor(99), Accion::Ver, "PRODUCTO").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
