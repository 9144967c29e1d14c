use std::sync::Arc;

use panaderia_core::{AppError, AppResult, AuthenticatedUser};
use panaderia_domain::{Accion, Metodo, Permiso, RolPermiso};

use crate::{AuditEvent, AuditStore, AuthorizationService, SecurityStore};

/// Permission catalog reads and role-permission grant management. The
/// catalog itself is seeded reference data; only grants are writable.
#[derive(Clone)]
pub struct SecurityService {
    store: Arc<dyn SecurityStore>,
    authorization: AuthorizationService,
    audit: Arc<dyn AuditStore>,
}

impl SecurityService {
    /// Creates the service from its ports.
    #[must_use]
    pub fn new(
        store: Arc<dyn SecurityStore>,
        authorization: AuthorizationService,
        audit: Arc<dyn AuditStore>,
    ) -> Self {
        Self {
            store,
            authorization,
            audit,
        }
    }

    /// Returns the permission catalog.
    pub async fn list_permissions(&self, actor: &AuthenticatedUser) -> AppResult<Vec<Permiso>> {
        self.authorization
            .require(actor, Accion::Ver, "PERMISO")
            .await?;

        let rows = self.store.list_permissions().await?;

        self.audit
            .append(AuditEvent::new(
                actor,
                Metodo::Get,
                "api/permiso",
                "Consulta de todos los permisos",
            ))
            .await?;

        Ok(rows)
    }

    /// Returns one catalog entry.
    pub async fn get_permission(&self, actor: &AuthenticatedUser, id: i32) -> AppResult<Permiso> {
        self.authorization
            .require(actor, Accion::Ver, "PERMISO")
            .await?;

        let permiso = self
            .store
            .find_permission(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Permiso no encontrado".to_owned()))?;

        self.audit
            .append(AuditEvent::new(
                actor,
                Metodo::Get,
                format!("api/permiso/{id}"),
                format!("Consulta del permiso {id}"),
            ))
            .await?;

        Ok(permiso)
    }

    /// Grants a permission to a role.
    pub async fn grant(&self, actor: &AuthenticatedUser, grant: RolPermiso) -> AppResult<()> {
        self.authorization
            .require(actor, Accion::Crear, "ROL_PERMISO")
            .await?;

        let audit = AuditEvent::new(
            actor,
            Metodo::Post,
            "api/rol_permiso",
            format!(
                "Permiso {} asignado al rol {}",
                grant.id_permiso, grant.id_rol
            ),
        );

        self.store.grant(grant, audit).await
    }

    /// Returns all grants.
    pub async fn list_grants(&self, actor: &AuthenticatedUser) -> AppResult<Vec<RolPermiso>> {
        self.authorization
            .require(actor, Accion::Ver, "ROL_PERMISO")
            .await?;

        let rows = self.store.list_grants().await?;

        self.audit
            .append(AuditEvent::new(
                actor,
                Metodo::Get,
                "api/rol_permiso",
                "Consulta de todas las asignaciones de permisos",
            ))
            .await?;

        Ok(rows)
    }

    /// Returns one grant.
    pub async fn get_grant(
        &self,
        actor: &AuthenticatedUser,
        id_rol: i32,
        id_permiso: i32,
    ) -> AppResult<RolPermiso> {
        self.authorization
            .require(actor, Accion::Ver, "ROL_PERMISO")
            .await?;

        let grant = self
            .store
            .find_grant(id_rol, id_permiso)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Asignación de permiso no encontrada".to_owned())
            })?;

        self.audit
            .append(AuditEvent::new(
                actor,
                Metodo::Get,
                format!("api/rol_permiso/{id_rol}/{id_permiso}"),
                format!("Consulta de la asignación {id_rol}/{id_permiso}"),
            ))
            .await?;

        Ok(grant)
    }

    /// Revokes a grant.
    pub async fn revoke(
        &self,
        actor: &AuthenticatedUser,
        id_rol: i32,
        id_permiso: i32,
    ) -> AppResult<()> {
        self.authorization
            .require(actor, Accion::Eliminar, "ROL_PERMISO")
            .await?;

        let audit = AuditEvent::new(
            actor,
            Metodo::Delete,
            format!("api/rol_permiso/{id_rol}/{id_permiso}"),
            format!("Permiso {id_permiso} revocado del rol {id_rol}"),
        );

        self.store.revoke(id_rol, id_permiso, audit).await
    }
}
