//! PostgreSQL-backed permission catalog and grant store.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, SecurityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{Permiso, RolPermiso};

use crate::pg;

const DUPLICATE: &str = "El rol ya tiene este permiso.";
const BAD_REFERENCE: &str = "El rol o el permiso indicado no existe.";
const GRANT_NOT_FOUND: &str = "Asignación de permiso no encontrada";

/// PostgreSQL implementation of the security store. The permission catalog
/// is seeded by migration; only grants are written at runtime.
#[derive(Clone)]
pub struct PostgresSecurityStore {
    pool: PgPool,
}

impl PostgresSecurityStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PermisoRow {
    id: i32,
    nombre: String,
    descripcion: String,
}

impl From<PermisoRow> for Permiso {
    fn from(row: PermisoRow) -> Self {
        Self {
            id: row.id,
            nombre: row.nombre,
            descripcion: row.descripcion,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RolPermisoRow {
    id_rol: i32,
    id_permiso: i32,
}

impl From<RolPermisoRow> for RolPermiso {
    fn from(row: RolPermisoRow) -> Self {
        Self {
            id_rol: row.id_rol,
            id_permiso: row.id_permiso,
        }
    }
}

#[async_trait]
impl SecurityStore for PostgresSecurityStore {
    async fn list_permissions(&self) -> AppResult<Vec<Permiso>> {
        let rows: Vec<PermisoRow> =
            sqlx::query_as("SELECT id, nombre, descripcion FROM permiso ORDER BY nombre")
                .fetch_all(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "list permisos"))?;

        Ok(rows.into_iter().map(Permiso::from).collect())
    }

    async fn find_permission(&self, id: i32) -> AppResult<Option<Permiso>> {
        let row: Option<PermisoRow> =
            sqlx::query_as("SELECT id, nombre, descripcion FROM permiso WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "find permiso"))?;

        Ok(row.map(Permiso::from))
    }

    async fn grant(&self, grant: RolPermiso, audit: AuditEvent) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let result = sqlx::query(
            r#"
            INSERT INTO rol_permiso (id_rol, id_permiso)
            VALUES ($1, $2)
            ON CONFLICT (id_rol, id_permiso) DO NOTHING
            "#,
        )
        .bind(grant.id_rol)
        .bind(grant.id_permiso)
        .execute(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "grant permiso", DUPLICATE, BAD_REFERENCE))?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(DUPLICATE.to_owned()));
        }

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(())
    }

    async fn list_grants(&self) -> AppResult<Vec<RolPermiso>> {
        let rows: Vec<RolPermisoRow> =
            sqlx::query_as("SELECT id_rol, id_permiso FROM rol_permiso ORDER BY id_rol, id_permiso")
                .fetch_all(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "list grants"))?;

        Ok(rows.into_iter().map(RolPermiso::from).collect())
    }

    async fn find_grant(&self, id_rol: i32, id_permiso: i32) -> AppResult<Option<RolPermiso>> {
        let row: Option<RolPermisoRow> = sqlx::query_as(
            "SELECT id_rol, id_permiso FROM rol_permiso WHERE id_rol = $1 AND id_permiso = $2",
        )
        .bind(id_rol)
        .bind(id_permiso)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "find grant"))?;

        Ok(row.map(RolPermiso::from))
    }

    async fn revoke(&self, id_rol: i32, id_permiso: i32, audit: AuditEvent) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let result =
            sqlx::query("DELETE FROM rol_permiso WHERE id_rol = $1 AND id_permiso = $2")
                .bind(id_rol)
                .bind(id_permiso)
                .execute(&mut *tx)
                .await
                .map_err(|error| pg::query_error(error, "revoke permiso"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(GRANT_NOT_FOUND.to_owned()));
        }

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(())
    }
}
