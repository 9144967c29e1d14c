//! PostgreSQL-backed role store.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{Recurso, Rol, RolDraft, RolPatch};

use crate::pg;

const DUPLICATE: &str = "El rol con este nombre ya existe.";
const IN_USE: &str = "El rol está asignado a usuarios.";

/// PostgreSQL implementation of the role store. Deleting a role also drops
/// its permission grants through the cascading foreign key.
#[derive(Clone)]
pub struct PostgresRolStore {
    pool: PgPool,
}

impl PostgresRolStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RolRow {
    id: i32,
    nombre: String,
}

impl From<RolRow> for Rol {
    fn from(row: RolRow) -> Self {
        Self {
            id: row.id,
            nombre: row.nombre,
        }
    }
}

#[async_trait]
impl EntityStore<Rol> for PostgresRolStore {
    async fn insert(&self, draft: RolDraft, audit: AuditEvent) -> AppResult<Rol> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<RolRow> = sqlx::query_as(
            r#"
            INSERT INTO rol (nombre)
            VALUES ($1)
            ON CONFLICT (nombre) DO NOTHING
            RETURNING id, nombre
            "#,
        )
        .bind(&draft.nombre)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "insert rol", DUPLICATE, IN_USE))?;

        let rol = row.ok_or_else(|| AppError::Conflict(DUPLICATE.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(rol.into())
    }

    async fn list(&self) -> AppResult<Vec<Rol>> {
        let rows: Vec<RolRow> = sqlx::query_as("SELECT id, nombre FROM rol ORDER BY nombre")
            .fetch_all(&self.pool)
            .await
            .map_err(|error| pg::query_error(error, "list roles"))?;

        Ok(rows.into_iter().map(Rol::from).collect())
    }

    async fn find(&self, key: &i32) -> AppResult<Option<Rol>> {
        let row: Option<RolRow> = sqlx::query_as("SELECT id, nombre FROM rol WHERE id = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| pg::query_error(error, "find rol"))?;

        Ok(row.map(Rol::from))
    }

    async fn update(&self, key: &i32, patch: RolPatch, audit: AuditEvent) -> AppResult<Rol> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<RolRow> = sqlx::query_as(
            r#"
            UPDATE rol
            SET nombre = $2
            WHERE id = $1
            RETURNING id, nombre
            "#,
        )
        .bind(key)
        .bind(&patch.nombre)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "update rol", DUPLICATE, IN_USE))?;

        let rol = row.ok_or_else(|| AppError::NotFound(Rol::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(rol.into())
    }

    async fn delete(&self, key: &i32, audit: AuditEvent) -> AppResult<Rol> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<RolRow> = sqlx::query_as(
            r#"
            DELETE FROM rol
            WHERE id = $1
            RETURNING id, nombre
            "#,
        )
        .bind(key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "delete rol", DUPLICATE, IN_USE))?;

        let rol = row.ok_or_else(|| AppError::NotFound(Rol::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(rol.into())
    }
}
