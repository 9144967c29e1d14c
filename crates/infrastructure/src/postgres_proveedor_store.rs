//! PostgreSQL-backed supplier store.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{Proveedor, ProveedorPatch, Recurso};

use crate::pg;

const DUPLICATE: &str = "El proveedor con este código ya existe.";
const REFERENCED: &str = "El proveedor está referenciado por otros registros.";

/// PostgreSQL implementation of the supplier store.
#[derive(Clone)]
pub struct PostgresProveedorStore {
    pool: PgPool,
}

impl PostgresProveedorStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProveedorRow {
    codigo: String,
    nombre: String,
    telefono: String,
}

impl From<ProveedorRow> for Proveedor {
    fn from(row: ProveedorRow) -> Self {
        Self {
            codigo: row.codigo,
            nombre: row.nombre,
            telefono: row.telefono,
        }
    }
}

#[async_trait]
impl EntityStore<Proveedor> for PostgresProveedorStore {
    async fn insert(&self, draft: Proveedor, audit: AuditEvent) -> AppResult<Proveedor> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<ProveedorRow> = sqlx::query_as(
            r#"
            INSERT INTO proveedor (codigo, nombre, telefono)
            VALUES ($1, $2, $3)
            ON CONFLICT (codigo) DO NOTHING
            RETURNING codigo, nombre, telefono
            "#,
        )
        .bind(&draft.codigo)
        .bind(&draft.nombre)
        .bind(&draft.telefono)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "insert proveedor", DUPLICATE, REFERENCED))?;

        let proveedor = row.ok_or_else(|| AppError::Conflict(DUPLICATE.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(proveedor.into())
    }

    async fn list(&self) -> AppResult<Vec<Proveedor>> {
        let rows: Vec<ProveedorRow> =
            sqlx::query_as("SELECT codigo, nombre, telefono FROM proveedor ORDER BY nombre")
                .fetch_all(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "list proveedores"))?;

        Ok(rows.into_iter().map(Proveedor::from).collect())
    }

    async fn find(&self, key: &String) -> AppResult<Option<Proveedor>> {
        let row: Option<ProveedorRow> =
            sqlx::query_as("SELECT codigo, nombre, telefono FROM proveedor WHERE codigo = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "find proveedor"))?;

        Ok(row.map(Proveedor::from))
    }

    async fn update(
        &self,
        key: &String,
        patch: ProveedorPatch,
        audit: AuditEvent,
    ) -> AppResult<Proveedor> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<ProveedorRow> = sqlx::query_as(
            r#"
            UPDATE proveedor
            SET nombre = $2, telefono = $3
            WHERE codigo = $1
            RETURNING codigo, nombre, telefono
            "#,
        )
        .bind(key)
        .bind(&patch.nombre)
        .bind(&patch.telefono)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "update proveedor", DUPLICATE, REFERENCED))?;

        let proveedor = row.ok_or_else(|| AppError::NotFound(Proveedor::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(proveedor.into())
    }

    async fn delete(&self, key: &String, audit: AuditEvent) -> AppResult<Proveedor> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<ProveedorRow> = sqlx::query_as(
            r#"
            DELETE FROM proveedor
            WHERE codigo = $1
            RETURNING codigo, nombre, telefono
            "#,
        )
        .bind(key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "delete proveedor", DUPLICATE, REFERENCED))?;

        let proveedor = row.ok_or_else(|| AppError::NotFound(Proveedor::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(proveedor.into())
    }
}
