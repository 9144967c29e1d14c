//! PostgreSQL-backed ingredient store.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{Insumo, InsumoDraft, InsumoPatch, Recurso};

use crate::pg;

const DUPLICATE: &str = "El insumo con este nombre ya existe.";
const REFERENCED: &str = "El insumo está referenciado por otros registros.";

/// PostgreSQL implementation of the ingredient store.
#[derive(Clone)]
pub struct PostgresInsumoStore {
    pool: PgPool,
}

impl PostgresInsumoStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct InsumoRow {
    id: i32,
    nombre: String,
    medida: String,
    stock: f64,
    stock_minimo: f64,
}

impl From<InsumoRow> for Insumo {
    fn from(row: InsumoRow) -> Self {
        Self {
            id: row.id,
            nombre: row.nombre,
            medida: row.medida,
            stock: row.stock,
            stock_minimo: row.stock_minimo,
        }
    }
}

#[async_trait]
impl EntityStore<Insumo> for PostgresInsumoStore {
    async fn insert(&self, draft: InsumoDraft, audit: AuditEvent) -> AppResult<Insumo> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<InsumoRow> = sqlx::query_as(
            r#"
            INSERT INTO insumo (nombre, medida, stock, stock_minimo)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (nombre) DO NOTHING
            RETURNING id, nombre, medida, stock, stock_minimo
            "#,
        )
        .bind(&draft.nombre)
        .bind(&draft.medida)
        .bind(draft.stock)
        .bind(draft.stock_minimo)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "insert insumo", DUPLICATE, REFERENCED))?;

        let insumo = row.ok_or_else(|| AppError::Conflict(DUPLICATE.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(insumo.into())
    }

    async fn list(&self) -> AppResult<Vec<Insumo>> {
        let rows: Vec<InsumoRow> = sqlx::query_as(
            "SELECT id, nombre, medida, stock, stock_minimo FROM insumo ORDER BY nombre",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "list insumos"))?;

        Ok(rows.into_iter().map(Insumo::from).collect())
    }

    async fn find(&self, key: &i32) -> AppResult<Option<Insumo>> {
        let row: Option<InsumoRow> = sqlx::query_as(
            "SELECT id, nombre, medida, stock, stock_minimo FROM insumo WHERE id = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "find insumo"))?;

        Ok(row.map(Insumo::from))
    }

    async fn update(&self, key: &i32, patch: InsumoPatch, audit: AuditEvent) -> AppResult<Insumo> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<InsumoRow> = sqlx::query_as(
            r#"
            UPDATE insumo
            SET nombre = $2, medida = $3, stock = $4, stock_minimo = $5
            WHERE id = $1
            RETURNING id, nombre, medida, stock, stock_minimo
            "#,
        )
        .bind(key)
        .bind(&patch.nombre)
        .bind(&patch.medida)
        .bind(patch.stock)
        .bind(patch.stock_minimo)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "update insumo", DUPLICATE, REFERENCED))?;

        let insumo = row.ok_or_else(|| AppError::NotFound(Insumo::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(insumo.into())
    }

    async fn delete(&self, key: &i32, audit: AuditEvent) -> AppResult<Insumo> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<InsumoRow> = sqlx::query_as(
            r#"
            DELETE FROM insumo
            WHERE id = $1
            RETURNING id, nombre, medida, stock, stock_minimo
            "#,
        )
        .bind(key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "delete insumo", DUPLICATE, REFERENCED))?;

        let insumo = row.ok_or_else(|| AppError::NotFound(Insumo::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(insumo.into())
    }
}
