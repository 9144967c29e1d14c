//! PostgreSQL-backed store for recipe ingredient lines.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{ClaveDetalleReceta, DetalleReceta, DetalleRecetaPatch, Recurso};

use crate::pg;

const DUPLICATE: &str = "Este insumo ya está asociado a la receta.";
const BAD_REFERENCE: &str = "La receta o el insumo asociado no existe.";

/// PostgreSQL implementation of the ingredient-line store.
#[derive(Clone)]
pub struct PostgresDetalleRecetaStore {
    pool: PgPool,
}

impl PostgresDetalleRecetaStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DetalleRecetaRow {
    id_receta: i32,
    id_insumo: i32,
    cantidad: f64,
    medida: String,
}

impl From<DetalleRecetaRow> for DetalleReceta {
    fn from(row: DetalleRecetaRow) -> Self {
        Self {
            id_receta: row.id_receta,
            id_insumo: row.id_insumo,
            cantidad: row.cantidad,
            medida: row.medida,
        }
    }
}

const COLUMNS: &str = "id_receta, id_insumo, cantidad, medida";

#[async_trait]
impl EntityStore<DetalleReceta> for PostgresDetalleRecetaStore {
    async fn insert(&self, draft: DetalleReceta, audit: AuditEvent) -> AppResult<DetalleReceta> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<DetalleRecetaRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO detalle_receta (id_receta, id_insumo, cantidad, medida)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(draft.id_receta)
        .bind(draft.id_insumo)
        .bind(draft.cantidad)
        .bind(&draft.medida)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            pg::map_write_error(error, "insert detalle_receta", DUPLICATE, BAD_REFERENCE)
        })?;

        let detalle = row.ok_or_else(|| AppError::Conflict(DUPLICATE.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(detalle.into())
    }

    async fn list(&self) -> AppResult<Vec<DetalleReceta>> {
        let rows: Vec<DetalleRecetaRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM detalle_receta ORDER BY id_receta, id_insumo"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "list detalles_receta"))?;

        Ok(rows.into_iter().map(DetalleReceta::from).collect())
    }

    async fn find(&self, key: &ClaveDetalleReceta) -> AppResult<Option<DetalleReceta>> {
        let row: Option<DetalleRecetaRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM detalle_receta WHERE id_receta = $1 AND id_insumo = $2"
        ))
        .bind(key.id_receta)
        .bind(key.id_insumo)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "find detalle_receta"))?;

        Ok(row.map(DetalleReceta::from))
    }

    async fn update(
        &self,
        key: &ClaveDetalleReceta,
        patch: DetalleRecetaPatch,
        audit: AuditEvent,
    ) -> AppResult<DetalleReceta> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<DetalleRecetaRow> = sqlx::query_as(&format!(
            r#"
            UPDATE detalle_receta
            SET cantidad = $3, medida = $4
            WHERE id_receta = $1 AND id_insumo = $2
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key.id_receta)
        .bind(key.id_insumo)
        .bind(patch.cantidad)
        .bind(&patch.medida)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            pg::map_write_error(error, "update detalle_receta", DUPLICATE, BAD_REFERENCE)
        })?;

        let detalle = row.ok_or_else(|| AppError::NotFound(DetalleReceta::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(detalle.into())
    }

    async fn delete(&self, key: &ClaveDetalleReceta, audit: AuditEvent) -> AppResult<DetalleReceta> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<DetalleRecetaRow> = sqlx::query_as(&format!(
            r#"
            DELETE FROM detalle_receta
            WHERE id_receta = $1 AND id_insumo = $2
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key.id_receta)
        .bind(key.id_insumo)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            pg::map_write_error(error, "delete detalle_receta", DUPLICATE, BAD_REFERENCE)
        })?;

        let detalle = row.ok_or_else(|| AppError::NotFound(DetalleReceta::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(detalle.into())
    }
}
