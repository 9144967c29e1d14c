//! PostgreSQL-backed store for supply lines on purchase notes.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{ClaveCompraInsumo, CompraInsumo, CompraInsumoPatch, Recurso};

use crate::pg;

const DUPLICATE: &str = "Este insumo ya está registrado en esta nota de compra.";
const BAD_REFERENCE: &str = "El insumo o la nota de compra asociada no existe.";

/// PostgreSQL implementation of the supply-line store.
#[derive(Clone)]
pub struct PostgresCompraInsumoStore {
    pool: PgPool,
}

impl PostgresCompraInsumoStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CompraInsumoRow {
    id_nota_compra: i32,
    id_insumo: i32,
    cantidad: f64,
    precio: f64,
    total: f64,
}

impl From<CompraInsumoRow> for CompraInsumo {
    fn from(row: CompraInsumoRow) -> Self {
        Self {
            id_nota_compra: row.id_nota_compra,
            id_insumo: row.id_insumo,
            cantidad: row.cantidad,
            precio: row.precio,
            total: row.total,
        }
    }
}

const COLUMNS: &str = "id_nota_compra, id_insumo, cantidad, precio, total";

#[async_trait]
impl EntityStore<CompraInsumo> for PostgresCompraInsumoStore {
    async fn insert(&self, draft: CompraInsumo, audit: AuditEvent) -> AppResult<CompraInsumo> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<CompraInsumoRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO compra_insumo (id_nota_compra, id_insumo, cantidad, precio, total)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT DO NOTHING
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(draft.id_nota_compra)
        .bind(draft.id_insumo)
        .bind(draft.cantidad)
        .bind(draft.precio)
        .bind(draft.total)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            pg::map_write_error(error, "insert compra_insumo", DUPLICATE, BAD_REFERENCE)
        })?;

        let linea = row.ok_or_else(|| AppError::Conflict(DUPLICATE.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(linea.into())
    }

    async fn list(&self) -> AppResult<Vec<CompraInsumo>> {
        let rows: Vec<CompraInsumoRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM compra_insumo ORDER BY id_nota_compra, id_insumo"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "list compras_insumo"))?;

        Ok(rows.into_iter().map(CompraInsumo::from).collect())
    }

    async fn find(&self, key: &ClaveCompraInsumo) -> AppResult<Option<CompraInsumo>> {
        let row: Option<CompraInsumoRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM compra_insumo WHERE id_nota_compra = $1 AND id_insumo = $2"
        ))
        .bind(key.id_nota_compra)
        .bind(key.id_insumo)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "find compra_insumo"))?;

        Ok(row.map(CompraInsumo::from))
    }

    async fn update(
        &self,
        key: &ClaveCompraInsumo,
        patch: CompraInsumoPatch,
        audit: AuditEvent,
    ) -> AppResult<CompraInsumo> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<CompraInsumoRow> = sqlx::query_as(&format!(
            r#"
            UPDATE compra_insumo
            SET cantidad = $3, precio = $4, total = $5
            WHERE id_nota_compra = $1 AND id_insumo = $2
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key.id_nota_compra)
        .bind(key.id_insumo)
        .bind(patch.cantidad)
        .bind(patch.precio)
        .bind(patch.total)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            pg::map_write_error(error, "update compra_insumo", DUPLICATE, BAD_REFERENCE)
        })?;

        let linea = row.ok_or_else(|| AppError::NotFound(CompraInsumo::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(linea.into())
    }

    async fn delete(&self, key: &ClaveCompraInsumo, audit: AuditEvent) -> AppResult<CompraInsumo> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<CompraInsumoRow> = sqlx::query_as(&format!(
            r#"
            DELETE FROM compra_insumo
            WHERE id_nota_compra = $1 AND id_insumo = $2
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key.id_nota_compra)
        .bind(key.id_insumo)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            pg::map_write_error(error, "delete compra_insumo", DUPLICATE, BAD_REFERENCE)
        })?;

        let linea = row.ok_or_else(|| AppError::NotFound(CompraInsumo::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(linea.into())
    }
}
