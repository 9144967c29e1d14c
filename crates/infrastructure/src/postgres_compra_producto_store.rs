//! PostgreSQL-backed store for product lines on purchase notes.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{ClaveCompraProducto, CompraProducto, CompraProductoPatch, Recurso};

use crate::pg;

const DUPLICATE: &str = "Este producto ya está registrado en esta nota de compra.";
const BAD_REFERENCE: &str = "El producto o la nota de compra asociada no existe.";

/// PostgreSQL implementation of the product-line store.
#[derive(Clone)]
pub struct PostgresCompraProductoStore {
    pool: PgPool,
}

impl PostgresCompraProductoStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CompraProductoRow {
    id_nota_compra: i32,
    id_producto: i32,
    cantidad: i32,
    precio: f64,
    total: f64,
}

impl From<CompraProductoRow> for CompraProducto {
    fn from(row: CompraProductoRow) -> Self {
        Self {
            id_nota_compra: row.id_nota_compra,
            id_producto: row.id_producto,
            cantidad: row.cantidad,
            precio: row.precio,
            total: row.total,
        }
    }
}

const COLUMNS: &str = "id_nota_compra, id_producto, cantidad, precio, total";

#[async_trait]
impl EntityStore<CompraProducto> for PostgresCompraProductoStore {
    async fn insert(&self, draft: CompraProducto, audit: AuditEvent) -> AppResult<CompraProducto> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<CompraProductoRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO compra_producto (id_nota_compra, id_producto, cantidad, precio, total)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT DO NOTHING
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(draft.id_nota_compra)
        .bind(draft.id_producto)
        .bind(draft.cantidad)
        .bind(draft.precio)
        .bind(draft.total)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            pg::map_write_error(error, "insert compra_producto", DUPLICATE, BAD_REFERENCE)
        })?;

        let linea = row.ok_or_else(|| AppError::Conflict(DUPLICATE.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(linea.into())
    }

    async fn list(&self) -> AppResult<Vec<CompraProducto>> {
        let rows: Vec<CompraProductoRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM compra_producto ORDER BY id_nota_compra, id_producto"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "list compras_producto"))?;

        Ok(rows.into_iter().map(CompraProducto::from).collect())
    }

    async fn find(&self, key: &ClaveCompraProducto) -> AppResult<Option<CompraProducto>> {
        let row: Option<CompraProductoRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM compra_producto WHERE id_nota_compra = $1 AND id_producto = $2"
        ))
        .bind(key.id_nota_compra)
        .bind(key.id_producto)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "find compra_producto"))?;

        Ok(row.map(CompraProducto::from))
    }

    async fn update(
        &self,
        key: &ClaveCompraProducto,
        patch: CompraProductoPatch,
        audit: AuditEvent,
    ) -> AppResult<CompraProducto> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<CompraProductoRow> = sqlx::query_as(&format!(
            r#"
            UPDATE compra_producto
            SET cantidad = $3, precio = $4, total = $5
            WHERE id_nota_compra = $1 AND id_producto = $2
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key.id_nota_compra)
        .bind(key.id_producto)
        .bind(patch.cantidad)
        .bind(patch.precio)
        .bind(patch.total)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            pg::map_write_error(error, "update compra_producto", DUPLICATE, BAD_REFERENCE)
        })?;

        let linea = row.ok_or_else(|| AppError::NotFound(CompraProducto::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(linea.into())
    }

    async fn delete(
        &self,
        key: &ClaveCompraProducto,
        audit: AuditEvent,
    ) -> AppResult<CompraProducto> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<CompraProductoRow> = sqlx::query_as(&format!(
            r#"
            DELETE FROM compra_producto
            WHERE id_nota_compra = $1 AND id_producto = $2
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key.id_nota_compra)
        .bind(key.id_producto)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            pg::map_write_error(error, "delete compra_producto", DUPLICATE, BAD_REFERENCE)
        })?;

        let linea = row.ok_or_else(|| AppError::NotFound(CompraProducto::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(linea.into())
    }
}
