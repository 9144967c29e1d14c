//! PostgreSQL-backed store for order product lines.
//!
//! Lines live in the `pedido_producto` table; the line total is always
//! derived from units and unit price inside the write statement.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{ClaveDetallePedido, DetallePedido, DetallePedidoDraft, DetallePedidoPatch, Recurso};

use crate::pg;

const DUPLICATE: &str = "Este producto ya está registrado en este pedido.";
const BAD_REFERENCE: &str = "El producto o el pedido indicado no existe.";

/// PostgreSQL implementation of the order-line store.
#[derive(Clone)]
pub struct PostgresDetallePedidoStore {
    pool: PgPool,
}

impl PostgresDetallePedidoStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DetallePedidoRow {
    id_producto: i32,
    id_pedido: i32,
    cantidad: i32,
    precio: f64,
    total: f64,
}

impl From<DetallePedidoRow> for DetallePedido {
    fn from(row: DetallePedidoRow) -> Self {
        Self {
            id_producto: row.id_producto,
            id_pedido: row.id_pedido,
            cantidad: row.cantidad,
            precio: row.precio,
            total: row.total,
        }
    }
}

const COLUMNS: &str = "id_producto, id_pedido, cantidad, precio, total";

#[async_trait]
impl EntityStore<DetallePedido> for PostgresDetallePedidoStore {
    async fn insert(&self, draft: DetallePedidoDraft, audit: AuditEvent) -> AppResult<DetallePedido> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<DetallePedidoRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO pedido_producto (id_producto, id_pedido, cantidad, precio, total)
            VALUES ($1, $2, $3, $4, $3 * $4)
            ON CONFLICT DO NOTHING
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(draft.id_producto)
        .bind(draft.id_pedido)
        .bind(draft.cantidad)
        .bind(draft.precio)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            pg::map_write_error(error, "insert detalle_pedido", DUPLICATE, BAD_REFERENCE)
        })?;

        let detalle = row.ok_or_else(|| AppError::Conflict(DUPLICATE.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(detalle.into())
    }

    async fn list(&self) -> AppResult<Vec<DetallePedido>> {
        let rows: Vec<DetallePedidoRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM pedido_producto ORDER BY id_pedido, id_producto"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "list detalles_pedido"))?;

        Ok(rows.into_iter().map(DetallePedido::from).collect())
    }

    async fn find(&self, key: &ClaveDetallePedido) -> AppResult<Option<DetallePedido>> {
        let row: Option<DetallePedidoRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM pedido_producto WHERE id_producto = $1 AND id_pedido = $2"
        ))
        .bind(key.id_producto)
        .bind(key.id_pedido)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "find detalle_pedido"))?;

        Ok(row.map(DetallePedido::from))
    }

    async fn update(
        &self,
        key: &ClaveDetallePedido,
        patch: DetallePedidoPatch,
        audit: AuditEvent,
    ) -> AppResult<DetallePedido> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<DetallePedidoRow> = sqlx::query_as(&format!(
            r#"
            UPDATE pedido_producto
            SET cantidad = $3, precio = $4, total = $3 * $4
            WHERE id_producto = $1 AND id_pedido = $2
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key.id_producto)
        .bind(key.id_pedido)
        .bind(patch.cantidad)
        .bind(patch.precio)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            pg::map_write_error(error, "update detalle_pedido", DUPLICATE, BAD_REFERENCE)
        })?;

        let detalle = row.ok_or_else(|| AppError::NotFound(DetallePedido::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(detalle.into())
    }

    async fn delete(&self, key: &ClaveDetallePedido, audit: AuditEvent) -> AppResult<DetallePedido> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<DetallePedidoRow> = sqlx::query_as(&format!(
            r#"
            DELETE FROM pedido_producto
            WHERE id_producto = $1 AND id_pedido = $2
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key.id_producto)
        .bind(key.id_pedido)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            pg::map_write_error(error, "delete detalle_pedido", DUPLICATE, BAD_REFERENCE)
        })?;

        let detalle = row.ok_or_else(|| AppError::NotFound(DetallePedido::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(detalle.into())
    }
}
