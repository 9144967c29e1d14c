//! PostgreSQL-backed sales-order store.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{Pedido, PedidoDraft, PedidoPatch, Recurso};

use crate::pg;

const DUPLICATE: &str = "El pedido ya existe.";
const BAD_CLIENT: &str = "El cliente indicado no existe.";

/// PostgreSQL implementation of the sales-order store.
#[derive(Clone)]
pub struct PostgresPedidoStore {
    pool: PgPool,
}

impl PostgresPedidoStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PedidoRow {
    id: i32,
    fecha_pedido: chrono::NaiveDate,
    pagado: bool,
    fecha_entrega: chrono::NaiveDate,
    tipo: String,
    total: f64,
    ci_cliente: String,
    entregado: bool,
}

impl From<PedidoRow> for Pedido {
    fn from(row: PedidoRow) -> Self {
        Self {
            id: row.id,
            fecha_pedido: row.fecha_pedido,
            pagado: row.pagado,
            fecha_entrega: row.fecha_entrega,
            tipo: row.tipo,
            total: row.total,
            ci_cliente: row.ci_cliente,
            entregado: row.entregado,
        }
    }
}

const COLUMNS: &str = "id, fecha_pedido, pagado, fecha_entrega, tipo, total, ci_cliente, entregado";

#[async_trait]
impl EntityStore<Pedido> for PostgresPedidoStore {
    async fn insert(&self, draft: PedidoDraft, audit: AuditEvent) -> AppResult<Pedido> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        // New orders always start undelivered.
        let row: PedidoRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO pedido (fecha_pedido, pagado, fecha_entrega, tipo, total, ci_cliente, entregado)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(draft.fecha_pedido)
        .bind(draft.pagado)
        .bind(draft.fecha_entrega)
        .bind(&draft.tipo)
        .bind(draft.total)
        .bind(&draft.ci_cliente)
        .fetch_one(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "insert pedido", DUPLICATE, BAD_CLIENT))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(row.into())
    }

    async fn list(&self) -> AppResult<Vec<Pedido>> {
        let rows: Vec<PedidoRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM pedido ORDER BY fecha_pedido DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "list pedidos"))?;

        Ok(rows.into_iter().map(Pedido::from).collect())
    }

    async fn find(&self, key: &i32) -> AppResult<Option<Pedido>> {
        let row: Option<PedidoRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM pedido WHERE id = $1"))
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "find pedido"))?;

        Ok(row.map(Pedido::from))
    }

    async fn update(&self, key: &i32, patch: PedidoPatch, audit: AuditEvent) -> AppResult<Pedido> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<PedidoRow> = sqlx::query_as(&format!(
            r#"
            UPDATE pedido
            SET pagado = $2, fecha_entrega = $3, tipo = $4, total = $5, entregado = $6
            WHERE id = $1
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key)
        .bind(patch.pagado)
        .bind(patch.fecha_entrega)
        .bind(&patch.tipo)
        .bind(patch.total)
        .bind(patch.entregado)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "update pedido", DUPLICATE, BAD_CLIENT))?;

        let pedido = row.ok_or_else(|| AppError::NotFound(Pedido::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(pedido.into())
    }

    async fn delete(&self, key: &i32, audit: AuditEvent) -> AppResult<Pedido> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<PedidoRow> = sqlx::query_as(&format!(
            r#"
            DELETE FROM pedido
            WHERE id = $1
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "delete pedido", DUPLICATE, BAD_CLIENT))?;

        let pedido = row.ok_or_else(|| AppError::NotFound(Pedido::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(pedido.into())
    }
}
