//! PostgreSQL-backed purchase-note store.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{NotaCompra, NotaCompraDraft, Recurso};

use crate::pg;

const DUPLICATE: &str = "La nota de compra ya existe.";
const BAD_REFERENCE: &str = "El usuario o el proveedor indicado no existe.";

/// PostgreSQL implementation of the purchase-note store.
#[derive(Clone)]
pub struct PostgresNotaCompraStore {
    pool: PgPool,
}

impl PostgresNotaCompraStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct NotaCompraRow {
    id: i32,
    fecha_pedido: chrono::NaiveDate,
    fecha_entrega: chrono::NaiveDate,
    id_usuario: i32,
    codigo_proveedor: String,
}

impl From<NotaCompraRow> for NotaCompra {
    fn from(row: NotaCompraRow) -> Self {
        Self {
            id: row.id,
            fecha_pedido: row.fecha_pedido,
            fecha_entrega: row.fecha_entrega,
            id_usuario: row.id_usuario,
            codigo_proveedor: row.codigo_proveedor,
        }
    }
}

const COLUMNS: &str = "id, fecha_pedido, fecha_entrega, id_usuario, codigo_proveedor";

#[async_trait]
impl EntityStore<NotaCompra> for PostgresNotaCompraStore {
    async fn insert(&self, draft: NotaCompraDraft, audit: AuditEvent) -> AppResult<NotaCompra> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: NotaCompraRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO nota_compra (fecha_pedido, fecha_entrega, id_usuario, codigo_proveedor)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(draft.fecha_pedido)
        .bind(draft.fecha_entrega)
        .bind(draft.id_usuario)
        .bind(&draft.codigo_proveedor)
        .fetch_one(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "insert nota_compra", DUPLICATE, BAD_REFERENCE))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(row.into())
    }

    async fn list(&self) -> AppResult<Vec<NotaCompra>> {
        let rows: Vec<NotaCompraRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM nota_compra ORDER BY id DESC"))
                .fetch_all(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "list notas_compra"))?;

        Ok(rows.into_iter().map(NotaCompra::from).collect())
    }

    async fn find(&self, key: &i32) -> AppResult<Option<NotaCompra>> {
        let row: Option<NotaCompraRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM nota_compra WHERE id = $1"))
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "find nota_compra"))?;

        Ok(row.map(NotaCompra::from))
    }

    async fn update(
        &self,
        key: &i32,
        patch: NotaCompraDraft,
        audit: AuditEvent,
    ) -> AppResult<NotaCompra> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<NotaCompraRow> = sqlx::query_as(&format!(
            r#"
            UPDATE nota_compra
            SET fecha_pedido = $2, fecha_entrega = $3, id_usuario = $4, codigo_proveedor = $5
            WHERE id = $1
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key)
        .bind(patch.fecha_pedido)
        .bind(patch.fecha_entrega)
        .bind(patch.id_usuario)
        .bind(&patch.codigo_proveedor)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "update nota_compra", DUPLICATE, BAD_REFERENCE))?;

        let nota = row.ok_or_else(|| AppError::NotFound(NotaCompra::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(nota.into())
    }

    async fn delete(&self, key: &i32, audit: AuditEvent) -> AppResult<NotaCompra> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<NotaCompraRow> = sqlx::query_as(&format!(
            r#"
            DELETE FROM nota_compra
            WHERE id = $1
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            pg::map_write_error(
                error,
                "delete nota_compra",
                DUPLICATE,
                "La nota de compra tiene líneas asociadas.",
            )
        })?;

        let nota = row.ok_or_else(|| AppError::NotFound(NotaCompra::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(nota.into())
    }
}
