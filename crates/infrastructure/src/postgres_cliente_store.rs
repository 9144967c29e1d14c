//! PostgreSQL-backed client store.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{Cliente, ClientePatch, Recurso};

use crate::pg;

const DUPLICATE: &str = "El cliente con este CI ya existe.";
const HAS_ORDERS: &str = "El cliente tiene pedidos asociados.";

/// PostgreSQL implementation of the client store.
#[derive(Clone)]
pub struct PostgresClienteStore {
    pool: PgPool,
}

impl PostgresClienteStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ClienteRow {
    ci: String,
    nombre: String,
    sexo: String,
    telefono: String,
}

impl From<ClienteRow> for Cliente {
    fn from(row: ClienteRow) -> Self {
        Self {
            ci: row.ci,
            nombre: row.nombre,
            sexo: row.sexo,
            telefono: row.telefono,
        }
    }
}

#[async_trait]
impl EntityStore<Cliente> for PostgresClienteStore {
    async fn insert(&self, draft: Cliente, audit: AuditEvent) -> AppResult<Cliente> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<ClienteRow> = sqlx::query_as(
            r#"
            INSERT INTO cliente (ci, nombre, sexo, telefono)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (ci) DO NOTHING
            RETURNING ci, nombre, sexo, telefono
            "#,
        )
        .bind(&draft.ci)
        .bind(&draft.nombre)
        .bind(&draft.sexo)
        .bind(&draft.telefono)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "insert cliente", DUPLICATE, HAS_ORDERS))?;

        let cliente = row.ok_or_else(|| AppError::Conflict(DUPLICATE.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(cliente.into())
    }

    async fn list(&self) -> AppResult<Vec<Cliente>> {
        let rows: Vec<ClienteRow> =
            sqlx::query_as("SELECT ci, nombre, sexo, telefono FROM cliente ORDER BY nombre")
                .fetch_all(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "list clientes"))?;

        Ok(rows.into_iter().map(Cliente::from).collect())
    }

    async fn find(&self, key: &String) -> AppResult<Option<Cliente>> {
        let row: Option<ClienteRow> =
            sqlx::query_as("SELECT ci, nombre, sexo, telefono FROM cliente WHERE ci = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "find cliente"))?;

        Ok(row.map(Cliente::from))
    }

    async fn update(
        &self,
        key: &String,
        patch: ClientePatch,
        audit: AuditEvent,
    ) -> AppResult<Cliente> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<ClienteRow> = sqlx::query_as(
            r#"
            UPDATE cliente
            SET nombre = $2, sexo = $3, telefono = $4
            WHERE ci = $1
            RETURNING ci, nombre, sexo, telefono
            "#,
        )
        .bind(key)
        .bind(&patch.nombre)
        .bind(&patch.sexo)
        .bind(&patch.telefono)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "update cliente", DUPLICATE, HAS_ORDERS))?;

        let cliente = row.ok_or_else(|| AppError::NotFound(Cliente::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(cliente.into())
    }

    async fn delete(&self, key: &String, audit: AuditEvent) -> AppResult<Cliente> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<ClienteRow> = sqlx::query_as(
            r#"
            DELETE FROM cliente
            WHERE ci = $1
            RETURNING ci, nombre, sexo, telefono
            "#,
        )
        .bind(key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "delete cliente", DUPLICATE, HAS_ORDERS))?;

        let cliente = row.ok_or_else(|| AppError::NotFound(Cliente::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(cliente.into())
    }
}
