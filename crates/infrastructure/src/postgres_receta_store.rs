//! PostgreSQL-backed recipe store.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{Receta, RecetaDraft, RecetaPatch, Recurso};

use crate::pg;

const DUPLICATE: &str = "El producto ya tiene una receta.";
const BAD_PRODUCT: &str = "El producto indicado no existe.";

/// PostgreSQL implementation of the recipe store. The unique index on
/// `id_producto` enforces the one-recipe-per-product rule.
#[derive(Clone)]
pub struct PostgresRecetaStore {
    pool: PgPool,
}

impl PostgresRecetaStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RecetaRow {
    id: i32,
    id_producto: i32,
    nombre: String,
    tiempo: i32,
    descripcion: Option<String>,
}

impl From<RecetaRow> for Receta {
    fn from(row: RecetaRow) -> Self {
        Self {
            id: row.id,
            id_producto: row.id_producto,
            nombre: row.nombre,
            tiempo: row.tiempo,
            descripcion: row.descripcion,
        }
    }
}

#[async_trait]
impl EntityStore<Receta> for PostgresRecetaStore {
    async fn insert(&self, draft: RecetaDraft, audit: AuditEvent) -> AppResult<Receta> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<RecetaRow> = sqlx::query_as(
            r#"
            INSERT INTO receta (id_producto, nombre, tiempo, descripcion)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id_producto) DO NOTHING
            RETURNING id, id_producto, nombre, tiempo, descripcion
            "#,
        )
        .bind(draft.id_producto)
        .bind(&draft.nombre)
        .bind(draft.tiempo)
        .bind(&draft.descripcion)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "insert receta", DUPLICATE, BAD_PRODUCT))?;

        let receta = row.ok_or_else(|| AppError::Conflict(DUPLICATE.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(receta.into())
    }

    async fn list(&self) -> AppResult<Vec<Receta>> {
        let rows: Vec<RecetaRow> = sqlx::query_as(
            "SELECT id, id_producto, nombre, tiempo, descripcion FROM receta ORDER BY nombre",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "list recetas"))?;

        Ok(rows.into_iter().map(Receta::from).collect())
    }

    async fn find(&self, key: &i32) -> AppResult<Option<Receta>> {
        let row: Option<RecetaRow> = sqlx::query_as(
            "SELECT id, id_producto, nombre, tiempo, descripcion FROM receta WHERE id = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "find receta"))?;

        Ok(row.map(Receta::from))
    }

    async fn update(&self, key: &i32, patch: RecetaPatch, audit: AuditEvent) -> AppResult<Receta> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<RecetaRow> = sqlx::query_as(
            r#"
            UPDATE receta
            SET nombre = $2, tiempo = $3, descripcion = $4
            WHERE id = $1
            RETURNING id, id_producto, nombre, tiempo, descripcion
            "#,
        )
        .bind(key)
        .bind(&patch.nombre)
        .bind(patch.tiempo)
        .bind(&patch.descripcion)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "update receta", DUPLICATE, BAD_PRODUCT))?;

        let receta = row.ok_or_else(|| AppError::NotFound(Receta::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(receta.into())
    }

    async fn delete(&self, key: &i32, audit: AuditEvent) -> AppResult<Receta> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<RecetaRow> = sqlx::query_as(
            r#"
            DELETE FROM receta
            WHERE id = $1
            RETURNING id, id_producto, nombre, tiempo, descripcion
            "#,
        )
        .bind(key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "delete receta", DUPLICATE, BAD_PRODUCT))?;

        let receta = row.ok_or_else(|| AppError::NotFound(Receta::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(receta.into())
    }
}
