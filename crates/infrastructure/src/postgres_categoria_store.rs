//! PostgreSQL-backed category store.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{Categoria, CategoriaDraft, CategoriaPatch, Recurso};

use crate::pg;

const DUPLICATE: &str = "La categoría con este nombre ya existe.";
const HAS_PRODUCTS: &str = "La categoría tiene productos asociados.";

/// PostgreSQL implementation of the category store.
#[derive(Clone)]
pub struct PostgresCategoriaStore {
    pool: PgPool,
}

impl PostgresCategoriaStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoriaRow {
    id: i32,
    nombre: String,
    descripcion: Option<String>,
}

impl From<CategoriaRow> for Categoria {
    fn from(row: CategoriaRow) -> Self {
        Self {
            id: row.id,
            nombre: row.nombre,
            descripcion: row.descripcion,
        }
    }
}

#[async_trait]
impl EntityStore<Categoria> for PostgresCategoriaStore {
    async fn insert(&self, draft: CategoriaDraft, audit: AuditEvent) -> AppResult<Categoria> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<CategoriaRow> = sqlx::query_as(
            r#"
            INSERT INTO categoria (nombre, descripcion)
            VALUES ($1, $2)
            ON CONFLICT (nombre) DO NOTHING
            RETURNING id, nombre, descripcion
            "#,
        )
        .bind(&draft.nombre)
        .bind(&draft.descripcion)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "insert categoria", DUPLICATE, HAS_PRODUCTS))?;

        let categoria = row.ok_or_else(|| AppError::Conflict(DUPLICATE.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(categoria.into())
    }

    async fn list(&self) -> AppResult<Vec<Categoria>> {
        let rows: Vec<CategoriaRow> =
            sqlx::query_as("SELECT id, nombre, descripcion FROM categoria ORDER BY nombre")
                .fetch_all(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "list categorias"))?;

        Ok(rows.into_iter().map(Categoria::from).collect())
    }

    async fn find(&self, key: &i32) -> AppResult<Option<Categoria>> {
        let row: Option<CategoriaRow> =
            sqlx::query_as("SELECT id, nombre, descripcion FROM categoria WHERE id = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "find categoria"))?;

        Ok(row.map(Categoria::from))
    }

    async fn update(
        &self,
        key: &i32,
        patch: CategoriaPatch,
        audit: AuditEvent,
    ) -> AppResult<Categoria> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<CategoriaRow> = sqlx::query_as(
            r#"
            UPDATE categoria
            SET nombre = $2, descripcion = $3
            WHERE id = $1
            RETURNING id, nombre, descripcion
            "#,
        )
        .bind(key)
        .bind(&patch.nombre)
        .bind(&patch.descripcion)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "update categoria", DUPLICATE, HAS_PRODUCTS))?;

        let categoria = row.ok_or_else(|| AppError::NotFound(Categoria::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(categoria.into())
    }

    async fn delete(&self, key: &i32, audit: AuditEvent) -> AppResult<Categoria> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<CategoriaRow> = sqlx::query_as(
            r#"
            DELETE FROM categoria
            WHERE id = $1
            RETURNING id, nombre, descripcion
            "#,
        )
        .bind(key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "delete categoria", DUPLICATE, HAS_PRODUCTS))?;

        let categoria = row.ok_or_else(|| AppError::NotFound(Categoria::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(categoria.into())
    }
}
