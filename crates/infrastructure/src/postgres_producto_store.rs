//! PostgreSQL-backed product store.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{Producto, ProductoDraft, ProductoPatch, Recurso};

use crate::pg;

const DUPLICATE: &str = "El producto con este nombre ya existe.";
const BAD_CATEGORY: &str = "La categoría indicada no existe.";
const HAS_RECIPE: &str = "El producto tiene una receta asociada.";

/// PostgreSQL implementation of the product store.
#[derive(Clone)]
pub struct PostgresProductoStore {
    pool: PgPool,
}

impl PostgresProductoStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductoRow {
    id: i32,
    nombre: String,
    precio: f64,
    stock: i32,
    stock_minimo: i32,
    id_categoria: i32,
}

impl From<ProductoRow> for Producto {
    fn from(row: ProductoRow) -> Self {
        Self {
            id: row.id,
            nombre: row.nombre,
            precio: row.precio,
            stock: row.stock,
            stock_minimo: row.stock_minimo,
            id_categoria: row.id_categoria,
        }
    }
}

#[async_trait]
impl EntityStore<Producto> for PostgresProductoStore {
    async fn insert(&self, draft: ProductoDraft, audit: AuditEvent) -> AppResult<Producto> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<ProductoRow> = sqlx::query_as(
            r#"
            INSERT INTO producto (nombre, precio, stock, stock_minimo, id_categoria)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (nombre) DO NOTHING
            RETURNING id, nombre, precio, stock, stock_minimo, id_categoria
            "#,
        )
        .bind(&draft.nombre)
        .bind(draft.precio)
        .bind(draft.stock)
        .bind(draft.stock_minimo)
        .bind(draft.id_categoria)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "insert producto", DUPLICATE, BAD_CATEGORY))?;

        let producto = row.ok_or_else(|| AppError::Conflict(DUPLICATE.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(producto.into())
    }

    async fn list(&self) -> AppResult<Vec<Producto>> {
        let rows: Vec<ProductoRow> = sqlx::query_as(
            "SELECT id, nombre, precio, stock, stock_minimo, id_categoria FROM producto ORDER BY nombre",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "list productos"))?;

        Ok(rows.into_iter().map(Producto::from).collect())
    }

    async fn find(&self, key: &i32) -> AppResult<Option<Producto>> {
        let row: Option<ProductoRow> = sqlx::query_as(
            "SELECT id, nombre, precio, stock, stock_minimo, id_categoria FROM producto WHERE id = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "find producto"))?;

        Ok(row.map(Producto::from))
    }

    async fn update(
        &self,
        key: &i32,
        patch: ProductoPatch,
        audit: AuditEvent,
    ) -> AppResult<Producto> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<ProductoRow> = sqlx::query_as(
            r#"
            UPDATE producto
            SET nombre = $2, precio = $3, stock = $4, stock_minimo = $5, id_categoria = $6
            WHERE id = $1
            RETURNING id, nombre, precio, stock, stock_minimo, id_categoria
            "#,
        )
        .bind(key)
        .bind(&patch.nombre)
        .bind(patch.precio)
        .bind(patch.stock)
        .bind(patch.stock_minimo)
        .bind(patch.id_categoria)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "update producto", DUPLICATE, BAD_CATEGORY))?;

        let producto = row.ok_or_else(|| AppError::NotFound(Producto::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(producto.into())
    }

    async fn delete(&self, key: &i32, audit: AuditEvent) -> AppResult<Producto> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<ProductoRow> = sqlx::query_as(
            r#"
            DELETE FROM producto
            WHERE id = $1
            RETURNING id, nombre, precio, stock, stock_minimo, id_categoria
            "#,
        )
        .bind(key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "delete producto", DUPLICATE, HAS_RECIPE))?;

        let producto = row.ok_or_else(|| AppError::NotFound(Producto::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(producto.into())
    }
}
