//! PostgreSQL-backed production-run store.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{Produccion, ProduccionDraft, Recurso};

use crate::pg;

const DUPLICATE: &str = "La producción ya existe.";
const BAD_RECIPE: &str = "La receta especificada no existe.";

/// PostgreSQL implementation of the production-run store.
#[derive(Clone)]
pub struct PostgresProduccionStore {
    pool: PgPool,
}

impl PostgresProduccionStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProduccionRow {
    id: i32,
    descripcion: String,
    fecha: chrono::NaiveDate,
    hora_inicio: chrono::NaiveTime,
    terminado: bool,
    id_receta: i32,
}

impl From<ProduccionRow> for Produccion {
    fn from(row: ProduccionRow) -> Self {
        Self {
            id: row.id,
            descripcion: row.descripcion,
            fecha: row.fecha,
            hora_inicio: row.hora_inicio,
            terminado: row.terminado,
            id_receta: row.id_receta,
        }
    }
}

const COLUMNS: &str = "id, descripcion, fecha, hora_inicio, terminado, id_receta";

#[async_trait]
impl EntityStore<Produccion> for PostgresProduccionStore {
    async fn insert(&self, draft: ProduccionDraft, audit: AuditEvent) -> AppResult<Produccion> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: ProduccionRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO produccion (descripcion, fecha, hora_inicio, terminado, id_receta)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(&draft.descripcion)
        .bind(draft.fecha)
        .bind(draft.hora_inicio)
        .bind(draft.terminado)
        .bind(draft.id_receta)
        .fetch_one(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "insert produccion", DUPLICATE, BAD_RECIPE))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(row.into())
    }

    async fn list(&self) -> AppResult<Vec<Produccion>> {
        let rows: Vec<ProduccionRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM produccion ORDER BY fecha DESC, hora_inicio DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "list producciones"))?;

        Ok(rows.into_iter().map(Produccion::from).collect())
    }

    async fn find(&self, key: &i32) -> AppResult<Option<Produccion>> {
        let row: Option<ProduccionRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM produccion WHERE id = $1"))
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "find produccion"))?;

        Ok(row.map(Produccion::from))
    }

    async fn update(
        &self,
        key: &i32,
        patch: ProduccionDraft,
        audit: AuditEvent,
    ) -> AppResult<Produccion> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<ProduccionRow> = sqlx::query_as(&format!(
            r#"
            UPDATE produccion
            SET descripcion = $2, fecha = $3, hora_inicio = $4, terminado = $5, id_receta = $6
            WHERE id = $1
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key)
        .bind(&patch.descripcion)
        .bind(patch.fecha)
        .bind(patch.hora_inicio)
        .bind(patch.terminado)
        .bind(patch.id_receta)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "update produccion", DUPLICATE, BAD_RECIPE))?;

        let produccion = row.ok_or_else(|| AppError::NotFound(Produccion::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(produccion.into())
    }

    async fn delete(&self, key: &i32, audit: AuditEvent) -> AppResult<Produccion> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<ProduccionRow> = sqlx::query_as(&format!(
            r#"
            DELETE FROM produccion
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
                "delete produccion",
                DUPLICATE,
                "La producción tiene participaciones asociadas.",
            )
        })?;

        let produccion = row.ok_or_else(|| AppError::NotFound(Produccion::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(produccion.into())
    }
}
