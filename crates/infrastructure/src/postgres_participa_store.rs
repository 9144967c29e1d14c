//! PostgreSQL-backed store for production-run participations.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, EntityStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::{ClaveParticipa, Participa, ParticipaPatch, Recurso};

use crate::pg;

const DUPLICATE: &str = "El usuario ya está registrado en esta producción.";
const BAD_REFERENCE: &str = "El usuario o la producción indicada no existe.";

/// PostgreSQL implementation of the participation store.
#[derive(Clone)]
pub struct PostgresParticipaStore {
    pool: PgPool,
}

impl PostgresParticipaStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ParticipaRow {
    id_usuario: i32,
    id_produccion: i32,
    fecha: chrono::NaiveDate,
}

impl From<ParticipaRow> for Participa {
    fn from(row: ParticipaRow) -> Self {
        Self {
            id_usuario: row.id_usuario,
            id_produccion: row.id_produccion,
            fecha: row.fecha,
        }
    }
}

const COLUMNS: &str = "id_usuario, id_produccion, fecha";

#[async_trait]
impl EntityStore<Participa> for PostgresParticipaStore {
    async fn insert(&self, draft: Participa, audit: AuditEvent) -> AppResult<Participa> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<ParticipaRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO participa (id_usuario, id_produccion, fecha)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(draft.id_usuario)
        .bind(draft.id_produccion)
        .bind(draft.fecha)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "insert participa", DUPLICATE, BAD_REFERENCE))?;

        let participacion = row.ok_or_else(|| AppError::Conflict(DUPLICATE.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(participacion.into())
    }

    async fn list(&self) -> AppResult<Vec<Participa>> {
        let rows: Vec<ParticipaRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM participa ORDER BY fecha DESC"))
                .fetch_all(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "list participaciones"))?;

        Ok(rows.into_iter().map(Participa::from).collect())
    }

    async fn find(&self, key: &ClaveParticipa) -> AppResult<Option<Participa>> {
        let row: Option<ParticipaRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM participa WHERE id_usuario = $1 AND id_produccion = $2"
        ))
        .bind(key.id_usuario)
        .bind(key.id_produccion)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "find participa"))?;

        Ok(row.map(Participa::from))
    }

    async fn update(
        &self,
        key: &ClaveParticipa,
        patch: ParticipaPatch,
        audit: AuditEvent,
    ) -> AppResult<Participa> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<ParticipaRow> = sqlx::query_as(&format!(
            r#"
            UPDATE participa
            SET fecha = $3
            WHERE id_usuario = $1 AND id_produccion = $2
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key.id_usuario)
        .bind(key.id_produccion)
        .bind(patch.fecha)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "update participa", DUPLICATE, BAD_REFERENCE))?;

        let participacion = row.ok_or_else(|| AppError::NotFound(Participa::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(participacion.into())
    }

    async fn delete(&self, key: &ClaveParticipa, audit: AuditEvent) -> AppResult<Participa> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<ParticipaRow> = sqlx::query_as(&format!(
            r#"
            DELETE FROM participa
            WHERE id_usuario = $1 AND id_produccion = $2
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(key.id_usuario)
        .bind(key.id_produccion)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "delete participa", DUPLICATE, BAD_REFERENCE))?;

        let participacion = row.ok_or_else(|| AppError::NotFound(Participa::NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(participacion.into())
    }
}
