//! PostgreSQL-backed audit trail: session lifecycle and event append.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;

use panaderia_application::{AuditEvent, AuditStore, SessionStore};
use panaderia_core::AppResult;
use panaderia_domain::{Bitacora, DetalleBitacora};

use crate::pg;

/// PostgreSQL implementation of the audit ports. Read operations append
/// their events here; mutations write theirs inside the store transaction.
#[derive(Clone)]
pub struct PostgresAuditStore {
    pool: PgPool,
}

impl PostgresAuditStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BitacoraRow {
    id: i64,
    id_usuario: i32,
    usuario: String,
    ip: String,
    fecha_inicio: NaiveDate,
    hora_inicio: NaiveTime,
    fecha_fin: Option<NaiveDate>,
    hora_fin: Option<NaiveTime>,
}

impl From<BitacoraRow> for Bitacora {
    fn from(row: BitacoraRow) -> Self {
        Self {
            id: row.id,
            id_usuario: row.id_usuario,
            usuario: row.usuario,
            ip: row.ip,
            fecha_inicio: row.fecha_inicio,
            hora_inicio: row.hora_inicio,
            fecha_fin: row.fecha_fin,
            hora_fin: row.hora_fin,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DetalleRow {
    id: i64,
    id_bitacora: i64,
    metodo: String,
    ruta: String,
    mensaje: String,
    fecha: DateTime<Utc>,
    usuario: String,
}

impl From<DetalleRow> for DetalleBitacora {
    fn from(row: DetalleRow) -> Self {
        Self {
            id: row.id,
            id_bitacora: row.id_bitacora,
            metodo: row.metodo,
            ruta: row.ruta,
            mensaje: row.mensaje,
            fecha: row.fecha,
            usuario: row.usuario,
        }
    }
}

#[async_trait]
impl AuditStore for PostgresAuditStore {
    async fn append(&self, event: AuditEvent) -> AppResult<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|error| pg::query_error(error, "acquire connection"))?;

        pg::append_event(&mut conn, &event).await
    }
}

#[async_trait]
impl SessionStore for PostgresAuditStore {
    async fn open(&self, id_usuario: i32, ip: &str) -> AppResult<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO bitacora (id_usuario, ip, fecha_inicio, hora_inicio)
            VALUES ($1, $2, CURRENT_DATE, CURRENT_TIME)
            RETURNING id
            "#,
        )
        .bind(id_usuario)
        .bind(ip)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "open bitacora"))?;

        Ok(id)
    }

    async fn close(&self, id: i64) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE bitacora
            SET fecha_fin = CURRENT_DATE, hora_fin = CURRENT_TIME
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "close bitacora"))?;

        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Bitacora>> {
        let rows: Vec<BitacoraRow> = sqlx::query_as(
            r#"
            SELECT b.id, b.id_usuario, u.nombre AS usuario, b.ip,
                   b.fecha_inicio, b.hora_inicio, b.fecha_fin, b.hora_fin
            FROM bitacora AS b
            INNER JOIN usuario AS u ON u.id = b.id_usuario
            ORDER BY b.fecha_inicio DESC, b.hora_inicio DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "list bitacoras"))?;

        Ok(rows.into_iter().map(Bitacora::from).collect())
    }

    async fn find(&self, id: i64) -> AppResult<Option<Bitacora>> {
        let row: Option<BitacoraRow> = sqlx::query_as(
            r#"
            SELECT b.id, b.id_usuario, u.nombre AS usuario, b.ip,
                   b.fecha_inicio, b.hora_inicio, b.fecha_fin, b.hora_fin
            FROM bitacora AS b
            INNER JOIN usuario AS u ON u.id = b.id_usuario
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "find bitacora"))?;

        Ok(row.map(Bitacora::from))
    }

    async fn list_events(&self, id_bitacora: i64) -> AppResult<Vec<DetalleBitacora>> {
        let rows: Vec<DetalleRow> = sqlx::query_as(
            r#"
            SELECT d.id, d.id_bitacora, d.metodo, d.ruta, d.mensaje, d.fecha,
                   u.nombre AS usuario
            FROM detalle_bitacora AS d
            INNER JOIN bitacora AS b ON b.id = d.id_bitacora
            INNER JOIN usuario AS u ON u.id = b.id_usuario
            WHERE d.id_bitacora = $1
            ORDER BY d.fecha DESC
            "#,
        )
        .bind(id_bitacora)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "list detalle_bitacora"))?;

        Ok(rows.into_iter().map(DetalleBitacora::from).collect())
    }
}
