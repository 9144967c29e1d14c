//! Shared helpers for the PostgreSQL stores.

use panaderia_application::AuditEvent;
use panaderia_core::{AppError, AppResult};
use sqlx::PgConnection;

/// Writes one audit event on the given connection. Called inside the
/// transaction of the mutation the event describes, so both commit or
/// roll back together.
pub(crate) async fn append_event(conn: &mut PgConnection, event: &AuditEvent) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO detalle_bitacora (id_bitacora, metodo, ruta, mensaje)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(event.id_bitacora)
    .bind(event.metodo.as_str())
    .bind(&event.ruta)
    .bind(&event.mensaje)
    .execute(conn)
    .await
    .map_err(|error| AppError::Internal(format!("failed to append audit event: {error}")))?;

    Ok(())
}

/// Maps a write error to the business error its constraint stands for:
/// unique violations become `Conflict`, foreign-key violations `Validation`.
pub(crate) fn map_write_error(
    error: sqlx::Error,
    operation: &str,
    on_unique: &str,
    on_reference: &str,
) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error {
        match database_error.code().as_deref() {
            Some("23505") => return AppError::Conflict(on_unique.to_owned()),
            Some("23503") => return AppError::Validation(on_reference.to_owned()),
            _ => {}
        }
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

pub(crate) fn query_error(error: sqlx::Error, operation: &str) -> AppError {
    AppError::Internal(format!("failed to {operation}: {error}"))
}

pub(crate) fn begin_error(error: sqlx::Error) -> AppError {
    AppError::Internal(format!("failed to begin transaction: {error}"))
}

pub(crate) fn commit_error(error: sqlx::Error) -> AppError {
    AppError::Internal(format!("failed to commit transaction: {error}"))
}
