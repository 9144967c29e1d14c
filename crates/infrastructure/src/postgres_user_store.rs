//! PostgreSQL-backed user account store.

use async_trait::async_trait;
use sqlx::PgPool;

use panaderia_application::{AuditEvent, UserRecord, UserStore};
use panaderia_core::{AppError, AppResult};
use panaderia_domain::Usuario;

use crate::pg;

const DUPLICATE: &str = "El usuario con este nombre ya existe.";
const BAD_ROLE: &str = "El rol indicado no existe.";
const NOT_FOUND: &str = "Usuario no encontrado";

/// PostgreSQL implementation of the user store.
#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns how many accounts exist. Used by the startup bootstrap to
    /// decide whether to seed the first administrator.
    pub async fn count(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM usuario")
            .fetch_one(&self.pool)
            .await
            .map_err(|error| pg::query_error(error, "count usuarios"))?;

        Ok(count)
    }

    /// Inserts a user outside any audit session. Only the startup bootstrap
    /// uses this; API writes go through [`UserStore::insert`].
    pub async fn insert_unaudited(
        &self,
        nombre: &str,
        contrasena_hash: &str,
        id_rol: i32,
    ) -> AppResult<Usuario> {
        let row: Option<UsuarioRow> = sqlx::query_as(
            r#"
            INSERT INTO usuario (nombre, contrasena, id_rol)
            VALUES ($1, $2, $3)
            ON CONFLICT (nombre) DO NOTHING
            RETURNING id, nombre, id_rol
            "#,
        )
        .bind(nombre)
        .bind(contrasena_hash)
        .bind(id_rol)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| pg::map_write_error(error, "insert usuario", DUPLICATE, BAD_ROLE))?;

        let usuario = row.ok_or_else(|| AppError::Conflict(DUPLICATE.to_owned()))?;
        Ok(usuario.into())
    }
}

#[derive(sqlx::FromRow)]
struct UsuarioRow {
    id: i32,
    nombre: String,
    id_rol: i32,
}

impl From<UsuarioRow> for Usuario {
    fn from(row: UsuarioRow) -> Self {
        Self {
            id: row.id,
            nombre: row.nombre,
            id_rol: row.id_rol,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRecordRow {
    id: i32,
    nombre: String,
    contrasena: String,
    id_rol: i32,
}

impl From<UserRecordRow> for UserRecord {
    fn from(row: UserRecordRow) -> Self {
        Self {
            id: row.id,
            nombre: row.nombre,
            contrasena_hash: row.contrasena,
            id_rol: row.id_rol,
        }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_nombre(&self, nombre: &str) -> AppResult<Option<UserRecord>> {
        let row: Option<UserRecordRow> = sqlx::query_as(
            "SELECT id, nombre, contrasena, id_rol FROM usuario WHERE nombre = $1",
        )
        .bind(nombre)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "find usuario by nombre"))?;

        Ok(row.map(UserRecord::from))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<UserRecord>> {
        let row: Option<UserRecordRow> =
            sqlx::query_as("SELECT id, nombre, contrasena, id_rol FROM usuario WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "find usuario by id"))?;

        Ok(row.map(UserRecord::from))
    }

    async fn insert(
        &self,
        nombre: &str,
        contrasena_hash: &str,
        id_rol: i32,
        audit: AuditEvent,
    ) -> AppResult<Usuario> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<UsuarioRow> = sqlx::query_as(
            r#"
            INSERT INTO usuario (nombre, contrasena, id_rol)
            VALUES ($1, $2, $3)
            ON CONFLICT (nombre) DO NOTHING
            RETURNING id, nombre, id_rol
            "#,
        )
        .bind(nombre)
        .bind(contrasena_hash)
        .bind(id_rol)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "insert usuario", DUPLICATE, BAD_ROLE))?;

        let usuario = row.ok_or_else(|| AppError::Conflict(DUPLICATE.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(usuario.into())
    }

    async fn list(&self) -> AppResult<Vec<Usuario>> {
        let rows: Vec<UsuarioRow> =
            sqlx::query_as("SELECT id, nombre, id_rol FROM usuario ORDER BY nombre")
                .fetch_all(&self.pool)
                .await
                .map_err(|error| pg::query_error(error, "list usuarios"))?;

        Ok(rows.into_iter().map(Usuario::from).collect())
    }

    async fn update(
        &self,
        nombre: &str,
        id_rol: i32,
        contrasena_hash: Option<&str>,
        audit: AuditEvent,
    ) -> AppResult<Usuario> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<UsuarioRow> = sqlx::query_as(
            r#"
            UPDATE usuario
            SET id_rol = $2, contrasena = COALESCE($3, contrasena)
            WHERE nombre = $1
            RETURNING id, nombre, id_rol
            "#,
        )
        .bind(nombre)
        .bind(id_rol)
        .bind(contrasena_hash)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| pg::map_write_error(error, "update usuario", DUPLICATE, BAD_ROLE))?;

        let usuario = row.ok_or_else(|| AppError::NotFound(NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(usuario.into())
    }

    async fn update_password(
        &self,
        id: i32,
        contrasena_hash: &str,
        audit: AuditEvent,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let result = sqlx::query("UPDATE usuario SET contrasena = $2 WHERE id = $1")
            .bind(id)
            .bind(contrasena_hash)
            .execute(&mut *tx)
            .await
            .map_err(|error| pg::query_error(error, "update contrasena"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(NOT_FOUND.to_owned()));
        }

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(())
    }

    async fn delete(&self, nombre: &str, audit: AuditEvent) -> AppResult<Usuario> {
        let mut tx = self.pool.begin().await.map_err(pg::begin_error)?;

        let row: Option<UsuarioRow> = sqlx::query_as(
            r#"
            DELETE FROM usuario
            WHERE nombre = $1
            RETURNING id, nombre, id_rol
            "#,
        )
        .bind(nombre)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|error| {
            pg::map_write_error(
                error,
                "delete usuario",
                DUPLICATE,
                "El usuario tiene bitácoras asociadas.",
            )
        })?;

        let usuario = row.ok_or_else(|| AppError::NotFound(NOT_FOUND.to_owned()))?;

        pg::append_event(&mut tx, &audit).await?;
        tx.commit().await.map_err(pg::commit_error)?;

        Ok(usuario.into())
    }
}
