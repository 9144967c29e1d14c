//! PostgreSQL-backed store for role permission lookups.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use panaderia_application::AuthorizationStore;
use panaderia_core::AppResult;

use crate::pg;

/// PostgreSQL implementation of the permission lookup used by the guard.
#[derive(Clone)]
pub struct PostgresAuthorizationStore {
    pool: PgPool,
}

impl PostgresAuthorizationStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionNameRow {
    nombre: String,
}

#[async_trait]
impl AuthorizationStore for PostgresAuthorizationStore {
    async fn permissions_for_role(&self, id_rol: i32) -> AppResult<BTreeSet<String>> {
        let rows = sqlx::query_as::<_, PermissionNameRow>(
            r#"
            SELECT p.nombre
            FROM permiso AS p
            INNER JOIN rol_permiso AS rp
                ON rp.id_permiso = p.id
            WHERE rp.id_rol = $1
            "#,
        )
        .bind(id_rol)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| pg::query_error(error, "load permissions for role"))?;

        Ok(rows.into_iter().map(|row| row.nombre).collect())
    }
}
