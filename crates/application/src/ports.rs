use std::collections::BTreeSet;

use async_trait::async_trait;
use panaderia_core::{AppResult, AuthenticatedUser};
use panaderia_domain::{
    Bitacora, DetalleBitacora, Metodo, Permiso, Recurso, RolPermiso, Usuario,
};

/// Write-side audit event. `fecha` is assigned by the datastore on append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Audit-session correlation id from the actor's token.
    pub id_bitacora: i64,
    /// HTTP verb tag.
    pub metodo: Metodo,
    /// Resource path, e.g. `api/cliente/V123`.
    pub ruta: String,
    /// Free-text event message.
    pub mensaje: String,
}

impl AuditEvent {
    /// Builds an event attributed to the given actor.
    #[must_use]
    pub fn new(
        actor: &AuthenticatedUser,
        metodo: Metodo,
        ruta: impl Into<String>,
        mensaje: impl Into<String>,
    ) -> Self {
        Self {
            id_bitacora: actor.id_bitacora(),
            metodo,
            ruta: ruta.into(),
            mensaje: mensaje.into(),
        }
    }
}

/// Append-only sink for audit events emitted by read operations.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Appends one event. A failure fails the request that emitted it.
    async fn append(&self, event: AuditEvent) -> AppResult<()>;
}

/// Persistence port for one entity type.
///
/// Mutating operations receive the audit event describing them and must
/// persist it atomically with the mutation: if the event cannot be written,
/// the mutation rolls back. Uniqueness and existence are enforced by the
/// store itself through conditional writes, never by a separate read.
#[async_trait]
pub trait EntityStore<E: Recurso>: Send + Sync {
    /// Inserts a row. Fails with `Conflict` when the business key is taken
    /// and with `Validation` when a referenced row does not exist.
    async fn insert(&self, draft: E::Draft, audit: AuditEvent) -> AppResult<E>;

    /// Returns all rows in stable display order.
    async fn list(&self) -> AppResult<Vec<E>>;

    /// Returns the row with the given key, if any.
    async fn find(&self, key: &E::Key) -> AppResult<Option<E>>;

    /// Overwrites the mutable fields of a row. Fails with `NotFound` when no
    /// row matches. Returns the updated row.
    async fn update(&self, key: &E::Key, patch: E::Patch, audit: AuditEvent) -> AppResult<E>;

    /// Removes a row. Fails with `NotFound` when no row matches. Returns the
    /// removed row.
    async fn delete(&self, key: &E::Key, audit: AuditEvent) -> AppResult<E>;
}

/// Permission lookups for the guard.
#[async_trait]
pub trait AuthorizationStore: Send + Sync {
    /// Returns the permission names granted to a role. An unknown role has
    /// an empty set.
    async fn permissions_for_role(&self, id_rol: i32) -> AppResult<BTreeSet<String>>;
}

/// Audit-session lifecycle and read access to the trail.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Opens a session for a user at login. Returns the session id.
    async fn open(&self, id_usuario: i32, ip: &str) -> AppResult<i64>;

    /// Marks a session closed at logout.
    async fn close(&self, id: i64) -> AppResult<()>;

    /// Returns all sessions, most recent first.
    async fn list(&self) -> AppResult<Vec<Bitacora>>;

    /// Returns one session, if any.
    async fn find(&self, id: i64) -> AppResult<Option<Bitacora>>;

    /// Returns the events of one session, most recent first.
    async fn list_events(&self, id_bitacora: i64) -> AppResult<Vec<DetalleBitacora>>;
}

/// User row including the credential hash. Only the persistence and auth
/// layers ever see this shape.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// User id.
    pub id: i32,
    /// Username.
    pub nombre: String,
    /// Argon2id password hash.
    pub contrasena_hash: String,
    /// Assigned role.
    pub id_rol: i32,
}

/// Persistence port for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by username.
    async fn find_by_nombre(&self, nombre: &str) -> AppResult<Option<UserRecord>>;

    /// Finds a user by id.
    async fn find_by_id(&self, id: i32) -> AppResult<Option<UserRecord>>;

    /// Creates a user. Fails with `Conflict` when the username is taken.
    async fn insert(
        &self,
        nombre: &str,
        contrasena_hash: &str,
        id_rol: i32,
        audit: AuditEvent,
    ) -> AppResult<Usuario>;

    /// Returns all users ordered by username.
    async fn list(&self) -> AppResult<Vec<Usuario>>;

    /// Updates role and, when given, the credential hash of a user.
    async fn update(
        &self,
        nombre: &str,
        id_rol: i32,
        contrasena_hash: Option<&str>,
        audit: AuditEvent,
    ) -> AppResult<Usuario>;

    /// Replaces the credential hash of a user.
    async fn update_password(
        &self,
        id: i32,
        contrasena_hash: &str,
        audit: AuditEvent,
    ) -> AppResult<()>;

    /// Removes a user.
    async fn delete(&self, nombre: &str, audit: AuditEvent) -> AppResult<Usuario>;
}

/// Permission reference data and role-permission grants.
#[async_trait]
pub trait SecurityStore: Send + Sync {
    /// Returns the permission catalog ordered by name.
    async fn list_permissions(&self) -> AppResult<Vec<Permiso>>;

    /// Returns one permission, if any.
    async fn find_permission(&self, id: i32) -> AppResult<Option<Permiso>>;

    /// Grants a permission to a role. Fails with `Conflict` when the grant
    /// already exists and with `Validation` when role or permission do not.
    async fn grant(&self, grant: RolPermiso, audit: AuditEvent) -> AppResult<()>;

    /// Returns all grants.
    async fn list_grants(&self) -> AppResult<Vec<RolPermiso>>;

    /// Returns one grant, if any.
    async fn find_grant(&self, id_rol: i32, id_permiso: i32) -> AppResult<Option<RolPermiso>>;

    /// Revokes a grant. Fails with `NotFound` when it does not exist.
    async fn revoke(&self, id_rol: i32, id_permiso: i32, audit: AuditEvent) -> AppResult<()>;
}

/// Credential hashing port.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password for storage.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}
