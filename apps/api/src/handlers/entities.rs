//! Generic CRUD handlers.
//!
//! One set of handlers serves every managed entity; routes pick the entity
//! with a turbofish, e.g. `get(list_handler::<Cliente>)`. The matching
//! controller is resolved through [`EntityServices`].

use axum::Json;
use axum::extract::{Extension, Path, State};
use panaderia_core::AuthenticatedUser;
use panaderia_domain::Recurso;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::dto::MessageResponse;
use crate::error::ApiResult;
use crate::state::{AppState, EntityServices};

/// Creates a row; responds 200 with a confirmation message, matching the
/// wire contract of the rest of the mutation endpoints.
pub async fn create_handler<E>(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Json(draft): Json<E::Draft>,
) -> ApiResult<Json<MessageResponse>>
where
    E: Recurso,
    E::Draft: DeserializeOwned,
    AppState: EntityServices<E>,
{
    EntityServices::<E>::entity_service(&state)
        .create(&actor, draft)
        .await?;

    Ok(Json(MessageResponse::new(format!(
        "{} creado exitosamente",
        E::LABEL
    ))))
}

/// Returns all rows.
pub async fn list_handler<E>(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<E>>>
where
    E: Recurso + Serialize,
    AppState: EntityServices<E>,
{
    let rows = EntityServices::<E>::entity_service(&state).list(&actor).await?;
    Ok(Json(rows))
}

/// Returns one row by key.
pub async fn get_handler<E>(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(key): Path<E::Key>,
) -> ApiResult<Json<E>>
where
    E: Recurso + Serialize,
    E::Key: DeserializeOwned,
    AppState: EntityServices<E>,
{
    let row = EntityServices::<E>::entity_service(&state)
        .get(&actor, key)
        .await?;
    Ok(Json(row))
}

/// Overwrites the mutable fields of a row.
pub async fn update_handler<E>(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(key): Path<E::Key>,
    Json(patch): Json<E::Patch>,
) -> ApiResult<Json<MessageResponse>>
where
    E: Recurso,
    E::Key: DeserializeOwned,
    E::Patch: DeserializeOwned,
    AppState: EntityServices<E>,
{
    EntityServices::<E>::entity_service(&state)
        .update(&actor, key, patch)
        .await?;

    Ok(Json(MessageResponse::new(format!(
        "{} actualizado exitosamente",
        E::LABEL
    ))))
}

/// Removes a row.
pub async fn delete_handler<E>(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(key): Path<E::Key>,
) -> ApiResult<Json<MessageResponse>>
where
    E: Recurso,
    E::Key: DeserializeOwned,
    AppState: EntityServices<E>,
{
    EntityServices::<E>::entity_service(&state)
        .delete(&actor, key)
        .await?;

    Ok(Json(MessageResponse::new(format!(
        "{} eliminado exitosamente",
        E::LABEL
    ))))
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet, HashMap};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use axum::middleware::from_fn_with_state;
    use axum::response::Response;
    use axum::routing::{get, post};
    use http_body_util::BodyExt;
    use panaderia_application::{
        AuditEvent, AuditService, AuditStore, AuthService, AuthorizationService,
        AuthorizationStore, EntityService, EntityStore, PasswordHasher, SecurityService,
        SecurityStore, SessionStore, UserRecord, UserService, UserStore,
    };
    use panaderia_core::{AppError, AppResult};
    use panaderia_domain::{
        Bitacora, Cliente, ClientePatch, DetalleBitacora, Permiso, Recurso, RolPermiso, Usuario,
    };
    use serde_json::{Value, json};
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    use crate::handlers;
    use crate::jwt::JwtService;
    use crate::middleware;
    use crate::state::AppState;

    const SECRET: &str = "una-clave-de-al-menos-32-caracteres!";
    const FULL_ACCESS_ROLE: i32 = 1;

    fn out_of_scope() -> AppError {
        AppError::Internal("almacén fuera del alcance de la prueba".to_owned())
    }

    struct NullSink;

    #[async_trait]
    impl AuditStore for NullSink {
        async fn append(&self, _event: AuditEvent) -> AppResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeClienteStore {
        rows: Mutex<BTreeMap<String, Cliente>>,
    }

    #[async_trait]
    impl EntityStore<Cliente> for FakeClienteStore {
        async fn insert(&self, draft: Cliente, _audit: AuditEvent) -> AppResult<Cliente> {
            let mut rows = self.rows.lock().await;
            if rows.contains_key(&draft.ci) {
                return Err(AppError::Conflict(
                    "El cliente con este CI ya existe.".to_owned(),
                ));
            }
            rows.insert(draft.ci.clone(), draft.clone());
            Ok(draft)
        }

        async fn list(&self) -> AppResult<Vec<Cliente>> {
            Ok(self.rows.lock().await.values().cloned().collect())
        }

        async fn find(&self, key: &String) -> AppResult<Option<Cliente>> {
            Ok(self.rows.lock().await.get(key).cloned())
        }

        async fn update(
            &self,
            key: &String,
            patch: ClientePatch,
            _audit: AuditEvent,
        ) -> AppResult<Cliente> {
            let mut rows = self.rows.lock().await;
            let row = rows
                .get_mut(key)
                .ok_or_else(|| AppError::NotFound(Cliente::NOT_FOUND.to_owned()))?;
            row.nombre = patch.nombre;
            row.sexo = patch.sexo;
            row.telefono = patch.telefono;
            Ok(row.clone())
        }

        async fn delete(&self, key: &String, _audit: AuditEvent) -> AppResult<Cliente> {
            self.rows
                .lock()
                .await
                .remove(key)
                .ok_or_else(|| AppError::NotFound(Cliente::NOT_FOUND.to_owned()))
        }
    }

    /// Fills the controller slots the test never routes to.
    struct UnusedStore;

    #[async_trait]
    impl<E: Recurso> EntityStore<E> for UnusedStore {
        async fn insert(&self, _draft: E::Draft, _audit: AuditEvent) -> AppResult<E> {
            Err(out_of_scope())
        }

        async fn list(&self) -> AppResult<Vec<E>> {
            Err(out_of_scope())
        }

        async fn find(&self, _key: &E::Key) -> AppResult<Option<E>> {
            Err(out_of_scope())
        }

        async fn update(
            &self,
            _key: &E::Key,
            _patch: E::Patch,
            _audit: AuditEvent,
        ) -> AppResult<E> {
            Err(out_of_scope())
        }

        async fn delete(&self, _key: &E::Key, _audit: AuditEvent) -> AppResult<E> {
            Err(out_of_scope())
        }
    }

    struct GrantedRoles {
        roles: HashMap<i32, BTreeSet<String>>,
    }

    #[async_trait]
    impl AuthorizationStore for GrantedRoles {
        async fn permissions_for_role(&self, id_rol: i32) -> AppResult<BTreeSet<String>> {
            Ok(self.roles.get(&id_rol).cloned().unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct FakeSecurityStore {
        grants: Mutex<BTreeSet<(i32, i32)>>,
    }

    #[async_trait]
    impl SecurityStore for FakeSecurityStore {
        async fn list_permissions(&self) -> AppResult<Vec<Permiso>> {
            Err(out_of_scope())
        }

        async fn find_permission(&self, _id: i32) -> AppResult<Option<Permiso>> {
            Err(out_of_scope())
        }

        async fn grant(&self, grant: RolPermiso, _audit: AuditEvent) -> AppResult<()> {
            let mut grants = self.grants.lock().await;
            if !grants.insert((grant.id_rol, grant.id_permiso)) {
                return Err(AppError::Conflict(
                    "El rol ya tiene este permiso.".to_owned(),
                ));
            }
            Ok(())
        }

        async fn list_grants(&self) -> AppResult<Vec<RolPermiso>> {
            Err(out_of_scope())
        }

        async fn find_grant(&self, _id_rol: i32, _id_permiso: i32) -> AppResult<Option<RolPermiso>> {
            Err(out_of_scope())
        }

        async fn revoke(&self, _id_rol: i32, _id_permiso: i32, _audit: AuditEvent) -> AppResult<()> {
            Err(out_of_scope())
        }
    }

    struct UnusedUserStore;

    #[async_trait]
    impl UserStore for UnusedUserStore {
        async fn find_by_nombre(&self, _nombre: &str) -> AppResult<Option<UserRecord>> {
            Err(out_of_scope())
        }

        async fn find_by_id(&self, _id: i32) -> AppResult<Option<UserRecord>> {
            Err(out_of_scope())
        }

        async fn insert(
            &self,
            _nombre: &str,
            _contrasena_hash: &str,
            _id_rol: i32,
            _audit: AuditEvent,
        ) -> AppResult<Usuario> {
            Err(out_of_scope())
        }

        async fn list(&self) -> AppResult<Vec<Usuario>> {
            Err(out_of_scope())
        }

        async fn update(
            &self,
            _nombre: &str,
            _id_rol: i32,
            _contrasena_hash: Option<&str>,
            _audit: AuditEvent,
        ) -> AppResult<Usuario> {
            Err(out_of_scope())
        }

        async fn update_password(
            &self,
            _id: i32,
            _contrasena_hash: &str,
            _audit: AuditEvent,
        ) -> AppResult<()> {
            Err(out_of_scope())
        }

        async fn delete(&self, _nombre: &str, _audit: AuditEvent) -> AppResult<Usuario> {
            Err(out_of_scope())
        }
    }

    struct UnusedSessionStore;

    #[async_trait]
    impl SessionStore for UnusedSessionStore {
        async fn open(&self, _id_usuario: i32, _ip: &str) -> AppResult<i64> {
            Err(out_of_scope())
        }

        async fn close(&self, _id: i64) -> AppResult<()> {
            Err(out_of_scope())
        }

        async fn list(&self) -> AppResult<Vec<Bitacora>> {
            Err(out_of_scope())
        }

        async fn find(&self, _id: i64) -> AppResult<Option<Bitacora>> {
            Err(out_of_scope())
        }

        async fn list_events(&self, _id_bitacora: i64) -> AppResult<Vec<DetalleBitacora>> {
            Err(out_of_scope())
        }
    }

    struct UnusedHasher;

    impl PasswordHasher for UnusedHasher {
        fn hash_password(&self, _password: &str) -> AppResult<String> {
            Err(out_of_scope())
        }

        fn verify_password(&self, _password: &str, _hash: &str) -> AppResult<bool> {
            Err(out_of_scope())
        }
    }

    fn unused_service<E: Recurso>(
        guard: &AuthorizationService,
        sink: &Arc<dyn AuditStore>,
    ) -> EntityService<E> {
        EntityService::new(Arc::new(UnusedStore), guard.clone(), sink.clone())
    }

    /// Wires the cliente and rol_permiso routes over in-memory stores with
    /// the real auth middleware and a real bearer token.
    fn app() -> AppResult<(Router, String)> {
        let sink: Arc<dyn AuditStore> = Arc::new(NullSink);
        let guard = AuthorizationService::new(Arc::new(GrantedRoles {
            roles: HashMap::from([(
                FULL_ACCESS_ROLE,
                BTreeSet::from([
                    "CREAR_CLIENTE".to_owned(),
                    "VER_CLIENTE".to_owned(),
                    "MODIFICAR_CLIENTE".to_owned(),
                    "ELIMINAR_CLIENTE".to_owned(),
                    "CREAR_ROL_PERMISO".to_owned(),
                ]),
            )]),
        }));

        let users: Arc<dyn UserStore> = Arc::new(UnusedUserStore);
        let hasher: Arc<dyn PasswordHasher> = Arc::new(UnusedHasher);
        let sessions: Arc<dyn SessionStore> = Arc::new(UnusedSessionStore);
        let jwt_service = Arc::new(JwtService::new(SECRET, 60));

        let state = AppState {
            clientes: EntityService::new(
                Arc::new(FakeClienteStore::default()),
                guard.clone(),
                sink.clone(),
            ),
            pedidos: unused_service(&guard, &sink),
            proveedores: unused_service(&guard, &sink),
            categorias: unused_service(&guard, &sink),
            productos: unused_service(&guard, &sink),
            insumos: unused_service(&guard, &sink),
            recetas: unused_service(&guard, &sink),
            roles: unused_service(&guard, &sink),
            notas_compra: unused_service(&guard, &sink),
            compras_insumo: unused_service(&guard, &sink),
            compras_producto: unused_service(&guard, &sink),
            producciones: unused_service(&guard, &sink),
            participaciones: unused_service(&guard, &sink),
            detalles_receta: unused_service(&guard, &sink),
            detalles_pedido: unused_service(&guard, &sink),
            user_service: UserService::new(
                users.clone(),
                hasher.clone(),
                guard.clone(),
                sink.clone(),
            ),
            security_service: SecurityService::new(
                Arc::new(FakeSecurityStore::default()),
                guard.clone(),
                sink.clone(),
            ),
            audit_service: AuditService::new(sessions.clone(), guard),
            auth_service: AuthService::new(users, hasher, sessions),
            jwt_service: jwt_service.clone(),
        };

        let admin = Usuario {
            id: 1,
            nombre: "ana".to_owned(),
            id_rol: FULL_ACCESS_ROLE,
        };
        let token = jwt_service.mint(&admin, 7)?;

        let router = Router::new()
            .route(
                "/api/cliente",
                get(super::list_handler::<Cliente>).post(super::create_handler::<Cliente>),
            )
            .route(
                "/api/cliente/{ci}",
                get(super::get_handler::<Cliente>)
                    .put(super::update_handler::<Cliente>)
                    .delete(super::delete_handler::<Cliente>),
            )
            .route(
                "/api/rol_permiso",
                post(handlers::seguridad::grant_handler),
            )
            .route_layer(from_fn_with_state(state.clone(), middleware::require_auth))
            .with_state(state);

        Ok((router, token))
    }

    fn request(
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> AppResult<Request<Body>> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string())),
            None => builder.body(Body::empty()),
        };
        request.map_err(|error| AppError::Internal(error.to_string()))
    }

    async fn send(router: &Router, request: Request<Body>) -> Response {
        match router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(infallible) => match infallible {},
        }
    }

    async fn json_body(response: Response) -> AppResult<Value> {
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|error| AppError::Internal(error.to_string()))?
            .to_bytes();
        serde_json::from_slice(&bytes).map_err(|error| AppError::Internal(error.to_string()))
    }

    fn ana() -> Value {
        json!({ "ci": "V123", "nombre": "Ana", "sexo": "F", "telefono": "555" })
    }

    #[tokio::test]
    async fn cliente_lifecycle_answers_200_on_every_mutation() -> AppResult<()> {
        let (router, token) = app()?;
        let token = Some(token.as_str());

        let created = send(
            &router,
            request(Method::POST, "/api/cliente", token, Some(ana()))?,
        )
        .await;
        assert_eq!(created.status(), StatusCode::OK);
        let body = json_body(created).await?;
        assert_eq!(body["message"], "Cliente creado exitosamente");

        let duplicate = send(
            &router,
            request(Method::POST, "/api/cliente", token, Some(ana()))?,
        )
        .await;
        assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

        let fetched = send(
            &router,
            request(Method::GET, "/api/cliente/V123", token, None)?,
        )
        .await;
        assert_eq!(fetched.status(), StatusCode::OK);
        let row = json_body(fetched).await?;
        assert_eq!(row["nombre"], "Ana");

        let updated = send(
            &router,
            request(
                Method::PUT,
                "/api/cliente/V123",
                token,
                Some(json!({ "nombre": "Ana Maria", "sexo": "F", "telefono": "555" })),
            )?,
        )
        .await;
        assert_eq!(updated.status(), StatusCode::OK);

        let deleted = send(
            &router,
            request(Method::DELETE, "/api/cliente/V123", token, None)?,
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::OK);
        let body = json_body(deleted).await?;
        assert_eq!(body["message"], "Cliente eliminado exitosamente");

        let missing = send(
            &router,
            request(Method::GET, "/api/cliente/V123", token, None)?,
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn grant_answers_200_with_a_confirmation_message() -> AppResult<()> {
        let (router, token) = app()?;

        let granted = send(
            &router,
            request(
                Method::POST,
                "/api/rol_permiso",
                Some(token.as_str()),
                Some(json!({ "id_rol": 2, "id_permiso": 5 })),
            )?,
        )
        .await;
        assert_eq!(granted.status(), StatusCode::OK);
        let body = json_body(granted).await?;
        assert_eq!(body["message"], "Permiso asignado exitosamente");
        Ok(())
    }

    #[tokio::test]
    async fn requests_without_a_token_answer_401() -> AppResult<()> {
        let (router, _token) = app()?;

        let response = send(&router, request(Method::GET, "/api/cliente", None, None)?).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }
}
