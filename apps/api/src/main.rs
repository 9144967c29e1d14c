//! Panaderia API composition root.

#![forbid(unsafe_code)]

mod dto;
mod error;
mod handlers;
mod jwt;
mod middleware;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use panaderia_application::{
    AuditService, AuditStore, AuthService, AuthorizationService, EntityService, PasswordHasher,
    SecurityService, SessionStore, UserService,
};
use panaderia_core::AppError;
use panaderia_domain::{
    Categoria, Cliente, CompraInsumo, CompraProducto, DetallePedido, DetalleReceta, Insumo,
    NotaCompra, Participa, Pedido, Produccion, Producto, Proveedor, Receta, Rol,
};
use panaderia_infrastructure::{
    Argon2PasswordHasher, PostgresAuditStore, PostgresAuthorizationStore, PostgresCategoriaStore,
    PostgresClienteStore, PostgresCompraInsumoStore, PostgresCompraProductoStore,
    PostgresDetallePedidoStore, PostgresDetalleRecetaStore, PostgresInsumoStore,
    PostgresNotaCompraStore, PostgresParticipaStore, PostgresPedidoStore, PostgresProduccionStore,
    PostgresProductoStore, PostgresProveedorStore, PostgresRecetaStore, PostgresRolStore,
    PostgresSecurityStore, PostgresUserStore,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::jwt::JwtService;
use crate::state::AppState;

// Role ids fixed by the seed migration.
const ADMIN_ROLE_ID: i32 = 1;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

    let database_url = required_env("DATABASE_URL")?;
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    let jwt_secret = required_env("JWT_SECRET")?;

    if jwt_secret.len() < 32 {
        return Err(AppError::Validation(
            "JWT_SECRET must be at least 32 characters".to_owned(),
        ));
    }

    let jwt_expiration_minutes = env::var("JWT_EXPIRATION_MINUTES")
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(1440);

    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    panaderia_infrastructure::MIGRATOR
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let user_store = Arc::new(PostgresUserStore::new(pool.clone()));

    bootstrap_admin(&user_store, password_hasher.as_ref()).await?;

    let audit_store = Arc::new(PostgresAuditStore::new(pool.clone()));
    let audit: Arc<dyn AuditStore> = audit_store.clone();
    let sessions: Arc<dyn SessionStore> = audit_store;

    let authorization =
        AuthorizationService::new(Arc::new(PostgresAuthorizationStore::new(pool.clone())));

    let app_state = AppState {
        clientes: EntityService::<Cliente>::new(
            Arc::new(PostgresClienteStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        pedidos: EntityService::<Pedido>::new(
            Arc::new(PostgresPedidoStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        proveedores: EntityService::<Proveedor>::new(
            Arc::new(PostgresProveedorStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        categorias: EntityService::<Categoria>::new(
            Arc::new(PostgresCategoriaStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        productos: EntityService::<Producto>::new(
            Arc::new(PostgresProductoStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        insumos: EntityService::<Insumo>::new(
            Arc::new(PostgresInsumoStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        recetas: EntityService::<Receta>::new(
            Arc::new(PostgresRecetaStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        roles: EntityService::<Rol>::new(
            Arc::new(PostgresRolStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        notas_compra: EntityService::<NotaCompra>::new(
            Arc::new(PostgresNotaCompraStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        compras_insumo: EntityService::<CompraInsumo>::new(
            Arc::new(PostgresCompraInsumoStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        compras_producto: EntityService::<CompraProducto>::new(
            Arc::new(PostgresCompraProductoStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        producciones: EntityService::<Produccion>::new(
            Arc::new(PostgresProduccionStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        participaciones: EntityService::<Participa>::new(
            Arc::new(PostgresParticipaStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        detalles_receta: EntityService::<DetalleReceta>::new(
            Arc::new(PostgresDetalleRecetaStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        detalles_pedido: EntityService::<DetallePedido>::new(
            Arc::new(PostgresDetallePedidoStore::new(pool.clone())),
            authorization.clone(),
            audit.clone(),
        ),
        user_service: UserService::new(
            user_store.clone(),
            password_hasher.clone(),
            authorization.clone(),
            audit.clone(),
        ),
        security_service: SecurityService::new(
            Arc::new(PostgresSecurityStore::new(pool.clone())),
            authorization.clone(),
            audit,
        ),
        audit_service: AuditService::new(sessions.clone(), authorization),
        auth_service: AuthService::new(user_store, password_hasher, sessions),
        jwt_service: Arc::new(JwtService::new(&jwt_secret, jwt_expiration_minutes)),
    };

    let protected_routes = Router::new()
        .route(
            "/api/cliente",
            get(handlers::entities::list_handler::<Cliente>)
                .post(handlers::entities::create_handler::<Cliente>),
        )
        .route(
            "/api/cliente/{ci}",
            get(handlers::entities::get_handler::<Cliente>)
                .put(handlers::entities::update_handler::<Cliente>)
                .delete(handlers::entities::delete_handler::<Cliente>),
        )
        .route(
            "/api/pedido",
            get(handlers::entities::list_handler::<Pedido>)
                .post(handlers::entities::create_handler::<Pedido>),
        )
        .route(
            "/api/pedido/{id}",
            get(handlers::entities::get_handler::<Pedido>)
                .put(handlers::entities::update_handler::<Pedido>)
                .delete(handlers::entities::delete_handler::<Pedido>),
        )
        .route(
            "/api/proveedor",
            get(handlers::entities::list_handler::<Proveedor>)
                .post(handlers::entities::create_handler::<Proveedor>),
        )
        .route(
            "/api/proveedor/{codigo}",
            get(handlers::entities::get_handler::<Proveedor>)
                .put(handlers::entities::update_handler::<Proveedor>)
                .delete(handlers::entities::delete_handler::<Proveedor>),
        )
        .route(
            "/api/categoria",
            get(handlers::entities::list_handler::<Categoria>)
                .post(handlers::entities::create_handler::<Categoria>),
        )
        .route(
            "/api/categoria/{id}",
            get(handlers::entities::get_handler::<Categoria>)
                .put(handlers::entities::update_handler::<Categoria>)
                .delete(handlers::entities::delete_handler::<Categoria>),
        )
        .route(
            "/api/producto",
            get(handlers::entities::list_handler::<Producto>)
                .post(handlers::entities::create_handler::<Producto>),
        )
        .route(
            "/api/producto/{id}",
            get(handlers::entities::get_handler::<Producto>)
                .put(handlers::entities::update_handler::<Producto>)
                .delete(handlers::entities::delete_handler::<Producto>),
        )
        .route(
            "/api/insumo",
            get(handlers::entities::list_handler::<Insumo>)
                .post(handlers::entities::create_handler::<Insumo>),
        )
        .route(
            "/api/insumo/{id}",
            get(handlers::entities::get_handler::<Insumo>)
                .put(handlers::entities::update_handler::<Insumo>)
                .delete(handlers::entities::delete_handler::<Insumo>),
        )
        .route(
            "/api/receta",
            get(handlers::entities::list_handler::<Receta>)
                .post(handlers::entities::create_handler::<Receta>),
        )
        .route(
            "/api/receta/{id}",
            get(handlers::entities::get_handler::<Receta>)
                .put(handlers::entities::update_handler::<Receta>)
                .delete(handlers::entities::delete_handler::<Receta>),
        )
        .route(
            "/api/rol",
            get(handlers::entities::list_handler::<Rol>)
                .post(handlers::entities::create_handler::<Rol>),
        )
        .route(
            "/api/rol/{id}",
            get(handlers::entities::get_handler::<Rol>)
                .put(handlers::entities::update_handler::<Rol>)
                .delete(handlers::entities::delete_handler::<Rol>),
        )
        .route(
            "/api/nota_compra",
            get(handlers::entities::list_handler::<NotaCompra>)
                .post(handlers::entities::create_handler::<NotaCompra>),
        )
        .route(
            "/api/nota_compra/{id}",
            get(handlers::entities::get_handler::<NotaCompra>)
                .put(handlers::entities::update_handler::<NotaCompra>)
                .delete(handlers::entities::delete_handler::<NotaCompra>),
        )
        .route(
            "/api/compra_insumo",
            get(handlers::entities::list_handler::<CompraInsumo>)
                .post(handlers::entities::create_handler::<CompraInsumo>),
        )
        .route(
            "/api/compra_insumo/{id_nota_compra}/{id_insumo}",
            get(handlers::entities::get_handler::<CompraInsumo>)
                .put(handlers::entities::update_handler::<CompraInsumo>)
                .delete(handlers::entities::delete_handler::<CompraInsumo>),
        )
        .route(
            "/api/compra_producto",
            get(handlers::entities::list_handler::<CompraProducto>)
                .post(handlers::entities::create_handler::<CompraProducto>),
        )
        .route(
            "/api/compra_producto/{id_nota_compra}/{id_producto}",
            get(handlers::entities::get_handler::<CompraProducto>)
                .put(handlers::entities::update_handler::<CompraProducto>)
                .delete(handlers::entities::delete_handler::<CompraProducto>),
        )
        .route(
            "/api/produccion",
            get(handlers::entities::list_handler::<Produccion>)
                .post(handlers::entities::create_handler::<Produccion>),
        )
        .route(
            "/api/produccion/{id}",
            get(handlers::entities::get_handler::<Produccion>)
                .put(handlers::entities::update_handler::<Produccion>)
                .delete(handlers::entities::delete_handler::<Produccion>),
        )
        .route(
            "/api/participa",
            get(handlers::entities::list_handler::<Participa>)
                .post(handlers::entities::create_handler::<Participa>),
        )
        .route(
            "/api/participa/{id_usuario}/{id_produccion}",
            get(handlers::entities::get_handler::<Participa>)
                .put(handlers::entities::update_handler::<Participa>)
                .delete(handlers::entities::delete_handler::<Participa>),
        )
        .route(
            "/api/detalle_receta",
            get(handlers::entities::list_handler::<DetalleReceta>)
                .post(handlers::entities::create_handler::<DetalleReceta>),
        )
        .route(
            "/api/detalle_receta/{id_receta}/{id_insumo}",
            get(handlers::entities::get_handler::<DetalleReceta>)
                .put(handlers::entities::update_handler::<DetalleReceta>)
                .delete(handlers::entities::delete_handler::<DetalleReceta>),
        )
        .route(
            "/api/detalle_pedido",
            get(handlers::entities::list_handler::<DetallePedido>)
                .post(handlers::entities::create_handler::<DetallePedido>),
        )
        .route(
            "/api/detalle_pedido/{id_producto}/{id_pedido}",
            get(handlers::entities::get_handler::<DetallePedido>)
                .put(handlers::entities::update_handler::<DetallePedido>)
                .delete(handlers::entities::delete_handler::<DetallePedido>),
        )
        .route(
            "/api/usuario",
            get(handlers::seguridad::list_usuarios_handler)
                .post(handlers::seguridad::create_usuario_handler),
        )
        .route(
            "/api/usuario/{nombre}",
            get(handlers::seguridad::get_usuario_handler)
                .put(handlers::seguridad::update_usuario_handler)
                .delete(handlers::seguridad::delete_usuario_handler),
        )
        .route("/api/permiso", get(handlers::seguridad::list_permisos_handler))
        .route(
            "/api/permiso/{id}",
            get(handlers::seguridad::get_permiso_handler),
        )
        .route(
            "/api/rol_permiso",
            get(handlers::seguridad::list_grants_handler)
                .post(handlers::seguridad::grant_handler),
        )
        .route(
            "/api/rol_permiso/{id_rol}/{id_permiso}",
            get(handlers::seguridad::get_grant_handler)
                .delete(handlers::seguridad::revoke_handler),
        )
        .route(
            "/api/bitacora",
            get(handlers::auditoria::list_bitacoras_handler),
        )
        .route(
            "/api/bitacora/{id}",
            get(handlers::auditoria::get_bitacora_handler),
        )
        .route(
            "/api/detalle_bitacora/{id_bitacora}",
            get(handlers::auditoria::list_detalles_handler),
        )
        .route("/api/perfil", get(handlers::auth::perfil_handler))
        .route(
            "/api/cambiar_contrasena",
            put(handlers::auth::cambiar_contrasena_handler),
        )
        .route("/auth/logout", post(handlers::auth::logout_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/login", post(handlers::auth::login_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "panaderia-api listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

/// Seeds the first administrator account when the user table is empty and
/// `ADMIN_PASSWORD` is set. Without it a fresh database has no way in.
async fn bootstrap_admin(
    user_store: &PostgresUserStore,
    hasher: &dyn PasswordHasher,
) -> Result<(), AppError> {
    let Ok(admin_password) = env::var("ADMIN_PASSWORD") else {
        return Ok(());
    };

    if user_store.count().await? > 0 {
        return Ok(());
    }

    let hash = hasher.hash_password(&admin_password)?;
    let admin = user_store
        .insert_unaudited("admin", &hash, ADMIN_ROLE_ID)
        .await?;

    info!(usuario = %admin.nombre, "bootstrap administrator created");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
