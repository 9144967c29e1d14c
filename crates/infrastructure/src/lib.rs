//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

/// Embedded schema migrations, applied by the API at startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

mod argon2_password_hasher;
mod pg;
mod postgres_audit_store;
mod postgres_authorization_store;
mod postgres_categoria_store;
mod postgres_cliente_store;
mod postgres_compra_insumo_store;
mod postgres_compra_producto_store;
mod postgres_detalle_pedido_store;
mod postgres_detalle_receta_store;
mod postgres_insumo_store;
mod postgres_nota_compra_store;
mod postgres_participa_store;
mod postgres_pedido_store;
mod postgres_produccion_store;
mod postgres_producto_store;
mod postgres_proveedor_store;
mod postgres_receta_store;
mod postgres_rol_store;
mod postgres_security_store;
mod postgres_user_store;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use postgres_audit_store::PostgresAuditStore;
pub use postgres_authorization_store::PostgresAuthorizationStore;
pub use postgres_categoria_store::PostgresCategoriaStore;
pub use postgres_cliente_store::PostgresClienteStore;
pub use postgres_compra_insumo_store::PostgresCompraInsumoStore;
pub use postgres_compra_producto_store::PostgresCompraProductoStore;
pub use postgres_detalle_pedido_store::PostgresDetallePedidoStore;
pub use postgres_detalle_receta_store::PostgresDetalleRecetaStore;
pub use postgres_insumo_store::PostgresInsumoStore;
pub use postgres_nota_compra_store::PostgresNotaCompraStore;
pub use postgres_participa_store::PostgresParticipaStore;
pub use postgres_pedido_store::PostgresPedidoStore;
pub use postgres_produccion_store::PostgresProduccionStore;
pub use postgres_producto_store::PostgresProductoStore;
pub use postgres_proveedor_store::PostgresProveedorStore;
pub use postgres_receta_store::PostgresRecetaStore;
pub use postgres_rol_store::PostgresRolStore;
pub use postgres_security_store::PostgresSecurityStore;
pub use postgres_user_store::PostgresUserStore;
