use std::sync::Arc;

use panaderia_application::{
    AuditService, AuthService, EntityService, SecurityService, UserService,
};
use panaderia_domain::{
    Categoria, Cliente, CompraInsumo, CompraProducto, DetallePedido, DetalleReceta, Insumo,
    NotaCompra, Participa, Pedido, Produccion, Producto, Proveedor, Receta, Recurso, Rol,
};

use crate::jwt::JwtService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub clientes: EntityService<Cliente>,
    pub pedidos: EntityService<Pedido>,
    pub proveedores: EntityService<Proveedor>,
    pub categorias: EntityService<Categoria>,
    pub productos: EntityService<Producto>,
    pub insumos: EntityService<Insumo>,
    pub recetas: EntityService<Receta>,
    pub roles: EntityService<Rol>,
    pub notas_compra: EntityService<NotaCompra>,
    pub compras_insumo: EntityService<CompraInsumo>,
    pub compras_producto: EntityService<CompraProducto>,
    pub producciones: EntityService<Produccion>,
    pub participaciones: EntityService<Participa>,
    pub detalles_receta: EntityService<DetalleReceta>,
    pub detalles_pedido: EntityService<DetallePedido>,
    pub user_service: UserService,
    pub security_service: SecurityService,
    pub audit_service: AuditService,
    pub auth_service: AuthService,
    pub jwt_service: Arc<JwtService>,
}

/// Maps each entity type to its controller so one set of generic handlers
/// serves every CRUD route.
pub trait EntityServices<E: Recurso> {
    /// Returns the controller managing `E`.
    fn entity_service(&self) -> &EntityService<E>;
}

impl EntityServices<Cliente> for AppState {
    fn entity_service(&self) -> &EntityService<Cliente> {
        &self.clientes
    }
}

impl EntityServices<Pedido> for AppState {
    fn entity_service(&self) -> &EntityService<Pedido> {
        &self.pedidos
    }
}

impl EntityServices<Proveedor> for AppState {
    fn entity_service(&self) -> &EntityService<Proveedor> {
        &self.proveedores
    }
}

impl EntityServices<Categoria> for AppState {
    fn entity_service(&self) -> &EntityService<Categoria> {
        &self.categorias
    }
}

impl EntityServices<Producto> for AppState {
    fn entity_service(&self) -> &EntityService<Producto> {
        &self.productos
    }
}

impl EntityServices<Insumo> for AppState {
    fn entity_service(&self) -> &EntityService<Insumo> {
        &self.insumos
    }
}

impl EntityServices<Receta> for AppState {
    fn entity_service(&self) -> &EntityService<Receta> {
        &self.recetas
    }
}

impl EntityServices<Rol> for AppState {
    fn entity_service(&self) -> &EntityService<Rol> {
        &self.roles
    }
}

impl EntityServices<NotaCompra> for AppState {
    fn entity_service(&self) -> &EntityService<NotaCompra> {
        &self.notas_compra
    }
}

impl EntityServices<CompraInsumo> for AppState {
    fn entity_service(&self) -> &EntityService<CompraInsumo> {
        &self.compras_insumo
    }
}

impl EntityServices<CompraProducto> for AppState {
    fn entity_service(&self) -> &EntityService<CompraProducto> {
        &self.compras_producto
    }
}

impl EntityServices<Produccion> for AppState {
    fn entity_service(&self) -> &EntityService<Produccion> {
        &self.producciones
    }
}

impl EntityServices<Participa> for AppState {
    fn entity_service(&self) -> &EntityService<Participa> {
        &self.participaciones
    }
}

impl EntityServices<DetalleReceta> for AppState {
    fn entity_service(&self) -> &EntityService<DetalleReceta> {
        &self.detalles_receta
    }
}

impl EntityServices<DetallePedido> for AppState {
    fn entity_service(&self) -> &EntityService<DetallePedido> {
        &self.detalles_pedido
    }
}
