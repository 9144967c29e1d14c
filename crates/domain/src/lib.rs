//! Business entities of the bakery back-office.
//!
//! Field names stay in Spanish because they are the wire contract of the
//! REST API (`ci`, `nombre`, `codigo`, ...); row JSON is produced by
//! serializing these types directly.

#![forbid(unsafe_code)]

mod auditoria;
mod compra;
mod inventario;
mod produccion;
mod recurso;
mod seguridad;
mod venta;

pub use auditoria::{Bitacora, DetalleBitacora, Metodo};
pub use compra::{
    ClaveCompraInsumo, ClaveCompraProducto, CompraInsumo, CompraInsumoPatch, CompraProducto,
    CompraProductoPatch, NotaCompra, NotaCompraDraft, Proveedor, ProveedorPatch,
};
pub use inventario::{
    Categoria, CategoriaDraft, CategoriaPatch, Insumo, InsumoDraft, InsumoPatch, Producto,
    ProductoDraft, ProductoPatch,
};
pub use produccion::{
    ClaveDetalleReceta, ClaveParticipa, DetalleReceta, DetalleRecetaPatch, Participa,
    ParticipaPatch, Produccion, ProduccionDraft, Receta, RecetaDraft, RecetaPatch,
};
pub use recurso::{Accion, Recurso};
pub use seguridad::{Permiso, Rol, RolDraft, RolPatch, RolPermiso, Usuario};
pub use venta::{
    Cliente, ClientePatch, ClaveDetallePedido, DetallePedido, DetallePedidoDraft,
    DetallePedidoPatch, Pedido, PedidoDraft, PedidoPatch,
};
