use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Recurso;

/// A client, addressed by national id (`ci`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cliente {
    /// National id; the business key.
    pub ci: String,
    /// Display name.
    pub nombre: String,
    /// Gender marker (`M`/`F`).
    pub sexo: String,
    /// Contact phone number.
    pub telefono: String,
}

/// Mutable client fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientePatch {
    /// Display name.
    pub nombre: String,
    /// Gender marker.
    pub sexo: String,
    /// Contact phone number.
    pub telefono: String,
}

impl Recurso for Cliente {
    type Draft = Cliente;
    type Patch = ClientePatch;
    type Key = String;

    const COLLECTION: &'static str = "cliente";
    const PLURAL: &'static str = "clientes";
    const PERMISSION: &'static str = "CLIENTE";
    const LABEL: &'static str = "Cliente";
    const NOT_FOUND: &'static str = "Cliente no encontrado";

    fn key(&self) -> Self::Key {
        self.ci.clone()
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        draft.nombre.clone()
    }
}

/// A sales order placed by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pedido {
    /// Generated order id; the business key.
    pub id: i32,
    /// Date the order was placed.
    pub fecha_pedido: NaiveDate,
    /// Whether the order has been paid.
    pub pagado: bool,
    /// Agreed delivery date.
    pub fecha_entrega: NaiveDate,
    /// Order kind (counter sale, pre-order, ...).
    pub tipo: String,
    /// Order total.
    pub total: f64,
    /// Client the order belongs to.
    pub ci_cliente: String,
    /// Whether the order has been delivered. New orders start undelivered.
    pub entregado: bool,
}

/// Payload to place a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedidoDraft {
    /// Date the order was placed.
    pub fecha_pedido: NaiveDate,
    /// Whether the order has been paid.
    pub pagado: bool,
    /// Agreed delivery date.
    pub fecha_entrega: NaiveDate,
    /// Order kind.
    pub tipo: String,
    /// Order total.
    pub total: f64,
    /// Client the order belongs to; must exist.
    pub ci_cliente: String,
}

/// Mutable order fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedidoPatch {
    /// Whether the order has been paid.
    pub pagado: bool,
    /// Agreed delivery date.
    pub fecha_entrega: NaiveDate,
    /// Order kind.
    pub tipo: String,
    /// Order total.
    pub total: f64,
    /// Whether the order has been delivered.
    pub entregado: bool,
}

impl Recurso for Pedido {
    type Draft = PedidoDraft;
    type Patch = PedidoPatch;
    type Key = i32;

    const COLLECTION: &'static str = "pedido";
    const PLURAL: &'static str = "pedidos";
    const PERMISSION: &'static str = "PEDIDO";
    const LABEL: &'static str = "Pedido";
    const NOT_FOUND: &'static str = "Pedido no encontrado";

    fn key(&self) -> Self::Key {
        self.id
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        draft.ci_cliente.clone()
    }
}

/// Composite key of one product line of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaveDetallePedido {
    /// Ordered product.
    pub id_producto: i32,
    /// Order the line belongs to.
    pub id_pedido: i32,
}

impl fmt::Display for ClaveDetallePedido {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id_producto, self.id_pedido)
    }
}

/// One product line of an order. An order carries at most one line per
/// product; the line total is derived from units and unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetallePedido {
    /// Ordered product.
    pub id_producto: i32,
    /// Order the line belongs to.
    pub id_pedido: i32,
    /// Ordered units.
    pub cantidad: i32,
    /// Unit price at order time.
    pub precio: f64,
    /// Line total, `cantidad * precio`.
    pub total: f64,
}

/// Payload to add a product line; the total is computed on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetallePedidoDraft {
    /// Ordered product; must exist.
    pub id_producto: i32,
    /// Order the line belongs to; must exist.
    pub id_pedido: i32,
    /// Ordered units.
    pub cantidad: i32,
    /// Unit price at order time.
    pub precio: f64,
}

/// Mutable fields of a product line; the total is recomputed on write.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetallePedidoPatch {
    /// Ordered units.
    pub cantidad: i32,
    /// Unit price.
    pub precio: f64,
}

impl Recurso for DetallePedido {
    type Draft = DetallePedidoDraft;
    type Patch = DetallePedidoPatch;
    type Key = ClaveDetallePedido;

    const COLLECTION: &'static str = "detalle_pedido";
    const PLURAL: &'static str = "detalles de pedido";
    const PERMISSION: &'static str = "DETALLE_PEDIDO";
    const LABEL: &'static str = "Detalle de pedido";
    const NOT_FOUND: &'static str = "Detalle de pedido no encontrado";

    fn key(&self) -> Self::Key {
        ClaveDetallePedido {
            id_producto: self.id_producto,
            id_pedido: self.id_pedido,
        }
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        ClaveDetallePedido {
            id_producto: draft.id_producto,
            id_pedido: draft.id_pedido,
        }
        .to_string()
    }
}
