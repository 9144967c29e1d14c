use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Recurso;

/// A supplier, addressed by its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proveedor {
    /// Supplier code; the business key.
    pub codigo: String,
    /// Display name.
    pub nombre: String,
    /// Contact phone number.
    pub telefono: String,
}

/// Mutable supplier fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProveedorPatch {
    /// Display name.
    pub nombre: String,
    /// Contact phone number.
    pub telefono: String,
}

impl Recurso for Proveedor {
    type Draft = Proveedor;
    type Patch = ProveedorPatch;
    type Key = String;

    const COLLECTION: &'static str = "proveedor";
    const PLURAL: &'static str = "proveedores";
    const PERMISSION: &'static str = "PROVEEDOR";
    const LABEL: &'static str = "Proveedor";
    const NOT_FOUND: &'static str = "Proveedor no encontrado";

    fn key(&self) -> Self::Key {
        self.codigo.clone()
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        draft.nombre.clone()
    }
}

/// A purchase note placed with a supplier. Line items hang off it as
/// [`CompraInsumo`] and [`CompraProducto`] rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotaCompra {
    /// Generated note id; the business key.
    pub id: i32,
    /// Date the purchase was placed.
    pub fecha_pedido: NaiveDate,
    /// Agreed delivery date.
    pub fecha_entrega: NaiveDate,
    /// User who placed the purchase.
    pub id_usuario: i32,
    /// Supplier the purchase was placed with.
    pub codigo_proveedor: String,
}

/// Purchase-note fields; create and update accept the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotaCompraDraft {
    /// Date the purchase was placed.
    pub fecha_pedido: NaiveDate,
    /// Agreed delivery date.
    pub fecha_entrega: NaiveDate,
    /// User who placed the purchase; must exist.
    pub id_usuario: i32,
    /// Supplier the purchase was placed with; must exist.
    pub codigo_proveedor: String,
}

impl Recurso for NotaCompra {
    type Draft = NotaCompraDraft;
    type Patch = NotaCompraDraft;
    type Key = i32;

    const COLLECTION: &'static str = "nota_compra";
    const PLURAL: &'static str = "notas de compra";
    const PERMISSION: &'static str = "NOTA_COMPRA";
    const LABEL: &'static str = "Nota de compra";
    const NOT_FOUND: &'static str = "Nota de compra no encontrada.";

    fn key(&self) -> Self::Key {
        self.id
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        draft.codigo_proveedor.clone()
    }
}

/// Composite key of a supply line on a purchase note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaveCompraInsumo {
    /// Purchase note the line belongs to.
    pub id_nota_compra: i32,
    /// Purchased supply.
    pub id_insumo: i32,
}

impl fmt::Display for ClaveCompraInsumo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id_nota_compra, self.id_insumo)
    }
}

/// One supply line on a purchase note. A note carries at most one line per
/// supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompraInsumo {
    /// Purchase note the line belongs to.
    pub id_nota_compra: i32,
    /// Purchased supply.
    pub id_insumo: i32,
    /// Purchased amount, in the supply's unit.
    pub cantidad: f64,
    /// Unit price.
    pub precio: f64,
    /// Line total.
    pub total: f64,
}

/// Mutable fields of a supply line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompraInsumoPatch {
    /// Purchased amount.
    pub cantidad: f64,
    /// Unit price.
    pub precio: f64,
    /// Line total.
    pub total: f64,
}

impl Recurso for CompraInsumo {
    type Draft = CompraInsumo;
    type Patch = CompraInsumoPatch;
    type Key = ClaveCompraInsumo;

    const COLLECTION: &'static str = "compra_insumo";
    const PLURAL: &'static str = "compras de insumos";
    const PERMISSION: &'static str = "COMPRA_INSUMO";
    const LABEL: &'static str = "Compra de insumo";
    const NOT_FOUND: &'static str = "Compra de insumo no encontrada.";

    fn key(&self) -> Self::Key {
        ClaveCompraInsumo {
            id_nota_compra: self.id_nota_compra,
            id_insumo: self.id_insumo,
        }
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        draft.key().to_string()
    }
}

/// Composite key of a product line on a purchase note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaveCompraProducto {
    /// Purchase note the line belongs to.
    pub id_nota_compra: i32,
    /// Purchased product.
    pub id_producto: i32,
}

impl fmt::Display for ClaveCompraProducto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id_nota_compra, self.id_producto)
    }
}

/// One finished-product line on a purchase note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompraProducto {
    /// Purchase note the line belongs to.
    pub id_nota_compra: i32,
    /// Purchased product.
    pub id_producto: i32,
    /// Purchased units.
    pub cantidad: i32,
    /// Unit price.
    pub precio: f64,
    /// Line total.
    pub total: f64,
}

/// Mutable fields of a product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompraProductoPatch {
    /// Purchased units.
    pub cantidad: i32,
    /// Unit price.
    pub precio: f64,
    /// Line total.
    pub total: f64,
}

impl Recurso for CompraProducto {
    type Draft = CompraProducto;
    type Patch = CompraProductoPatch;
    type Key = ClaveCompraProducto;

    const COLLECTION: &'static str = "compra_producto";
    const PLURAL: &'static str = "compras de productos";
    const PERMISSION: &'static str = "COMPRA_PRODUCTO";
    const LABEL: &'static str = "Compra de producto";
    const NOT_FOUND: &'static str = "Compra de producto no encontrada.";

    fn key(&self) -> Self::Key {
        ClaveCompraProducto {
            id_nota_compra: self.id_nota_compra,
            id_producto: self.id_producto,
        }
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        draft.key().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{ClaveCompraInsumo, ClaveCompraProducto};

    #[test]
    fn composite_keys_display_as_path_segments() {
        let insumo = ClaveCompraInsumo {
            id_nota_compra: 4,
            id_insumo: 9,
        };
        let producto = ClaveCompraProducto {
            id_nota_compra: 4,
            id_producto: 2,
        };
        assert_eq!(insumo.to_string(), "4/9");
        assert_eq!(producto.to_string(), "4/2");
    }
}
