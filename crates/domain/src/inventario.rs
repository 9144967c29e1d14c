use serde::{Deserialize, Serialize};

use crate::Recurso;

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Categoria {
    /// Generated category id; the business key.
    pub id: i32,
    /// Category name; unique across live rows.
    pub nombre: String,
    /// Optional free-text description.
    pub descripcion: Option<String>,
}

/// Payload to create a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoriaDraft {
    /// Category name.
    pub nombre: String,
    /// Optional description.
    pub descripcion: Option<String>,
}

/// Mutable category fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoriaPatch {
    /// Category name.
    pub nombre: String,
    /// Optional description.
    pub descripcion: Option<String>,
}

impl Recurso for Categoria {
    type Draft = CategoriaDraft;
    type Patch = CategoriaPatch;
    type Key = i32;

    const COLLECTION: &'static str = "categoria";
    const PLURAL: &'static str = "categorias";
    const PERMISSION: &'static str = "CATEGORIA";
    const LABEL: &'static str = "Categoria";
    const NOT_FOUND: &'static str = "Categoría no encontrada";

    fn key(&self) -> Self::Key {
        self.id
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        draft.nombre.clone()
    }
}

/// A finished product offered for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producto {
    /// Generated product id; the business key.
    pub id: i32,
    /// Product name; unique across live rows.
    pub nombre: String,
    /// Unit sale price.
    pub precio: f64,
    /// Units currently in stock.
    pub stock: i32,
    /// Threshold under which the stock is considered low.
    pub stock_minimo: i32,
    /// Owning category; must exist.
    pub id_categoria: i32,
}

/// Payload to create a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductoDraft {
    /// Product name.
    pub nombre: String,
    /// Unit sale price.
    pub precio: f64,
    /// Units currently in stock.
    pub stock: i32,
    /// Low-stock threshold.
    pub stock_minimo: i32,
    /// Owning category; must exist.
    pub id_categoria: i32,
}

/// Mutable product fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductoPatch {
    /// Product name.
    pub nombre: String,
    /// Unit sale price.
    pub precio: f64,
    /// Units currently in stock.
    pub stock: i32,
    /// Low-stock threshold.
    pub stock_minimo: i32,
    /// Owning category; must exist.
    pub id_categoria: i32,
}

impl Recurso for Producto {
    type Draft = ProductoDraft;
    type Patch = ProductoPatch;
    type Key = i32;

    const COLLECTION: &'static str = "producto";
    const PLURAL: &'static str = "productos";
    const PERMISSION: &'static str = "PRODUCTO";
    const LABEL: &'static str = "Producto";
    const NOT_FOUND: &'static str = "Producto no encontrado";

    fn key(&self) -> Self::Key {
        self.id
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        draft.nombre.clone()
    }
}

/// A raw ingredient consumed by recipes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insumo {
    /// Generated ingredient id; the business key.
    pub id: i32,
    /// Ingredient name; unique across live rows.
    pub nombre: String,
    /// Unit of measure (`kg`, `gr`, `lt`, `ml`, `unid`).
    pub medida: String,
    /// Quantity in stock, in `medida` units.
    pub stock: f64,
    /// Threshold under which the stock is considered low.
    pub stock_minimo: f64,
}

/// Payload to create an ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsumoDraft {
    /// Ingredient name.
    pub nombre: String,
    /// Unit of measure.
    pub medida: String,
    /// Quantity in stock.
    pub stock: f64,
    /// Low-stock threshold.
    pub stock_minimo: f64,
}

/// Mutable ingredient fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsumoPatch {
    /// Ingredient name.
    pub nombre: String,
    /// Unit of measure.
    pub medida: String,
    /// Quantity in stock.
    pub stock: f64,
    /// Low-stock threshold.
    pub stock_minimo: f64,
}

impl Recurso for Insumo {
    type Draft = InsumoDraft;
    type Patch = InsumoPatch;
    type Key = i32;

    const COLLECTION: &'static str = "insumo";
    const PLURAL: &'static str = "insumos";
    const PERMISSION: &'static str = "INSUMO";
    const LABEL: &'static str = "Insumo";
    const NOT_FOUND: &'static str = "Insumo no encontrado";

    fn key(&self) -> Self::Key {
        self.id
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        draft.nombre.clone()
    }
}
