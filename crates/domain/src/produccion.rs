use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::Recurso;

/// A production recipe for one product. Each product has at most one recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receta {
    /// Generated recipe id; the business key.
    pub id: i32,
    /// Product this recipe produces; must exist and carry no other recipe.
    pub id_producto: i32,
    /// Recipe name.
    pub nombre: String,
    /// Preparation time in minutes.
    pub tiempo: i32,
    /// Optional preparation notes.
    pub descripcion: Option<String>,
}

/// Payload to create a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecetaDraft {
    /// Product this recipe produces.
    pub id_producto: i32,
    /// Recipe name.
    pub nombre: String,
    /// Preparation time in minutes.
    pub tiempo: i32,
    /// Optional preparation notes.
    pub descripcion: Option<String>,
}

/// Mutable recipe fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecetaPatch {
    /// Recipe name.
    pub nombre: String,
    /// Preparation time in minutes.
    pub tiempo: i32,
    /// Optional preparation notes.
    pub descripcion: Option<String>,
}

impl Recurso for Receta {
    type Draft = RecetaDraft;
    type Patch = RecetaPatch;
    type Key = i32;

    const COLLECTION: &'static str = "receta";
    const PLURAL: &'static str = "recetas";
    const PERMISSION: &'static str = "RECETA";
    const LABEL: &'static str = "Receta";
    const NOT_FOUND: &'static str = "Receta no encontrada";

    fn key(&self) -> Self::Key {
        self.id
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        draft.nombre.clone()
    }
}

/// A production run executing one recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Produccion {
    /// Generated run id; the business key.
    pub id: i32,
    /// What was produced.
    pub descripcion: String,
    /// Production date.
    pub fecha: NaiveDate,
    /// Time the run started.
    pub hora_inicio: NaiveTime,
    /// Whether the run has finished.
    pub terminado: bool,
    /// Recipe being executed; must exist.
    pub id_receta: i32,
}

/// Production-run fields; create and update accept the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProduccionDraft {
    /// What was produced.
    pub descripcion: String,
    /// Production date.
    pub fecha: NaiveDate,
    /// Time the run started.
    pub hora_inicio: NaiveTime,
    /// Whether the run has finished.
    pub terminado: bool,
    /// Recipe being executed; must exist.
    pub id_receta: i32,
}

impl Recurso for Produccion {
    type Draft = ProduccionDraft;
    type Patch = ProduccionDraft;
    type Key = i32;

    const COLLECTION: &'static str = "produccion";
    const PLURAL: &'static str = "producciones";
    const PERMISSION: &'static str = "PRODUCCION";
    const LABEL: &'static str = "Producción";
    const NOT_FOUND: &'static str = "Producción no encontrada.";

    fn key(&self) -> Self::Key {
        self.id
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        draft.descripcion.clone()
    }
}

/// Composite key of a worker's participation in a production run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaveParticipa {
    /// Participating user.
    pub id_usuario: i32,
    /// Production run.
    pub id_produccion: i32,
}

impl fmt::Display for ClaveParticipa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id_usuario, self.id_produccion)
    }
}

/// A worker's participation in a production run. Each user appears at most
/// once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participa {
    /// Participating user.
    pub id_usuario: i32,
    /// Production run.
    pub id_produccion: i32,
    /// Date the user took part.
    pub fecha: NaiveDate,
}

/// Mutable participation fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipaPatch {
    /// Date the user took part.
    pub fecha: NaiveDate,
}

impl Recurso for Participa {
    type Draft = Participa;
    type Patch = ParticipaPatch;
    type Key = ClaveParticipa;

    const COLLECTION: &'static str = "participa";
    const PLURAL: &'static str = "participaciones";
    const PERMISSION: &'static str = "PARTICIPA";
    const LABEL: &'static str = "Participación";
    const NOT_FOUND: &'static str = "Participación no encontrada.";

    fn key(&self) -> Self::Key {
        ClaveParticipa {
            id_usuario: self.id_usuario,
            id_produccion: self.id_produccion,
        }
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        draft.key().to_string()
    }
}

/// Composite key of one ingredient line of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaveDetalleReceta {
    /// Recipe the line belongs to.
    pub id_receta: i32,
    /// Supply used as ingredient.
    pub id_insumo: i32,
}

impl fmt::Display for ClaveDetalleReceta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id_receta, self.id_insumo)
    }
}

/// One ingredient line of a recipe. A recipe carries at most one line per
/// supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetalleReceta {
    /// Recipe the line belongs to.
    pub id_receta: i32,
    /// Supply used as ingredient.
    pub id_insumo: i32,
    /// Amount required per batch.
    pub cantidad: f64,
    /// Unit of the amount.
    pub medida: String,
}

/// Mutable fields of an ingredient line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetalleRecetaPatch {
    /// Amount required per batch.
    pub cantidad: f64,
    /// Unit of the amount.
    pub medida: String,
}

impl Recurso for DetalleReceta {
    type Draft = DetalleReceta;
    type Patch = DetalleRecetaPatch;
    type Key = ClaveDetalleReceta;

    const COLLECTION: &'static str = "detalle_receta";
    const PLURAL: &'static str = "detalles de receta";
    const PERMISSION: &'static str = "DETALLE_RECETA";
    const LABEL: &'static str = "Detalle de receta";
    const NOT_FOUND: &'static str = "Detalle de receta no encontrado.";

    fn key(&self) -> Self::Key {
        ClaveDetalleReceta {
            id_receta: self.id_receta,
            id_insumo: self.id_insumo,
        }
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        draft.key().to_string()
    }
}
