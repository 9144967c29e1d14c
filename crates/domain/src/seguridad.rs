use serde::{Deserialize, Serialize};

use crate::Recurso;

/// A role grouping a set of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rol {
    /// Generated role id; the business key.
    pub id: i32,
    /// Role name; unique across live rows.
    pub nombre: String,
}

/// Payload to create a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolDraft {
    /// Role name.
    pub nombre: String,
}

/// Mutable role fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolPatch {
    /// Role name.
    pub nombre: String,
}

impl Recurso for Rol {
    type Draft = RolDraft;
    type Patch = RolPatch;
    type Key = i32;

    const COLLECTION: &'static str = "rol";
    const PLURAL: &'static str = "roles";
    const PERMISSION: &'static str = "ROL";
    const LABEL: &'static str = "Rol";
    const NOT_FOUND: &'static str = "Rol no encontrado";

    fn key(&self) -> Self::Key {
        self.id
    }

    fn describe_draft(draft: &Self::Draft) -> String {
        draft.nombre.clone()
    }
}

/// Static permission reference data, seeded by migration and never mutated
/// through the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permiso {
    /// Permission id.
    pub id: i32,
    /// Permission name, e.g. `CREAR_CLIENTE`.
    pub nombre: String,
    /// Human description.
    pub descripcion: String,
}

/// A grant linking one permission to one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolPermiso {
    /// Granted role.
    pub id_rol: i32,
    /// Granted permission.
    pub id_permiso: i32,
}

/// An account able to authenticate. The password hash never leaves the
/// persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usuario {
    /// Generated user id.
    pub id: i32,
    /// Username; unique across live rows and used as the business key.
    pub nombre: String,
    /// Role assigned to the user.
    pub id_rol: i32,
}
