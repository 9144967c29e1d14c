use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// CRUD actions gated by role permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accion {
    /// Create a new row.
    Crear,
    /// Read rows.
    Ver,
    /// Overwrite the mutable fields of a row.
    Modificar,
    /// Remove a row.
    Eliminar,
}

impl Accion {
    /// Returns the permission-name prefix for this action.
    #[must_use]
    pub fn prefijo(self) -> &'static str {
        match self {
            Self::Crear => "CREAR",
            Self::Ver => "VER",
            Self::Modificar => "MODIFICAR",
            Self::Eliminar => "ELIMINAR",
        }
    }

    /// Builds the permission name guarding this action on a resource,
    /// e.g. `MODIFICAR_CLIENTE`.
    #[must_use]
    pub fn permiso(self, recurso: &str) -> String {
        format!("{}_{recurso}", self.prefijo())
    }
}

/// A business entity managed through the uniform CRUD pipeline.
///
/// Implementors provide the naming used for routes, permissions, and audit
/// messages, plus the shapes of their create/update payloads. The generic
/// entity service is instantiated once per implementor.
pub trait Recurso: Clone + Send + Sync + 'static {
    /// Payload accepted by the create operation.
    type Draft: Send + Sync + 'static;
    /// Mutable fields accepted by the update operation.
    type Patch: Send + Sync + 'static;
    /// Business key addressing one live row.
    type Key: Clone + Display + Send + Sync + 'static;

    /// Route collection segment, e.g. `"cliente"`.
    const COLLECTION: &'static str;
    /// Plural form used in list audit messages, e.g. `"clientes"`.
    const PLURAL: &'static str;
    /// Permission suffix, e.g. `"CLIENTE"`.
    const PERMISSION: &'static str;
    /// Human label for audit messages, e.g. `"Cliente"`.
    const LABEL: &'static str;
    /// Message returned when no row matches the key.
    const NOT_FOUND: &'static str;

    /// Returns the business key of this row.
    fn key(&self) -> Self::Key;

    /// Short description of a creation payload for the audit trail.
    fn describe_draft(draft: &Self::Draft) -> String;
}

#[cfg(test)]
mod tests {
    use super::Accion;

    #[test]
    fn permission_names_follow_action_prefix() {
        assert_eq!(Accion::Crear.permiso("CLIENTE"), "CREAR_CLIENTE");
        assert_eq!(Accion::Ver.permiso("PRODUCTO"), "VER_PRODUCTO");
        assert_eq!(Accion::Modificar.permiso("ROL"), "MODIFICAR_ROL");
        assert_eq!(Accion::Eliminar.permiso("PROVEEDOR"), "ELIMINAR_PROVEEDOR");
    }
}
