use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// HTTP verb tag recorded with every audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Metodo {
    /// Create operation.
    Post,
    /// Read operation.
    Get,
    /// Update operation.
    Put,
    /// Delete operation.
    Delete,
}

impl Metodo {
    /// Returns the stable storage value for this verb.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// One audit session, opened at login and closed at logout. Joined with the
/// owning user for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bitacora {
    /// Session id; the audit correlation id carried in the bearer token.
    pub id: i64,
    /// Owning user.
    pub id_usuario: i32,
    /// Owning user's name.
    pub usuario: String,
    /// Client address captured at login.
    pub ip: String,
    /// Login date.
    pub fecha_inicio: NaiveDate,
    /// Login time.
    pub hora_inicio: NaiveTime,
    /// Logout date, if the session was closed.
    pub fecha_fin: Option<NaiveDate>,
    /// Logout time, if the session was closed.
    pub hora_fin: Option<NaiveTime>,
}

/// One append-only audit event: who did what on which resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetalleBitacora {
    /// Event id.
    pub id: i64,
    /// Session the event belongs to.
    pub id_bitacora: i64,
    /// HTTP verb tag.
    pub metodo: String,
    /// Resource path, e.g. `api/cliente/V123`.
    pub ruta: String,
    /// Free-text event message.
    pub mensaje: String,
    /// Timestamp assigned by the datastore.
    pub fecha: DateTime<Utc>,
    /// Name of the user who owned the session.
    pub usuario: String,
}

#[cfg(test)]
mod tests {
    use super::Metodo;

    #[test]
    fn verbs_serialize_as_http_methods() {
        assert_eq!(Metodo::Post.as_str(), "POST");
        assert_eq!(Metodo::Get.as_str(), "GET");
        assert_eq!(Metodo::Put.as_str(), "PUT");
        assert_eq!(Metodo::Delete.as_str(), "DELETE");
    }
}
