use std::sync::Arc;

use panaderia_core::{AppError, AppResult, AuthenticatedUser};
use panaderia_domain::{Accion, Bitacora, DetalleBitacora};

use crate::{AuthorizationService, SessionStore};

/// Read access to the audit trail. Reads here are not themselves audited;
/// the trail never records its own consultation.
#[derive(Clone)]
pub struct AuditService {
    sessions: Arc<dyn SessionStore>,
    authorization: AuthorizationService,
}

impl AuditService {
    /// Creates the service from its ports.
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionStore>, authorization: AuthorizationService) -> Self {
        Self {
            sessions,
            authorization,
        }
    }

    /// Returns all audit sessions, most recent first.
    pub async fn list_sessions(&self, actor: &AuthenticatedUser) -> AppResult<Vec<Bitacora>> {
        self.authorization
            .require(actor, Accion::Ver, "BITACORA")
            .await?;

        self.sessions.list().await
    }

    /// Returns one audit session.
    pub async fn get_session(&self, actor: &AuthenticatedUser, id: i64) -> AppResult<Bitacora> {
        self.authorization
            .require(actor, Accion::Ver, "BITACORA")
            .await?;

        self.sessions
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Bitácora no encontrada.".to_owned()))
    }

    /// Returns the events recorded under one session, most recent first.
    pub async fn list_events(
        &self,
        actor: &AuthenticatedUser,
        id_bitacora: i64,
    ) -> AppResult<Vec<DetalleBitacora>> {
        self.authorization
            .require(actor, Accion::Ver, "BITACORA")
            .await?;

        let events = self.sessions.list_events(id_bitacora).await?;
        if events.is_empty() {
            return Err(AppError::NotFound(
                "No se encontraron detalles para esta bitácora.".to_owned(),
            ));
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use panaderia_core::{AppError, AppResult, AuthenticatedUser};
    use panaderia_domain::{Bitacora, DetalleBitacora};

    use super::AuditService;
    use crate::{AuthorizationService, AuthorizationStore, SessionStore};

    struct FakeSessionStore {
        sessions: Vec<Bitacora>,
        events: Vec<DetalleBitacora>,
    }

    impl FakeSessionStore {
        fn seeded() -> AppResult<Self> {
            let fecha = NaiveDate::from_ymd_opt(2024, 5, 2)
                .ok_or_else(|| AppError::Internal("bad date".to_owned()))?;
            let hora = NaiveTime::from_hms_opt(9, 30, 0)
                .ok_or_else(|| AppError::Internal("bad time".to_owned()))?;
            Ok(Self {
                sessions: vec![Bitacora {
                    id: 7,
                    id_usuario: 1,
                    usuario: "ana".to_owned(),
                    ip: "10.0.0.1".to_owned(),
                    fecha_inicio: fecha,
                    hora_inicio: hora,
                    fecha_fin: None,
                    hora_fin: None,
                }],
                events: vec![DetalleBitacora {
                    id: 1,
                    id_bitacora: 7,
                    metodo: "POST".to_owned(),
                    ruta: "api/cliente".to_owned(),
                    mensaje: "Cliente 'Ana' creado".to_owned(),
                    fecha: Utc::now(),
                    usuario: "ana".to_owned(),
                }],
            })
        }
    }

    #[async_trait]
    impl SessionStore for FakeSessionStore {
        async fn open(&self, _id_usuario: i32, _ip: &str) -> AppResult<i64> {
            Err(AppError::Internal("not used in this test".to_owned()))
        }

        async fn close(&self, _id: i64) -> AppResult<()> {
            Err(AppError::Internal("not used in this test".to_owned()))
        }

        async fn list(&self) -> AppResult<Vec<Bitacora>> {
            Ok(self.sessions.clone())
        }

        async fn find(&self, id: i64) -> AppResult<Option<Bitacora>> {
            Ok(self.sessions.iter().find(|s| s.id == id).cloned())
        }

        async fn list_events(&self, id_bitacora: i64) -> AppResult<Vec<DetalleBitacora>> {
            Ok(self
                .events
                .iter()
                .filter(|event| event.id_bitacora == id_bitacora)
                .cloned()
                .collect())
        }
    }

    struct FakeAuthorizationStore;

    #[async_trait]
    impl AuthorizationStore for FakeAuthorizationStore {
        async fn permissions_for_role(&self, id_rol: i32) -> AppResult<BTreeSet<String>> {
            let roles = HashMap::from([(1, BTreeSet::from(["VER_BITACORA".to_owned()]))]);
            Ok(roles.get(&id_rol).cloned().unwrap_or_default())
        }
    }

    fn service() -> AppResult<AuditService> {
        Ok(AuditService::new(
            Arc::new(FakeSessionStore::seeded()?),
            AuthorizationService::new(Arc::new(FakeAuthorizationStore)),
        ))
    }

    #[tokio::test]
    async fn sessions_and_their_events_are_readable() -> AppResult<()> {
        let service = service()?;
        let auditor = AuthenticatedUser::new(1, "ana", 1, 7);

        let sessions = service.list_sessions(&auditor).await?;
        assert_eq!(sessions.len(), 1);

        let session = service.get_session(&auditor, 7).await?;
        assert_eq!(session.usuario, "ana");

        let events = service.list_events(&auditor, 7).await?;
        assert_eq!(events[0].mensaje, "Cliente 'Ana' creado");
        Ok(())
    }

    #[tokio::test]
    async fn missing_session_and_empty_trail_are_not_found() -> AppResult<()> {
        let service = service()?;
        let auditor = AuthenticatedUser::new(1, "ana", 1, 7);

        let missing = service.get_session(&auditor, 99).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let empty = service.list_events(&auditor, 99).await;
        assert!(matches!(empty, Err(AppError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn trail_is_hidden_from_unprivileged_roles() -> AppResult<()> {
        let service = service()?;
        let outsider = AuthenticatedUser::new(5, "vend", 2, 9);

        let result = service.list_sessions(&outsider).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        Ok(())
    }
}
