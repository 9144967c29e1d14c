use std::sync::Arc;

use panaderia_core::{AppError, AppResult, AuthenticatedUser};
use panaderia_domain::{Accion, Metodo, Recurso};

use crate::{AuditEvent, AuditStore, AuthorizationService, EntityStore};

/// Generic entity controller, instantiated once per business entity.
///
/// Every operation runs the permission guard first, then a conditional
/// write on the store. Mutations hand their audit event to the store so it
/// commits with the row change; reads append the event afterwards.
#[derive(Clone)]
pub struct EntityService<E: Recurso> {
    store: Arc<dyn EntityStore<E>>,
    authorization: AuthorizationService,
    audit: Arc<dyn AuditStore>,
}

impl<E: Recurso> EntityService<E> {
    /// Creates a controller for one entity type.
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore<E>>,
        authorization: AuthorizationService,
        audit: Arc<dyn AuditStore>,
    ) -> Self {
        Self {
            store,
            authorization,
            audit,
        }
    }

    fn collection_path() -> String {
        format!("api/{}", E::COLLECTION)
    }

    fn row_path(key: &E::Key) -> String {
        format!("api/{}/{key}", E::COLLECTION)
    }

    /// Creates a row. `Conflict` when the business key is taken.
    pub async fn create(&self, actor: &AuthenticatedUser, draft: E::Draft) -> AppResult<E> {
        self.authorization
            .require(actor, Accion::Crear, E::PERMISSION)
            .await?;

        let audit = AuditEvent::new(
            actor,
            Metodo::Post,
            Self::collection_path(),
            format!("{} '{}' creado", E::LABEL, E::describe_draft(&draft)),
        );

        self.store.insert(draft, audit).await
    }

    /// Returns all rows in stable display order.
    pub async fn list(&self, actor: &AuthenticatedUser) -> AppResult<Vec<E>> {
        self.authorization
            .require(actor, Accion::Ver, E::PERMISSION)
            .await?;

        let rows = self.store.list().await?;

        self.audit
            .append(AuditEvent::new(
                actor,
                Metodo::Get,
                Self::collection_path(),
                format!("Consulta de todos los {}", E::PLURAL),
            ))
            .await?;

        Ok(rows)
    }

    /// Returns one row. `NotFound` when the key does not match.
    pub async fn get(&self, actor: &AuthenticatedUser, key: E::Key) -> AppResult<E> {
        self.authorization
            .require(actor, Accion::Ver, E::PERMISSION)
            .await?;

        let row = self
            .store
            .find(&key)
            .await?
            .ok_or_else(|| AppError::NotFound(E::NOT_FOUND.to_owned()))?;

        self.audit
            .append(AuditEvent::new(
                actor,
                Metodo::Get,
                Self::row_path(&key),
                format!("Consulta del {} {key}", E::COLLECTION),
            ))
            .await?;

        Ok(row)
    }

    /// Overwrites the mutable fields of a row. `NotFound` when the key does
    /// not match.
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        key: E::Key,
        patch: E::Patch,
    ) -> AppResult<E> {
        self.authorization
            .require(actor, Accion::Modificar, E::PERMISSION)
            .await?;

        let audit = AuditEvent::new(
            actor,
            Metodo::Put,
            Self::row_path(&key),
            format!("{} '{key}' actualizado", E::LABEL),
        );

        self.store.update(&key, patch, audit).await
    }

    /// Removes a row. `NotFound` when the key does not match.
    pub async fn delete(&self, actor: &AuthenticatedUser, key: E::Key) -> AppResult<E> {
        self.authorization
            .require(actor, Accion::Eliminar, E::PERMISSION)
            .await?;

        let audit = AuditEvent::new(
            actor,
            Metodo::Delete,
            Self::row_path(&key),
            format!("{} '{key}' eliminado", E::LABEL),
        );

        self.store.delete(&key, audit).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet, HashMap};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use panaderia_core::{AppError, AppResult, AuthenticatedUser};
    use panaderia_domain::{Cliente, ClientePatch, Metodo};
    use tokio::sync::Mutex;

    use super::EntityService;
    use crate::{AuditEvent, AuditStore, AuthorizationService, AuthorizationStore, EntityStore};

    /// Records events; can be armed to reject the next append, standing in
    /// for an unavailable audit trail.
    #[derive(Default)]
    struct EventSink {
        events: Mutex<Vec<AuditEvent>>,
        fail_next: AtomicBool,
    }

    impl EventSink {
        fn fail_next_append(&self) {
            self.fail_next.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl AuditStore for EventSink {
        async fn append(&self, event: AuditEvent) -> AppResult<()> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(AppError::Internal("bitacora no disponible".to_owned()));
            }
            self.events.lock().await.push(event);
            Ok(())
        }
    }

    /// In-memory client store that records its audit events into the shared
    /// sink, mirroring the atomic mutation+audit contract: the event is
    /// appended before the row change lands, so a sink failure leaves the
    /// rows untouched.
    struct FakeClienteStore {
        rows: Mutex<BTreeMap<String, Cliente>>,
        sink: Arc<EventSink>,
    }

    impl FakeClienteStore {
        fn new(sink: Arc<EventSink>) -> Self {
            Self {
                rows: Mutex::new(BTreeMap::new()),
                sink,
            }
        }
    }

    #[async_trait]
    impl EntityStore<Cliente> for FakeClienteStore {
        async fn insert(&self, draft: Cliente, audit: AuditEvent) -> AppResult<Cliente> {
            let mut rows = self.rows.lock().await;
            if rows.contains_key(&draft.ci) {
                return Err(AppError::Conflict(
                    "El cliente con este CI ya existe.".to_owned(),
                ));
            }
            self.sink.append(audit).await?;
            rows.insert(draft.ci.clone(), draft.clone());
            Ok(draft)
        }

        async fn list(&self) -> AppResult<Vec<Cliente>> {
            let mut rows: Vec<Cliente> = self.rows.lock().await.values().cloned().collect();
            rows.sort_by(|a, b| a.nombre.cmp(&b.nombre));
            Ok(rows)
        }

        async fn find(&self, key: &String) -> AppResult<Option<Cliente>> {
            Ok(self.rows.lock().await.get(key).cloned())
        }

        async fn update(
            &self,
            key: &String,
            patch: ClientePatch,
            audit: AuditEvent,
        ) -> AppResult<Cliente> {
            let mut rows = self.rows.lock().await;
            let row = rows
                .get_mut(key)
                .ok_or_else(|| AppError::NotFound("Cliente no encontrado".to_owned()))?;
            self.sink.append(audit).await?;
            row.nombre = patch.nombre;
            row.sexo = patch.sexo;
            row.telefono = patch.telefono;
            Ok(row.clone())
        }

        async fn delete(&self, key: &String, audit: AuditEvent) -> AppResult<Cliente> {
            let mut rows = self.rows.lock().await;
            if !rows.contains_key(key) {
                return Err(AppError::NotFound("Cliente no encontrado".to_owned()));
            }
            self.sink.append(audit).await?;
            let removed = rows
                .remove(key)
                .ok_or_else(|| AppError::NotFound("Cliente no encontrado".to_owned()))?;
            Ok(removed)
        }
    }

    struct FakeAuthorizationStore {
        roles: HashMap<i32, BTreeSet<String>>,
    }

    #[async_trait]
    impl AuthorizationStore for FakeAuthorizationStore {
        async fn permissions_for_role(&self, id_rol: i32) -> AppResult<BTreeSet<String>> {
            Ok(self.roles.get(&id_rol).cloned().unwrap_or_default())
        }
    }

    const FULL_ACCESS_ROLE: i32 = 1;
    const NO_ACCESS_ROLE: i32 = 2;

    fn service_with_sink() -> (EntityService<Cliente>, Arc<EventSink>) {
        let sink = Arc::new(EventSink::default());
        let store = Arc::new(FakeClienteStore::new(sink.clone()));
        let guard = AuthorizationService::new(Arc::new(FakeAuthorizationStore {
            roles: HashMap::from([(
                FULL_ACCESS_ROLE,
                BTreeSet::from([
                    "CREAR_CLIENTE".to_owned(),
                    "VER_CLIENTE".to_owned(),
                    "MODIFICAR_CLIENTE".to_owned(),
                    "ELIMINAR_CLIENTE".to_owned(),
                ]),
            )]),
        }));
        (EntityService::new(store, guard, sink.clone()), sink)
    }

    fn actor(id_rol: i32) -> AuthenticatedUser {
        AuthenticatedUser::new(1, "ana", id_rol, 7)
    }

    fn ana() -> Cliente {
        Cliente {
            ci: "V123".to_owned(),
            nombre: "Ana".to_owned(),
            sexo: "F".to_owned(),
            telefono: "555".to_owned(),
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_written_fields() -> AppResult<()> {
        let (service, _sink) = service_with_sink();
        let actor = actor(FULL_ACCESS_ROLE);

        service.create(&actor, ana()).await?;
        let row = service.get(&actor, "V123".to_owned()).await?;
        assert_eq!(row, ana());
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_create_conflicts_and_keeps_one_row() -> AppResult<()> {
        let (service, _sink) = service_with_sink();
        let actor = actor(FULL_ACCESS_ROLE);

        service.create(&actor, ana()).await?;
        let second = service.create(&actor, ana()).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));

        let rows = service.list(&actor).await?;
        assert_eq!(rows.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_on_missing_key_return_not_found() {
        let (service, sink) = service_with_sink();
        let actor = actor(FULL_ACCESS_ROLE);

        let patch = ClientePatch {
            nombre: "Ana Maria".to_owned(),
            sexo: "F".to_owned(),
            telefono: "555".to_owned(),
        };
        let updated = service.update(&actor, "V999".to_owned(), patch).await;
        assert!(matches!(updated, Err(AppError::NotFound(_))));

        let deleted = service.delete(&actor, "V999".to_owned()).await;
        assert!(matches!(deleted, Err(AppError::NotFound(_))));

        // Failed mutations leave no trace in the trail.
        assert!(sink.events.lock().await.is_empty());
    }

    #[tokio::test]
    async fn caller_without_permission_never_reaches_the_store() {
        let (service, sink) = service_with_sink();
        let outsider = actor(NO_ACCESS_ROLE);

        let result = service.create(&outsider, ana()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        // No row written, no audit event emitted.
        let admin = actor(FULL_ACCESS_ROLE);
        let rows = service.list(&admin).await.unwrap_or_default();
        assert!(rows.is_empty());
        assert_eq!(sink.events.lock().await.len(), 1); // only the list above
    }

    #[tokio::test]
    async fn every_successful_mutation_emits_exactly_one_event() -> AppResult<()> {
        let (service, sink) = service_with_sink();
        let actor = actor(FULL_ACCESS_ROLE);

        service.create(&actor, ana()).await?;
        let patch = ClientePatch {
            nombre: "Ana Maria".to_owned(),
            sexo: "F".to_owned(),
            telefono: "555".to_owned(),
        };
        service.update(&actor, "V123".to_owned(), patch).await?;
        service.delete(&actor, "V123".to_owned()).await?;

        let events = sink.events.lock().await;
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].metodo, Metodo::Post);
        assert_eq!(events[0].ruta, "api/cliente");
        assert_eq!(events[1].metodo, Metodo::Put);
        assert_eq!(events[1].ruta, "api/cliente/V123");
        assert_eq!(events[2].metodo, Metodo::Delete);
        assert_eq!(events[2].ruta, "api/cliente/V123");
        assert!(events.iter().all(|event| event.id_bitacora == 7));
        Ok(())
    }

    #[tokio::test]
    async fn reads_fail_when_the_audit_trail_is_unavailable() -> AppResult<()> {
        let (service, sink) = service_with_sink();
        let actor = actor(FULL_ACCESS_ROLE);

        service.create(&actor, ana()).await?;

        sink.fail_next_append();
        let listed = service.list(&actor).await;
        assert!(matches!(listed, Err(AppError::Internal(_))));

        sink.fail_next_append();
        let fetched = service.get(&actor, "V123".to_owned()).await;
        assert!(matches!(fetched, Err(AppError::Internal(_))));

        // The trail recovers and so do the reads.
        let rows = service.list(&actor).await?;
        assert_eq!(rows.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn create_rolls_back_when_the_audit_event_cannot_be_written() -> AppResult<()> {
        let (service, sink) = service_with_sink();
        let actor = actor(FULL_ACCESS_ROLE);

        sink.fail_next_append();
        let created = service.create(&actor, ana()).await;
        assert!(matches!(created, Err(AppError::Internal(_))));

        // The mutation rolled back with the event: no row, no trace.
        let rows = service.list(&actor).await?;
        assert!(rows.is_empty());
        let events = sink.events.lock().await;
        assert_eq!(events.len(), 1); // only the list above
        assert_eq!(events[0].metodo, Metodo::Get);
        Ok(())
    }

    #[tokio::test]
    async fn cliente_lifecycle_end_to_end() -> AppResult<()> {
        let (service, _sink) = service_with_sink();
        let actor = actor(FULL_ACCESS_ROLE);

        service.create(&actor, ana()).await?;
        assert!(matches!(
            service.create(&actor, ana()).await,
            Err(AppError::Conflict(_))
        ));

        let stored = service.get(&actor, "V123".to_owned()).await?;
        assert_eq!(stored.nombre, "Ana");

        let patch = ClientePatch {
            nombre: "Ana Maria".to_owned(),
            sexo: "F".to_owned(),
            telefono: "555".to_owned(),
        };
        service.update(&actor, "V123".to_owned(), patch).await?;
        let renamed = service.get(&actor, "V123".to_owned()).await?;
        assert_eq!(renamed.nombre, "Ana Maria");

        service.delete(&actor, "V123".to_owned()).await?;
        assert!(matches!(
            service.get(&actor, "V123".to_owned()).await,
            Err(AppError::NotFound(_))
        ));
        Ok(())
    }
}
