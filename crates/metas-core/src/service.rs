// service.rs — MetaService: the goal-creation pipeline.
//
//   draft → validate → MetaStore::save → MetaCreated event
//
// Validation failures return before storage is touched. Events are sent
// only after the row is committed.

use chrono::{Local, NaiveDate, Utc};

use crate::error::MetaError;
use crate::events::{EventDispatcher, MetaEvent};
use crate::meta::{Meta, MetaDraft, MetaFilter};
use crate::report::{export_csv, MetaSummary};
use crate::store::MetaStore;
use crate::validation::validate;

/// Goal operations over an explicitly provided store.
pub struct MetaService {
    store: MetaStore,
    events: EventDispatcher,
}

impl MetaService {
    pub fn new(store: MetaStore, events: EventDispatcher) -> Self {
        Self { store, events }
    }

    pub fn store(&self) -> &MetaStore {
        &self.store
    }

    /// Create a goal, validating its target date against the local calendar.
    pub fn create(&self, draft: &MetaDraft) -> Result<Meta, MetaError> {
        self.create_as_of(draft, Local::now().date_naive())
    }

    /// Create a goal, treating `today` as the current date.
    pub fn create_as_of(&self, draft: &MetaDraft, today: NaiveDate) -> Result<Meta, MetaError> {
        let record = validate(draft, today).map_err(|errors| {
            tracing::warn!(fields = %errors, "rejected goal payload");
            MetaError::Validation(errors)
        })?;

        let meta = self.store.save(record, Utc::now()).inspect_err(|e| {
            tracing::error!("failed to store goal: {}", e);
        })?;

        tracing::info!(
            meta_id = meta.id,
            division = %meta.division,
            indicador = %meta.indicador,
            "goal created"
        );
        self.events.dispatch(&MetaEvent::meta_created(&meta));
        Ok(meta)
    }

    pub fn get(&self, id: i64) -> Result<Meta, MetaError> {
        self.store.get(id)?.ok_or(MetaError::NotFound(id))
    }

    pub fn list(&self, filter: &MetaFilter) -> Result<Vec<Meta>, MetaError> {
        self.store.list_filtered(filter)
    }

    pub fn summary(&self, filter: &MetaFilter) -> Result<MetaSummary, MetaError> {
        Ok(MetaSummary::from_metas(&self.list(filter)?))
    }

    pub fn export_csv(&self, filter: &MetaFilter) -> Result<String, MetaError> {
        Ok(export_csv(&self.list(filter)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LogSink;
    use chrono::Duration;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn draft(division: &str, days_ahead: i64) -> MetaDraft {
        serde_json::from_value(json!({
            "division": division,
            "proceso": "Flotación",
            "indicador": "Consumo Agua",
            "linea_base_anio": 2023,
            "valor_linea_base": 10.5,
            "unidad": "m3/ton",
            "fecha_objetivo": (today() + Duration::days(days_ahead)).to_string(),
            "creado_por": "test@codelco.cl"
        }))
        .unwrap()
    }

    fn service() -> MetaService {
        MetaService::new(MetaStore::open_in_memory().unwrap(), EventDispatcher::new())
    }

    #[test]
    fn create_assigns_id_and_persists() {
        let service = service();
        let meta = service.create_as_of(&draft("Andina", 365), today()).unwrap();

        assert_eq!(meta.division, "Andina");
        assert_eq!(service.get(meta.id).unwrap(), meta);
    }

    #[test]
    fn broken_storage_surfaces_as_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metas.db");
        let service = MetaService::new(MetaStore::open(&path).unwrap(), EventDispatcher::new());
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch("DROP TABLE metas")
            .unwrap();

        let result = service.create_as_of(&draft("Andina", 365), today());
        assert!(matches!(result, Err(MetaError::Storage(_))));
    }

    #[test]
    fn invalid_payload_writes_nothing() {
        let service = service();
        let result = service.create_as_of(&draft("Andina", -10), today());

        match result {
            Err(MetaError::Validation(errors)) => assert!(errors.contains("fecha_objetivo")),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(service.store().count().unwrap(), 0);
    }

    #[test]
    fn duplicate_payloads_create_distinct_goals() {
        let service = service();
        let first = service.create_as_of(&draft("Andina", 30), today()).unwrap();
        let second = service.create_as_of(&draft("Andina", 30), today()).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn get_missing_is_not_found() {
        assert!(matches!(service().get(12), Err(MetaError::NotFound(12))));
    }

    #[test]
    fn create_emits_event_after_commit() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("events.jsonl");
        let service = MetaService::new(
            MetaStore::open_in_memory().unwrap(),
            EventDispatcher::new().with_sink(Box::new(LogSink::new(&log))),
        );

        let meta = service.create_as_of(&draft("Salvador", 90), today()).unwrap();
        let _ = service.create_as_of(&draft("", 90), today());

        let content = fs::read_to_string(&log).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains(&format!("\"meta_id\":{}", meta.id)));
    }

    #[test]
    fn summary_and_export_respect_filter() {
        let service = service();
        service.create_as_of(&draft("Andina", 30), today()).unwrap();
        service.create_as_of(&draft("Salvador", 30), today()).unwrap();

        let filter = MetaFilter {
            division: Some("salvador".into()),
            ..Default::default()
        };
        assert_eq!(service.summary(&filter).unwrap().total, 1);

        let csv = service.export_csv(&filter).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains("Salvador"));
    }
}
