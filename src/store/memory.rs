use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::{ApiError, RecordKey, RecordStore, merge_update, new_record, validate_entity};

/// Records held in process, in insertion order per collection.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: IndexMap<String, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, entity: &str, records: Vec<Value>) -> Self {
        self.collections.insert(entity.to_string(), records);
        self
    }
}

impl RecordStore for MemoryStore {
    fn list(&self, entity: &str) -> Result<Vec<Value>, ApiError> {
        validate_entity(entity)?;
        Ok(self.collections.get(entity).cloned().unwrap_or_default())
    }

    fn create(&mut self, entity: &str, payload: &Map<String, Value>) -> Result<Value, ApiError> {
        validate_entity(entity)?;
        let record = new_record(payload);
        self.collections
            .entry(entity.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn update(
        &mut self,
        entity: &str,
        key: RecordKey<'_>,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        validate_entity(entity)?;
        let record = self
            .collections
            .get_mut(entity)
            .and_then(|records| records.iter_mut().find(|record| key.matches(record)))
            .ok_or_else(|| ApiError::NotFound {
                entity: entity.to_string(),
                id: key.id().to_string(),
            })?;
        merge_update(record, key, payload);
        Ok(record.clone())
    }

    fn delete(&mut self, entity: &str, key: RecordKey<'_>) -> Result<(), ApiError> {
        validate_entity(entity)?;
        let records = self.collections.get_mut(entity);
        let position = records
            .as_ref()
            .and_then(|records| records.iter().position(|record| key.matches(record)));
        match (records, position) {
            (Some(records), Some(index)) => {
                records.remove(index);
                Ok(())
            }
            _ => Err(ApiError::NotFound {
                entity: entity.to_string(),
                id: key.id().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::record_id;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn create_assigns_identity_and_timestamps() {
        let mut store = MemoryStore::new();
        let created = store
            .create("events", &payload(json!({"title": "Meetup"})))
            .unwrap();
        assert!(record_id(&created).is_some());
        assert!(created["createdAt"].is_string());
        assert_eq!(store.list("events").unwrap(), vec![created]);
    }

    #[test]
    fn update_merges_and_keeps_identity() {
        let mut store = MemoryStore::new().with_records(
            "events",
            vec![json!({"_id": "e1", "title": "Old", "views": 4})],
        );
        let updated = store
            .update(
                "events",
                "e1".into(),
                &payload(json!({"title": "New", "_id": "hijack"})),
            )
            .unwrap();
        assert_eq!(updated["_id"], json!("e1"));
        assert_eq!(updated["title"], json!("New"));
        assert_eq!(updated["views"], json!(4));
    }

    #[test]
    fn missing_records_are_not_found() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.delete("events", "nope".into()),
            Err(ApiError::NotFound { .. })
        ));
        assert!(matches!(
            store.update("events", "nope".into(), &Map::new()),
            Err(ApiError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_removes_by_id() {
        let mut store = MemoryStore::new()
            .with_records("blogs", vec![json!({"_id": "a"}), json!({"id": 7})]);
        store.delete("blogs", "7".into()).unwrap();
        assert_eq!(store.list("blogs").unwrap(), vec![json!({"_id": "a"})]);
    }
}
