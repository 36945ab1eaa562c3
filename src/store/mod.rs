//! Persistence collaborators: the REST-shaped `RecordStore` seam and the
//! listing page that drives it.

mod authorized;
mod error;
mod file;
mod memory;
mod page;

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

pub use authorized::AuthorizedStore;
pub use error::{ApiError, GENERIC_FAILURE};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use page::{ListingQuery, ManagePage, PageOutcome};

pub trait RecordStore {
    fn list(&self, entity: &str) -> Result<Vec<Value>, ApiError>;
    fn create(&mut self, entity: &str, payload: &Map<String, Value>) -> Result<Value, ApiError>;
    fn update(
        &mut self,
        entity: &str,
        key: RecordKey<'_>,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError>;
    fn delete(&mut self, entity: &str, key: RecordKey<'_>) -> Result<(), ApiError>;
}

const DEFAULT_ID_KEYS: [&str; 2] = ["_id", "id"];

/// Addresses one stored record: the id value plus the keys it may live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordKey<'a> {
    id: &'a str,
    keys: Option<&'a [String]>,
}

impl<'a> RecordKey<'a> {
    /// Looked up under `_id`, then `id`.
    pub fn new(id: &'a str) -> Self {
        Self { id, keys: None }
    }

    /// Looked up under an entity's own id keys, first present key wins.
    pub fn under(id: &'a str, keys: &'a [String]) -> Self {
        Self {
            id,
            keys: Some(keys),
        }
    }

    pub fn id(&self) -> &'a str {
        self.id
    }

    pub fn matches(&self, record: &Value) -> bool {
        let found = match self.keys {
            Some(keys) => record_id_in(record, keys),
            None => record_id(record),
        };
        found.as_deref() == Some(self.id)
    }

    fn is_key(&self, name: &str) -> bool {
        match self.keys {
            Some(keys) => keys.iter().any(|key| key == name),
            None => DEFAULT_ID_KEYS.contains(&name),
        }
    }
}

impl<'a> From<&'a str> for RecordKey<'a> {
    fn from(id: &'a str) -> Self {
        Self::new(id)
    }
}

/// Identity of a stored record (`_id`, then `id`).
pub fn record_id(record: &Value) -> Option<String> {
    record_id_in(record, &DEFAULT_ID_KEYS)
}

/// Identity under the first of `keys` that holds a non-empty string or a number.
pub fn record_id_in<K: AsRef<str>>(record: &Value, keys: &[K]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(key.as_ref()) {
        Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

fn new_record(payload: &Map<String, Value>) -> Value {
    let now = Value::String(Utc::now().to_rfc3339());
    let mut record = Map::new();
    record.insert("_id".to_string(), Value::String(Uuid::new_v4().to_string()));
    record.extend(payload.iter().map(|(key, value)| (key.clone(), value.clone())));
    record.insert("createdAt".to_string(), now.clone());
    record.insert("updatedAt".to_string(), now);
    Value::Object(record)
}

fn merge_update(record: &mut Value, key: RecordKey<'_>, payload: &Map<String, Value>) {
    if let Value::Object(map) = record {
        for (name, value) in payload {
            if name == "_id" || key.is_key(name) {
                continue;
            }
            map.insert(name.clone(), value.clone());
        }
        map.insert(
            "updatedAt".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
    }
}

fn validate_entity(entity: &str) -> Result<(), ApiError> {
    let valid = !entity.is_empty()
        && entity
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "invalid collection name '{entity}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn custom_keys_take_the_first_present_value() {
        let keys = vec!["slug".to_string(), "_id".to_string()];
        let record = json!({"_id": "u1", "slug": "about"});
        assert_eq!(record_id(&record).as_deref(), Some("u1"));
        assert_eq!(record_id_in(&record, &keys).as_deref(), Some("about"));
        assert!(RecordKey::under("about", &keys).matches(&record));
        assert!(!RecordKey::under("u1", &keys).matches(&record));
        assert!(RecordKey::new("u1").matches(&record));
    }

    #[test]
    fn updates_never_rewrite_identity() {
        let keys = vec!["slug".to_string()];
        let mut record = json!({"_id": "u1", "slug": "about", "title": "Old"});
        let payload = json!({"_id": "x", "slug": "moved", "title": "New"});
        merge_update(
            &mut record,
            RecordKey::under("about", &keys),
            payload.as_object().unwrap(),
        );
        assert_eq!(record["_id"], json!("u1"));
        assert_eq!(record["slug"], json!("about"));
        assert_eq!(record["title"], json!("New"));
        assert!(record.get("updatedAt").is_some());
    }
}
