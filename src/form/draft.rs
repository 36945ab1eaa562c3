use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::{collection::CollectionState, value::DraftValue};

/// Editable projection of one record, alive only while its form is open.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDraft {
    pub(crate) entity: String,
    pub(crate) record_id: Option<String>,
    pub(crate) values: IndexMap<String, DraftValue>,
    pub(crate) passthrough: Map<String, Value>,
}

impl FormDraft {
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Identity of the record being edited; `None` while creating.
    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    pub fn value(&self, field: &str) -> Option<&DraftValue> {
        self.values.get(field)
    }

    pub fn value_mut(&mut self, field: &str) -> Option<&mut DraftValue> {
        self.values.get_mut(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(DraftValue::as_text)
    }

    pub fn collection(&self, field: &str) -> Option<&CollectionState> {
        self.values.get(field).and_then(DraftValue::as_collection)
    }

    pub fn collection_mut(&mut self, field: &str) -> Option<&mut CollectionState> {
        self.values
            .get_mut(field)
            .and_then(DraftValue::as_collection_mut)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &DraftValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Fields of the source record the schema does not describe.
    pub fn passthrough(&self) -> &Map<String, Value> {
        &self.passthrough
    }

    /// JSON view of the draft itself (joined strings, raw sub-records).
    pub fn to_view(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.values {
            map.insert(key.clone(), value.to_view());
        }
        Value::Object(map)
    }
}
