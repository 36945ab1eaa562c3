use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::domain::CollectionTemplate;

use super::convert::value_to_string;

/// One editable sub-record (a speaker, a team member, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubRecordDraft {
    fields: IndexMap<String, String>,
}

impl SubRecordDraft {
    pub fn empty(template: &CollectionTemplate) -> Self {
        Self {
            fields: template
                .fields
                .iter()
                .map(|name| (name.clone(), String::new()))
                .collect(),
        }
    }

    pub fn from_value(template: &CollectionTemplate, value: &Value) -> Self {
        let mut draft = Self::empty(template);
        if let Value::Object(map) = value {
            for (key, item) in map {
                if (item.is_object() || item.is_array()) && !template.fields.contains(key) {
                    continue;
                }
                draft.fields.insert(key.clone(), value_to_string(item));
            }
        }
        draft
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn is_named(&self, name_field: &str) -> bool {
        self.get(name_field)
            .is_some_and(|name| !name.trim().is_empty())
    }

    fn to_value(&self) -> Value {
        let map = self
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect::<Map<_, _>>();
        Value::Object(map)
    }
}

/// Ordered, index-addressed sub-records of one collection field.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState {
    template: CollectionTemplate,
    items: Vec<SubRecordDraft>,
}

impl CollectionState {
    pub fn new(template: CollectionTemplate) -> Self {
        Self {
            template,
            items: Vec::new(),
        }
    }

    /// Copy the persisted array; an empty or missing one yields a single blank slot.
    pub fn hydrate(template: &CollectionTemplate, value: Option<&Value>) -> Self {
        let mut state = Self::new(template.clone());
        if let Some(Value::Array(items)) = value {
            state.items = items
                .iter()
                .map(|item| SubRecordDraft::from_value(template, item))
                .collect();
        }
        if state.items.is_empty() {
            state.add_item();
        }
        state
    }

    pub fn template(&self) -> &CollectionTemplate {
        &self.template
    }

    pub fn items(&self) -> &[SubRecordDraft] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&SubRecordDraft> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add_item(&mut self) -> usize {
        self.items.push(SubRecordDraft::empty(&self.template));
        self.items.len() - 1
    }

    /// # Panics
    ///
    /// Panics when `index` does not address an existing item.
    pub fn update_field(&mut self, index: usize, field: &str, value: impl Into<String>) {
        self.items[index].set(field, value);
    }

    /// # Panics
    ///
    /// Panics when `index` does not address an existing item.
    pub fn remove_item(&mut self, index: usize) -> SubRecordDraft {
        self.items.remove(index)
    }

    pub fn has_named_item(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.is_named(&self.template.name_field))
    }

    /// Named items in order; blank-named slots are unused and dropped.
    pub fn dehydrate(&self) -> Value {
        Value::Array(
            self.items
                .iter()
                .filter(|item| item.is_named(&self.template.name_field))
                .map(SubRecordDraft::to_value)
                .collect(),
        )
    }
}
