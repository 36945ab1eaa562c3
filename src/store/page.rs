use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use super::{ApiError, RecordKey, RecordStore, record_id_in};
use crate::domain::EntitySchema;
use crate::form::{EntityForm, FormSession, ValidationFailure, value_to_string};

/// Search text and filter value applied to a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub filter: Option<String>,
}

impl ListingQuery {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn filter(mut self, value: impl Into<String>) -> Self {
        self.filter = Some(value.into());
        self
    }

    pub fn matches(&self, schema: &EntitySchema, record: &Value) -> bool {
        self.matches_search(schema, record) && self.matches_filter(schema, record)
    }

    fn matches_search(&self, schema: &EntitySchema, record: &Value) -> bool {
        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();
        schema
            .search_fields
            .iter()
            .filter_map(|field| record.get(field))
            .any(|value| match value {
                Value::Array(items) => items
                    .iter()
                    .any(|item| value_to_string(item).to_lowercase().contains(&needle)),
                other => value_to_string(other).to_lowercase().contains(&needle),
            })
    }

    fn matches_filter(&self, schema: &EntitySchema, record: &Value) -> bool {
        match (schema.filter_field.as_deref(), self.filter.as_deref()) {
            (Some(field), Some(wanted)) if !wanted.is_empty() => record
                .get(field)
                .is_some_and(|value| value_to_string(value) == wanted),
            _ => true,
        }
    }
}

#[derive(Debug)]
pub enum PageOutcome {
    Saved(Value),
    Deleted(String),
    Invalid(ValidationFailure),
    LoginRequired,
    Failed(String),
}

/// Listing plus create/edit/delete flow for one entity.
pub struct ManagePage<S: RecordStore> {
    form: Arc<EntityForm>,
    store: S,
    records: Vec<Value>,
    query: ListingQuery,
}

impl<S: RecordStore> ManagePage<S> {
    pub fn load(form: Arc<EntityForm>, store: S) -> Result<Self, ApiError> {
        let mut page = Self {
            form,
            store,
            records: Vec::new(),
            query: ListingQuery::default(),
        };
        page.reload()?;
        Ok(page)
    }

    pub fn reload(&mut self) -> Result<(), ApiError> {
        self.records = self.store.list(self.form.name())?;
        Ok(())
    }

    pub fn form(&self) -> &Arc<EntityForm> {
        &self.form
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn query(&self) -> &ListingQuery {
        &self.query
    }

    pub fn set_query(&mut self, query: ListingQuery) {
        self.query = query;
    }

    pub fn visible(&self) -> Vec<&Value> {
        let schema = self.form.schema();
        self.records
            .iter()
            .filter(|record| self.query.matches(schema, record))
            .collect()
    }

    /// Listed record whose id, read through the entity's id keys, is `id`.
    pub fn find(&self, id: &str) -> Option<&Value> {
        let key = self.key(id);
        self.records.iter().find(|record| key.matches(record))
    }

    fn key<'a>(&'a self, id: &'a str) -> RecordKey<'a> {
        RecordKey::under(id, &self.form.schema().id_keys)
    }

    pub fn open_create(&self, today: NaiveDate) -> FormSession {
        FormSession::open(Arc::clone(&self.form), None, today)
    }

    /// `None` when the id is not in the loaded listing.
    pub fn open_edit(&self, id: &str, today: NaiveDate) -> Option<FormSession> {
        let record = self.find(id)?;
        Some(FormSession::open(Arc::clone(&self.form), Some(record), today))
    }

    pub fn save(&mut self, session: &mut FormSession) -> PageOutcome {
        let entity = self.form.name().to_string();
        let id_keys = &self.form.schema().id_keys;
        let store = &mut self.store;
        let submitted = session.submit(|payload| match payload.record_id.as_deref() {
            Some(id) => store.update(&entity, RecordKey::under(id, id_keys), &payload.record),
            None => store.create(&entity, &payload.record),
        });
        match submitted {
            Err(failure) => PageOutcome::Invalid(failure),
            Ok(Ok(saved)) => {
                session.mark_saved();
                let id = record_id_in(&saved, &self.form.schema().id_keys);
                info!(entity = %entity, id = id.as_deref(), "record saved");
                self.reload_after_write();
                PageOutcome::Saved(saved)
            }
            Ok(Err(err)) => {
                let outcome = Self::failure(&entity, err);
                if let PageOutcome::Failed(message) = &outcome {
                    session.set_status(message.clone());
                }
                outcome
            }
        }
    }

    pub fn delete(&mut self, id: &str) -> PageOutcome {
        let entity = self.form.name().to_string();
        let key = RecordKey::under(id, &self.form.schema().id_keys);
        match self.store.delete(&entity, key) {
            Ok(()) => {
                info!(entity = %entity, id, "record deleted");
                self.reload_after_write();
                PageOutcome::Deleted(id.to_string())
            }
            Err(err) => Self::failure(&entity, err),
        }
    }

    fn reload_after_write(&mut self) {
        if let Err(err) = self.reload() {
            warn!(entity = %self.form.name(), error = %err, "listing refresh failed");
        }
    }

    fn failure(entity: &str, err: ApiError) -> PageOutcome {
        if err.is_unauthorized() {
            warn!(entity, "session expired or missing");
            return PageOutcome::LoginRequired;
        }
        warn!(entity, error = %err, "store request failed");
        PageOutcome::Failed(err.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builtin_schemas;
    use crate::store::{MemoryStore, record_id};
    use serde_json::json;

    fn schema(name: &str) -> EntitySchema {
        builtin_schemas()
            .into_iter()
            .find(|schema| schema.name == name)
            .unwrap()
    }

    #[test]
    fn search_is_case_insensitive_and_covers_list_fields() {
        let blogs = schema("blogs");
        let record = json!({"title": "Rust Meetup", "tags": ["Systems", "Async"]});
        assert!(ListingQuery::default().search("meetup").matches(&blogs, &record));
        assert!(ListingQuery::default().search("async").matches(&blogs, &record));
        assert!(!ListingQuery::default().search("python").matches(&blogs, &record));
        assert!(ListingQuery::default().search("   ").matches(&blogs, &record));
    }

    #[test]
    fn filter_matches_the_filter_field_exactly() {
        let events = schema("events");
        let record = json!({"title": "Hack night", "status": "upcoming"});
        assert!(ListingQuery::default().filter("upcoming").matches(&events, &record));
        assert!(!ListingQuery::default().filter("completed").matches(&events, &record));
        assert!(!ListingQuery::default().filter("Upcoming").matches(&events, &record));
    }

    #[test]
    fn visible_keeps_store_order() {
        let form = EntityForm::new(schema("events")).unwrap();
        let store = MemoryStore::new().with_records(
            "events",
            vec![
                json!({"_id": "1", "title": "B", "status": "completed"}),
                json!({"_id": "2", "title": "A", "status": "upcoming"}),
                json!({"_id": "3", "title": "C", "status": "upcoming"}),
            ],
        );
        let mut page = ManagePage::load(form, store).unwrap();
        page.set_query(ListingQuery::default().filter("upcoming"));
        let ids: Vec<_> = page
            .visible()
            .into_iter()
            .filter_map(record_id)
            .collect();
        assert_eq!(ids, vec!["2", "3"]);
    }
}
