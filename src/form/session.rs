use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
    domain::{EntitySchema, FieldKind},
    upload::{ImageUploader, UploadError, UploadFile, UploadPolicy, UploadedImage},
};

use super::{
    draft::FormDraft,
    entity::EntityForm,
    error::ValidationFailure,
    normalize::{dehydrate, hydrate},
    tabs::TabCursor,
    value::DraftValue,
};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

/// What a successful submit hands to the caller's save callback.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePayload {
    pub entity: String,
    pub record_id: Option<String>,
    pub record: Map<String, Value>,
}

impl SavePayload {
    pub fn into_value(self) -> Value {
        Value::Object(self.record)
    }
}

/// Proof that an upload was started for one field of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    session: u64,
    field: String,
}

impl UploadTicket {
    pub fn field(&self) -> &str {
        &self.field
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResolution {
    Applied(String),
    Failed(String),
    /// The ticket belongs to another session or was already resolved.
    Stale,
}

/// One open create/edit form. Owns the draft until submit or cancel.
#[derive(Debug, Clone)]
pub struct FormSession {
    id: u64,
    form: Arc<EntityForm>,
    draft: FormDraft,
    tabs: TabCursor,
    errors: IndexMap<String, String>,
    uploading: HashSet<String>,
    status: Option<String>,
    dirty: bool,
}

impl FormSession {
    pub fn open(form: Arc<EntityForm>, record: Option<&Value>, today: NaiveDate) -> Self {
        let draft = hydrate(form.schema(), record, today);
        let tabs = TabCursor::new(form.schema().tab_ids());
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        debug!(
            session = id,
            entity = form.name(),
            record = draft.record_id().unwrap_or("<new>"),
            "opened form"
        );
        Self {
            id,
            form,
            draft,
            tabs,
            errors: IndexMap::new(),
            uploading: HashSet::new(),
            status: None,
            dirty: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn schema(&self) -> &EntitySchema {
        self.form.schema()
    }

    pub fn mode(&self) -> FormMode {
        match self.draft.record_id() {
            Some(id) => FormMode::Edit(id.to_string()),
            None => FormMode::Create,
        }
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn value(&self, field: &str) -> Option<&DraftValue> {
        self.draft.value(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.draft.text(field)
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_uploading(&self, field: &str) -> bool {
        self.uploading.contains(field)
    }

    pub fn tabs(&self) -> &[String] {
        self.tabs.tabs()
    }

    pub fn active_tab(&self) -> &str {
        self.tabs.active()
    }

    pub fn active_tab_index(&self) -> usize {
        self.tabs.active_index()
    }

    pub fn has_next_tab(&self) -> bool {
        self.tabs.has_next()
    }

    pub fn has_previous_tab(&self) -> bool {
        self.tabs.has_previous()
    }

    pub fn advance_tab(&mut self) -> bool {
        self.tabs.advance()
    }

    pub fn retreat_tab(&mut self) -> bool {
        self.tabs.retreat()
    }

    pub fn set_text(&mut self, field: &str, value: impl Into<String>) -> bool {
        let Some(DraftValue::Text(current)) = self.draft.value_mut(field) else {
            return false;
        };
        *current = value.into();
        self.after_edit(field);
        true
    }

    pub fn set_bool(&mut self, field: &str, value: bool) -> bool {
        let Some(DraftValue::Bool(current)) = self.draft.value_mut(field) else {
            return false;
        };
        *current = value;
        self.after_edit(field);
        true
    }

    pub fn select_choice(&mut self, field: &str, index: usize) -> bool {
        let Some(DraftValue::Choice { options, selected }) = self.draft.value_mut(field) else {
            return false;
        };
        if options.is_empty() {
            return false;
        }
        *selected = index.min(options.len() - 1);
        self.after_edit(field);
        true
    }

    pub fn cycle_choice(&mut self, field: &str, delta: i32) -> bool {
        let Some(DraftValue::Choice { options, selected }) = self.draft.value_mut(field) else {
            return false;
        };
        if options.is_empty() {
            return false;
        }
        let len = options.len() as i64;
        *selected = (*selected as i64 + i64::from(delta)).rem_euclid(len) as usize;
        self.after_edit(field);
        true
    }

    pub fn add_item(&mut self, collection: &str) -> bool {
        let Some(state) = self.draft.collection_mut(collection) else {
            return false;
        };
        let index = state.add_item();
        debug!(session = self.id, collection, index, "added item");
        self.after_edit(collection);
        true
    }

    /// # Panics
    ///
    /// Panics when `index` does not address an existing item.
    pub fn update_item(
        &mut self,
        collection: &str,
        index: usize,
        field: &str,
        value: impl Into<String>,
    ) -> bool {
        let Some(state) = self.draft.collection_mut(collection) else {
            return false;
        };
        state.update_field(index, field, value);
        self.after_edit(collection);
        true
    }

    /// # Panics
    ///
    /// Panics when `index` does not address an existing item.
    pub fn remove_item(&mut self, collection: &str, index: usize) -> bool {
        let Some(state) = self.draft.collection_mut(collection) else {
            return false;
        };
        state.remove_item(index);
        debug!(session = self.id, collection, index, "removed item");
        self.after_edit(collection);
        true
    }

    /// Run the rules without submitting.
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        match self.form.validator().first_failure(&self.draft) {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    pub fn payload(&self) -> SavePayload {
        SavePayload {
            entity: self.draft.entity().to_string(),
            record_id: self.draft.record_id().map(str::to_string),
            record: dehydrate(self.form.schema(), &self.draft),
        }
    }

    /// Validate, then hand the dehydrated draft to `on_save`. On failure the
    /// active tab moves to the failing rule's tab and nothing is saved.
    pub fn submit<R>(
        &mut self,
        on_save: impl FnOnce(SavePayload) -> R,
    ) -> Result<R, ValidationFailure> {
        if let Err(failure) = self.validate() {
            self.tabs.focus(&failure.tab);
            self.status = Some(failure.message.clone());
            self.errors
                .insert(failure.field.clone(), failure.message.clone());
            debug!(
                session = self.id,
                tab = %failure.tab,
                field = %failure.field,
                "submit rejected"
            );
            return Err(failure);
        }
        self.status = None;
        let payload = self.payload();
        info!(
            session = self.id,
            entity = %payload.entity,
            record = payload.record_id.as_deref().unwrap_or("<new>"),
            "submitting form"
        );
        Ok(on_save(payload))
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
        self.status = None;
    }

    /// Discard the draft. Uploads still in flight resolve as stale.
    pub fn cancel(self) {
        debug!(
            session = self.id,
            pending_uploads = self.uploading.len(),
            dirty = self.dirty,
            "form cancelled"
        );
    }

    pub fn begin_upload(
        &mut self,
        field: &str,
        file: &UploadFile,
        policy: &UploadPolicy,
    ) -> Result<UploadTicket, UploadError> {
        let accepts = self.form.schema().field(field).is_some_and(|schema| {
            schema.upload && matches!(schema.kind, FieldKind::Text | FieldKind::List { .. })
        });
        if !accepts {
            return Err(UploadError::NotUploadField {
                field: field.to_string(),
            });
        }
        if self.uploading.contains(field) {
            return Err(UploadError::InProgress {
                field: field.to_string(),
            });
        }
        if let Err(err) = policy.check(file) {
            self.errors.insert(field.to_string(), err.to_string());
            return Err(err);
        }
        self.errors.shift_remove(field);
        self.uploading.insert(field.to_string());
        debug!(session = self.id, field, file = %file.name, "upload started");
        Ok(UploadTicket {
            session: self.id,
            field: field.to_string(),
        })
    }

    pub fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<UploadedImage, UploadError>,
    ) -> UploadResolution {
        if ticket.session != self.id || !self.uploading.remove(&ticket.field) {
            warn!(
                session = self.id,
                ticket_session = ticket.session,
                field = %ticket.field,
                "dropping stale upload result"
            );
            return UploadResolution::Stale;
        }
        match result {
            Ok(image) => {
                self.apply_upload(&ticket.field, &image.url);
                UploadResolution::Applied(image.url)
            }
            Err(err) => {
                let message = err.to_string();
                warn!(session = self.id, field = %ticket.field, error = %message, "upload failed");
                self.errors.insert(ticket.field, message.clone());
                UploadResolution::Failed(message)
            }
        }
    }

    /// Start, perform and resolve an upload in one call.
    pub fn upload_with(
        &mut self,
        field: &str,
        file: &UploadFile,
        policy: &UploadPolicy,
        uploader: &dyn ImageUploader,
    ) -> Result<UploadResolution, UploadError> {
        let ticket = self.begin_upload(field, file, policy)?;
        let result = uploader.upload(file);
        Ok(self.finish_upload(ticket, result))
    }

    fn apply_upload(&mut self, field: &str, url: &str) {
        let separator = match self.form.schema().field(field).map(|schema| &schema.kind) {
            Some(FieldKind::List { separator }) => Some(*separator),
            _ => None,
        };
        let Some(DraftValue::Text(current)) = self.draft.value_mut(field) else {
            return;
        };
        match separator {
            Some(separator) if !current.trim().is_empty() => {
                let kept = current.trim_end().to_string();
                *current = format!("{kept}{}{url}", separator.joiner());
            }
            _ => *current = url.to_string(),
        }
        self.after_edit(field);
    }

    fn after_edit(&mut self, field: &str) {
        self.dirty = true;
        self.errors.shift_remove(field);
    }
}

#[cfg(test)]
#[path = "../tests/form/session_tests.rs"]
mod tests;
