use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::layout::Rect;
use tracing::debug;

use crate::{
    domain::FieldKind,
    form::{DraftValue, FormCommand, FormSession, SavePayload, UploadResolution, apply_command},
    presentation::{self, EditorView},
    upload::UploadFile,
};

use super::{
    input::{KeyCommand, classify},
    options::UiOptions,
    rows::{FieldRow, RowTarget, build_rows},
    status::{Status, StatusLine},
    terminal::TerminalGuard,
};

#[derive(Debug)]
pub enum EditorOutcome {
    Saved(SavePayload),
    Cancelled,
}

/// Full-screen editor over one `FormSession`.
pub struct FormEditor {
    session: FormSession,
    options: UiOptions,
    status: StatusLine,
    focus: usize,
    exit_armed: bool,
    outcome: Option<EditorOutcome>,
}

impl FormEditor {
    pub fn new(session: FormSession) -> Self {
        Self {
            session,
            options: UiOptions::default(),
            status: StatusLine::new(),
            focus: 0,
            exit_armed: false,
            outcome: None,
        }
    }

    pub fn with_options(mut self, options: UiOptions) -> Self {
        self.options = options;
        self
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    /// Hand the session back, e.g. to persist it through a `ManagePage`.
    pub fn into_session(self) -> FormSession {
        self.session
    }

    pub fn run(&mut self) -> Result<EditorOutcome> {
        let mut terminal = TerminalGuard::enter()?;
        self.outcome = None;
        while self.outcome.is_none() {
            terminal.draw(|frame| self.draw(frame))?;
            if !event::poll(self.options.tick_rate)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => self.handle_key(key),
                Event::Resize(width, height) => {
                    terminal.resize(Rect::new(0, 0, width, height))?;
                }
                _ => {}
            }
        }
        drop(terminal);
        Ok(self.finish())
    }

    fn finish(&mut self) -> EditorOutcome {
        self.outcome.take().unwrap_or(EditorOutcome::Cancelled)
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let schema = self.session.schema();
        let tab_titles: Vec<String> = self
            .session
            .tabs()
            .iter()
            .map(|id| {
                schema
                    .tab(id)
                    .map(|tab| tab.title.clone())
                    .unwrap_or_else(|| id.clone())
            })
            .collect();
        let rows = build_rows(&self.session);
        presentation::draw(
            frame,
            &EditorView {
                title: &schema.title,
                editing: self.session.draft().record_id().is_some(),
                tab_titles: &tab_titles,
                active_tab: self.session.active_tab_index(),
                rows: &rows,
                focus: self.focus,
                status: self.status.message(),
                status_alert: self.status.is_alert(),
                dirty: self.session.is_dirty(),
                error_count: self.session.error_count(),
                help: self.options.help_text(),
            },
        );
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let command = classify(&key);
        if command != KeyCommand::Cancel {
            self.exit_armed = false;
        }
        let rows = build_rows(&self.session);
        let focused = rows.get(self.focus).cloned();
        match command {
            KeyCommand::Save => self.on_save(),
            KeyCommand::Cancel => self.on_cancel(),
            KeyCommand::NextTab => self.switch_tab(FormCommand::NextTab),
            KeyCommand::PrevTab => self.switch_tab(FormCommand::PrevTab),
            KeyCommand::NextRow => self.move_focus(&rows, 1),
            KeyCommand::PrevRow => self.move_focus(&rows, -1),
            KeyCommand::AddItem => self.add_item(focused.as_ref()),
            KeyCommand::RemoveItem => self.remove_item(focused.as_ref()),
            KeyCommand::Upload => self.upload(focused.as_ref()),
            KeyCommand::Cycle(delta) => {
                if let Some(RowTarget::Field(field)) = focused.map(|row| row.target) {
                    self.dispatch(FormCommand::CycleChoice { field, delta });
                }
            }
            KeyCommand::Enter => match focused {
                Some(row) if row.multiline => self.edit_text(&row, |text| text.push('\n')),
                _ => self.move_focus(&rows, 1),
            },
            KeyCommand::Backspace => {
                if let Some(row) = focused {
                    self.edit_text(&row, |text| {
                        text.pop();
                    });
                }
            }
            KeyCommand::Insert(ch) => {
                if let Some(row) = focused {
                    self.insert_char(&row, ch);
                }
            }
            KeyCommand::None => {}
        }
    }

    fn dispatch(&mut self, command: FormCommand) -> bool {
        apply_command(&mut self.session, command)
    }

    fn switch_tab(&mut self, command: FormCommand) {
        if self.dispatch(command) {
            self.focus = 0;
            self.status.set(Status::Ready);
        }
    }

    fn move_focus(&mut self, rows: &[FieldRow], delta: isize) {
        if rows.is_empty() {
            self.focus = 0;
            return;
        }
        let last = rows.len() - 1;
        self.focus = self.focus.saturating_add_signed(delta).min(last);
    }

    fn insert_char(&mut self, row: &FieldRow, ch: char) {
        if let RowTarget::Field(field) = &row.target
            && let Some(DraftValue::Bool(current)) = self.session.value(field)
        {
            if ch == ' ' {
                let value = !*current;
                self.dispatch(FormCommand::SetBool {
                    field: field.clone(),
                    value,
                });
            }
            return;
        }
        self.edit_text(row, |text| text.push(ch));
    }

    /// Applies `edit` to the text behind `row`; choice, boolean and collection
    /// rows have no text buffer and are left alone.
    fn edit_text(&mut self, row: &FieldRow, edit: impl FnOnce(&mut String)) {
        let command = match &row.target {
            RowTarget::Field(field) => {
                let Some(mut text) = self.session.text(field).map(str::to_string) else {
                    return;
                };
                edit(&mut text);
                FormCommand::SetText {
                    field: field.clone(),
                    value: text,
                }
            }
            RowTarget::Item {
                collection,
                index,
                key,
            } => {
                let mut text = row.value.clone();
                edit(&mut text);
                FormCommand::UpdateItem {
                    collection: collection.clone(),
                    index: *index,
                    field: key.clone(),
                    value: text,
                }
            }
        };
        if self.dispatch(command) {
            self.status.set(Status::Editing(row.label.clone()));
        }
    }

    fn add_item(&mut self, focused: Option<&FieldRow>) {
        let Some(collection) = focused.and_then(|row| self.collection_of(row)) else {
            self.status.set(Status::NeedsCollection);
            return;
        };
        if self.dispatch(FormCommand::AddItem {
            collection: collection.clone(),
        }) {
            let rows = build_rows(&self.session);
            if let Some(position) = rows
                .iter()
                .rposition(|row| row.target.collection() == Some(collection.as_str()))
            {
                let width = self.template_width(&collection);
                self.focus = (position + 1).saturating_sub(width);
            }
            self.status.set(Status::ItemAdded {
                collection: self.collection_title(&collection),
                count: self.collection_len(&collection),
            });
        }
    }

    fn remove_item(&mut self, focused: Option<&FieldRow>) {
        let Some(RowTarget::Item {
            collection, index, ..
        }) = focused.map(|row| &row.target)
        else {
            self.status.set(Status::NeedsItem);
            return;
        };
        if self.dispatch(FormCommand::RemoveItem {
            collection: collection.clone(),
            index: *index,
        }) {
            let rows = build_rows(&self.session);
            self.focus = self.focus.min(rows.len().saturating_sub(1));
            self.status.set(Status::ItemRemoved {
                collection: self.collection_title(collection),
                count: self.collection_len(collection),
            });
        }
    }

    fn collection_of(&self, row: &FieldRow) -> Option<String> {
        match &row.target {
            RowTarget::Item { collection, .. } => Some(collection.clone()),
            RowTarget::Field(field) => self
                .session
                .schema()
                .field(field)
                .filter(|schema| schema.kind.is_collection())
                .map(|schema| schema.name.clone()),
        }
    }

    fn collection_title(&self, collection: &str) -> String {
        self.session
            .schema()
            .field(collection)
            .map_or_else(|| collection.to_string(), |field| field.title.clone())
    }

    fn collection_len(&self, collection: &str) -> usize {
        self.session
            .draft()
            .collection(collection)
            .map_or(0, |items| items.len())
    }

    fn template_width(&self, collection: &str) -> usize {
        match self.session.schema().field(collection).map(|field| &field.kind) {
            Some(FieldKind::Collection(template)) => template.fields.len(),
            _ => 1,
        }
    }

    fn upload(&mut self, focused: Option<&FieldRow>) {
        let Some(RowTarget::Field(field)) = focused.map(|row| &row.target) else {
            self.status.set(Status::NeedsUploadField);
            return;
        };
        let Some(uploader) = self.options.uploader.clone() else {
            self.status.set(Status::UploadsDisabled);
            return;
        };
        let original = self.session.text(field).unwrap_or_default().to_string();
        let separator = match self.session.schema().field(field).map(|f| &f.kind) {
            Some(FieldKind::List { separator }) => Some(separator.as_char()),
            _ => None,
        };
        let (kept, path) = match separator.and_then(|sep| original.rsplit_once(sep)) {
            Some((kept, path)) => (kept.trim_end().to_string(), path.trim().to_string()),
            None => (String::new(), original.trim().to_string()),
        };
        if path.is_empty() {
            self.status.set(Status::NeedsUploadPath);
            return;
        }
        let file = match UploadFile::from_path(&path) {
            Ok(file) => file,
            Err(err) => {
                self.status.problem(err.to_string());
                return;
            }
        };
        if separator.is_some() {
            self.session.set_text(field, kept);
        }
        let result = self.session.upload_with(
            field,
            &file,
            &self.options.upload_policy,
            &uploader,
        );
        match result {
            Ok(UploadResolution::Applied(url)) => self.status.set(Status::Uploaded(url)),
            Ok(UploadResolution::Stale) => {}
            Ok(UploadResolution::Failed(message)) => {
                self.session.set_text(field, original);
                self.status.problem(message);
            }
            Err(err) => {
                self.session.set_text(field, original);
                self.status.problem(err.to_string());
            }
        }
    }

    fn on_save(&mut self) {
        match self.session.submit(|payload| payload) {
            Ok(payload) => {
                debug!(entity = %payload.entity, "editor submitted");
                self.session.mark_saved();
                self.outcome = Some(EditorOutcome::Saved(payload));
            }
            Err(failure) => {
                let rows = build_rows(&self.session);
                self.focus = rows
                    .iter()
                    .position(|row| match &row.target {
                        RowTarget::Field(field) => field == &failure.field,
                        RowTarget::Item { collection, .. } => collection == &failure.field,
                    })
                    .unwrap_or(0);
                self.status.problem(failure.message);
            }
        }
    }

    fn on_cancel(&mut self) {
        if self.options.confirm_exit && self.session.is_dirty() && !self.exit_armed {
            self.exit_armed = true;
            self.status.set(Status::ConfirmDiscard);
            return;
        }
        self.outcome = Some(EditorOutcome::Cancelled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{blogs, events},
        form::EntityForm,
        upload::LocalUploader,
    };
    use chrono::NaiveDate;
    use crossterm::event::{KeyCode, KeyModifiers};
    use serde_json::{Value, json};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn editor(schema: crate::domain::EntitySchema, record: Option<Value>) -> FormEditor {
        let form = EntityForm::new(schema).unwrap();
        FormEditor::new(FormSession::open(form, record.as_ref(), today()))
    }

    fn press(editor: &mut FormEditor, code: KeyCode) {
        editor.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(editor: &mut FormEditor, ch: char) {
        editor.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL));
    }

    fn type_text(editor: &mut FormEditor, text: &str) {
        for ch in text.chars() {
            press(editor, KeyCode::Char(ch));
        }
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let mut editor = editor(blogs(), None);
        type_text(&mut editor, "Hello");
        press(&mut editor, KeyCode::Backspace);
        assert_eq!(editor.session().text("title"), Some("Hell"));
        assert!(editor.session().is_dirty());
    }

    #[test]
    fn save_with_missing_title_returns_to_its_tab() {
        let mut editor = editor(blogs(), Some(json!({"content": "Body"})));
        editor.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL));
        editor.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL));
        assert_eq!(editor.session().active_tab(), "media");

        ctrl(&mut editor, 's');
        assert!(editor.outcome.is_none());
        assert_eq!(editor.session().active_tab(), "basic");
        assert_eq!(editor.focus, 0);
        assert_eq!(editor.status.message(), "Title is required");
    }

    #[test]
    fn save_produces_the_payload() {
        let mut editor = editor(
            blogs(),
            Some(json!({"_id": "b1", "title": "T", "author": "A", "content": "C"})),
        );
        ctrl(&mut editor, 's');
        match editor.finish() {
            EditorOutcome::Saved(payload) => {
                assert_eq!(payload.record_id.as_deref(), Some("b1"));
                assert_eq!(payload.record["title"], json!("T"));
            }
            EditorOutcome::Cancelled => panic!("expected a saved payload"),
        }
    }

    #[test]
    fn escape_asks_twice_when_dirty() {
        let mut editor = editor(blogs(), None);
        type_text(&mut editor, "x");
        press(&mut editor, KeyCode::Esc);
        assert!(editor.outcome.is_none());
        press(&mut editor, KeyCode::Esc);
        assert!(matches!(editor.outcome, Some(EditorOutcome::Cancelled)));
    }

    #[test]
    fn escape_leaves_clean_forms_at_once() {
        let mut editor = editor(blogs(), None);
        press(&mut editor, KeyCode::Esc);
        assert!(matches!(editor.finish(), EditorOutcome::Cancelled));
    }

    #[test]
    fn collection_keys_add_edit_and_remove_items() {
        let mut editor = editor(
            events(),
            Some(json!({"title": "Summit", "speakers": [{"name": "Ada"}]})),
        );
        while editor.session().active_tab() != "people" {
            editor.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL));
        }
        ctrl(&mut editor, 'n');
        let speakers = editor.session().draft().collection("speakers").unwrap();
        assert_eq!(speakers.len(), 2);
        assert_eq!(
            editor.status.status(),
            &Status::ItemAdded {
                collection: "Speakers".into(),
                count: 2
            }
        );
        // focus lands on the new item's first field
        type_text(&mut editor, "Grace");
        let speakers = editor.session().draft().collection("speakers").unwrap();
        assert_eq!(speakers.item(1).unwrap().get("name"), Some("Grace"));

        editor.focus = 0;
        ctrl(&mut editor, 'd');
        let speakers = editor.session().draft().collection("speakers").unwrap();
        assert_eq!(speakers.len(), 1);
        assert_eq!(speakers.item(0).unwrap().get("name"), Some("Grace"));
        assert_eq!(editor.status.message(), "Removed an item; Speakers now has 1");
    }

    #[test]
    fn choices_cycle_and_booleans_toggle() {
        let mut editor = editor(events(), None);
        let rows = build_rows(editor.session());
        editor.focus = rows
            .iter()
            .position(|row| row.target == RowTarget::Field("status".into()))
            .unwrap();
        press(&mut editor, KeyCode::Right);
        assert_eq!(
            editor.session().value("status").unwrap().selected_option(),
            Some("ongoing")
        );

        let mut editor = self::editor(blogs(), None);
        while editor.session().active_tab() != "advanced" {
            editor.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL));
        }
        let rows = build_rows(editor.session());
        editor.focus = rows
            .iter()
            .position(|row| row.target == RowTarget::Field("featured".into()))
            .unwrap();
        press(&mut editor, KeyCode::Char(' '));
        assert_eq!(
            editor.session().value("featured"),
            Some(&DraftValue::Bool(true))
        );
    }

    #[test]
    fn ctrl_u_uploads_the_typed_path() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("cover.png");
        std::fs::write(&source, [0u8; 16]).unwrap();
        let media = dir.path().join("media");

        let mut editor = editor(blogs(), None)
            .with_options(UiOptions::default().with_uploader(LocalUploader::new(&media)));
        while editor.session().active_tab() != "media" {
            editor.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL));
        }
        let rows = build_rows(editor.session());
        editor.focus = rows
            .iter()
            .position(|row| row.target == RowTarget::Field("image".into()))
            .unwrap();
        type_text(&mut editor, source.to_str().unwrap());
        ctrl(&mut editor, 'u');

        let url = editor.session().text("image").unwrap();
        assert!(url.starts_with("/media/"), "got {url}");
        assert!(url.ends_with(".png"));
        assert_eq!(std::fs::read_dir(&media).unwrap().count(), 1);
    }

    #[test]
    fn upload_without_uploader_reports_it() {
        let mut editor = editor(blogs(), None);
        ctrl(&mut editor, 'u');
        assert_eq!(editor.status.message(), "Uploads are not configured");
    }
}
