use crate::{
    domain::FieldKind,
    form::{DraftValue, FormSession},
};

/// What a focused row edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RowTarget {
    Field(String),
    Item {
        collection: String,
        index: usize,
        key: String,
    },
}

impl RowTarget {
    pub(crate) fn collection(&self) -> Option<&str> {
        match self {
            RowTarget::Item { collection, .. } => Some(collection),
            RowTarget::Field(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FieldRow {
    pub target: RowTarget,
    pub label: String,
    pub value: String,
    pub error: Option<String>,
    pub multiline: bool,
    pub uploading: bool,
}

/// Rows of the active tab. Collections expand to one row per item field;
/// an empty collection keeps a single placeholder row so items can be added.
pub(crate) fn build_rows(session: &FormSession) -> Vec<FieldRow> {
    let schema = session.schema();
    let mut rows = Vec::new();
    for field in schema.fields_in_tab(session.active_tab()) {
        let error = session.field_error(&field.name).map(str::to_string);
        match (&field.kind, session.value(&field.name)) {
            (FieldKind::Collection(template), Some(DraftValue::Collection(state)))
                if !state.is_empty() =>
            {
                for (index, item) in state.items().iter().enumerate() {
                    for key in &template.fields {
                        rows.push(FieldRow {
                            target: RowTarget::Item {
                                collection: field.name.clone(),
                                index,
                                key: key.clone(),
                            },
                            label: format!("{} #{} {}", field.title, index + 1, key),
                            value: item.get(key).unwrap_or_default().to_string(),
                            error: (index == 0 && key == &template.name_field)
                                .then(|| error.clone())
                                .flatten(),
                            multiline: false,
                            uploading: false,
                        });
                    }
                }
            }
            (_, value) => rows.push(FieldRow {
                target: RowTarget::Field(field.name.clone()),
                label: field.title.clone(),
                value: value.map(DraftValue::display_value).unwrap_or_default(),
                error,
                multiline: field.kind.is_multiline(),
                uploading: session.is_uploading(&field.name),
            }),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::events, form::EntityForm};
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn collections_expand_per_item_field() {
        let form = EntityForm::new(events()).unwrap();
        let record = json!({
            "title": "Summit",
            "speakers": [{"name": "Ada"}, {"name": "Linus"}]
        });
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mut session = FormSession::open(form, Some(&record), today);
        while session.active_tab() != "people" {
            assert!(session.advance_tab());
        }
        let rows = build_rows(&session);
        let labels: Vec<_> = rows.iter().map(|row| row.label.as_str()).collect();
        assert!(labels.contains(&"Speakers #2 name"));
        let linus = rows
            .iter()
            .find(|row| row.label == "Speakers #2 name")
            .unwrap();
        assert_eq!(linus.value, "Linus");
        assert_eq!(linus.target.collection(), Some("speakers"));
    }
}
