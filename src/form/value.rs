use serde_json::Value;

use super::collection::CollectionState;

#[derive(Debug, Clone, PartialEq)]
pub enum DraftValue {
    /// Free text, dates, numeric buffers and joined list fields.
    Text(String),
    Bool(bool),
    Choice {
        options: Vec<String>,
        selected: usize,
    },
    Collection(CollectionState),
}

impl DraftValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DraftValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionState> {
        match self {
            DraftValue::Collection(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut CollectionState> {
        match self {
            DraftValue::Collection(state) => Some(state),
            _ => None,
        }
    }

    pub fn selected_option(&self) -> Option<&str> {
        match self {
            DraftValue::Choice { options, selected } => options.get(*selected).map(String::as_str),
            _ => None,
        }
    }

    /// Single-line label used by listings and the terminal editor.
    pub fn display_value(&self) -> String {
        match self {
            DraftValue::Text(text) => text.clone(),
            DraftValue::Bool(value) => value.to_string(),
            DraftValue::Choice { .. } => self
                .selected_option()
                .map(str::to_string)
                .unwrap_or_else(|| "<none>".to_string()),
            DraftValue::Collection(state) => format!("{} item(s)", state.len()),
        }
    }

    /// JSON view of the value as it sits in the draft (strings stay joined).
    pub fn to_view(&self) -> Value {
        match self {
            DraftValue::Text(text) => Value::String(text.clone()),
            DraftValue::Bool(value) => Value::Bool(*value),
            DraftValue::Choice { .. } => self
                .selected_option()
                .map(|option| Value::String(option.to_string()))
                .unwrap_or(Value::Null),
            DraftValue::Collection(state) => Value::Array(
                state
                    .items()
                    .iter()
                    .map(|item| {
                        Value::Object(
                            item.fields()
                                .map(|(key, value)| (key.to_string(), Value::String(value.into())))
                                .collect(),
                        )
                    })
                    .collect(),
            ),
        }
    }
}
