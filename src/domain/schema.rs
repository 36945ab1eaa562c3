use std::collections::HashSet;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Declarative description of one editable entity type (events, blogs, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntitySchema {
    /// Collection name used by the record store, e.g. `events`.
    pub name: String,
    /// Singular label shown in titles, e.g. `Event`.
    pub title: String,
    #[serde(default = "default_id_keys")]
    pub id_keys: Vec<String>,
    pub tabs: Vec<TabSchema>,
    pub fields: Vec<FieldSchema>,
    #[serde(default)]
    pub rules: Vec<RuleSchema>,
    #[serde(default)]
    pub search_fields: Vec<String>,
    #[serde(default)]
    pub filter_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TabSchema {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSchema {
    pub name: String,
    pub title: String,
    pub tab: String,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Field accepts image upload results (a URL for text, one more URL for lists).
    #[serde(default, skip_serializing_if = "is_false")]
    pub upload: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    LongText,
    Date,
    Integer {
        #[serde(default)]
        fallback: i64,
    },
    Number {
        #[serde(default)]
        fallback: f64,
    },
    Boolean,
    Choice {
        options: Vec<String>,
    },
    List {
        separator: Separator,
    },
    Collection(CollectionTemplate),
}

impl FieldKind {
    pub fn is_collection(&self) -> bool {
        matches!(self, FieldKind::Collection(_))
    }

    pub fn is_multiline(&self) -> bool {
        matches!(
            self,
            FieldKind::LongText
                | FieldKind::List {
                    separator: Separator::Newline
                }
        )
    }
}

/// Separator between tokens of a list field while it is edited as one string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Separator {
    Comma,
    Newline,
}

impl Separator {
    pub fn as_char(self) -> char {
        match self {
            Separator::Comma => ',',
            Separator::Newline => '\n',
        }
    }

    pub fn joiner(self) -> &'static str {
        match self {
            Separator::Comma => ", ",
            Separator::Newline => "\n",
        }
    }
}

/// Empty template and naming of the sub-records inside a collection field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CollectionTemplate {
    pub fields: Vec<String>,
    /// Sub-records with a blank value here are dropped on submit.
    pub name_field: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleSchema {
    pub tab: String,
    pub field: String,
    #[serde(default)]
    pub check: RuleCheck,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleCheck {
    #[default]
    Required,
    Range {
        min: f64,
        max: f64,
    },
    Pattern {
        pattern: String,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{entity}: at least one tab is required")]
    NoTabs { entity: String },
    #[error("{entity}: duplicate tab '{tab}'")]
    DuplicateTab { entity: String, tab: String },
    #[error("{entity}: duplicate field '{field}'")]
    DuplicateField { entity: String, field: String },
    #[error("{entity}: '{owner}' refers to unknown tab '{tab}'")]
    UnknownTab {
        entity: String,
        owner: String,
        tab: String,
    },
    #[error("{entity}: '{owner}' refers to unknown field '{field}'")]
    UnknownField {
        entity: String,
        owner: String,
        field: String,
    },
    #[error("{entity}.{field}: {message}")]
    InvalidField {
        entity: String,
        field: String,
        message: String,
    },
    #[error("{entity}.{field}: invalid pattern: {message}")]
    InvalidPattern {
        entity: String,
        field: String,
        message: String,
    },
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn tab(&self, id: &str) -> Option<&TabSchema> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn tab_ids(&self) -> Vec<String> {
        self.tabs.iter().map(|tab| tab.id.clone()).collect()
    }

    pub fn fields_in_tab<'a>(&'a self, tab: &'a str) -> impl Iterator<Item = &'a FieldSchema> {
        self.fields.iter().filter(move |field| field.tab == tab)
    }

    /// Reject schemas whose references do not line up.
    pub fn check(&self) -> Result<(), SchemaError> {
        let entity = self.name.clone();
        if self.tabs.is_empty() {
            return Err(SchemaError::NoTabs { entity });
        }

        let mut tabs = HashSet::new();
        for tab in &self.tabs {
            if !tabs.insert(tab.id.as_str()) {
                return Err(SchemaError::DuplicateTab {
                    entity,
                    tab: tab.id.clone(),
                });
            }
        }

        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    entity,
                    field: field.name.clone(),
                });
            }
            if !tabs.contains(field.tab.as_str()) {
                return Err(SchemaError::UnknownTab {
                    entity,
                    owner: field.name.clone(),
                    tab: field.tab.clone(),
                });
            }
            match &field.kind {
                FieldKind::Choice { options } if options.is_empty() => {
                    return Err(SchemaError::InvalidField {
                        entity,
                        field: field.name.clone(),
                        message: "choice needs at least one option".to_string(),
                    });
                }
                FieldKind::Collection(template) => {
                    if !template.fields.contains(&template.name_field) {
                        return Err(SchemaError::InvalidField {
                            entity,
                            field: field.name.clone(),
                            message: format!(
                                "name field '{}' is not one of the item fields",
                                template.name_field
                            ),
                        });
                    }
                }
                _ => {}
            }
            if field.upload && !matches!(field.kind, FieldKind::Text | FieldKind::List { .. }) {
                return Err(SchemaError::InvalidField {
                    entity,
                    field: field.name.clone(),
                    message: "only text and list fields accept uploads".to_string(),
                });
            }
        }

        for rule in &self.rules {
            if !tabs.contains(rule.tab.as_str()) {
                return Err(SchemaError::UnknownTab {
                    entity,
                    owner: format!("rule on {}", rule.field),
                    tab: rule.tab.clone(),
                });
            }
            if !names.contains(rule.field.as_str()) {
                return Err(SchemaError::UnknownField {
                    entity,
                    owner: "rule".to_string(),
                    field: rule.field.clone(),
                });
            }
            if let RuleCheck::Pattern { pattern } = &rule.check {
                Regex::new(pattern).map_err(|err| SchemaError::InvalidPattern {
                    entity: entity.clone(),
                    field: rule.field.clone(),
                    message: err.to_string(),
                })?;
            }
        }

        for search in &self.search_fields {
            if !names.contains(search.as_str()) {
                return Err(SchemaError::UnknownField {
                    entity,
                    owner: "search_fields".to_string(),
                    field: search.clone(),
                });
            }
        }

        if let Some(filter) = &self.filter_field {
            match self.field(filter) {
                Some(field) if matches!(field.kind, FieldKind::Choice { .. }) => {}
                Some(_) => {
                    return Err(SchemaError::InvalidField {
                        entity,
                        field: filter.clone(),
                        message: "filter field must be a choice".to_string(),
                    });
                }
                None => {
                    return Err(SchemaError::UnknownField {
                        entity,
                        owner: "filter_field".to_string(),
                        field: filter.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn default_id_keys() -> Vec<String> {
    vec!["_id".to_string(), "id".to_string()]
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> EntitySchema {
        EntitySchema {
            name: "notes".into(),
            title: "Note".into(),
            id_keys: default_id_keys(),
            tabs: vec![TabSchema {
                id: "basic".into(),
                title: "Basic".into(),
            }],
            fields: vec![FieldSchema {
                name: "title".into(),
                title: "Title".into(),
                tab: "basic".into(),
                kind: FieldKind::Text,
                default: None,
                upload: false,
            }],
            rules: Vec::new(),
            search_fields: vec!["title".into()],
            filter_field: None,
        }
    }

    #[test]
    fn minimal_schema_passes() {
        assert_eq!(minimal().check(), Ok(()));
    }

    #[test]
    fn field_on_unknown_tab_is_rejected() {
        let mut schema = minimal();
        schema.fields[0].tab = "media".into();
        assert!(matches!(
            schema.check(),
            Err(SchemaError::UnknownTab { tab, .. }) if tab == "media"
        ));
    }

    #[test]
    fn bad_pattern_is_rejected() {
        let mut schema = minimal();
        schema.rules.push(RuleSchema {
            tab: "basic".into(),
            field: "title".into(),
            check: RuleCheck::Pattern {
                pattern: "(".into(),
            },
            message: "bad".into(),
        });
        assert!(matches!(
            schema.check(),
            Err(SchemaError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn collection_name_field_must_exist() {
        let mut schema = minimal();
        schema.fields.push(FieldSchema {
            name: "speakers".into(),
            title: "Speakers".into(),
            tab: "basic".into(),
            kind: FieldKind::Collection(CollectionTemplate {
                fields: vec!["role".into()],
                name_field: "name".into(),
            }),
            default: None,
            upload: false,
        });
        assert!(matches!(
            schema.check(),
            Err(SchemaError::InvalidField { field, .. }) if field == "speakers"
        ));
    }

    #[test]
    fn uploads_only_on_text_and_list_fields() {
        let mut schema = minimal();
        schema.fields[0].upload = true;
        assert_eq!(schema.check(), Ok(()));
        schema.fields[0].kind = FieldKind::Boolean;
        assert!(matches!(
            schema.check(),
            Err(SchemaError::InvalidField { field, .. }) if field == "title"
        ));
    }

    #[test]
    fn kinds_deserialize_from_tagged_objects() {
        let kind: FieldKind =
            serde_json::from_value(serde_json::json!({"type": "list", "separator": "newline"}))
                .unwrap();
        assert_eq!(
            kind,
            FieldKind::List {
                separator: Separator::Newline
            }
        );
        let kind: FieldKind =
            serde_json::from_value(serde_json::json!({"type": "integer"})).unwrap();
        assert_eq!(kind, FieldKind::Integer { fallback: 0 });
        let rule: RuleSchema = serde_json::from_value(serde_json::json!({
            "tab": "basic", "field": "title", "message": "Title is required"
        }))
        .unwrap();
        assert_eq!(rule.check, RuleCheck::Required);
    }
}
