use regex::Regex;

use crate::domain::{EntitySchema, FieldKind, RuleCheck, SchemaError};

use super::{
    convert::{parse_integer, parse_number, split_list},
    draft::FormDraft,
    error::ValidationFailure,
    value::DraftValue,
};

#[derive(Debug, Clone)]
enum Predicate {
    Required,
    Range { min: f64, max: f64 },
    Pattern(Regex),
}

#[derive(Debug, Clone)]
struct CompiledRule {
    tab: String,
    field: String,
    kind: FieldKind,
    predicate: Predicate,
    message: String,
}

/// Ordered `(tab, predicate, message)` rules evaluated against a draft.
#[derive(Debug, Clone)]
pub struct TabValidator {
    rules: Vec<CompiledRule>,
}

impl TabValidator {
    pub fn new(schema: &EntitySchema) -> Result<Self, SchemaError> {
        let mut rules = Vec::with_capacity(schema.rules.len());
        for rule in &schema.rules {
            let field = schema
                .field(&rule.field)
                .ok_or_else(|| SchemaError::UnknownField {
                    entity: schema.name.clone(),
                    owner: "rule".to_string(),
                    field: rule.field.clone(),
                })?;
            let predicate = match &rule.check {
                RuleCheck::Required => Predicate::Required,
                RuleCheck::Range { min, max } => Predicate::Range {
                    min: *min,
                    max: *max,
                },
                RuleCheck::Pattern { pattern } => {
                    Predicate::Pattern(Regex::new(pattern).map_err(|err| {
                        SchemaError::InvalidPattern {
                            entity: schema.name.clone(),
                            field: rule.field.clone(),
                            message: err.to_string(),
                        }
                    })?)
                }
            };
            rules.push(CompiledRule {
                tab: rule.tab.clone(),
                field: rule.field.clone(),
                kind: field.kind.clone(),
                predicate,
                message: rule.message.clone(),
            });
        }
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The first failing rule in declaration order, if any.
    pub fn first_failure(&self, draft: &FormDraft) -> Option<ValidationFailure> {
        self.rules
            .iter()
            .find(|rule| !rule.passes(draft.value(&rule.field)))
            .map(|rule| ValidationFailure {
                tab: rule.tab.clone(),
                field: rule.field.clone(),
                message: rule.message.clone(),
            })
    }
}

impl CompiledRule {
    fn passes(&self, value: Option<&DraftValue>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.predicate {
            Predicate::Required => match (value, &self.kind) {
                (DraftValue::Text(text), FieldKind::List { separator }) => {
                    !split_list(text, *separator).is_empty()
                }
                (DraftValue::Text(text), _) => !text.trim().is_empty(),
                (DraftValue::Bool(flag), _) => *flag,
                (DraftValue::Choice { .. }, _) => value.selected_option().is_some(),
                (DraftValue::Collection(state), _) => state.has_named_item(),
            },
            Predicate::Range { min, max } => {
                let Some(text) = value.as_text() else {
                    return false;
                };
                let number = match &self.kind {
                    FieldKind::Integer { fallback } => parse_integer(text, *fallback) as f64,
                    FieldKind::Number { fallback } => parse_number(text, *fallback),
                    _ => parse_number(text, f64::NAN),
                };
                number >= *min && number <= *max
            }
            Predicate::Pattern(pattern) => value
                .as_text()
                .map(str::trim)
                .is_some_and(|text| !text.is_empty() && pattern.is_match(text)),
        }
    }
}
