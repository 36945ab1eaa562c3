//! Conversion between persisted records and editable drafts.
//!
//! Hydration is total: malformed or missing source fields fall back to a
//! default for their kind. Dehydration splits joined list fields back into
//! arrays and drops unnamed sub-records.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::domain::{EntitySchema, FieldKind, FieldSchema};

use super::{
    collection::CollectionState,
    convert::{
        format_number, integer_from_value, join_list, normalize_date, number_from_value,
        number_value, parse_integer, parse_number, scalar_text, split_list,
    },
    draft::FormDraft,
    value::DraftValue,
};

/// Build a draft from `record`, or an empty one when creating.
pub fn hydrate(schema: &EntitySchema, record: Option<&Value>, today: NaiveDate) -> FormDraft {
    let source = record.and_then(Value::as_object);
    let mut values = IndexMap::with_capacity(schema.fields.len());
    for field in &schema.fields {
        let raw = source
            .and_then(|map| map.get(&field.name))
            .filter(|value| !value.is_null())
            .or(field.default.as_ref());
        values.insert(field.name.clone(), hydrate_field(field, raw, today));
    }

    let record_id = source.and_then(|map| {
        schema.id_keys.iter().find_map(|key| match map.get(key) {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        })
    });

    let passthrough = source
        .map(|map| {
            map.iter()
                .filter(|(key, _)| {
                    schema.field(key).is_none() && !schema.id_keys.iter().any(|id| id == *key)
                })
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default();

    FormDraft {
        entity: schema.name.clone(),
        record_id,
        values,
        passthrough,
    }
}

fn hydrate_field(field: &FieldSchema, raw: Option<&Value>, today: NaiveDate) -> DraftValue {
    match &field.kind {
        FieldKind::Text | FieldKind::LongText => DraftValue::Text(scalar_text(raw)),
        FieldKind::Date => DraftValue::Text(normalize_date(raw, today)),
        FieldKind::Integer { fallback } => {
            DraftValue::Text(integer_from_value(raw, *fallback).to_string())
        }
        FieldKind::Number { fallback } => {
            DraftValue::Text(format_number(number_from_value(raw, *fallback)))
        }
        FieldKind::Boolean => DraftValue::Bool(
            raw.and_then(Value::as_bool)
                .or_else(|| field.default.as_ref().and_then(Value::as_bool))
                .unwrap_or(false),
        ),
        FieldKind::Choice { options } => {
            let position = |value: Option<&Value>| {
                let text = scalar_text(value);
                options.iter().position(|option| *option == text)
            };
            let selected = position(raw)
                .or_else(|| position(field.default.as_ref()))
                .unwrap_or(0);
            DraftValue::Choice {
                options: options.clone(),
                selected,
            }
        }
        FieldKind::List { separator } => DraftValue::Text(join_list(raw, *separator)),
        FieldKind::Collection(template) => {
            DraftValue::Collection(CollectionState::hydrate(template, raw))
        }
    }
}

/// Payload for the persistence layer. Record identity is not included; see
/// [`FormDraft::record_id`].
pub fn dehydrate(schema: &EntitySchema, draft: &FormDraft) -> Map<String, Value> {
    let mut payload = draft.passthrough.clone();
    for field in &schema.fields {
        let Some(value) = draft.values.get(&field.name) else {
            continue;
        };
        if let Some(out) = dehydrate_field(field, value) {
            payload.insert(field.name.clone(), out);
        }
    }
    payload
}

fn dehydrate_field(field: &FieldSchema, value: &DraftValue) -> Option<Value> {
    let out = match (&field.kind, value) {
        (FieldKind::Text | FieldKind::LongText, DraftValue::Text(text)) => {
            Value::String(text.clone())
        }
        (FieldKind::Date, DraftValue::Text(text)) => Value::String(text.trim().to_string()),
        (FieldKind::Integer { fallback }, DraftValue::Text(text)) => {
            Value::from(parse_integer(text, *fallback))
        }
        (FieldKind::Number { fallback }, DraftValue::Text(text)) => {
            number_value(parse_number(text, *fallback))
        }
        (FieldKind::Boolean, DraftValue::Bool(flag)) => Value::Bool(*flag),
        (FieldKind::Choice { .. }, choice @ DraftValue::Choice { .. }) => {
            choice.selected_option().map(|option| Value::String(option.to_string()))?
        }
        (FieldKind::List { separator }, DraftValue::Text(text)) => Value::Array(
            split_list(text, *separator)
                .into_iter()
                .map(Value::String)
                .collect(),
        ),
        (FieldKind::Collection(_), DraftValue::Collection(state)) => state.dehydrate(),
        _ => return None,
    };
    Some(out)
}
