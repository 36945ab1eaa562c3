use std::path::Path;

use anyhow::{Context, Result, bail};
use jsonschema::validator_for;
use schemars::schema_for;
use serde_json::Value;

use crate::{domain::EntitySchema, io::read_document};

/// JSON Schema describing one entity schema document.
pub fn config_schema() -> Value {
    // RootSchema is plain data; serializing it cannot fail.
    serde_json::to_value(schema_for!(EntitySchema)).unwrap_or(Value::Null)
}

/// Accept one entity schema object or an array of them.
pub fn parse_entity_schemas(document: &Value) -> Result<Vec<EntitySchema>> {
    let meta = config_schema();
    let validator = validator_for(&meta).context("failed to compile entity schema definition")?;

    let entries: Vec<&Value> = match document {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut schemas = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let problems = validator
            .iter_errors(entry)
            .map(|error| {
                let pointer = error.instance_path.to_string();
                if pointer.is_empty() {
                    error.to_string()
                } else {
                    format!("{pointer}: {error}")
                }
            })
            .collect::<Vec<_>>();
        if !problems.is_empty() {
            bail!("entity schema #{index} is invalid: {}", problems.join("; "));
        }
        let schema: EntitySchema = serde_json::from_value(entry.clone())
            .with_context(|| format!("entity schema #{index} could not be decoded"))?;
        schemas.push(schema);
    }
    Ok(schemas)
}

pub fn load_entity_schemas(path: impl AsRef<Path>) -> Result<Vec<EntitySchema>> {
    let path = path.as_ref();
    let document = read_document(path)?;
    parse_entity_schemas(&document)
        .with_context(|| format!("invalid entity schemas in {}", path.display()))
}
