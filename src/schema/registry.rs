use std::{path::Path, sync::Arc};

use anyhow::Result;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    domain::{EntitySchema, SchemaError, builtin_schemas},
    form::EntityForm,
};

use super::loader::{load_entity_schemas, parse_entity_schemas};

/// Entity forms known to the back-office, keyed by collection name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    forms: IndexMap<String, Arc<EntityForm>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the blog, event, project and resource forms.
    pub fn with_builtins() -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        for schema in builtin_schemas() {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Add or replace a schema; returns the form it replaced.
    pub fn register(
        &mut self,
        schema: EntitySchema,
    ) -> Result<Option<Arc<EntityForm>>, SchemaError> {
        let form = EntityForm::new(schema)?;
        debug!(entity = form.name(), "registered entity schema");
        Ok(self.forms.insert(form.name().to_string(), form))
    }

    pub fn extend_from_value(&mut self, document: &Value) -> Result<usize> {
        let schemas = parse_entity_schemas(document)?;
        self.register_all(schemas)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let schemas = load_entity_schemas(path)?;
        let count = self.register_all(schemas)?;
        info!(path = %path.display(), count, "loaded entity schemas");
        Ok(count)
    }

    /// Look up by collection name, falling back to a case-insensitive match
    /// on either the name or the singular title.
    pub fn get(&self, name: &str) -> Option<Arc<EntityForm>> {
        if let Some(form) = self.forms.get(name) {
            return Some(Arc::clone(form));
        }
        self.forms
            .values()
            .find(|form| {
                form.name().eq_ignore_ascii_case(name)
                    || form.schema().title.eq_ignore_ascii_case(name)
            })
            .cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.forms.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// All or nothing: one bad schema leaves the registry untouched.
    fn register_all(&mut self, schemas: Vec<EntitySchema>) -> Result<usize> {
        let forms = schemas
            .into_iter()
            .map(EntityForm::new)
            .collect::<Result<Vec<_>, _>>()?;
        let count = forms.len();
        for form in forms {
            debug!(entity = form.name(), "registered entity schema");
            self.forms.insert(form.name().to_string(), form);
        }
        Ok(count)
    }
}
