use std::sync::Arc;

use crate::domain::{EntitySchema, SchemaError};

use super::validator::TabValidator;

/// A checked entity schema together with its compiled rules.
#[derive(Debug, Clone)]
pub struct EntityForm {
    schema: EntitySchema,
    validator: TabValidator,
}

impl EntityForm {
    pub fn new(schema: EntitySchema) -> Result<Arc<Self>, SchemaError> {
        schema.check()?;
        let validator = TabValidator::new(&schema)?;
        Ok(Arc::new(Self { schema, validator }))
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn validator(&self) -> &TabValidator {
        &self.validator
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }
}
