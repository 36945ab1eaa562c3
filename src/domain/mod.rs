mod builtin;
mod schema;

pub use builtin::{blogs, builtin_schemas, events, projects, resources};
pub use schema::{
    CollectionTemplate, EntitySchema, FieldKind, FieldSchema, RuleCheck, RuleSchema, SchemaError,
    Separator, TabSchema,
};
