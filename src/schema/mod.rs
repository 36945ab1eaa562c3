mod loader;
mod registry;

pub use loader::{config_schema, load_entity_schemas, parse_entity_schemas};
pub use registry::SchemaRegistry;
