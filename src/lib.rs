#![deny(rust_2018_idioms)]

#[cfg(feature = "tui")]
mod app;
pub mod auth;
pub mod domain;
pub mod form;
pub mod io;
#[cfg(feature = "tui")]
mod presentation;
pub mod schema;
pub mod store;
pub mod upload;

#[cfg(feature = "tui")]
pub use app::{EditorOutcome, FormEditor, UiOptions};
pub use domain::{EntitySchema, FieldKind, SchemaError, builtin_schemas};
pub use form::{
    EntityForm, FormDraft, FormSession, SavePayload, ValidationFailure, dehydrate, hydrate,
};
pub use schema::SchemaRegistry;
pub use store::{ApiError, ManagePage, PageOutcome, RecordStore};

pub mod prelude {
    #[cfg(feature = "tui")]
    pub use super::{EditorOutcome, FormEditor, UiOptions};
    pub use super::{
        ApiError, EntityForm, EntitySchema, FormSession, ManagePage, PageOutcome, RecordStore,
        SavePayload, SchemaRegistry, ValidationFailure, dehydrate, hydrate,
    };
}
