mod actions;
mod collection;
mod convert;
mod draft;
mod entity;
mod error;
mod normalize;
mod reducers;
mod session;
mod tabs;
mod validator;
mod value;

pub use actions::FormCommand;
pub use collection::{CollectionState, SubRecordDraft};
pub use draft::FormDraft;
pub use entity::EntityForm;
pub use error::ValidationFailure;
pub use normalize::{dehydrate, hydrate};
pub use reducers::apply_command;
pub use session::{FormMode, FormSession, SavePayload, UploadResolution, UploadTicket};
pub use tabs::TabCursor;
pub use validator::TabValidator;
pub use value::DraftValue;

pub(crate) use convert::value_to_string;
