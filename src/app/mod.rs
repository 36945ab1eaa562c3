mod editor;
mod input;
mod options;
pub(crate) mod rows;
mod status;
mod terminal;

pub use editor::{EditorOutcome, FormEditor};
pub use options::UiOptions;
