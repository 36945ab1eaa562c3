mod components;
mod view;

pub(crate) use view::{EditorView, draw};
