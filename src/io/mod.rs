mod format;
mod input;
mod output;

pub use format::DocumentFormat;
pub use input::{parse_document_any, parse_document_str, read_document};
pub use output::{OutputDestination, OutputOptions, emit, render};
