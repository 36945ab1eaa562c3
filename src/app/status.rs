use std::fmt;

/// What the editor last did or needs from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ready,
    Editing(String),
    ItemAdded { collection: String, count: usize },
    ItemRemoved { collection: String, count: usize },
    NeedsCollection,
    NeedsItem,
    NeedsUploadField,
    NeedsUploadPath,
    UploadsDisabled,
    Uploaded(String),
    ConfirmDiscard,
    /// Validation, upload or store message shown as-is.
    Problem(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => f.write_str("Ready. Press Ctrl+S to save."),
            Status::Editing(label) => write!(f, "Editing {label}"),
            Status::ItemAdded { collection, count } => {
                write!(f, "Added item #{count} to {collection}")
            }
            Status::ItemRemoved { collection, count } => {
                write!(f, "Removed an item; {collection} now has {count}")
            }
            Status::NeedsCollection => f.write_str("Focus a collection to add an item"),
            Status::NeedsItem => f.write_str("Focus a collection item to remove it"),
            Status::NeedsUploadField => f.write_str("Focus an image field to upload"),
            Status::NeedsUploadPath => f.write_str("Type the image path into the field first"),
            Status::UploadsDisabled => f.write_str("Uploads are not configured"),
            Status::Uploaded(url) => write!(f, "Uploaded {url}"),
            Status::ConfirmDiscard => {
                f.write_str("Unsaved changes. Press Esc again to discard them.")
            }
            Status::Problem(message) => f.write_str(message),
        }
    }
}

/// Footer status with its rendered text kept alongside.
#[derive(Debug, Clone)]
pub struct StatusLine {
    status: Status,
    text: String,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::from(Status::Ready)
    }
}

impl From<Status> for StatusLine {
    fn from(status: Status) -> Self {
        let text = status.to_string();
        Self { status, text }
    }
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, status: Status) {
        *self = Self::from(status);
    }

    pub fn problem(&mut self, message: impl Into<String>) {
        self.set(Status::Problem(message.into()));
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Problems and the discard prompt are drawn as alerts.
    pub fn is_alert(&self) -> bool {
        matches!(self.status, Status::Problem(_) | Status::ConfirmDiscard)
    }

    pub fn message(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_ready() {
        let line = StatusLine::new();
        assert_eq!(line.status(), &Status::Ready);
        assert_eq!(line.message(), "Ready. Press Ctrl+S to save.");
        assert!(!line.is_alert());
    }

    #[test]
    fn collection_changes_name_the_collection() {
        let mut line = StatusLine::new();
        line.set(Status::ItemAdded {
            collection: "Speakers".into(),
            count: 3,
        });
        assert_eq!(line.message(), "Added item #3 to Speakers");
        line.problem("Title is required");
        assert!(line.is_alert());
        assert_eq!(line.message(), "Title is required");
    }
}
