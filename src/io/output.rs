use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use super::DocumentFormat;

/// Where a rendered document ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    pub fn file(path: impl AsRef<Path>) -> Self {
        OutputDestination::File(path.as_ref().to_path_buf())
    }

    fn describe(&self) -> String {
        match self {
            OutputDestination::Stdout => "stdout".to_string(),
            OutputDestination::File(path) => path.display().to_string(),
        }
    }
}

/// Encoding plus destination for records, drafts and payloads printed by the CLI.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: DocumentFormat,
    pub pretty: bool,
    pub destination: OutputDestination,
}

impl OutputOptions {
    pub fn stdout(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: true,
            destination: OutputDestination::Stdout,
        }
    }

    /// Writes to `path`, encoded according to its extension (JSON when the
    /// extension is unknown).
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            format: DocumentFormat::from_path(path).unwrap_or_default(),
            pretty: true,
            destination: OutputDestination::file(path),
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::stdout(DocumentFormat::Json)
    }
}

/// Encode `value` as text. Always ends with a newline.
pub fn render(value: &Value, options: &OutputOptions) -> Result<String> {
    let format = options.format;
    let mut text = match format {
        DocumentFormat::Json if options.pretty => serde_json::to_string_pretty(value)?,
        DocumentFormat::Json => serde_json::to_string(value)?,
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => serde_yaml::to_string(value)?,
        #[cfg(feature = "toml")]
        DocumentFormat::Toml if options.pretty => toml::to_string_pretty(value)?,
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => toml::to_string(value)?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

/// Render `value` and write it to the configured destination.
pub fn emit(value: &Value, options: &OutputOptions) -> Result<()> {
    let text = render(value, options)
        .with_context(|| format!("failed to encode output as {}", options.format))?;
    let result = match &options.destination {
        OutputDestination::Stdout => {
            let mut out = io::stdout().lock();
            out.write_all(text.as_bytes()).and_then(|()| out.flush())
        }
        OutputDestination::File(path) => {
            debug!(path = %path.display(), bytes = text.len(), "writing output file");
            fs::write(path, &text)
        }
    };
    result.with_context(|| format!("failed to write to {}", options.destination.describe()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_destination_takes_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        let options = OutputOptions::for_path(&path);
        assert_eq!(options.format, DocumentFormat::Json);

        emit(&json!({"title": "Meetup"}), &options).unwrap();
        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"title": "Meetup"}));
    }

    #[test]
    fn compact_json_is_one_line() {
        let options = OutputOptions::default().with_pretty(false);
        let text = render(&json!({"a": [1, 2]}), &options).unwrap();
        assert_eq!(text, "{\"a\":[1,2]}\n");
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let options = OutputOptions::for_path(dir.path().join("nope").join("out.json"));
        let err = emit(&json!(1), &options).unwrap_err();
        assert!(format!("{err:#}").contains("failed to write to"));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn renders_toml_tables() {
        let options = OutputOptions::stdout(DocumentFormat::Toml);
        let text = render(&json!({"title": "Meetup"}), &options).unwrap();
        assert!(text.contains("title = \"Meetup\""));
    }
}
