use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::DocumentFormat;

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Value>()
            .with_context(|| "failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

/// Parse with `preferred` first, then every other available format.
pub fn parse_document_any(contents: &str, preferred: DocumentFormat) -> Result<Value> {
    match parse_document_str(contents, preferred) {
        Ok(value) => Ok(value),
        Err(primary) => {
            for candidate in DocumentFormat::supported() {
                if candidate == preferred {
                    continue;
                }
                if let Ok(value) = parse_document_str(contents, candidate) {
                    return Ok(value);
                }
            }
            let tried = DocumentFormat::supported()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            Err(anyhow!("tried {tried} (first error: {primary:#})"))
        }
    }
}

/// Read a document from disk, choosing the format from its extension.
pub fn read_document(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let format = DocumentFormat::from_path(path).unwrap_or_default();
    parse_document_any(&contents, format)
        .with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_json_documents() {
        let raw = "{\"title\":\"Meetup\"}";
        let parsed = parse_document_str(raw, DocumentFormat::Json).unwrap();
        assert_eq!(parsed["title"], json!("Meetup"));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn parse_yaml_documents() {
        let raw = "title: Meetup\ntags:\n  - rust\n  - cli";
        let parsed = parse_document_str(raw, DocumentFormat::Yaml).unwrap();
        assert_eq!(parsed["tags"], json!(["rust", "cli"]));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn parse_toml_documents() {
        let raw = "title = \"Meetup\"\nfeatured = true";
        let parsed = parse_document_str(raw, DocumentFormat::Toml).unwrap();
        assert_eq!(parsed["featured"], json!(true));
    }

    #[test]
    fn reports_unparseable_documents() {
        let err = parse_document_any("{not json", DocumentFormat::Json).unwrap_err();
        assert!(err.to_string().contains("json"));
    }

    #[test]
    fn reads_documents_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        fs::write(&path, r#"{"title": "Docs"}"#).unwrap();
        assert_eq!(read_document(&path).unwrap(), json!({"title": "Docs"}));
    }
}
