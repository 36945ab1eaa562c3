use std::{fmt, path::Path};

/// Encodings a record or schema document can be read from and written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Json,
    #[cfg(feature = "yaml")]
    Yaml,
    #[cfg(feature = "toml")]
    Toml,
}

impl DocumentFormat {
    /// Every encoding compiled into this build, JSON first.
    pub fn supported() -> Vec<DocumentFormat> {
        vec![
            DocumentFormat::Json,
            #[cfg(feature = "yaml")]
            DocumentFormat::Yaml,
            #[cfg(feature = "toml")]
            DocumentFormat::Toml,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            #[cfg(feature = "yaml")]
            DocumentFormat::Yaml => "yaml",
            #[cfg(feature = "toml")]
            DocumentFormat::Toml => "toml",
        }
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            DocumentFormat::Json => &["json"],
            #[cfg(feature = "yaml")]
            DocumentFormat::Yaml => &["yaml", "yml"],
            #[cfg(feature = "toml")]
            DocumentFormat::Toml => &["toml"],
        }
    }

    /// Encoding named by a file's extension. `None` for unknown or missing
    /// extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::supported().into_iter().find(|format| {
            format
                .extensions()
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lookup_ignores_case() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("data/Events.JSON")),
            Some(DocumentFormat::Json)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("README")), None);
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yml_is_yaml() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("schemas.yml")),
            Some(DocumentFormat::Yaml)
        );
    }
}
