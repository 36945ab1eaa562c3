//! Admin sign-in state. One `AuthSession` is created at startup and handed to
//! whatever needs the bearer token; nothing reads the persisted copy directly.

use std::{
    cell::RefCell,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub email: String,
}

/// Persisted copy of the credentials.
pub trait TokenStore {
    fn load(&self) -> Result<Option<Credentials>>;
    fn save(&self, credentials: &Credentials) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: RefCell<Option<Credentials>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            slot: RefCell::new(Some(credentials)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<Credentials>> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        *self.slot.borrow_mut() = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.slot.borrow_mut().take();
        Ok(())
    }
}

/// Credentials kept as a small JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/draftform/session.json`, or the working directory when
    /// the platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("draftform"))
            .unwrap_or_default()
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Credentials>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read {}", self.path.display()));
            }
        };
        let credentials = serde_json::from_str(&contents)
            .with_context(|| format!("corrupt session file {}", self.path.display()))?;
        Ok(Some(credentials))
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let payload = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.path, payload)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to remove {}", self.path.display()))
            }
        }
    }
}

#[derive(Debug)]
pub struct AuthSession<T: TokenStore> {
    store: T,
    current: Option<Credentials>,
}

impl<T: TokenStore> AuthSession<T> {
    /// Read the persisted credentials once.
    pub fn init(store: T) -> Result<Self> {
        let current = store.load()?;
        debug!(signed_in = current.is_some(), "auth session initialised");
        Ok(Self { store, current })
    }

    pub fn login(&mut self, credentials: Credentials) -> Result<()> {
        self.store.save(&credentials)?;
        info!(email = %credentials.email, "signed in");
        self.current = Some(credentials);
        Ok(())
    }

    /// Clear both the in-memory and the persisted copy.
    pub fn logout(&mut self) -> Result<()> {
        self.current = None;
        self.store.clear()?;
        info!("signed out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.token.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.email.as_str())
    }
}
