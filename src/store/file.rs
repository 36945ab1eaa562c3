use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};
use tracing::debug;

use super::{ApiError, RecordKey, RecordStore, merge_update, new_record, validate_entity};

/// One pretty-printed JSON array per collection: `<root>/<entity>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, entity: &str) -> Result<PathBuf, ApiError> {
        validate_entity(entity)?;
        Ok(self.root.join(format!("{entity}.json")))
    }

    fn read(&self, entity: &str) -> Result<Vec<Value>, ApiError> {
        let path = self.collection_path(entity)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write(&self, entity: &str, records: &[Value]) -> Result<(), ApiError> {
        let path = self.collection_path(entity)?;
        fs::create_dir_all(&self.root)?;
        let body = serde_json::to_string_pretty(records)?;
        fs::write(&path, body)?;
        debug!(path = %path.display(), records = records.len(), "collection written");
        Ok(())
    }

    fn not_found(entity: &str, id: &str) -> ApiError {
        ApiError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl RecordStore for FileStore {
    fn list(&self, entity: &str) -> Result<Vec<Value>, ApiError> {
        self.read(entity)
    }

    fn create(&mut self, entity: &str, payload: &Map<String, Value>) -> Result<Value, ApiError> {
        let mut records = self.read(entity)?;
        let record = new_record(payload);
        records.push(record.clone());
        self.write(entity, &records)?;
        Ok(record)
    }

    fn update(
        &mut self,
        entity: &str,
        key: RecordKey<'_>,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        let mut records = self.read(entity)?;
        let record = records
            .iter_mut()
            .find(|record| key.matches(record))
            .ok_or_else(|| Self::not_found(entity, key.id()))?;
        merge_update(record, key, payload);
        let updated = record.clone();
        self.write(entity, &records)?;
        Ok(updated)
    }

    fn delete(&mut self, entity: &str, key: RecordKey<'_>) -> Result<(), ApiError> {
        let mut records = self.read(entity)?;
        let before = records.len();
        records.retain(|record| !key.matches(record));
        if records.len() == before {
            return Err(Self::not_found(entity, key.id()));
        }
        self.write(entity, &records)
    }
}
