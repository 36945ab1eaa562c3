use serde_json::{Map, Value};
use tracing::warn;

use super::{ApiError, RecordKey, RecordStore};
use crate::auth::{AuthSession, TokenStore};

/// Reads pass straight through; writes need a signed-in session.
#[derive(Debug)]
pub struct AuthorizedStore<S, T: TokenStore> {
    inner: S,
    auth: AuthSession<T>,
}

impl<S: RecordStore, T: TokenStore> AuthorizedStore<S, T> {
    pub fn new(inner: S, auth: AuthSession<T>) -> Self {
        Self { inner, auth }
    }

    pub fn auth(&self) -> &AuthSession<T> {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut AuthSession<T> {
        &mut self.auth
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn authorize(&self, action: &str, entity: &str) -> Result<(), ApiError> {
        if self.auth.token().is_some() {
            return Ok(());
        }
        warn!(action, entity, "rejected write without a session");
        Err(ApiError::Unauthorized)
    }
}

impl<S: RecordStore, T: TokenStore> RecordStore for AuthorizedStore<S, T> {
    fn list(&self, entity: &str) -> Result<Vec<Value>, ApiError> {
        self.inner.list(entity)
    }

    fn create(&mut self, entity: &str, payload: &Map<String, Value>) -> Result<Value, ApiError> {
        self.authorize("create", entity)?;
        self.inner.create(entity, payload)
    }

    fn update(
        &mut self,
        entity: &str,
        key: RecordKey<'_>,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        self.authorize("update", entity)?;
        self.inner.update(entity, key, payload)
    }

    fn delete(&mut self, entity: &str, key: RecordKey<'_>) -> Result<(), ApiError> {
        self.authorize("delete", entity)?;
        self.inner.delete(entity, key)
    }
}
