//! Credential store abstraction and the in-memory backend

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::RwLock;
use tracing::debug;

use crate::credential::Credential;
use crate::error::Result;

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Persistence for credentials, keyed by `subject_id`.
///
/// At most one credential exists per subject: `upsert` inserts or replaces.
/// No multi-record transactions are offered or needed.
pub trait CredentialStore: Send + Sync {
    /// Backend label for logging and the health endpoint.
    fn backend(&self) -> &'static str;

    fn find<'a>(&'a self, subject_id: &'a str) -> StoreFuture<'a, Option<Credential>>;

    fn upsert(&self, credential: Credential) -> StoreFuture<'_, ()>;

    /// Number of stored credentials.
    fn count(&self) -> StoreFuture<'_, usize>;
}

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<HashMap<String, Credential>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn find<'a>(&'a self, subject_id: &'a str) -> StoreFuture<'a, Option<Credential>> {
        Box::pin(async move { Ok(self.state.read().await.get(subject_id).cloned()) })
    }

    fn upsert(&self, credential: Credential) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let subject_id = credential.subject_id.clone();
            self.state.write().await.insert(subject_id.clone(), credential);
            debug!(subject_id, "upserted credential");
            Ok(())
        })
    }

    fn count(&self) -> StoreFuture<'_, usize> {
        Box::pin(async move { Ok(self.state.read().await.len()) })
    }
}
