//! Credential persistence and lifecycle
//!
//! Stores one OAuth credential per authenticated user and hands out access
//! tokens that are guaranteed unexpired at the time of the call. The store is
//! the single source of truth for token data; the manager reads it on every
//! request and writes back after a refresh.
//!
//! Credential lifecycle:
//! 1. Callback exchanges the code → `CredentialManager::record_authorization()` upserts
//! 2. Request arrives → `CredentialManager::valid_access_token()` loads the credential
//! 3. `now >= expires_at` → refresh through `TokenRefresher`, write through to the store
//! 4. Refresh rejected → `RefreshFailed`, caller sends the user back to consent

pub mod clock;
pub mod credential;
pub mod error;
pub mod file;
pub mod manager;
pub mod refresher;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credential::{Credential, expires_at_from};
pub use error::{Error, Result};
pub use file::FileStore;
pub use manager::CredentialManager;
pub use refresher::TokenRefresher;
pub use store::{CredentialStore, MemoryStore, StoreFuture};
