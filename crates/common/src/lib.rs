//! Shared types for the translate proxy workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
