//! Downstream client for the Cloud Translation v2 REST API
//!
//! Callers supply a bearer access token per call; this crate never stores or
//! refreshes credentials.

pub mod client;
pub mod error;

pub use client::{TRANSLATE_ENDPOINT, TranslateClient};
pub use error::{Error, Result};
