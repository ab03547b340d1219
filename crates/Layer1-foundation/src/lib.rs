//! # uncommit-foundation
//!
//! Foundation layer for uncommit:
//! - Error: shared error type for config and storage
//! - Config: model + credential loading (env, `.env.local`, config file)
//! - Storage: `JsonStore` for small JSON documents on disk

pub mod config;
pub mod error;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use storage::JsonStore;
