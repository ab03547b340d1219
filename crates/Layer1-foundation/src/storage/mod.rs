//! Storage module for uncommit
//!
//! - `json`: JSON - small documents stored next to the repository

mod json;

pub use json::JsonStore;
