//! Config - model and credential settings
//!
//! - `settings.rs` - `Config` and its layered loader

mod settings;

pub use settings::{
    load_local_env, Config, API_KEY_ENV, DEFAULT_MODEL, FALLBACK_API_KEY_ENV, LOCAL_ENV_FILE,
    MODEL_ENV,
};
