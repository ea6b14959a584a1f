pub mod channels;
pub mod config;
pub mod error;
pub mod types;

pub use channels::Channel;
pub use crate::config::AppConfig;
pub use error::{DuplicateKeyError, PipelineError, PipelineResult, SchemaError};
