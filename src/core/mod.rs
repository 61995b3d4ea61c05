pub mod backend;
pub mod config;
pub mod error;
pub mod form;
pub mod processor;
pub mod schema;
pub mod template;
pub mod transform;
pub mod types;

pub use config::{ConfigLoader, ConfigValidator, SearchflowConfig};
pub use error::AppError;
pub use types::*;
