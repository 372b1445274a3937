//! The merged configuration tree and its query surface.

mod accessors;
mod error;
pub mod merge;
pub mod path;
mod registry;

pub use error::{BoxError, ConfigError};
pub use path::DEFAULT_DELIMITER;
pub use registry::Config;
