//! Layers: sources that produce a decoded tree for [`Config::add_layer`].
//!
//! [`Config::add_layer`]: crate::Config::add_layer

mod env;
mod file;

pub use env::EnvLayer;
pub use file::{FileLayer, Format};

use crate::config::ConfigError;
use crate::value::Map;

/// A source of configuration data.
///
/// `load` is called once, while the target [`Config`](crate::Config) holds
/// its write lock. It should have no side effects beyond I/O.
pub trait Layer: Send + Sync + std::fmt::Debug {
    fn load(&self) -> Result<Map, ConfigError>;
}

impl<L: Layer + ?Sized> Layer for Box<L> {
    fn load(&self) -> Result<Map, ConfigError> {
        (**self).load()
    }
}

/// A fixed, in-memory tree. Handy for defaults.
#[derive(Debug, Clone, Default)]
pub struct MapLayer {
    data: Map,
}

impl MapLayer {
    pub fn new(data: Map) -> Self {
        Self { data }
    }
}

impl From<Map> for MapLayer {
    fn from(data: Map) -> Self {
        Self::new(data)
    }
}

impl Layer for MapLayer {
    fn load(&self) -> Result<Map, ConfigError> {
        Ok(self.data.clone())
    }
}
