//! Layered, case-insensitive configuration.
//!
//! Register layers on a [`Config`] in order of increasing precedence, then
//! read values through dotted paths. Nested mappings merge recursively and
//! keys are lower-cased, so `Db.UserName` and `db.username` are the same key.
//! Typed getters never fail: a missing or mistyped value yields the default.
//!
//! ```
//! use strata_config::{Config, EnvLayer, Map, Value};
//! use std::time::Duration;
//!
//! let config = Config::new();
//! config.add_map(Map::from([
//!     ("Server".to_string(), Value::Map(Map::from([
//!         ("Port".to_string(), Value::from(8080)),
//!         ("Timeout".to_string(), Value::from("1m30s")),
//!     ]))),
//! ]));
//! config.add_layer(&EnvLayer::from_vars("APP", "__", [("APP__SERVER__PORT", "9090")])?)?;
//!
//! assert_eq!(config.get_int("server.port"), 9090);
//! assert_eq!(config.get_duration("SERVER.TIMEOUT"), Duration::from_secs(90));
//! assert_eq!(config.get_string_default("server.host", "0.0.0.0"), "0.0.0.0");
//! # Ok::<(), strata_config::ConfigError>(())
//! ```

pub mod coerce;
pub mod config;
pub mod layer;
pub mod value;

pub use coerce::CoerceError;
pub use config::{Config, ConfigError, DEFAULT_DELIMITER};
pub use layer::{EnvLayer, FileLayer, Format, Layer, MapLayer};
pub use value::{LooseMap, Map, Value};
