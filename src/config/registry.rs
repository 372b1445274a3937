use parking_lot::RwLock;
use tracing::{debug, warn};

use super::merge::merge_map;
use super::path::{resolve, DEFAULT_DELIMITER};
use super::ConfigError;
use crate::layer::Layer;
use crate::value::{Map, Value};

#[derive(Debug, Clone)]
struct State {
    delimiter: String,
    data: Map,
}

/// A layered configuration store.
///
/// Layers are merged in registration order, with later layers overriding
/// earlier ones. Nested mappings are merged recursively; other values
/// (including sequences) are replaced entirely. Keys are case-insensitive.
///
/// `Config` is `Send + Sync`. Lookups take a shared lock; registering a layer
/// takes the exclusive lock for the whole load and merge, so readers never
/// see a half-merged layer.
///
/// ## Example
///
/// ```no_run
/// use strata_config::{Config, FileLayer, Map, Value};
///
/// let config = Config::new();
/// config.add_map(Map::from([("port".to_string(), Value::from(8080))]));
/// config.add_layer(&FileLayer::new("config/default.toml", true))?;
/// config.add_layer(&FileLayer::new("config/local.yaml", false))?;
///
/// let port = config.get_int_default("port", 80);
/// let timeout = config.get_duration("server.timeout");
/// # Ok::<(), strata_config::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct Config {
    state: RwLock<State>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Creates an empty configuration using [`DEFAULT_DELIMITER`].
    pub fn new() -> Self {
        Self::from_state(State {
            delimiter: DEFAULT_DELIMITER.to_string(),
            data: Map::new(),
        })
    }

    /// Creates an empty configuration with a custom key delimiter.
    pub fn with_delimiter(delimiter: impl Into<String>) -> Self {
        let config = Self::new();
        config.set_delimiter(delimiter);
        config
    }

    fn from_state(state: State) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Loads `layer` and merges it on top of the existing data.
    ///
    /// The write lock is held while the layer loads. If loading fails the
    /// error is returned as is and the tree is left untouched.
    pub fn add_layer<L: Layer + ?Sized>(&self, layer: &L) -> Result<(), ConfigError> {
        let mut state = self.state.write();

        let data = match layer.load() {
            Ok(data) => data,
            Err(err) => {
                warn!(?layer, error = %err, "configuration layer failed to load");
                return Err(err);
            }
        };

        debug!(?layer, keys = data.len(), "merging configuration layer");
        merge_map(&mut state.data, data);
        Ok(())
    }

    /// Merges an in-memory tree, usually for defaults.
    pub fn add_map(&self, data: Map) {
        let mut state = self.state.write();
        debug!(keys = data.len(), "merging configuration map");
        merge_map(&mut state.data, data);
    }

    /// Returns a copy of the value stored at `key`, or `None` if the path
    /// does not resolve.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.with_value(key, Value::clone)
    }

    /// Returns `true` if `key` resolves to a value.
    pub fn contains(&self, key: &str) -> bool {
        self.with_value(key, |_| ()).is_some()
    }

    /// Runs `f` on the value at `key` under the read lock.
    pub(crate) fn with_value<T>(&self, key: &str, f: impl FnOnce(&Value) -> T) -> Option<T> {
        let state = self.state.read();
        resolve(&state.data, key, &state.delimiter).map(f)
    }

    /// Returns a scope rooted at the string-keyed mapping stored at `key`.
    ///
    /// The scope is a snapshot: it copies the subtree and the current
    /// delimiter, and does not see layers added to `self` afterwards.
    /// Scalars, sequences, loose maps and missing keys yield `None`.
    pub fn get_config(&self, key: &str) -> Option<Config> {
        let state = self.state.read();
        match resolve(&state.data, key, &state.delimiter)? {
            Value::Map(data) => Some(Self::from_state(State {
                delimiter: state.delimiter.clone(),
                data: data.clone(),
            })),
            _ => None,
        }
    }

    /// Returns a copy of the whole merged tree.
    pub fn snapshot(&self) -> Map {
        self.state.read().data.clone()
    }

    /// Returns the delimiter lookups split on, [`DEFAULT_DELIMITER`] unless changed.
    pub fn delimiter(&self) -> String {
        self.state.read().delimiter.clone()
    }

    /// Sets the delimiter used to split lookup keys.
    ///
    /// An empty delimiter is replaced by [`DEFAULT_DELIMITER`].
    pub fn set_delimiter(&self, delimiter: impl Into<String>) {
        let mut delimiter = delimiter.into();
        if delimiter.is_empty() {
            debug!("empty delimiter requested, using default");
            delimiter = DEFAULT_DELIMITER.to_string();
        }
        self.state.write().delimiter = delimiter;
    }
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self::from_state(self.state.read().clone())
    }
}
