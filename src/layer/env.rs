//! Environment variable configuration layer.

use super::Layer;
use crate::coerce::infer_scalar;
use crate::config::ConfigError;
use crate::value::{Map, Value};

/// Maps `PREFIX<sep>SECTION<sep>KEY=value` variables to the path
/// `section.key`.
///
/// Path segments are lower-cased. Values are typed with
/// [`infer_scalar`](crate::coerce::infer_scalar).
#[derive(Debug, Clone)]
pub struct EnvLayer {
    prefix: String,
    separator: String,
    vars: Option<Vec<(String, String)>>,
}

impl EnvLayer {
    /// Reads from the process environment at load time.
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Result<Self, ConfigError> {
        let separator = separator.into();
        if separator.is_empty() {
            return Err(ConfigError::InvalidSeparator);
        }
        Ok(Self {
            prefix: prefix.into(),
            separator,
            vars: None,
        })
    }

    /// Reads from an explicit set of variables instead of the process environment.
    pub fn from_vars<I, K, V>(
        prefix: impl Into<String>,
        separator: impl Into<String>,
        vars: I,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut layer = Self::new(prefix, separator)?;
        layer.vars = Some(
            vars.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        Ok(layer)
    }

    fn vars(&self) -> Vec<(String, String)> {
        match &self.vars {
            Some(vars) => vars.clone(),
            // Variables that are not valid UTF-8 are skipped.
            None => std::env::vars_os()
                .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
                .collect(),
        }
    }
}

impl Layer for EnvLayer {
    fn load(&self) -> Result<Map, ConfigError> {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);
        let mut data = Map::new();

        for (key, value) in self.vars() {
            let Some(path_str) = key.strip_prefix(&prefix_with_sep) else {
                continue;
            };

            let path: Vec<String> = path_str
                .split(&self.separator)
                .map(|s| s.to_lowercase())
                .collect();
            if path.iter().any(String::is_empty) {
                continue;
            }

            insert_at_path(&mut data, &path, infer_scalar(&value));
        }

        Ok(data)
    }
}

fn insert_at_path(table: &mut Map, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        table.insert(first.clone(), value);
        return;
    }

    let slot = table
        .entry(first.clone())
        .or_insert_with(|| Value::Map(Map::new()));
    if !matches!(slot, Value::Map(_)) {
        *slot = Value::Map(Map::new());
    }
    if let Value::Map(nested) = slot {
        insert_at_path(nested, rest, value);
    }
}
