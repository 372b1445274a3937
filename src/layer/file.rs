//! File-based configuration layer.

use std::path::{Path, PathBuf};

use super::Layer;
use crate::config::{BoxError, ConfigError};
use crate::value::{Map, Value};

/// Document formats understood by [`FileLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Format {
    Toml,
    Yaml,
}

impl Format {
    /// Picks a format from the file extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(Format::Toml),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    /// Decodes a whole document into a string-keyed tree.
    ///
    /// TOML tables stay string-keyed. YAML mappings below the root are kept
    /// as loose maps.
    pub fn decode(self, contents: &str) -> Result<Map, BoxError> {
        match self {
            Format::Toml => {
                let table: toml::Table = toml::from_str(contents)?;
                Ok(table
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect())
            }
            Format::Yaml => {
                if contents.trim().is_empty() {
                    return Ok(Map::new());
                }
                let document: serde_yaml::Value = serde_yaml::from_str(contents)?;
                match Value::from(document) {
                    Value::Null => Ok(Map::new()),
                    Value::Loose(root) => root
                        .into_iter()
                        .map(|(key, value)| match key {
                            Value::String(key) => Ok((key, value)),
                            other => Err(BoxError::from(format!(
                                "top-level keys must be strings, found {}",
                                other.type_name()
                            ))),
                        })
                        .collect(),
                    other => Err(BoxError::from(format!(
                        "expected a mapping at the document root, found {}",
                        other.type_name()
                    ))),
                }
            }
        }
    }
}

/// A configuration layer that loads a TOML or YAML file.
///
/// Files can be marked as required or optional. Required files that don't exist
/// cause an error; optional files that don't exist load as an empty tree.
#[derive(Debug, Clone)]
pub struct FileLayer {
    path: PathBuf,
    required: bool,
    format: Option<Format>,
}

impl FileLayer {
    /// Creates a new file layer. The format is taken from the extension.
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
            format: None,
        }
    }

    /// Forces a format regardless of the file extension.
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Layer for FileLayer {
    fn load(&self) -> Result<Map, ConfigError> {
        let format = self
            .format
            .or_else(|| Format::from_path(&self.path))
            .ok_or_else(|| ConfigError::UnsupportedFormat(self.path.clone()))?;

        match read_config_file(&self.path, self.required)? {
            Some(contents) => format.decode(&contents).map_err(|source| ConfigError::ParseError {
                path: self.path.clone(),
                source,
            }),
            None => Ok(Map::new()),
        }
    }
}

/// Reads a config file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
fn read_config_file(path: &Path, required: bool) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.toml")), Some(Format::Toml));
        assert_eq!(Format::from_path(Path::new("a.YML")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("a.yaml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("a.json")), None);
        assert_eq!(Format::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_loads_toml_file() {
        let file = temp_file(
            ".toml",
            "str = \"string_data\"\nbool = true\ninteger = 10\n[nested]\nkey1 = \"string\"\nkey2 = 100\n",
        );

        let data = FileLayer::new(file.path(), true).load().unwrap();

        assert_eq!(data["str"], Value::from("string_data"));
        assert_eq!(data["bool"], Value::from(true));
        let nested = data["nested"].as_map().unwrap();
        assert_eq!(nested["key2"], Value::from(100));
    }

    #[test]
    fn test_loads_yaml_file_with_loose_nesting() {
        let file = temp_file(".yml", "server:\n  Port: 8080\n  tags: [a, b]\n");

        let data = FileLayer::new(file.path(), true).load().unwrap();

        let server = data["server"].as_loose().unwrap();
        assert_eq!(server.get_str("Port"), Some(&Value::from(8080)));
        assert_eq!(server.get_str("tags"), Some(&Value::from(vec!["a", "b"])));
    }

    #[test]
    fn test_empty_yaml_is_empty_tree() {
        let file = temp_file(".yaml", "");
        assert!(FileLayer::new(file.path(), true).load().unwrap().is_empty());
    }

    #[test]
    fn test_yaml_root_must_be_mapping() {
        let file = temp_file(".yaml", "- 1\n- 2\n");
        let result = FileLayer::new(file.path(), true).load();
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let file = temp_file(".toml", "invalid toml file");
        let result = FileLayer::new(file.path(), true).load();
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_explicit_format_overrides_extension() {
        let file = temp_file(".conf", "key = \"value\"\n");
        let layer = FileLayer::new(file.path(), true);
        assert!(matches!(layer.load(), Err(ConfigError::UnsupportedFormat(_))));

        let data = layer.with_format(Format::Toml).load().unwrap();
        assert_eq!(data["key"], Value::from("value"));
    }

    #[test]
    fn test_required_missing() {
        let layer = FileLayer::new("/nonexistent/path/config.toml", true);
        assert!(matches!(layer.load(), Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_optional_missing() {
        let layer = FileLayer::new("/nonexistent/path/config.toml", false);
        assert!(layer.load().unwrap().is_empty());
    }
}
