//! Dynamic values stored in the merged configuration tree.
//!
//! Decoders do not agree on how nested mappings look: TOML hands back
//! string-keyed tables, YAML hands back mappings keyed by arbitrary values.
//! Both shapes are kept as distinct variants so the merge and lookup code can
//! handle each one explicitly.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

/// A string-keyed mapping.
pub type Map = BTreeMap<String, Value>;

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Duration(Duration),
    Sequence(Vec<Value>),
    /// Mapping with string keys.
    Map(Map),
    /// Mapping whose keys may be any value. Only string keys are reachable
    /// through path lookup.
    Loose(LooseMap),
}

impl Value {
    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Duration(_) => "duration",
            Value::Sequence(_) => "sequence",
            Value::Map(_) => "map",
            Value::Loose(_) => "loose map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_loose(&self) -> Option<&LooseMap> {
        match self {
            Value::Loose(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

/// A mapping keyed by arbitrary [`Value`]s, kept in insertion order.
///
/// Keys are compared with `PartialEq`, so lookups are linear. These maps come
/// from hand-written configuration documents and stay small.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LooseMap {
    entries: Vec<(Value, Value)>,
}

impl LooseMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Looks up a string key without allocating a [`Value`].
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &Value) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Inserts a value, returning the previous value stored under an equal key.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        if let Some(slot) = self.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Returns the slot for a string key, inserting `Null` if it is absent.
    pub(crate) fn slot(&mut self, key: String) -> &mut Value {
        let index = match self.entries.iter().position(|(k, _)| k.as_str() == Some(key.as_str())) {
            Some(index) => index,
            None => {
                self.entries.push((Value::String(key), Value::Null));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl IntoIterator for LooseMap {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for LooseMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = LooseMap::new();
        for (key, value) in iter {
            map.insert(key.into(), value.into());
        }
        map
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Integer(i64::from(value))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Duration(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl From<LooseMap> for Value {
    fn from(value: LooseMap) -> Self {
        Value::Loose(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Integer(i),
            toml::Value::Float(f) => Value::Float(f),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            toml::Value::Table(table) => Value::Map(
                table
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_yaml::Value::Mapping(mapping) => Value::Loose(
                mapping
                    .into_iter()
                    .map(|(key, value)| (Value::from(key), Value::from(value)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a configuration value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Integer(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A>(self, mut access: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries: Vec<(Value, Value)> = Vec::new();
        while let Some(entry) = access.next_entry::<Value, Value>()? {
            entries.push(entry);
        }

        // All-string keys collapse to the string-keyed shape.
        if entries.iter().all(|(key, _)| key.as_str().is_some()) {
            let map = entries
                .into_iter()
                .filter_map(|(key, value)| match key {
                    Value::String(key) => Some((key, value)),
                    _ => None,
                })
                .collect();
            return Ok(Value::Map(map));
        }

        Ok(Value::Loose(entries.into_iter().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_map_insert_replaces_equal_key() {
        let mut map = LooseMap::new();
        assert_eq!(map.insert(Value::from("a"), Value::from(1)), None);
        assert_eq!(
            map.insert(Value::from("a"), Value::from(2)),
            Some(Value::Integer(1))
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map.get_str("a"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_loose_map_string_and_integer_keys_are_distinct() {
        let map: LooseMap = [(Value::from(1), Value::from("int")), (Value::from("1"), Value::from("str"))]
            .into_iter()
            .collect();
        assert_eq!(map.get(&Value::Integer(1)), Some(&Value::from("int")));
        assert_eq!(map.get_str("1"), Some(&Value::from("str")));
    }

    #[test]
    fn test_toml_tables_become_string_maps() {
        let table: toml::Table = toml::from_str(
            r#"
            name = "svc"
            [db]
            port = 5432
            hosts = ["a", "b"]
            "#,
        )
        .unwrap();
        let value = Value::from(toml::Value::Table(table));
        let db = value.as_map().unwrap()["db"].as_map().unwrap();
        assert_eq!(db["port"], Value::Integer(5432));
        assert_eq!(db["hosts"], Value::from(vec!["a", "b"]));
    }

    #[test]
    fn test_yaml_mappings_become_loose_maps() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("db:\n  port: 5432\n  1: one\n").unwrap();
        let value = Value::from(yaml);
        let db = value.as_loose().unwrap().get_str("db").unwrap().as_loose().unwrap();
        assert_eq!(db.get_str("port"), Some(&Value::Integer(5432)));
        assert_eq!(db.get(&Value::Integer(1)), Some(&Value::from("one")));
    }

    #[test]
    fn test_deserialize_picks_map_shape_from_keys() {
        let map: Map = toml::from_str("a = 1\n[b]\nc = true\n").unwrap();
        assert_eq!(map["a"], Value::Integer(1));
        assert!(matches!(map["b"], Value::Map(_)));

        let value: Value = serde_yaml::from_str("1: one\ntwo: 2\n").unwrap();
        assert!(matches!(value, Value::Loose(_)));
    }
}
