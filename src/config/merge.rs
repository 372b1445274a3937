//! Recursive, case-normalising merge of a decoded layer into the merged tree.
//!
//! Both mapping shapes are walked with the same rules. Keys are lower-cased on
//! the way in. A nested mapping in the source always leaves a mapping of the
//! source's shape behind. A destination mapping of the other shape is
//! converted first, keeping its string-keyed entries; any other destination
//! value is replaced by an empty mapping. Everything else, sequences
//! included, overwrites the destination.

use tracing::trace;

use crate::value::{LooseMap, Map, Value};

/// Destination of a merge: a mapping that hands out a slot per string key.
trait Slots {
    fn slot_mut(&mut self, key: String) -> &mut Value;
}

impl Slots for Map {
    fn slot_mut(&mut self, key: String) -> &mut Value {
        self.entry(key).or_insert(Value::Null)
    }
}

impl Slots for LooseMap {
    fn slot_mut(&mut self, key: String) -> &mut Value {
        self.slot(key)
    }
}

/// Merges `src` into `dst`, with `src` winning on conflicting leaves.
pub fn merge_map(dst: &mut Map, src: Map) {
    merge_string_keys(dst, src);
}

/// Merges a loose mapping. Entries with non-string keys are dropped.
pub fn merge_loose(dst: &mut LooseMap, src: LooseMap) {
    merge_value_keys(dst, src);
}

fn merge_string_keys(dst: &mut impl Slots, src: Map) {
    for (key, value) in src {
        merge_value(dst.slot_mut(key.to_lowercase()), value);
    }
}

// TODO: carry non-string keys over verbatim instead of dropping them.
fn merge_value_keys(dst: &mut impl Slots, src: LooseMap) {
    for (key, value) in src {
        match key {
            Value::String(key) => merge_value(dst.slot_mut(key.to_lowercase()), value),
            other => trace!(
                key_type = other.type_name(),
                "dropping non-string key from loose map"
            ),
        }
    }
}

fn merge_value(slot: &mut Value, value: Value) {
    match value {
        Value::Map(src) => {
            let mut dst = into_map(std::mem::take(slot));
            merge_string_keys(&mut dst, src);
            *slot = Value::Map(dst);
        }
        Value::Loose(src) => {
            let mut dst = into_loose(std::mem::take(slot));
            merge_value_keys(&mut dst, src);
            *slot = Value::Loose(dst);
        }
        leaf => *slot = leaf,
    }
}

/// Reshapes an existing destination value into a string-keyed mapping.
fn into_map(value: Value) -> Map {
    match value {
        Value::Map(map) => map,
        Value::Loose(loose) => loose
            .into_iter()
            .filter_map(|(key, value)| match key {
                Value::String(key) => Some((key, value)),
                _ => None,
            })
            .collect(),
        _ => Map::new(),
    }
}

fn into_loose(value: Value) -> LooseMap {
    match value {
        Value::Loose(loose) => loose,
        Value::Map(map) => map.into_iter().collect(),
        _ => LooseMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map<const N: usize>(entries: [(&str, Value); N]) -> Map {
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }

    #[test]
    fn test_keys_are_lowercased_recursively() {
        let mut dst = Map::new();
        merge_map(
            &mut dst,
            map([("DB", Value::Map(map([("UserName", Value::from("u"))])))]),
        );
        assert_eq!(dst, map([("db", Value::Map(map([("username", Value::from("u"))])))]));
    }

    #[test]
    fn test_later_layer_wins_and_siblings_survive() {
        let mut dst = map([(
            "db",
            Value::Map(map([("user", Value::from("a")), ("port", Value::from(1))])),
        )]);
        merge_map(
            &mut dst,
            map([("db", Value::Map(map([("PORT", Value::from(2))])))]),
        );
        let db = dst["db"].as_map().unwrap();
        assert_eq!(db["user"], Value::from("a"));
        assert_eq!(db["port"], Value::from(2));
    }

    #[test]
    fn test_scalar_replaced_by_mapping() {
        let mut dst = map([("db", Value::from("flat"))]);
        merge_map(&mut dst, map([("db", Value::Map(map([("host", Value::from("h"))])))]));
        assert_eq!(dst["db"], Value::Map(map([("host", Value::from("h"))])));
    }

    #[test]
    fn test_mapping_replaced_by_scalar() {
        let mut dst = map([("db", Value::Map(map([("host", Value::from("h"))])))]);
        merge_map(&mut dst, map([("db", Value::from(false))]));
        assert_eq!(dst["db"], Value::from(false));
    }

    #[test]
    fn test_sequences_are_replaced_wholesale() {
        let mut dst = map([("hosts", Value::from(vec!["a", "b", "c"]))]);
        merge_map(&mut dst, map([("hosts", Value::from(vec!["z"]))]));
        assert_eq!(dst["hosts"], Value::from(vec!["z"]));
    }

    #[test]
    fn test_loose_map_merge_drops_non_string_keys() {
        let src: LooseMap = [
            (Value::from("Name"), Value::from("x")),
            (Value::from(1), Value::from("dropped")),
        ]
        .into_iter()
        .collect();
        let mut dst = Map::new();
        merge_map(&mut dst, map([("Loose", Value::Loose(src))]));

        let loose = dst["loose"].as_loose().unwrap();
        assert_eq!(loose.len(), 1);
        assert_eq!(loose.get_str("name"), Some(&Value::from("x")));
    }

    #[test]
    fn test_nested_shapes_mix_freely() {
        let inner: LooseMap = [(Value::from("Key"), Value::Map(map([("Deep", Value::from(1))])))]
            .into_iter()
            .collect();
        let mut dst = Map::new();
        merge_map(&mut dst, map([("outer", Value::Loose(inner.clone()))]));
        merge_map(&mut dst, map([("outer", Value::Loose(inner))]));

        let key = dst["outer"].as_loose().unwrap().get_str("key").unwrap();
        assert_eq!(key, &Value::Map(map([("deep", Value::from(1))])));
    }

    #[test]
    fn test_later_shape_wins_and_entries_carry_over() {
        let loose: LooseMap = [
            (Value::from("user"), Value::from("a")),
            (Value::from(7), Value::from("int key")),
        ]
        .into_iter()
        .collect();
        let mut dst = map([("db", Value::Loose(loose))]);
        merge_map(&mut dst, map([("db", Value::Map(map([("host", Value::from("h"))])))]));

        let db = dst["db"].as_map().unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db["user"], Value::from("a"));
        assert_eq!(db["host"], Value::from("h"));

        let overlay: LooseMap = [(Value::from("Port"), Value::from(2))].into_iter().collect();
        merge_map(&mut dst, map([("db", Value::Loose(overlay))]));

        let db = dst["db"].as_loose().unwrap();
        assert_eq!(db.get_str("user"), Some(&Value::from("a")));
        assert_eq!(db.get_str("host"), Some(&Value::from("h")));
        assert_eq!(db.get_str("port"), Some(&Value::from(2)));
    }

    #[test]
    fn test_loose_into_loose_keeps_siblings() {
        let mut loose_dst: LooseMap = [(Value::from("a"), Value::from(1))].into_iter().collect();
        merge_loose(&mut loose_dst, [(Value::from("B"), Value::from(2))].into_iter().collect());
        assert_eq!(loose_dst.get_str("a"), Some(&Value::from(1)));
        assert_eq!(loose_dst.get_str("b"), Some(&Value::from(2)));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let layer = map([
            ("a", Value::from(1)),
            ("b", Value::Map(map([("c", Value::from(vec![1, 2]))]))),
        ]);
        let mut once = Map::new();
        merge_map(&mut once, layer.clone());
        let mut twice = once.clone();
        merge_map(&mut twice, layer);
        assert_eq!(once, twice);
    }
}
