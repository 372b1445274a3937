//! Delimiter-based lookup into the merged tree.

use crate::value::{Map, Value};

/// Delimiter used to split lookup keys when none is configured.
pub const DEFAULT_DELIMITER: &str = ".";

/// Resolves `key` against `tree`.
///
/// The key is trimmed, lower-cased and split on `delimiter`. Each segment
/// descends one level through either mapping shape. A missing segment, or a
/// non-mapping value before the last segment, yields `None`.
pub fn resolve<'a>(tree: &'a Map, key: &str, delimiter: &str) -> Option<&'a Value> {
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let delimiter = if delimiter.is_empty() {
        DEFAULT_DELIMITER
    } else {
        delimiter
    };

    let key = key.to_lowercase();
    let mut segments = key.split(delimiter);
    let mut current = tree.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Value::Map(map) => map.get(segment)?,
            Value::Loose(map) => map.get_str(segment)?,
            _ => return None,
        };
    }

    Some(current)
}
