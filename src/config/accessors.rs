//! Typed getters.
//!
//! Each `get_*_default` resolves the key, coerces the value with the matching
//! function from [`crate::coerce`] and returns the supplied default if the key
//! is missing or the coercion fails. The coercion error is discarded on
//! purpose; use [`Config::get`] to tell "absent" from "present".
//! Each `get_*` is the same call with the type's zero value as the default.

use std::time::Duration;

use super::Config;
use crate::coerce::{self, CoerceError};
use crate::value::Value;

impl Config {
    fn coerce_or<T>(
        &self,
        key: &str,
        def: T,
        convert: fn(&Value) -> Result<T, CoerceError>,
    ) -> T {
        self.with_value(key, |value| convert(value).ok())
            .flatten()
            .unwrap_or(def)
    }

    /// Returns a 32-bit integer. Values outside `i32` yield the default.
    pub fn get_int_default(&self, key: &str, def: i32) -> i32 {
        i32::try_from(self.get_int64_default(key, i64::from(def))).unwrap_or(def)
    }

    /// Returns a 32-bit integer, or `0`.
    pub fn get_int(&self, key: &str) -> i32 {
        self.get_int_default(key, 0)
    }

    /// Returns an `i64`, coerced with [`coerce::to_i64`]. Floats are truncated.
    pub fn get_int64_default(&self, key: &str, def: i64) -> i64 {
        self.coerce_or(key, def, coerce::to_i64)
    }

    /// Returns an `i64`, or `0`.
    pub fn get_int64(&self, key: &str) -> i64 {
        self.get_int64_default(key, 0)
    }

    /// Returns an `f32`, narrowed from [`get_float64_default`](Self::get_float64_default).
    pub fn get_float32_default(&self, key: &str, def: f32) -> f32 {
        self.get_float64_default(key, f64::from(def)) as f32
    }

    /// Returns an `f32`, or `0.0`.
    pub fn get_float32(&self, key: &str) -> f32 {
        self.get_float32_default(key, 0.0)
    }

    /// Returns an `f64`, coerced with [`coerce::to_f64`].
    pub fn get_float64_default(&self, key: &str, def: f64) -> f64 {
        self.coerce_or(key, def, coerce::to_f64)
    }

    /// Returns an `f64`, or `0.0`.
    pub fn get_float64(&self, key: &str) -> f64 {
        self.get_float64_default(key, 0.0)
    }

    /// Returns a boolean, coerced with [`coerce::to_bool`].
    pub fn get_bool_default(&self, key: &str, def: bool) -> bool {
        self.coerce_or(key, def, coerce::to_bool)
    }

    /// Returns a boolean, or `false`.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get_bool_default(key, false)
    }

    /// Returns a string. Scalars are rendered with [`coerce::to_string`].
    pub fn get_string_default(&self, key: &str, def: &str) -> String {
        self.with_value(key, |value| coerce::to_string(value).ok())
            .flatten()
            .unwrap_or_else(|| def.to_string())
    }

    /// Returns a string, or `""`.
    pub fn get_string(&self, key: &str) -> String {
        self.get_string_default(key, "")
    }

    /// Returns a duration.
    ///
    /// Accepts a stored [`Duration`], a string such as `"1h2m3s"`, or an
    /// integer (or integer string) counted in nanoseconds.
    pub fn get_duration_default(&self, key: &str, def: Duration) -> Duration {
        self.coerce_or(key, def, coerce::to_duration)
    }

    /// Returns a duration, or [`Duration::ZERO`].
    pub fn get_duration(&self, key: &str) -> Duration {
        self.get_duration_default(key, Duration::ZERO)
    }

    /// Returns a string slice. Fails as a whole if any element cannot be
    /// rendered as a string, or if the value is not a sequence.
    pub fn get_string_slice_default(&self, key: &str, def: Vec<String>) -> Vec<String> {
        self.coerce_or(key, def, coerce::to_string_vec)
    }

    /// Returns a string slice, or an empty `Vec`.
    pub fn get_string_slice(&self, key: &str) -> Vec<String> {
        self.get_string_slice_default(key, Vec::new())
    }

    /// Returns an `i64` slice. Each element coerces like [`get_int64`](Self::get_int64).
    pub fn get_int_slice_default(&self, key: &str, def: Vec<i64>) -> Vec<i64> {
        self.coerce_or(key, def, coerce::to_i64_vec)
    }

    /// Returns an `i64` slice, or an empty `Vec`.
    pub fn get_int_slice(&self, key: &str) -> Vec<i64> {
        self.get_int_slice_default(key, Vec::new())
    }

    /// Returns an `f64` slice. Each element coerces like [`get_float64`](Self::get_float64).
    pub fn get_float_slice_default(&self, key: &str, def: Vec<f64>) -> Vec<f64> {
        self.coerce_or(key, def, coerce::to_f64_vec)
    }

    /// Returns an `f64` slice, or an empty `Vec`.
    pub fn get_float_slice(&self, key: &str) -> Vec<f64> {
        self.get_float_slice_default(key, Vec::new())
    }
}
