//! Key Derivation Module
//!
//! Maps an operation name plus its arguments to a stable cache key.
//!
//! Arguments are rendered as canonical JSON (object keys sorted) and hashed
//! with MD5. Values that cannot be represented as JSON fall back to their
//! `Debug` text, so two distinct values with identical `Debug` output share
//! a key.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{json, Value};

/// Namespace prefix for every derived key.
pub const KEY_PREFIX: &str = "cloudsense_cache_";

// == Cache Key ==
/// Opaque identifier of a cached computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wraps an existing key string, e.g. one read back from the index.
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key prefix suitable for log lines.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(20)
            .map(|(idx, _)| idx)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// == Call Arguments ==
/// Positional and keyword arguments of a cached call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: BTreeMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg<T: Serialize + fmt::Debug>(mut self, value: T) -> Self {
        self.positional.push(to_key_value(&value));
        self
    }

    /// Sets a keyword argument, replacing any previous value for `name`.
    pub fn kwarg<T: Serialize + fmt::Debug>(mut self, name: impl Into<String>, value: T) -> Self {
        self.keyword.insert(name.into(), to_key_value(&value));
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self) -> &BTreeMap<String, Value> {
        &self.keyword
    }

    /// Looks up a keyword argument.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.keyword.get(name)
    }
}

/// Converts an argument to JSON, falling back to its `Debug` text.
fn to_key_value<T: Serialize + fmt::Debug>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|_| Value::String(format!("{:?}", value)))
}

// == Derive Key ==
/// Derives the cache key for `operation` called with `args`.
///
/// Pure: equal inputs always give equal keys regardless of keyword
/// insertion order or the key order of embedded objects.
pub fn derive_key(operation: &str, args: &CallArgs) -> CacheKey {
    let key_data = json!({
        "op": operation,
        "args": args.positional,
        "kwargs": args.keyword,
    });

    // serde_json::Map is BTreeMap-backed, so nested objects serialize sorted
    let key_string = key_data.to_string();
    let digest = md5::compute(key_string.as_bytes());

    CacheKey(format!("{}{:x}", KEY_PREFIX, digest))
}
