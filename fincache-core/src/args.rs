//! Operation arguments with deterministic serialization.
//!
//! Cache keys embed a JSON rendering of the operation arguments. Two
//! argument maps with identical key/value pairs must render identically
//! regardless of how they were assembled, or logically equal requests would
//! miss the cache nondeterministically. `ArgMap` is a `BTreeMap` so top-level
//! ordering is inherent; [`canonicalize`] sorts nested objects as well, so
//! determinism does not depend on which map type `serde_json` was compiled
//! with.

use serde_json::Value;
use std::collections::BTreeMap;

/// Arguments of a named operation: argument name to JSON value.
pub type ArgMap = BTreeMap<String, Value>;

/// Recursively sort every object in a JSON value by key.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            let mut out = serde_json::Map::with_capacity(sorted.len());
            for (key, inner) in sorted {
                out.insert(key.clone(), canonicalize(inner));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Render an argument map as canonical JSON.
///
/// The rendering is deterministic: object keys are sorted at every nesting
/// level. Array element order is preserved (it is semantically significant).
pub fn canonical_json(args: &ArgMap) -> String {
    let mut object = serde_json::Map::with_capacity(args.len());
    for (key, value) in args {
        object.insert(key.clone(), canonicalize(value));
    }
    Value::Object(object).to_string()
}
