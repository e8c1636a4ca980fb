//! Attribute maps attached to nodes and marks
//!
//! Attributes are open JSON objects. The schema decides which keys a
//! given node or mark type carries and which defaults apply when a key
//! is omitted at construction time.

use serde_json::Value;

/// Attribute map for a node or mark, keyed by attribute name.
pub type Attrs = serde_json::Map<String, Value>;

/// Builds an attribute map from `(name, value)` pairs.
///
/// ```
/// use serde_json::json;
/// use vellum_model::attrs;
///
/// let a = attrs([("level", json!(2))]);
/// assert_eq!(a.get("level"), Some(&json!(2)));
/// ```
pub fn attrs<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> Attrs {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
