//! Shared utility functions for extraction and code generation.

use serde_json::Value;

/// Convert a DSL name to PascalCase (e.g., "blog_posts" -> "BlogPosts").
///
/// The name is split on underscores and whitespace; each part gets its first
/// character uppercased and the parts are joined without separators.
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c.is_whitespace())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Convert a literal value to its display string.
///
/// Strings are returned without quotes; everything else uses its JSON text.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
