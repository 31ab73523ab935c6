//! Literal and argument resolution.
//!
//! Structured data always wins: primitives, `value`/`unescaped` fields,
//! string `parts` and `elements` lists are tried first. Only when a node
//! carries none of those is the source text sliced by the node's offsets,
//! through [`SourceSliceFallback`].

use serde_json::{Map, Value};
use tspec_core::{ColumnOptions, value_to_string};

use crate::node;

/// Resolves a node from source offsets once structured fields are exhausted.
pub trait LiteralFallback {
    fn resolve(&self, node: &Value) -> Option<Value>;
}

/// Slices the original source text by a node's offsets.
///
/// Surrounding quotes and a leading `:` are stripped, and the bare tokens
/// `true`/`false` become booleans. Everything else stays a string.
#[derive(Debug, Clone, Copy)]
pub struct SourceSliceFallback<'s> {
    source: &'s str,
}

impl<'s> SourceSliceFallback<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }
}

impl LiteralFallback for SourceSliceFallback<'_> {
    fn resolve(&self, node: &Value) -> Option<Value> {
        let (start, end) = node::offsets(node)?;
        let text = self.source.get(start..end)?.trim();
        match text {
            "" => None,
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => {
                let text = text.strip_prefix(':').unwrap_or(text);
                Some(Value::String(strip_quotes(text).to_string()))
            }
        }
    }
}

fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

/// Positional and named arguments of one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub positional: Vec<Value>,
    /// One mapping per option-bearing argument node, in encounter order.
    pub options: Vec<ColumnOptions>,
}

impl Arguments {
    /// The positional argument at `index`, if it is a string.
    pub fn string_at(&self, index: usize) -> Option<&str> {
        self.positional.get(index).and_then(Value::as_str)
    }

    /// All option mappings merged shallowly; later keys overwrite earlier.
    pub fn merged_options(&self) -> ColumnOptions {
        let mut merged = ColumnOptions::new();
        for options in &self.options {
            for (key, value) in options {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}

/// Turns literal nodes into plain values.
pub struct LiteralResolver<'s> {
    fallback: Option<Box<dyn LiteralFallback + 's>>,
}

impl<'s> LiteralResolver<'s> {
    /// A resolver that falls back to slicing `source`.
    pub fn new(source: &'s str) -> Self {
        Self::with_fallback(SourceSliceFallback::new(source))
    }

    pub fn with_fallback(fallback: impl LiteralFallback + 's) -> Self {
        Self {
            fallback: Some(Box::new(fallback)),
        }
    }

    /// A resolver that only reads structured fields.
    pub fn structured() -> Self {
        Self { fallback: None }
    }

    /// Resolve a node to a string, number, boolean, array or mapping.
    pub fn resolve(&self, node: &Value) -> Option<Value> {
        match node {
            Value::Null => None,
            Value::String(_) | Value::Number(_) | Value::Bool(_) => Some(node.clone()),
            Value::Array(items) => Some(Value::Array(
                items.iter().filter_map(|item| self.resolve(item)).collect(),
            )),
            Value::Object(_) => self.resolve_node(node),
        }
    }

    /// Resolve a node and require a string result.
    pub fn resolve_string(&self, node: &Value) -> Option<String> {
        match self.resolve(node)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn resolve_node(&self, node: &Value) -> Option<Value> {
        for field in ["value", "unescaped"] {
            if let Some(v @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) = node.get(field)
            {
                return Some(v.clone());
            }
        }

        if let Some(parts) = node.get("parts").and_then(Value::as_array) {
            let text: String = parts
                .iter()
                .filter_map(|part| self.resolve(part))
                .map(|v| value_to_string(&v))
                .collect();
            return Some(Value::String(text));
        }

        let is_hash = node::tag(node).is_some_and(|t| t.to_ascii_lowercase().contains("hash"));
        let elements = match node.get("elements").and_then(Value::as_array) {
            Some(elements) => Some(elements),
            None if is_hash => node::list_items(node),
            None => None,
        };
        if let Some(elements) = elements {
            if is_hash || elements.iter().any(node::is_pair) {
                return Some(Value::Object(self.resolve_pairs(elements)));
            }
            return Some(Value::Array(
                elements.iter().filter_map(|e| self.resolve(e)).collect(),
            ));
        }

        self.fallback.as_ref()?.resolve(node)
    }

    /// Resolve the pair items of a list into a mapping. Items that are not
    /// pairs, and pairs whose key is not a non-empty string, are skipped.
    fn resolve_pairs(&self, items: &[Value]) -> Map<String, Value> {
        let mut map = Map::new();
        for item in items.iter().filter(|i| node::is_pair(i)) {
            let Some(key) = item.get("key").and_then(|k| self.resolve_string(k)) else {
                continue;
            };
            if key.is_empty() {
                continue;
            }
            if let Some(value) = item.get("value").and_then(|v| self.resolve(v)) {
                map.insert(key, value);
            }
        }
        map
    }

    /// Resolve the arguments of a call node.
    ///
    /// Bare pairs and mapping-valued arguments (keyword hashes, hash
    /// literals) become option sets; everything else is positional.
    pub fn resolve_arguments(&self, call: &Value) -> Arguments {
        let items = node::call_arguments(call);
        self.resolve_argument_list(&items)
    }

    /// Resolve the items of an argument-list node, found under the first of
    /// `elements`, `arguments`, `args`, `pairs` or `children`.
    pub fn resolve_list(&self, list: &Value) -> Arguments {
        let items: Vec<&Value> = node::list_items(list)
            .map(|items| items.iter().collect())
            .unwrap_or_default();
        self.resolve_argument_list(&items)
    }

    fn resolve_argument_list(&self, items: &[&Value]) -> Arguments {
        let mut args = Arguments::default();
        let mut loose_pairs = Vec::new();

        for item in items {
            if node::is_pair(item) {
                loose_pairs.push((*item).clone());
                continue;
            }
            self.flush_pairs(&mut loose_pairs, &mut args);
            match self.resolve(item) {
                Some(Value::Object(map)) => args.options.push(map.into_iter().collect()),
                Some(value) => args.positional.push(value),
                None => {}
            }
        }

        self.flush_pairs(&mut loose_pairs, &mut args);
        args
    }

    /// Turn a run of bare pairs into one option set, in source position.
    fn flush_pairs(&self, pairs: &mut Vec<Value>, args: &mut Arguments) {
        if pairs.is_empty() {
            return;
        }
        let map = self.resolve_pairs(pairs);
        args.options.push(map.into_iter().collect());
        pairs.clear();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn loc(start: usize, end: usize) -> Value {
        json!({ "start_offset": start, "end_offset": end })
    }

    #[test]
    fn test_primitives_resolve_to_themselves() {
        let r = LiteralResolver::structured();
        assert_eq!(r.resolve(&json!("a")), Some(json!("a")));
        assert_eq!(r.resolve(&json!(3)), Some(json!(3)));
        assert_eq!(r.resolve(&json!(true)), Some(json!(true)));
        assert_eq!(r.resolve(&Value::Null), None);
    }

    #[test]
    fn test_value_and_unescaped_fields() {
        let r = LiteralResolver::structured();
        assert_eq!(r.resolve(&json!({ "kind": "int", "value": 4 })), Some(json!(4)));
        assert_eq!(
            r.resolve(&json!({ "type": "SymbolNode", "unescaped": "cascade" })),
            Some(json!("cascade"))
        );
    }

    #[test]
    fn test_parts_concatenate() {
        let r = LiteralResolver::structured();
        let node = json!({
            "type": "InterpolatedStringNode",
            "parts": [{ "type": "StringNode", "unescaped": "a" }, { "value": 1 }, "c"]
        });
        assert_eq!(r.resolve(&node), Some(json!("a1c")));
    }

    #[test]
    fn test_elements_array_and_mapping() {
        let r = LiteralResolver::structured();
        let array = json!({ "type": "ArrayNode", "elements": [{ "unescaped": "x" }, { "value": 2 }] });
        assert_eq!(r.resolve(&array), Some(json!(["x", 2])));

        let hash = json!({
            "type": "HashNode",
            "elements": [
                { "type": "AssocNode", "key": { "unescaped": "null" }, "value": { "value": false } }
            ]
        });
        assert_eq!(r.resolve(&hash), Some(json!({ "null": false })));
    }

    #[test]
    fn test_hash_with_pairs_field() {
        let r = LiteralResolver::structured();
        let hash = json!({
            "kind": "hash",
            "pairs": [{ "kind": "pair", "key": { "kind": "sym", "value": "limit" }, "value": { "kind": "int", "value": 8 } }]
        });
        assert_eq!(r.resolve(&hash), Some(json!({ "limit": 8 })));
    }

    #[test]
    fn test_source_slice_is_last_resort() {
        let source = r#"x "quoted" :sym true nil 'single'"#;
        let r = LiteralResolver::new(source);
        assert_eq!(r.resolve(&json!({ "location": loc(2, 10) })), Some(json!("quoted")));
        assert_eq!(r.resolve(&json!({ "location": loc(11, 15) })), Some(json!("sym")));
        assert_eq!(r.resolve(&json!({ "location": loc(16, 20) })), Some(json!(true)));
        assert_eq!(r.resolve(&json!({ "location": loc(21, 24) })), Some(json!("nil")));
        assert_eq!(r.resolve(&json!({ "location": loc(25, 33) })), Some(json!("single")));

        // Structured value beats the slice
        let node = json!({ "value": "structured", "location": loc(2, 10) });
        assert_eq!(r.resolve(&node), Some(json!("structured")));
    }

    #[test]
    fn test_option_sets_keep_source_order() {
        let r = LiteralResolver::structured();
        let pair = |value: i64| {
            json!({ "kind": "pair", "key": { "value": "limit" }, "value": { "value": value } })
        };
        let list = json!({
            "args": [
                { "kind": "str", "value": "age" },
                pair(4),
                { "kind": "hash", "pairs": [pair(8)] }
            ]
        });

        let args = r.resolve_list(&list);
        assert_eq!(args.positional, [json!("age")]);
        assert_eq!(args.options.len(), 2);
        assert_eq!(args.merged_options()["limit"], json!(8));

        // Reversed: the bare pair comes last and wins
        let list = json!({ "args": [{ "kind": "hash", "pairs": [pair(8)] }, pair(4)] });
        assert_eq!(r.resolve_list(&list).merged_options()["limit"], json!(4));
    }

    #[test]
    fn test_source_slice_out_of_range() {
        let r = LiteralResolver::new("abc");
        assert_eq!(r.resolve(&json!({ "location": loc(1, 10) })), None);
        assert_eq!(LiteralResolver::structured().resolve(&json!({ "location": loc(0, 3) })), None);
    }

    #[test]
    fn test_arguments_split_positional_and_options() {
        let r = LiteralResolver::structured();
        let call = json!({
            "type": "CallNode",
            "arguments": { "type": "ArgumentsNode", "arguments": [
                { "type": "StringNode", "unescaped": "email" },
                { "type": "KeywordHashNode", "elements": [
                    { "type": "AssocNode", "key": { "unescaped": "null" }, "value": { "value": false } },
                    { "type": "AssocNode", "key": { "unescaped": "" }, "value": { "value": 1 } }
                ]}
            ]}
        });
        let args = r.resolve_arguments(&call);
        assert_eq!(args.positional, [json!("email")]);
        assert_eq!(args.options.len(), 1);
        assert_eq!(args.options[0].get("null"), Some(&json!(false)));
        assert_eq!(args.options[0].len(), 1);
    }

    #[test]
    fn test_loose_pairs_form_one_option_set() {
        let r = LiteralResolver::structured();
        let call = json!({
            "kind": "send",
            "args": [
                { "kind": "str", "value": "age" },
                { "key": { "value": "limit" }, "value": { "value": 4 } },
                { "key": { "value": 5 }, "value": { "value": "ignored" } }
            ]
        });
        let args = r.resolve_arguments(&call);
        assert_eq!(args.string_at(0), Some("age"));
        assert_eq!(args.options.len(), 1);
        assert_eq!(args.options[0].get("limit"), Some(&json!(4)));
        assert_eq!(args.options[0].len(), 1);
    }

    #[test]
    fn test_resolve_list_priority() {
        let r = LiteralResolver::structured();
        let list = json!({ "children": ["late"], "arguments": ["first"] });
        assert_eq!(r.resolve_list(&list).positional, [json!("first")]);
    }

    #[test]
    fn test_merged_options_last_writer_wins() {
        let mut first = ColumnOptions::new();
        first.insert("null".into(), json!(true));
        first.insert("limit".into(), json!(4));
        let mut second = ColumnOptions::new();
        second.insert("null".into(), json!(false));

        let args = Arguments {
            positional: vec![],
            options: vec![first, second],
        };
        let merged = args.merged_options();
        assert_eq!(merged.get("null"), Some(&json!(false)));
        assert_eq!(merged.keys().collect::<Vec<_>>(), ["null", "limit"]);
    }
}
