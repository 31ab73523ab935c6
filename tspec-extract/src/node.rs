//! Uniform access to syntax tree nodes.
//!
//! The two parsers produce differently shaped trees: the in-process parser
//! tags nodes with `type` and nests call arguments inside an `ArgumentsNode`,
//! while other providers tag with `kind` and use names such as `recv`, `args`
//! or `selector`. Every accessor here tries a fixed list of field names and
//! returns the first one with the expected structure.

use std::borrow::Cow;

use serde_json::Value;

/// A tree node that can be turned into a plain keyed structure.
///
/// Plain JSON values borrow themselves. Providers that build their data
/// on demand return an owned value.
pub trait Materialize {
    fn materialize(&self) -> Cow<'_, Value>;
}

impl Materialize for Value {
    fn materialize(&self) -> Cow<'_, Value> {
        Cow::Borrowed(self)
    }
}

impl<T: Materialize + ?Sized> Materialize for &T {
    fn materialize(&self) -> Cow<'_, Value> {
        (**self).materialize()
    }
}

const TAG_FIELDS: &[&str] = &["type", "kind"];
const NAME_FIELDS: &[&str] = &["name", "method", "method_name", "selector", "message"];
const RECEIVER_FIELDS: &[&str] = &["receiver", "recv"];
const BODY_FIELDS: &[&str] = &["body", "statements"];
const WRAPPED_CALL_FIELDS: &[&str] = &["call", "send"];

/// The node's tag, from `type` or `kind`.
pub fn tag(node: &Value) -> Option<&str> {
    TAG_FIELDS
        .iter()
        .find_map(|field| node.get(field).and_then(Value::as_str))
}

/// Whether `node` is an object carrying a string tag.
pub fn is_taggable(node: &Value) -> bool {
    tag(node).is_some()
}

/// Whether `node` is a method call (`CallNode`, `send`, `csend`, ...).
pub fn is_call(node: &Value) -> bool {
    tag(node).is_some_and(|t| {
        let t = t.to_ascii_lowercase();
        t.contains("call") || t.ends_with("send")
    })
}

/// The raw name-bearing field of a node: a string, or a node wrapping one.
pub fn name_field(node: &Value) -> Option<&Value> {
    NAME_FIELDS
        .iter()
        .find_map(|field| node.get(field).filter(|v| v.is_string() || v.is_object()))
}

pub fn receiver(node: &Value) -> Option<&Value> {
    RECEIVER_FIELDS
        .iter()
        .find_map(|field| node.get(field).filter(|v| v.is_object()))
}

pub fn block(node: &Value) -> Option<&Value> {
    node.get("block").filter(|v| v.is_object())
}

/// The call wrapped by a block node (`{ kind: "block", call: ..., body: ... }`).
pub fn wrapped_call(node: &Value) -> Option<&Value> {
    WRAPPED_CALL_FIELDS
        .iter()
        .find_map(|field| node.get(field).filter(|v| v.is_object()))
}

/// Statements of a block or statement-list node.
///
/// An object-valued body yields its own `body`/`statements` array, an array
/// yields itself, and a lone tagged node is a single statement.
pub fn body_statements(node: &Value) -> Vec<&Value> {
    for field in BODY_FIELDS {
        match node.get(field) {
            Some(Value::Array(items)) => return items.iter().collect(),
            Some(inner @ Value::Object(_)) => {
                let nested = BODY_FIELDS
                    .iter()
                    .find_map(|f| inner.get(f).and_then(Value::as_array));
                return match nested {
                    Some(items) => items.iter().collect(),
                    None if is_taggable(inner) => vec![inner],
                    None => Vec::new(),
                };
            }
            _ => {}
        }
    }
    Vec::new()
}

/// Argument nodes of a call.
///
/// `arguments` may be an array or an arguments node holding the array;
/// `args` is accepted in the same two forms.
pub fn call_arguments(node: &Value) -> Vec<&Value> {
    for field in ["arguments", "args"] {
        match node.get(field) {
            Some(Value::Array(items)) => return items.iter().collect(),
            Some(inner @ Value::Object(_)) => {
                if let Some(items) = list_items(inner) {
                    return items.iter().collect();
                }
            }
            _ => {}
        }
    }
    Vec::new()
}

const LIST_FIELDS: &[&str] = &["elements", "arguments", "args", "pairs", "children"];

/// First array-valued field among `elements`, `arguments`, `args`, `pairs`
/// and `children`.
pub fn list_items(node: &Value) -> Option<&Vec<Value>> {
    LIST_FIELDS
        .iter()
        .find_map(|field| node.get(field).and_then(Value::as_array))
}

/// Whether `node` is a key/value pair.
pub fn is_pair(node: &Value) -> bool {
    let tagged = tag(node).is_some_and(|t| {
        let t = t.to_ascii_lowercase();
        t.contains("assoc") || t.contains("pair")
    });
    tagged || (node.get("key").is_some() && node.get("value").is_some())
}

/// Byte offsets `(start, end)` of a node in the source text.
pub fn offsets(node: &Value) -> Option<(usize, usize)> {
    let pair = |obj: &Value, start: &str, end: &str| -> Option<(usize, usize)> {
        Some((as_offset(obj.get(start)?)?, as_offset(obj.get(end)?)?))
    };

    if let Some(found) = pair(node, "start_offset", "end_offset") {
        return Some(found);
    }
    if let Some(location) = node.get("location") {
        if let Some(found) = pair(location, "start_offset", "end_offset") {
            return Some(found);
        }
        if let Some((start, length)) = pair(location, "start_offset", "length") {
            return Some((start, start + length));
        }
    }
    node.get("loc").and_then(|loc| pair(loc, "begin", "end"))
}

fn as_offset(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|n| usize::try_from(n).ok())
}

/// Depth-first preorder traversal over every taggable node.
///
/// `visit` receives each node with its immediate taggable parent. Children
/// are the taggable object fields and the taggable items of array fields,
/// in field order.
pub fn walk<'a, F>(root: &'a Value, mut visit: F)
where
    F: FnMut(&'a Value, Option<&'a Value>),
{
    let mut stack: Vec<(&'a Value, Option<&'a Value>)> = Vec::new();
    if is_taggable(root) {
        stack.push((root, None));
    } else {
        push_children(&mut stack, root, None);
    }

    while let Some((node, parent)) = stack.pop() {
        visit(node, parent);
        push_children(&mut stack, node, Some(node));
    }
}

/// Push the taggable children of `node` so that they pop in field order.
fn push_children<'a>(
    stack: &mut Vec<(&'a Value, Option<&'a Value>)>,
    node: &'a Value,
    parent: Option<&'a Value>,
) {
    let mut children = Vec::new();
    let fields: Box<dyn Iterator<Item = &'a Value>> = match node {
        Value::Object(map) => Box::new(map.values()),
        Value::Array(items) => Box::new(items.iter()),
        _ => return,
    };
    for value in fields {
        match value {
            Value::Object(_) if is_taggable(value) => children.push(value),
            Value::Array(items) => children.extend(items.iter().filter(|v| is_taggable(v))),
            _ => {}
        }
    }
    stack.extend(children.into_iter().rev().map(|child| (child, parent)));
}
