//! Recognition of the schema DSL calls.
//!
//! Only `create_table` with a block, `create_enum` with a value array, and
//! column declarations inside a table block are recognized. Every other
//! shape yields `None` and is skipped silently.

use serde_json::Value;
use tspec_core::ColumnOptions;

use crate::literal::LiteralResolver;
use crate::node;

/// Table helpers that declare indexes or constraints, not columns.
const NON_COLUMN_METHODS: &[&str] = &[
    "index",
    "check_constraint",
    "exclusion_constraint",
    "unique_constraint",
];

/// A top-level schema declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaCall<'a> {
    /// `create_table "users" do |t| ... end`, with the block node.
    CreateTable { name: String, block: &'a Value },
    /// `create_enum "status", ["draft", "published"]`.
    CreateEnum { name: String, values: Vec<String> },
}

/// A statement inside a `create_table` block.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnCall {
    /// `t.<type> "name", options` or `t.column "name", "type", options`.
    Column {
        name: String,
        ty: String,
        options: ColumnOptions,
    },
    /// `t.timestamps`, which expands to `created_at` and `updated_at`.
    Timestamps,
}

/// Method name of a call node, resolved through the literal resolver.
pub fn method_name(call: &Value, resolver: &LiteralResolver<'_>) -> Option<String> {
    node::name_field(call).and_then(|name| resolver.resolve_string(name))
}

/// Match a node visited during traversal against the top-level declarations.
///
/// `parent` is consulted for providers that wrap a call in a block node
/// (`{ kind: "block", call: <send>, body: ... }`) instead of attaching the
/// block to the call.
pub fn match_schema_call<'a>(
    node: &'a Value,
    parent: Option<&'a Value>,
    resolver: &LiteralResolver<'_>,
) -> Option<SchemaCall<'a>> {
    if !node::is_call(node) {
        return None;
    }

    match method_name(node, resolver)?.as_str() {
        "create_table" => {
            let block = node::block(node).or_else(|| {
                parent.filter(|p| node::wrapped_call(p).is_some_and(|call| std::ptr::eq(call, node)))
            })?;
            let args = resolver.resolve_arguments(node);
            let name = args.string_at(0)?.to_string();
            Some(SchemaCall::CreateTable { name, block })
        }
        "create_enum" => {
            let args = resolver.resolve_arguments(node);
            let name = args.string_at(0)?.to_string();
            let values = args
                .positional
                .get(1)?
                .as_array()?
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            Some(SchemaCall::CreateEnum { name, values })
        }
        _ => None,
    }
}

/// Match one statement of a `create_table` block.
pub fn match_column(statement: &Value, resolver: &LiteralResolver<'_>) -> Option<ColumnCall> {
    if !node::is_call(statement) {
        return None;
    }

    let method = method_name(statement, resolver)?;
    if method == "timestamps" {
        return Some(ColumnCall::Timestamps);
    }
    if node::receiver(statement).is_none() || NON_COLUMN_METHODS.contains(&method.as_str()) {
        return None;
    }

    let args = resolver.resolve_arguments(statement);
    let (name, ty) = if method == "column" {
        (args.string_at(0)?, args.string_at(1)?.to_string())
    } else {
        (args.string_at(0)?, method)
    };

    Some(ColumnCall::Column {
        name: name.to_string(),
        ty,
        options: args.merged_options(),
    })
}
