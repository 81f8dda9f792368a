//! JSON output for predicate trees and reductions.
//!
//! Every node prints as an object with its kind, its source text and its
//! arguments, so a parsed cell and its reduced counterpart can be compared
//! side by side:
//!
//! ```
//! use arlington_predicates::output::to_json;
//! use arlington_predicates::parser::parse_row_field;
//!
//! let ast = parse_row_field("fn:ArrayLength(Rect)").unwrap();
//! assert_eq!(
//!     to_json(&ast),
//!     r#"{"args":[{"args":[],"node":"Rect","type":"Key"}],"node":"fn:ArrayLength(","type":"Predicate"}"#
//! );
//! ```

use serde_json::{Map, Value, json};

use crate::{ast::AstNode, evaluator::Reduction};

/// The JSON tree of one node and its arguments.
pub fn ast_to_value(node: &AstNode) -> Value {
    let args: Vec<Value> = [node.left(), node.right()]
        .into_iter()
        .flatten()
        .map(ast_to_value)
        .collect();
    json!({
        "type": node.kind.as_str(),
        "node": node.node,
        "args": args,
    })
}

/// A reduction as JSON: the reduced tree (or `null`) and its flags.
pub fn reduction_to_value(reduction: &Reduction) -> Value {
    let mut out = Map::new();
    out.insert(
        "value".to_string(),
        reduction.value.as_ref().map(ast_to_value).unwrap_or(Value::Null),
    );
    out.insert("fully_processed".to_string(), Value::Bool(reduction.fully_processed));
    out.insert("deprecated".to_string(), Value::Bool(reduction.deprecated));
    Value::Object(out)
}

pub fn to_json(node: &AstNode) -> String {
    ast_to_value(node).to_string()
}

pub fn to_json_pretty(node: &AstNode) -> String {
    format!("{:#}", ast_to_value(node))
}
