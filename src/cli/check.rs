//! Parse predicates and reduce them against a JSON-described object

use super::{CliError, json_to_object};
use crate::{AstNode, EvalContext, Evaluator, Object, PdfVersion, Reduction, TsvRow, parse_row_field};

/// Options for the parse and eval commands
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The predicate, as written in a grammar cell
    pub predicate: String,
    /// JSON for the object stored under `key`
    pub object: Option<String>,
    /// JSON for the dictionary or array holding the object
    pub container: Option<String>,
    /// JSON for the document trailer
    pub trailer: Option<String>,
    /// PDF version to check against (latest when unset)
    pub pdf_version: Option<String>,
    /// Key the object is stored under
    pub key: Option<String>,
    /// Supported extensions
    pub extensions: Vec<String>,
    /// Fall back to DefaultValue for missing keys
    pub default_values: bool,
    /// Only parse, don't reduce
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// The parsed AST
    Parsed(AstNode),
    /// The reduction of the predicate
    Reduced(Reduction),
}

fn parse_object(json: &str) -> Result<Object, CliError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    json_to_object(value)
}

/// Execute an arlpred parse or eval operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let ast = parse_row_field(options.predicate.trim())?;
    if options.syntax_only {
        return Ok(CheckResult::Parsed(ast));
    }

    let version = match &options.pdf_version {
        Some(v) => v.parse::<PdfVersion>()?,
        None => PdfVersion::LATEST,
    };
    let object = parse_object(options.object.as_deref().ok_or(CliError::NoInput)?)?;
    let container = options.container.as_deref().map(parse_object).transpose()?;
    let trailer = options.trailer.as_deref().map(parse_object).transpose()?;
    let rows: Vec<TsvRow> = options
        .key
        .iter()
        .map(|key| TsvRow::new(key.as_str(), ""))
        .collect();

    let mut ctx = EvalContext::new(version)
        .with_rows(&rows, 0)
        .with_extensions(options.extensions.iter().cloned())
        .with_default_values(options.default_values);
    if let Some(container) = &container {
        ctx = ctx.with_container(container);
    }
    if let Some(trailer) = &trailer {
        ctx = ctx.with_trailer(trailer);
    }

    Ok(CheckResult::Reduced(Evaluator::new(ctx).evaluate(&ast, &object)))
}
