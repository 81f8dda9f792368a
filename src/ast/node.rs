use std::fmt;

use crate::ast::{LogicalOp, MathComp, MathOp, Predicate};

/// What an [`AstNode`] represents.
///
/// Operator and predicate variants carry the decoded operator so that
/// evaluation dispatches on a tag; the node text keeps the source spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeType {
    /// Not yet populated (an open bracket shell during parsing)
    #[default]
    Unknown,
    /// `fn:Name(` call with zero, one or two arguments
    Predicate(Predicate),
    /// Binary comparison
    MathComp(MathComp),
    /// Binary arithmetic
    MathOp(MathOp),
    /// Binary logical operator
    LogicalOp(LogicalOp),
    /// `true` / `false`
    ConstBoolean,
    /// String without its quotes
    ConstString,
    /// Integer literal
    ConstInt,
    /// Real literal
    ConstNum,
    /// Key name, array index or key path
    Key,
    /// `@key` reference
    KeyValue,
    /// Predefined Arlington type name
    Type,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Unknown => "???",
            NodeType::Predicate(_) => "Predicate",
            NodeType::MathComp(_) => "MathComp",
            NodeType::MathOp(_) => "MathOp",
            NodeType::LogicalOp(_) => "LogicalOp",
            NodeType::ConstBoolean => "Boolean",
            NodeType::ConstString => "String",
            NodeType::ConstInt => "Integer",
            NodeType::ConstNum => "Number",
            NodeType::Key => "Key",
            NodeType::KeyValue => "KeyValue",
            NodeType::Type => "Type",
        }
    }

    /// Constants and keys reduce to themselves.
    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            NodeType::ConstBoolean
                | NodeType::ConstString
                | NodeType::ConstInt
                | NodeType::ConstNum
                | NodeType::Key
                | NodeType::Type
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of a parsed (or reduced) predicate.
///
/// Children are exclusively owned, so the tree can never share or cycle.
/// A node with no children is a constant, one child is a unary predicate
/// call, two children are a binary operator or a two-argument call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AstNode {
    /// Operator symbol, predicate head (`fn:Name(`) or literal text
    pub node: String,
    pub kind: NodeType,
    pub arg: [Option<Box<AstNode>>; 2],
}

impl AstNode {
    /// An empty shell, filled in later by the parser.
    pub fn new() -> Self {
        AstNode::default()
    }

    pub fn leaf(kind: NodeType, node: impl Into<String>) -> Self {
        AstNode {
            node: node.into(),
            kind,
            arg: [None, None],
        }
    }

    pub fn boolean(value: bool) -> Self {
        AstNode::leaf(NodeType::ConstBoolean, if value { "true" } else { "false" })
    }

    pub fn integer(value: i64) -> Self {
        AstNode::leaf(NodeType::ConstInt, value.to_string())
    }

    pub fn number(value: f64) -> Self {
        AstNode::leaf(NodeType::ConstNum, format_real(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        AstNode::leaf(NodeType::ConstString, value)
    }

    pub fn key(value: impl Into<String>) -> Self {
        AstNode::leaf(NodeType::Key, value)
    }

    /// A predicate call with up to two arguments.
    pub fn call(predicate: Predicate, first: Option<AstNode>, second: Option<AstNode>) -> Self {
        AstNode {
            node: predicate.head(),
            kind: NodeType::Predicate(predicate),
            arg: [first.map(Box::new), second.map(Box::new)],
        }
    }

    /// Promotes `lhs` into the left child of a new binary operator node.
    pub fn operator(kind: NodeType, op: impl Into<String>, lhs: AstNode, rhs: AstNode) -> Self {
        AstNode {
            node: op.into(),
            kind,
            arg: [Some(Box::new(lhs)), Some(Box::new(rhs))],
        }
    }

    /// Non-empty text, a valid left child if present, and never a right
    /// child without a left one.
    pub fn valid(&self) -> bool {
        if self.node.is_empty() {
            return false;
        }
        match (&self.arg[0], &self.arg[1]) {
            (None, None) => true,
            (Some(left), None) => left.valid(),
            (Some(left), Some(right)) => left.valid() && right.valid(),
            (None, Some(_)) => false,
        }
    }

    pub fn left(&self) -> Option<&AstNode> {
        self.arg[0].as_deref()
    }

    pub fn right(&self) -> Option<&AstNode> {
        self.arg[1].as_deref()
    }

    pub fn arg_count(&self) -> usize {
        self.arg.iter().filter(|a| a.is_some()).count()
    }

    pub fn predicate(&self) -> Option<Predicate> {
        match self.kind {
            NodeType::Predicate(p) => Some(p),
            _ => None,
        }
    }

    /// Copy of this node without its children.
    pub fn shallow(&self) -> AstNode {
        AstNode::leaf(self.kind, self.node.clone())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match (self.kind, self.node.as_str()) {
            (NodeType::ConstBoolean, "true") => Some(true),
            (NodeType::ConstBoolean, "false") => Some(false),
            _ => None,
        }
    }

    /// Numeric value of an integer or real constant.
    pub fn as_f64(&self) -> Option<f64> {
        match self.kind {
            NodeType::ConstInt | NodeType::ConstNum => self.node.parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.kind {
            NodeType::ConstInt => self.node.parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.node.is_empty() {
            write!(f, "{{''")?;
        } else {
            write!(f, "{{{}:'{}'", self.kind, self.node)?;
        }
        match (&self.arg[0], &self.arg[1]) {
            (Some(left), Some(right)) => write!(f, ",[{}],[{}]", left, right)?,
            (Some(left), None) => write!(f, ",[{}]", left)?,
            (None, Some(right)) => write!(f, ",???,[{}]", right)?,
            (None, None) => {}
        }
        write!(f, "}}")
    }
}

/// Formats a real so it always reads back as a real: `10.0`, `0.5`, `-2.25`.
pub fn format_real(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        let text = format!("{:.6}", value);
        let trimmed = text.trim_end_matches('0');
        if trimmed.ends_with('.') {
            format!("{}0", trimmed)
        } else {
            trimmed.to_string()
        }
    }
}
