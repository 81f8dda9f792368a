use std::fmt;

/// Math comparison operators.
///
/// No surrounding whitespace is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathComp {
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than (`<`)
    LessThan,
}

impl MathComp {
    pub fn as_str(&self) -> &'static str {
        match self {
            MathComp::Equal => "==",
            MathComp::NotEqual => "!=",
            MathComp::GreaterEqual => ">=",
            MathComp::LessEqual => "<=",
            MathComp::GreaterThan => ">",
            MathComp::LessThan => "<",
        }
    }
}

/// Math operators.
///
/// `*`, `-` and `mod` are only operators when padded with a single SPACE on
/// each side, which keeps them apart from `*` wildcards, negative numbers and
/// key names. `+` is accepted bare or padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathOp {
    /// Addition (`+` or ` + `)
    Add,
    /// Subtraction (` - `)
    Subtract,
    /// Multiplication (` * `)
    Multiply,
    /// Truncating integer modulo (` mod `)
    Modulo,
}

impl MathOp {
    /// The padded spelling; `+` may also appear bare in source text.
    pub fn as_str(&self) -> &'static str {
        match self {
            MathOp::Add => " + ",
            MathOp::Subtract => " - ",
            MathOp::Multiply => " * ",
            MathOp::Modulo => " mod ",
        }
    }
}

/// Logical operators, always SPACE padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// Logical AND (` && `)
    And,
    /// Logical OR (` || `)
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => " && ",
            LogicalOp::Or => " || ",
        }
    }
}

impl fmt::Display for MathComp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MathOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
