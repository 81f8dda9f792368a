use crate::ast::{LogicalOp, MathComp, MathOp, Predicate};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Predicate call head, mapped onto the closed vocabulary
    ///
    /// # Examples
    /// ```text
    /// fn:SinceVersion(
    /// fn:MustBeDirect(
    /// ```
    PredicateHead(Predicate),

    // Literals
    /// Boolean literal (case-sensitive)
    ///
    /// # Examples
    /// ```text
    /// true
    /// false
    /// ```
    Boolean(bool),

    /// Single-quoted, non-empty string. The quotes are not part of the value
    /// and there is no escape handling.
    ///
    /// # Examples
    /// ```text
    /// 'Marked'
    /// 'Adobe.PPKLite'
    /// ```
    String(String),

    /// One of the predefined Arlington type names
    ///
    /// # Examples
    /// ```text
    /// string-byte
    /// name-tree
    /// ```
    Type(String),

    /// Value of a key, optionally path-prefixed
    ///
    /// # Examples
    /// ```text
    /// @Subtype
    /// parent::@Type
    /// @0
    /// ```
    KeyValue(String),

    /// Real number, text kept as written
    ///
    /// # Examples
    /// ```text
    /// 1.5
    /// -0.25
    /// ```
    Number(String),

    /// Integer, text kept as written
    ///
    /// # Examples
    /// ```text
    /// 0
    /// -1
    /// ```
    Integer(String),

    /// Key name, array index or key path, with optional wildcards
    ///
    /// # Examples
    /// ```text
    /// Subtype
    /// 3DRenderMode
    /// trailer::Catalog::Pages
    /// 1*
    /// *
    /// ```
    Key(String),

    // Operators
    /// Comparison: `==`, `!=`, `>=`, `<=`, `>`, `<`
    MathComp(MathComp),

    /// Arithmetic. The text is kept because `+` may be bare or padded.
    MathOp(MathOp, &'static str),

    /// ` && ` or ` || `
    LogicalOp(LogicalOp),

    // Delimiters
    /// Opens a sub-expression
    LParen,

    /// Closes a predicate call or a sub-expression
    RParen,

    /// Separates predicate arguments and value-list entries
    Comma,

    /// End of input
    Eof,
}

impl Token {
    /// Whether this token can start an operand.
    pub fn is_operand_start(&self) -> bool {
        matches!(
            self,
            Token::PredicateHead(_)
                | Token::Boolean(_)
                | Token::String(_)
                | Token::Type(_)
                | Token::KeyValue(_)
                | Token::Number(_)
                | Token::Integer(_)
                | Token::Key(_)
                | Token::LParen
        )
    }
}
