use std::fmt;

use tracing::{debug, error};

use crate::{
    ast::{AstNode, NodeType, Predicate, Token},
    lexer::{LexError, Lexer},
};

/// Iterations of the expression loop before the input is declared malformed.
const LOOP_GUARD: usize = 100;

/// Entries accepted by [`parse_value_list`].
const MAX_VALUES: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    Lex(LexError),
    UnexpectedToken { found: String, offset: usize },
    UnexpectedEnd,
    MissingCloseParen { offset: usize },
    WrongArity { predicate: Predicate, count: usize },
    LoopGuard { remainder: String },
    TrailingInput { remainder: String },
    EmptyInput,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(err) => write!(f, "{}", err),
            ParseError::UnexpectedToken { found, offset } => {
                write!(f, "Unexpected '{}' at offset {}", found, offset)
            }
            ParseError::UnexpectedEnd => write!(f, "Unexpected end of predicate"),
            ParseError::MissingCloseParen { offset } => {
                write!(f, "Expected ')' at offset {}", offset)
            }
            ParseError::WrongArity { predicate, count } => write!(
                f,
                "{} does not take {} argument{}",
                predicate,
                count,
                if *count == 1 { "" } else { "s" }
            ),
            ParseError::LoopGuard { remainder } => {
                write!(f, "Failure to terminate parsing of '{}'", remainder)
            }
            ParseError::TrailingInput { remainder } => {
                write!(f, "Predicate not fully parsed, '{}' left over", remainder)
            }
            ParseError::EmptyInput => write!(f, "Empty predicate"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lex(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lex(err)
    }
}

/// A node under construction. Children are arena indices so that a node
/// can be promoted into an operator while the bracket stack still points
/// at it.
#[derive(Debug, Default)]
struct Draft {
    text: String,
    kind: NodeType,
    args: [Option<usize>; 2],
}

impl Draft {
    fn is_shell(&self) -> bool {
        self.text.is_empty()
    }

    fn is_blank(&self) -> bool {
        self.text.is_empty() && self.args[0].is_none() && self.args[1].is_none()
    }
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    current_start: usize,
    lex_error: Option<LexError>,
    arena: Vec<Draft>,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        let mut parser = Parser {
            lexer: Lexer::new(input),
            current_token: Token::Eof,
            current_start: 0,
            lex_error: None,
            arena: Vec::new(),
        };
        parser.advance();
        parser
    }

    /// A lex error ends the token stream; it is reported once the parser
    /// actually needs a token from that position.
    fn advance(&mut self) {
        if self.lex_error.is_some() {
            return;
        }
        match self.lexer.next_token() {
            Ok(token) => self.current_token = token,
            Err(err) => {
                self.current_token = Token::Eof;
                self.lex_error = Some(err);
            }
        }
        self.current_start = self.lexer.token_start();
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(&self.current_token) == std::mem::discriminant(token)
    }

    fn at_end(&self) -> bool {
        self.check(&Token::Eof)
    }

    /// Input not yet consumed, starting at the current token.
    pub fn remainder(&self) -> String {
        if self.at_end() && self.lex_error.is_none() {
            return String::new();
        }
        self.lexer.remainder_from(self.current_start)
    }

    fn unexpected(&self) -> ParseError {
        if let Some(err) = &self.lex_error {
            return ParseError::Lex(err.clone());
        }
        match self.current_token {
            Token::Eof => ParseError::UnexpectedEnd,
            _ => ParseError::UnexpectedToken {
                found: self.remainder().chars().take(20).collect(),
                offset: self.current_start,
            },
        }
    }

    fn expect_close(&mut self) -> Result<(), ParseError> {
        if self.check(&Token::RParen) {
            self.advance();
            return Ok(());
        }
        match &self.lex_error {
            Some(err) => Err(ParseError::Lex(err.clone())),
            None => Err(ParseError::MissingCloseParen {
                offset: self.current_start,
            }),
        }
    }

    fn alloc(&mut self) -> usize {
        self.arena.push(Draft::default());
        self.arena.len() - 1
    }

    /// Parses one predicate or expression at the current token.
    pub fn parse_predicate(&mut self) -> Result<AstNode, ParseError> {
        if self.at_end() {
            return Err(self.lex_error.clone().map_or(ParseError::EmptyInput, ParseError::Lex));
        }
        self.arena.clear();
        let root = self.alloc();
        self.lr_predicate(root)?;
        let node = self.build(root);
        debug_assert!(node.valid());
        debug!(ast = %node, remainder = %self.remainder(), "parsed predicate");
        Ok(node)
    }

    /// Parses an expression without collapsing a bracketed root into its
    /// only child.
    pub fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        if self.at_end() {
            return Err(self.lex_error.clone().map_or(ParseError::EmptyInput, ParseError::Lex));
        }
        self.arena.clear();
        let root = self.alloc();
        self.lr_expression(root)?;
        Ok(self.build(root))
    }

    fn lr_predicate(&mut self, root: usize) -> Result<(), ParseError> {
        if self.at_end() {
            return Err(self.unexpected());
        }
        if let Token::PredicateHead(predicate) = self.current_token {
            return self.predicate_call(root, predicate);
        }

        self.lr_expression(root)?;
        while self.arena[root].is_shell() {
            // Bracketed operand with no operator: the shell wraps a single child
            match self.arena[root].args {
                [Some(child), None] => {
                    let inner = std::mem::take(&mut self.arena[child]);
                    self.arena[root] = inner;
                }
                _ => return Err(self.unexpected()),
            }
        }
        Ok(())
    }

    /// `fn:Name(` with zero, one or two arguments, closed by `)`.
    fn predicate_call(&mut self, node: usize, predicate: Predicate) -> Result<(), ParseError> {
        self.arena[node].text = predicate.head();
        self.arena[node].kind = NodeType::Predicate(predicate);
        self.advance();

        if !self.check(&Token::RParen) {
            let first = self.alloc();
            self.arena[node].args[0] = Some(first);
            self.lr_predicate(first)?;

            if self.check(&Token::Comma) {
                self.advance();
                let second = self.alloc();
                self.arena[node].args[1] = Some(second);
                self.lr_predicate(second)?;
            } else if !self.check(&Token::RParen) && !self.at_end() {
                // An operator continues the first argument, as in fn:Eval(fn:A() == 1)
                self.lr_expression(first)?;
            }
        }
        self.expect_close()?;

        let count = self.arena[node].args.iter().filter(|a| a.is_some()).count();
        if !predicate.accepts(count) {
            return Err(ParseError::WrongArity { predicate, count });
        }
        Ok(())
    }

    fn literal(token: &Token) -> Option<(NodeType, String)> {
        match token {
            Token::Boolean(b) => Some((NodeType::ConstBoolean, b.to_string())),
            Token::String(s) => Some((NodeType::ConstString, s.clone())),
            Token::Type(t) => Some((NodeType::Type, t.clone())),
            Token::KeyValue(k) => Some((NodeType::KeyValue, k.clone())),
            Token::Number(n) => Some((NodeType::ConstNum, n.clone())),
            Token::Integer(n) => Some((NodeType::ConstInt, n.clone())),
            Token::Key(k) => Some((NodeType::Key, k.clone())),
            _ => None,
        }
    }

    fn infix(token: &Token) -> Option<(NodeType, &'static str)> {
        match token {
            Token::MathComp(op) => Some((NodeType::MathComp(*op), op.as_str())),
            Token::MathOp(op, text) => Some((NodeType::MathOp(*op), *text)),
            Token::LogicalOp(op) => Some((NodeType::LogicalOp(*op), op.as_str())),
            _ => None,
        }
    }

    fn close_brackets(&mut self, stack: &mut Vec<usize>, nested: &mut usize) -> Result<(), ParseError> {
        while *nested > 0 && self.check(&Token::RParen) {
            if let Some(&top) = stack.last() {
                if self.arena[top].is_blank() {
                    return Err(self.unexpected());
                }
            }
            self.advance();
            *nested -= 1;
            stack.pop();
        }
        Ok(())
    }

    /// Operands joined by infix operators in textual order, with explicit
    /// brackets. `root` may already hold a left operand, in which case the
    /// input starts at an operator.
    fn lr_expression(&mut self, root: usize) -> Result<(), ParseError> {
        if self.at_end() {
            return Ok(());
        }

        let mut stack = vec![root];
        let mut nested = 0usize;
        let mut loops = LOOP_GUARD;

        loop {
            let iteration_start = self.current_start;

            while self.check(&Token::LParen) {
                let top = stack[stack.len() - 1];
                if !self.arena[top].is_blank() {
                    return Err(self.unexpected());
                }
                self.advance();
                nested += 1;
                let child = self.alloc();
                self.arena[top].args[0] = Some(child);
                stack.push(child);
            }

            let top = stack[stack.len() - 1];
            if let Token::PredicateHead(predicate) = self.current_token {
                if !self.arena[top].is_blank() {
                    return Err(self.unexpected());
                }
                self.predicate_call(top, predicate)?;
            } else if let Some((kind, text)) = Self::literal(&self.current_token) {
                if !self.arena[top].is_blank() {
                    return Err(self.unexpected());
                }
                self.arena[top].kind = kind;
                self.arena[top].text = text;
                self.advance();
            }

            self.close_brackets(&mut stack, &mut nested)?;

            if let Some((kind, op)) = Self::infix(&self.current_token) {
                self.advance();
                let top = stack[stack.len() - 1];
                let rhs = self.alloc();
                if self.arena[top].is_shell() {
                    // Shell of an open bracket whose left operand is already in arg[0]
                    if self.arena[top].args[0].is_none() || self.arena[top].args[1].is_some() {
                        return Err(self.unexpected());
                    }
                    self.arena[top].text = op.to_string();
                    self.arena[top].kind = kind;
                    self.arena[top].args[1] = Some(rhs);
                } else {
                    let lhs = self.alloc();
                    let previous = std::mem::take(&mut self.arena[top]);
                    self.arena[lhs] = previous;
                    self.arena[top] = Draft {
                        text: op.to_string(),
                        kind,
                        args: [Some(lhs), Some(rhs)],
                    };
                }
                self.lr_predicate(rhs)?;
            }

            self.close_brackets(&mut stack, &mut nested)?;

            loops -= 1;
            if loops == 0 {
                let remainder = self.remainder();
                error!(remainder = %remainder, "failure to terminate predicate parsing");
                return Err(ParseError::LoopGuard { remainder });
            }

            let at_boundary =
                self.check(&Token::Comma) || self.check(&Token::RParen) || self.at_end();
            if nested == 0 && at_boundary {
                break;
            }
            if self.current_start == iteration_start && self.lex_error.is_none() {
                // Nothing matched: the loop would never terminate
                return Err(if self.at_end() {
                    ParseError::MissingCloseParen {
                        offset: self.current_start,
                    }
                } else {
                    self.unexpected()
                });
            }
            if self.lex_error.is_some() {
                return Err(self.unexpected());
            }
        }
        Ok(())
    }

    fn build(&mut self, idx: usize) -> AstNode {
        let draft = std::mem::take(&mut self.arena[idx]);
        let mut node = AstNode::leaf(draft.kind, draft.text);
        for (slot, child) in draft.args.iter().enumerate() {
            if let Some(child) = child {
                node.arg[slot] = Some(Box::new(self.build(*child)));
            }
        }
        node
    }
}

/// Parses a predicate from the front of `input`, returning the AST and the
/// unconsumed remainder.
pub fn parse_predicate(input: &str) -> Result<(AstNode, String), ParseError> {
    let mut parser = Parser::new(input);
    let node = parser.parse_predicate()?;
    Ok((node, parser.remainder()))
}

/// Parses an expression from the front of `input`, returning the AST and the
/// unconsumed remainder.
pub fn parse_expression(input: &str) -> Result<(AstNode, String), ParseError> {
    let mut parser = Parser::new(input);
    let node = parser.parse_expression()?;
    Ok((node, parser.remainder()))
}

/// Parses a complete grammar cell fragment. Anything left over is an error.
pub fn parse_row_field(text: &str) -> Result<AstNode, ParseError> {
    let mut parser = Parser::new(text);
    let node = parser.parse_predicate()?;
    if !parser.at_end() || parser.lex_error.is_some() {
        return Err(match parser.lex_error {
            Some(err) => ParseError::Lex(err),
            None => ParseError::TrailingInput {
                remainder: parser.remainder(),
            },
        });
    }
    Ok(node)
}

/// Parses a `,` separated list of values or predicates, such as the inside
/// of one `[...]` alternative of a PossibleValues cell.
pub fn parse_value_list(text: &str) -> Result<Vec<AstNode>, ParseError> {
    let mut parser = Parser::new(text);
    let mut values = Vec::new();

    while !parser.at_end() {
        values.push(parser.parse_predicate()?);
        while parser.check(&Token::Comma) {
            parser.advance();
        }
        if values.len() >= MAX_VALUES && !parser.at_end() {
            let remainder = parser.remainder();
            error!(remainder = %remainder, "value list too long");
            return Err(ParseError::LoopGuard { remainder });
        }
    }
    if let Some(err) = parser.lex_error {
        return Err(ParseError::Lex(err));
    }
    Ok(values)
}
