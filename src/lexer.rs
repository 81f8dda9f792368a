use std::fmt;

use crate::ast::{LogicalOp, MathComp, MathOp, Predicate, Token};

/// Predefined Arlington type names, longest first so that `name-tree` wins
/// over `name` and `string-byte` over `string`.
const TYPE_WORDS: &[&str] = &[
    "number-tree",
    "string-ascii",
    "string-byte",
    "string-text",
    "dictionary",
    "name-tree",
    "rectangle",
    "bitmask",
    "boolean",
    "integer",
    "matrix",
    "number",
    "stream",
    "string",
    "array",
    "date",
    "name",
    "null",
];

/// Operators that only exist with a single SPACE on each side.
const PADDED_OPERATORS: &[(&str, Token)] = &[
    (" && ", Token::LogicalOp(LogicalOp::And)),
    (" || ", Token::LogicalOp(LogicalOp::Or)),
    (" * ", Token::MathOp(MathOp::Multiply, " * ")),
    (" - ", Token::MathOp(MathOp::Subtract, " - ")),
    (" mod ", Token::MathOp(MathOp::Modulo, " mod ")),
    (" + ", Token::MathOp(MathOp::Add, " + ")),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Character offset from the start of the input
    pub offset: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset {}", self.offset)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    UnexpectedChar { ch: char, position: Position },
    EmptyString { position: Position },
    UnterminatedString { position: Position },
    MalformedPredicateHead { position: Position },
    UnknownPredicate { name: String, position: Position },
    MalformedKeyValue { text: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedChar { position, .. }
            | LexError::EmptyString { position }
            | LexError::UnterminatedString { position }
            | LexError::MalformedPredicateHead { position }
            | LexError::UnknownPredicate { position, .. }
            | LexError::MalformedKeyValue { position, .. } => *position,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedChar { ch, position } => {
                write!(f, "Unexpected character '{}' at {}", ch, position)
            }
            LexError::EmptyString { position } => {
                write!(f, "Empty string literal at {}", position)
            }
            LexError::UnterminatedString { position } => {
                write!(f, "Unterminated string: missing closing quote for literal at {}", position)
            }
            LexError::MalformedPredicateHead { position } => {
                write!(f, "Malformed predicate head at {} (expected fn:Name()", position)
            }
            LexError::UnknownPredicate { name, position } => {
                write!(f, "Unknown predicate 'fn:{}(' at {}", name, position)
            }
            LexError::MalformedKeyValue { text, position } => {
                write!(f, "Malformed key-value reference '{}' at {}", text, position)
            }
        }
    }
}

impl std::error::Error for LexError {}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    token_start: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            token_start: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn here(&self) -> Position {
        Position {
            offset: self.position,
        }
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_char(i) == Some(c))
    }

    /// Start offset of the token most recently returned by [`Lexer::next_token`].
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// The unconsumed input from `offset` onwards.
    pub fn remainder_from(&self, offset: usize) -> String {
        self.input.get(offset..).unwrap_or_default().iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// A padded operator starting at the current whitespace, if any.
    fn read_padded_operator(&mut self) -> Option<Token> {
        for (text, token) in PADDED_OPERATORS {
            if self.starts_with(text) {
                self.position += text.chars().count();
                return Some(token.clone());
            }
        }
        None
    }

    fn read_predicate_head(&mut self) -> Result<Token, LexError> {
        let start = self.here();
        self.position += 3; // fn:
        let mut name = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphabetic() || ch == '1' || ch == '4' {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        if name.is_empty() || self.current_char() != Some('(') {
            return Err(LexError::MalformedPredicateHead { position: start });
        }
        self.advance();
        Predicate::from_name(&name)
            .map(Token::PredicateHead)
            .ok_or(LexError::UnknownPredicate {
                name,
                position: start,
            })
    }

    fn read_string(&mut self) -> Result<Token, LexError> {
        let start = self.here();
        self.advance(); // opening quote
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == '\'' {
                if result.is_empty() {
                    return Err(LexError::EmptyString { position: start });
                }
                return Ok(Token::String(result));
            }
            result.push(ch);
        }
        Err(LexError::UnterminatedString { position: start })
    }

    /// Integer or real, unless the digits run into a letter or `*` (as in
    /// `3DRenderMode` or `1*`), in which case nothing is consumed.
    fn read_number(&mut self) -> Option<Token> {
        let start = self.position;
        let mut number = String::new();
        let mut is_real = false;

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.' && !is_real && self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
                is_real = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if self
            .current_char()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '*' || c == '_' || c == '.')
        {
            self.position = start;
            return None;
        }
        Some(if is_real {
            Token::Number(number)
        } else {
            Token::Integer(number)
        })
    }

    fn is_word_char(ch: char) -> bool {
        ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | ':' | '*' | '@' | '-')
    }

    /// `word` at the current position, not followed by another key character.
    fn match_word(&self, word: &str) -> bool {
        self.starts_with(word)
            && !self
                .peek_char(word.chars().count())
                .is_some_and(Self::is_word_char)
    }

    fn read_keyword(&mut self) -> Option<Token> {
        for (word, value) in [("true", true), ("false", false)] {
            if self.match_word(word) {
                self.position += word.len();
                return Some(Token::Boolean(value));
            }
        }
        for word in TYPE_WORDS {
            if self.match_word(word) {
                self.position += word.len();
                return Some(Token::Type(word.to_string()));
            }
        }
        None
    }

    /// Key, key path or key-value reference: `[A-Za-z0-9_.*]` runs joined
    /// by `::`, with an optional `@` opening the last segment.
    fn read_key(&mut self) -> Result<Token, LexError> {
        let start = self.here();
        let mut text = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '*' | '@') {
                text.push(ch);
                self.advance();
            } else if ch == ':' && self.peek_char(1) == Some(':') {
                text.push_str("::");
                self.position += 2;
            } else {
                break;
            }
        }

        if text.is_empty() {
            return Err(LexError::UnexpectedChar {
                ch: self.current_char().unwrap_or(' '),
                position: start,
            });
        }
        if !text.contains('@') {
            return Ok(Token::Key(text));
        }

        let (prefix, last) = match text.rfind("::") {
            Some(idx) => (&text[..idx], &text[idx + 2..]),
            None => ("", text.as_str()),
        };
        let prefix_ok = prefix.is_empty()
            || prefix
                .split("::")
                .all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_alphanumeric()));
        let last_ok = last.len() > 1 && last.starts_with('@') && !last[1..].contains('@');
        if prefix_ok && last_ok {
            Ok(Token::KeyValue(text))
        } else {
            Err(LexError::MalformedKeyValue {
                text,
                position: start,
            })
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            match self.current_char() {
                Some(ch) if ch.is_whitespace() => {
                    self.token_start = self.position;
                    if let Some(op) = self.read_padded_operator() {
                        return Ok(op);
                    }
                    self.advance();
                }
                _ => break,
            }
        }
        self.token_start = self.position;

        match self.current_char() {
            None => Ok(Token::Eof),
            Some('f') if self.starts_with("fn:") => self.read_predicate_head(),
            Some('(') => {
                self.advance();
                Ok(Token::LParen)
            }
            Some(')') => {
                self.advance();
                Ok(Token::RParen)
            }
            Some(',') => {
                self.advance();
                self.skip_whitespace();
                Ok(Token::Comma)
            }
            Some('=') => {
                if self.peek_char(1) == Some('=') {
                    self.position += 2;
                    Ok(Token::MathComp(MathComp::Equal))
                } else {
                    Err(LexError::UnexpectedChar {
                        ch: '=',
                        position: self.here(),
                    })
                }
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.position += 2;
                    Ok(Token::MathComp(MathComp::NotEqual))
                } else {
                    Err(LexError::UnexpectedChar {
                        ch: '!',
                        position: self.here(),
                    })
                }
            }
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.position += 2;
                    Ok(Token::MathComp(MathComp::GreaterEqual))
                } else {
                    self.advance();
                    Ok(Token::MathComp(MathComp::GreaterThan))
                }
            }
            Some('<') => {
                if self.peek_char(1) == Some('=') {
                    self.position += 2;
                    Ok(Token::MathComp(MathComp::LessEqual))
                } else {
                    self.advance();
                    Ok(Token::MathComp(MathComp::LessThan))
                }
            }
            Some('+') => {
                self.advance();
                Ok(Token::MathOp(MathOp::Add, "+"))
            }
            Some('\'') => self.read_string(),
            Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                match self.read_number() {
                    Some(token) => Ok(token),
                    None => Err(LexError::UnexpectedChar {
                        ch: '-',
                        position: self.here(),
                    }),
                }
            }
            Some(ch) if ch.is_ascii_digit() => match self.read_number() {
                Some(token) => Ok(token),
                None => self.read_key(),
            },
            Some(ch) if ch.is_ascii_alphabetic() => match self.read_keyword() {
                Some(token) => Ok(token),
                None => self.read_key(),
            },
            Some(ch) if matches!(ch, '@' | '*' | '_' | '.') => self.read_key(),
            Some(ch) => Err(LexError::UnexpectedChar {
                ch,
                position: self.here(),
            }),
        }
    }
}

#[test]
fn test_predicate_heads() {
    let mut lexer = Lexer::new("fn:SinceVersion(1.5,fn:NotStandard14Font())");
    assert_eq!(
        lexer.next_token().unwrap(),
        Token::PredicateHead(Predicate::SinceVersion)
    );
    assert_eq!(lexer.next_token().unwrap(), Token::Number("1.5".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Comma);
    assert_eq!(
        lexer.next_token().unwrap(),
        Token::PredicateHead(Predicate::NotStandard14Font)
    );
    assert_eq!(lexer.next_token().unwrap(), Token::RParen);
    assert_eq!(lexer.next_token().unwrap(), Token::RParen);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_padded_operators() {
    let mut lexer = Lexer::new("@a * 2 - 1 mod 3 && true");
    assert_eq!(lexer.next_token().unwrap(), Token::KeyValue("@a".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::MathOp(MathOp::Multiply, " * "));
    assert_eq!(lexer.next_token().unwrap(), Token::Integer("2".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::MathOp(MathOp::Subtract, " - "));
    assert_eq!(lexer.next_token().unwrap(), Token::Integer("1".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::MathOp(MathOp::Modulo, " mod "));
    assert_eq!(lexer.next_token().unwrap(), Token::Integer("3".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::LogicalOp(LogicalOp::And));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
}

#[test]
fn test_remainder() {
    let mut lexer = Lexer::new("1.5,xyz");
    lexer.next_token().unwrap();
    lexer.next_token().unwrap();
    assert_eq!(lexer.remainder_from(lexer.token_start()), ",xyz");
}
