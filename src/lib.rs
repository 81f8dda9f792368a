pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod evaluator;
pub mod grammar;
pub mod lexer;
pub mod object;
pub mod output;
pub mod parser;
pub mod processor;
pub mod version;

pub use ast::{AstNode, NodeType, Predicate, Token};
pub use evaluator::{EvalContext, Evaluator, Reduction};
pub use grammar::{Column, GrammarError, TsvGrammar, TsvRow};
pub use lexer::{LexError, Lexer, Position};
pub use object::{Object, ObjectType, PdfNumber, PdfObject};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, Parser, parse_expression, parse_predicate, parse_row_field};
pub use processor::{PredicateProcessor, ReferenceType, RowReport};
pub use version::{PdfVersion, VersionError};
