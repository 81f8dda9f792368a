//! # Arlington Predicates - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for the predicate
//! language embedded in Arlington PDF Model grammar cells. A predicate is a
//! small function-like expression that makes a grammar rule depend on the PDF
//! version, on sibling keys or on the value of the object being checked.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[node]** - The tree node shared by the parser and the evaluator
//! - **[operators]** - Comparison, arithmetic and logical operators
//! - **[predicates]** - The closed vocabulary of `fn:` predicate functions
//!
//! ## Quick Start
//!
//! ```text
//! fn:SinceVersion(1.5,fn:Eval(@StateModel=='Marked'))
//! ```
//!
//! This cell only applies from PDF 1.5 onwards, and then requires the key
//! `StateModel` to hold the name `Marked`.
//!
//! ## Core Concepts
//!
//! ### Operands
//!
//! - **Keys** name a dictionary key or an array index: `Subtype`, `3`, `1*`, `*`
//! - **Key values** dereference a key: `@Subtype`, `parent::@Type`
//! - **Constants**: `true`, `'quoted'`, `-1`, `0.5`
//! - **Types** are the predefined Arlington type names: `name-tree`, `string-byte`
//!
//! ### Operators and Whitespace
//!
//! Comparisons (`==`, `!=`, `>=`, `<=`, `>`, `<`) need no spacing. Arithmetic
//! (` * `, ` - `, ` mod `) and logical operators (` && `, ` || `) must be
//! padded with a single SPACE so they cannot be confused with wildcards,
//! negative numbers or key names. `+` may be bare.
//!
//! ### No Precedence
//!
//! Operators apply in textual order with the right-hand side parsed
//! recursively; brackets are the only way to group:
//!
//! ```text
//! (@c>=0) && (@b<=-1)
//! ```
//!
//! ### Tree Shape
//!
//! Every [`AstNode`] has up to two children. A node with none is a constant,
//! one child is a unary predicate call, two children are a binary operator
//! or a two-argument predicate call.
//!
//! ## Examples
//!
//! ### Version Gating
//!
//! ```text
//! fn:BeforeVersion(1.3,string-byte)
//! ```
//!
//! ### Conditional Requirement
//!
//! ```text
//! fn:IsRequired(@Subtype==Link)
//! ```
//!
//! ### Arithmetic
//!
//! ```text
//! fn:Eval((@Length mod 8)==0)
//! ```
pub mod node;
pub mod operators;
pub mod predicates;
pub mod tokens;

pub use node::{AstNode, NodeType, format_real};
pub use operators::{LogicalOp, MathComp, MathOp};
pub use predicates::Predicate;
pub use tokens::Token;
