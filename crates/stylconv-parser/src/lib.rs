//! Stylus Parser
//!
//! Parses a token stream into an Abstract Syntax Tree.
//! Includes both the statement parser (selectors, properties, control flow,
//! definitions) and the expression parser (property values, conditions,
//! arguments).
//!
//! ```
//! use stylconv_parser::{Node, Parser};
//!
//! let sheet = Parser::parse("body\n  color red").unwrap();
//! assert!(matches!(sheet.nodes[0], Node::Group(_)));
//! ```

pub mod ast;
pub mod expr_parser;
pub mod parser;
mod segments;

pub use ast::{Expression, Node, Stylesheet};
pub use parser::Parser;

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<stylconv_lexer::LexerError> for ParseError {
    fn from(e: stylconv_lexer::LexerError) -> Self {
        ParseError {
            message: e.message,
            line: e.line,
            column: e.column,
        }
    }
}
