//! Stylus Lexer
//!
//! Tokenizes `.styl` source files into a stream of tokens.
//! Handles indentation-based structure, identifiers with CSS hyphens,
//! numbers with units, hash words, at-keywords, strings and operators.
//!
//! # Example
//!
//! ```
//! use stylconv_lexer::Scanner;
//!
//! let tokens = Scanner::tokenize("").unwrap();
//! assert_eq!(tokens.len(), 1); // Just EOF
//! ```

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Span, Token, TokenKind};

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Lexer error at line {line}, column {column}: {message}")]
pub struct LexerError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}
