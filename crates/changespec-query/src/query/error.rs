//! Error types for the query tokenizer and parser.

use thiserror::Error;

/// A specialized Result type for query parsing operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// A malformed lexeme encountered while tokenizing a query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} at position {position}")]
pub struct TokenizerError {
    /// Human-readable description of the problem.
    pub message: String,
    /// Byte offset into the query where the problem was found.
    pub position: usize,
}

impl TokenizerError {
    /// Creates a tokenizer error at the given byte offset.
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// A structurally invalid token sequence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} at position {position}")]
pub struct ParseError {
    /// Human-readable description of the problem.
    pub message: String,
    /// Byte offset of the offending token.
    pub position: usize,
}

impl ParseError {
    /// Creates a parse error at the given byte offset.
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Errors that can occur while turning query text into an AST.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The query text could not be tokenized.
    #[error("tokenize error: {0}")]
    Tokenize(#[from] TokenizerError),

    /// The token stream could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl QueryError {
    /// Returns the byte offset the error points at.
    pub fn position(&self) -> usize {
        match self {
            QueryError::Tokenize(e) => e.position,
            QueryError::Parse(e) => e.position,
        }
    }

    /// Returns the error message without the position.
    pub fn message(&self) -> &str {
        match self {
            QueryError::Tokenize(e) => &e.message,
            QueryError::Parse(e) => &e.message,
        }
    }

    /// Renders the query with a caret under the offending character.
    ///
    /// ```text
    /// status:foo AND @@
    ///                ^
    /// ```
    pub fn render_caret(&self, query: &str) -> String {
        let position = self.position().min(query.len());
        // Column in characters, not bytes, so multi-byte input lines up.
        let column = query
            .char_indices()
            .take_while(|(idx, _)| *idx < position)
            .count();
        format!("{query}\n{}^", " ".repeat(column))
    }
}
