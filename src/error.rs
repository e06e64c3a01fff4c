use thiserror::Error;

use crate::{ast::Position, interpreter::InterpreterError, lexer::LexError, parser::ParseError};

/// Any failure while compiling or running a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Lexer error: {0}")]
    Lex(#[from] LexError),

    #[error("Parser error: {0}")]
    Parse(#[from] ParseError),

    #[error("Interpreter error: {0}")]
    Interpreter(#[from] InterpreterError),
}

impl QueryError {
    /// Source position of the failure, when it happened before evaluation.
    pub fn position(&self) -> Option<Position> {
        match self {
            QueryError::Lex(e) => Some(e.position),
            QueryError::Parse(e) => Some(e.position),
            QueryError::Interpreter(_) => None,
        }
    }

    /// The underlying message without position or stage prefix.
    pub fn message(&self) -> String {
        match self {
            QueryError::Lex(e) => e.message.clone(),
            QueryError::Parse(e) => e.message.clone(),
            QueryError::Interpreter(e) => e.to_string(),
        }
    }
}
