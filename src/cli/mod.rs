//! CLI support for buildql
//!
//! Provides programmatic access to the `buildql` commands: filtering JSON
//! card collections, inspecting tokens and syntax trees, and the built-in
//! language reference.

mod check;
mod convert;
mod docs;
mod inspect;
mod registry;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use convert::{infer_field_type, json_to_field_value};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use inspect::{dump_tokens, render_expression};
pub use registry::{FieldSchema, FieldSpec, LookupContext};

use std::io;

use thiserror::Error;

use crate::{InterpreterError, QueryError};

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Query failed to lex or parse
    #[error("{0}")]
    Query(#[from] QueryError),

    /// Query failed against a card
    #[error("Evaluation error: {0}")]
    Eval(#[from] InterpreterError),

    /// JSON parsing error
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No input provided
    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    /// Input is neither an array of cards nor a single card
    #[error("Input must be a JSON array of card objects or a single card object")]
    InvalidCards,

    /// Unknown documentation category
    #[error("Unknown category: '{0}'\nRun 'buildql docs' to see available categories.")]
    UnknownCategory(String),
}
