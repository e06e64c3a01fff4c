//! Execute buildql queries against JSON card collections

use serde_json::Value;

use super::{CliError, FieldSchema, LookupContext};
use crate::{
    Interpreter, InterpreterContext, InterpreterOptions, ParserOptions, fuzzy, parse_with_options,
};

/// Options for the check command
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// The query to execute
    pub query: String,
    /// JSON input string: an array of cards or a single card
    pub input: Option<String>,
    /// Field schema JSON; inferred from the cards when absent
    pub fields: Option<String>,
    /// Also match the back of double-sided cards
    pub match_backs: bool,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
    pub max_depth: usize,
    pub fuzzy_distance: usize,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            query: String::new(),
            input: None,
            fields: None,
            match_backs: false,
            syntax_only: false,
            max_depth: ParserOptions::DEFAULT_MAX_DEPTH,
            fuzzy_distance: fuzzy::DEFAULT_TOKEN_DISTANCE,
        }
    }
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Query executed successfully; holds the matching cards
    Success(Value),
}

/// Execute a buildql check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let parser_options = ParserOptions::default().with_max_depth(options.max_depth);
    let expr = parse_with_options(&options.query, parser_options)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let cards = match serde_json::from_str::<Value>(json_str)? {
        Value::Array(items) => items,
        card @ Value::Object(_) => vec![card],
        _ => return Err(CliError::InvalidCards),
    };

    let schema = match &options.fields {
        Some(json) => FieldSchema::from_json(json)?,
        None => FieldSchema::infer(&cards),
    };

    let context = InterpreterContext::new(
        schema.registry(),
        LookupContext {
            match_backs: options.match_backs,
        },
    );
    let interpreter = Interpreter::with_options(
        context,
        InterpreterOptions {
            token_distance: options.fuzzy_distance,
            ..InterpreterOptions::default()
        },
    );

    let matched = interpreter.filter(&expr, &cards)?;
    Ok(CheckResult::Success(Value::Array(
        matched.into_iter().cloned().collect(),
    )))
}
