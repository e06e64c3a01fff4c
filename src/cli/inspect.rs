//! Token and syntax tree dumps for debugging queries

use super::CliError;
use crate::{LiteralValue, ParserOptions, QueryError, output::ExprPrinter, parse_with_options, tokenize};

/// One line per token: kind, lexeme, literal value and position.
pub fn dump_tokens(query: &str) -> Result<Vec<String>, CliError> {
    let tokens = tokenize(query).map_err(QueryError::from)?;

    Ok(tokens
        .iter()
        .map(|token| {
            let value = match &token.value {
                LiteralValue::Null => String::new(),
                LiteralValue::Boolean(b) => b.to_string(),
                LiteralValue::Number(n) => n.to_string(),
                LiteralValue::String(s) => format!("{:?}", s),
                LiteralValue::Regex(pattern) => format!("/{}/", pattern),
            };
            format!(
                "{:<20} {:<16} {:<16} {}",
                token.kind.name(),
                token.lexeme,
                value,
                token.span.start
            )
            .trim_end()
            .to_string()
        })
        .collect())
}

/// Parses `query` and renders it as canonical text, or as a tree when
/// `pretty` is set.
pub fn render_expression(query: &str, pretty: bool, max_depth: usize) -> Result<String, CliError> {
    let expr = parse_with_options(query, ParserOptions::default().with_max_depth(max_depth))?;
    Ok(ExprPrinter::new(pretty).print(&expr))
}
