//! Rendering of parsed queries.
//!
//! Two formats are available:
//!
//! - **Query text** via [`to_query()`] - canonical source that parses back
//!   to the same tree. Whitespace is normalized, strings are re-quoted with
//!   double quotes, and groups keep their parentheses.
//! - **Tree** via [`to_tree()`] - one node per line, indented by two spaces,
//!   for inspecting precedence.
//!
//! # Examples
//!
//! ```
//! use buildql::parse;
//! use buildql::output::{to_query, to_tree};
//!
//! let expr = parse("XP>3&trait='practiced'").unwrap();
//!
//! assert_eq!(to_query(&expr), r#"xp > 3 & trait = "practiced""#);
//! assert_eq!(
//!     to_tree(&expr),
//!     "Binary &\n  Binary >\n    Identifier xp\n    Literal 3\n  Binary =\n    Identifier trait\n    Literal \"practiced\"",
//! );
//! ```

use std::fmt;

use crate::ast::{Expr, LiteralValue};

pub struct ExprPrinter {
    pretty: bool,
}

impl ExprPrinter {
    pub fn new(pretty: bool) -> Self {
        ExprPrinter { pretty }
    }

    pub fn print(&self, expr: &Expr) -> String {
        if self.pretty {
            let mut lines = Vec::new();
            self.print_tree(expr, 0, &mut lines);
            lines.join("\n")
        } else {
            self.print_query(expr)
        }
    }

    fn print_query(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal { value, .. } => self.print_literal(value),
            Expr::Identifier { name, .. } => name.clone(),
            Expr::Binary {
                operator,
                left,
                right,
                ..
            } => format!(
                "{} {} {}",
                self.print_query(left),
                operator,
                self.print_query(right)
            ),
            Expr::Group { expression, .. } => format!("({})", self.print_query(expression)),
            Expr::List { elements, .. } => {
                let items: Vec<String> = elements.iter().map(|e| self.print_query(e)).collect();
                format!("[{}]", items.join(", "))
            }
        }
    }

    fn print_tree(&self, expr: &Expr, indent: usize, lines: &mut Vec<String>) {
        let pad = self.indent(indent);
        match expr {
            Expr::Literal { value, .. } => {
                lines.push(format!("{}Literal {}", pad, self.print_literal(value)));
            }
            Expr::Identifier { name, .. } => {
                lines.push(format!("{}Identifier {}", pad, name));
            }
            Expr::Binary {
                operator,
                left,
                right,
                ..
            } => {
                lines.push(format!("{}Binary {}", pad, operator));
                self.print_tree(left, indent + 1, lines);
                self.print_tree(right, indent + 1, lines);
            }
            Expr::Group { expression, .. } => {
                lines.push(format!("{}Group", pad));
                self.print_tree(expression, indent + 1, lines);
            }
            Expr::List { elements, .. } => {
                lines.push(format!("{}List", pad));
                for element in elements {
                    self.print_tree(element, indent + 1, lines);
                }
            }
        }
    }

    fn print_literal(&self, value: &LiteralValue) -> String {
        match value {
            LiteralValue::Null => "null".to_string(),
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::Number(n) => n.to_string(),
            LiteralValue::String(s) => format!("\"{}\"", self.escape_string(s)),
            LiteralValue::Regex(pattern) => format!("/{}/", pattern),
        }
    }

    fn escape_string(&self, s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        for ch in s.chars() {
            match ch {
                '"' => result.push_str("\\\""),
                '\\' => result.push_str("\\\\"),
                '\n' => result.push_str("\\n"),
                '\r' => result.push_str("\\r"),
                '\t' => result.push_str("\\t"),
                c => result.push(c),
            }
        }
        result
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }
}

/// Renders `expr` as canonical query text.
pub fn to_query(expr: &Expr) -> String {
    ExprPrinter::new(false).print(expr)
}

/// Renders `expr` as an indented tree.
pub fn to_tree(expr: &Expr) -> String {
    ExprPrinter::new(true).print(expr)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_query(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_unchecked;

    #[test]
    fn test_escapes_round_trip() {
        let expr = parse_unchecked(r#"name = 'say "hi"\n'"#).unwrap();
        let printed = to_query(&expr);
        assert_eq!(printed, r#"name = "say \"hi\"\n""#);
        assert!(parse_unchecked(&printed).unwrap().same_shape(&expr));
    }

    #[test]
    fn test_negative_zero_kept() {
        let expr = parse_unchecked("-0").unwrap();
        assert_eq!(to_query(&expr), "-0");
    }
}
