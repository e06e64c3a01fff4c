use crate::ast::{BinaryOperator, Span};

/// A literal as it appears in the source, before any coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// `null`, also the value of operator and delimiter tokens
    Null,

    /// `true` / `false`
    Boolean(bool),

    /// Integer literal, stored as a double so `-0` survives
    Number(f64),

    /// Unescaped string literal
    String(String),

    /// Regex source between the slashes, escapes kept verbatim
    Regex(String),
}

impl LiteralValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::String(s) | LiteralValue::Regex(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            LiteralValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Abstract Syntax Tree node of a query.
///
/// Every node carries the span of source it was parsed from. Composite
/// nodes span from their first to their last token: a `Binary` covers both
/// operands, `Group` and `List` include their delimiters.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    ///
    /// # Examples
    /// ```text
    /// 42
    /// "Tactic."
    /// null
    /// /^the/
    /// ```
    Literal { value: LiteralValue, span: Span },

    /// Field reference, always lowercase
    ///
    /// # Example
    /// ```text
    /// xp
    /// ```
    Identifier { name: String, span: Span },

    /// Binary operation (comparison, membership, logical, arithmetic)
    ///
    /// # Examples
    /// ```text
    /// xp > 3
    /// health + sanity
    /// ```
    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },

    /// Parenthesized expression
    ///
    /// # Example
    /// ```text
    /// (xp = 0 | xp = 2)
    /// ```
    Group { expression: Box<Expr>, span: Span },

    /// Bracketed list, the right-hand side of membership operators
    ///
    /// # Example
    /// ```text
    /// ["Tactic.", "Supply."]
    /// ```
    List { elements: Vec<Expr>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. }
            | Expr::Identifier { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Group { span, .. }
            | Expr::List { span, .. } => *span,
        }
    }

    /// Builds a binary node spanning both operands.
    pub fn binary(operator: BinaryOperator, left: Expr, right: Expr) -> Expr {
        let span = left.span().to(right.span());
        Expr::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            span,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Expr::Binary { .. })
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Expr::Group { .. })
    }

    /// Short name of the node kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Literal { .. } => "literal",
            Expr::Identifier { .. } => "identifier",
            Expr::Binary { .. } => "binary",
            Expr::Group { .. } => "group",
            Expr::List { .. } => "list",
        }
    }

    /// Structural equality that ignores spans.
    pub fn same_shape(&self, other: &Expr) -> bool {
        match (self, other) {
            (Expr::Literal { value: a, .. }, Expr::Literal { value: b, .. }) => a == b,
            (Expr::Identifier { name: a, .. }, Expr::Identifier { name: b, .. }) => a == b,
            (
                Expr::Binary {
                    operator: op_a,
                    left: la,
                    right: ra,
                    ..
                },
                Expr::Binary {
                    operator: op_b,
                    left: lb,
                    right: rb,
                    ..
                },
            ) => op_a == op_b && la.same_shape(lb) && ra.same_shape(rb),
            (Expr::Group { expression: a, .. }, Expr::Group { expression: b, .. }) => {
                a.same_shape(b)
            }
            (Expr::List { elements: a, .. }, Expr::List { elements: b, .. }) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
            }
            _ => false,
        }
    }
}
