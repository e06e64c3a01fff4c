use std::fmt;

use crate::ast::TokenKind;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Equality
    /// Strict equal (`==`)
    StrictEq,
    /// Loose (fuzzy) equal (`=`)
    LooseEq,
    /// Loose not equal (`!=`)
    NotEq,
    /// Strict not equal (`!==`)
    StrictNotEq,

    // Membership
    /// Strict membership (`??`)
    StrictContains,
    /// Negated strict membership (`!??`)
    StrictNotContains,
    /// Loose membership (`?`)
    LooseContains,
    /// Negated loose membership (`!?`)
    LooseNotContains,

    // Relational
    /// Greater than (`>`)
    Gt,
    /// Less than (`<`)
    Lt,
    /// Greater than or equal (`>=`)
    Gte,
    /// Less than or equal (`<=`)
    Lte,

    // Logical
    /// Logical AND (`&`)
    And,
    /// Logical OR (`|`)
    Or,

    // Arithmetic
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Modulo (`%`)
    Modulo,
}

impl BinaryOperator {
    /// Source spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::StrictEq => "==",
            BinaryOperator::LooseEq => "=",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::StrictNotEq => "!==",
            BinaryOperator::StrictContains => "??",
            BinaryOperator::StrictNotContains => "!??",
            BinaryOperator::LooseContains => "?",
            BinaryOperator::LooseNotContains => "!?",
            BinaryOperator::Gt => ">",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gte => ">=",
            BinaryOperator::Lte => "<=",
            BinaryOperator::And => "&",
            BinaryOperator::Or => "|",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
        }
    }

    /// Operator accepted at the comparison level of the grammar.
    pub fn comparison(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::StrictEq => BinaryOperator::StrictEq,
            TokenKind::LooseEq => BinaryOperator::LooseEq,
            TokenKind::NotEq => BinaryOperator::NotEq,
            TokenKind::StrictNotEq => BinaryOperator::StrictNotEq,
            TokenKind::Gt => BinaryOperator::Gt,
            TokenKind::Lt => BinaryOperator::Lt,
            TokenKind::Gte => BinaryOperator::Gte,
            TokenKind::Lte => BinaryOperator::Lte,
            TokenKind::StrictContains => BinaryOperator::StrictContains,
            TokenKind::StrictNotContains => BinaryOperator::StrictNotContains,
            TokenKind::LooseContains => BinaryOperator::LooseContains,
            TokenKind::LooseNotContains => BinaryOperator::LooseNotContains,
            _ => return None,
        })
    }

    /// Operator accepted at the additive level of the grammar.
    pub fn additive(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(BinaryOperator::Add),
            TokenKind::Minus => Some(BinaryOperator::Subtract),
            _ => None,
        }
    }

    /// Operator accepted at the multiplicative level of the grammar.
    pub fn multiplicative(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Multiply => Some(BinaryOperator::Multiply),
            TokenKind::Divide => Some(BinaryOperator::Divide),
            TokenKind::Modulo => Some(BinaryOperator::Modulo),
            _ => None,
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::Modulo
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }

    pub fn is_membership(self) -> bool {
        matches!(
            self,
            BinaryOperator::StrictContains
                | BinaryOperator::StrictNotContains
                | BinaryOperator::LooseContains
                | BinaryOperator::LooseNotContains
        )
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
