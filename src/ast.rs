//! # BuildQL - Abstract Syntax Tree
//!
//! This module defines the tokens and syntax tree of BuildQL, the filter
//! language used to select card records by their fields.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens, positions and spans produced by the lexer
//! - **[expressions]** - Expression nodes and literal values
//! - **[operators]** - Binary operators (equality, membership, relational, logical, arithmetic)
//!
//! ## Quick Start
//!
//! ```text
//! xp > 3 & trait = "practiced"
//! ```
//!
//! Keeps cards with more than 3 experience whose traits fuzzily match "practiced".
//!
//! ## Operators
//!
//! From loosest to tightest binding:
//!
//! | Level          | Operators                                        |
//! |----------------|--------------------------------------------------|
//! | or             | `\|`                                             |
//! | and            | `&`                                              |
//! | comparison     | `== = != !== > < >= <= ?? !?? ? !?` (at most one) |
//! | additive       | `+ -`                                            |
//! | multiplicative | `* / %`                                          |
//!
//! All binary levels are left-associative. Comparisons do not chain:
//! `a = b = c` is rejected.
//!
//! ### Strict and loose equality
//!
//! - `==` / `!==` compare exactly; text fields match on substring.
//! - `=` / `!=` compare fuzzily: the shorter side's words must appear in
//!   order in the longer side, at most 20 characters apart.
//!
//! ### Membership
//!
//! ```text
//! trait ?? ["Tactic.", "Supply."]   // strict
//! name ? [/^the/, "lantern"]        // loose, with a regex
//! ```
//!
//! ### Cost sentinels
//!
//! Numeric fields may hold the strings `-`, `X`, `*` and `?`; these coerce
//! to null, -2, -3 and -4 respectively.

pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{Expr, LiteralValue};
pub use operators::BinaryOperator;
pub use tokens::{Position, Span, Token, TokenKind};
