use std::{cell::RefCell, collections::HashMap};

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    ast::{BinaryOperator, Expr, LiteralValue},
    fields::{FieldType, InterpreterContext},
    fuzzy::{DEFAULT_TOKEN_DISTANCE, fuzzy_match, normalize_diacritics, prepare_needle},
    value::{FieldValue, apply_arithmetic, number_is_truthy},
};

/// Errors that can occur while evaluating a query against a card.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpreterError {
    /// Identifier not present in the field registry
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Two fields of different declared types compared with each other
    #[error("Type mismatch: cannot compare {left} field with {right} field")]
    TypeMismatch { left: FieldType, right: FieldType },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Modulo by zero")]
    ModuloByZero,

    /// A list used where a boolean is expected
    #[error("Lists cannot be evaluated as boolean")]
    ListAsBoolean,

    /// A list used where a single value is expected
    #[error("Cannot get value from list")]
    ListAsValue,

    /// A non-arithmetic binary operation used where a value is expected
    #[error("Cannot get value from binary operator: {0}")]
    NotAValue(&'static str),

    /// Right-hand side of a membership operator is not a list
    #[error("Expected list expression")]
    ExpectedList,

    /// A string that is neither numeric nor a cost sentinel
    #[error("Cannot convert \"{0}\" to number")]
    NotNumeric(String),

    /// A boolean or array used as a number
    #[error("Cannot convert {0} to number")]
    InvalidNumericOperand(&'static str),

    /// A regex literal used outside equality or membership
    #[error("Regex literals can only be compared with a value")]
    RegexAsValue,

    #[error("Invalid regex /{pattern}/: {reason}")]
    InvalidRegex { pattern: String, reason: String },
}

/// Equality flavour: `==` is strict, `=` is loose (fuzzy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqualityMode {
    Strict,
    Loose,
}

/// Tuning knobs for an [`Interpreter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// Maximum gap between consecutive words of a fuzzy needle.
    pub token_distance: usize,
    /// The pattern cache is flushed once it holds more entries than this.
    pub cache_capacity: usize,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        InterpreterOptions {
            token_distance: DEFAULT_TOKEN_DISTANCE,
            cache_capacity: 1000,
        }
    }
}

/// Right-hand (or left-hand) side of an equality: a plain value or a
/// compiled regex literal.
#[derive(Debug, Clone)]
enum Operand {
    Value(FieldValue),
    Pattern(Regex),
}

#[derive(Default)]
struct PatternCache {
    /// Fuzzy needles keyed by normalized needle text
    needles: HashMap<String, Regex>,
    /// Regex literals keyed by their source
    literals: HashMap<String, Regex>,
}

/// Tree-walking evaluator for BuildQL expressions.
///
/// The interpreter owns the field registry and a pattern cache. The cache
/// uses interior mutability, so an interpreter is not `Sync`; give each
/// thread its own instance.
///
/// # Examples
///
/// ```
/// use buildql::{FieldDescriptor, FieldRegistry, FieldValue, Interpreter, InterpreterContext, parse};
///
/// struct Card {
///     xp: i64,
///     traits: &'static str,
/// }
///
/// let fields = FieldRegistry::new()
///     .with("xp", FieldDescriptor::number(|c: &Card, _: &()| FieldValue::from(c.xp)))
///     .with("trait", FieldDescriptor::text(|c: &Card, _: &()| FieldValue::from(c.traits)));
/// let interpreter = Interpreter::new(InterpreterContext::from(fields));
///
/// let query = parse(r#"xp > 3 & trait = "practiced""#).unwrap();
/// let predicate = interpreter.evaluate(&query);
///
/// assert!(predicate(&Card { xp: 5, traits: "Practiced." }).unwrap());
/// assert!(!predicate(&Card { xp: 2, traits: "Practiced." }).unwrap());
/// ```
pub struct Interpreter<C, L = ()> {
    context: InterpreterContext<C, L>,
    options: InterpreterOptions,
    cache: RefCell<PatternCache>,
}

impl<C, L> Interpreter<C, L> {
    pub fn new(context: InterpreterContext<C, L>) -> Self {
        Self::with_options(context, InterpreterOptions::default())
    }

    pub fn with_options(context: InterpreterContext<C, L>, options: InterpreterOptions) -> Self {
        Interpreter {
            context,
            options,
            cache: RefCell::new(PatternCache::default()),
        }
    }

    pub fn context(&self) -> &InterpreterContext<C, L> {
        &self.context
    }

    /// Compiles `expr` into a predicate over cards.
    pub fn evaluate<'a>(&'a self, expr: &'a Expr) -> impl Fn(&C) -> Result<bool, InterpreterError> + 'a {
        move |card: &C| self.evaluate_expr(expr, card)
    }

    /// Evaluates `expr` against a single card.
    pub fn matches(&self, expr: &Expr, card: &C) -> Result<bool, InterpreterError> {
        self.evaluate_expr(expr, card)
    }

    /// Keeps the cards matching `expr`, stopping at the first error.
    pub fn filter<'c>(&self, expr: &Expr, cards: &'c [C]) -> Result<Vec<&'c C>, InterpreterError> {
        let mut matched = Vec::new();
        for card in cards {
            if self.evaluate_expr(expr, card)? {
                matched.push(card);
            }
        }
        debug!(total = cards.len(), matched = matched.len(), "filtered cards");
        Ok(matched)
    }

    /// Number of compiled patterns currently cached.
    pub fn cached_patterns(&self) -> usize {
        let cache = self.cache.borrow();
        cache.needles.len() + cache.literals.len()
    }

    fn evaluate_expr(&self, expr: &Expr, card: &C) -> Result<bool, InterpreterError> {
        match expr {
            Expr::Binary {
                operator,
                left,
                right,
                ..
            } => self.evaluate_binary(*operator, left, right, card),
            Expr::Group { expression, .. } => self.evaluate_expr(expression, card),
            Expr::List { .. } => Err(InterpreterError::ListAsBoolean),
            Expr::Literal {
                value: LiteralValue::Regex(_),
                ..
            } => Ok(true),
            Expr::Literal { value, .. } => Ok(literal_value(value)?.is_truthy()),
            Expr::Identifier { name, .. } => Ok(self.lookup_field(name, card)?.is_truthy()),
        }
    }

    fn evaluate_binary(
        &self,
        operator: BinaryOperator,
        left: &Expr,
        right: &Expr,
        card: &C,
    ) -> Result<bool, InterpreterError> {
        let left_type = self.field_type(left)?;
        let right_type = self.field_type(right)?;

        if let (Some(l), Some(r)) = (left_type, right_type)
            && l != r
        {
            return Err(InterpreterError::TypeMismatch { left: l, right: r });
        }

        let field_type = left_type.or(right_type);

        match operator {
            BinaryOperator::And => {
                Ok(self.evaluate_expr(left, card)? && self.evaluate_expr(right, card)?)
            }
            BinaryOperator::Or => {
                Ok(self.evaluate_expr(left, card)? || self.evaluate_expr(right, card)?)
            }
            BinaryOperator::StrictEq
            | BinaryOperator::StrictNotEq
            | BinaryOperator::LooseEq
            | BinaryOperator::NotEq => {
                let (mode, negate) = match operator {
                    BinaryOperator::StrictEq => (EqualityMode::Strict, false),
                    BinaryOperator::StrictNotEq => (EqualityMode::Strict, true),
                    BinaryOperator::LooseEq => (EqualityMode::Loose, false),
                    _ => (EqualityMode::Loose, true),
                };
                let l = self.get_operand(left, card)?;
                let r = self.get_operand(right, card)?;
                Ok(self.operands_equal(&l, &r, mode, field_type) != negate)
            }
            BinaryOperator::StrictContains
            | BinaryOperator::StrictNotContains
            | BinaryOperator::LooseContains
            | BinaryOperator::LooseNotContains => {
                let (mode, negate) = match operator {
                    BinaryOperator::StrictContains => (EqualityMode::Strict, false),
                    BinaryOperator::StrictNotContains => (EqualityMode::Strict, true),
                    BinaryOperator::LooseContains => (EqualityMode::Loose, false),
                    _ => (EqualityMode::Loose, true),
                };
                let l = self.get_operand(left, card)?;
                let found = self
                    .get_list(right, card)?
                    .iter()
                    .any(|r| self.operands_equal(&l, r, mode, field_type));
                Ok(found != negate)
            }
            BinaryOperator::Gt | BinaryOperator::Lt | BinaryOperator::Gte | BinaryOperator::Lte => {
                let (Some(l), Some(r)) = self.numeric_operands(left, right, card)? else {
                    return Ok(false);
                };
                Ok(match operator {
                    BinaryOperator::Gt => l > r,
                    BinaryOperator::Lt => l < r,
                    BinaryOperator::Gte => l >= r,
                    _ => l <= r,
                })
            }
            // Arithmetic in boolean position: the result's truthiness.
            // `health - sanity` holds whenever the two differ.
            BinaryOperator::Add
            | BinaryOperator::Subtract
            | BinaryOperator::Multiply
            | BinaryOperator::Divide
            | BinaryOperator::Modulo => {
                let (Some(l), Some(r)) = self.numeric_operands(left, right, card)? else {
                    return Ok(false);
                };
                Ok(number_is_truthy(apply_arithmetic(operator, l, r)?))
            }
        }
    }

    fn numeric_operands(
        &self,
        left: &Expr,
        right: &Expr,
        card: &C,
    ) -> Result<(Option<f64>, Option<f64>), InterpreterError> {
        let l = self.get_value(left, card)?.to_number()?;
        let r = self.get_value(right, card)?.to_number()?;
        Ok((l, r))
    }

    fn get_value(&self, expr: &Expr, card: &C) -> Result<FieldValue, InterpreterError> {
        match expr {
            Expr::Literal { value, .. } => literal_value(value),
            Expr::Identifier { name, .. } => self.lookup_field(name, card),
            Expr::Group { expression, .. } => self.get_value(expression, card),
            Expr::Binary {
                operator,
                left,
                right,
                ..
            } if operator.is_arithmetic() => {
                let (Some(l), Some(r)) = self.numeric_operands(left, right, card)? else {
                    return Ok(FieldValue::Null);
                };
                apply_arithmetic(*operator, l, r).map(FieldValue::Number)
            }
            Expr::Binary { operator, .. } => Err(InterpreterError::NotAValue(operator.symbol())),
            Expr::List { .. } => Err(InterpreterError::ListAsValue),
        }
    }

    fn get_operand(&self, expr: &Expr, card: &C) -> Result<Operand, InterpreterError> {
        match expr {
            Expr::Literal {
                value: LiteralValue::Regex(pattern),
                ..
            } => self.compile_literal(pattern).map(Operand::Pattern),
            Expr::Group { expression, .. } => self.get_operand(expression, card),
            _ => self.get_value(expr, card).map(Operand::Value),
        }
    }

    fn get_list(&self, expr: &Expr, card: &C) -> Result<Vec<Operand>, InterpreterError> {
        let Expr::List { elements, .. } = expr else {
            return Err(InterpreterError::ExpectedList);
        };

        elements
            .iter()
            .map(|element| self.get_operand(element, card))
            .collect()
    }

    fn lookup_field(&self, name: &str, card: &C) -> Result<FieldValue, InterpreterError> {
        let descriptor = self
            .context
            .fields
            .get(name)
            .ok_or_else(|| InterpreterError::UnknownField(name.to_string()))?;

        Ok(descriptor.lookup(card, &self.context.field_lookup_context))
    }

    fn field_type(&self, expr: &Expr) -> Result<Option<FieldType>, InterpreterError> {
        match expr {
            Expr::Identifier { name, .. } => self
                .context
                .fields
                .field_type(name)
                .map(Some)
                .ok_or_else(|| InterpreterError::UnknownField(name.clone())),
            _ => Ok(None),
        }
    }

    fn operands_equal(
        &self,
        left: &Operand,
        right: &Operand,
        mode: EqualityMode,
        field_type: Option<FieldType>,
    ) -> bool {
        match (left, right) {
            (Operand::Value(l), Operand::Value(r)) => self.equals(l, r, mode, field_type),
            (Operand::Pattern(re), Operand::Value(v)) | (Operand::Value(v), Operand::Pattern(re)) => {
                pattern_matches(re, v)
            }
            (Operand::Pattern(_), Operand::Pattern(_)) => false,
        }
    }

    /// Compares two values.
    ///
    /// Arrays match if any element matches. A number compared with a
    /// string compares numerically when the string coerces. Null and the
    /// empty string are equal to each other and to any falsy value. Strings
    /// are compared lowercased and trimmed: loosely by fuzzy match of the
    /// shorter side within the longer, strictly by exact match, or by
    /// substring for `text` fields.
    pub fn equals(
        &self,
        left: &FieldValue,
        right: &FieldValue,
        mode: EqualityMode,
        field_type: Option<FieldType>,
    ) -> bool {
        if let FieldValue::Array(items) = left {
            return items
                .iter()
                .any(|item| self.equals(item, right, mode, field_type));
        }
        if let FieldValue::Array(items) = right {
            return items
                .iter()
                .any(|item| self.equals(left, item, mode, field_type));
        }

        if let Some(result) = numeric_text_equals(left, right).or_else(|| numeric_text_equals(right, left)) {
            return result;
        }

        if left.is_blank() || right.is_blank() {
            return !left.is_truthy() && !right.is_truthy();
        }

        match (left, right) {
            (FieldValue::Boolean(_), _) | (_, FieldValue::Boolean(_)) => {
                left.is_truthy() == right.is_truthy()
            }
            (FieldValue::Number(a), FieldValue::Number(b)) => a == b,
            (FieldValue::String(a), FieldValue::String(b)) => {
                self.strings_equal(a, b, mode, field_type)
            }
            _ => false,
        }
    }

    fn strings_equal(
        &self,
        left: &str,
        right: &str,
        mode: EqualityMode,
        field_type: Option<FieldType>,
    ) -> bool {
        let left = normalize_string(left);
        let right = normalize_string(right);

        if left.is_empty() || right.is_empty() {
            return left == right;
        }

        // The shorter side is the needle.
        let needle_right = right.chars().count() < left.chars().count();
        let (needle, haystack) = if needle_right {
            (&right, &left)
        } else {
            (&left, &right)
        };

        match mode {
            EqualityMode::Loose => self
                .cached_needle(needle)
                .is_some_and(|re| fuzzy_match(&[haystack], &re)),
            EqualityMode::Strict if field_type == Some(FieldType::Text) => {
                normalize_diacritics(haystack).contains(&normalize_diacritics(needle))
            }
            EqualityMode::Strict => left == right,
        }
    }

    fn cached_needle(&self, needle: &str) -> Option<Regex> {
        let mut cache = self.cache.borrow_mut();
        if let Some(re) = cache.needles.get(needle) {
            return Some(re.clone());
        }

        let re = prepare_needle(needle, self.options.token_distance)?;
        if cache.needles.len() > self.options.cache_capacity {
            debug!(entries = cache.needles.len(), "flushing fuzzy needle cache");
            cache.needles.clear();
        }
        cache.needles.insert(needle.to_string(), re.clone());
        Some(re)
    }

    fn compile_literal(&self, pattern: &str) -> Result<Regex, InterpreterError> {
        let mut cache = self.cache.borrow_mut();
        if let Some(re) = cache.literals.get(pattern) {
            return Ok(re.clone());
        }

        let re = RegexBuilder::new(&unescape_slashes(pattern))
            .case_insensitive(true)
            .unicode(true)
            .build()
            .map_err(|e| {
                warn!(pattern, error = %e, "invalid regex literal");
                InterpreterError::InvalidRegex {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                }
            })?;

        if cache.literals.len() > self.options.cache_capacity {
            debug!(entries = cache.literals.len(), "flushing regex literal cache");
            cache.literals.clear();
        }
        cache.literals.insert(pattern.to_string(), re.clone());
        Ok(re)
    }
}

fn literal_value(value: &LiteralValue) -> Result<FieldValue, InterpreterError> {
    match value {
        LiteralValue::Null => Ok(FieldValue::Null),
        LiteralValue::Boolean(b) => Ok(FieldValue::Boolean(*b)),
        LiteralValue::Number(n) => Ok(FieldValue::Number(*n)),
        LiteralValue::String(s) => Ok(FieldValue::String(s.clone())),
        LiteralValue::Regex(_) => Err(InterpreterError::RegexAsValue),
    }
}

/// `value` is a number or boolean, `text` a string: compare numerically if
/// `text` coerces. `None` means the coercion failed and the caller should
/// keep comparing.
fn numeric_text_equals(value: &FieldValue, text: &FieldValue) -> Option<bool> {
    if !matches!(value, FieldValue::Number(_) | FieldValue::Boolean(_)) {
        return None;
    }
    if !matches!(text, FieldValue::String(_)) {
        return None;
    }

    let coerced = text.to_number().ok()?;
    Some(matches!((value, coerced), (FieldValue::Number(a), Some(b)) if *a == b))
}

fn pattern_matches(re: &Regex, value: &FieldValue) -> bool {
    match value {
        FieldValue::Null => false,
        FieldValue::String(s) => re.is_match(s),
        FieldValue::Array(items) => items.iter().any(|item| pattern_matches(re, item)),
        other => re.is_match(&other.to_string()),
    }
}

fn normalize_string(s: &str) -> String {
    s.to_lowercase().trim().to_string()
}

/// `\/` only delimits the literal; the regex engine sees a plain `/`.
fn unescape_slashes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('/') => out.push('/'),
            Some(escaped) => {
                out.push('\\');
                out.push(escaped);
            }
            None => out.push('\\'),
        }
    }
    out
}
