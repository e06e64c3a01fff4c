use std::fmt;

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::{ast::BinaryOperator, interpreter::InterpreterError};

/// A value read from a card field or produced by a query expression.
///
/// Missing values are [`FieldValue::Null`]. Arrays signal multi-valued
/// fields, for instance a card whose front and back carry different
/// values; comparisons against an array succeed if any element matches.
///
/// # Examples
///
/// ```
/// use buildql::FieldValue;
///
/// let cost = FieldValue::from(3);
/// let traits = FieldValue::from(vec!["Item.", "Tool."]);
/// let missing = FieldValue::from(None::<i64>);
///
/// assert!(cost.is_truthy());
/// assert!(traits.is_truthy());
/// assert!(!missing.is_truthy());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Absent or undefined value
    #[default]
    Null,

    Boolean(bool),

    /// All numbers are doubles
    Number(f64),

    String(String),

    /// Multi-valued field
    Array(Vec<FieldValue>),
}

impl FieldValue {
    /// Truthiness used when a value stands alone in boolean position.
    ///
    /// Zero, NaN, the empty string and null are falsy; every array,
    /// even an empty one, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Boolean(b) => *b,
            FieldValue::Number(n) => number_is_truthy(*n),
            FieldValue::String(s) => !s.is_empty(),
            FieldValue::Array(_) => true,
        }
    }

    /// Null and the empty string are interchangeable in card data.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Number(_) => "number",
            FieldValue::String(_) => "string",
            FieldValue::Array(_) => "array",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Coerces the value to a number.
    ///
    /// Strings are trimmed and lowercased first. The cost notations `-`,
    /// `x`, `*` and `?` map to null, -2, -3 and -4. Null maps to null.
    /// Booleans, arrays and non-numeric strings are errors.
    ///
    /// ```
    /// use buildql::FieldValue;
    ///
    /// assert_eq!(FieldValue::from("X").to_number().unwrap(), Some(-2.0));
    /// assert_eq!(FieldValue::from("-").to_number().unwrap(), None);
    /// assert_eq!(FieldValue::from(" 4 ").to_number().unwrap(), Some(4.0));
    /// assert!(FieldValue::from("four").to_number().is_err());
    /// ```
    pub fn to_number(&self) -> Result<Option<f64>, InterpreterError> {
        match self {
            FieldValue::Number(n) => Ok(Some(*n)),
            FieldValue::Null => Ok(None),
            FieldValue::String(s) => {
                let normalized = s.trim().to_lowercase();
                match normalized.as_str() {
                    "-" => Ok(None),
                    "x" => Ok(Some(-2.0)),
                    "*" => Ok(Some(-3.0)),
                    "?" => Ok(Some(-4.0)),
                    other => parse_number(other)
                        .map(Some)
                        .ok_or_else(|| InterpreterError::NotNumeric(s.clone())),
                }
            }
            other => Err(InterpreterError::InvalidNumericOperand(other.type_name())),
        }
    }
}

pub(crate) fn number_is_truthy(n: f64) -> bool {
    n != 0.0 && !n.is_nan()
}

/// Parses numeric text the way a loose string-to-number conversion does:
/// the empty string is zero, `0x`/`0o`/`0b` prefixes select a radix, and
/// decimal forms may carry a sign, a fraction and an exponent.
fn parse_number(text: &str) -> Option<f64> {
    if text.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = text.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    // Rejects the "inf" and "nan" spellings `f64::from_str` would accept.
    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e'))
    {
        return None;
    }

    text.parse::<f64>().ok()
}

/// Applies an arithmetic operator.
///
/// Uses decimal arithmetic when both operands fit, so `0.1 + 0.2` is
/// `0.3`, and falls back to doubles otherwise. Division and modulo by zero
/// are errors.
pub fn apply_arithmetic(op: BinaryOperator, a: f64, b: f64) -> Result<f64, InterpreterError> {
    match op {
        BinaryOperator::Divide if b == 0.0 => return Err(InterpreterError::DivisionByZero),
        BinaryOperator::Modulo if b == 0.0 => return Err(InterpreterError::ModuloByZero),
        _ => {}
    }

    if let Some(ad) = Decimal::from_f64(a)
        && let Some(bd) = Decimal::from_f64(b)
    {
        let rd = match op {
            BinaryOperator::Add => ad.checked_add(bd),
            BinaryOperator::Subtract => ad.checked_sub(bd),
            BinaryOperator::Multiply => ad.checked_mul(bd),
            BinaryOperator::Divide => ad.checked_div(bd),
            BinaryOperator::Modulo => ad.checked_rem(bd),
            other => return Err(InterpreterError::NotAValue(other.symbol())),
        };
        if let Some(r) = rd.and_then(|rd| rd.to_f64()) {
            return Ok(r);
        }
    }

    match op {
        BinaryOperator::Add => Ok(a + b),
        BinaryOperator::Subtract => Ok(a - b),
        BinaryOperator::Multiply => Ok(a * b),
        BinaryOperator::Divide => Ok(a / b),
        BinaryOperator::Modulo => Ok(a % b),
        other => Err(InterpreterError::NotAValue(other.symbol())),
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::String(s) => f.write_str(s),
            FieldValue::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(f64::from(n))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert_eq!(FieldValue::from("x").to_number().unwrap(), Some(-2.0));
        assert_eq!(FieldValue::from("X").to_number().unwrap(), Some(-2.0));
        assert_eq!(FieldValue::from("*").to_number().unwrap(), Some(-3.0));
        assert_eq!(FieldValue::from("?").to_number().unwrap(), Some(-4.0));
        assert_eq!(FieldValue::from(" - ").to_number().unwrap(), None);
        assert_eq!(FieldValue::Null.to_number().unwrap(), None);
    }

    #[test]
    fn test_parse_number_forms() {
        assert_eq!(parse_number(""), Some(0.0));
        assert_eq!(parse_number("12"), Some(12.0));
        assert_eq!(parse_number("-1.5"), Some(-1.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("0x10"), Some(16.0));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("nan"), None);
        assert_eq!(parse_number("12abc"), None);
    }

    #[test]
    fn test_non_numeric_operands() {
        assert_eq!(
            FieldValue::from(true).to_number(),
            Err(InterpreterError::InvalidNumericOperand("boolean"))
        );
        assert_eq!(
            FieldValue::from("abc").to_number(),
            Err(InterpreterError::NotNumeric("abc".to_string()))
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!FieldValue::Number(0.0).is_truthy());
        assert!(!FieldValue::Number(f64::NAN).is_truthy());
        assert!(FieldValue::Number(-1.0).is_truthy());
        assert!(!FieldValue::from("").is_truthy());
        assert!(FieldValue::Array(vec![]).is_truthy());
    }

    #[test]
    fn test_decimal_arithmetic() {
        assert_eq!(apply_arithmetic(BinaryOperator::Add, 0.1, 0.2).unwrap(), 0.3);
        assert_eq!(apply_arithmetic(BinaryOperator::Modulo, 7.0, 2.0).unwrap(), 1.0);
        assert_eq!(apply_arithmetic(BinaryOperator::Multiply, 1.5, 4.0).unwrap(), 6.0);
        assert_eq!(
            apply_arithmetic(BinaryOperator::Divide, 1.0, 0.0),
            Err(InterpreterError::DivisionByZero)
        );
        assert_eq!(
            apply_arithmetic(BinaryOperator::Modulo, 1.0, -0.0),
            Err(InterpreterError::ModuloByZero)
        );
    }
}
