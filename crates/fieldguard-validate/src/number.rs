//! # Numbers and Ranges
//!
//! [`Number`] wraps every numeric category behind one order-comparable type so
//! that `range`, `min`, `max` and `digits` need a single implementation.
//! Integers compare exactly. A single-precision value compares in `f32`, so
//! `0.1` declared as a bound equals a `float` field holding `0.1`; every other
//! comparison involving a float goes through `f64`. NaN is unordered and
//! therefore never inside a bound.
//!
//! [`NumberRange`] parses interval tokens:
//!
//! | Token     | Kind         |
//! |-----------|--------------|
//! | `[a, b]`  | closed       |
//! | `(a, b)`  | open         |
//! | `(a, b]`  | open-closed  |
//! | `[a, b)`  | closed-open  |
//!
//! Bounds are separated by `,` or `..`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use fieldguard_core::Value;
use thiserror::Error;

/// A numeric field value or bound.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// Any integer kind.
    Int(i64),
    /// Double-precision value or bound.
    Float(f64),
    /// Single-precision field value.
    Float32(f32),
}

impl Number {
    /// Parses a numeric literal. Integers stay exact; NaN is rejected.
    pub fn parse(literal: &str) -> Option<Self> {
        let literal = literal.trim();
        if let Ok(i) = literal.parse::<i64>() {
            return Some(Self::Int(i));
        }
        literal
            .parse::<f64>()
            .ok()
            .filter(|f| !f.is_nan())
            .map(Self::Float)
    }

    /// The number held by a numeric value.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int32(v) => Some(Self::Int((*v).into())),
            Value::Int64(v) => Some(Self::Int(*v)),
            Value::Float(v) => Some(Self::Float32(*v)),
            Value::Double(v) => Some(Self::Float(*v)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
            Self::Float32(f) => f.into(),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float32(a), b) => a.partial_cmp(&(b.as_f64() as f32)),
            (a, Self::Float32(b)) => (a.as_f64() as f32).partial_cmp(b),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
        }
    }
}

/// Which ends of a [`NumberRange`] are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeType {
    /// `[a, b]`
    Closed,
    /// `(a, b)`
    Open,
    /// `(a, b]`
    OpenClosed,
    /// `[a, b)`
    ClosedOpen,
}

impl RangeType {
    /// The range type of a bracket pair, if it is one of the four valid pairs.
    pub fn from_brackets(open: char, close: char) -> Option<Self> {
        match (open, close) {
            ('[', ']') => Some(Self::Closed),
            ('(', ')') => Some(Self::Open),
            ('(', ']') => Some(Self::OpenClosed),
            ('[', ')') => Some(Self::ClosedOpen),
            _ => None,
        }
    }

    /// True when the lower bound itself is in range.
    pub fn includes_lower(self) -> bool {
        matches!(self, Self::Closed | Self::ClosedOpen)
    }

    /// True when the upper bound itself is in range.
    pub fn includes_upper(self) -> bool {
        matches!(self, Self::Closed | Self::OpenClosed)
    }

    fn brackets(self) -> (char, char) {
        match self {
            Self::Closed => ('[', ']'),
            Self::Open => ('(', ')'),
            Self::OpenClosed => ('(', ']'),
            Self::ClosedOpen => ('[', ')'),
        }
    }
}

/// Error parsing a range token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeSyntaxError {
    /// The token is empty or blank.
    #[error("range must not be blank")]
    Blank,

    /// The token is not wrapped in one of `[]`, `()`, `(]`, `[)`.
    #[error("range `{0}` must be enclosed in `[]`, `()`, `(]` or `[)`")]
    Brackets(String),

    /// The bounds are not separated by `,` or `..`.
    #[error("range `{0}` must separate its bounds with `,` or `..`")]
    MissingSeparator(String),

    /// A bound is not a number.
    #[error("range `{token}` has a non-numeric bound `{bound}`")]
    Bound {
        /// The whole token.
        token: String,
        /// The offending bound.
        bound: String,
    },

    /// The lower bound is greater than the upper bound.
    #[error("range `{0}` has a lower bound greater than its upper bound")]
    Inverted(String),
}

/// A numeric interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberRange {
    lower: Number,
    upper: Number,
    range_type: RangeType,
}

impl NumberRange {
    /// Parses an interval token such as `[0, 23]` or `(0..1]`.
    pub fn parse(token: &str) -> Result<Self, RangeSyntaxError> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(RangeSyntaxError::Blank);
        }
        let mut chars = trimmed.chars();
        let (open, close) = match (chars.next(), chars.next_back()) {
            (Some(open), Some(close)) => (open, close),
            _ => return Err(RangeSyntaxError::Brackets(trimmed.to_string())),
        };
        let range_type = RangeType::from_brackets(open, close)
            .ok_or_else(|| RangeSyntaxError::Brackets(trimmed.to_string()))?;
        let inner = chars.as_str();

        let (lower, upper) = inner
            .split_once("..")
            .or_else(|| inner.split_once(','))
            .ok_or_else(|| RangeSyntaxError::MissingSeparator(trimmed.to_string()))?;
        let bound = |text: &str| {
            Number::parse(text).ok_or_else(|| RangeSyntaxError::Bound {
                token: trimmed.to_string(),
                bound: text.trim().to_string(),
            })
        };
        let lower = bound(lower)?;
        let upper = bound(upper)?;
        if lower > upper {
            return Err(RangeSyntaxError::Inverted(trimmed.to_string()));
        }
        Ok(Self {
            lower,
            upper,
            range_type,
        })
    }

    /// Lower bound.
    pub fn lower(&self) -> Number {
        self.lower
    }

    /// Upper bound.
    pub fn upper(&self) -> Number {
        self.upper
    }

    /// Which ends are included.
    pub fn range_type(&self) -> RangeType {
        self.range_type
    }

    /// True when `n` lies inside the interval.
    pub fn contains(&self, n: Number) -> bool {
        let above = match self.lower.partial_cmp(&n) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => self.range_type.includes_lower(),
            _ => false,
        };
        let below = match n.partial_cmp(&self.upper) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => self.range_type.includes_upper(),
            _ => false,
        };
        above && below
    }
}

impl FromStr for NumberRange {
    type Err = RangeSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NumberRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = self.range_type.brackets();
        write!(f, "{open}{}, {}{close}", self.lower, self.upper)
    }
}
