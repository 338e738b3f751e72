//! Numeric field values.
//!
//! Amounts in SimaPro CSV are either decimal literals or formulas that refer to
//! parameters. Formulas cannot be evaluated without the parameter tables, so
//! they are kept verbatim.
//!
//! ## Examples
//!
//! ```rust
//! use simapro_csv::Numeric;
//!
//! let literal = Numeric::parse("2,50", ',');
//! assert_eq!(literal.value(), Some(2.5));
//! // the source text is kept for exact round-trips
//! assert_eq!(literal.render(','), "2,50");
//!
//! let formula = Numeric::parse("2*density", ',');
//! assert!(formula.is_formula());
//! assert_eq!(formula.render(','), "2*density");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal decimal value or an unevaluated formula.
///
/// Two literals compare equal when their values are equal; the retained source
/// text does not take part in the comparison.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Numeric {
    Literal {
        value: f64,
        /// The text the literal was read from, if any.
        text: Option<String>,
    },
    Formula(String),
}

impl Default for Numeric {
    fn default() -> Self {
        Numeric::of(0.0)
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Numeric::Literal { value: a, .. }, Numeric::Literal { value: b, .. }) => a == b,
            (Numeric::Formula(a), Numeric::Formula(b)) => a == b,
            _ => false,
        }
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::of(value)
    }
}

impl Numeric {
    /// Creates a computed literal without source text.
    #[must_use]
    pub const fn of(value: f64) -> Self {
        Numeric::Literal { value, text: None }
    }

    /// Creates a formula value.
    #[must_use]
    pub fn formula(expression: impl Into<String>) -> Self {
        Numeric::Formula(expression.into())
    }

    /// Decodes a field: a strict decimal parse with `decimal_separator`, falling
    /// back to a formula when the text is not a plain number.
    ///
    /// An empty field decodes as the literal `0` that renders back as empty.
    #[must_use]
    pub fn parse(text: &str, decimal_separator: char) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Numeric::Literal {
                value: 0.0,
                text: Some(String::new()),
            };
        }
        match parse_decimal(text, decimal_separator) {
            Some(value) => Numeric::Literal {
                value,
                text: Some(text.to_string()),
            },
            None => Numeric::Formula(text.to_string()),
        }
    }

    /// Returns the literal value, or `None` for a formula.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Numeric::Literal { value, .. } => Some(*value),
            Numeric::Formula(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_formula(&self) -> bool {
        matches!(self, Numeric::Formula(_))
    }

    /// Returns the formula text, or `None` for a literal.
    #[must_use]
    pub fn as_formula(&self) -> Option<&str> {
        match self {
            Numeric::Formula(f) => Some(f),
            Numeric::Literal { .. } => None,
        }
    }

    /// Encodes the value for a dialect with the given decimal separator.
    ///
    /// Formulas and compatible source text are emitted verbatim. Computed
    /// literals, and source text written with a different decimal separator,
    /// are rendered from the value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use simapro_csv::Numeric;
    ///
    /// assert_eq!(Numeric::of(0.25).render(','), "0,25");
    /// assert_eq!(Numeric::of(3.0).render('.'), "3");
    /// // "1,5" read with a comma separator is re-rendered for a point dialect
    /// assert_eq!(Numeric::parse("1,5", ',').render('.'), "1.5");
    /// ```
    #[must_use]
    pub fn render(&self, decimal_separator: char) -> String {
        match self {
            Numeric::Formula(f) => f.clone(),
            Numeric::Literal {
                text: Some(text), ..
            } if text_fits(text, decimal_separator) => text.clone(),
            Numeric::Literal { value, .. } => render_decimal(*value, decimal_separator),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render('.'))
    }
}

/// Strict decimal parse: digits, sign, exponent and the decimal separator only.
///
/// # Examples
///
/// ```rust
/// use simapro_csv::numeric::parse_decimal;
///
/// assert_eq!(parse_decimal("1,5E-3", ','), Some(0.0015));
/// assert_eq!(parse_decimal("1.5", ','), None);
/// assert_eq!(parse_decimal("NaN", '.'), None);
/// ```
#[must_use]
pub fn parse_decimal(text: &str, decimal_separator: char) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || !text.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let plain = text.chars().all(|c| {
        c.is_ascii_digit() || c == '+' || c == '-' || c == 'e' || c == 'E' || c == decimal_separator
    });
    if !plain {
        return None;
    }
    if decimal_separator == '.' {
        text.parse::<f64>().ok()
    } else {
        text.replace(decimal_separator, ".").parse::<f64>().ok()
    }
}

/// Renders a value with its shortest round-trip representation.
#[must_use]
pub fn render_decimal(value: f64, decimal_separator: char) -> String {
    let s = value.to_string();
    if decimal_separator == '.' {
        s
    } else {
        s.replace('.', &decimal_separator.to_string())
    }
}

// Text can be re-emitted when it carries no separator or the target one.
fn text_fits(text: &str, decimal_separator: char) -> bool {
    text.contains(decimal_separator) || !text.contains(|c: char| c == '.' || c == ',')
}
