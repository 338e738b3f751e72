//! Line tokenization.
//!
//! A [`CsvLine`] is one physical line split into fields under a [`Dialect`].
//! Splitting is quote-aware, every field is trimmed after unquoting, and blank
//! lines are kept: a line without any non-empty field is the terminator of
//! row-list blocks and sections.
//!
//! ## Examples
//!
//! ```rust
//! use simapro_csv::{tokenize, Dialect};
//!
//! let dialect = Dialect::new(';', ',').unwrap();
//! let line = tokenize(r#" Steel ; kg ;"1;5" ; 2,5 "#, 1, &dialect).unwrap();
//! assert_eq!(line.fields(), ["Steel", "kg", "1;5", "2,5"]);
//! assert_eq!(line.double(3), 2.5);
//!
//! let blank = tokenize("", 2, &dialect).unwrap();
//! assert!(blank.is_empty());
//! ```

use crate::options::{LINE_BREAK_MARKER, QUOTE};
use crate::{Dialect, Error, Numeric, Result};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// One tokenized line with its source line number.
///
/// Equality compares the fields only, so lines read from different positions
/// (or re-read after writing) compare equal when their content does.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CsvLine {
    number: usize,
    fields: Vec<String>,
    decimal_separator: char,
}

impl PartialEq for CsvLine {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl CsvLine {
    /// Creates a line from already split fields.
    pub fn new(number: usize, fields: Vec<String>, decimal_separator: char) -> Self {
        CsvLine {
            number,
            fields,
            decimal_separator,
        }
    }

    /// Convenience constructor for building lines in code.
    ///
    /// Numeric fields are decoded with `.` as the decimal separator; use
    /// [`CsvLine::of_dialect`] for lines written in a comma-decimal dialect.
    pub fn of<S: AsRef<str>>(fields: &[S]) -> Self {
        Self::new(
            0,
            fields.iter().map(|f| f.as_ref().to_string()).collect(),
            '.',
        )
    }

    /// Builds a line in code whose numeric fields follow `dialect`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use simapro_csv::{CsvLine, Dialect};
    ///
    /// let dialect = Dialect::new(';', ',').unwrap();
    /// assert_eq!(CsvLine::of_dialect(&["1,5"], &dialect).double(0), 1.5);
    /// assert!(CsvLine::of(&["1,5"]).numeric(0).is_formula());
    /// ```
    pub fn of_dialect<S: AsRef<str>>(fields: &[S], dialect: &Dialect) -> Self {
        Self::new(
            0,
            fields.iter().map(|f| f.as_ref().to_string()).collect(),
            dialect.decimal_separator,
        )
    }

    /// The 1-based source line number (0 for lines built in code).
    #[inline]
    #[must_use]
    pub fn number(&self) -> usize {
        self.number
    }

    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[must_use]
    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is non-empty; such a line terminates blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|f| f.is_empty())
    }

    /// The first field, used to classify the line.
    #[must_use]
    pub fn first(&self) -> &str {
        self.get(0)
    }

    /// Returns the field at `index`, or `""` when the line is shorter.
    #[must_use]
    pub fn get(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    #[must_use]
    pub fn string(&self, index: usize) -> String {
        self.get(index).to_string()
    }

    /// Returns the field at `index`, or `None` when it is missing or empty.
    #[must_use]
    pub fn optional(&self, index: usize) -> Option<String> {
        let s = self.get(index);
        (!s.is_empty()).then(|| s.to_string())
    }

    /// Decodes the field at `index` as a literal or formula.
    #[must_use]
    pub fn numeric(&self, index: usize) -> Numeric {
        Numeric::parse(self.get(index), self.decimal_separator)
    }

    /// Decodes the field at `index` as a plain number.
    ///
    /// A formula or otherwise non-numeric text is recovered as `0.0`.
    #[must_use]
    pub fn double(&self, index: usize) -> f64 {
        match self.numeric(index) {
            Numeric::Literal { value, .. } => value,
            Numeric::Formula(text) => {
                warn!(
                    "Line {}, column {}: expected a number, found {:?}",
                    self.number,
                    index + 1,
                    text
                );
                0.0
            }
        }
    }

    /// Decodes a `Yes`/`No` field; anything but `Yes` is `false`.
    #[must_use]
    pub fn boolean(&self, index: usize) -> bool {
        self.get(index).eq_ignore_ascii_case("yes")
    }

    #[must_use]
    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }
}

/// Splits one physical line into fields.
///
/// # Errors
///
/// Returns [`Error::Tokenize`] for an unterminated quoted field or for text
/// between a closing quote and the next delimiter.
pub fn tokenize(raw: &str, number: usize, dialect: &Dialect) -> Result<CsvLine> {
    let chars: Vec<char> = raw.chars().collect();
    let delimiter = dialect.delimiter;
    let is_blank = |c: char| c.is_whitespace() && c != delimiter;

    let mut fields = Vec::new();
    let mut i = 0;
    loop {
        while i < chars.len() && is_blank(chars[i]) {
            i += 1;
        }

        let mut field = String::new();
        if i < chars.len() && chars[i] == QUOTE {
            let opening = i;
            i += 1;
            loop {
                match chars.get(i) {
                    None => {
                        return Err(Error::tokenize(
                            number,
                            opening + 1,
                            "unterminated quoted field",
                        ))
                    }
                    Some(&QUOTE) if chars.get(i + 1) == Some(&QUOTE) => {
                        field.push(QUOTE);
                        i += 2;
                    }
                    Some(&QUOTE) => {
                        i += 1;
                        break;
                    }
                    Some(&c) => {
                        field.push(c);
                        i += 1;
                    }
                }
            }
            while i < chars.len() && is_blank(chars[i]) {
                i += 1;
            }
            if i < chars.len() && chars[i] != delimiter {
                return Err(Error::tokenize(
                    number,
                    i + 1,
                    "unexpected character after closing quote",
                ));
            }
        } else {
            while i < chars.len() && chars[i] != delimiter {
                field.push(chars[i]);
                i += 1;
            }
        }

        fields.push(decode_field(&field));
        if i >= chars.len() {
            break;
        }
        // skip the delimiter
        i += 1;
    }

    trace!("Line {}: {} fields", number, fields.len());
    Ok(CsvLine::new(number, fields, dialect.decimal_separator))
}

fn decode_field(field: &str) -> String {
    let trimmed = field.trim();
    if trimmed.contains(LINE_BREAK_MARKER) {
        trimmed.replace(LINE_BREAK_MARKER, "\n")
    } else {
        trimmed.to_string()
    }
}
