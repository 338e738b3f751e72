//! Dialect and configuration options.
//!
//! This module provides the types that control how lines are split and rendered:
//!
//! - [`Dialect`]: per-document conventions (field delimiter, decimal separator, dates)
//! - [`Delimiter`]: the field separators a SimaPro header can declare
//! - [`ReadOptions`] / [`WriteOptions`]: character set and output settings
//!
//! ## Examples
//!
//! ```rust
//! use simapro_csv::{Delimiter, Dialect, LineEnding, WriteOptions};
//!
//! let dialect = Dialect::new(Delimiter::Semicolon.as_char(), ',').unwrap();
//! assert_eq!(dialect.delimiter, ';');
//!
//! let options = WriteOptions::new()
//!     .with_dialect(dialect)
//!     .with_line_ending(LineEnding::Lf);
//! assert_eq!(options.line_ending.as_str(), "\n");
//! ```

use crate::{Error, Result};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

/// The quote character. It is not configurable in SimaPro CSV.
pub const QUOTE: char = '"';

/// SimaPro writes line breaks inside text fields as the DEL character.
pub const LINE_BREAK_MARKER: char = '\u{7F}';

/// Number of leading lines inspected when looking for the header.
pub const DEFAULT_HEADER_SCAN_LIMIT: usize = 64;

/// Field delimiter choices a SimaPro header can name.
///
/// # Examples
///
/// ```rust
/// use simapro_csv::Delimiter;
///
/// assert_eq!(Delimiter::Semicolon.as_char(), ';');
/// assert_eq!(Delimiter::from_header_name("Tab"), Some(Delimiter::Tab));
/// assert_eq!(Delimiter::Comma.header_name(), "Comma");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Delimiter {
    #[default]
    Semicolon,
    Comma,
    Tab,
}

impl Delimiter {
    /// Returns the character this delimiter stands for.
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Delimiter::Semicolon => ';',
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
        }
    }

    /// Returns the name used in the `{CSV separator: ...}` header entry.
    #[must_use]
    pub const fn header_name(&self) -> &'static str {
        match self {
            Delimiter::Semicolon => "Semicolon",
            Delimiter::Comma => "Comma",
            Delimiter::Tab => "Tab",
        }
    }

    /// Parses a header separator name.
    #[must_use]
    pub fn from_header_name(name: &str) -> Option<Self> {
        match name.trim() {
            "Semicolon" => Some(Delimiter::Semicolon),
            "Comma" => Some(Delimiter::Comma),
            "Tab" => Some(Delimiter::Tab),
            _ => None,
        }
    }

    /// Maps a delimiter character back to its named variant.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ';' => Some(Delimiter::Semicolon),
            ',' => Some(Delimiter::Comma),
            '\t' => Some(Delimiter::Tab),
            _ => None,
        }
    }
}

/// Per-document formatting conventions.
///
/// A `Dialect` is derived once from the file header and then shared by every
/// reader and writer of that document. The quote character is always `"`,
/// fields are always trimmed, and blank lines are always significant.
///
/// # Examples
///
/// ```rust
/// use simapro_csv::Dialect;
///
/// let dialect = Dialect::new(';', ',').unwrap();
/// assert_eq!(dialect.decimal_separator, ',');
///
/// // the decimal separator can never equal the delimiter
/// assert!(Dialect::new(',', ',').is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialect {
    pub delimiter: char,
    pub decimal_separator: char,
    pub date_separator: char,
    pub short_date_format: String,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect {
            delimiter: Delimiter::default().as_char(),
            decimal_separator: '.',
            date_separator: '.',
            short_date_format: "dd.MM.yyyy".to_string(),
        }
    }
}

impl Dialect {
    /// Creates a dialect with the given delimiter and decimal separator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dialect`] if the two characters are equal or if either
    /// one is the quote character.
    pub fn new(delimiter: char, decimal_separator: char) -> Result<Self> {
        let dialect = Dialect {
            delimiter,
            decimal_separator,
            ..Default::default()
        };
        dialect.validate()?;
        Ok(dialect)
    }

    /// Sets the date conventions used for the `{Date: ...}` header entry.
    #[must_use]
    pub fn with_dates(mut self, date_separator: char, short_date_format: &str) -> Self {
        self.date_separator = date_separator;
        self.short_date_format = short_date_format.to_string();
        self
    }

    /// Checks the dialect invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dialect`] when the dialect cannot be tokenized unambiguously.
    pub fn validate(&self) -> Result<()> {
        if self.delimiter == self.decimal_separator {
            return Err(Error::dialect(format!(
                "decimal separator {:?} equals the field delimiter",
                self.decimal_separator
            )));
        }
        if self.delimiter == QUOTE || self.decimal_separator == QUOTE {
            return Err(Error::dialect("the quote character cannot be a separator"));
        }
        if self.delimiter == '\n' || self.delimiter == '\r' {
            return Err(Error::dialect("a line break cannot be the field delimiter"));
        }
        Ok(())
    }

    /// Converts the SimaPro short date pattern (e.g. `dd.MM.yyyy`) into a
    /// `chrono` format string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use simapro_csv::Dialect;
    ///
    /// let dialect = Dialect::default().with_dates('-', "yyyy-MM-dd");
    /// assert_eq!(dialect.chrono_date_format(), "%Y-%m-%d");
    /// ```
    #[must_use]
    pub fn chrono_date_format(&self) -> String {
        let mut out = String::with_capacity(self.short_date_format.len() + 4);
        let chars: Vec<char> = self.short_date_format.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let run = chars[i..].iter().take_while(|&&x| x == c).count();
            match c {
                'd' => out.push_str("%d"),
                'M' => out.push_str("%m"),
                'y' if run <= 2 => out.push_str("%y"),
                'y' => out.push_str("%Y"),
                '%' => out.push_str("%%"),
                _ => {
                    for _ in 0..run {
                        out.push(c);
                    }
                }
            }
            i += run;
        }
        out
    }
}

/// Line terminator used when writing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Windows line endings, as written by SimaPro itself.
    #[default]
    CrLf,
    Lf,
}

impl LineEnding {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineEnding::CrLf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

/// The default character set of SimaPro CSV files: Windows-1252.
#[must_use]
pub fn default_charset() -> &'static Encoding {
    encoding_rs::WINDOWS_1252
}

// The encoder maps UTF-16 output to UTF-8 and the line splitter works on
// bytes, so both directions need an ASCII superset.
fn check_charset(charset: &'static Encoding) -> Result<()> {
    if charset.is_ascii_compatible() {
        Ok(())
    } else {
        Err(Error::custom(format!(
            "charset {} is not ASCII-compatible",
            charset.name()
        )))
    }
}

/// Options for reading a document.
///
/// # Examples
///
/// ```rust
/// use simapro_csv::ReadOptions;
///
/// let options = ReadOptions::new()
///     .with_charset(encoding_rs::UTF_8)
///     .with_header_scan_limit(10);
/// assert_eq!(options.header_scan_limit, 10);
/// ```
#[derive(Clone, Debug)]
pub struct ReadOptions {
    pub charset: &'static Encoding,
    pub header_scan_limit: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            charset: default_charset(),
            header_scan_limit: DEFAULT_HEADER_SCAN_LIMIT,
        }
    }
}

impl ReadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the character set used to decode the source.
    ///
    /// Lines are split on the `\n` byte before decoding, so only
    /// ASCII-compatible charsets are supported. UTF-16 sources are rejected
    /// by [`ReadOptions::validate`] when reading starts.
    #[must_use]
    pub fn with_charset(mut self, charset: &'static Encoding) -> Self {
        self.charset = charset;
        self
    }

    /// Sets how many leading lines are inspected for the header.
    #[must_use]
    pub fn with_header_scan_limit(mut self, limit: usize) -> Self {
        self.header_scan_limit = limit;
        self
    }

    /// Checks that the charset can be split into lines byte-wise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Custom`] for charsets that are not ASCII-compatible.
    pub fn validate(&self) -> Result<()> {
        check_charset(self.charset)
    }
}

/// Options for writing a document.
///
/// Without an explicit dialect the writer reuses the dialect declared by the
/// document's own header.
#[derive(Clone, Debug)]
pub struct WriteOptions {
    pub dialect: Option<Dialect>,
    pub charset: &'static Encoding,
    pub line_ending: LineEnding,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            dialect: None,
            charset: default_charset(),
            line_ending: LineEnding::default(),
        }
    }
}

impl WriteOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Sets the output charset. Only ASCII-compatible charsets are accepted
    /// by the writers; see [`WriteOptions::validate`].
    #[must_use]
    pub fn with_charset(mut self, charset: &'static Encoding) -> Self {
        self.charset = charset;
        self
    }

    /// Checks the charset and, when one is given, the dialect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Custom`] for charsets that are not ASCII-compatible
    /// and [`Error::Dialect`] for an invalid dialect.
    pub fn validate(&self) -> Result<()> {
        check_charset(self.charset)?;
        match &self.dialect {
            Some(dialect) => dialect.validate(),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dialect_is_valid() {
        assert!(Dialect::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_quote_separator() {
        assert!(Dialect::new('"', '.').is_err());
        assert!(Dialect::new(';', '"').is_err());
    }

    #[test]
    fn test_chrono_format_conversion() {
        assert_eq!(Dialect::default().chrono_date_format(), "%d.%m.%Y");
        let short = Dialect::default().with_dates('/', "M/d/yy");
        assert_eq!(short.chrono_date_format(), "%m/%d/%y");
    }

    #[test]
    fn test_delimiter_names() {
        for d in [Delimiter::Semicolon, Delimiter::Comma, Delimiter::Tab] {
            assert_eq!(Delimiter::from_header_name(d.header_name()), Some(d));
            assert_eq!(Delimiter::from_char(d.as_char()), Some(d));
        }
        assert_eq!(Delimiter::from_header_name("Pipe"), None);
    }

    #[test]
    fn test_utf16_charsets_are_rejected() {
        assert!(ReadOptions::new().validate().is_ok());
        assert!(ReadOptions::new()
            .with_charset(encoding_rs::UTF_8)
            .validate()
            .is_ok());
        for charset in [encoding_rs::UTF_16LE, encoding_rs::UTF_16BE] {
            let err = ReadOptions::new().with_charset(charset).validate().unwrap_err();
            assert!(matches!(err, Error::Custom(ref msg) if msg.contains("UTF-16")));
            assert!(WriteOptions::new().with_charset(charset).validate().is_err());
        }
    }
}
