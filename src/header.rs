//! The self-describing file header.
//!
//! Every SimaPro CSV file starts with a block of `{...}` lines:
//!
//! ```text
//! {SimaPro 9.1.1.1}
//! {processes}
//! {Date: 17.03.2021}
//! {Time: 10:09:18}
//! {Project: Cradle to gate}
//! {CSV Format version: 9.0.0}
//! {CSV separator: Semicolon}
//! {Decimal separator: ,}
//! {Date separator: .}
//! {Short date format: dd.MM.yyyy}
//! ```
//!
//! The separator entries determine the [`Dialect`] used for every other line.
//! All entries are kept in their original order so that unknown entries survive
//! a round-trip.

use crate::options::Delimiter;
use crate::{Dialect, Error, LineSource, Result};
use chrono::{NaiveDate, NaiveTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const KEY_CSV_SEPARATOR: &str = "CSV separator";
pub const KEY_DECIMAL_SEPARATOR: &str = "Decimal separator";
pub const KEY_DATE_SEPARATOR: &str = "Date separator";
pub const KEY_SHORT_DATE_FORMAT: &str = "Short date format";
const KEY_DATE: &str = "Date";
const KEY_TIME: &str = "Time";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Parsed file header.
///
/// # Examples
///
/// ```rust
/// use simapro_csv::{CsvHeader, LineSource};
///
/// let text = "{SimaPro 9.1}\n{processes}\n{CSV separator: Comma}\n{Decimal separator: .}\n\nProcess\n";
/// let mut source = LineSource::from_str(text);
/// let header = CsvHeader::peek(&mut source, 64).unwrap();
///
/// assert_eq!(header.version, "9.1");
/// assert_eq!(header.kind, "processes");
/// assert_eq!(header.dialect.delimiter, ',');
///
/// // peeking does not consume the header lines
/// assert_eq!(source.next_line().unwrap(), Some((1, "{SimaPro 9.1}".to_string())));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CsvHeader {
    pub version: String,
    pub kind: String,
    pub dialect: Dialect,
    entries: IndexMap<String, Option<String>>,
}

impl Default for CsvHeader {
    fn default() -> Self {
        CsvHeader::new("processes", Dialect::default())
    }
}

impl CsvHeader {
    /// The version written into headers created from scratch.
    pub const DEFAULT_VERSION: &'static str = "9.0.0";

    /// Creates a header for a new document.
    pub fn new(kind: &str, dialect: Dialect) -> Self {
        let mut header = CsvHeader {
            version: Self::DEFAULT_VERSION.to_string(),
            kind: kind.to_string(),
            dialect: Dialect::default(),
            entries: IndexMap::new(),
        };
        header.set("CSV Format version", Self::DEFAULT_VERSION);
        header.with_dialect(dialect)
    }

    /// Replaces the dialect and updates the separator entries accordingly.
    ///
    /// When the short date format changes, a `{Date: ...}` entry that parses
    /// under the old format is rewritten in the new one. An unparseable date
    /// is kept as it is.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use simapro_csv::{CsvHeader, Dialect};
    ///
    /// let header = CsvHeader::from_lines(&[
    ///     "{SimaPro 9}",
    ///     "{Date: 2024-01-15}",
    ///     "{Short date format: yyyy-MM-dd}",
    /// ])
    /// .unwrap();
    /// let date = header.date();
    ///
    /// let header = header.with_dialect(Dialect::new(',', '.').unwrap());
    /// assert_eq!(header.get("Date"), Some("15.01.2024"));
    /// assert_eq!(header.date(), date);
    /// ```
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        let date = if self.dialect.chrono_date_format() != dialect.chrono_date_format() {
            self.date()
        } else {
            None
        };
        let separator = match Delimiter::from_char(dialect.delimiter) {
            Some(named) => named.header_name().to_string(),
            None => dialect.delimiter.to_string(),
        };
        self.set(KEY_CSV_SEPARATOR, &separator);
        self.set(KEY_DECIMAL_SEPARATOR, &dialect.decimal_separator.to_string());
        self.set(KEY_DATE_SEPARATOR, &dialect.date_separator.to_string());
        self.set(KEY_SHORT_DATE_FORMAT, &dialect.short_date_format);
        self.dialect = dialect;
        match date {
            Some(date) => self.with_date(date),
            None => self,
        }
    }

    /// Sets the `{Date: ...}` entry, formatted with the dialect's short date format.
    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        let text = date.format(&self.dialect.chrono_date_format()).to_string();
        self.set(KEY_DATE, &text);
        self
    }

    #[must_use]
    pub fn with_time(mut self, time: NaiveTime) -> Self {
        let text = time.format(TIME_FORMAT).to_string();
        self.set(KEY_TIME, &text);
        self
    }

    /// Sets an arbitrary entry, keeping its position if it already exists.
    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), Some(value.to_string()));
    }

    /// Returns the value of an entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| v.as_deref())
    }

    /// Returns `true` if a `Yes`/`No` entry is present and `Yes`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("yes"))
            .unwrap_or(false)
    }

    /// All entries after the version and kind lines, in source order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.get("Project")
    }

    #[must_use]
    pub fn format_version(&self) -> Option<&str> {
        self.get("CSV Format version")
    }

    #[must_use]
    pub fn export_platform_ids(&self) -> bool {
        self.flag("Export platform IDs")
    }

    #[must_use]
    pub fn skip_empty_fields(&self) -> bool {
        self.flag("Skip empty fields")
    }

    #[must_use]
    pub fn convert_expressions(&self) -> bool {
        self.flag("Convert expressions to constants")
    }

    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.get("Selection")
    }

    #[must_use]
    pub fn related_objects(&self) -> bool {
        self.flag("Related objects(system descriptions, substances, units, etc.)")
    }

    #[must_use]
    pub fn include_sub_stages(&self) -> bool {
        self.flag("Include sub product stages and processes")
    }

    #[must_use]
    pub fn open_library(&self) -> Option<&str> {
        self.get("Open library")
    }

    /// The export date, parsed with the dialect's short date format.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        let text = self.get(KEY_DATE)?;
        match NaiveDate::parse_from_str(text, &self.dialect.chrono_date_format()) {
            Ok(date) => Some(date),
            Err(err) => {
                warn!("Cannot parse header date {:?}: {}", text, err);
                None
            }
        }
    }

    #[must_use]
    pub fn time(&self) -> Option<NaiveTime> {
        let text = self.get(KEY_TIME)?;
        NaiveTime::parse_from_str(text, TIME_FORMAT).ok()
    }

    /// Inspects up to `limit` leading lines of `source` without consuming them.
    ///
    /// Blank lines before the header are allowed; the header ends at the first
    /// line that is not a `{...}` line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedHeader`] if no header line is found and
    /// [`Error::Dialect`] if the declared separators are unusable.
    pub fn peek(source: &mut LineSource<'_>, limit: usize) -> Result<Self> {
        let mut lines = Vec::new();
        let mut scanned = 0;
        while scanned < limit {
            let raw = match source.peek_nth(scanned)? {
                Some((_, raw)) => raw.trim().to_string(),
                None => break,
            };
            scanned += 1;
            if is_header_line(&raw) {
                lines.push(raw);
            } else if raw.is_empty() && lines.is_empty() {
                continue;
            } else {
                break;
            }
        }
        if lines.is_empty() {
            return Err(Error::MalformedHeader { scanned });
        }
        Self::from_lines(&lines)
    }

    /// Builds a header from its `{...}` lines.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dialect`] if the declared separators are unusable.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let mut header = CsvHeader {
            version: String::new(),
            kind: String::new(),
            dialect: Dialect::default(),
            entries: IndexMap::new(),
        };

        for line in lines {
            let line = line.as_ref().trim();
            let inner = line
                .strip_prefix('{')
                .and_then(|l| l.strip_suffix('}'))
                .unwrap_or(line)
                .trim();
            match inner.split_once(':') {
                Some((key, value)) => {
                    header
                        .entries
                        .insert(key.trim().to_string(), Some(value.trim().to_string()));
                }
                None if header.version.is_empty() && inner.starts_with("SimaPro") => {
                    header.version = inner["SimaPro".len()..].trim().to_string();
                }
                None if header.kind.is_empty() && header.entries.is_empty() => {
                    header.kind = inner.to_string();
                }
                None => {
                    header.entries.insert(inner.to_string(), None);
                }
            }
        }

        header.dialect = header.derive_dialect()?;
        debug!(
            "SimaPro CSV header: version {:?}, kind {:?}, delimiter {:?}, decimal separator {:?}",
            header.version, header.kind, header.dialect.delimiter, header.dialect.decimal_separator
        );
        Ok(header)
    }

    /// Renders the header as its `{...}` lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.entries.len() + 2);
        out.push(format!("{{SimaPro {}}}", self.version));
        if !self.kind.is_empty() {
            out.push(format!("{{{}}}", self.kind));
        }
        for (key, value) in &self.entries {
            match value {
                Some(value) => out.push(format!("{{{}: {}}}", key, value)),
                None => out.push(format!("{{{}}}", key)),
            }
        }
        out
    }

    fn derive_dialect(&self) -> Result<Dialect> {
        let mut dialect = Dialect::default();
        if let Some(value) = self.get(KEY_CSV_SEPARATOR) {
            dialect.delimiter = match Delimiter::from_header_name(value) {
                Some(named) => named.as_char(),
                None => single_char(KEY_CSV_SEPARATOR, value)?,
            };
        }
        if let Some(value) = self.get(KEY_DECIMAL_SEPARATOR) {
            dialect.decimal_separator = single_char(KEY_DECIMAL_SEPARATOR, value)?;
        }
        if let Some(value) = self.get(KEY_DATE_SEPARATOR) {
            dialect.date_separator = single_char(KEY_DATE_SEPARATOR, value)?;
        }
        if let Some(value) = self.get(KEY_SHORT_DATE_FORMAT) {
            if !value.is_empty() {
                dialect.short_date_format = value.to_string();
            }
        }
        dialect.validate()?;
        Ok(dialect)
    }
}

/// Returns `true` for a `{...}` header line.
#[must_use]
pub fn is_header_line(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 2 && line.starts_with('{') && line.ends_with('}')
}

fn single_char(key: &str, value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::dialect(format!(
            "header entry `{}` has unsupported value {:?}",
            key, value
        ))),
    }
}
