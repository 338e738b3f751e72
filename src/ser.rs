//! SimaPro CSV serialization.
//!
//! This module provides [`CsvBuffer`], the write-side mirror of the tokenizer.
//! Values are appended to the current line with `put_*` calls typed like the
//! decoding side, and [`CsvBuffer::writeln`] flushes the line.
//!
//! ## Usage
//!
//! ```rust
//! use simapro_csv::{CsvBuffer, Dialect, LineEnding, Numeric};
//!
//! let mut buffer = CsvBuffer::new(Dialect::new(';', ',').unwrap())
//!     .with_line_ending(LineEnding::Lf);
//! buffer.put_str("Steel; hot rolled").put_str("kg").put_numeric(&Numeric::of(2.5));
//! buffer.writeln();
//! buffer.writeln();
//!
//! assert_eq!(buffer.into_string(), "\"Steel; hot rolled\";kg;2,5\n\n");
//! ```
//!
//! ## Quoting Rules
//!
//! A field is quoted when it contains the active delimiter or the quote
//! character; quotes inside a quoted field are doubled. Line breaks inside a
//! field are written as the DEL character, as SimaPro does, so that one
//! logical row always stays on one physical line. `\r\n`, `\n` and a lone
//! `\r` all become one DEL, which reads back as `\n`.

use crate::header::CsvHeader;
use crate::options::{LineEnding, LINE_BREAK_MARKER, QUOTE};
use crate::{Comment, CsvLine, Dialect, Numeric, Result, UncertaintyRecord};
use encoding_rs::Encoding;
use std::io;

/// Line-oriented output buffer bound to one [`Dialect`].
pub struct CsvBuffer {
    output: String,
    fields: Vec<String>,
    dialect: Dialect,
    line_ending: LineEnding,
}

impl CsvBuffer {
    pub fn new(dialect: Dialect) -> Self {
        CsvBuffer {
            output: String::with_capacity(4096),
            fields: Vec::new(),
            dialect,
            line_ending: LineEnding::default(),
        }
    }

    #[must_use]
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    #[must_use]
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Returns the text written so far; a pending unflushed line is dropped.
    pub fn into_string(self) -> String {
        self.output
    }

    /// Encodes the written text with `charset` and writes it to `writer`.
    ///
    /// Characters the charset cannot represent are written as numeric
    /// character references by the encoder.
    pub fn write_to<W: io::Write>(&self, mut writer: W, charset: &'static Encoding) -> Result<()> {
        let (bytes, _, _) = charset.encode(&self.output);
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    pub fn put_str(&mut self, value: &str) -> &mut Self {
        self.fields.push(value.to_string());
        self
    }

    pub fn put_string(&mut self, value: Option<&str>) -> &mut Self {
        self.put_str(value.unwrap_or(""))
    }

    pub fn put_numeric(&mut self, value: &Numeric) -> &mut Self {
        let text = value.render(self.dialect.decimal_separator);
        self.fields.push(text);
        self
    }

    pub fn put_double(&mut self, value: f64) -> &mut Self {
        self.put_numeric(&Numeric::of(value))
    }

    pub fn put_bool(&mut self, value: bool) -> &mut Self {
        self.put_str(if value { "Yes" } else { "No" })
    }

    pub fn put_uncertainty(&mut self, value: &UncertaintyRecord) -> &mut Self {
        value.write(self);
        self
    }

    pub fn put_comment(&mut self, value: &Comment) -> &mut Self {
        let text = value.render();
        self.fields.push(text);
        self
    }

    /// Appends every field of `line` and flushes it.
    ///
    /// Fields are copied verbatim, except that strict decimal literals are
    /// re-rendered when `line` was read with another decimal separator than
    /// the buffer's. Formulas, dates and free text are never touched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use simapro_csv::{tokenize, CsvBuffer, Dialect, LineEnding};
    ///
    /// let source = Dialect::new(';', ',').unwrap();
    /// let line = tokenize("Steel;kg;1,02;2*x;17.03.2021", 1, &source).unwrap();
    ///
    /// let mut buffer = CsvBuffer::new(Dialect::new(',', '.').unwrap())
    ///     .with_line_ending(LineEnding::Lf);
    /// buffer.put_line(&line);
    /// assert_eq!(buffer.into_string(), "Steel,kg,1.02,2*x,17.03.2021\n");
    /// ```
    pub fn put_line(&mut self, line: &CsvLine) -> &mut Self {
        let source = line.decimal_separator();
        let target = self.dialect.decimal_separator;
        if source == target {
            self.fields.extend(line.fields().iter().cloned());
        } else {
            for field in line.fields() {
                let numeric = Numeric::parse(field, source);
                let text = if field.is_empty() || numeric.is_formula() {
                    field.clone()
                } else {
                    numeric.render(target)
                };
                self.fields.push(text);
            }
        }
        self.writeln()
    }

    /// Flushes the current line. A line without any non-empty field is written
    /// as a genuinely empty line.
    pub fn writeln(&mut self) -> &mut Self {
        if self.fields.iter().any(|f| !f.is_empty()) {
            let mut first = true;
            for field in std::mem::take(&mut self.fields) {
                if !first {
                    self.output.push(self.dialect.delimiter);
                }
                first = false;
                self.write_field(&field);
            }
        } else {
            self.fields.clear();
        }
        self.output.push_str(self.line_ending.as_str());
        self
    }

    /// Writes the `{key: value}` header block followed by a blank line.
    pub fn write_header(&mut self, header: &CsvHeader) -> &mut Self {
        for line in header.lines() {
            self.output.push_str(&line);
            self.output.push_str(self.line_ending.as_str());
        }
        self.writeln()
    }

    #[inline]
    fn needs_quotes(&self, s: &str) -> bool {
        s.contains(self.dialect.delimiter) || s.contains(QUOTE)
    }

    fn write_field(&mut self, s: &str) {
        let quoted = self.needs_quotes(s);
        if quoted {
            self.output.push(QUOTE);
        }
        let mut chars = s.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                QUOTE if quoted => {
                    self.output.push(QUOTE);
                    self.output.push(QUOTE);
                }
                // `\r\n` is one break; a lone `\r` is a break of its own
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' | '\r' => self.output.push(LINE_BREAK_MARKER),
                _ => self.output.push(ch),
            }
        }
        if quoted {
            self.output.push(QUOTE);
        }
    }
}
