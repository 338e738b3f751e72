//! The shared line cursor.
//!
//! A [`LineCursor`] is the single forward sequence of tokenized lines of one
//! document. The dispatcher and the block readers take turns pulling from it:
//! a reader receives `&mut LineCursor`, so only one of them can pull at a time,
//! and control returns to the caller together with the decoded result.
//!
//! The cursor offers a one-line lookahead ([`LineCursor::peek`]) for
//! classification; nothing can be pushed back beyond that.
//!
//! ## Examples
//!
//! ```rust
//! use simapro_csv::{Dialect, LineCursor};
//!
//! let mut cursor = LineCursor::from_str("Quantities\nMass;Yes\nLength;Yes\n\nEnd\n", Dialect::default());
//!
//! assert_eq!(cursor.peek_first().unwrap(), Some("Quantities"));
//! cursor.next_line().unwrap();
//!
//! let mut names = Vec::new();
//! cursor.until_empty(|line| {
//!     names.push(line.string(0));
//!     Ok(())
//! }).unwrap();
//!
//! assert_eq!(names, ["Mass", "Length"]);
//! assert_eq!(cursor.peek_first().unwrap(), Some("End"));
//! ```

use crate::line::tokenize;
use crate::{CsvLine, Dialect, LineSource, Result};

/// Single-pass cursor over the tokenized lines of a document.
pub struct LineCursor<'a> {
    source: LineSource<'a>,
    dialect: Dialect,
    peeked: Option<CsvLine>,
    consumed: usize,
    line_number: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(source: LineSource<'a>, dialect: Dialect) -> Self {
        LineCursor {
            source,
            dialect,
            peeked: None,
            consumed: 0,
            line_number: 0,
        }
    }

    /// Creates a cursor over already decoded text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str, dialect: Dialect) -> Self {
        Self::new(LineSource::from_str(input), dialect)
    }

    #[must_use]
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Number of lines handed out so far.
    #[inline]
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Source line number of the last line handed out (0 before the first).
    #[inline]
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Pulls the next line, or `None` at the end of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tokenize`](crate::Error::Tokenize) for broken quoting
    /// and [`Error::Io`](crate::Error::Io) for read failures.
    pub fn next_line(&mut self) -> Result<Option<CsvLine>> {
        let line = match self.peeked.take() {
            Some(line) => Some(line),
            None => self.read()?,
        };
        if let Some(line) = &line {
            self.consumed += 1;
            self.line_number = line.number();
        }
        Ok(line)
    }

    /// Looks at the next line without consuming it.
    pub fn peek(&mut self) -> Result<Option<&CsvLine>> {
        if self.peeked.is_none() {
            self.peeked = self.read()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// The first field of the next line, used for block classification.
    pub fn peek_first(&mut self) -> Result<Option<&str>> {
        Ok(self.peek()?.map(CsvLine::first))
    }

    /// Returns `true` when no line is left.
    pub fn is_exhausted(&mut self) -> Result<bool> {
        Ok(self.peek()?.is_none())
    }

    /// Pulls lines and passes them to `f` until a blank line or the end of
    /// input. The blank terminator is consumed but not passed on.
    ///
    /// Returns the number of lines passed to `f`.
    pub fn until_empty<F>(&mut self, mut f: F) -> Result<usize>
    where
        F: FnMut(CsvLine) -> Result<()>,
    {
        let mut count = 0;
        while let Some(line) = self.next_line()? {
            if line.is_empty() {
                break;
            }
            f(line)?;
            count += 1;
        }
        Ok(count)
    }

    /// Consumes blank lines up to the next non-blank one.
    pub fn skip_blank(&mut self) -> Result<()> {
        while let Some(line) = self.peek()? {
            if !line.is_empty() {
                break;
            }
            self.next_line()?;
        }
        Ok(())
    }

    fn read(&mut self) -> Result<Option<CsvLine>> {
        match self.source.next_line()? {
            Some((number, raw)) => tokenize(&raw, number, &self.dialect).map(Some),
            None => Ok(None),
        }
    }
}

impl Iterator for LineCursor<'_> {
    type Item = Result<CsvLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_peek_does_not_consume() {
        let mut cursor = LineCursor::from_str("a;b\nc\n", Dialect::default());
        assert_eq!(cursor.peek_first().unwrap(), Some("a"));
        assert_eq!(cursor.peek_first().unwrap(), Some("a"));
        assert_eq!(cursor.consumed(), 0);

        let line = cursor.next_line().unwrap().unwrap();
        assert_eq!(line.fields(), ["a", "b"]);
        assert_eq!(cursor.consumed(), 1);
        assert_eq!(cursor.line_number(), 1);
    }

    #[test]
    fn test_until_empty_consumes_terminator() {
        let mut cursor = LineCursor::from_str("x\ny\n\nz\n", Dialect::default());
        let count = cursor.until_empty(|_| Ok(())).unwrap();
        assert_eq!(count, 2);
        assert_eq!(cursor.consumed(), 3);
        assert_eq!(cursor.peek_first().unwrap(), Some("z"));
    }

    #[test]
    fn test_until_empty_at_end_of_input() {
        let mut cursor = LineCursor::from_str("x\ny", Dialect::default());
        assert_eq!(cursor.until_empty(|_| Ok(())).unwrap(), 2);
        assert!(cursor.is_exhausted().unwrap());
    }

    #[test]
    fn test_tokenize_error_carries_line_number() {
        let mut cursor = LineCursor::from_str("ok\n\"broken\n", Dialect::default());
        assert!(cursor.next_line().unwrap().is_some());
        let err = cursor.next_line().unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(matches!(err, Error::Tokenize { .. }));
    }

    #[test]
    fn test_iterator() {
        let cursor = LineCursor::from_str("a\n\nb", Dialect::default());
        let lines: Vec<_> = cursor.collect::<Result<_>>().unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_empty());
    }

    #[test]
    fn test_skip_blank() {
        let mut cursor = LineCursor::from_str("\n\n\nx", Dialect::default());
        cursor.skip_blank().unwrap();
        assert_eq!(cursor.peek_first().unwrap(), Some("x"));
        assert_eq!(cursor.consumed(), 3);
    }
}
