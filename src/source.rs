//! Raw line source.
//!
//! [`LineSource`] reads physical lines from a byte stream, decodes them with the
//! document's character set and tracks line numbers. It keeps a small lookahead
//! queue so the header can be inspected without consuming it: the same lines are
//! delivered again to the cursor afterwards.

use crate::Result;
use encoding_rs::Encoding;
use std::collections::VecDeque;
use std::io::BufRead;
use tracing::warn;

/// A decoded physical line with its 1-based line number.
pub type RawLine = (usize, String);

/// Buffered reader of decoded physical lines.
///
/// # Examples
///
/// ```rust
/// use simapro_csv::LineSource;
///
/// let mut source = LineSource::from_str("a;b\r\n\r\nc");
/// assert_eq!(source.peek_nth(1).unwrap(), Some(&(2, String::new())));
/// assert_eq!(source.next_line().unwrap(), Some((1, "a;b".to_string())));
/// assert_eq!(source.next_line().unwrap(), Some((2, String::new())));
/// assert_eq!(source.next_line().unwrap(), Some((3, "c".to_string())));
/// assert_eq!(source.next_line().unwrap(), None);
/// ```
pub struct LineSource<'a> {
    reader: Box<dyn BufRead + 'a>,
    charset: &'static Encoding,
    line_number: usize,
    lookahead: VecDeque<RawLine>,
    bytes: Vec<u8>,
}

impl<'a> LineSource<'a> {
    /// Creates a source decoding `reader` with `charset`.
    pub fn new<R: BufRead + 'a>(reader: R, charset: &'static Encoding) -> Self {
        LineSource {
            reader: Box::new(reader),
            charset,
            line_number: 0,
            lookahead: VecDeque::new(),
            bytes: Vec::with_capacity(256),
        }
    }

    /// Creates a source over already decoded text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        Self::new(input.as_bytes(), encoding_rs::UTF_8)
    }

    /// The character set used for decoding.
    #[must_use]
    pub fn charset(&self) -> &'static Encoding {
        self.charset
    }

    /// Returns the next physical line, or `None` at the end of input.
    pub fn next_line(&mut self) -> Result<Option<RawLine>> {
        if let Some(line) = self.lookahead.pop_front() {
            return Ok(Some(line));
        }
        self.read_physical()
    }

    /// Looks at the `n`-th upcoming line (0-based) without consuming anything.
    pub fn peek_nth(&mut self, n: usize) -> Result<Option<&RawLine>> {
        while self.lookahead.len() <= n {
            match self.read_physical()? {
                Some(line) => self.lookahead.push_back(line),
                None => break,
            }
        }
        Ok(self.lookahead.get(n))
    }

    fn read_physical(&mut self) -> Result<Option<RawLine>> {
        self.bytes.clear();
        if self.reader.read_until(b'\n', &mut self.bytes)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        if self.bytes.last() == Some(&b'\n') {
            self.bytes.pop();
            if self.bytes.last() == Some(&b'\r') {
                self.bytes.pop();
            }
        }

        let (text, had_errors) = if self.line_number == 1 {
            let (text, had_errors) = self.charset.decode_with_bom_removal(&self.bytes);
            (text.into_owned(), had_errors)
        } else {
            let (text, had_errors) = self.charset.decode_without_bom_handling(&self.bytes);
            (text.into_owned(), had_errors)
        };
        if had_errors {
            warn!(
                "Line {} contains bytes that are invalid in {}",
                self.line_number,
                self.charset.name()
            );
        }
        Ok(Some((self.line_number, text)))
    }
}
