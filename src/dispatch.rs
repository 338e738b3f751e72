//! Block dispatch.
//!
//! The [`Dispatcher`] walks the shared [`LineCursor`], classifies each line by
//! its first field and hands the cursor to the reader responsible for the block
//! that starts there. Row-list blocks are read in place; structured blocks go
//! to a [`BlockReader`], by default the [`SectionReader`].
//!
//! Header lines, blank lines, stray `End` lines and unknown keywords are
//! skipped, so a file with an unsupported block still yields everything else.
//!
//! ## Examples
//!
//! ```rust
//! use simapro_csv::{Block, Dialect, Dispatcher, LineCursor};
//!
//! let text = "Quantities\nMass;Yes\nLength;Yes\n\nEnd\n\nFoo bar\nx;y\n\nUnits\nkg;Mass;1;kg\n\nEnd\n";
//! let mut cursor = LineCursor::from_str(text, Dialect::default());
//! let blocks: Vec<Block> = Dispatcher::new(&mut cursor)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(blocks.len(), 2);
//! assert!(matches!(&blocks[0], Block::Quantities(rows) if rows.len() == 2));
//! assert!(matches!(&blocks[1], Block::Units(rows) if rows[0].name == "kg"));
//! ```

use crate::rows::{
    CalculatedParameterRow, CsvRecord, ElementaryFlowRow, InputParameterRow, QuantityRow, UnitRow,
};
use crate::section::SectionReader;
use crate::{Block, BlockKind, Error, LineCursor, Result};
use std::collections::HashMap;
use tracing::debug;

/// Reads one structured block from the shared cursor.
///
/// The dispatcher has already consumed the keyword line when `read_block` is
/// called. An implementation must consume at least one further line (unless
/// the input is exhausted) and should leave the cursor on the first line after
/// its block.
pub trait BlockReader {
    fn read_block(&self, kind: &BlockKind, cursor: &mut LineCursor<'_>) -> Result<Block>;
}

/// Iterator over the blocks of one document.
///
/// The dispatcher borrows the cursor, so the cursor can be inspected once the
/// dispatcher is dropped. After the first error the iterator is fused.
pub struct Dispatcher<'c, 'a> {
    cursor: &'c mut LineCursor<'a>,
    readers: HashMap<BlockKind, Box<dyn BlockReader + 'c>>,
    default_reader: SectionReader,
    failed: bool,
}

impl<'c, 'a> Dispatcher<'c, 'a> {
    pub fn new(cursor: &'c mut LineCursor<'a>) -> Self {
        Dispatcher {
            cursor,
            readers: HashMap::new(),
            default_reader: SectionReader,
            failed: false,
        }
    }

    /// Registers a reader for a structured block kind, replacing the default
    /// section reader for that kind.
    #[must_use]
    pub fn with_reader(mut self, kind: BlockKind, reader: Box<dyn BlockReader + 'c>) -> Self {
        self.readers.insert(kind, reader);
        self
    }

    /// Reads the next block, skipping everything that does not start one.
    ///
    /// # Errors
    ///
    /// Tokenize and I/O errors from the cursor, errors of the block readers and
    /// [`Error::ProtocolViolation`] when a reader consumes nothing.
    pub fn next_block(&mut self) -> Result<Option<Block>> {
        while let Some(line) = self.cursor.next_line()? {
            let kind = BlockKind::classify(&line);
            match kind {
                BlockKind::HeaderLine | BlockKind::End | BlockKind::Blank => continue,
                BlockKind::Unknown(keyword) => {
                    debug!("Skipping unknown block `{}` at line {}", keyword, line.number());
                    continue;
                }
                kind if kind.is_row_list() => {
                    let block = self.read_row_list(&kind)?;
                    debug!(
                        "Read {} block with {} rows at line {}",
                        kind,
                        block.len(),
                        line.number()
                    );
                    return Ok(Some(block));
                }
                kind => {
                    let block = self.read_structured(&kind, line.number())?;
                    debug!("Read {} block at line {}", kind, line.number());
                    return Ok(Some(block));
                }
            }
        }
        Ok(None)
    }

    fn read_row_list(&mut self, kind: &BlockKind) -> Result<Block> {
        let cursor = &mut *self.cursor;
        let block = match kind {
            BlockKind::Quantities => Block::Quantities(read_rows::<QuantityRow>(cursor)?),
            BlockKind::Units => Block::Units(read_rows::<UnitRow>(cursor)?),
            BlockKind::ElementaryFlows(flow_type) => {
                Block::ElementaryFlows(*flow_type, read_rows::<ElementaryFlowRow>(cursor)?)
            }
            BlockKind::InputParameters(scope) => {
                Block::InputParameters(*scope, read_rows::<InputParameterRow>(cursor)?)
            }
            BlockKind::CalculatedParameters(scope) => {
                Block::CalculatedParameters(*scope, read_rows::<CalculatedParameterRow>(cursor)?)
            }
            other => {
                return Err(Error::custom(format!("`{}` is not a row-list block", other)));
            }
        };
        Ok(block)
    }

    fn read_structured(&mut self, kind: &BlockKind, line: usize) -> Result<Block> {
        let before = self.cursor.consumed();
        let reader: &dyn BlockReader = match self.readers.get(kind) {
            Some(reader) => reader.as_ref(),
            None => &self.default_reader,
        };
        let block = reader.read_block(kind, self.cursor)?;
        if self.cursor.consumed() == before && !self.cursor.is_exhausted()? {
            return Err(Error::protocol_violation(
                &kind.to_string(),
                line,
                "returned without consuming a line",
            ));
        }
        Ok(block)
    }
}

impl Iterator for Dispatcher<'_, '_> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_block() {
            Ok(block) => block.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Reads rows up to and including the blank terminator.
pub fn read_rows<T: CsvRecord>(cursor: &mut LineCursor<'_>) -> Result<Vec<T>> {
    let mut rows = Vec::new();
    cursor.until_empty(|line| {
        rows.push(T::read(&line));
        Ok(())
    })?;
    Ok(rows)
}
