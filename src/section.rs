//! Structured blocks made of named sections.
//!
//! Processes, product stages, methods, system descriptions and literature
//! references share one layout: the keyword line, then named sections, then
//! `End`. A section starts with a line holding its name and runs up to the
//! next blank line:
//!
//! ```text
//! Process
//!
//! Category type
//! material
//!
//! Type
//! Unit process
//!
//! Materials/fuels
//! Steel, low-alloyed;kg;1,2;Lognormal;1,1;0;0;(2,3,1,1,1)
//!
//! End
//! ```
//!
//! [`SectionReader`] reads this layout without interpreting it; the typed
//! accessors on [`SectionBlock`] decode what callers ask for.

use crate::block::{BlockKind, END_KEYWORD};
use crate::dispatch::BlockReader;
use crate::rows::{CsvRecord, ProductExchangeRow};
use crate::{Block, CsvBuffer, CsvLine, Dialect, LineCursor, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// One named section of a structured block.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub lines: Vec<CsvLine>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Section {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    /// Adds a line built from `fields`, with `.` as the decimal separator.
    ///
    /// `1,5` added this way is a formula; use [`Section::with_line_in`] for
    /// comma-decimal values.
    #[must_use]
    pub fn with_line<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.lines.push(CsvLine::of(fields));
        self
    }

    /// Adds a line whose numeric fields are written in `dialect`.
    #[must_use]
    pub fn with_line_in<S: AsRef<str>>(mut self, dialect: &Dialect, fields: &[S]) -> Self {
        self.lines.push(CsvLine::of_dialect(fields, dialect));
        self
    }

    /// The first field of the first line, for single-value sections such as
    /// `Process name` or `Type`.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.lines.first().map(CsvLine::first).filter(|v| !v.is_empty())
    }

    /// Decodes every line of the section as `T`.
    pub fn rows<T: CsvRecord>(&self) -> Vec<T> {
        self.lines.iter().map(T::read).collect()
    }
}

/// The `Type` entry of a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessType {
    System,
    UnitProcess,
}

impl ProcessType {
    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        match value.trim() {
            "System" => Some(ProcessType::System),
            "Unit process" => Some(ProcessType::UnitProcess),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProcessType::System => "System",
            ProcessType::UnitProcess => "Unit process",
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured block as an ordered list of sections.
///
/// # Examples
///
/// ```rust
/// use simapro_csv::{BlockKind, ProcessType, Section, SectionBlock};
///
/// let block = SectionBlock::new(BlockKind::Process)
///     .with_section(Section::new("Process name").with_line(&["Steel sheet"]))
///     .with_section(Section::new("Type").with_line(&["Unit process"]));
///
/// assert_eq!(block.value("Process name"), Some("Steel sheet"));
/// assert_eq!(block.process_type(), Some(ProcessType::UnitProcess));
/// assert!(block.section("Products").is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionBlock {
    pub kind: BlockKind,
    pub sections: Vec<Section>,
}

impl SectionBlock {
    pub fn new(kind: BlockKind) -> Self {
        SectionBlock {
            kind,
            sections: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// The first section called `name`.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// All sections called `name`, in source order.
    pub fn sections_named<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s Section> + 's {
        self.sections.iter().filter(move |s| s.name == name)
    }

    /// The single value of the section called `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.section(name).and_then(Section::value)
    }

    #[must_use]
    pub fn process_type(&self) -> Option<ProcessType> {
        self.value("Type").and_then(ProcessType::from_value)
    }

    /// Exchange rows of the section called `name`; empty when it is missing.
    #[must_use]
    pub fn product_exchanges(&self, name: &str) -> Vec<ProductExchangeRow> {
        self.section(name)
            .map(|s| s.rows::<ProductExchangeRow>())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn products(&self) -> Vec<ProductExchangeRow> {
        self.product_exchanges("Products")
    }

    #[must_use]
    pub fn materials_and_fuels(&self) -> Vec<ProductExchangeRow> {
        self.product_exchanges("Materials/fuels")
    }

    #[must_use]
    pub fn electricity_and_heat(&self) -> Vec<ProductExchangeRow> {
        self.product_exchanges("Electricity/heat")
    }

    #[must_use]
    pub fn avoided_products(&self) -> Vec<ProductExchangeRow> {
        self.product_exchanges("Avoided products")
    }

    /// Writes the keyword line, the sections and the closing `End`.
    pub fn write(&self, buffer: &mut CsvBuffer) {
        buffer.put_str(self.kind.keyword().unwrap_or_default()).writeln();
        buffer.writeln();
        for section in &self.sections {
            buffer.put_str(&section.name).writeln();
            for line in &section.lines {
                buffer.put_line(line);
            }
            buffer.writeln();
        }
        buffer.put_str(END_KEYWORD).writeln();
        buffer.writeln();
    }
}

/// The default reader for structured blocks.
///
/// After the keyword line it collects sections until a line whose first field
/// is `End` (consumed) or the end of input. Blank lines between sections are
/// skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct SectionReader;

impl BlockReader for SectionReader {
    fn read_block(&self, kind: &BlockKind, cursor: &mut LineCursor<'_>) -> Result<Block> {
        let mut block = SectionBlock::new(kind.clone());
        while let Some(line) = cursor.next_line()? {
            if line.is_empty() {
                continue;
            }
            if line.first() == END_KEYWORD {
                break;
            }
            let mut section = Section::new(line.first());
            cursor.until_empty(|line| {
                section.lines.push(line);
                Ok(())
            })?;
            trace!(
                "Section `{}` of {} with {} lines",
                section.name,
                kind,
                section.lines.len()
            );
            block.sections.push(section);
        }
        Ok(Block::Structured(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LineEnding, Numeric, UncertaintyRecord};

    const PROCESS: &str = "\
Category type
material

Type
Unit process

Materials/fuels
Steel, low-alloyed;kg;1,2;Lognormal;1,1;0;0;(2,3,1,1,1)
Electricity;kWh;0,5;Undefined;0;0;0;

Comment
first
Comment
second

End
Quantities
";

    fn read(text: &str) -> (SectionBlock, LineCursor<'_>) {
        let mut cursor = LineCursor::from_str(text, Dialect::new(';', ',').unwrap());
        match SectionReader.read_block(&BlockKind::Process, &mut cursor).unwrap() {
            Block::Structured(block) => (block, cursor),
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_reads_sections_up_to_end() {
        let (block, mut cursor) = read(PROCESS);
        let names: Vec<_> = block.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Category type", "Type", "Materials/fuels", "Comment"]);
        assert_eq!(block.value("Category type"), Some("material"));
        assert_eq!(block.process_type(), Some(ProcessType::UnitProcess));
        // "End" is consumed, the next keyword is not
        assert_eq!(cursor.peek_first().unwrap(), Some("Quantities"));
    }

    #[test]
    fn test_section_lines_after_name() {
        let (block, _) = read(PROCESS);
        // a name line right after data lines belongs to the running section
        let comment = block.section("Comment").unwrap();
        assert_eq!(comment.lines.len(), 3);
        assert_eq!(block.sections_named("Comment").count(), 1);
    }

    #[test]
    fn test_materials_and_fuels() {
        let (block, _) = read(PROCESS);
        let inputs = block.materials_and_fuels();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].amount, Numeric::of(1.2));
        assert_eq!(inputs[0].uncertainty, UncertaintyRecord::log_normal(1.1));
        assert!(inputs[0].comment.pedigree.is_some());
        assert!(inputs[1].uncertainty.is_undefined());
        assert!(block.avoided_products().is_empty());
    }

    #[test]
    fn test_missing_end_stops_at_eof() {
        let (block, mut cursor) = read("Type\nSystem\n");
        assert_eq!(block.process_type(), Some(ProcessType::System));
        assert!(cursor.is_exhausted().unwrap());
    }

    #[test]
    fn test_write_then_read() {
        let (block, _) = read(PROCESS);
        let mut buffer =
            CsvBuffer::new(Dialect::new(';', ',').unwrap()).with_line_ending(LineEnding::Lf);
        block.write(&mut buffer);
        let text = buffer.into_string();
        assert!(text.starts_with("Process\n\nCategory type\nmaterial\n\n"));

        let mut cursor = LineCursor::from_str(&text, Dialect::new(';', ',').unwrap());
        assert_eq!(cursor.next_line().unwrap().unwrap().first(), "Process");
        let reread = SectionReader.read_block(&BlockKind::Process, &mut cursor).unwrap();
        assert_eq!(reread, Block::Structured(block));
    }

    #[test]
    fn test_with_line_in_uses_dialect_decimals() {
        let comma = Dialect::new(';', ',').unwrap();
        let block = SectionBlock::new(BlockKind::Process)
            .with_section(Section::new("Products").with_line_in(
                &comma,
                &["Pipe", "m", "1,5", "Normal", "0,1", "0", "0", ""],
            ))
            .with_section(Section::new("Avoided products").with_line(&[
                "Pipe", "m", "1,5", "Undefined", "0", "0", "0", "",
            ]));

        assert_eq!(block.products()[0].amount, Numeric::of(1.5));
        assert_eq!(block.products()[0].uncertainty, UncertaintyRecord::normal(0.1));
        assert!(block.avoided_products()[0].amount.is_formula());
    }

    #[test]
    fn test_write_in_other_dialect_keeps_amounts() {
        let (block, _) = read(PROCESS);
        let target = Dialect::new(',', '.').unwrap();
        let mut buffer = CsvBuffer::new(target.clone()).with_line_ending(LineEnding::Lf);
        block.write(&mut buffer);
        let text = buffer.into_string();
        assert!(text.contains("\"Steel, low-alloyed\",kg,1.2,Lognormal,1.1,0,0,\"(2,3,1,1,1)\"\n"));

        let mut cursor = LineCursor::from_str(&text, target);
        cursor.next_line().unwrap();
        match SectionReader.read_block(&BlockKind::Process, &mut cursor).unwrap() {
            Block::Structured(reread) => {
                assert_eq!(reread.materials_and_fuels(), block.materials_and_fuels());
            }
            other => panic!("unexpected block {:?}", other),
        }
    }
}
