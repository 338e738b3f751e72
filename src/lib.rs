//! # simapro_csv
//!
//! Reading and writing of the SimaPro CSV exchange format for life-cycle
//! inventory data.
//!
//! ## What is SimaPro CSV?
//!
//! SimaPro CSV is a flat, line-oriented text format that encodes nested named
//! blocks: processes, parameter tables, reference data such as units and
//! substances, and literature entries. A leading `{key: value}` header declares
//! the field delimiter, the decimal separator and the date conventions used by
//! every other line. See the [`format`] module for a walk through the layout.
//!
//! ## Key Features
//!
//! - **Header-driven dialects**: delimiter and decimal separator are taken from
//!   the file itself, for reading and for writing
//! - **Streaming blocks**: a [`Dispatcher`] yields one [`Block`] at a time from
//!   a shared [`LineCursor`]; structured blocks can be handed to custom
//!   [`BlockReader`]s
//! - **Lossless values**: numbers keep their source text, formulas stay
//!   formulas, uncertainty and pedigree data are typed
//! - **Windows-1252 by default**, with any other `encoding_rs` charset on request
//!
//! ## Quick Start
//!
//! ```rust
//! use simapro_csv::{from_str, to_string_with_options, LineEnding, WriteOptions};
//!
//! let text = "\
//! {SimaPro 9.1.1.1}
//! {processes}
//! {CSV separator: Semicolon}
//! {Decimal separator: ,}
//!
//! Quantities
//! Mass;Yes
//! Length;Yes
//!
//! End
//!
//! Project Input parameters
//! load;0,75;Normal;0,1;0;0;No;average load
//!
//! End
//!
//! ";
//!
//! let data = from_str(text).unwrap();
//! assert_eq!(data.quantities.len(), 2);
//! assert_eq!(data.project_input_parameters[0].value.value(), Some(0.75));
//!
//! let options = WriteOptions::new().with_line_ending(LineEnding::Lf);
//! let written = to_string_with_options(&data, &options).unwrap();
//! assert_eq!(from_str(&written).unwrap(), data);
//! ```
//!
//! ### Streaming
//!
//! ```rust
//! use simapro_csv::{Block, CsvHeader, Dialect, Dispatcher, LineCursor, LineSource};
//!
//! let text = "{SimaPro 9}\n{CSV separator: Comma}\n\nUnits\nkg,Mass,1,kg\ng,Mass,0.001,kg\n\nEnd\n";
//! let mut source = LineSource::from_str(text);
//! let header = CsvHeader::peek(&mut source, 64).unwrap();
//! let mut cursor = LineCursor::new(source, header.dialect.clone());
//!
//! for block in Dispatcher::new(&mut cursor) {
//!     if let Block::Units(units) = block.unwrap() {
//!         assert_eq!(units[1].conversion_factor, 0.001);
//!     }
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events and never
//! installs a subscriber: `debug` for the header and each dispatched block,
//! `warn` for recovered value anomalies, `trace` for every tokenized line.

pub mod block;
pub mod cursor;
pub mod dataset;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod header;
pub mod line;
pub mod numeric;
pub mod options;
pub mod pedigree;
pub mod rows;
pub mod section;
pub mod ser;
pub mod source;
pub mod uncertainty;

pub use block::{Block, BlockKind, ElementaryFlowType, ParameterScope};
pub use cursor::LineCursor;
pub use dataset::CsvDataSet;
pub use dispatch::{BlockReader, Dispatcher};
pub use encoding_rs::Encoding;
pub use error::{Error, Result};
pub use header::CsvHeader;
pub use line::{tokenize, CsvLine};
pub use numeric::Numeric;
pub use options::{Delimiter, Dialect, LineEnding, ReadOptions, WriteOptions};
pub use pedigree::{Comment, Pedigree};
pub use rows::{
    CalculatedParameterRow, CsvRecord, ElementaryFlowRow, InputParameterRow, ProductExchangeRow,
    QuantityRow, UnitRow,
};
pub use section::{ProcessType, Section, SectionBlock, SectionReader};
pub use ser::CsvBuffer;
pub use source::LineSource;
pub use uncertainty::UncertaintyRecord;

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

/// Reads a whole document from a file, decoded as Windows-1252.
///
/// # Errors
///
/// Returns the first fatal error: I/O, a missing header, an invalid dialect,
/// broken quoting or a block-reader protocol violation.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read_path<P: AsRef<Path>>(path: P) -> Result<CsvDataSet> {
    read_path_with_options(path, &ReadOptions::default())
}

/// Reads a whole document from a file with custom options.
///
/// # Errors
///
/// See [`read_path`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read_path_with_options<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<CsvDataSet> {
    let file = File::open(path)?;
    from_reader_with_options(BufReader::new(file), options)
}

/// Reads a whole document from a byte stream, decoded as Windows-1252.
///
/// # Examples
///
/// ```rust
/// use simapro_csv::from_reader;
///
/// // "Caf\xE9" is "Café" in Windows-1252
/// let bytes: &[u8] = b"{SimaPro 9}\n\nSocial issues\nCaf\xE9 workers;p;;\n\nEnd\n";
/// let data = from_reader(bytes).unwrap();
/// assert_eq!(data.social_issues[0].name, "Caf\u{E9} workers");
/// ```
///
/// # Errors
///
/// See [`read_path`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<'a, R: io::Read + 'a>(reader: R) -> Result<CsvDataSet> {
    from_reader_with_options(BufReader::new(reader), &ReadOptions::default())
}

/// Reads a whole document from a buffered byte stream with custom options.
///
/// # Errors
///
/// See [`read_path`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader_with_options<'a, R: io::BufRead + 'a>(
    reader: R,
    options: &ReadOptions,
) -> Result<CsvDataSet> {
    options.validate()?;
    read_source(LineSource::new(reader, options.charset), options)
}

/// Reads a whole document from already decoded text.
///
/// # Errors
///
/// See [`read_path`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(s: &str) -> Result<CsvDataSet> {
    read_source(LineSource::from_str(s), &ReadOptions::default())
}

fn read_source(mut source: LineSource<'_>, options: &ReadOptions) -> Result<CsvDataSet> {
    let header = CsvHeader::peek(&mut source, options.header_scan_limit)?;
    let mut cursor = LineCursor::new(source, header.dialect.clone());
    CsvDataSet::read(header, &mut cursor)
}

/// Streams the blocks of a file to `f` without materializing the document.
///
/// Returns the file header once every block has been handed out.
///
/// # Errors
///
/// See [`read_path`]. Blocks handed out before an error are not revoked.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn for_each_block<P, F>(path: P, mut f: F) -> Result<CsvHeader>
where
    P: AsRef<Path>,
    F: FnMut(Block),
{
    let options = ReadOptions::default();
    let file = File::open(path)?;
    let mut source = LineSource::new(BufReader::new(file), options.charset);
    let header = CsvHeader::peek(&mut source, options.header_scan_limit)?;
    let mut cursor = LineCursor::new(source, header.dialect.clone());
    for block in Dispatcher::new(&mut cursor) {
        f(block?);
    }
    Ok(header)
}

/// Renders a document in the dialect of its own header.
///
/// # Errors
///
/// Returns [`Error::Dialect`] if the dialect is invalid.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(data: &CsvDataSet) -> Result<String> {
    to_string_with_options(data, &WriteOptions::default())
}

/// Renders a document with custom options. The charset of `options` is not
/// applied; the result is a Rust string.
///
/// # Errors
///
/// Returns [`Error::Dialect`] if the dialect is invalid.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(data: &CsvDataSet, options: &WriteOptions) -> Result<String> {
    Ok(render(data, options)?.into_string())
}

/// Writes a document, encoded as Windows-1252, to `writer`.
///
/// # Errors
///
/// Returns an error if the dialect is invalid or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W: io::Write>(writer: W, data: &CsvDataSet) -> Result<()> {
    to_writer_with_options(writer, data, &WriteOptions::default())
}

/// Writes a document to `writer` with custom options.
///
/// # Errors
///
/// Returns an error if the dialect or charset is invalid, or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W: io::Write>(
    writer: W,
    data: &CsvDataSet,
    options: &WriteOptions,
) -> Result<()> {
    options.validate()?;
    render(data, options)?.write_to(writer, options.charset)
}

/// Writes a document to a file, replacing its content.
///
/// # Errors
///
/// Returns an error if the dialect is invalid or the file cannot be written.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn write_path<P: AsRef<Path>>(path: P, data: &CsvDataSet) -> Result<()> {
    write_path_with_options(path, data, &WriteOptions::default())
}

/// Writes a document to a file with custom options.
///
/// # Errors
///
/// Returns an error if the dialect is invalid or the file cannot be written.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn write_path_with_options<P: AsRef<Path>>(
    path: P,
    data: &CsvDataSet,
    options: &WriteOptions,
) -> Result<()> {
    let file = File::create(path)?;
    to_writer_with_options(BufWriter::new(file), data, options)
}

fn render(data: &CsvDataSet, options: &WriteOptions) -> Result<CsvBuffer> {
    let dialect = options
        .dialect
        .clone()
        .unwrap_or_else(|| data.header.dialect.clone());
    dialect.validate()?;
    let mut buffer = CsvBuffer::new(dialect).with_line_ending(options.line_ending);
    data.write(&mut buffer);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "{SimaPro 9.1}
{processes}
{CSV separator: Semicolon}
{Decimal separator: ,}

Raw materials
Water, river;m3;;
Iron;kg;007439-89-6;in ore

End

";

    #[test]
    fn test_from_str() {
        let data = from_str(DOC).unwrap();
        assert_eq!(data.header.version, "9.1");
        assert_eq!(data.raw_materials.len(), 2);
        assert_eq!(data.raw_materials[1].comment, "in ore");
    }

    #[test]
    fn test_missing_header_fails() {
        assert!(matches!(
            from_str("Raw materials\nWater;m3;;\n"),
            Err(Error::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_to_string_uses_crlf_by_default() {
        let data = from_str(DOC).unwrap();
        let text = to_string(&data).unwrap();
        assert!(text.starts_with("{SimaPro 9.1}\r\n{processes}\r\n"));
        assert!(text.contains("\r\nRaw materials\r\nWater, river;m3;;\r\n"));
    }

    #[test]
    fn test_writer_roundtrip_in_windows_1252() {
        let mut data = from_str(DOC).unwrap();
        data.raw_materials[0].comment = "Fl\u{FC}sse".to_string();
        let mut bytes = Vec::new();
        to_writer(&mut bytes, &data).unwrap();
        assert!(bytes.windows(6).any(|w| w == b"Fl\xFCsse"));
        assert_eq!(from_reader(bytes.as_slice()).unwrap(), data);
    }

    #[test]
    fn test_invalid_write_dialect() {
        let data = from_str(DOC).unwrap();
        let mut options = WriteOptions::new();
        options.dialect = Some(Dialect {
            delimiter: ',',
            decimal_separator: ',',
            ..Dialect::default()
        });
        assert!(matches!(
            to_string_with_options(&data, &options),
            Err(Error::Dialect(_))
        ));
    }

    #[test]
    fn test_utf16_is_rejected_for_reading_and_writing() {
        let options = ReadOptions::new().with_charset(encoding_rs::UTF_16LE);
        assert!(matches!(
            from_reader_with_options(DOC.as_bytes(), &options),
            Err(Error::Custom(_))
        ));

        let data = from_str(DOC).unwrap();
        let options = WriteOptions::new().with_charset(encoding_rs::UTF_16BE);
        let mut out = Vec::new();
        assert!(to_writer_with_options(&mut out, &data, &options).is_err());
        assert!(out.is_empty());
    }
}
