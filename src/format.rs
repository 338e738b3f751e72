//! # The SimaPro CSV format
//!
//! This module contains no code. It describes the file layout that the rest of
//! the crate reads and writes.
//!
//! ## Header
//!
//! A file starts with `{...}` lines. The first names the exporting SimaPro
//! version, the second the content kind; every further line is a `key: value`
//! entry:
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
//! `CSV separator` is `Semicolon`, `Comma` or `Tab`. Without an entry the
//! defaults are `;` for fields and `.` for decimals. See
//! [`CsvHeader`](crate::CsvHeader).
//!
//! ## Lines and fields
//!
//! Fields are split on the declared separator. A field may be enclosed in
//! double quotes, in which case it can contain the separator, and `""` stands
//! for one quote. Fields are trimmed. Line breaks inside a field are stored as
//! the DEL character (`0x7F`). A line without any non-empty field is a blank
//! line and ends the current list of rows or section.
//!
//! ## Row-list blocks
//!
//! Reference data is listed one row per line under a keyword:
//!
//! ```text
//! Units
//! kg;Mass;1;kg
//! g;Mass;0,001;kg
//!
//! End
//! ```
//!
//! | Keyword | Row |
//! |---------|-----|
//! | `Quantities` | [`QuantityRow`](crate::QuantityRow) |
//! | `Units` | [`UnitRow`](crate::UnitRow) |
//! | `Raw materials`, `Airborne emissions`, `Waterborne emissions`, `Final waste flows`, `Emissions to soil`, `Non material emissions`, `Social issues`, `Economic issues` | [`ElementaryFlowRow`](crate::ElementaryFlowRow) |
//! | `Database Input parameters`, `Project Input parameters` | [`InputParameterRow`](crate::InputParameterRow) |
//! | `Database Calculated parameters`, `Project Calculated parameters` | [`CalculatedParameterRow`](crate::CalculatedParameterRow) |
//!
//! ## Structured blocks
//!
//! `Process`, `Product stage`, `Method`, `System description` and
//! `Literature reference` blocks consist of named sections and end with `End`.
//! See [`SectionBlock`](crate::SectionBlock).
//!
//! ## Values
//!
//! - Numbers use the declared decimal separator. A value that is not a plain
//!   number is a formula, e.g. `2*load`.
//! - Uncertainty takes four columns: distribution, standard deviation (as
//!   squared geometric deviation for `Lognormal`), minimum and maximum.
//! - Exchange comments may carry a pedigree score `(1,2,1,3,5)` before or
//!   after the text.
