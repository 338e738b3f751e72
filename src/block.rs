//! Block kinds and block results.
//!
//! The first field of a line decides what kind of block starts there. The
//! vocabulary is closed: [`BlockKind::classify`] maps every known keyword to a
//! variant and everything else to [`BlockKind::Unknown`], which the dispatcher
//! skips.
//!
//! ## Examples
//!
//! ```rust
//! use simapro_csv::{BlockKind, CsvLine, ElementaryFlowType, ParameterScope};
//!
//! assert_eq!(BlockKind::from_keyword("Process"), Some(BlockKind::Process));
//! assert_eq!(
//!     BlockKind::from_keyword("Airborne emissions"),
//!     Some(BlockKind::ElementaryFlows(ElementaryFlowType::AirborneEmissions)),
//! );
//! assert_eq!(
//!     BlockKind::InputParameters(ParameterScope::Project).keyword(),
//!     Some("Project Input parameters"),
//! );
//!
//! // matching is exact and case-sensitive
//! let line = CsvLine::of(&["process"]);
//! assert_eq!(BlockKind::classify(&line), BlockKind::Unknown("process".to_string()));
//! ```

use crate::header::is_header_line;
use crate::rows::{
    CalculatedParameterRow, CsvRecord, ElementaryFlowRow, InputParameterRow, QuantityRow, UnitRow,
};
use crate::section::SectionBlock;
use crate::{CsvBuffer, CsvLine};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The elementary-flow families, each listed in its own row-list block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementaryFlowType {
    RawMaterials,
    AirborneEmissions,
    WaterborneEmissions,
    FinalWasteFlows,
    EmissionsToSoil,
    NonMaterialEmissions,
    SocialIssues,
    EconomicIssues,
}

impl ElementaryFlowType {
    pub const ALL: [ElementaryFlowType; 8] = [
        ElementaryFlowType::RawMaterials,
        ElementaryFlowType::AirborneEmissions,
        ElementaryFlowType::WaterborneEmissions,
        ElementaryFlowType::FinalWasteFlows,
        ElementaryFlowType::EmissionsToSoil,
        ElementaryFlowType::NonMaterialEmissions,
        ElementaryFlowType::SocialIssues,
        ElementaryFlowType::EconomicIssues,
    ];
}

/// Where a parameter table is defined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterScope {
    Database,
    Project,
}

/// The kind of block a line starts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    // row-list blocks
    Quantities,
    Units,
    ElementaryFlows(ElementaryFlowType),
    InputParameters(ParameterScope),
    CalculatedParameters(ParameterScope),

    // structured blocks
    Process,
    ProductStage,
    Method,
    SystemDescription,
    LiteratureReference,

    // lines that are not block starts
    HeaderLine,
    End,
    Blank,
    Unknown(String),
}

const KEYWORDS: [(&str, BlockKind); 19] = [
    ("Quantities", BlockKind::Quantities),
    ("Units", BlockKind::Units),
    ("Raw materials", BlockKind::ElementaryFlows(ElementaryFlowType::RawMaterials)),
    ("Airborne emissions", BlockKind::ElementaryFlows(ElementaryFlowType::AirborneEmissions)),
    ("Waterborne emissions", BlockKind::ElementaryFlows(ElementaryFlowType::WaterborneEmissions)),
    ("Final waste flows", BlockKind::ElementaryFlows(ElementaryFlowType::FinalWasteFlows)),
    ("Emissions to soil", BlockKind::ElementaryFlows(ElementaryFlowType::EmissionsToSoil)),
    ("Non material emissions", BlockKind::ElementaryFlows(ElementaryFlowType::NonMaterialEmissions)),
    ("Social issues", BlockKind::ElementaryFlows(ElementaryFlowType::SocialIssues)),
    ("Economic issues", BlockKind::ElementaryFlows(ElementaryFlowType::EconomicIssues)),
    ("Database Input parameters", BlockKind::InputParameters(ParameterScope::Database)),
    ("Database Calculated parameters", BlockKind::CalculatedParameters(ParameterScope::Database)),
    ("Project Input parameters", BlockKind::InputParameters(ParameterScope::Project)),
    ("Project Calculated parameters", BlockKind::CalculatedParameters(ParameterScope::Project)),
    ("Process", BlockKind::Process),
    ("Product stage", BlockKind::ProductStage),
    ("Method", BlockKind::Method),
    ("System description", BlockKind::SystemDescription),
    ("Literature reference", BlockKind::LiteratureReference),
];

static KEYWORD_TABLE: Lazy<HashMap<&'static str, BlockKind>> =
    Lazy::new(|| KEYWORDS.iter().cloned().collect());

/// The line that closes row-list and structured blocks.
pub const END_KEYWORD: &str = "End";

impl BlockKind {
    /// Looks up a block keyword (exact, case-sensitive).
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        KEYWORD_TABLE.get(keyword).cloned()
    }

    /// Classifies a line by its first field.
    #[must_use]
    pub fn classify(line: &CsvLine) -> Self {
        let first = line.first();
        if line.is_empty() {
            return BlockKind::Blank;
        }
        if first == END_KEYWORD {
            return BlockKind::End;
        }
        if first.starts_with('{') && is_header_line(&line.fields().join("")) {
            return BlockKind::HeaderLine;
        }
        Self::from_keyword(first).unwrap_or_else(|| BlockKind::Unknown(first.to_string()))
    }

    /// The keyword that starts a block of this kind, if it is a block kind.
    #[must_use]
    pub fn keyword(&self) -> Option<&'static str> {
        KEYWORDS
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(keyword, _)| *keyword)
    }

    /// Returns `true` for blocks whose body is one row per line.
    #[must_use]
    pub const fn is_row_list(&self) -> bool {
        matches!(
            self,
            BlockKind::Quantities
                | BlockKind::Units
                | BlockKind::ElementaryFlows(_)
                | BlockKind::InputParameters(_)
                | BlockKind::CalculatedParameters(_)
        )
    }

    /// Returns `true` for blocks handed to a block reader.
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(
            self,
            BlockKind::Process
                | BlockKind::ProductStage
                | BlockKind::Method
                | BlockKind::SystemDescription
                | BlockKind::LiteratureReference
        )
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::HeaderLine => f.write_str("{header}"),
            BlockKind::End => f.write_str(END_KEYWORD),
            BlockKind::Blank => f.write_str("{blank}"),
            BlockKind::Unknown(keyword) => f.write_str(keyword),
            known => f.write_str(known.keyword().unwrap_or_default()),
        }
    }
}

/// One decoded block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Quantities(Vec<QuantityRow>),
    Units(Vec<UnitRow>),
    ElementaryFlows(ElementaryFlowType, Vec<ElementaryFlowRow>),
    InputParameters(ParameterScope, Vec<InputParameterRow>),
    CalculatedParameters(ParameterScope, Vec<CalculatedParameterRow>),
    Structured(SectionBlock),
}

impl Block {
    #[must_use]
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Quantities(_) => BlockKind::Quantities,
            Block::Units(_) => BlockKind::Units,
            Block::ElementaryFlows(t, _) => BlockKind::ElementaryFlows(*t),
            Block::InputParameters(s, _) => BlockKind::InputParameters(*s),
            Block::CalculatedParameters(s, _) => BlockKind::CalculatedParameters(*s),
            Block::Structured(block) => block.kind.clone(),
        }
    }

    /// Number of rows (or sections, for structured blocks).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Block::Quantities(rows) => rows.len(),
            Block::Units(rows) => rows.len(),
            Block::ElementaryFlows(_, rows) => rows.len(),
            Block::InputParameters(_, rows) => rows.len(),
            Block::CalculatedParameters(_, rows) => rows.len(),
            Block::Structured(block) => block.sections.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the block, including its keyword line and closing `End`.
    pub fn write(&self, buffer: &mut CsvBuffer) {
        match self {
            Block::Quantities(rows) => write_row_list(buffer, &self.kind(), rows),
            Block::Units(rows) => write_row_list(buffer, &self.kind(), rows),
            Block::ElementaryFlows(_, rows) => write_row_list(buffer, &self.kind(), rows),
            Block::InputParameters(_, rows) => write_row_list(buffer, &self.kind(), rows),
            Block::CalculatedParameters(_, rows) => write_row_list(buffer, &self.kind(), rows),
            Block::Structured(block) => block.write(buffer),
        }
    }
}

/// Writes a row-list block: keyword, rows, blank terminator, `End`.
pub fn write_row_list<T: CsvRecord>(buffer: &mut CsvBuffer, kind: &BlockKind, rows: &[T]) {
    buffer.put_str(kind.keyword().unwrap_or_default()).writeln();
    for row in rows {
        row.write(buffer);
    }
    buffer.writeln();
    buffer.put_str(END_KEYWORD).writeln();
    buffer.writeln();
}
