//! The materialized document.

use crate::block::{write_row_list, ElementaryFlowType, ParameterScope};
use crate::rows::{
    CalculatedParameterRow, ElementaryFlowRow, InputParameterRow, QuantityRow, UnitRow,
};
use crate::{Block, BlockKind, CsvBuffer, CsvHeader, Dispatcher, LineCursor, Result, SectionBlock};
use serde::{Deserialize, Serialize};

/// A whole SimaPro CSV document: the header plus every block, grouped by
/// category in source order.
///
/// # Examples
///
/// ```rust
/// use simapro_csv::{from_str, to_string_with_options, LineEnding, WriteOptions};
///
/// let text = "{SimaPro 9.1}\n{processes}\n{CSV separator: Semicolon}\n{Decimal separator: ,}\n\n\
///             Units\ng;Mass;0,001;kg\n\nEnd\n\n";
/// let data = from_str(text).unwrap();
/// assert_eq!(data.units[0].conversion_factor, 0.001);
///
/// let options = WriteOptions::new().with_line_ending(LineEnding::Lf);
/// let written = to_string_with_options(&data, &options).unwrap();
/// assert!(written.ends_with("Units\ng;Mass;0,001;kg\n\nEnd\n\n"));
/// ```
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct CsvDataSet {
    pub header: CsvHeader,

    pub quantities: Vec<QuantityRow>,
    pub units: Vec<UnitRow>,

    pub raw_materials: Vec<ElementaryFlowRow>,
    pub airborne_emissions: Vec<ElementaryFlowRow>,
    pub waterborne_emissions: Vec<ElementaryFlowRow>,
    pub final_waste_flows: Vec<ElementaryFlowRow>,
    pub emissions_to_soil: Vec<ElementaryFlowRow>,
    pub non_material_emissions: Vec<ElementaryFlowRow>,
    pub social_issues: Vec<ElementaryFlowRow>,
    pub economic_issues: Vec<ElementaryFlowRow>,

    pub database_input_parameters: Vec<InputParameterRow>,
    pub database_calculated_parameters: Vec<CalculatedParameterRow>,
    pub project_input_parameters: Vec<InputParameterRow>,
    pub project_calculated_parameters: Vec<CalculatedParameterRow>,

    pub processes: Vec<SectionBlock>,
    pub product_stages: Vec<SectionBlock>,
    pub methods: Vec<SectionBlock>,
    pub system_descriptions: Vec<SectionBlock>,
    pub literature_references: Vec<SectionBlock>,
}

impl CsvDataSet {
    pub fn new(header: CsvHeader) -> Self {
        CsvDataSet {
            header,
            ..Default::default()
        }
    }

    /// Collects a block stream. The first error aborts the collection.
    pub fn from_blocks<I>(header: CsvHeader, blocks: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Block>>,
    {
        let mut data = CsvDataSet::new(header);
        for block in blocks {
            data.push(block?);
        }
        Ok(data)
    }

    /// Reads every remaining block from `cursor` with the default readers.
    pub fn read(header: CsvHeader, cursor: &mut LineCursor<'_>) -> Result<Self> {
        Self::from_blocks(header, Dispatcher::new(cursor))
    }

    /// Appends the content of `block` to its category.
    pub fn push(&mut self, block: Block) {
        match block {
            Block::Quantities(rows) => self.quantities.extend(rows),
            Block::Units(rows) => self.units.extend(rows),
            Block::ElementaryFlows(flow_type, rows) => {
                self.elementary_flows_mut(flow_type).extend(rows)
            }
            Block::InputParameters(scope, rows) => self.input_parameters_mut(scope).extend(rows),
            Block::CalculatedParameters(scope, rows) => {
                self.calculated_parameters_mut(scope).extend(rows)
            }
            Block::Structured(block) => match block.kind {
                BlockKind::Process => self.processes.push(block),
                BlockKind::ProductStage => self.product_stages.push(block),
                BlockKind::Method => self.methods.push(block),
                BlockKind::SystemDescription => self.system_descriptions.push(block),
                BlockKind::LiteratureReference => self.literature_references.push(block),
                _ => {}
            },
        }
    }

    #[must_use]
    pub fn elementary_flows(&self, flow_type: ElementaryFlowType) -> &[ElementaryFlowRow] {
        match flow_type {
            ElementaryFlowType::RawMaterials => &self.raw_materials,
            ElementaryFlowType::AirborneEmissions => &self.airborne_emissions,
            ElementaryFlowType::WaterborneEmissions => &self.waterborne_emissions,
            ElementaryFlowType::FinalWasteFlows => &self.final_waste_flows,
            ElementaryFlowType::EmissionsToSoil => &self.emissions_to_soil,
            ElementaryFlowType::NonMaterialEmissions => &self.non_material_emissions,
            ElementaryFlowType::SocialIssues => &self.social_issues,
            ElementaryFlowType::EconomicIssues => &self.economic_issues,
        }
    }

    pub fn elementary_flows_mut(
        &mut self,
        flow_type: ElementaryFlowType,
    ) -> &mut Vec<ElementaryFlowRow> {
        match flow_type {
            ElementaryFlowType::RawMaterials => &mut self.raw_materials,
            ElementaryFlowType::AirborneEmissions => &mut self.airborne_emissions,
            ElementaryFlowType::WaterborneEmissions => &mut self.waterborne_emissions,
            ElementaryFlowType::FinalWasteFlows => &mut self.final_waste_flows,
            ElementaryFlowType::EmissionsToSoil => &mut self.emissions_to_soil,
            ElementaryFlowType::NonMaterialEmissions => &mut self.non_material_emissions,
            ElementaryFlowType::SocialIssues => &mut self.social_issues,
            ElementaryFlowType::EconomicIssues => &mut self.economic_issues,
        }
    }

    #[must_use]
    pub fn input_parameters(&self, scope: ParameterScope) -> &[InputParameterRow] {
        match scope {
            ParameterScope::Database => &self.database_input_parameters,
            ParameterScope::Project => &self.project_input_parameters,
        }
    }

    pub fn input_parameters_mut(&mut self, scope: ParameterScope) -> &mut Vec<InputParameterRow> {
        match scope {
            ParameterScope::Database => &mut self.database_input_parameters,
            ParameterScope::Project => &mut self.project_input_parameters,
        }
    }

    #[must_use]
    pub fn calculated_parameters(&self, scope: ParameterScope) -> &[CalculatedParameterRow] {
        match scope {
            ParameterScope::Database => &self.database_calculated_parameters,
            ParameterScope::Project => &self.project_calculated_parameters,
        }
    }

    pub fn calculated_parameters_mut(
        &mut self,
        scope: ParameterScope,
    ) -> &mut Vec<CalculatedParameterRow> {
        match scope {
            ParameterScope::Database => &mut self.database_calculated_parameters,
            ParameterScope::Project => &mut self.project_calculated_parameters,
        }
    }

    /// All structured blocks in category order.
    pub fn structured_blocks(&self) -> impl Iterator<Item = &SectionBlock> {
        self.processes
            .iter()
            .chain(&self.product_stages)
            .chain(&self.methods)
            .chain(&self.system_descriptions)
            .chain(&self.literature_references)
    }

    /// Returns `true` when the document holds no block at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
            && self.units.is_empty()
            && ElementaryFlowType::ALL
                .iter()
                .all(|t| self.elementary_flows(*t).is_empty())
            && [ParameterScope::Database, ParameterScope::Project]
                .iter()
                .all(|s| {
                    self.input_parameters(*s).is_empty()
                        && self.calculated_parameters(*s).is_empty()
                })
            && self.structured_blocks().next().is_none()
    }

    /// Writes the header, the non-empty row-list categories and then the
    /// structured blocks.
    ///
    /// The header is written with the buffer's dialect so that the separator
    /// entries always describe the lines that follow.
    pub fn write(&self, buffer: &mut CsvBuffer) {
        let header = if &self.header.dialect == buffer.dialect() {
            self.header.clone()
        } else {
            self.header.clone().with_dialect(buffer.dialect().clone())
        };
        buffer.write_header(&header);

        write_if_any(buffer, &BlockKind::Quantities, &self.quantities);
        write_if_any(buffer, &BlockKind::Units, &self.units);
        for flow_type in ElementaryFlowType::ALL {
            let kind = BlockKind::ElementaryFlows(flow_type);
            write_if_any(buffer, &kind, self.elementary_flows(flow_type));
        }
        for scope in [ParameterScope::Database, ParameterScope::Project] {
            let kind = BlockKind::InputParameters(scope);
            write_if_any(buffer, &kind, self.input_parameters(scope));
            let kind = BlockKind::CalculatedParameters(scope);
            write_if_any(buffer, &kind, self.calculated_parameters(scope));
        }

        for block in self.structured_blocks() {
            block.write(buffer);
        }
    }
}

fn write_if_any<T: crate::CsvRecord>(buffer: &mut CsvBuffer, kind: &BlockKind, rows: &[T]) {
    if !rows.is_empty() {
        write_row_list(buffer, kind, rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dialect, LineEnding, Section};

    fn sample() -> CsvDataSet {
        let mut data = CsvDataSet::new(CsvHeader::new("processes", Dialect::new(';', ',').unwrap()));
        data.quantities.push(QuantityRow {
            name: "Mass".into(),
            has_dimension: true,
        });
        data.airborne_emissions.push(ElementaryFlowRow {
            name: "Methane".into(),
            unit: "kg".into(),
            cas_number: "000074-82-8".into(),
            ..Default::default()
        });
        data.project_calculated_parameters.push(CalculatedParameterRow {
            name: "total".into(),
            expression: "a+b".into(),
            comment: String::new(),
        });
        data.processes.push(
            SectionBlock::new(BlockKind::Process)
                .with_section(Section::new("Type").with_line(&["System"])),
        );
        data
    }

    fn write(data: &CsvDataSet, dialect: Dialect) -> String {
        let mut buffer = CsvBuffer::new(dialect).with_line_ending(LineEnding::Lf);
        data.write(&mut buffer);
        buffer.into_string()
    }

    #[test]
    fn test_write_order_and_empty_categories() {
        let text = write(&sample(), Dialect::new(';', ',').unwrap());
        let quantities = text.find("Quantities\n").unwrap();
        let airborne = text.find("Airborne emissions\n").unwrap();
        let calculated = text.find("Project Calculated parameters\n").unwrap();
        let process = text.find("Process\n").unwrap();
        assert!(quantities < airborne && airborne < calculated && calculated < process);
        assert!(!text.contains("Units\n"));
        assert!(!text.contains("Raw materials"));
    }

    #[test]
    fn test_write_then_read() {
        let data = sample();
        let text = write(&data, data.header.dialect.clone());
        let reread = crate::from_str(&text).unwrap();
        assert_eq!(reread, data);
    }

    #[test]
    fn test_write_in_other_dialect_rewrites_header() {
        let data = sample();
        let text = write(&data, Dialect::new(',', '.').unwrap());
        assert!(text.contains("{CSV separator: Comma}"));
        assert!(text.contains("{Decimal separator: .}"));
        let reread = crate::from_str(&text).unwrap();
        assert_eq!(reread.header.dialect, Dialect::new(',', '.').unwrap());
        assert_eq!(reread.airborne_emissions, data.airborne_emissions);
    }

    #[test]
    fn test_push_appends_repeated_blocks() {
        let mut data = CsvDataSet::default();
        assert!(data.is_empty());
        data.push(Block::Units(vec![UnitRow::default()]));
        data.push(Block::Units(vec![UnitRow::default()]));
        assert_eq!(data.units.len(), 2);
        assert!(!data.is_empty());
    }
}
