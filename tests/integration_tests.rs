//! Whole-document tests: reading, writing and re-reading complete files.

use simapro_csv::{
    for_each_block, from_reader, from_str, read_path, read_path_with_options, to_string_with_options,
    write_path, write_path_with_options, Block, BlockKind, BlockReader, CsvDataSet, Dialect,
    Dispatcher, ElementaryFlowType, LineCursor, LineEnding, Numeric, ParameterScope, Pedigree,
    ProcessType, ReadOptions, Result, SectionReader, UncertaintyRecord, WriteOptions,
};
use std::cell::RefCell;
use std::io::Write;
use tempfile::NamedTempFile;

const DOCUMENT: &str = "\
{SimaPro 9.1.1.1}
{processes}
{Date: 17.03.2021}
{Time: 10:09:18}
{Project: Steel products}
{CSV Format version: 9.0.0}
{CSV separator: Semicolon}
{Decimal separator: ,}
{Date separator: .}
{Short date format: dd.MM.yyyy}
{Export platform IDs: No}
{Skip empty fields: No}
{Convert expressions to constants: No}
{Selection: Selection (1)}
{Related objects(system descriptions, substances, units, etc.): Yes}
{Include sub product stages and processes: No}
{Open library: 'Methods'}

Process

Category type
material

Process identifier
DefaultX25250700002

Type
Unit process

Process name
Steel sheet, cold rolled

Products
Steel sheet, cold rolled;t;0,5;Normal;0,02;0;0;per batch (1,1,1,1,1)

Avoided products
Scrap steel;kg;12,5;Uniform;0;10;15;

Materials/fuels
Steel, low-alloyed;kg;1,02;Lognormal;1,07;0;0;(2,3,1,1,1,na) scrap included
Lubricant;kg;0,004*lube_factor;Undefined;0;0;0;

Electricity/heat
Electricity, medium voltage;kWh;0,35;Triangle;0;0,3;0,4;metered (1,1,2,1,1)

Emissions to air
Carbon dioxide, fossil;;kg;0,12;Undefined;0;0;0;

End

Literature reference

Name
Ecoinvent 3

Description
Long text\u{7F}on two lines

End

Quantities
Mass;Yes
Energy;Yes

End

Units
kg;Mass;1;kg
g;Mass;0,001;kg

End

Airborne emissions
Carbon dioxide, fossil;kg;000124-38-9;
Methane, biogenic;kg;000074-82-8;Renewable

End

Social issues
Child labour;h;;

End

Database Input parameters
lube_factor;1,5;Uniform;0;1;2;No;lubricant share

End

Project Calculated parameters
total_mass;lube_factor*2;

End

";

fn document() -> CsvDataSet {
    from_str(DOCUMENT).unwrap()
}

fn lf() -> WriteOptions {
    WriteOptions::new().with_line_ending(LineEnding::Lf)
}

#[test]
fn test_header_values() {
    let data = document();
    assert_eq!(data.header.version, "9.1.1.1");
    assert_eq!(data.header.project(), Some("Steel products"));
    assert_eq!(data.header.dialect, Dialect::new(';', ',').unwrap());
    assert_eq!(
        data.header.date(),
        chrono::NaiveDate::from_ymd_opt(2021, 3, 17)
    );
}

#[test]
fn test_row_list_blocks() {
    let data = document();
    assert_eq!(data.quantities.len(), 2);
    assert_eq!(data.units[1].conversion_factor, 0.001);
    assert_eq!(data.airborne_emissions[1].comment, "Renewable");
    assert_eq!(
        data.elementary_flows(ElementaryFlowType::SocialIssues)[0].name,
        "Child labour"
    );

    let param = &data.input_parameters(ParameterScope::Database)[0];
    assert_eq!(param.value, Numeric::of(1.5));
    assert_eq!(param.uncertainty, UncertaintyRecord::uniform(1.0, 2.0));
    assert!(!param.is_hidden);
    assert_eq!(data.project_calculated_parameters[0].expression, "lube_factor*2");
}

#[test]
fn test_process_block() {
    let data = document();
    assert_eq!(data.processes.len(), 1);
    let process = &data.processes[0];
    assert_eq!(process.value("Process name"), Some("Steel sheet, cold rolled"));
    assert_eq!(process.process_type(), Some(ProcessType::UnitProcess));

    let materials = process.materials_and_fuels();
    assert_eq!(materials.len(), 2);
    assert_eq!(materials[0].uncertainty, UncertaintyRecord::log_normal(1.07));
    assert_eq!(materials[0].comment.pedigree, Pedigree::new([2, 3, 1, 1, 1]));
    assert_eq!(materials[0].comment.text, "scrap included");
    assert_eq!(materials[1].amount.as_formula(), Some("0,004*lube_factor"));

    let energy = process.electricity_and_heat();
    assert_eq!(energy[0].uncertainty, UncertaintyRecord::triangle(0.3, 0.4));
    assert_eq!(energy[0].comment.pedigree, Pedigree::new([1, 1, 2, 1, 1]));
    assert_eq!(energy[0].comment.text, "metered");

    // "Emissions to air" inside a process is a section, not a top-level block
    assert!(process.section("Emissions to air").is_some());
}

#[test]
fn test_literature_reference_keeps_line_breaks() {
    let data = document();
    let reference = &data.literature_references[0];
    assert_eq!(reference.value("Name"), Some("Ecoinvent 3"));
    assert_eq!(reference.value("Description"), Some("Long text\non two lines"));
}

#[test]
fn test_roundtrip_same_dialect() {
    let data = document();
    let text = to_string_with_options(&data, &lf()).unwrap();
    assert!(text.contains("Long text\u{7F}on two lines"));
    assert_eq!(from_str(&text).unwrap(), data);
}

#[test]
fn test_roundtrip_other_dialect_converts_row_numbers() {
    let data = document();
    let options = lf().with_dialect(Dialect::new('\t', '.').unwrap());
    let text = to_string_with_options(&data, &options).unwrap();
    assert!(text.contains("{CSV separator: Tab}"));
    assert!(text.contains("g\tMass\t0.001\tkg"));
    assert!(text.contains("Steel, low-alloyed\tkg\t1.02\tLognormal\t1.07\t0\t0\t"));

    let reread = from_str(&text).unwrap();
    assert_eq!(reread.units, data.units);
    assert_eq!(reread.database_input_parameters, data.database_input_parameters);
    assert_eq!(
        reread.processes[0].materials_and_fuels(),
        data.processes[0].materials_and_fuels()
    );
}

fn assert_same_values(reread: &CsvDataSet, data: &CsvDataSet) {
    assert_eq!(reread.header.date(), data.header.date());
    assert_eq!(reread.quantities, data.quantities);
    assert_eq!(reread.units, data.units);
    for flow_type in ElementaryFlowType::ALL {
        assert_eq!(
            reread.elementary_flows(flow_type),
            data.elementary_flows(flow_type)
        );
    }
    for scope in [ParameterScope::Database, ParameterScope::Project] {
        assert_eq!(reread.input_parameters(scope), data.input_parameters(scope));
        assert_eq!(
            reread.calculated_parameters(scope),
            data.calculated_parameters(scope)
        );
    }

    assert_eq!(reread.processes.len(), data.processes.len());
    for (again, process) in reread.processes.iter().zip(&data.processes) {
        assert_eq!(again.value("Process name"), process.value("Process name"));
        assert_eq!(again.process_type(), process.process_type());
        assert_eq!(again.products(), process.products());
        assert_eq!(again.avoided_products(), process.avoided_products());
        assert_eq!(again.materials_and_fuels(), process.materials_and_fuels());
        assert_eq!(again.electricity_and_heat(), process.electricity_and_heat());
    }
    assert_eq!(
        reread.literature_references[0].value("Description"),
        data.literature_references[0].value("Description")
    );
}

#[test]
fn test_roundtrip_in_every_dialect_keeps_values() {
    let data = document();
    assert_eq!(data.processes[0].products()[0].amount, Numeric::of(0.5));
    assert_eq!(
        data.processes[0].avoided_products()[0].uncertainty,
        UncertaintyRecord::uniform(10.0, 15.0)
    );

    for (delimiter, decimal) in [(';', '.'), (';', ','), (',', '.'), ('\t', ',')] {
        let dialect = Dialect::new(delimiter, decimal).unwrap();
        let text = to_string_with_options(&data, &lf().with_dialect(dialect.clone())).unwrap();
        let reread = from_str(&text).unwrap();
        assert_eq!(reread.header.dialect, dialect);
        assert_same_values(&reread, &data);

        // a second pass from the rewritten document is stable
        let again = to_string_with_options(&reread, &lf()).unwrap();
        assert_eq!(again, text);
    }
}

#[test]
fn test_rewrite_keeps_header_date_readable() {
    let text = DOCUMENT
        .replace("{Date: 17.03.2021}", "{Date: 2021-03-17}")
        .replace("{Date separator: .}", "{Date separator: -}")
        .replace("{Short date format: dd.MM.yyyy}", "{Short date format: yyyy-MM-dd}");
    let data = from_str(&text).unwrap();
    assert_eq!(data.header.date(), chrono::NaiveDate::from_ymd_opt(2021, 3, 17));

    let options = lf().with_dialect(Dialect::new(',', '.').unwrap());
    let reread = from_str(&to_string_with_options(&data, &options).unwrap()).unwrap();
    assert_eq!(reread.header.get("Date"), Some("17.03.2021"));
    assert_eq!(reread.header.date(), data.header.date());
}

#[test]
fn test_path_roundtrip() {
    let data = document();
    let file = NamedTempFile::new().unwrap();
    write_path(file.path(), &data).unwrap();

    let bytes = std::fs::read(file.path()).unwrap();
    assert!(bytes.windows(2).any(|w| w == b"\r\n"));
    assert_eq!(read_path(file.path()).unwrap(), data);
}

#[test]
fn test_utf8_file_with_read_options() {
    let mut data = document();
    data.units[0].quantity = "Masse \u{2013} trocken".to_string();
    let file = NamedTempFile::new().unwrap();
    let options = WriteOptions::new().with_charset(encoding_rs::UTF_8);
    write_path_with_options(file.path(), &data, &options).unwrap();

    let read_options = ReadOptions::new().with_charset(encoding_rs::UTF_8);
    let reread = read_path_with_options(file.path(), &read_options).unwrap();
    assert_eq!(reread.units[0].quantity, "Masse \u{2013} trocken");
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_path(dir.path().join("missing.csv")).unwrap_err();
    assert!(matches!(err, simapro_csv::Error::Io(_)));
}

#[test]
fn test_for_each_block_streams_in_source_order() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(DOCUMENT.as_bytes()).unwrap();
    file.flush().unwrap();

    let mut kinds = Vec::new();
    let header = for_each_block(file.path(), |block| kinds.push(block.kind())).unwrap();
    assert_eq!(header.kind, "processes");
    assert_eq!(
        kinds,
        vec![
            BlockKind::Process,
            BlockKind::LiteratureReference,
            BlockKind::Quantities,
            BlockKind::Units,
            BlockKind::ElementaryFlows(ElementaryFlowType::AirborneEmissions),
            BlockKind::ElementaryFlows(ElementaryFlowType::SocialIssues),
            BlockKind::InputParameters(ParameterScope::Database),
            BlockKind::CalculatedParameters(ParameterScope::Project),
        ]
    );
}

#[test]
fn test_windows_1252_reader() {
    let mut bytes = b"{SimaPro 9}\r\n{CSV separator: Semicolon}\r\n\r\nRaw materials\r\n".to_vec();
    bytes.extend_from_slice(b"Wasser, S\xFC\xDFwasser;m3;;\r\n\r\nEnd\r\n");
    let data = from_reader(bytes.as_slice()).unwrap();
    assert_eq!(data.raw_materials[0].name, "Wasser, S\u{FC}\u{DF}wasser");
}

/// Records the process names it sees and then defers to the section reader.
struct ProcessNames<'r>(&'r RefCell<Vec<String>>);

impl BlockReader for ProcessNames<'_> {
    fn read_block(&self, kind: &BlockKind, cursor: &mut LineCursor<'_>) -> Result<Block> {
        let block = SectionReader.read_block(kind, cursor)?;
        if let Block::Structured(section_block) = &block {
            if let Some(name) = section_block.value("Process name") {
                self.0.borrow_mut().push(name.to_string());
            }
        }
        Ok(block)
    }
}

#[test]
fn test_custom_reader_in_document_read() {
    let names = RefCell::new(Vec::new());
    let mut source = simapro_csv::LineSource::from_str(DOCUMENT);
    let header = simapro_csv::CsvHeader::peek(&mut source, 64).unwrap();
    let mut cursor = LineCursor::new(source, header.dialect.clone());
    let dispatcher = Dispatcher::new(&mut cursor)
        .with_reader(BlockKind::Process, Box::new(ProcessNames(&names)));
    let data = CsvDataSet::from_blocks(header, dispatcher).unwrap();

    assert_eq!(names.into_inner(), ["Steel sheet, cold rolled"]);
    assert_eq!(data, document());
}

#[test]
fn test_serde_json_smoke() {
    let data = document();
    let json = serde_json::to_string(&data).unwrap();
    let back: CsvDataSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back.header, data.header);
    assert_eq!(back.processes, data.processes);
    assert_eq!(back.quantities, data.quantities);
    assert_eq!(back.units.len(), data.units.len());
}

#[test]
fn test_tracing_subscriber_does_not_change_results() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("simapro_csv=trace"))
        .with_test_writer()
        .finish();
    let data = tracing::subscriber::with_default(subscriber, document);
    assert_eq!(data, document());
}
