//! Reads a SimaPro CSV file and prints a summary of its blocks.
//!
//! Run with: cargo run --example read_file -- path/to/export.csv
//!
//! Without an argument a small built-in document is used. Set
//! `RUST_LOG=simapro_csv=debug` to see the dispatched blocks.

use simapro_csv::{
    from_str, read_path, to_string_with_options, CsvDataSet, LineEnding, WriteOptions,
};
use std::error::Error;
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = "\
{SimaPro 9.1}
{processes}
{CSV separator: Semicolon}
{Decimal separator: ,}

Process

Process name
Steel sheet

Type
Unit process

Materials/fuels
Steel;kg;1,02;Lognormal;1,07;0;0;(2,3,1,1,1) scrap included

End

Units
kg;Mass;1;kg

End

";

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let data: CsvDataSet = match std::env::args().nth(1) {
        Some(path) => read_path(path)?,
        None => from_str(SAMPLE)?,
    };

    println!(
        "SimaPro {} export ({}), delimiter {:?}, decimal separator {:?}",
        data.header.version,
        data.header.kind,
        data.header.dialect.delimiter,
        data.header.dialect.decimal_separator
    );
    println!("  quantities: {}", data.quantities.len());
    println!("  units: {}", data.units.len());
    println!(
        "  input parameters: {}",
        data.database_input_parameters.len() + data.project_input_parameters.len()
    );

    for process in &data.processes {
        let name = process.value("Process name").unwrap_or("<unnamed>");
        let kind = process
            .process_type()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("  process {:?} ({})", name, kind);
        for input in process.materials_and_fuels() {
            println!(
                "    {} {} {} {}",
                input.amount,
                input.unit,
                input.name,
                input.comment.pedigree.map(|p| p.to_string()).unwrap_or_default()
            );
        }
    }

    let options = WriteOptions::new().with_line_ending(LineEnding::Lf);
    let text = to_string_with_options(&data, &options)?;
    println!("\nRe-written document: {} lines", text.lines().count());

    Ok(())
}
