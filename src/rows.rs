//! Row records of the row-list blocks.
//!
//! Each row is decoded from exactly one [`CsvLine`] with a fixed, positional
//! field layout and is never changed afterwards. Rows are plain structs: build
//! them with struct literals (all of them implement `Default`).
//!
//! | Row | Layout |
//! |-----|--------|
//! | [`QuantityRow`] | name, has dimension |
//! | [`UnitRow`] | name, quantity, conversion factor, reference unit |
//! | [`ElementaryFlowRow`] | name, unit, CAS number, comment, platform ID |
//! | [`InputParameterRow`] | name, value, uncertainty (4 columns), hidden, comment |
//! | [`CalculatedParameterRow`] | name, expression, comment |
//! | [`ProductExchangeRow`] | name, unit, amount, uncertainty (4 columns), comment |

use crate::{Comment, CsvBuffer, CsvLine, Numeric, UncertaintyRecord};
use serde::{Deserialize, Serialize};

/// A record that is read from and written to a single line.
pub trait CsvRecord: Sized {
    fn read(line: &CsvLine) -> Self;

    /// Appends the record's fields and flushes the line.
    fn write(&self, buffer: &mut CsvBuffer);
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct QuantityRow {
    pub name: String,
    pub has_dimension: bool,
}

impl CsvRecord for QuantityRow {
    fn read(line: &CsvLine) -> Self {
        QuantityRow {
            name: line.string(0),
            has_dimension: line.boolean(1),
        }
    }

    fn write(&self, buffer: &mut CsvBuffer) {
        buffer.put_str(&self.name).put_bool(self.has_dimension).writeln();
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct UnitRow {
    pub name: String,
    pub quantity: String,
    pub conversion_factor: f64,
    pub reference_unit: String,
}

impl CsvRecord for UnitRow {
    fn read(line: &CsvLine) -> Self {
        UnitRow {
            name: line.string(0),
            quantity: line.string(1),
            conversion_factor: line.double(2),
            reference_unit: line.string(3),
        }
    }

    fn write(&self, buffer: &mut CsvBuffer) {
        buffer
            .put_str(&self.name)
            .put_str(&self.quantity)
            .put_double(self.conversion_factor)
            .put_str(&self.reference_unit)
            .writeln();
    }
}

/// A substance of one of the elementary-flow families (raw materials,
/// emissions, waste flows and so on).
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementaryFlowRow {
    pub name: String,
    pub unit: String,
    pub cas_number: String,
    pub comment: String,
    pub platform_id: Option<String>,
}

impl CsvRecord for ElementaryFlowRow {
    fn read(line: &CsvLine) -> Self {
        ElementaryFlowRow {
            name: line.string(0),
            unit: line.string(1),
            cas_number: line.string(2),
            comment: line.string(3),
            platform_id: line.optional(4),
        }
    }

    fn write(&self, buffer: &mut CsvBuffer) {
        buffer
            .put_str(&self.name)
            .put_str(&self.unit)
            .put_str(&self.cas_number)
            .put_str(&self.comment);
        if let Some(id) = &self.platform_id {
            buffer.put_str(id);
        }
        buffer.writeln();
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct InputParameterRow {
    pub name: String,
    pub value: Numeric,
    pub uncertainty: UncertaintyRecord,
    pub is_hidden: bool,
    pub comment: String,
}

impl CsvRecord for InputParameterRow {
    fn read(line: &CsvLine) -> Self {
        InputParameterRow {
            name: line.string(0),
            value: line.numeric(1),
            uncertainty: UncertaintyRecord::read(line, 2),
            is_hidden: line.boolean(6),
            comment: line.string(7),
        }
    }

    fn write(&self, buffer: &mut CsvBuffer) {
        buffer
            .put_str(&self.name)
            .put_numeric(&self.value)
            .put_uncertainty(&self.uncertainty)
            .put_bool(self.is_hidden)
            .put_str(&self.comment)
            .writeln();
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculatedParameterRow {
    pub name: String,
    pub expression: String,
    pub comment: String,
}

impl CsvRecord for CalculatedParameterRow {
    fn read(line: &CsvLine) -> Self {
        CalculatedParameterRow {
            name: line.string(0),
            expression: line.string(1),
            comment: line.string(2),
        }
    }

    fn write(&self, buffer: &mut CsvBuffer) {
        buffer
            .put_str(&self.name)
            .put_str(&self.expression)
            .put_str(&self.comment)
            .writeln();
    }
}

/// An exchange row with amount, uncertainty and a pedigree-carrying comment,
/// as used in the product and input sections of processes.
///
/// # Examples
///
/// ```rust
/// use simapro_csv::{CsvLine, CsvRecord, Pedigree, ProductExchangeRow, UncertaintyRecord};
///
/// let line = CsvLine::of(&[
///     "Electricity", "kWh", "2*load", "Lognormal", "1.1", "0", "0", "(1,2,1,1,3) metered",
/// ]);
/// let row = ProductExchangeRow::read(&line);
///
/// assert_eq!(row.amount.as_formula(), Some("2*load"));
/// assert_eq!(row.uncertainty, UncertaintyRecord::log_normal(1.1));
/// assert_eq!(row.comment.pedigree, Pedigree::new([1, 2, 1, 1, 3]));
/// assert_eq!(row.comment.text, "metered");
/// ```
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductExchangeRow {
    pub name: String,
    pub unit: String,
    pub amount: Numeric,
    pub uncertainty: UncertaintyRecord,
    pub comment: Comment,
}

impl CsvRecord for ProductExchangeRow {
    fn read(line: &CsvLine) -> Self {
        ProductExchangeRow {
            name: line.string(0),
            unit: line.string(1),
            amount: line.numeric(2),
            uncertainty: UncertaintyRecord::read(line, 3),
            comment: Comment::parse(line.get(3 + UncertaintyRecord::WIDTH)),
        }
    }

    fn write(&self, buffer: &mut CsvBuffer) {
        buffer
            .put_str(&self.name)
            .put_str(&self.unit)
            .put_numeric(&self.amount)
            .put_uncertainty(&self.uncertainty)
            .put_comment(&self.comment)
            .writeln();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tokenize, Dialect, LineEnding, Pedigree};

    fn reread<T: CsvRecord>(row: &T, dialect: &Dialect) -> T {
        let mut buffer = CsvBuffer::new(dialect.clone()).with_line_ending(LineEnding::Lf);
        row.write(&mut buffer);
        let text = buffer.into_string();
        let line = tokenize(text.trim_end_matches('\n'), 1, dialect).unwrap();
        T::read(&line)
    }

    #[test]
    fn test_quantity_row() {
        let line = CsvLine::of(&["Mass", "Yes"]);
        let row = QuantityRow::read(&line);
        assert_eq!(row.name, "Mass");
        assert!(row.has_dimension);
    }

    #[test]
    fn test_unit_row_with_comma_decimal() {
        let dialect = Dialect::new(';', ',').unwrap();
        let line = tokenize("g;Mass;0,001;kg", 1, &dialect).unwrap();
        let row = UnitRow::read(&line);
        assert_eq!(row.conversion_factor, 0.001);
        assert_eq!(row.reference_unit, "kg");
        assert_eq!(reread(&row, &dialect), row);
    }

    #[test]
    fn test_elementary_flow_row() {
        let line = CsvLine::of(&["Carbon dioxide, fossil", "kg", "000124-38-9", "", ""]);
        let row = ElementaryFlowRow::read(&line);
        assert_eq!(row.cas_number, "000124-38-9");
        assert_eq!(row.platform_id, None);
        assert_eq!(reread(&row, &Dialect::default()), row);
    }

    #[test]
    fn test_input_parameter_row() {
        let dialect = Dialect::new(';', ',').unwrap();
        let line = tokenize("density;7,85;Normal;0,2;0;0;Yes;steel density", 3, &dialect).unwrap();
        let row = InputParameterRow::read(&line);
        assert_eq!(row.value, Numeric::of(7.85));
        assert_eq!(row.uncertainty, UncertaintyRecord::normal(0.2));
        assert!(row.is_hidden);
        assert_eq!(row.comment, "steel density");
        assert_eq!(reread(&row, &dialect), row);
    }

    #[test]
    fn test_calculated_parameter_row() {
        let line = CsvLine::of(&["mass", "density*volume", "derived"]);
        let row = CalculatedParameterRow::read(&line);
        assert_eq!(row.expression, "density*volume");
        assert_eq!(reread(&row, &Dialect::default()), row);
    }

    #[test]
    fn test_product_exchange_row_roundtrip() {
        let row = ProductExchangeRow {
            name: "Steel; hot rolled".to_string(),
            unit: "kg".to_string(),
            amount: Numeric::of(1.25),
            uncertainty: UncertaintyRecord::triangle(1.0, 1.5),
            comment: Comment::new(Pedigree::new([2, 2, 1, 3, 1]), "from supplier"),
        };
        let dialect = Dialect::new(';', ',').unwrap();
        assert_eq!(reread(&row, &dialect), row);
    }
}
