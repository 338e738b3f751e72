//! Uncertainty distribution records.
//!
//! An uncertainty record always spans [`UncertaintyRecord::WIDTH`] columns:
//!
//! ```text
//! <tag> ; <xsd> ; <min> ; <max>
//! ```
//!
//! | Tag | Parameters used |
//! |-----|-----------------|
//! | `Undefined` | none |
//! | `Lognormal` | `xsd`: squared geometric standard deviation |
//! | `Normal` | `xsd`: doubled standard deviation |
//! | `Triangle` | `min`, `max` |
//! | `Uniform` | `min`, `max` |
//!
//! Unused columns are written as `0` so that rows mixing distribution kinds keep
//! the same column layout.

use crate::{CsvBuffer, CsvLine, Error, Numeric, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A tagged statistical distribution attached to a numeric value.
///
/// # Examples
///
/// ```rust
/// use simapro_csv::{CsvLine, Numeric, UncertaintyRecord};
///
/// let line = CsvLine::of(&["Steel", "kg", "1", "Triangle", "0", "0.5", "2"]);
/// let u = UncertaintyRecord::read(&line, 3);
/// assert_eq!(u, UncertaintyRecord::Triangle {
///     min: Numeric::of(0.5),
///     max: Numeric::of(2.0),
/// });
/// ```
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum UncertaintyRecord {
    #[default]
    Undefined,
    LogNormal {
        xsd: Numeric,
    },
    Normal {
        xsd: Numeric,
    },
    Triangle {
        min: Numeric,
        max: Numeric,
    },
    Uniform {
        min: Numeric,
        max: Numeric,
    },
}

impl UncertaintyRecord {
    /// Number of columns every record occupies.
    pub const WIDTH: usize = 4;

    #[must_use]
    pub fn log_normal(xsd: impl Into<Numeric>) -> Self {
        UncertaintyRecord::LogNormal { xsd: xsd.into() }
    }

    #[must_use]
    pub fn normal(xsd: impl Into<Numeric>) -> Self {
        UncertaintyRecord::Normal { xsd: xsd.into() }
    }

    #[must_use]
    pub fn triangle(min: impl Into<Numeric>, max: impl Into<Numeric>) -> Self {
        UncertaintyRecord::Triangle {
            min: min.into(),
            max: max.into(),
        }
    }

    #[must_use]
    pub fn uniform(min: impl Into<Numeric>, max: impl Into<Numeric>) -> Self {
        UncertaintyRecord::Uniform {
            min: min.into(),
            max: max.into(),
        }
    }

    /// The tag written in the first column of the record.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            UncertaintyRecord::Undefined => "Undefined",
            UncertaintyRecord::LogNormal { .. } => "Lognormal",
            UncertaintyRecord::Normal { .. } => "Normal",
            UncertaintyRecord::Triangle { .. } => "Triangle",
            UncertaintyRecord::Uniform { .. } => "Uniform",
        }
    }

    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, UncertaintyRecord::Undefined)
    }

    /// Decodes the record starting at column `offset`.
    ///
    /// An unknown tag is logged and decodes as [`UncertaintyRecord::Undefined`],
    /// so a single bad value never invalidates the surrounding row.
    #[must_use]
    pub fn read(line: &CsvLine, offset: usize) -> Self {
        Self::try_read(line, offset).unwrap_or_else(|err| {
            warn!("{}; using an undefined distribution", err);
            UncertaintyRecord::Undefined
        })
    }

    /// Strict variant of [`read`](Self::read).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueDecode`] when the tag is not part of the vocabulary.
    pub fn try_read(line: &CsvLine, offset: usize) -> Result<Self> {
        let tag = line.get(offset);
        let record = match tag {
            "" | "Undefined" => UncertaintyRecord::Undefined,
            "Lognormal" => UncertaintyRecord::LogNormal {
                xsd: line.numeric(offset + 1),
            },
            "Normal" => UncertaintyRecord::Normal {
                xsd: line.numeric(offset + 1),
            },
            "Triangle" => UncertaintyRecord::Triangle {
                min: line.numeric(offset + 2),
                max: line.numeric(offset + 3),
            },
            "Uniform" => UncertaintyRecord::Uniform {
                min: line.numeric(offset + 2),
                max: line.numeric(offset + 3),
            },
            other => {
                return Err(Error::value_decode(
                    line.number(),
                    offset + 1,
                    &format!("unknown uncertainty distribution {:?}", other),
                ))
            }
        };
        Ok(record)
    }

    /// Appends the record's four columns to the current line of `buffer`.
    pub fn write(&self, buffer: &mut CsvBuffer) {
        let zero = Numeric::of(0.0);
        let (xsd, min, max) = match self {
            UncertaintyRecord::Undefined => (&zero, &zero, &zero),
            UncertaintyRecord::LogNormal { xsd } | UncertaintyRecord::Normal { xsd } => {
                (xsd, &zero, &zero)
            }
            UncertaintyRecord::Triangle { min, max } | UncertaintyRecord::Uniform { min, max } => {
                (&zero, min, max)
            }
        };
        buffer
            .put_str(self.tag())
            .put_numeric(xsd)
            .put_numeric(min)
            .put_numeric(max);
    }
}
