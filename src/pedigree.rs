//! Comments with an embedded pedigree score.
//!
//! SimaPro stores the data-quality (pedigree) matrix of an exchange inside its
//! comment, as a bracketed list of five scores at the start or the end of the
//! text:
//!
//! ```text
//! (2,3,1,2,1)
//! Measured at the plant, 2019
//! ```
//!
//! A trailing `,na` for the retired sample-size indicator is accepted on read.
//! [`Comment::parse`] splits the tag from the remaining text and
//! [`Comment::render`] composes them again, the tag on its own line first.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const TAG: &str =
    r"\(\s*([1-5])\s*,\s*([1-5])\s*,\s*([1-5])\s*,\s*([1-5])\s*,\s*([1-5])\s*(?:,\s*na\s*)?\)";

static LEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^\s*{}", TAG)).expect("valid pedigree pattern"));

static TRAILING: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"{}\s*$", TAG)).expect("valid pedigree pattern"));

/// The five pedigree scores, each in `1..=5`.
///
/// # Examples
///
/// ```rust
/// use simapro_csv::Pedigree;
///
/// let p = Pedigree::new([2, 3, 1, 2, 1]).unwrap();
/// assert_eq!(p.reliability(), 2);
/// assert_eq!(p.to_string(), "(2,3,1,2,1)");
/// assert!(Pedigree::new([0, 1, 1, 1, 1]).is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pedigree([u8; 5]);

impl Pedigree {
    /// Creates a score set, or `None` if a score is outside `1..=5`.
    #[must_use]
    pub fn new(scores: [u8; 5]) -> Option<Self> {
        scores
            .iter()
            .all(|s| (1..=5).contains(s))
            .then_some(Pedigree(scores))
    }

    #[must_use]
    pub fn scores(&self) -> [u8; 5] {
        self.0
    }

    #[must_use]
    pub fn reliability(&self) -> u8 {
        self.0[0]
    }

    #[must_use]
    pub fn completeness(&self) -> u8 {
        self.0[1]
    }

    #[must_use]
    pub fn temporal_correlation(&self) -> u8 {
        self.0[2]
    }

    #[must_use]
    pub fn geographical_correlation(&self) -> u8 {
        self.0[3]
    }

    #[must_use]
    pub fn technological_correlation(&self) -> u8 {
        self.0[4]
    }

    fn from_captures(caps: &regex::Captures<'_>) -> Option<Self> {
        let mut scores = [0u8; 5];
        for (i, score) in scores.iter_mut().enumerate() {
            *score = caps.get(i + 1)?.as_str().parse().ok()?;
        }
        Pedigree::new(scores)
    }
}

impl fmt::Display for Pedigree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e] = self.0;
        write!(f, "({},{},{},{},{})", a, b, c, d, e)
    }
}

/// A free-text comment with an optional pedigree tag split out.
///
/// # Examples
///
/// ```rust
/// use simapro_csv::{Comment, Pedigree};
///
/// let c = Comment::parse("estimate (1,2,3,4,5)");
/// assert_eq!(c.pedigree, Pedigree::new([1, 2, 3, 4, 5]));
/// assert_eq!(c.text, "estimate");
/// assert_eq!(c.render(), "(1,2,3,4,5)\nestimate");
///
/// // text without a tag is kept as it is
/// assert_eq!(Comment::parse(" plain ").render(), " plain ");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Comment {
    pub pedigree: Option<Pedigree>,
    pub text: String,
}

impl Comment {
    #[must_use]
    pub fn new(pedigree: Option<Pedigree>, text: impl Into<String>) -> Self {
        Comment {
            pedigree,
            text: text.into(),
        }
    }

    /// Splits a leading or trailing pedigree tag from `raw`. A leading tag wins
    /// when both are present.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some(caps) = LEADING.captures(raw) {
            if let (Some(pedigree), Some(m)) = (Pedigree::from_captures(&caps), caps.get(0)) {
                return Comment::new(Some(pedigree), raw[m.end()..].trim());
            }
        }
        if let Some(caps) = TRAILING.captures(raw) {
            if let (Some(pedigree), Some(m)) = (Pedigree::from_captures(&caps), caps.get(0)) {
                return Comment::new(Some(pedigree), raw[..m.start()].trim());
            }
        }
        Comment::new(None, raw)
    }

    /// Composes the field value: the tag on its own line before the text.
    #[must_use]
    pub fn render(&self) -> String {
        match (&self.pedigree, self.text.is_empty()) {
            (Some(p), true) => p.to_string(),
            (Some(p), false) => format!("{}\n{}", p, self.text),
            (None, _) => self.text.clone(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pedigree.is_none() && self.text.is_empty()
    }
}

impl From<&str> for Comment {
    fn from(raw: &str) -> Self {
        Comment::parse(raw)
    }
}
