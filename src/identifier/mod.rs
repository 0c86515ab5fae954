//! Structured IEC publication identifiers.
//!
//! An [`Identifier`] is the parsed form of a citation such as
//! `IEC TS 60034-16-3:1996` or `IEC 60050-102:2007/AMD1:2017`. It renders back
//! to the canonical string with [`Display`](std::fmt::Display) and supports
//! comparison modulo a set of excluded fields (see [`ExcludeSet`]).
//!
//! # Example
//!
//! ```
//! use iecref::identifier::{ExcludeSet, Identifier, MatchConfig};
//!
//! let query = Identifier::parse("IEC 61058-2-4:1995").unwrap();
//! let entry = Identifier::parse("IEC 61058-2-4:2003").unwrap();
//!
//! assert!(query.matches(&entry, ExcludeSet::YEAR, &MatchConfig::default()));
//! assert!(!query.matches(&entry, ExcludeSet::empty(), &MatchConfig::default()));
//! assert_eq!(entry.to_string(), "IEC 61058-2-4:2003");
//! ```

mod compare;
mod parse;

pub use compare::{ComparisonKey, ExcludeSet, MatchConfig, PartKey, PartSegment, StructuralKey};
pub use parse::IdentifierError;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deliverable types other than the International Standard.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocType {
    /// TS - Technical Specification
    TechnicalSpecification,
    /// TR - Technical Report
    TechnicalReport,
    /// PAS - Publicly Available Specification
    PubliclyAvailableSpecification,
    /// SRD - Systems Reference Deliverable
    SystemsReferenceDeliverable,
    /// TEC - Technology Report
    TechnologyReport,
    /// STTR - Standardization Roadmap
    StandardizationRoadmap,
    /// WP - White Paper
    WhitePaper,
    /// Guide
    Guide,
    /// OD - Operational Document
    OperationalDocument,
    /// CS - Conformity Assessment Scheme
    ConformityAssessmentScheme,
    /// CA - Conformity Assessment
    ConformityAssessment,
}

impl DocType {
    /// All deliverable types, in the order they are tried by the parser.
    pub const ALL: [DocType; 11] = [
        DocType::TechnicalSpecification,
        DocType::TechnicalReport,
        DocType::PubliclyAvailableSpecification,
        DocType::SystemsReferenceDeliverable,
        DocType::TechnologyReport,
        DocType::StandardizationRoadmap,
        DocType::WhitePaper,
        DocType::Guide,
        DocType::OperationalDocument,
        DocType::ConformityAssessmentScheme,
        DocType::ConformityAssessment,
    ];

    /// Convert an abbreviation (case-insensitive) to a [`DocType`].
    pub fn from_abbreviation(abbr: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.abbreviation().eq_ignore_ascii_case(abbr))
    }

    /// The abbreviation used in rendered identifiers.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            DocType::TechnicalSpecification => "TS",
            DocType::TechnicalReport => "TR",
            DocType::PubliclyAvailableSpecification => "PAS",
            DocType::SystemsReferenceDeliverable => "SRD",
            DocType::TechnologyReport => "TEC",
            DocType::StandardizationRoadmap => "STTR",
            DocType::WhitePaper => "WP",
            DocType::Guide => "Guide",
            DocType::OperationalDocument => "OD",
            DocType::ConformityAssessmentScheme => "CS",
            DocType::ConformityAssessment => "CA",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Kind of a stacked adjunct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjunctKind {
    Amendment,
    Corrigendum,
    InterpretationSheet,
}

impl AdjunctKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "AMD" => Some(AdjunctKind::Amendment),
            "COR" => Some(AdjunctKind::Corrigendum),
            "ISH" => Some(AdjunctKind::InterpretationSheet),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            AdjunctKind::Amendment => "AMD",
            AdjunctKind::Corrigendum => "COR",
            AdjunctKind::InterpretationSheet => "ISH",
        }
    }
}

/// An amendment, corrigendum or interpretation sheet applied to a base document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Adjunct {
    pub kind: AdjunctKind,
    pub number: u32,
    pub year: Option<i32>,
    pub month: Option<u8>,
    /// `true` for a consolidated edition (`+AMD1`), `false` for a separate
    /// adjunct (`/AMD1`).
    pub consolidated: bool,
}

impl fmt::Display for Adjunct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joiner = if self.consolidated { '+' } else { '/' };
        write!(f, "{joiner}{}{}", self.kind.as_tag(), self.number)?;
        write_date(f, self.year, self.month)
    }
}

/// A parsed IEC publication identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    /// Publisher prefix, e.g. `IEC`, `CISPR`, `ISO/IEC`
    pub publisher: CompactString,
    /// Deliverable type; `None` for an International Standard
    pub doc_type: Option<DocType>,
    /// Document number
    pub number: CompactString,
    /// Part, possibly compound (`2-1`)
    pub part: Option<CompactString>,
    /// Edition year
    pub year: Option<i32>,
    /// Edition month, only present together with a year
    pub month: Option<u8>,
    /// Stacked adjuncts in citation order
    pub adjuncts: Vec<Adjunct>,
    /// Delivery format suffix such as `CSV` or `RLV`
    pub deliverable: Option<CompactString>,
}

impl Identifier {
    /// Create an undated International Standard identifier.
    pub fn new(publisher: &str, number: &str) -> Self {
        Self {
            publisher: CompactString::from(publisher),
            doc_type: None,
            number: CompactString::from(number),
            part: None,
            year: None,
            month: None,
            adjuncts: Vec::new(),
            deliverable: None,
        }
    }

    #[must_use]
    pub fn with_part(mut self, part: &str) -> Self {
        self.part = Some(CompactString::from(part));
        self
    }

    #[must_use]
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    #[must_use]
    pub fn with_doc_type(mut self, doc_type: DocType) -> Self {
        self.doc_type = Some(doc_type);
        self
    }

    /// The same document without its edition date.
    #[must_use]
    pub fn without_year(&self) -> Self {
        Self {
            year: None,
            month: None,
            ..self.clone()
        }
    }

    /// The same document family without its part.
    #[must_use]
    pub fn without_part(&self) -> Self {
        Self {
            part: None,
            ..self.clone()
        }
    }

    pub fn part(&self) -> Option<&str> {
        self.part.as_deref().filter(|p| !p.is_empty())
    }

    /// Numeric sort key of the part, empty when the identifier has no part.
    pub fn part_key(&self) -> PartKey {
        PartKey::from_part(self.part())
    }

    /// Number with part, as in `60050-102`.
    pub fn number_with_part(&self) -> String {
        match self.part() {
            Some(part) => format!("{}-{}", self.number, part),
            None => self.number.to_string(),
        }
    }

    /// Render with the fields in `exclude` left out. `skip_publisher` drops
    /// the publisher token as well.
    pub(crate) fn render_with(&self, exclude: ExcludeSet, skip_publisher: bool) -> String {
        let mut out = String::new();
        if !skip_publisher {
            out.push_str(&self.publisher);
        }
        if !exclude.contains(ExcludeSet::TYPE) {
            if let Some(doc_type) = self.doc_type {
                push_token(&mut out, doc_type.abbreviation());
            }
        }
        push_token(&mut out, &self.number);
        if !exclude.contains(ExcludeSet::PART) {
            if let Some(part) = self.part() {
                out.push('-');
                out.push_str(part);
            }
        }
        if !exclude.contains(ExcludeSet::YEAR) {
            if let Some(year) = self.year {
                out.push_str(&format!(":{year}"));
                if let Some(month) = self.month {
                    out.push_str(&format!("-{month:02}"));
                }
            }
        }
        if !exclude.contains(ExcludeSet::ADJUNCTS) {
            for adjunct in &self.adjuncts {
                out.push_str(&adjunct.to_string());
            }
        }
        if !exclude.contains(ExcludeSet::DELIVERABLE) {
            if let Some(deliverable) = &self.deliverable {
                push_token(&mut out, deliverable);
            }
        }
        out
    }
}

fn push_token(out: &mut String, token: &str) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(token);
}

fn write_date(f: &mut fmt::Formatter<'_>, year: Option<i32>, month: Option<u8>) -> fmt::Result {
    if let Some(year) = year {
        write!(f, ":{year}")?;
        if let Some(month) = month {
            write!(f, "-{month:02}")?;
        }
    }
    Ok(())
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with(ExcludeSet::empty(), false))
    }
}

impl std::str::FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("TS", Some(DocType::TechnicalSpecification))]
    #[case("guide", Some(DocType::Guide))]
    #[case("sttr", Some(DocType::StandardizationRoadmap))]
    #[case("IS", None)]
    fn test_doc_type_from_abbreviation(#[case] abbr: &str, #[case] expected: Option<DocType>) {
        assert_eq!(DocType::from_abbreviation(abbr), expected);
    }

    #[test]
    fn test_builder_renders() {
        let id = Identifier::new("IEC", "61326")
            .with_part("2-1")
            .with_year(2020)
            .with_doc_type(DocType::TechnicalReport);
        assert_eq!(id.to_string(), "IEC TR 61326-2-1:2020");
        assert_eq!(id.number_with_part(), "61326-2-1");
    }

    #[test]
    fn test_projections_do_not_touch_original() {
        let id = Identifier::new("IEC", "80000").with_part("6").with_year(2008);
        assert_eq!(id.without_year().to_string(), "IEC 80000-6");
        assert_eq!(id.without_part().to_string(), "IEC 80000:2008");
        assert_eq!(id.to_string(), "IEC 80000-6:2008");
    }

    #[test]
    fn test_empty_part_is_no_part() {
        let mut id = Identifier::new("IEC", "80000");
        id.part = Some(CompactString::from(""));
        assert_eq!(id.part(), None);
        assert!(id.part_key().is_empty());
    }
}
