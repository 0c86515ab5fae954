//! Bibliographic records produced by a [`Materializer`](crate::Materializer).
//!
//! The resolver only reads a few fields of a record (identifiers and the
//! published date) and derives two kinds of logical references from it: the
//! "all parts" reference of a document family and the undated "most recent"
//! reference.

use crate::regex::Regex;
use crate::utils::parse_partial_date;
use chrono::NaiveDate;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static URN_PART_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(urn:iec:std:[^:]+:[^:-]+)-\d+(?:-\d+)*").unwrap());

// The last date, the one closing the code or followed by the deliverable.
static CODE_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\d{4}(?:-\d{2})?(\s|$)").unwrap());

static CODE_PART_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d+(?:-\d+)*").unwrap());

const ALL_PARTS_SUFFIX: &str = " (all parts)";

// Positions in `urn:iec:std:<publisher>:<number>:<date>:<type>:<deliverable>:<language>`
const URN_DATE_FIELD: usize = 5;
const URN_DELIVERABLE_FIELD: usize = 7;
const URN_LANGUAGE_FIELD: usize = 8;

/// Scheme of a document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdKind {
    Iec,
    Urn,
    Other(CompactString),
}

/// A document identifier as carried by a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocIdentifier {
    pub content: String,
    pub kind: IdKind,
    pub primary: bool,
}

impl DocIdentifier {
    /// Primary identifier in the IEC scheme.
    pub fn primary_iec(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: IdKind::Iec,
            primary: true,
        }
    }

    pub fn urn(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: IdKind::Urn,
            primary: false,
        }
    }

    /// Drop the edition date, e.g. `IEC 60050-102:2007` to `IEC 60050-102`.
    ///
    /// In a code the last date goes, so `IEC 60027-1:1992/AMD1:1997` becomes
    /// `IEC 60027-1:1992/AMD1`. In a URN the date field is emptied and the
    /// fields after it keep their positions.
    pub fn remove_date(&mut self) {
        self.content = match self.kind {
            IdKind::Urn => {
                let mut fields = urn_fields(&self.content);
                if let Some(date) = fields.get_mut(URN_DATE_FIELD) {
                    *date = "";
                }
                fields.join(":")
            }
            _ => CODE_DATE_REGEX.replace(&self.content, "${1}").into_owned(),
        };
    }

    /// Drop the part number, e.g. `IEC 80000-6:2008` to `IEC 80000:2008`.
    pub fn remove_part(&mut self) {
        self.content = match self.kind {
            IdKind::Urn => URN_PART_REGEX.replace(&self.content, "${1}").into_owned(),
            _ => CODE_PART_REGEX.replace(&self.content, "").into_owned(),
        };
    }

    /// Turn the identifier into the identifier of the whole document family.
    pub fn to_all_parts(&mut self) {
        self.remove_part();
        self.remove_date();
        match self.kind {
            IdKind::Urn => {
                let mut fields = urn_fields(&self.content);
                if fields.len() <= URN_DELIVERABLE_FIELD {
                    fields.resize(URN_DELIVERABLE_FIELD + 1, "");
                }
                fields[URN_DELIVERABLE_FIELD] = "ser";
                // `...:::ser` rather than `...:::ser:` without a language
                if fields.len() == URN_LANGUAGE_FIELD + 1
                    && fields[URN_LANGUAGE_FIELD].is_empty()
                {
                    fields.pop();
                }
                self.content = fields.join(":");
            }
            IdKind::Iec => {
                if !self.content.contains(ALL_PARTS_SUFFIX) {
                    self.content.push_str(ALL_PARTS_SUFFIX);
                }
            }
            IdKind::Other(_) => {}
        }
    }
}

fn urn_fields(urn: &str) -> Vec<&str> {
    urn.split(':').collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitleType {
    Main,
    TitleIntro,
    TitleMain,
    TitlePart,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub kind: TitleType,
    pub content: String,
    pub language: Option<CompactString>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateType {
    Published,
    Issued,
    Updated,
    Stable,
    Other,
}

/// A typed date. The value is kept as written (`2011`, `2016-12`,
/// `2016-12-14`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibDate {
    pub kind: DateType,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationType {
    PartOf,
    InstanceOf,
    Obsoletes,
    Updates,
    Other(CompactString),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub kind: RelationType,
    pub record: Box<Record>,
}

/// A materialized bibliographic record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Identifiers; the first primary one is the display identifier
    pub docidentifiers: Vec<DocIdentifier>,
    pub titles: Vec<Title>,
    pub dates: Vec<BibDate>,
    /// Free-form reference, used by stub records
    pub formatted_ref: Option<String>,
    pub abstract_text: Option<String>,
    pub relations: Vec<Relation>,
    pub publisher: Option<String>,
    pub language: Vec<CompactString>,
    pub script: Vec<CompactString>,
    /// Source links
    pub source: Vec<String>,
    /// Set on records standing for every part of a document family
    pub all_parts: bool,
    /// Date the record was fetched
    pub fetched: Option<NaiveDate>,
}

impl Record {
    /// Minimal reference to a catalog entry that was not materialized.
    pub fn stub(code: &str) -> Self {
        Self {
            formatted_ref: Some(code.to_string()),
            docidentifiers: vec![DocIdentifier::primary_iec(code)],
            ..Default::default()
        }
    }

    /// The primary identifier, falling back to the first one.
    pub fn primary_identifier(&self) -> Option<&DocIdentifier> {
        self.docidentifiers
            .iter()
            .find(|d| d.primary)
            .or_else(|| self.docidentifiers.first())
    }

    /// The published date, if present and parseable.
    pub fn published_date(&self) -> Option<NaiveDate> {
        self.dates
            .iter()
            .find(|d| d.kind == DateType::Published)
            .and_then(|d| parse_partial_date(&d.value))
    }

    pub fn relations_of(&self, kind: &RelationType) -> impl Iterator<Item = &Record> {
        self.relations
            .iter()
            .filter(move |r| &r.kind == kind)
            .map(|r| r.record.as_ref())
    }

    /// Convert a part's record into the record of the whole family.
    ///
    /// Identifiers lose part and date, part titles and the abstract are
    /// dropped, and the main title is rebuilt from intro and main titles.
    #[must_use]
    pub fn to_all_parts(&self) -> Record {
        let mut all = self.clone();
        all.docidentifiers.iter_mut().for_each(DocIdentifier::to_all_parts);
        all.titles = rebuild_titles(&self.titles);
        all.abstract_text = None;
        all.relations.clear();
        all.all_parts = true;
        all
    }

    /// Convert into an undated reference pointing at this dated instance.
    #[must_use]
    pub fn to_most_recent_reference(self) -> Record {
        let instance = self.clone();
        let mut undated = self;
        undated.dates.clear();
        undated.abstract_text = None;
        undated.docidentifiers.iter_mut().for_each(DocIdentifier::remove_date);
        undated.relations.push(Relation {
            kind: RelationType::InstanceOf,
            record: Box::new(instance),
        });
        undated
    }
}

fn rebuild_titles(titles: &[Title]) -> Vec<Title> {
    let mut out: Vec<Title> = titles
        .iter()
        .filter(|t| t.kind != TitleType::TitlePart)
        .cloned()
        .collect();
    for title in out.iter_mut().filter(|t| t.kind == TitleType::Main) {
        let joined = titles
            .iter()
            .filter(|t| {
                matches!(t.kind, TitleType::TitleIntro | TitleType::TitleMain)
                    && t.language == title.language
            })
            .map(|t| t.content.as_str())
            .collect::<Vec<_>>()
            .join(" – ");
        if !joined.is_empty() {
            title.content = joined;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn title(kind: TitleType, content: &str) -> Title {
        Title {
            kind,
            content: content.to_string(),
            language: Some(CompactString::from("en")),
        }
    }

    fn part_record() -> Record {
        Record {
            docidentifiers: vec![
                DocIdentifier::primary_iec("IEC 80000-6:2008"),
                DocIdentifier::urn("urn:iec:std:iec:80000-6:2008:::"),
            ],
            titles: vec![
                title(TitleType::Main, "Quantities and units - Part 6: Electromagnetism"),
                title(TitleType::TitleMain, "Quantities and units"),
                title(TitleType::TitlePart, "Electromagnetism"),
            ],
            dates: vec![BibDate {
                kind: DateType::Published,
                value: "2008-03-12".to_string(),
            }],
            abstract_text: Some("Gives names and symbols".to_string()),
            ..Default::default()
        }
    }

    #[rstest]
    #[case(IdKind::Iec, "IEC 60050-102:2007", "IEC 60050-102")]
    #[case(IdKind::Iec, "IEC 62547:2013-10", "IEC 62547")]
    #[case(IdKind::Iec, "IEC 60027-1:1992/AMD1:1997", "IEC 60027-1:1992/AMD1")]
    #[case(IdKind::Iec, "CISPR 14-1:2005+AMD1:2008 CSV", "CISPR 14-1:2005+AMD1 CSV")]
    #[case(IdKind::Urn, "urn:iec:std:iec:60050-102:2007:::", "urn:iec:std:iec:60050-102::::")]
    #[case(IdKind::Urn, "urn:iec:std:iec:60050-102:2007:::::amd:1:2017", "urn:iec:std:iec:60050-102::::::amd:1:2017")]
    fn test_remove_date(#[case] kind: IdKind, #[case] input: &str, #[case] expected: &str) {
        let mut id = DocIdentifier {
            content: input.to_string(),
            kind,
            primary: true,
        };
        id.remove_date();
        assert_eq!(id.content, expected);
    }

    #[rstest]
    #[case(IdKind::Iec, "IEC 61326-2-1:2020", "IEC 61326:2020")]
    #[case(IdKind::Urn, "urn:iec:std:iec:61326-2-1:2020:::", "urn:iec:std:iec:61326:2020:::")]
    fn test_remove_part(#[case] kind: IdKind, #[case] input: &str, #[case] expected: &str) {
        let mut id = DocIdentifier {
            content: input.to_string(),
            kind,
            primary: true,
        };
        id.remove_part();
        assert_eq!(id.content, expected);
    }

    #[rstest]
    #[case("urn:iec:std:iec:60050-102:2007:::::amd:1:2017", "IEC 60050-102/AMD1:2017", None)]
    #[case(
        "urn:iec:std:iec:60034-1:1969::csv:en-fr:plus:amd:1:1977",
        "IEC 60034-1+AMD1:1977 CSV",
        Some("en-fr")
    )]
    fn test_undated_urn_reads_back(
        #[case] urn: &str,
        #[case] code: &str,
        #[case] language: Option<&str>,
    ) {
        let mut id = DocIdentifier::urn(urn);
        id.remove_date();
        let (actual, actual_language) = crate::urn::urn_to_code(&id.content).unwrap();
        assert_eq!(actual, code);
        assert_eq!(actual_language.as_deref(), language);
    }

    #[rstest]
    #[case("IEC 80000-1:2009", None, "urn:iec:std:iec:80000:::ser", "IEC 80000 SER")]
    #[case("IEC 80000-1:2009", Some("en"), "urn:iec:std:iec:80000:::ser:en", "IEC 80000 SER")]
    #[case(
        "IEC 80000-1:2009/AMD1:2011",
        Some("en"),
        "urn:iec:std:iec:80000:::ser:en::amd:1:2011",
        "IEC 80000/AMD1:2011 SER"
    )]
    fn test_all_parts_urn_reads_back(
        #[case] code: &str,
        #[case] language: Option<&str>,
        #[case] expected: &str,
        #[case] read_back: &str,
    ) {
        let mut id = DocIdentifier::urn(crate::urn::code_to_urn(code, language).unwrap());
        id.to_all_parts();
        assert_eq!(id.content, expected);
        let (actual, actual_language) = crate::urn::urn_to_code(&id.content).unwrap();
        assert_eq!(actual, read_back);
        assert_eq!(actual_language.as_deref(), language);
    }

    #[test]
    fn test_to_all_parts() {
        let all = part_record().to_all_parts();
        assert_eq!(all.docidentifiers[0].content, "IEC 80000 (all parts)");
        assert_eq!(all.docidentifiers[1].content, "urn:iec:std:iec:80000:::ser");
        assert!(all.all_parts);
        assert_eq!(all.abstract_text, None);
        assert_eq!(all.titles.len(), 2);
        assert_eq!(all.titles[0].content, "Quantities and units");
    }

    #[test]
    fn test_to_all_parts_is_idempotent_on_identifiers() {
        let twice = part_record().to_all_parts().to_all_parts();
        assert_eq!(twice.docidentifiers[0].content, "IEC 80000 (all parts)");
        assert_eq!(twice.docidentifiers[1].content, "urn:iec:std:iec:80000:::ser");
    }

    #[test]
    fn test_to_most_recent_reference() {
        let undated = part_record().to_most_recent_reference();
        assert_eq!(undated.docidentifiers[0].content, "IEC 80000-6");
        assert!(undated.dates.is_empty());
        let instances: Vec<_> = undated.relations_of(&RelationType::InstanceOf).collect();
        assert_eq!(instances.len(), 1);
        assert_eq!(
            instances[0].primary_identifier().unwrap().content,
            "IEC 80000-6:2008"
        );
    }

    #[test]
    fn test_published_date() {
        assert_eq!(
            part_record().published_date(),
            NaiveDate::from_ymd_opt(2008, 3, 12)
        );
        assert_eq!(Record::stub("IEC 80000-1:2009").published_date(), None);
    }

    #[test]
    fn test_stub() {
        let stub = Record::stub("IEC 80000-13:2008");
        assert_eq!(stub.formatted_ref.as_deref(), Some("IEC 80000-13:2008"));
        assert_eq!(stub.primary_identifier().unwrap().kind, IdKind::Iec);
    }
}
