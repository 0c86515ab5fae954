//! Citation text to [`Identifier`].
//!
//! Input is normalized to upper case before matching, so `iec ts 62443-2-1`
//! and `IEC TS 62443-2-1` parse to the same identifier.

use super::{Adjunct, AdjunctKind, DocType, Identifier};
use crate::regex::Regex;
use compact_str::CompactString;
use std::sync::LazyLock;
use thiserror::Error;

static IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<publisher>[A-Z]+(?:/[A-Z]+)*)",
        r"\s+(?:(?P<type>TS|TR|PAS|SRD|TEC|STTR|WP|GUIDE|OD|CS|CA)\s+)?",
        r"(?P<number>\d+)",
        r"(?:-(?P<part>[0-9A-Z]+(?:-[0-9A-Z]+)*))?",
        r"(?::(?P<year>\d{4})(?:-(?P<month>\d{2}))?)?",
        r"(?P<adjuncts>(?:\s?[/+]\s?(?:AMD|COR|ISH)\s?\d+(?::\d{4}(?:-\d{2})?)?)*)",
        r"(?:\s+(?P<deliverable>CSV|RLV|CMV|EXV|PRV|SER|DB))?$",
    ))
    .unwrap()
});

static ADJUNCT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<joiner>[/+])\s?(?P<kind>AMD|COR|ISH)\s?(?P<number>\d+)(?::(?P<year>\d{4})(?:-(?P<month>\d{2}))?)?",
    )
    .unwrap()
});

/// Errors raised while parsing a citation into an [`Identifier`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Empty identifier")]
    Empty,

    #[error("Unable to parse identifier `{0}`")]
    Unparsable(String),

    #[error("Invalid field value: {field} - {message}")]
    InvalidFieldValue { field: &'static str, message: String },
}

impl Identifier {
    /// Parse a citation code such as `IEC 60050-102:2007/AMD1:2017`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the text does not follow the IEC
    /// identifier grammar.
    pub fn parse(text: &str) -> Result<Self, IdentifierError> {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            return Err(IdentifierError::Empty);
        }
        let upper = normalized.to_ascii_uppercase();

        let caps = IDENTIFIER_REGEX
            .captures(&upper)
            .ok_or_else(|| IdentifierError::Unparsable(text.trim().to_string()))?;

        let doc_type = caps
            .name("type")
            .and_then(|m| DocType::from_abbreviation(m.as_str()));
        let year = caps
            .name("year")
            .map(|m| parse_number::<i32>("year", m.as_str()))
            .transpose()?;
        let month = caps
            .name("month")
            .map(|m| parse_month(m.as_str()))
            .transpose()?;
        let adjuncts = caps
            .name("adjuncts")
            .map(|m| parse_adjuncts(m.as_str()))
            .transpose()?
            .unwrap_or_default();

        Ok(Identifier {
            publisher: CompactString::from(&caps["publisher"]),
            doc_type,
            number: CompactString::from(&caps["number"]),
            part: caps.name("part").map(|m| CompactString::from(m.as_str())),
            year,
            month,
            adjuncts,
            deliverable: caps
                .name("deliverable")
                .map(|m| CompactString::from(m.as_str())),
        })
    }
}

fn parse_adjuncts(text: &str) -> Result<Vec<Adjunct>, IdentifierError> {
    ADJUNCT_REGEX
        .captures_iter(text)
        .map(|caps| {
            let kind = AdjunctKind::from_tag(&caps["kind"]).ok_or_else(|| {
                IdentifierError::InvalidFieldValue {
                    field: "adjunct",
                    message: caps["kind"].to_string(),
                }
            })?;
            Ok(Adjunct {
                kind,
                number: parse_number("adjunct number", &caps["number"])?,
                year: caps
                    .name("year")
                    .map(|m| parse_number("adjunct year", m.as_str()))
                    .transpose()?,
                month: caps
                    .name("month")
                    .map(|m| parse_month(m.as_str()))
                    .transpose()?,
                consolidated: &caps["joiner"] == "+",
            })
        })
        .collect()
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, IdentifierError> {
    value
        .parse()
        .map_err(|_| IdentifierError::InvalidFieldValue {
            field,
            message: value.to_string(),
        })
}

fn parse_month(value: &str) -> Result<u8, IdentifierError> {
    let month: u8 = parse_number("month", value)?;
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(IdentifierError::InvalidFieldValue {
            field: "month",
            message: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("IEC 60050-102:2007", "IEC 60050-102:2007")]
    #[case("iec 60050-102:2007", "IEC 60050-102:2007")]
    #[case("IEC TS 60034-16-3:1996", "IEC TS 60034-16-3:1996")]
    #[case("IEC 60050-102:2007/Amd1:2017", "IEC 60050-102:2007/AMD1:2017")]
    #[case(
        "IEC 60034-1:1969+AMD1:1977+AMD2:1979+AMD3:1980 CSV",
        "IEC 60034-1:1969+AMD1:1977+AMD2:1979+AMD3:1980 CSV"
    )]
    #[case("CISPR 32:2015", "CISPR 32:2015")]
    #[case("IEC PAS 62596", "IEC PAS 62596")]
    #[case("IEC 61360-4 DB", "IEC 61360-4 DB")]
    #[case("IEC Guide 107:2014", "IEC Guide 107:2014")]
    #[case("ISO/IEC 61326-1:2020", "ISO/IEC 61326-1:2020")]
    #[case("IEC  62547:2013-10", "IEC 62547:2013-10")]
    fn test_parse_round_trip(#[case] input: &str, #[case] expected: &str) {
        let id = Identifier::parse(input).unwrap();
        assert_eq!(id.to_string(), expected);
    }

    #[test]
    fn test_parse_fields() {
        let id = Identifier::parse("IEC TS 61058-2-4:1995/COR1:1996").unwrap();
        assert_eq!(id.publisher, "IEC");
        assert_eq!(id.doc_type, Some(DocType::TechnicalSpecification));
        assert_eq!(id.number, "61058");
        assert_eq!(id.part(), Some("2-4"));
        assert_eq!(id.year, Some(1995));
        assert_eq!(id.adjuncts.len(), 1);
        assert_eq!(id.adjuncts[0].kind, AdjunctKind::Corrigendum);
        assert_eq!(id.adjuncts[0].year, Some(1996));
        assert!(!id.adjuncts[0].consolidated);
    }

    #[rstest]
    #[case("", IdentifierError::Empty)]
    #[case("   ", IdentifierError::Empty)]
    #[case("not a code", IdentifierError::Unparsable("not a code".to_string()))]
    #[case("IEC", IdentifierError::Unparsable("IEC".to_string()))]
    #[case("IEC 60050:20071", IdentifierError::Unparsable("IEC 60050:20071".to_string()))]
    fn test_parse_errors(#[case] input: &str, #[case] expected: IdentifierError) {
        assert_eq!(Identifier::parse(input), Err(expected));
    }

    #[test]
    fn test_invalid_month() {
        let err = Identifier::parse("IEC 62547:2013-13").unwrap_err();
        assert_eq!(
            err,
            IdentifierError::InvalidFieldValue {
                field: "month",
                message: "13".to_string()
            }
        );
    }
}
