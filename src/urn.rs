//! Conversion between IEC reference codes and IEC URNs.
//!
//! The URN layout is
//! `urn:iec:std:<publisher>:<number-part>:<date>:<type>:<deliverable>:<language>`
//! followed by one `[plus]:<adjunct>:<number>:<date>` group per adjunct.
//!
//! # Example
//!
//! ```
//! use iecref::urn::{code_to_urn, urn_to_code};
//!
//! let urn = code_to_urn("IEC TS 60034-16-3:1996", Some("fr")).unwrap();
//! assert_eq!(urn, "urn:iec:std:iec:60034-16-3:1996:ts::fr");
//!
//! let (code, language) = urn_to_code(&urn).unwrap();
//! assert_eq!(code, "IEC TS 60034-16-3:1996");
//! assert_eq!(language.as_deref(), Some("fr"));
//! ```

use crate::identifier::Identifier;

/// Convert a reference code to a URN. Returns `None` when the code cannot
/// be parsed.
pub fn code_to_urn(code: &str, language: Option<&str>) -> Option<String> {
    let id = Identifier::parse(code).ok()?;

    let date = id
        .year
        .map(|y| match id.month {
            Some(m) => format!("{y}-{m:02}"),
            None => y.to_string(),
        })
        .unwrap_or_default();
    let mut fields = vec![
        "urn".to_string(),
        "iec".to_string(),
        "std".to_string(),
        id.publisher.to_lowercase().replace('/', "-"),
        id.number_with_part(),
        date,
        id.doc_type
            .map(|t| t.abbreviation().to_lowercase())
            .unwrap_or_default(),
        id.deliverable
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default(),
        language.unwrap_or_default().to_string(),
    ];

    for adjunct in &id.adjuncts {
        fields.push(if adjunct.consolidated { "plus" } else { "" }.to_string());
        fields.push(adjunct.kind.as_tag().to_lowercase());
        fields.push(adjunct.number.to_string());
        fields.push(
            adjunct
                .year
                .map(|y| match adjunct.month {
                    Some(m) => format!("{y}-{m:02}"),
                    None => y.to_string(),
                })
                .unwrap_or_default(),
        );
    }

    Some(fields.join(":"))
}

/// Convert a URN to a reference code and its language, if any.
///
/// Returns `None` for strings with fewer than five `:`-separated fields.
pub fn urn_to_code(urn: &str) -> Option<(String, Option<String>)> {
    let upper = urn.to_uppercase();
    let fields: Vec<&str> = upper.split(':').collect();
    if fields.len() < 5 {
        return None;
    }
    let field = |i: usize| fields.get(i).copied().unwrap_or_default();

    let mut code = field(3).replace('-', "/");
    let doc_type = field(6);
    if !doc_type.is_empty() {
        code.push(' ');
        code.push_str(&canonical_type(doc_type));
    }
    code.push(' ');
    code.push_str(field(4));
    if !field(5).is_empty() {
        code.push(':');
        code.push_str(field(5));
    }

    for group in fields.get(9..).unwrap_or_default().chunks(4) {
        let [relation, kind, number, rest @ ..] = group else {
            break;
        };
        code.push(if relation.is_empty() { '/' } else { '+' });
        code.push_str(kind);
        code.push_str(number);
        if let Some(date) = rest.first().filter(|d| !d.is_empty()) {
            code.push(':');
            code.push_str(date);
        }
    }

    let deliverable = field(7);
    if !deliverable.is_empty() {
        code.push(' ');
        code.push_str(deliverable);
    }

    let language = Some(field(8).to_lowercase()).filter(|l| !l.is_empty());
    Some((code, language))
}

fn canonical_type(abbr: &str) -> String {
    crate::identifier::DocType::from_abbreviation(abbr)
        .map(|t| t.abbreviation().to_string())
        .unwrap_or_else(|| abbr.to_string())
}
