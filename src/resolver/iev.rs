use crate::identifier::Identifier;
use crate::{BibDate, DateType, DocIdentifier, Record, Title, TitleType};
use chrono::Local;

/// The International Electrotechnical Vocabulary, cited as `IEV`.
pub(super) fn identifier() -> Identifier {
    Identifier::new("IEC", "60050").with_year(2011)
}

/// Fixed record returned for `IEV`; only the fetch date varies.
pub(super) fn record() -> Record {
    Record {
        docidentifiers: vec![DocIdentifier::primary_iec(identifier().to_string())],
        titles: vec![Title {
            kind: TitleType::Main,
            content: "International Electrotechnical Vocabulary".to_string(),
            language: Some("en".into()),
        }],
        dates: vec![BibDate {
            kind: DateType::Published,
            value: "2011".to_string(),
        }],
        publisher: Some("International Electrotechnical Commission".to_string()),
        language: vec!["en".into(), "fr".into()],
        script: vec!["Latn".into()],
        source: vec!["http://www.electropedia.org".to_string()],
        fetched: Some(Local::now().date_naive()),
        ..Default::default()
    }
}
