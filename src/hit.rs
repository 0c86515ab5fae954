//! Search results and all-parts aggregation.
//!
//! A [`Hit`] wraps one catalog entry and memoizes its materialized record, so
//! asking a hit for its record twice fetches it once. A [`HitCollection`] is
//! the ordered result of one catalog search.

use crate::catalog::CatalogEntry;
use crate::identifier::{ExcludeSet, Identifier, PartKey};
use crate::materialize::{MaterializeError, Materializer};
use crate::resolver::ResolveOptions;
use crate::utils::sorted_unique;
use crate::{Record, Relation, RelationType};
use std::cell::OnceCell;
use tracing::debug;

/// One catalog entry returned by a search.
#[derive(Debug, Clone)]
pub struct Hit<R> {
    entry: CatalogEntry<R>,
    part_key: OnceCell<PartKey>,
    record: OnceCell<Record>,
}

impl<R> Hit<R> {
    pub fn new(entry: CatalogEntry<R>) -> Self {
        Self {
            entry,
            part_key: OnceCell::new(),
            record: OnceCell::new(),
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.entry.identifier
    }

    pub fn record_ref(&self) -> &R {
        &self.entry.record_ref
    }

    /// Canonical rendering of the identifier.
    pub fn code(&self) -> String {
        self.entry.identifier.to_string()
    }

    pub fn part(&self) -> Option<&str> {
        self.entry.identifier.part()
    }

    /// Numeric part key, computed on first use.
    pub fn part_key(&self) -> &PartKey {
        self.part_key
            .get_or_init(|| self.entry.identifier.part_key())
    }

    pub fn year(&self) -> Option<i32> {
        self.entry.identifier.year
    }

    /// The materialized record, fetched at most once.
    ///
    /// # Errors
    ///
    /// Returns the materializer's error; a failed fetch is not cached.
    pub fn record<M>(&self, materializer: &M) -> Result<&Record, MaterializeError>
    where
        M: Materializer<R> + ?Sized,
    {
        if let Some(record) = self.record.get() {
            return Ok(record);
        }
        let record = materializer.materialize(&self.entry.record_ref)?;
        Ok(self.record.get_or_init(|| record))
    }

    pub fn is_materialized(&self) -> bool {
        self.record.get().is_some()
    }
}

/// The ordered hits of one catalog search.
#[derive(Debug, Clone)]
pub struct HitCollection<R> {
    reference: Identifier,
    exclude: ExcludeSet,
    hits: Vec<Hit<R>>,
}

impl<R> HitCollection<R> {
    pub fn new(reference: Identifier, exclude: ExcludeSet, hits: Vec<Hit<R>>) -> Self {
        Self {
            reference,
            exclude,
            hits,
        }
    }

    /// The identifier that was searched for.
    pub fn reference(&self) -> &Identifier {
        &self.reference
    }

    pub fn exclude(&self) -> ExcludeSet {
        self.exclude
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hit<R>> {
        self.hits.iter()
    }

    pub fn first(&self) -> Option<&Hit<R>> {
        self.hits.first()
    }

    /// Distinct edition years among the hits, ascending.
    pub fn years(&self) -> Vec<i32> {
        sorted_unique(self.hits.iter().filter_map(Hit::year))
    }

    /// Distinct rendered identifiers among the hits, sorted.
    pub fn codes(&self) -> Vec<String> {
        sorted_unique(self.hits.iter().map(Hit::code))
    }

    /// Aggregate a document family into one "all parts" record.
    ///
    /// Hits with a part qualify when they match `year` (if given) and fall in
    /// the date range of `options` (if any). The qualifying hit with the
    /// smallest part is the only one materialized; the others are attached as
    /// `partOf` stubs. Without a qualifying hit the first hit is materialized
    /// and returned as is.
    ///
    /// # Errors
    ///
    /// Returns the materializer's error for the representative hit.
    pub fn to_all_parts<M>(
        &self,
        year: Option<i32>,
        options: &ResolveOptions,
        materializer: &M,
    ) -> Result<Option<Record>, MaterializeError>
    where
        M: Materializer<R> + ?Sized,
    {
        let parts: Vec<&Hit<R>> = self
            .hits
            .iter()
            .filter(|h| h.part().is_some())
            .filter(|h| year.is_none() || h.year() == year)
            .filter(|h| !options.has_date_filter() || options.year_in_range(h.year().unwrap_or(0)))
            .collect();

        let Some(representative) = parts.iter().copied().min_by(|a, b| a.part_key().cmp(b.part_key()))
        else {
            return self
                .hits
                .first()
                .map(|h| h.record(materializer).cloned())
                .transpose();
        };

        let mut all_parts = representative.record(materializer)?.to_all_parts();
        let representative_code = representative.code();
        for hit in parts {
            let code = hit.code();
            if code == representative_code {
                continue;
            }
            all_parts.relations.push(Relation {
                kind: RelationType::PartOf,
                record: Box::new(Record::stub(&code)),
            });
        }

        debug!(
            key = %self.reference,
            exclude = ?self.exclude,
            representative = %representative_code,
            parts = all_parts.relations.len(),
            "aggregated all parts"
        );
        Ok(Some(all_parts))
    }
}

impl<'a, R> IntoIterator for &'a HitCollection<R> {
    type Item = &'a Hit<R>;
    type IntoIter = std::slice::Iter<'a, Hit<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{search, MemoryCatalog};
    use crate::identifier::MatchConfig;
    use crate::{BibDate, DateType, DocIdentifier};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    /// Materializer that records which references it was asked for.
    #[derive(Default)]
    struct Counting {
        calls: RefCell<Vec<String>>,
    }

    impl Materializer<String> for Counting {
        fn materialize(&self, record_ref: &String) -> Result<Record, MaterializeError> {
            self.calls.borrow_mut().push(record_ref.clone());
            let year = record_ref.rsplit(':').next().unwrap_or_default();
            Ok(Record {
                docidentifiers: vec![
                    DocIdentifier::primary_iec(record_ref.as_str()),
                    DocIdentifier::urn(crate::urn::code_to_urn(record_ref, None).unwrap()),
                ],
                dates: vec![BibDate {
                    kind: DateType::Published,
                    value: format!("{year}-06-01"),
                }],
                ..Default::default()
            })
        }
    }

    fn hits(codes: &[&str], exclude: ExcludeSet, query: &str) -> HitCollection<String> {
        let catalog: MemoryCatalog<String> = codes
            .iter()
            .map(|c| (Identifier::parse(c).unwrap(), c.to_string()))
            .collect();
        search(
            &catalog,
            &Identifier::parse(query).unwrap(),
            exclude,
            &MatchConfig::default(),
        )
        .unwrap()
    }

    fn family() -> HitCollection<String> {
        hits(
            &[
                "IEC 80000-1:2009",
                "IEC 80000-6:2008",
                "IEC 80000-13:2008",
                "IEC 80000-6:2022",
            ],
            ExcludeSet::YEAR | ExcludeSet::PART,
            "IEC 80000",
        )
    }

    fn part_of(record: &Record) -> Vec<String> {
        record
            .relations_of(&RelationType::PartOf)
            .map(|r| r.formatted_ref.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_record_is_materialized_once() {
        let hits = hits(&["IEC 60050-102:2007"], ExcludeSet::YEAR, "IEC 60050-102");
        let counting = Counting::default();
        let hit = hits.first().unwrap();
        assert!(!hit.is_materialized());
        let first = hit.record(&counting).unwrap().clone();
        let second = hit.record(&counting).unwrap();
        assert_eq!(&first, second);
        assert!(hit.is_materialized());
        assert_eq!(counting.calls.borrow().len(), 1);
    }

    #[test]
    fn test_failed_materialization_is_not_cached() {
        let hits = hits(&["IEC 60050-102:2007"], ExcludeSet::YEAR, "IEC 60050-102");
        let hit = hits.first().unwrap();
        let failing = |_: &String| -> Result<Record, MaterializeError> {
            Err(MaterializeError::Unavailable("gone".into()))
        };
        assert!(hit.record(&failing).is_err());
        assert!(!hit.is_materialized());
        assert!(hit.record(&Counting::default()).is_ok());
    }

    #[test]
    fn test_all_parts_uses_smallest_part_across_years() {
        let family = family();
        let counting = Counting::default();
        let record = family
            .to_all_parts(None, &ResolveOptions::default(), &counting)
            .unwrap()
            .unwrap();

        assert_eq!(*counting.calls.borrow(), vec!["IEC 80000-1:2009".to_string()]);
        assert_eq!(record.docidentifiers[0].content, "IEC 80000 (all parts)");
        assert_eq!(record.docidentifiers[1].content, "urn:iec:std:iec:80000:::ser");
        assert!(record.all_parts);
        assert_eq!(
            part_of(&record),
            vec!["IEC 80000-6:2008", "IEC 80000-13:2008", "IEC 80000-6:2022"]
        );
    }

    #[test]
    fn test_all_parts_with_year_filter() {
        let family = family();
        let counting = Counting::default();
        let record = family
            .to_all_parts(Some(2008), &ResolveOptions::default(), &counting)
            .unwrap()
            .unwrap();
        assert_eq!(*counting.calls.borrow(), vec!["IEC 80000-6:2008".to_string()]);
        assert_eq!(part_of(&record), vec!["IEC 80000-13:2008"]);
    }

    #[test]
    fn test_all_parts_with_date_range() {
        let family = family();
        let counting = Counting::default();
        let options = ResolveOptions {
            publication_date_after: NaiveDate::from_ymd_opt(2020, 1, 1),
            ..Default::default()
        };
        let record = family
            .to_all_parts(None, &options, &counting)
            .unwrap()
            .unwrap();
        assert_eq!(*counting.calls.borrow(), vec!["IEC 80000-6:2022".to_string()]);
        assert!(part_of(&record).is_empty());
    }

    #[test]
    fn test_all_parts_without_parts_falls_back_to_first_hit() {
        let hits = hits(
            &["IEC 61332:2016", "IEC 61332:2005"],
            ExcludeSet::YEAR | ExcludeSet::PART,
            "IEC 61332",
        );
        let counting = Counting::default();
        let record = hits
            .to_all_parts(None, &ResolveOptions::default(), &counting)
            .unwrap()
            .unwrap();
        assert_eq!(record.docidentifiers[0].content, "IEC 61332:2005");
        assert!(!record.all_parts);
        assert_eq!(counting.calls.borrow().len(), 1);
    }

    #[test]
    fn test_all_parts_on_empty_collection() {
        let hits = hits(&[], ExcludeSet::YEAR | ExcludeSet::PART, "IEC 99999");
        let counting = Counting::default();
        assert_eq!(
            hits.to_all_parts(None, &ResolveOptions::default(), &counting)
                .unwrap(),
            None
        );
        assert!(counting.calls.borrow().is_empty());
    }

    #[test]
    fn test_years_and_codes() {
        let family = family();
        assert_eq!(family.years(), vec![2008, 2009, 2022]);
        assert_eq!(
            family.codes(),
            vec![
                "IEC 80000-13:2008",
                "IEC 80000-1:2009",
                "IEC 80000-6:2008",
                "IEC 80000-6:2022",
            ]
        );
    }
}
