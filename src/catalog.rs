//! The catalog of known publication identifiers and the structural search
//! over it.
//!
//! A [`Catalog`] is read-only during resolution. Loading and refreshing it is
//! up to the caller; [`MemoryCatalog`] holds an already loaded index.
//!
//! # Example
//!
//! ```
//! use iecref::catalog::{search, MemoryCatalog};
//! use iecref::identifier::{ExcludeSet, Identifier, MatchConfig};
//!
//! let mut catalog: MemoryCatalog<String> = MemoryCatalog::new();
//! catalog.insert_code("IEC 60050-102:2010", "data/iec_60050-102_2010.yaml").unwrap();
//! catalog.insert_code("IEC 60050-102:2007", "data/iec_60050-102_2007.yaml").unwrap();
//! catalog.insert_code("IEC 60050-101:1998", "data/iec_60050-101_1998.yaml").unwrap();
//!
//! let reference = Identifier::parse("IEC 60050-102:2007").unwrap();
//! let hits = search(&catalog, &reference, ExcludeSet::YEAR, &MatchConfig::default()).unwrap();
//! let codes: Vec<_> = hits.iter().map(|h| h.code()).collect();
//! assert_eq!(codes, vec!["IEC 60050-102:2007", "IEC 60050-102:2010"]);
//! ```

use crate::hit::{Hit, HitCollection};
use crate::identifier::{ExcludeSet, Identifier, IdentifierError, MatchConfig};
use thiserror::Error;
use tracing::debug;

/// One row of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry<R> {
    pub identifier: Identifier,
    /// Opaque reference understood by the materializer
    pub record_ref: R,
}

/// Failures of the underlying catalog source.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Error: {0}")]
    Other(String),
}

/// Read-only source of catalog entries.
pub trait Catalog {
    /// The opaque record reference type.
    type RecordRef: Clone;

    /// Return every entry whose identifier satisfies `predicate`, in any
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the underlying source cannot be read.
    fn select(
        &self,
        predicate: &dyn Fn(&Identifier) -> bool,
    ) -> Result<Vec<CatalogEntry<Self::RecordRef>>, CatalogError>;
}

/// An in-memory catalog.
#[derive(Debug, Clone)]
pub struct MemoryCatalog<R> {
    entries: Vec<CatalogEntry<R>>,
}

impl<R> Default for MemoryCatalog<R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<R> MemoryCatalog<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, identifier: Identifier, record_ref: R) {
        self.entries.push(CatalogEntry {
            identifier,
            record_ref,
        });
    }

    /// Parse `code` and add it to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when `code` is not a valid identifier.
    pub fn insert_code(
        &mut self,
        code: &str,
        record_ref: impl Into<R>,
    ) -> Result<(), IdentifierError> {
        let identifier = Identifier::parse(code)?;
        self.push(identifier, record_ref.into());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry<R>> {
        self.entries.iter()
    }
}

impl<R> FromIterator<(Identifier, R)> for MemoryCatalog<R> {
    fn from_iter<I: IntoIterator<Item = (Identifier, R)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(identifier, record_ref)| CatalogEntry {
                    identifier,
                    record_ref,
                })
                .collect(),
        }
    }
}

impl<R: Clone> Catalog for MemoryCatalog<R> {
    type RecordRef = R;

    fn select(
        &self,
        predicate: &dyn Fn(&Identifier) -> bool,
    ) -> Result<Vec<CatalogEntry<R>>, CatalogError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| predicate(&e.identifier))
            .cloned()
            .collect())
    }
}

/// Find all entries structurally matching `reference` once `exclude` is
/// ignored.
///
/// Hits are sorted by year (undated first) and then by part, with part
/// components compared numerically.
///
/// # Errors
///
/// Returns [`ResolveError::CatalogUnavailable`](crate::ResolveError::CatalogUnavailable)
/// when the catalog cannot be read.
pub fn search<C: Catalog + ?Sized>(
    catalog: &C,
    reference: &Identifier,
    exclude: ExcludeSet,
    config: &MatchConfig,
) -> crate::Result<HitCollection<C::RecordRef>> {
    let key = reference.exclude(exclude, config);
    let mut entries = catalog.select(&|candidate| candidate.exclude(exclude, config) == key)?;
    entries.sort_by_cached_key(|e| (e.identifier.year.unwrap_or(0), e.identifier.part_key()));

    debug!(
        key = %reference,
        ?exclude,
        hits = entries.len(),
        "searched catalog"
    );
    Ok(HitCollection::new(
        reference.clone(),
        exclude,
        entries.into_iter().map(Hit::new).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResolveError;
    use pretty_assertions::assert_eq;

    fn catalog(codes: &[&str]) -> MemoryCatalog<String> {
        let mut catalog = MemoryCatalog::new();
        for code in codes {
            catalog
                .insert_code(code, format!("data/{}.yaml", code.to_lowercase()))
                .unwrap();
        }
        catalog
    }

    fn codes(hits: &HitCollection<String>) -> Vec<String> {
        hits.iter().map(|h| h.code()).collect()
    }

    fn run(catalog: &MemoryCatalog<String>, code: &str, exclude: ExcludeSet) -> HitCollection<String> {
        search(
            catalog,
            &Identifier::parse(code).unwrap(),
            exclude,
            &MatchConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_exact_search() {
        let catalog = catalog(&["IEC 60050-102:2007", "IEC 60050-102:2010"]);
        let hits = run(&catalog, "IEC 60050-102:2007", ExcludeSet::empty());
        assert_eq!(codes(&hits), vec!["IEC 60050-102:2007"]);
        assert_eq!(
            hits.first().unwrap().record_ref(),
            "data/iec 60050-102:2007.yaml"
        );
    }

    #[test]
    fn test_precise_structural_matching() {
        let catalog = catalog(&[
            "IEC 61326-1:2020",
            "IEC 61326-1:2012",
            "IEC 61326-2-1:2020",
            "IEC 61326:2020",
            "ISO/IEC 61326-1:2020",
            "IEC 61327-1:2020",
        ]);
        let hits = run(&catalog, "IEC 61326-1:2020", ExcludeSet::YEAR);
        assert_eq!(codes(&hits), vec!["IEC 61326-1:2012", "IEC 61326-1:2020"]);
    }

    #[test]
    fn test_all_parts_search_order() {
        let catalog = catalog(&[
            "IEC 80000-1:2009",
            "IEC 80000-6:2008",
            "IEC 80000-13:2008",
            "IEC 80000-6:2022",
            "IEC 60050-102:2007",
        ]);
        let hits = run(&catalog, "IEC 80000", ExcludeSet::YEAR | ExcludeSet::PART);
        assert_eq!(hits.exclude(), ExcludeSet::YEAR | ExcludeSet::PART);
        assert_eq!(
            codes(&hits),
            vec![
                "IEC 80000-6:2008",
                "IEC 80000-13:2008",
                "IEC 80000-1:2009",
                "IEC 80000-6:2022",
            ]
        );
    }

    #[test]
    fn test_cross_type_search() {
        let catalog = catalog(&[
            "IEC TR 62547:2013",
            "IEC TR 62547:2024",
            "IEC 62547:2020",
            "IEC TR 60050-102:2007",
        ]);
        let hits = run(&catalog, "IEC 62547", ExcludeSet::YEAR | ExcludeSet::TYPE);
        assert_eq!(
            codes(&hits),
            vec!["IEC TR 62547:2013", "IEC 62547:2020", "IEC TR 62547:2024"]
        );
    }

    #[test]
    fn test_undated_entries_sort_first() {
        let catalog = catalog(&[
            "IEC 60050-102:2015",
            "IEC 60050-102",
            "IEC 60050-102:2007",
            "IEC 60050-102:2010",
        ]);
        let hits = run(&catalog, "IEC 60050-102", ExcludeSet::YEAR);
        let years: Vec<_> = hits.iter().map(|h| h.identifier().year).collect();
        assert_eq!(years, vec![None, Some(2007), Some(2010), Some(2015)]);
    }

    #[test]
    fn test_no_matches() {
        let catalog = catalog(&["IEC 60050-102:2007", "IEC 61058-2-4:2018"]);
        assert!(run(&catalog, "IEC 99999", ExcludeSet::YEAR).is_empty());
    }

    struct Offline;

    impl Catalog for Offline {
        type RecordRef = String;

        fn select(
            &self,
            _predicate: &dyn Fn(&Identifier) -> bool,
        ) -> Result<Vec<CatalogEntry<String>>, CatalogError> {
            Err(CatalogError::Transport("connection refused".to_string()))
        }
    }

    #[test]
    fn test_catalog_failure_is_request_failed() {
        let err = search(
            &Offline,
            &Identifier::parse("IEC 60050:2020").unwrap(),
            ExcludeSet::YEAR,
            &MatchConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::CatalogUnavailable(_)));
        assert_eq!(
            err.to_string(),
            "Request failed: Transport error: connection refused"
        );
    }
}
