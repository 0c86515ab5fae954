//! Reference resolution.
//!
//! A [`Resolver`] turns a citation such as `IEC 60050-102:2007` or
//! `IEC 80000 (all parts)` into one materialized [`Record`], or into a
//! [`Resolution::NotFound`] carrying a hint about what does exist.
//!
//! # Example
//!
//! ```
//! use iecref::catalog::MemoryCatalog;
//! use iecref::{MaterializeError, Record, Resolution, ResolveOptions, Resolver};
//!
//! let mut catalog: MemoryCatalog<String> = MemoryCatalog::new();
//! catalog.insert_code("IEC 60050-102:2007", "IEC 60050-102:2007").unwrap();
//! catalog.insert_code("IEC 60050-102:2010", "IEC 60050-102:2010").unwrap();
//!
//! let materializer = |code: &String| -> Result<Record, MaterializeError> { Ok(Record::stub(code)) };
//! let resolver = Resolver::new(&catalog, materializer);
//!
//! match resolver.get("IEC 60050-102:2007", &ResolveOptions::default()).unwrap() {
//!     Resolution::Found { identifier, .. } => assert_eq!(identifier.to_string(), "IEC 60050-102:2007"),
//!     Resolution::NotFound { .. } => unreachable!(),
//! }
//! ```

mod disambiguate;
mod iev;
mod options;

pub use options::{ResolveOptions, ResolverConfig};

use crate::catalog::{Catalog, search};
use crate::diagnostics::{Diagnostic, DiagnosticSink, Hint, TracingSink, generate_hint};
use crate::hit::HitCollection;
use crate::identifier::{ExcludeSet, Identifier};
use crate::materialize::{MaterializeError, Materializer, Retrying};
use crate::regex::Regex;
use crate::{Record, ResolveError, Result};
use std::sync::LazyLock;
use tracing::info;

static ALL_PARTS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s\(all parts\)").unwrap());

/// Outcome of resolving one reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found {
        /// Identifier of the chosen catalog entry; for all-parts lookups, the
        /// query without part and year
        identifier: Identifier,
        record: Record,
    },
    NotFound {
        query: String,
        hint: Option<Hint>,
    },
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found { .. })
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            Resolution::Found { record, .. } => Some(record),
            Resolution::NotFound { .. } => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Resolution::Found { record, .. } => Some(record),
            Resolution::NotFound { .. } => None,
        }
    }

    pub fn hint(&self) -> Option<&Hint> {
        match self {
            Resolution::NotFound { hint, .. } => hint.as_ref(),
            Resolution::Found { .. } => None,
        }
    }
}

/// Resolves references against a catalog.
///
/// The resolver borrows the catalog and owns the materializer, which it
/// wraps in a bounded [`Retrying`] policy. Not-found diagnostics go to a
/// [`DiagnosticSink`], by default [`TracingSink`].
///
/// # Examples
///
/// ```
/// use iecref::catalog::MemoryCatalog;
/// use iecref::diagnostics::CollectingSink;
/// use iecref::{MaterializeError, Record, ResolveOptions, Resolver, ResolverConfig};
///
/// let catalog: MemoryCatalog<String> = MemoryCatalog::new();
/// let sink = CollectingSink::new();
/// let resolver = Resolver::new(&catalog, |c: &String| -> Result<Record, MaterializeError> {
///     Ok(Record::stub(c))
/// })
/// .with_config(ResolverConfig {
///     materialize_attempts: 5,
///     ..Default::default()
/// })
/// .with_sink(&sink);
///
/// let resolution = resolver.get("IEC 99999", &ResolveOptions::default()).unwrap();
/// assert!(!resolution.is_found());
/// assert_eq!(sink.events().len(), 1);
/// ```
pub struct Resolver<'c, C: Catalog + ?Sized, M> {
    catalog: &'c C,
    materializer: Retrying<M>,
    config: ResolverConfig,
    sink: Box<dyn DiagnosticSink + 'c>,
}

impl<'c, C, M> Resolver<'c, C, M>
where
    C: Catalog + ?Sized,
    M: Materializer<C::RecordRef>,
{
    /// Creates a resolver with default configuration.
    ///
    /// # Arguments
    ///
    /// * `catalog` - The catalog to search
    /// * `materializer` - Fetches full records for catalog entries
    #[must_use]
    pub fn new(catalog: &'c C, materializer: M) -> Self {
        Self {
            catalog,
            materializer: Retrying::new(materializer),
            config: ResolverConfig::default(),
            sink: Box::new(TracingSink),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.materializer = self.materializer.with_attempts(config.materialize_attempts);
        self.config = config;
        self
    }

    /// Sends not-found diagnostics to `sink` instead of the log.
    #[must_use]
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'c) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn materializer(&self) -> &M {
        self.materializer.inner()
    }

    /// Resolves a reference code.
    ///
    /// A code ending in ` (all parts)` resolves the whole document family,
    /// and `IEV` resolves to the fixed record of IEC 60050:2011.
    ///
    /// # Arguments
    ///
    /// * `code` - Reference such as `IEC 60050-102:2007`
    /// * `options` - Year override, all-parts mode and date filters
    ///
    /// # Errors
    ///
    /// - [`ResolveError::MalformedQuery`] if `code` is not an identifier
    /// - [`ResolveError::CatalogUnavailable`] if the catalog cannot be read
    /// - [`ResolveError::Materialization`] if the chosen record cannot be fetched
    pub fn get(&self, code: &str, options: &ResolveOptions) -> Result<Resolution> {
        let mut options = options.clone();
        let reference = if ALL_PARTS_REGEX.is_match(code) {
            options.all_parts = true;
            ALL_PARTS_REGEX.replace(code, "").into_owned()
        } else {
            code.to_string()
        };

        if reference.trim().eq_ignore_ascii_case("IEV") {
            return Ok(Resolution::Found {
                identifier: iev::identifier(),
                record: iev::record(),
            });
        }

        let query = Identifier::parse(&reference).map_err(|source| ResolveError::MalformedQuery {
            code: code.to_string(),
            source,
        })?;
        self.resolve(&query, &options)
    }

    /// Resolves an already parsed identifier.
    ///
    /// Undated queries without date filters or `keep_year` return a
    /// most-recent reference: the record loses its dates and points at the
    /// dated edition through an `instanceOf` relation.
    ///
    /// # Errors
    ///
    /// Same as [`Resolver::get`], minus the parse error.
    pub fn resolve(&self, query: &Identifier, options: &ResolveOptions) -> Result<Resolution> {
        let mut query = query.clone();
        if let Some(year) = options.year {
            query.year = Some(year);
            query.month = None;
        }

        info!(key = %query, "Fetching from catalog ...");
        let exclude = if options.all_parts {
            ExcludeSet::YEAR | ExcludeSet::PART
        } else {
            ExcludeSet::YEAR
        };
        let hits = self.search(&query, exclude)?;

        if options.all_parts {
            let record = hits
                .to_all_parts(query.year, options, &self.materializer)
                .map_err(|source| materialization(&query, source))?;
            return Ok(match record {
                Some(record) => {
                    self.log_found(&query, &record);
                    Resolution::Found {
                        identifier: query.without_part().without_year(),
                        record,
                    }
                }
                None => self.not_found(&query, None),
            });
        }

        let found = disambiguate::find_match(&hits, &query, options, &self.materializer)
            .map_err(|source| materialization(&query, source))?;
        if let Some(hit) = found {
            let record = hit
                .record(&self.materializer)
                .map_err(|source| materialization(&query, source))?
                .clone();
            self.log_found(&query, &record);

            let record = if query.year.is_none() && !options.keep_year && !options.has_date_filter()
            {
                record.to_most_recent_reference()
            } else {
                record
            };
            return Ok(Resolution::Found {
                identifier: hit.identifier().clone(),
                record,
            });
        }

        let hint = generate_hint(&query, &hits, |exclude| {
            Ok(self.search(&query, exclude)?.codes())
        })?;
        Ok(self.not_found(&query, hint))
    }

    /// Searches the catalog with this resolver's match configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::CatalogUnavailable`] if the catalog cannot be
    /// read.
    pub fn search(
        &self,
        reference: &Identifier,
        exclude: ExcludeSet,
    ) -> Result<HitCollection<C::RecordRef>> {
        search(self.catalog, reference, exclude, &self.config.match_config)
    }

    fn log_found(&self, query: &Identifier, record: &Record) {
        let code = record
            .primary_identifier()
            .map(|d| d.content.as_str())
            .unwrap_or_default();
        info!(key = %query, "Found: `{code}`");
    }

    fn not_found(&self, query: &Identifier, hint: Option<Hint>) -> Resolution {
        let query = query.to_string();
        self.sink.emit(&Diagnostic::NotFound {
            query: query.clone(),
        });
        if let Some(hint) = &hint {
            self.sink.emit(&Diagnostic::Hint {
                query: query.clone(),
                hint: hint.clone(),
            });
        }
        Resolution::NotFound { query, hint }
    }
}

#[cfg(not(feature = "parallel"))]
impl<C, M> Resolver<'_, C, M>
where
    C: Catalog + ?Sized,
    M: Materializer<C::RecordRef>,
{
    /// Resolves several codes, in order.
    pub fn get_many(&self, codes: &[&str], options: &ResolveOptions) -> Vec<Result<Resolution>> {
        codes.iter().map(|code| self.get(code, options)).collect()
    }
}

#[cfg(feature = "parallel")]
impl<C, M> Resolver<'_, C, M>
where
    C: Catalog + Sync + ?Sized,
    M: Materializer<C::RecordRef> + Sync,
{
    /// Resolves several codes in parallel. Results keep the order of `codes`.
    pub fn get_many(&self, codes: &[&str], options: &ResolveOptions) -> Vec<Result<Resolution>> {
        use rayon::prelude::*;

        codes.par_iter().map(|code| self.get(code, options)).collect()
    }
}

fn materialization(query: &Identifier, source: MaterializeError) -> ResolveError {
    ResolveError::Materialization {
        code: query.to_string(),
        source,
    }
}
