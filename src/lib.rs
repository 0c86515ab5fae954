//! Resolution of IEC and CISPR standards citations.
//!
//! `iecref` takes a human-written reference such as `IEC 60050-102:2007`,
//! `IEC TS 60034-16-3:1996` or `IEC 80000 (all parts)`, finds the matching
//! entries in a catalog of publication identifiers, and returns one
//! bibliographic [`Record`].
//!
//! # Key Features
//!
//! - **Structured identifiers**: publisher, deliverable type, number, part,
//!   edition date, stacked amendments and corrigenda
//! - **Exclusion-aware matching**: compare identifiers while ignoring year,
//!   part, type, adjuncts or delivery format
//! - **Edition disambiguation**: exact year, publication-date range, or the
//!   latest edition
//! - **All-parts aggregation**: one record for a whole document family, with
//!   the other parts attached as relations
//! - **Lazy materialization**: full records are fetched only for the hits
//!   that need them, at most once each, with bounded retry
//! - **Not-found hints**: tell the caller which years, parts or types exist
//!
//! # Basic Usage
//!
//! ```rust
//! use iecref::catalog::MemoryCatalog;
//! use iecref::{MaterializeError, Record, ResolveOptions, Resolver};
//!
//! let mut catalog: MemoryCatalog<String> = MemoryCatalog::new();
//! catalog.insert_code("IEC 61326-1:2012", "IEC 61326-1:2012").unwrap();
//! catalog.insert_code("IEC 61326-1:2020", "IEC 61326-1:2020").unwrap();
//!
//! let resolver = Resolver::new(&catalog, |code: &String| -> Result<Record, MaterializeError> {
//!     Ok(Record::stub(code))
//! });
//!
//! // undated references resolve to the latest edition
//! let record = resolver
//!     .get("IEC 61326-1", &ResolveOptions::default())
//!     .unwrap()
//!     .into_record()
//!     .unwrap();
//! assert_eq!(record.docidentifiers[0].content, "IEC 61326-1");
//! ```
//!
//! # Error Handling
//!
//! Operations return the crate [`Result`] type wrapping [`ResolveError`]. A
//! reference that is simply not in the catalog is not an error; it yields
//! [`Resolution::NotFound`]:
//!
//! ```rust
//! use iecref::catalog::MemoryCatalog;
//! use iecref::{MaterializeError, Record, ResolveError, ResolveOptions, Resolver};
//!
//! let catalog: MemoryCatalog<String> = MemoryCatalog::new();
//! let resolver = Resolver::new(&catalog, |code: &String| -> Result<Record, MaterializeError> {
//!     Ok(Record::stub(code))
//! });
//!
//! match resolver.get("???", &ResolveOptions::default()) {
//!     Ok(resolution) => println!("Resolved: {}", resolution.is_found()),
//!     Err(ResolveError::MalformedQuery { code, .. }) => eprintln!("Not a reference: {code}"),
//!     Err(e) => eprintln!("Other error: {e}"),
//! }
//! ```
//!
//! # Thread Safety
//!
//! Catalogs are read-only during resolution. With the `parallel` feature,
//! [`Resolver::get_many`] resolves independent references on the rayon
//! thread pool; each request materializes its own hits.

use thiserror::Error;

pub mod catalog;
pub mod diagnostics;
pub mod hit;
pub mod identifier;
pub mod materialize;
mod record;
mod regex;
pub mod resolver;
pub mod urn;
mod utils;

// Reexports
pub use catalog::{Catalog, MemoryCatalog};
pub use diagnostics::{Diagnostic, Hint};
pub use identifier::Identifier;
pub use materialize::{MaterializeError, Materializer, Retrying};
pub use record::{
    BibDate, DateType, DocIdentifier, IdKind, Record, Relation, RelationType, Title, TitleType,
};
pub use resolver::{Resolution, ResolveOptions, Resolver, ResolverConfig};

/// A specialized Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors that abort a resolution.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Malformed query `{code}`: {source}")]
    MalformedQuery {
        code: String,
        #[source]
        source: identifier::IdentifierError,
    },

    /// The catalog could not be read. Worth retrying later.
    #[error("Request failed: {0}")]
    CatalogUnavailable(String),

    #[error("Failed to materialize `{code}`: {source}")]
    Materialization {
        code: String,
        #[source]
        source: MaterializeError,
    },
}

impl ResolveError {
    /// Whether the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        match self {
            ResolveError::MalformedQuery { .. } => false,
            ResolveError::CatalogUnavailable(_) => true,
            ResolveError::Materialization { source, .. } => source.is_transient(),
        }
    }
}

impl From<catalog::CatalogError> for ResolveError {
    fn from(err: catalog::CatalogError) -> Self {
        ResolveError::CatalogUnavailable(err.to_string())
    }
}
