//! Hints for references that could not be resolved.
//!
//! When a reference is not found the resolver always emits
//! [`Diagnostic::NotFound`], then at most one [`Hint`], chosen by the first
//! applicable rule:
//!
//! 1. the year was given and other editions exist: [`Hint::YearMismatch`];
//! 2. the document only exists in parts and no part was given:
//!    [`Hint::PublishedInParts`];
//! 3. the document exists as another deliverable type:
//!    [`Hint::TypeMismatch`].

use crate::hit::HitCollection;
use crate::identifier::{ExcludeSet, Identifier};
use crate::utils::sorted_unique;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintCategory {
    YearMismatch,
    PublishedInParts,
    TypeMismatch,
}

/// What was found instead of the requested reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Hint {
    /// Editions exist, but not for the requested year.
    YearMismatch { requested: i32, found: Vec<i32> },
    /// The document is published in parts.
    PublishedInParts {
        /// The `(all parts)` form of the query
        suggestion: String,
        available: Vec<String>,
    },
    /// The document exists under another deliverable type.
    TypeMismatch { available: Vec<String> },
}

impl Hint {
    pub fn category(&self) -> HintCategory {
        match self {
            Hint::YearMismatch { .. } => HintCategory::YearMismatch,
            Hint::PublishedInParts { .. } => HintCategory::PublishedInParts,
            Hint::TypeMismatch { .. } => HintCategory::TypeMismatch,
        }
    }

    /// The list the hint carries, as strings.
    pub fn payload(&self) -> Vec<String> {
        match self {
            Hint::YearMismatch { found, .. } => found.iter().map(i32::to_string).collect(),
            Hint::PublishedInParts { available, .. } | Hint::TypeMismatch { available } => {
                available.clone()
            }
        }
    }

    /// Human-readable form of the hint.
    pub fn message(&self) -> String {
        match self {
            Hint::YearMismatch { requested, found } => format!(
                "TIP: No match for edition year `{requested}`, but matches exist for `{}`.",
                found.iter().map(i32::to_string).collect::<Vec<_>>().join("`, `")
            ),
            Hint::PublishedInParts {
                suggestion,
                available,
            } => format!(
                "TIP: If you wish to cite all document parts for the reference, use `{suggestion}`. Available: `{}`.",
                available.join("`, `")
            ),
            Hint::TypeMismatch { available } => format!(
                "TIP: No match for type, but matches exist: `{}`.",
                available.join("`, `")
            ),
        }
    }
}

/// A structured event emitted while resolving a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Diagnostic {
    NotFound { query: String },
    Hint { query: String, hint: Hint },
}

impl Diagnostic {
    pub fn query(&self) -> &str {
        match self {
            Diagnostic::NotFound { query } | Diagnostic::Hint { query, .. } => query,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Diagnostic::NotFound { .. } => "Not found.".to_string(),
            Diagnostic::Hint { hint, .. } => hint.message(),
        }
    }
}

/// Receiver of [`Diagnostic`] events.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: &Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn emit(&self, diagnostic: &Diagnostic) {
        (**self).emit(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for std::sync::Arc<S> {
    fn emit(&self, diagnostic: &Diagnostic) {
        (**self).emit(diagnostic);
    }
}

/// Logs diagnostics through `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        info!(key = diagnostic.query(), "{}", diagnostic.message());
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events emitted so far.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return the events emitted so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic.clone());
    }
}

/// Pick the hint for a failed lookup of `query`.
///
/// `result` is the collection the resolver disambiguated over. `broaden`
/// runs a new search for `query` with the given exclusions and returns the
/// rendered identifiers it found; it is only called when the earlier rules
/// do not apply.
///
/// # Errors
///
/// Propagates the errors of `broaden`.
pub fn generate_hint<R, F>(
    query: &Identifier,
    result: &HitCollection<R>,
    mut broaden: F,
) -> crate::Result<Option<Hint>>
where
    F: FnMut(ExcludeSet) -> crate::Result<Vec<String>>,
{
    if let Some(requested) = query.year {
        if !result.is_empty() {
            return Ok(Some(Hint::YearMismatch {
                requested,
                found: result.years(),
            }));
        }
    }

    let parts = broaden(ExcludeSet::YEAR | ExcludeSet::PART)?;
    if query.part().is_none() && !parts.is_empty() {
        return Ok(Some(Hint::PublishedInParts {
            suggestion: format!("{query} (all parts)"),
            available: sorted_unique(parts),
        }));
    }

    let types = broaden(ExcludeSet::YEAR | ExcludeSet::TYPE)?;
    if !types.is_empty() {
        return Ok(Some(Hint::TypeMismatch {
            available: sorted_unique(types),
        }));
    }

    Ok(None)
}
