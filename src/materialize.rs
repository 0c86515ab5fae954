//! Record materialization.
//!
//! A [`Materializer`] turns the opaque record reference of a catalog entry
//! into a full [`Record`]. It may perform network I/O; the resolver calls it
//! as rarely as possible and never more than once per hit.
//!
//! # Example
//!
//! ```
//! use iecref::{MaterializeError, Materializer, Record};
//!
//! let materializer = |file: &String| -> Result<Record, MaterializeError> {
//!     Ok(Record::stub(file))
//! };
//! let record = materializer.materialize(&"IEC 60050-102:2007".to_string()).unwrap();
//! assert_eq!(record.formatted_ref.as_deref(), Some("IEC 60050-102:2007"));
//! ```

use crate::Record;
use thiserror::Error;
use tracing::warn;

/// Default number of attempts made by [`Retrying`].
pub const DEFAULT_ATTEMPTS: usize = 3;

/// Errors reported by a [`Materializer`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaterializeError {
    /// A failure worth retrying, such as a dropped connection.
    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Record not available: {0}")]
    Unavailable(String),

    #[error("Invalid record: {0}")]
    Invalid(String),
}

impl MaterializeError {
    pub fn is_transient(&self) -> bool {
        matches!(self, MaterializeError::Transient(_))
    }
}

/// Fetches the full record behind a record reference.
pub trait Materializer<R: ?Sized> {
    /// Materialize the record referenced by `record_ref`.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError`] when the record cannot be produced.
    fn materialize(&self, record_ref: &R) -> Result<Record, MaterializeError>;
}

impl<R: ?Sized, F> Materializer<R> for F
where
    F: Fn(&R) -> Result<Record, MaterializeError>,
{
    fn materialize(&self, record_ref: &R) -> Result<Record, MaterializeError> {
        self(record_ref)
    }
}

/// Bounded retry around another materializer.
///
/// Only [`MaterializeError::Transient`] failures are retried; the last
/// failure is returned once the attempts are used up.
#[derive(Debug, Clone)]
pub struct Retrying<M> {
    inner: M,
    attempts: usize,
}

impl<M> Retrying<M> {
    /// Wraps `inner` with [`DEFAULT_ATTEMPTS`] attempts.
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            attempts: DEFAULT_ATTEMPTS,
        }
    }

    /// Sets the total number of attempts. Zero is treated as one.
    #[must_use]
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<R: ?Sized, M: Materializer<R>> Materializer<R> for Retrying<M> {
    fn materialize(&self, record_ref: &R) -> Result<Record, MaterializeError> {
        let mut attempt = 1;
        loop {
            match self.inner.materialize(record_ref) {
                Err(err) if err.is_transient() && attempt < self.attempts => {
                    warn!(attempt, "materialization failed, retrying: {err}");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
