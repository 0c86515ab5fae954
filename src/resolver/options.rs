use crate::Record;
use crate::identifier::MatchConfig;
use crate::materialize::DEFAULT_ATTEMPTS;
use chrono::{Datelike, NaiveDate};

/// Per-request options for [`Resolver::get`](super::Resolver::get).
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use iecref::ResolveOptions;
///
/// let options = ResolveOptions {
///     publication_date_before: NaiveDate::from_ymd_opt(2010, 1, 1),
///     ..Default::default()
/// };
/// assert!(options.has_date_filter());
/// assert!(options.year_in_range(2009));
/// assert!(!options.year_in_range(2011));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Edition year; overrides the year in the code
    pub year: Option<i32>,
    /// Resolve the whole document family instead of one part
    pub all_parts: bool,
    /// Keep the year of an undated match instead of returning a most-recent
    /// reference
    pub keep_year: bool,
    /// Only accept editions published strictly before this date
    pub publication_date_before: Option<NaiveDate>,
    /// Only accept editions published on or after this date
    pub publication_date_after: Option<NaiveDate>,
}

impl ResolveOptions {
    pub fn has_date_filter(&self) -> bool {
        self.publication_date_before.is_some() || self.publication_date_after.is_some()
    }

    /// Coarse pre-check on the edition year; `0` (undated) is never in range.
    pub fn year_in_range(&self, year: i32) -> bool {
        if year == 0 {
            return false;
        }
        if self.publication_date_before.is_some_and(|d| year > d.year()) {
            return false;
        }
        if self.publication_date_after.is_some_and(|d| year < d.year()) {
            return false;
        }
        true
    }

    /// Exact check on the published date of a materialized record.
    ///
    /// A record without a published date passes.
    pub fn published_in_range(&self, record: &Record) -> bool {
        let Some(published) = record.published_date() else {
            return true;
        };
        if self.publication_date_before.is_some_and(|d| published >= d) {
            return false;
        }
        if self.publication_date_after.is_some_and(|d| published < d) {
            return false;
        }
        true
    }
}

/// Configuration of a [`Resolver`](super::Resolver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Identifier comparison settings used by every search
    pub match_config: MatchConfig,
    /// Total attempts per record on transient materialization failures
    pub materialize_attempts: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            match_config: MatchConfig::default(),
            materialize_attempts: DEFAULT_ATTEMPTS,
        }
    }
}
