//! Choosing one edition among the hits of a search.

use super::ResolveOptions;
use crate::hit::{Hit, HitCollection};
use crate::identifier::Identifier;
use crate::materialize::{MaterializeError, Materializer};
use std::cmp::Reverse;
use tracing::debug;

/// Pick the hit that best answers `query`.
///
/// 1. With a year in the query, the first hit of exactly that year, if its
///    record also satisfies the date range of `options`.
/// 2. With a date range, candidates whose year is in range are tried newest
///    first, materializing one at a time until a published date fits.
/// 3. Otherwise the hit with the latest year; ties go to the earliest hit.
///
/// # Errors
///
/// Returns the materializer's error for the first candidate that fails.
pub(crate) fn find_match<'h, R, M>(
    hits: &'h HitCollection<R>,
    query: &Identifier,
    options: &ResolveOptions,
    materializer: &M,
) -> Result<Option<&'h Hit<R>>, MaterializeError>
where
    M: Materializer<R> + ?Sized,
{
    if let Some(year) = query.year {
        let Some(hit) = hits.iter().find(|h| h.year() == Some(year)) else {
            return Ok(None);
        };
        return verify(hit, options, materializer);
    }

    if options.has_date_filter() {
        let mut candidates: Vec<&Hit<R>> = hits
            .iter()
            .filter(|h| options.year_in_range(h.year().unwrap_or(0)))
            .collect();
        candidates.sort_by_key(|h| Reverse(h.year().unwrap_or(0)));

        for hit in candidates {
            if let Some(hit) = verify(hit, options, materializer)? {
                return Ok(Some(hit));
            }
            debug!(code = %hit.code(), "published outside the requested range");
        }
        return Ok(None);
    }

    // `max_by_key` keeps the last maximum, so walk backwards
    Ok(hits.iter().rev().max_by_key(|h| h.year().unwrap_or(0)))
}

fn verify<'h, R, M>(
    hit: &'h Hit<R>,
    options: &ResolveOptions,
    materializer: &M,
) -> Result<Option<&'h Hit<R>>, MaterializeError>
where
    M: Materializer<R> + ?Sized,
{
    if !options.has_date_filter() {
        return Ok(Some(hit));
    }
    let record = hit.record(materializer)?;
    Ok(options.published_in_range(record).then_some(hit))
}
