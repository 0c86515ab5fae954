use chrono::NaiveDate;

/// Parses a date written with year, year-month or full precision.
///
/// Missing month or day default to the first, so `2016` reads as
/// `2016-01-01` and `2016-12` as `2016-12-01`.
///
/// # Arguments
///
/// * `value` - The date string, e.g. `2016`, `2016-12` or `2016-12-14`
pub(crate) fn parse_partial_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let mut parts = value.splitn(3, '-');

    let year = parts.next()?.parse::<i32>().ok()?;
    let month = match parts.next() {
        Some(m) => m.parse::<u32>().ok()?,
        None => 1,
    };
    let day = match parts.next() {
        // tolerate a trailing time, as in `2016-12-14T00:00:00`
        Some(d) => d.get(..2).unwrap_or(d).parse::<u32>().ok()?,
        None => 1,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Sorted, deduplicated copy of the given values.
pub(crate) fn sorted_unique<T: Ord, I: IntoIterator<Item = T>>(values: I) -> Vec<T> {
    use itertools::Itertools;

    values.into_iter().sorted().dedup().collect()
}
