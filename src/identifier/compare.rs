//! Comparison of identifiers modulo excluded fields.
//!
//! Identifiers are compared through a projection ([`ComparisonKey`]) with the
//! excluded fields removed. Excluding the deliverable type takes a separate
//! path: both sides are rendered without the type token at all and the
//! renderings are compared, because a nulled type would still read as
//! "International Standard" and miscompare against `TS`/`TR` entries.

use super::{Adjunct, DocType, Identifier};
use bitflags::bitflags;
use compact_str::CompactString;
use std::cmp::Ordering;

bitflags! {
    /// Identifier fields ignored when testing structural equality.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExcludeSet: u8 {
        /// Edition year and month.
        const YEAR = 1 << 0;
        /// Part number.
        const PART = 1 << 1;
        /// Deliverable type (TS, TR, ...).
        const TYPE = 1 << 2;
        /// Amendments, corrigenda and interpretation sheets.
        const ADJUNCTS = 1 << 3;
        /// Delivery format suffix (CSV, RLV, ...).
        const DELIVERABLE = 1 << 4;
    }
}

/// Matching behaviour that is not implied by the exclusion set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MatchConfig {
    /// When the type is excluded, also ignore the publisher prefix, so that
    /// `ISO/IEC TR 29110` matches `IEC 29110`.
    pub type_exclusion_ignores_publisher: bool,
}

/// Field-by-field projection used when the type is compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructuralKey<'a> {
    publisher: &'a str,
    doc_type: Option<DocType>,
    number: &'a str,
    part: Option<&'a str>,
    year: Option<i32>,
    month: Option<u8>,
    adjuncts: Option<&'a [Adjunct]>,
    deliverable: Option<&'a str>,
}

/// Comparison-only projection of an [`Identifier`] under an [`ExcludeSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComparisonKey<'a> {
    Structural(StructuralKey<'a>),
    /// Canonical rendering with no type token.
    TagFree(String),
}

impl Identifier {
    /// Project this identifier for comparison with the given fields removed.
    pub fn exclude(&self, fields: ExcludeSet, config: &MatchConfig) -> ComparisonKey<'_> {
        if fields.contains(ExcludeSet::TYPE) {
            return ComparisonKey::TagFree(
                self.render_with(fields, config.type_exclusion_ignores_publisher),
            );
        }

        let dated = !fields.contains(ExcludeSet::YEAR);
        ComparisonKey::Structural(StructuralKey {
            publisher: &self.publisher,
            doc_type: self.doc_type,
            number: &self.number,
            part: self.part().filter(|_| !fields.contains(ExcludeSet::PART)),
            year: self.year.filter(|_| dated),
            month: self.month.filter(|_| dated),
            adjuncts: Some(self.adjuncts.as_slice())
                .filter(|_| !fields.contains(ExcludeSet::ADJUNCTS)),
            deliverable: self
                .deliverable
                .as_deref()
                .filter(|_| !fields.contains(ExcludeSet::DELIVERABLE)),
        })
    }

    /// Whether two identifiers are equal once `fields` are ignored.
    pub fn matches(&self, other: &Identifier, fields: ExcludeSet, config: &MatchConfig) -> bool {
        self.exclude(fields, config) == other.exclude(fields, config)
    }
}

/// One dash-separated component of a part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartSegment {
    Number(u64),
    Text(CompactString),
}

impl Ord for PartSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PartSegment::Number(a), PartSegment::Number(b)) => a.cmp(b),
            (PartSegment::Number(_), PartSegment::Text(_)) => Ordering::Less,
            (PartSegment::Text(_), PartSegment::Number(_)) => Ordering::Greater,
            (PartSegment::Text(a), PartSegment::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for PartSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort key for compound parts: `2-6` sorts as `[2, 6]`, before `[2, 10]`.
/// A missing part is the empty sequence and sorts first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartKey(Vec<PartSegment>);

impl PartKey {
    pub fn from_part(part: Option<&str>) -> Self {
        let Some(part) = part else {
            return Self::default();
        };
        PartKey(
            part.split('-')
                .filter(|s| !s.is_empty())
                .map(|s| match s.parse::<u64>() {
                    Ok(n) => PartSegment::Number(n),
                    Err(_) => PartSegment::Text(CompactString::from(s)),
                })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
