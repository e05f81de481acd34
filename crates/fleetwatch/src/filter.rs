//! Filter, search and sort pipeline.
//!
//! Filter dimensions are independent. An empty dimension places no
//! constraint; a populated one passes an entity when any selected value
//! matches. Dimensions combine with AND.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::flags::FlagColor;
use crate::status::Severity;

/// Date attribute an entity list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Resolved ETA.
    #[default]
    Eta,
    /// Resolved ETB.
    Etb,
    /// Resolved ETD.
    Etd,
    /// Build date.
    BuildDate,
    /// Last PSC inspection.
    PscInspection,
    /// Last AMSA inspection.
    AmsaInspection,
    /// Defect target date.
    TargetDate,
    /// Defect report date.
    ReportedDate,
}

impl SortKey {
    /// Whether this key is a scheduling date, for which overdue-first applies.
    #[must_use]
    pub fn is_scheduling(self) -> bool {
        matches!(self, Self::Eta | Self::Etb | Self::Etd | Self::TargetDate)
    }

    /// Config/CLI name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eta => "eta",
            Self::Etb => "etb",
            Self::Etd => "etd",
            Self::BuildDate => "build_date",
            Self::PscInspection => "psc_inspection",
            Self::AmsaInspection => "amsa_inspection",
            Self::TargetDate => "target_date",
            Self::ReportedDate => "reported_date",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "eta" => Ok(Self::Eta),
            "etb" => Ok(Self::Etb),
            "etd" => Ok(Self::Etd),
            "build_date" => Ok(Self::BuildDate),
            "psc_inspection" => Ok(Self::PscInspection),
            "amsa_inspection" => Ok(Self::AmsaInspection),
            "target_date" => Ok(Self::TargetDate),
            "reported_date" => Ok(Self::ReportedDate),
            _ => Err(Error::unknown_value("sort key", s)),
        }
    }
}

/// An entity the pipeline can filter and sort.
pub trait Filterable {
    /// Stable identity, used as the final sort tie-breaker.
    fn id(&self) -> i64;

    /// Derived severity.
    fn severity(&self) -> Severity;

    /// The current user's flag.
    fn flag(&self) -> FlagColor;

    /// Fields searched by the free-text filter.
    fn search_fields(&self) -> Vec<&str>;

    /// Category for the category filter.
    fn category(&self) -> Option<&str>;

    /// Numeric quality for the threshold filter.
    fn quality(&self) -> Option<f64>;

    /// Date used by the date-range filter.
    fn primary_date(&self) -> Option<NaiveDate>;

    /// Timestamp for a sort key, midnight for plain dates; `None` sorts last.
    fn sort_date(&self, key: SortKey) -> Option<NaiveDateTime>;
}

impl<T: Filterable + ?Sized> Filterable for &T {
    fn id(&self) -> i64 {
        (**self).id()
    }
    fn severity(&self) -> Severity {
        (**self).severity()
    }
    fn flag(&self) -> FlagColor {
        (**self).flag()
    }
    fn search_fields(&self) -> Vec<&str> {
        (**self).search_fields()
    }
    fn category(&self) -> Option<&str> {
        (**self).category()
    }
    fn quality(&self) -> Option<f64> {
        (**self).quality()
    }
    fn primary_date(&self) -> Option<NaiveDate> {
        (**self).primary_date()
    }
    fn sort_date(&self, key: SortKey) -> Option<NaiveDateTime> {
        (**self).sort_date(key)
    }
}

/// Active filter selections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    /// Allowed severities.
    pub severities: BTreeSet<Severity>,
    /// Allowed flag colors.
    pub flags: BTreeSet<FlagColor>,
    /// Free-text query.
    pub search: Option<String>,
    /// Allowed categories (case-insensitive).
    pub categories: BTreeSet<String>,
    /// Minimum quality, inclusive.
    pub min_quality: Option<f64>,
    /// Earliest primary date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest primary date, inclusive.
    pub date_to: Option<NaiveDate>,
}

impl FilterState {
    /// Whether no dimension is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.severities.is_empty()
            && self.flags.is_empty()
            && self.search_query().is_none()
            && self.categories.is_empty()
            && self.min_quality.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }

    /// The search query, if it has any non-whitespace content.
    #[must_use]
    pub fn search_query(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// Case-insensitive literal substring matcher.
#[derive(Debug)]
struct SearchMatcher {
    regex: Option<Regex>,
    lowered: String,
}

impl SearchMatcher {
    fn new(query: &str) -> Self {
        let regex = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
            .ok();
        Self {
            regex,
            lowered: query.to_lowercase(),
        }
    }

    fn is_match(&self, haystack: &str) -> bool {
        match &self.regex {
            Some(re) => re.is_match(haystack),
            None => haystack.to_lowercase().contains(&self.lowered),
        }
    }
}

/// A compiled filter, reusable across entities.
#[derive(Debug)]
pub struct FilterPipeline<'a> {
    state: &'a FilterState,
    search: Option<SearchMatcher>,
    categories: BTreeSet<String>,
}

impl<'a> FilterPipeline<'a> {
    /// Compile a filter state.
    #[must_use]
    pub fn new(state: &'a FilterState) -> Self {
        Self {
            state,
            search: state.search_query().map(SearchMatcher::new),
            categories: state
                .categories
                .iter()
                .map(|c| c.trim().to_lowercase())
                .collect(),
        }
    }

    /// Whether an entity passes every active dimension.
    pub fn matches<T: Filterable>(&self, entity: &T) -> bool {
        let state = self.state;

        if !state.severities.is_empty() && !state.severities.contains(&entity.severity()) {
            return false;
        }

        if !state.flags.is_empty() && !state.flags.contains(&entity.flag()) {
            return false;
        }

        if let Some(matcher) = &self.search {
            if !entity.search_fields().iter().any(|f| matcher.is_match(f)) {
                return false;
            }
        }

        if !self.categories.is_empty() {
            let passes = entity
                .category()
                .is_some_and(|c| self.categories.contains(&c.trim().to_lowercase()));
            if !passes {
                return false;
            }
        }

        if let Some(min) = state.min_quality {
            if !entity.quality().is_some_and(|q| q >= min) {
                return false;
            }
        }

        if state.date_from.is_some() || state.date_to.is_some() {
            let Some(date) = entity.primary_date() else {
                return false;
            };
            if state.date_from.is_some_and(|from| date < from)
                || state.date_to.is_some_and(|to| date > to)
            {
                return false;
            }
        }

        true
    }
}

/// Keep the entities that pass `state`, preserving input order.
#[must_use]
pub fn apply_filters<'a, T: Filterable>(entities: &'a [T], state: &FilterState) -> Vec<&'a T> {
    let pipeline = FilterPipeline::new(state);
    let kept: Vec<&T> = entities.iter().filter(|e| pipeline.matches(*e)).collect();
    debug!(
        total = entities.len(),
        kept = kept.len(),
        "Applied filters"
    );
    kept
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Oldest first.
    #[default]
    Ascending,
    /// Newest first.
    Descending,
}

/// How to order a filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    /// Date to sort by.
    pub key: SortKey,
    /// Direction; ignored for scheduling keys when `overdue_first` is set.
    pub direction: SortDirection,
    /// Put entities whose date is before today first, each group ascending.
    pub overdue_first: bool,
}

impl SortSpec {
    /// Whether the overdue split replaces the requested direction.
    #[must_use]
    pub fn ignores_direction(&self) -> bool {
        self.overdue_first && self.key.is_scheduling()
    }

    /// Compare two entities under this spec.
    pub fn compare<T: Filterable>(&self, a: &T, b: &T, today: NaiveDate) -> Ordering {
        let by_date = match (a.sort_date(self.key), b.sort_date(self.key)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                if self.ignores_direction() {
                    (y.date() < today)
                        .cmp(&(x.date() < today))
                        .then(x.cmp(&y))
                } else {
                    match self.direction {
                        SortDirection::Ascending => x.cmp(&y),
                        SortDirection::Descending => y.cmp(&x),
                    }
                }
            }
        };
        by_date.then_with(|| a.id().cmp(&b.id()))
    }
}

/// Sort entities in place.
pub fn sort_entities<T: Filterable>(entities: &mut [T], spec: &SortSpec, today: NaiveDate) {
    trace!(
        key = %spec.key,
        direction = ?spec.direction,
        overdue_first = spec.overdue_first,
        "Sorting"
    );
    entities.sort_by(|a, b| spec.compare(a, b, today));
}
