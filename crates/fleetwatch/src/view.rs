//! The vessel list view.
//!
//! Building the visible list runs in fixed order: enrich each vessel with its
//! status, resolved schedule and flag; reduce to the baseline list
//! ([`filtered_vessels`]); apply the user's filters; sort; paginate.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dates;
use crate::filter::{apply_filters, sort_entities, FilterState, Filterable, SortKey, SortSpec};
use crate::flags::{FlagColor, FlagSet};
use crate::overrides::{resolve_schedule, ResolvedField};
use crate::status::{CompositeStatus, Severity, StatusEngine};
use crate::vessel::{ScheduleField, Vessel};

/// A vessel with everything derived for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedVessel {
    /// The underlying record.
    pub vessel: Vessel,
    /// Composite traffic-light status.
    pub status: CompositeStatus,
    /// ETA, ETB and ETD after override resolution.
    pub schedule: Vec<ResolvedField>,
    /// The current user's flag.
    pub flag: FlagColor,
}

impl EnrichedVessel {
    /// Derive display state for one vessel.
    #[must_use]
    pub fn new(vessel: Vessel, engine: &StatusEngine, flags: &FlagSet, today: NaiveDate) -> Self {
        let status = engine.compute(&vessel, today);
        let schedule = resolve_schedule(&vessel.schedule, today).into();
        let flag = flags.get(vessel.id);
        Self {
            vessel,
            status,
            schedule,
            flag,
        }
    }

    /// Resolved scheduling field.
    #[must_use]
    pub fn field(&self, field: ScheduleField) -> Option<&ResolvedField> {
        self.schedule.iter().find(|f| f.field == field)
    }

    fn resolved_date(&self, field: ScheduleField) -> Option<NaiveDate> {
        self.field(field).and_then(ResolvedField::date)
    }

    fn resolved_timestamp(&self, field: ScheduleField) -> Option<NaiveDateTime> {
        self.field(field).and_then(ResolvedField::timestamp)
    }
}

impl Filterable for EnrichedVessel {
    fn id(&self) -> i64 {
        self.vessel.id
    }

    fn severity(&self) -> Severity {
        self.status.severity
    }

    fn flag(&self) -> FlagColor {
        self.flag
    }

    fn search_fields(&self) -> Vec<&str> {
        let v = &self.vessel;
        let mut fields = vec![v.name.as_str(), v.imo_number.as_str()];
        fields.extend(v.vessel_type.as_deref());
        fields.extend(v.comments.as_deref());
        fields
    }

    fn category(&self) -> Option<&str> {
        self.vessel.vessel_type.as_deref()
    }

    fn quality(&self) -> Option<f64> {
        self.vessel.quality_score
    }

    fn primary_date(&self) -> Option<NaiveDate> {
        self.resolved_date(ScheduleField::Eta)
    }

    fn sort_date(&self, key: SortKey) -> Option<NaiveDateTime> {
        let v = &self.vessel;
        match key {
            SortKey::Eta => self.resolved_timestamp(ScheduleField::Eta),
            SortKey::Etb => self.resolved_timestamp(ScheduleField::Etb),
            SortKey::Etd => self.resolved_timestamp(ScheduleField::Etd),
            SortKey::BuildDate => dates::parse_timestamp_opt(v.build_date.as_deref()),
            SortKey::PscInspection => dates::parse_timestamp_opt(v.psc_last_inspection.as_deref()),
            SortKey::AmsaInspection => {
                dates::parse_timestamp_opt(v.amsa_last_inspection.as_deref())
            }
            SortKey::TargetDate | SortKey::ReportedDate => None,
        }
    }
}

/// Keep one active vessel per IMO number, the one with the highest id.
///
/// Inactive vessels and active vessels without an IMO number pass through
/// untouched. Survivors keep their input order.
#[must_use]
pub fn dedupe_active(vessels: &[Vessel]) -> Vec<&Vessel> {
    let mut winners: HashMap<&str, i64> = HashMap::new();
    for v in vessels.iter().filter(|v| v.is_active()) {
        let imo = v.imo_number.trim();
        if imo.is_empty() {
            continue;
        }
        winners
            .entry(imo)
            .and_modify(|best| *best = (*best).max(v.id))
            .or_insert(v.id);
    }

    let mut emitted: HashSet<&str> = HashSet::new();
    vessels
        .iter()
        .filter(|v| {
            let imo = v.imo_number.trim();
            if !v.is_active() || imo.is_empty() {
                return true;
            }
            winners.get(imo) == Some(&v.id) && emitted.insert(imo)
        })
        .collect()
}

/// Whether a vessel's resolved ETD is further in the past than the horizon.
fn departed_beyond(vessel: &Vessel, horizon_days: u32, today: NaiveDate) -> bool {
    let cutoff = today - Duration::days(i64::from(horizon_days));
    dates::parse_opt(vessel.schedule.etd.resolved().map(String::as_str))
        .is_some_and(|etd| etd < cutoff)
}

/// The baseline list every filter starts from.
///
/// Active duplicates are collapsed by IMO number and, when a horizon is set,
/// vessels that departed more than `horizon_days` ago are dropped.
#[must_use]
pub fn filtered_vessels(
    vessels: &[Vessel],
    horizon_days: Option<u32>,
    today: NaiveDate,
) -> Vec<&Vessel> {
    let deduped = dedupe_active(vessels);
    let kept: Vec<&Vessel> = match horizon_days {
        Some(days) => deduped
            .into_iter()
            .filter(|v| !departed_beyond(v, days, today))
            .collect(),
        None => deduped,
    };
    debug!(total = vessels.len(), baseline = kept.len(), "Built baseline vessel list");
    kept
}

/// Pagination request, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, starting at 1.
    pub page: usize,
    /// Items per page.
    pub per_page: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 25,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Page number, starting at 1.
    pub page: usize,
    /// Items per page.
    pub per_page: usize,
    /// Items across all pages.
    pub total_items: usize,
    /// Number of pages (0 when there are no items).
    pub total_pages: usize,
}

/// Cut one page out of an ordered list.
///
/// Page numbers below 1 are treated as 1, a page size of 0 as 1.
#[must_use]
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let per_page = request.per_page.max(1);
    let page = request.page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let start = (page - 1).saturating_mul(per_page);
    let items = items.into_iter().skip(start).take(per_page).collect();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

/// Everything that shapes the visible list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewQuery {
    /// User filters.
    pub filters: FilterState,
    /// Ordering.
    pub sort: SortSpec,
    /// Page to show.
    pub page: PageRequest,
    /// Departed horizon for the baseline list.
    pub horizon_days: Option<u32>,
}

/// Builds the visible vessel page from a snapshot.
#[derive(Debug, Clone, Default)]
pub struct FleetView {
    engine: StatusEngine,
}

impl FleetView {
    /// Create a view using the given status engine.
    #[must_use]
    pub fn new(engine: StatusEngine) -> Self {
        Self { engine }
    }

    /// Enrich every vessel of a snapshot.
    #[must_use]
    pub fn enrich(
        &self,
        vessels: &[&Vessel],
        flags: &FlagSet,
        today: NaiveDate,
    ) -> Vec<EnrichedVessel> {
        vessels
            .iter()
            .map(|v| EnrichedVessel::new((*v).clone(), &self.engine, flags, today))
            .collect()
    }

    /// Run the full pipeline and return the requested page.
    #[must_use]
    pub fn run(
        &self,
        vessels: &[Vessel],
        flags: &FlagSet,
        query: &ViewQuery,
        today: NaiveDate,
    ) -> Page<EnrichedVessel> {
        let baseline = filtered_vessels(vessels, query.horizon_days, today);
        let enriched = self.enrich(&baseline, flags, today);

        let mut visible = apply_filters(&enriched, &query.filters);
        sort_entities(&mut visible, &query.sort, today);

        let ordered: Vec<EnrichedVessel> = visible.into_iter().cloned().collect();
        paginate(ordered, query.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vessel::{Overridable, Schedule};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn vessel(id: i64, imo: &str, status: &str) -> Vessel {
        Vessel {
            id,
            imo_number: imo.to_string(),
            name: format!("Vessel {id}"),
            status: status.to_string(),
            ..Vessel::default()
        }
    }

    fn with_eta(mut v: Vessel, eta: Option<&str>) -> Vessel {
        v.schedule.eta = Overridable::new(eta.map(str::to_string));
        v
    }

    fn ids(vessels: &[&Vessel]) -> Vec<i64> {
        vessels.iter().map(|v| v.id).collect()
    }

    #[test]
    fn test_dedupe_keeps_highest_active_id() {
        let vessels = vec![
            vessel(3, "9000001", "active"),
            vessel(7, "9000001", "active"),
            vessel(5, "9000002", "active"),
        ];
        assert_eq!(ids(&dedupe_active(&vessels)), vec![7, 5]);
    }

    #[test]
    fn test_dedupe_ignores_inactive() {
        let vessels = vec![
            vessel(3, "9000001", "inactive"),
            vessel(7, "9000001", "inactive"),
            vessel(9, "9000001", "active"),
            vessel(4, "9000001", "active"),
        ];
        assert_eq!(ids(&dedupe_active(&vessels)), vec![3, 7, 9]);
    }

    #[test]
    fn test_dedupe_skips_missing_imo() {
        let vessels = vec![vessel(1, "", "active"), vessel(2, " ", "active")];
        assert_eq!(ids(&dedupe_active(&vessels)), vec![1, 2]);
    }

    #[test]
    fn test_dedupe_same_id_emits_once() {
        let vessels = vec![vessel(4, "9000001", "active"), vessel(4, "9000001", "Active")];
        assert_eq!(ids(&dedupe_active(&vessels)), vec![4]);
    }

    #[test]
    fn test_departed_horizon() {
        let mut old = vessel(1, "1", "active");
        old.schedule.etd = Overridable::new(Some("2024-05-01".to_string()));
        let mut recent = vessel(2, "2", "active");
        recent.schedule.etd = Overridable::new(Some("2024-05-28".to_string()));
        let mut overridden = vessel(3, "3", "active");
        overridden.schedule.etd = Overridable::with_override(
            Some("2024-05-01".to_string()),
            Some("2024-06-05".to_string()),
        );
        let undated = vessel(4, "4", "active");
        let vessels = vec![old, recent, overridden, undated];

        assert_eq!(ids(&filtered_vessels(&vessels, Some(7), today())), vec![2, 3, 4]);
        assert_eq!(filtered_vessels(&vessels, None, today()).len(), 4);
    }

    #[test]
    fn test_paginate() {
        let page = paginate((1..=7).collect::<Vec<_>>(), PageRequest { page: 2, per_page: 3 });
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total_items, 7);
        assert_eq!(page.total_pages, 3);

        let last = paginate((1..=7).collect::<Vec<_>>(), PageRequest { page: 3, per_page: 3 });
        assert_eq!(last.items, vec![7]);

        let beyond = paginate((1..=7).collect::<Vec<_>>(), PageRequest { page: 9, per_page: 3 });
        assert!(beyond.items.is_empty());

        let empty = paginate(Vec::<i32>::new(), PageRequest::default());
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_enriched_search_fields() {
        let mut v = vessel(1, "9321483", "active");
        v.vessel_type = Some("Tanker".to_string());
        v.comments = Some("Awaiting berth".to_string());
        let enriched = EnrichedVessel::new(v, &StatusEngine::default(), &FlagSet::new(), today());
        assert_eq!(
            enriched.search_fields(),
            vec!["Vessel 1", "9321483", "Tanker", "Awaiting berth"]
        );
    }

    #[test]
    fn test_run_filters_by_status_and_flag() {
        let mut red_unflagged = vessel(1, "1", "active");
        red_unflagged.checklist_status = Some("Pending".to_string());
        let mut red_flagged = vessel(2, "2", "active");
        red_flagged.checklist_status = Some("Pending".to_string());
        let mut green = vessel(3, "3", "active");
        green.checklist_status = Some("Acknowledged".to_string());
        let grey = vessel(4, "4", "active");
        let vessels = vec![red_unflagged, red_flagged, green, grey];

        let flags: FlagSet = [(2, FlagColor::Yellow)].into_iter().collect();
        let view = FleetView::default();

        let query = ViewQuery {
            filters: FilterState {
                severities: [Severity::Red].into(),
                flags: [FlagColor::None].into(),
                ..FilterState::default()
            },
            ..ViewQuery::default()
        };
        let page = view.run(&vessels, &flags, &query, today());
        let got: Vec<_> = page.items.iter().map(|e| e.vessel.id).collect();
        assert_eq!(got, vec![1]);

        let page = view.run(&vessels, &flags, &ViewQuery::default(), today());
        assert_eq!(page.total_items, 4);
    }

    #[test]
    fn test_run_off_filters_keeps_dedup() {
        let vessels = vec![
            vessel(1, "9000001", "active"),
            vessel(2, "9000001", "active"),
            vessel(3, "9000001", "inactive"),
        ];
        let query = ViewQuery::default();
        let page = FleetView::default().run(&vessels, &FlagSet::new(), &query, today());
        let mut got: Vec<_> = page.items.iter().map(|e| e.vessel.id).collect();
        got.sort_unstable();
        assert_eq!(got, vec![2, 3]);
    }

    #[test]
    fn test_run_sorts_null_eta_last() {
        let vessels = vec![
            with_eta(vessel(1, "1", "active"), None),
            with_eta(vessel(2, "2", "active"), Some("2024-01-01")),
            with_eta(vessel(3, "3", "active"), Some("2023-01-01")),
        ];
        let query = ViewQuery::default();
        let page = FleetView::default().run(&vessels, &FlagSet::new(), &query, today());
        let etas: Vec<_> = page
            .items
            .iter()
            .map(|e| e.field(ScheduleField::Eta).and_then(|f| f.value.clone()))
            .collect();
        assert_eq!(
            etas,
            vec![
                Some("2023-01-01".to_string()),
                Some("2024-01-01".to_string()),
                None
            ]
        );
    }

    #[test]
    fn test_run_sorts_by_override() {
        let mut a = with_eta(vessel(1, "1", "active"), Some("2024-07-01"));
        a.schedule = Schedule {
            eta: Overridable::with_override(
                Some("2024-07-01".to_string()),
                Some("2024-06-03".to_string()),
            ),
            ..Schedule::default()
        };
        let b = with_eta(vessel(2, "2", "active"), Some("2024-06-10"));
        let vessels = vec![b, a];
        let query = ViewQuery::default();
        let page = FleetView::default().run(&vessels, &FlagSet::new(), &query, today());
        let got: Vec<_> = page.items.iter().map(|e| e.vessel.id).collect();
        assert_eq!(got, vec![1, 2]);
    }

    #[test]
    fn test_run_orders_same_day_arrivals_by_time() {
        let vessels = vec![
            with_eta(vessel(1, "1", "active"), Some("2024-06-10T22:00:00Z")),
            with_eta(vessel(2, "2", "active"), Some("2024-06-10T01:00:00Z")),
        ];
        let query = ViewQuery::default();
        let page = FleetView::default().run(&vessels, &FlagSet::new(), &query, today());
        let got: Vec<_> = page.items.iter().map(|e| e.vessel.id).collect();
        assert_eq!(got, vec![2, 1]);
    }

    #[test]
    fn test_run_is_deterministic() {
        let vessels: Vec<_> = (1..=20)
            .map(|i| with_eta(vessel(i, &i.to_string(), "active"), Some("2024-06-15")))
            .collect();
        let view = FleetView::default();
        let first = view.run(&vessels, &FlagSet::new(), &ViewQuery::default(), today());
        let second = view.run(&vessels, &FlagSet::new(), &ViewQuery::default(), today());
        assert_eq!(first, second);
        assert_eq!(first.items[0].vessel.id, 1);
    }
}
