//! Reconstructs per-court availability from the filtered slot feed.
//!
//! The feed does not reliably identify which physical court a record refers
//! to: a period may arrive unsplit (zero or more embedded locations), split
//! into one item per court, or with the still-free court's record missing
//! entirely. Aggregation groups records by start time and applies one policy
//! per group shape, then resolves the whole window into a tagged
//! [`AggregationResult`].

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, instrument};

use crate::error::{CheckError, Result};
use crate::model::court::{CourtAvailability, SlotPeriod};
use crate::model::slot::{SlotData, SlotItem};

pub const COURT_ONE_NAME: &str = "Squash Court 1";
pub const COURT_ONE_ID: &str = "041ZSQU001";
pub const COURT_TWO_NAME: &str = "Squash Court 2";
pub const COURT_TWO_ID: &str = "041ZSQU002";

/// Name used when a window resolves to a partial booking and the feed gives
/// no way to tell which court is the free one.
pub const PARTIAL_BOOKING_NAME: &str = "Available Courts";
pub const PARTIAL_BOOKING_ID: &str = "partial_booking";

/// Strict half-open overlap: `[a_start, a_end)` and `[b_start, b_end)`
/// overlap iff `a_start < b_end && a_end > b_start`. Sharing an endpoint is
/// not an overlap.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// A half-open query window, normalized to UTC through the facility's
/// declared timezone. The local calendar date is kept for the date-equality
/// check during filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowQuery {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub local_date: NaiveDate,
}

impl WindowQuery {
    /// Build a window from naive local bounds. Ambiguous local times (the
    /// repeated hour of a DST transition) resolve to the earlier instant;
    /// nonexistent local times are an input error.
    pub fn from_local(start: NaiveDateTime, end: NaiveDateTime, tz: Tz) -> Result<Self> {
        Ok(WindowQuery {
            start_utc: resolve_local(start, tz)?,
            end_utc: resolve_local(end, tz)?,
            local_date: start.date(),
        })
    }
}

fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(CheckError::Input(format!(
            "local time {} does not exist in {}",
            naive, tz
        ))),
    }
}

/// Parse a feed timestamp (`Z` or explicit offset) to UTC.
pub fn parse_feed_timestamp(raw: Option<&str>) -> Result<DateTime<Utc>> {
    let raw = raw.ok_or_else(|| CheckError::MalformedSlot("missing timestamp".to_string()))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CheckError::MalformedSlot(format!("bad timestamp {:?}: {}", raw, e)))
}

fn parse_period(data: &SlotData) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = parse_feed_timestamp(data.start_date.as_deref())?;
    let end = parse_feed_timestamp(data.end_date.as_deref())?;
    Ok((start, end))
}

/// Court a slot was assigned to by a disambiguation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourtIdentity {
    pub name: String,
    pub id: String,
}

/// Decides which physical court a slot belongs to when the feed publishes
/// several items at the same start time without reliable location data.
pub trait CourtDisambiguationPolicy {
    fn infer_court(&self, slot: &SlotData) -> CourtIdentity;
}

/// Places Leisure heuristic: exactly two courts exist, and the available one
/// always carries a non-zero price while the booked one shows zero remaining
/// uses and zero price. A property of this provider's feed, not a general
/// rule.
#[derive(Debug, Default)]
pub struct TwoCourtPricePolicy;

impl CourtDisambiguationPolicy for TwoCourtPricePolicy {
    fn infer_court(&self, slot: &SlotData) -> CourtIdentity {
        if slot.remaining_uses > 0 && slot.first_offer_price() > 0.0 {
            CourtIdentity {
                name: COURT_TWO_NAME.to_string(),
                id: COURT_TWO_ID.to_string(),
            }
        } else {
            CourtIdentity {
                name: COURT_ONE_NAME.to_string(),
                id: COURT_ONE_ID.to_string(),
            }
        }
    }
}

/// One window's aggregation outcome, decided once after every start-time
/// group has been processed. A partial-booking signal supersedes the
/// per-court view for the whole window; when several groups raise the
/// signal, the last one processed carries the period.
#[derive(Debug)]
pub enum AggregationResult {
    PerCourt(BTreeMap<String, CourtAvailability>),
    PartialBooking(SlotPeriod),
}

impl AggregationResult {
    /// Collapse into map form. A partial booking becomes the single
    /// synthetic "Available Courts" entry with one bookable use.
    pub fn into_court_map(self) -> BTreeMap<String, CourtAvailability> {
        match self {
            AggregationResult::PerCourt(courts) => courts,
            AggregationResult::PartialBooking(period) => {
                let mut entry = CourtAvailability::new(PARTIAL_BOOKING_ID.to_string());
                entry.record_period(period);
                let mut courts = BTreeMap::new();
                courts.insert(PARTIAL_BOOKING_NAME.to_string(), entry);
                courts
            }
        }
    }
}

/// Number of courts marked available in a resolved window.
pub fn available_count(courts: &BTreeMap<String, CourtAvailability>) -> usize {
    courts.values().filter(|c| c.available).count()
}

/// Court names available in both windows, in name order.
pub fn courts_available_in_both(
    main: &BTreeMap<String, CourtAvailability>,
    before: &BTreeMap<String, CourtAvailability>,
) -> Vec<String> {
    main.iter()
        .filter(|(name, info)| {
            info.available && before.get(*name).is_some_and(|b| b.available)
        })
        .map(|(name, _)| name.clone())
        .collect()
}

/// Filters the feed to one facility and window, then reconstructs per-court
/// availability from the filtered set.
pub struct AvailabilityResolver {
    facility_ids: Vec<String>,
    tz: Tz,
    policy: Box<dyn CourtDisambiguationPolicy + Send + Sync>,
}

impl AvailabilityResolver {
    pub fn new(facility_ids: Vec<String>, tz: Tz) -> Self {
        Self::with_policy(facility_ids, tz, Box::new(TwoCourtPricePolicy))
    }

    /// Swap in a venue-specific disambiguation heuristic.
    pub fn with_policy(
        facility_ids: Vec<String>,
        tz: Tz,
        policy: Box<dyn CourtDisambiguationPolicy + Send + Sync>,
    ) -> Self {
        AvailabilityResolver { facility_ids, tz, policy }
    }

    /// Retain slots for the target facility whose period overlaps the window.
    ///
    /// The facility test is a substring match against `facilityUse` (the feed
    /// embeds the id inside a longer URI). Slots with missing or unparsable
    /// timestamps are expected noise and dropped here. The calendar-date
    /// check is evaluated in the facility timezone.
    #[instrument(level = "debug", skip(self, items), fields(total = items.len()))]
    pub fn filter_by_window<'a>(
        &self,
        items: &'a [SlotItem],
        window: &WindowQuery,
    ) -> Vec<&'a SlotData> {
        let mut matched: Vec<&SlotData> = Vec::new();

        for item in items {
            let Some(data) = item.data.as_ref() else {
                continue;
            };
            if !self.is_target_facility(&data.facility_use) {
                continue;
            }
            let (slot_start, slot_end) = match parse_period(data) {
                Ok(period) => period,
                Err(e) => {
                    debug!(error = %e, "Dropping slot with unparsable timestamps");
                    continue;
                }
            };
            if slot_start.with_timezone(&self.tz).date_naive() != window.local_date {
                continue;
            }
            if overlaps(slot_start, slot_end, window.start_utc, window.end_utc) {
                matched.push(data);
            }
        }

        debug!(matched = matched.len(), "Filtered slots for window");
        matched
    }

    fn is_target_facility(&self, facility_use: &str) -> bool {
        self.facility_ids.iter().any(|id| facility_use.contains(id.as_str()))
    }

    /// Group the filtered slots by exact start-time string and fold each
    /// group into the per-court view; see the module docs for the group
    /// policies.
    pub fn aggregate_by_court(&self, slots: &[&SlotData]) -> AggregationResult {
        // Group by the raw startDate string, preserving first-seen order.
        let mut group_index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<Vec<&SlotData>> = Vec::new();
        for &slot in slots {
            let key = slot.start_date.as_deref().unwrap_or("");
            match group_index.get(key) {
                Some(&i) => groups[i].push(slot),
                None => {
                    group_index.insert(key, groups.len());
                    groups.push(vec![slot]);
                }
            }
        }

        let mut courts: BTreeMap<String, CourtAvailability> = BTreeMap::new();
        let mut partial_signal: Option<SlotPeriod> = None;

        for group in &mut groups {
            if group.len() == 1 {
                if let Some(period) = self.process_single_slot(group[0], &mut courts) {
                    partial_signal = Some(period);
                }
            } else {
                self.process_multiple_court_slots(group, &mut courts);
            }
        }

        match partial_signal {
            Some(period) => AggregationResult::PartialBooking(period),
            None => AggregationResult::PerCourt(courts),
        }
    }

    /// One item at this start time: the feed has not split the period by
    /// court. Zero locations means a facility-level record; otherwise the
    /// period fans out to every attached location. Returns a partial-booking
    /// signal when the record is the booked half of a two-court period
    /// (zero remaining, real price, exactly two locations); the still-free
    /// half was omitted from the feed entirely.
    fn process_single_slot(
        &self,
        slot: &SlotData,
        courts: &mut BTreeMap<String, CourtAvailability>,
    ) -> Option<SlotPeriod> {
        let period = SlotPeriod {
            start: slot.start_date.clone(),
            end: slot.end_date.clone(),
            remaining: slot.remaining_uses,
        };

        if slot.locations.is_empty() {
            let name = format!("Squash Court ({})", slot.identifier_str());
            courts
                .entry(name)
                .or_insert_with(|| CourtAvailability::new(slot.identifier_str()))
                .record_period(period.clone());
        } else {
            for location in &slot.locations {
                let name = match location.name.as_deref() {
                    Some(n) if !n.is_empty() => n.to_string(),
                    _ => format!("Squash Court ({})", location.identifier_str()),
                };
                let id = location
                    .identifier
                    .as_ref()
                    .map(|_| location.identifier_str())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| slot.identifier_str());
                courts
                    .entry(name)
                    .or_insert_with(|| CourtAvailability::new(id))
                    .record_period(period.clone());
            }
        }

        let partially_booked = slot.remaining_uses == 0 && slot.first_offer_price() > 0.0;
        if partially_booked && slot.locations.len() == 2 {
            debug!(
                start = ?slot.start_date,
                "Partial booking detected; one unidentified court is free"
            );
            return Some(SlotPeriod {
                start: slot.start_date.clone(),
                end: slot.end_date.clone(),
                remaining: 1,
            });
        }
        None
    }

    /// Several items at one start time: the feed has split the period by
    /// court but the per-item location data is unreliable, so court identity
    /// comes from the disambiguation policy. An embedded location whose name
    /// matches the inferred court contributes its own identifier.
    fn process_multiple_court_slots(
        &self,
        group: &mut Vec<&SlotData>,
        courts: &mut BTreeMap<String, CourtAvailability>,
    ) {
        // Sort for reproducible assignment only; the order carries no
        // semantic meaning.
        group.sort_by_key(|s| s.identifier_str());

        for slot in group.iter() {
            let inferred = self.policy.infer_court(slot);
            let id = match slot
                .locations
                .iter()
                .find(|l| l.name.as_deref() == Some(inferred.name.as_str()))
            {
                Some(location) => location.identifier_str(),
                None => inferred.id,
            };

            let period = SlotPeriod {
                start: slot.start_date.clone(),
                end: slot.end_date.clone(),
                remaining: slot.remaining_uses,
            };
            courts
                .entry(inferred.name)
                .or_insert_with(|| CourtAvailability::new(id))
                .record_period(period);
        }
    }
}
