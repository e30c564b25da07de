use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::{error, info, instrument};

use crate::availability::{
    AvailabilityResolver, WindowQuery, available_count, courts_available_in_both,
};
use crate::config::CheckerConfig;
use crate::error::{CheckError, Result};
use crate::model::report::{AvailabilityReport, TimeSlots, WindowTimes};
use crate::model::slot::SlotItem;
use crate::places_leisure::PlacesLeisure;

/// Parse caller-supplied query strings. Runs before any network call.
pub fn parse_query(date: &str, start_time: &str) -> Result<(NaiveDate, NaiveTime)> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| CheckError::Input(format!("bad date {:?}: {}", date, e)))?;
    let start_time = NaiveTime::parse_from_str(start_time, "%H:%M")
        .map_err(|e| CheckError::Input(format!("bad start time {:?}: {}", start_time, e)))?;
    Ok((date, start_time))
}

/// The target window and the one immediately before it, both slot-length.
#[derive(Debug, Clone)]
struct CheckWindows {
    main: WindowQuery,
    before: WindowQuery,
    main_start: NaiveDateTime,
    main_end: NaiveDateTime,
    before_start: NaiveDateTime,
    before_end: NaiveDateTime,
}

impl CheckWindows {
    /// Windows are computed on full local datetimes so a before-window that
    /// crosses midnight lands on the right calendar date.
    fn compute(date: NaiveDate, start_time: NaiveTime, config: &CheckerConfig) -> Result<Self> {
        let slot = Duration::minutes(config.slot_minutes);
        let main_start = date.and_time(start_time);
        let main_end = main_start + slot;
        let before_start = main_start - slot;
        let before_end = main_start;

        Ok(CheckWindows {
            main: WindowQuery::from_local(main_start, main_end, config.timezone)?,
            before: WindowQuery::from_local(before_start, before_end, config.timezone)?,
            main_start,
            main_end,
            before_start,
            before_end,
        })
    }

    fn time_slots(&self) -> TimeSlots {
        let hhmm = |dt: &NaiveDateTime| dt.format("%H:%M").to_string();
        TimeSlots {
            main: WindowTimes { start: hhmm(&self.main_start), end: hhmm(&self.main_end) },
            before: WindowTimes { start: hhmm(&self.before_start), end: hhmm(&self.before_end) },
        }
    }
}

/// Ties the feed client and the resolver together and renders the report.
pub struct SquashChecker {
    config: CheckerConfig,
    feed: PlacesLeisure,
    resolver: AvailabilityResolver,
}

impl SquashChecker {
    pub fn new(config: CheckerConfig) -> Self {
        let feed = PlacesLeisure::new(&config);
        let resolver = AvailabilityResolver::new(config.facility_ids.clone(), config.timezone);
        SquashChecker { config, feed, resolver }
    }

    /// Check availability for the slot starting at `start_time` on `date`
    /// and for the slot-length period before it. This is the outermost
    /// boundary: every failure is folded into a `success = false` report
    /// carrying the generic booking link.
    #[instrument(level = "info", skip(self))]
    pub fn check(&self, date: &str, start_time: &str) -> AvailabilityReport {
        match self.run(date, start_time) {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Availability check failed");
                AvailabilityReport::failure(
                    format!("Error checking availability: {}", e),
                    self.config.booking_base_url.clone(),
                    e.to_string(),
                )
            }
        }
    }

    fn run(&self, date: &str, start_time: &str) -> Result<AvailabilityReport> {
        let (date, start_time) = parse_query(date, start_time)?;
        let items = self.feed.fetch_all_slots()?;
        self.resolve_from_slots(&items, date, start_time)
    }

    /// Resolve a report from an already-fetched record set (no network).
    pub fn resolve_from_slots(
        &self,
        items: &[SlotItem],
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> Result<AvailabilityReport> {
        let windows = CheckWindows::compute(date, start_time, &self.config)?;

        let main_slots = self.resolver.filter_by_window(items, &windows.main);
        let before_slots = self.resolver.filter_by_window(items, &windows.before);

        let main_courts = self.resolver.aggregate_by_court(&main_slots).into_court_map();
        let before_courts = self.resolver.aggregate_by_court(&before_slots).into_court_map();

        let main_available = available_count(&main_courts);
        let before_available = available_count(&before_courts);
        info!(
            main_available,
            before_available,
            main_slots = main_slots.len(),
            before_slots = before_slots.len(),
            "Resolved both windows"
        );

        let (success, message) = match before_available {
            0 => (false, "There is no slots free before your booking".to_string()),
            1 => (true, "There is one slot free before your booking".to_string()),
            n => (true, format!("There are {} slots free before your booking", n)),
        };

        Ok(AvailabilityReport {
            success,
            message,
            main_slot_available: main_available,
            before_slot_available: before_available,
            booking_url: self.booking_url(windows.before.start_utc),
            courts_available_both: courts_available_in_both(&main_courts, &before_courts),
            main_court_info: main_courts,
            before_court_info: before_courts,
            time_slots: Some(windows.time_slots()),
            error: None,
        })
    }

    /// Deep link into the booking calendar, parameterized by the before
    /// window's start and the slot before that, both as millisecond UTC.
    fn booking_url(&self, before_start_utc: DateTime<Utc>) -> String {
        let fmt = "%Y-%m-%dT%H:%M:%S%.3fZ";
        let activity_date = before_start_utc.format(fmt);
        let previous_activity_date =
            (before_start_utc - Duration::minutes(self.config.slot_minutes)).format(fmt);
        format!(
            "{}?activityDate={}&previousActivityDate={}",
            self.config.booking_base_url, activity_date, previous_activity_date
        )
    }
}
