use chrono_tz::Tz;

/// Everything the checker needs to know about the facility and the feed.
/// Defaults describe the Alfreton Leisure Centre squash courts on the
/// Places Leisure live-slots feed.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Well-known base URL of the RPDE slot feed.
    pub feed_url: String,
    /// Facility-use ids identifying the squash resource class. Matched as
    /// substrings of `facilityUse` (the feed embeds the id inside a URI).
    pub facility_ids: Vec<String>,
    /// Booking calendar page the deep link is built on.
    pub booking_base_url: String,
    /// The feed's declared timezone. Every timestamp, item and query bound
    /// alike, is normalized through this zone before comparison.
    pub timezone: Tz,
    /// Bookable slot length in minutes; the before-window has the same length.
    pub slot_minutes: i64,
    /// Hard ceiling on pages walked before pagination gives up with a warning.
    pub page_limit: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            feed_url: "https://opendata.leisurecloud.live/api/feeds/PlacesLeisure-live-slots"
                .to_string(),
            facility_ids: vec!["041A000005".to_string()],
            booking_base_url: "https://placesleisure.gladstonego.cloud/book/calendar/041A000005"
                .to_string(),
            timezone: chrono_tz::Europe::London,
            slot_minutes: 40,
            page_limit: 1000,
            timeout_secs: 30,
            user_agent: "SquashCourtChecker/1.0".to_string(),
        }
    }
}
