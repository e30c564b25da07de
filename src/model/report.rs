use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::court::CourtAvailability;

/// Start/end of one resolved window, as HH:MM local time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowTimes {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlots {
    pub main: WindowTimes,
    pub before: WindowTimes,
}

/// The report record handed to the CLI. This is the outermost contract
/// surface: every failure is normalized into `success = false` with a
/// human-readable message and the generic booking URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub success: bool,
    pub message: String,
    pub main_slot_available: usize,
    pub before_slot_available: usize,
    pub booking_url: String,
    pub main_court_info: BTreeMap<String, CourtAvailability>,
    pub before_court_info: BTreeMap<String, CourtAvailability>,
    pub courts_available_both: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slots: Option<TimeSlots>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AvailabilityReport {
    /// Failure-shaped report: generic booking URL, empty maps, no windows.
    pub fn failure(message: String, booking_url: String, error: String) -> Self {
        Self {
            success: false,
            message,
            main_slot_available: 0,
            before_slot_available: 0,
            booking_url,
            main_court_info: BTreeMap::new(),
            before_court_info: BTreeMap::new(),
            courts_available_both: Vec::new(),
            time_slots: None,
            error: Some(error),
        }
    }
}
