use serde::{Deserialize, Serialize};

/// One period folded into a court's availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotPeriod {
    pub start: Option<String>,
    pub end: Option<String>,
    pub remaining: u32,
}

/// Reconstructed availability for one court within one window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtAvailability {
    pub id: String,
    pub available: bool,
    pub remaining_uses: u32,
    pub slots: Vec<SlotPeriod>,
}

impl CourtAvailability {
    pub fn new(id: String) -> Self {
        Self { id, available: false, remaining_uses: 0, slots: Vec::new() }
    }

    /// Fold one period in: running max of remaining uses, sticky
    /// availability, periods appended in arrival order.
    pub fn record_period(&mut self, period: SlotPeriod) {
        self.remaining_uses = self.remaining_uses.max(period.remaining);
        if period.remaining > 0 {
            self.available = true;
        }
        self.slots.push(period);
    }
}
