use serde::{Deserialize, Serialize};

/// One page of the RPDE slot feed: the items published at this cursor plus
/// the URL of the following page.
#[derive(Debug, Serialize, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub items: Vec<SlotItem>,
    #[serde(default)]
    pub next: Option<String>,
}

/// RPDE item envelope. Only `data` is interpreted; the rest is carried for
/// logging and kept opaque (the feed has sent both string and numeric ids).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotItem {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub modified: Option<serde_json::Value>,
    #[serde(default)]
    pub data: Option<SlotData>,
}

/// One bookable period as published by the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotData {
    #[serde(default)]
    pub identifier: Option<serde_json::Value>,
    #[serde(default, rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(default, rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(default, rename = "facilityUse")]
    pub facility_use: String,
    #[serde(default, rename = "remainingUses")]
    pub remaining_uses: u32,
    #[serde(default)]
    pub offers: Vec<Offer>,
    #[serde(default, rename = "beta:sportsActivityLocation")]
    pub locations: Vec<SportsLocation>,
}

impl SlotData {
    /// Feed identifier rendered as a string ("Unknown" when absent).
    pub fn identifier_str(&self) -> String {
        value_to_string(self.identifier.as_ref())
    }

    /// Price of the first offer; the first offer is authoritative.
    pub fn first_offer_price(&self) -> f64 {
        self.offers.first().map(|o| o.price).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    #[serde(default, rename = "@type")]
    pub offer_type: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default, rename = "priceCurrency")]
    pub price_currency: Option<String>,
}

/// Embedded location record under the vendor-specific
/// `beta:sportsActivityLocation` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SportsLocation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub identifier: Option<serde_json::Value>,
}

impl SportsLocation {
    pub fn identifier_str(&self) -> String {
        value_to_string(self.identifier.as_ref())
    }
}

fn value_to_string(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
        None => "Unknown".to_string(),
    }
}
