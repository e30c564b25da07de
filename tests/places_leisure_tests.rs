use std::collections::HashMap;

use serde_json::json;

use squash_court_checker::error::CheckError;
use squash_court_checker::model::slot::FeedPage;
use squash_court_checker::places_leisure::PlacesLeisure;

fn load_sample() -> String {
    std::fs::read_to_string("tests/sample_feed.json").expect("failed to read sample_feed.json")
}

fn item(identifier: &str) -> serde_json::Value {
    json!({
        "id": identifier,
        "state": "updated",
        "data": { "identifier": identifier }
    })
}

fn page(value: serde_json::Value) -> FeedPage {
    serde_json::from_value(value).expect("page should deserialize")
}

#[test]
fn deserializes_live_slots_page() {
    let page: FeedPage = serde_json::from_str(&load_sample()).expect("sample page should parse");

    assert_eq!(page.items.len(), 7);
    assert!(page.next.as_deref().unwrap().contains("afterTimestamp"));

    let first = page.items[0].data.as_ref().expect("first item has data");
    assert_eq!(first.remaining_uses, 1);
    assert_eq!(first.first_offer_price(), 10.25);
    assert!(first.facility_use.contains("041A000005"));
}

#[test]
fn pagination_concatenates_pages_and_stops_on_terminal_page() {
    let base = "https://feed.example/slots";
    let p2 = "https://feed.example/slots?after=2";
    let p3 = "https://feed.example/slots?after=3";

    let mut pages: HashMap<&str, serde_json::Value> = HashMap::new();
    pages.insert(base, json!({ "items": [item("a"), item("b")], "next": p2 }));
    pages.insert(p2, json!({ "items": [item("c")], "next": p3 }));
    // Terminal per the protocol: empty items, next pointing back at itself.
    pages.insert(p3, json!({ "items": [], "next": p3 }));

    let mut fetched: Vec<String> = Vec::new();
    let items = PlacesLeisure::paginate(base, 1000, |url| {
        fetched.push(url.to_string());
        Ok(page(pages.get(url).expect("unexpected url").clone()))
    })
    .expect("pagination should succeed");

    assert_eq!(fetched, vec![base.to_string(), p2.to_string(), p3.to_string()]);
    let ids: Vec<String> = items
        .iter()
        .map(|i| i.data.as_ref().unwrap().identifier_str())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn empty_items_alone_is_not_terminal() {
    let base = "https://feed.example/slots";
    let p2 = "https://feed.example/slots?after=2";

    let mut pages: HashMap<&str, serde_json::Value> = HashMap::new();
    // Empty page whose next moves forward: keep following.
    pages.insert(base, json!({ "items": [], "next": p2 }));
    pages.insert(p2, json!({ "items": [item("a")], "next": null }));

    let items = PlacesLeisure::paginate(base, 1000, |url| {
        Ok(page(pages.get(url).expect("unexpected url").clone()))
    })
    .expect("pagination should succeed");

    assert_eq!(items.len(), 1);
}

#[test]
fn missing_next_url_is_treated_as_terminal() {
    let base = "https://feed.example/slots";
    let items = PlacesLeisure::paginate(base, 1000, |_url| {
        Ok(page(json!({ "items": [item("a"), item("b")] })))
    })
    .expect("pagination should succeed");

    assert_eq!(items.len(), 2);
}

#[test]
fn page_ceiling_truncates_instead_of_hanging() {
    let base = "https://feed.example/slots";
    let mut served = 0u32;

    // A misbehaving feed: every page has items and a fresh next URL.
    let items = PlacesLeisure::paginate(base, 5, |_url| {
        served += 1;
        Ok(page(json!({
            "items": [item(&format!("i{}", served))],
            "next": format!("https://feed.example/slots?after={}", served)
        })))
    })
    .expect("pagination should soft-stop at the ceiling");

    assert_eq!(items.len(), 5);
}

#[test]
fn transport_failure_aborts_with_no_partial_result() {
    let base = "https://feed.example/slots";
    let p2 = "https://feed.example/slots?after=2";

    let mut pages: HashMap<&str, serde_json::Value> = HashMap::new();
    pages.insert(base, json!({ "items": [item("a")], "next": p2 }));

    let result = PlacesLeisure::paginate(base, 1000, |url| match pages.get(url) {
        Some(p) => Ok(page(p.clone())),
        None => Err(CheckError::Transport("connection reset".to_string())),
    });

    assert!(matches!(result, Err(CheckError::Transport(_))));
}
