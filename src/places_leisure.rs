use std::time::Duration;

use tracing::{debug, error, info, info_span, instrument, warn};

use crate::config::CheckerConfig;
use crate::error::{CheckError, Result};
use crate::model::slot::{FeedPage, SlotItem};

/// Client for the Places Leisure live-slots RPDE feed.
#[derive(Debug)]
pub struct PlacesLeisure {
    agent: ureq::Agent,
    feed_url: String,
    page_limit: usize,
    user_agent: String,
}

impl PlacesLeisure {
    pub fn new(config: &CheckerConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();
        PlacesLeisure {
            agent: agent_config.into(),
            feed_url: config.feed_url.clone(),
            page_limit: config.page_limit,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Materialize the full current record set by walking the feed from its
    /// base URL. Any page failure aborts the whole walk; no partial result
    /// is returned on transport errors.
    #[instrument(level = "info", skip(self), fields(feed_url = %self.feed_url))]
    pub fn fetch_all_slots(&self) -> Result<Vec<SlotItem>> {
        let items = Self::paginate(&self.feed_url, self.page_limit, |url| self.fetch_page(url))?;
        info!(total_items = items.len(), "Fetched full slot feed");
        Ok(items)
    }

    /// The RPDE walk, generic over the page fetcher so tests can drive it
    /// with synthetic pages. Per the protocol, the last page is the one
    /// whose `items` is empty and whose `next` equals the URL just
    /// requested; a missing or empty `next` is treated as terminal too.
    /// A page ceiling bounds misbehaving feeds: exceeding it returns the
    /// accumulated items with a warning rather than an error.
    pub fn paginate<F>(base_url: &str, page_limit: usize, mut fetch: F) -> Result<Vec<SlotItem>>
    where
        F: FnMut(&str) -> Result<FeedPage>,
    {
        let mut all_items: Vec<SlotItem> = Vec::new();
        let mut current_url = base_url.to_string();
        let mut pages = 0usize;

        loop {
            let page = fetch(&current_url)?;
            pages += 1;

            let page_was_empty = page.items.is_empty();
            let next = page.next;
            all_items.extend(page.items);

            // Protocol-correct terminal condition, checked first.
            if page_was_empty && next.as_deref() == Some(current_url.as_str()) {
                debug!(pages, total_items = all_items.len(), "Feed reported end of pages");
                break;
            }

            let Some(next_url) = next.filter(|n| !n.is_empty()) else {
                warn!(pages, "Feed page carried no next URL; treating as terminal");
                break;
            };

            if pages >= page_limit {
                warn!(
                    pages,
                    total_items = all_items.len(),
                    "Stopped pagination at the page ceiling; result may be truncated"
                );
                break;
            }

            current_url = next_url;
        }

        Ok(all_items)
    }

    fn fetch_page(&self, url: &str) -> Result<FeedPage> {
        let response_result = {
            let _span = info_span!("feed_fetch", url = %url).entered();
            self.agent
                .get(url)
                .header("User-Agent", &self.user_agent)
                .call()
        };
        match response_result {
            Ok(response) => {
                // ureq surfaces most non-2xx as Err already; keep the
                // explicit check for configurations where it does not.
                let code = response.status().as_u16();
                let mut body_reader = response.into_body();
                match body_reader.read_to_string() {
                    Ok(body) => {
                        if !(200..300).contains(&code) {
                            error!(status = code, url = %url, "Feed returned non-success status");
                            return Err(CheckError::Transport(format!(
                                "feed page returned status {}",
                                code
                            )));
                        }
                        match serde_json::from_str::<FeedPage>(&body) {
                            Ok(page) => Ok(page),
                            Err(e) => {
                                error!(error = %e, url = %url, "Failed to deserialize feed page");
                                Err(CheckError::Transport(format!(
                                    "failed to deserialize feed page: {}",
                                    e
                                )))
                            }
                        }
                    }
                    Err(e) => {
                        error!(error = %e, url = %url, "Failed to read feed response body");
                        Err(CheckError::Transport(format!(
                            "failed to read response body: {}",
                            e
                        )))
                    }
                }
            }
            Err(e) => {
                error!(error = %e, url = %url, "Feed request failed");
                Err(CheckError::Transport(format!("request failed: {}", e)))
            }
        }
    }
}
