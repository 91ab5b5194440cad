//! Google Custom Search client used to find candidate company sites.

use bizagent_core::models::contact::SearchHit;
use eyre::{eyre, Result, WrapErr};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::SearchConfig;

const SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchHit>,
}

pub struct GoogleSearchClient {
    client: Client,
    config: SearchConfig,
}

impl GoogleSearchClient {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Returns at most `num` hits (the API caps a page at 10).
    pub async fn search(&self, query: &str, num: u8) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(eyre!("Search query must not be empty"));
        }
        let num = num.clamp(1, 10).to_string();
        debug!("Searching Google for '{}'", query);

        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("cx", self.config.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .wrap_err("Google search request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!(
                "Google search failed: {} - {}",
                status,
                body
            ));
        }

        let body: SearchResponse = response
            .json()
            .await
            .wrap_err("Invalid Google search response")?;
        Ok(body.items)
    }
}
