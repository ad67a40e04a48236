//! Places catalog client for the opendatasoft geonames dataset
//!
//! Fetches pages of cities, optionally narrowed by a full-text search on the
//! city name.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{City, CityCatalog, FetchError};

/// Base URL for the geonames cities dataset (population >= 1000)
pub const PLACES_BASE_URL: &str = "https://public.opendatasoft.com/api/explore/v2.1/catalog/datasets/geonames-all-cities-with-a-population-1000/records";

/// Response envelope from the catalog
#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    results: Vec<City>,
}

/// Client for the places catalog
#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: Client,
    base_url: String,
}

impl Default for PlacesClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacesClient {
    pub fn new() -> Self {
        Self::with_base_url(PLACES_BASE_URL)
    }

    /// Creates a client against a different catalog endpoint
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl CityCatalog for PlacesClient {
    async fn search_cities(
        &self,
        text: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<City>, FetchError> {
        let params = search_params(text, limit, offset);
        debug!(text, limit, offset, "Fetching city page");

        let response = self.client.get(&self.base_url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Places catalog request failed");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let cities = parse_places(&body)?;
        debug!(count = cities.len(), offset, "Received city page");
        Ok(cities)
    }
}

/// Builds the catalog filter expression for a search term.
///
/// Returns `None` for blank input so the catalog serves an unfiltered page.
fn search_expression(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(format!("search(name, \"{}\")", text.replace('"', "\\\"")))
}

/// Query parameters for a page request
fn search_params(text: &str, limit: usize, offset: usize) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(3);
    if let Some(expr) = search_expression(text) {
        params.push(("where", expr));
    }
    params.push(("limit", limit.to_string()));
    params.push(("offset", offset.to_string()));
    params
}

fn parse_places(body: &str) -> Result<Vec<City>, FetchError> {
    let response: PlacesResponse = serde_json::from_str(body)?;
    Ok(response.results)
}
