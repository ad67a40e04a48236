//! City collection store
//!
//! Accumulates pages of cities for the active search term. Every request
//! carries the epoch it was issued under; `reset` bumps the epoch so pages
//! that arrive for an earlier search term are recognised and dropped instead
//! of leaking into the new list.

use tracing::{debug, warn};

use crate::data::{City, CityCatalog, FetchError};

/// Number of cities requested per page
pub const PAGE_SIZE: usize = 20;

/// Load state of the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    LoadedHasMore,
    LoadedComplete,
    Errored(String),
}

/// A page fetch the store wants performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub epoch: u64,
    pub text: String,
    pub limit: usize,
    pub offset: usize,
}

impl PageRequest {
    /// Performs the fetch against `catalog`, tagging the result with this request's epoch
    pub async fn execute<C: CityCatalog>(self, catalog: &C) -> PageResponse {
        let result = catalog
            .search_cities(&self.text, self.limit, self.offset)
            .await;
        PageResponse {
            epoch: self.epoch,
            result,
        }
    }
}

/// Outcome of a page fetch
#[derive(Debug)]
pub struct PageResponse {
    pub epoch: u64,
    pub result: Result<Vec<City>, FetchError>,
}

#[derive(Debug)]
pub struct CityStore {
    search_text: String,
    records: Vec<City>,
    next_offset: usize,
    has_more: bool,
    status: LoadStatus,
    epoch: u64,
}

impl Default for CityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CityStore {
    pub fn new() -> Self {
        Self {
            search_text: String::new(),
            records: Vec::new(),
            next_offset: 0,
            has_more: true,
            status: LoadStatus::Idle,
            epoch: 0,
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Accumulated records in arrival order
    pub fn records(&self) -> &[City] {
        &self.records
    }

    pub fn next_offset(&self) -> usize {
        self.next_offset
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            LoadStatus::Errored(message) => Some(message),
            _ => None,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Switches to a new search term and issues its first page request.
    ///
    /// Records and offset are cleared before the request is built, and any
    /// request still in flight for the previous term becomes stale.
    pub fn reset(&mut self, search_text: impl Into<String>) -> PageRequest {
        self.epoch += 1;
        self.search_text = search_text.into();
        self.records.clear();
        self.next_offset = 0;
        self.has_more = true;
        self.status = LoadStatus::Idle;
        debug!(epoch = self.epoch, text = %self.search_text, "City store reset");
        self.issue_request()
    }

    /// Issues the next page request unless one is in flight or the list is complete
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        if self.is_loading() {
            debug!(offset = self.next_offset, "Page load already in flight");
            return None;
        }
        if !self.has_more {
            return None;
        }
        Some(self.issue_request())
    }

    fn issue_request(&mut self) -> PageRequest {
        self.status = LoadStatus::Loading;
        PageRequest {
            epoch: self.epoch,
            text: self.search_text.clone(),
            limit: PAGE_SIZE,
            offset: self.next_offset,
        }
    }

    /// Applies a page fetch outcome.
    ///
    /// Returns `false` if the response belongs to an earlier epoch and was dropped.
    pub fn apply(&mut self, response: PageResponse) -> bool {
        if response.epoch != self.epoch {
            debug!(
                stale = response.epoch,
                current = self.epoch,
                "Dropping stale city page"
            );
            return false;
        }

        match response.result {
            Ok(cities) => {
                let count = cities.len();
                self.records.extend(cities);
                self.next_offset += PAGE_SIZE;
                self.has_more = count == PAGE_SIZE;
                self.status = if self.has_more {
                    LoadStatus::LoadedHasMore
                } else {
                    LoadStatus::LoadedComplete
                };
                debug!(count, total = self.records.len(), "City page applied");
            }
            Err(err) => {
                warn!(error = %err, offset = self.next_offset, "City page failed");
                self.status = LoadStatus::Errored(err.to_string());
            }
        }
        true
    }

    /// Loads the next page from `catalog` in place.
    ///
    /// Returns `false` without touching the network if a load is in flight or
    /// the list is complete.
    pub async fn load_next<C: CityCatalog>(&mut self, catalog: &C) -> bool {
        let Some(request) = self.begin_load() else {
            return false;
        };
        let response = request.execute(catalog).await;
        self.apply(response);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Coordinates;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Catalog that serves queued pages and records every call
    struct MockCatalog {
        pages: RefCell<VecDeque<Result<Vec<City>, FetchError>>>,
        calls: RefCell<Vec<(String, usize, usize)>>,
    }

    impl MockCatalog {
        fn new(pages: Vec<Result<Vec<City>, FetchError>>) -> Self {
            Self {
                pages: RefCell::new(pages.into()),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn offsets(&self) -> Vec<usize> {
            self.calls.borrow().iter().map(|(_, _, o)| *o).collect()
        }
    }

    impl CityCatalog for MockCatalog {
        async fn search_cities(
            &self,
            text: &str,
            limit: usize,
            offset: usize,
        ) -> Result<Vec<City>, FetchError> {
            self.calls
                .borrow_mut()
                .push((text.to_string(), limit, offset));
            self.pages
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn page(start: u64, len: usize) -> Vec<City> {
        (start..start + len as u64)
            .map(|id| City {
                id,
                name: Some(format!("City {}", id)),
                ascii_name: Some(format!("City {}", id)),
                country: Some("Testland".to_string()),
                timezone: Some("UTC".to_string()),
                coordinates: Coordinates::default(),
                population: None,
            })
            .collect()
    }

    fn ids(store: &CityStore) -> Vec<u64> {
        store.records().iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_new_store_is_idle_and_empty() {
        let store = CityStore::new();
        assert_eq!(store.status(), &LoadStatus::Idle);
        assert!(store.records().is_empty());
        assert!(store.has_more());
        assert_eq!(store.next_offset(), 0);
    }

    #[test]
    fn test_reset_issues_first_page_request() {
        let mut store = CityStore::new();
        let request = store.reset("paris");

        assert_eq!(request.text, "paris");
        assert_eq!(request.limit, PAGE_SIZE);
        assert_eq!(request.offset, 0);
        assert_eq!(request.epoch, store.epoch());
        assert!(store.is_loading());
    }

    #[test]
    fn test_begin_load_is_noop_while_loading() {
        let mut store = CityStore::new();
        store.reset("");
        assert!(store.begin_load().is_none());
        assert!(store.begin_load().is_none());
    }

    #[test]
    fn test_successful_page_advances_offset() {
        let mut store = CityStore::new();
        let request = store.reset("");
        store.apply(PageResponse {
            epoch: request.epoch,
            result: Ok(page(0, PAGE_SIZE)),
        });

        assert_eq!(store.records().len(), PAGE_SIZE);
        assert_eq!(store.next_offset(), PAGE_SIZE);
        assert_eq!(store.status(), &LoadStatus::LoadedHasMore);

        let next = store.begin_load().expect("should load next page");
        assert_eq!(next.offset, PAGE_SIZE);
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut store = CityStore::new();
        let old = store.reset("lon");
        let current = store.reset("london");

        let applied = store.apply(PageResponse {
            epoch: old.epoch,
            result: Ok(page(100, PAGE_SIZE)),
        });
        assert!(!applied);
        assert!(store.records().is_empty());
        assert!(store.is_loading(), "still waiting for the current page");

        assert!(store.apply(PageResponse {
            epoch: current.epoch,
            result: Ok(page(0, 3)),
        }));
        assert_eq!(ids(&store), vec![0, 1, 2]);
    }

    #[test]
    fn test_stale_error_does_not_mark_errored() {
        let mut store = CityStore::new();
        let old = store.reset("a");
        store.reset("b");

        store.apply(PageResponse {
            epoch: old.epoch,
            result: Err(FetchError::Status(500)),
        });
        assert!(store.error().is_none());
    }

    #[test]
    fn test_has_more_stays_false_until_reset() {
        let mut store = CityStore::new();
        let request = store.reset("");
        store.apply(PageResponse {
            epoch: request.epoch,
            result: Ok(page(0, 5)),
        });

        assert!(!store.has_more());
        assert_eq!(store.status(), &LoadStatus::LoadedComplete);
        assert!(store.begin_load().is_none());

        store.reset("x");
        assert!(store.has_more());
    }

    #[tokio::test]
    async fn test_pages_append_in_request_order() {
        let catalog = MockCatalog::new(vec![
            Ok(page(0, 20)),
            Ok(page(20, 20)),
            Ok(page(40, 7)),
        ]);
        let mut store = CityStore::new();
        let first = store.reset("");
        store.apply(first.execute(&catalog).await);
        assert!(store.has_more());

        assert!(store.load_next(&catalog).await);
        assert!(store.has_more(), "two full pages keep has-more true");

        assert!(store.load_next(&catalog).await);
        assert!(!store.has_more(), "short page ends the list");

        assert!(!store.load_next(&catalog).await, "no fetch after the end");
        assert_eq!(catalog.offsets(), vec![0, 20, 40]);
        assert_eq!(ids(&store), (0..47).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_error_keeps_records_and_allows_retry() {
        let catalog = MockCatalog::new(vec![
            Ok(page(0, 20)),
            Err(FetchError::Status(503)),
            Ok(page(20, 4)),
        ]);
        let mut store = CityStore::new();
        let request = store.reset("rome");
        store.apply(request.execute(&catalog).await);

        assert!(store.load_next(&catalog).await);
        assert!(store.error().is_some());
        assert_eq!(store.records().len(), 20, "prior pages survive an error");
        assert_eq!(store.next_offset(), 20);

        assert!(store.load_next(&catalog).await);
        assert!(store.error().is_none());
        assert_eq!(store.records().len(), 24);
        assert_eq!(catalog.offsets(), vec![0, 20, 20]);
    }

    #[tokio::test]
    async fn test_reset_clears_before_next_load() {
        let catalog = MockCatalog::new(vec![Ok(page(0, 20)), Ok(page(500, 2))]);
        let mut store = CityStore::new();
        let request = store.reset("");
        store.apply(request.execute(&catalog).await);
        assert_eq!(store.records().len(), 20);

        let request = store.reset("berlin");
        assert!(store.records().is_empty());
        assert_eq!(store.next_offset(), 0);
        assert_eq!(request.offset, 0);

        store.apply(request.execute(&catalog).await);
        assert_eq!(ids(&store), vec![500, 501]);
        let calls = catalog.calls.borrow();
        assert_eq!(calls[1], ("berlin".to_string(), PAGE_SIZE, 0));
    }
}
