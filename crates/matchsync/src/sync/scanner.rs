//! Window-bounded pagination over id-listing providers.

use async_trait::async_trait;

use crate::provider::{CanonicalMatch, DateWindow, PlayerIdentity, Result, WindowPosition};

use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::DEFAULT_PAGE_SIZE;

/// A provider that lists match identifiers newest-first and resolves each one
/// to a detail record in a separate request.
#[async_trait]
pub trait PagedMatchApi: Send + Sync {
    /// List up to `count` match identifiers starting at offset `start`.
    async fn match_ids(
        &self,
        player: &PlayerIdentity,
        start: usize,
        count: usize,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<String>>;

    /// Fetch and normalize one match.
    async fn match_detail(
        &self,
        match_id: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<CanonicalMatch>;
}

/// Walks listing pages until a record older than the window shows up or the
/// provider runs out of records.
///
/// Every record on a page is classified even after the first too-old one, so
/// an out-of-order in-window record later on the same page is still kept.
/// Pages after the one that triggered the stop are never requested.
pub struct RangeScanner<'a, A: PagedMatchApi + ?Sized> {
    api: &'a A,
    page_size: usize,
}

impl<'a, A: PagedMatchApi + ?Sized> RangeScanner<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size (minimum 1).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Collect the player's matches whose end time lies inside `window`.
    ///
    /// # Errors
    ///
    /// Fails only when an identifier listing fails; detail failures are
    /// reported through `on_progress` and skipped.
    pub async fn scan(
        &self,
        player: &PlayerIdentity,
        window: &DateWindow,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<CanonicalMatch>> {
        let mut found = Vec::new();
        let mut start = 0;
        let mut page: u32 = 0;

        loop {
            page += 1;
            emit(
                on_progress,
                SyncProgress::FetchingPage {
                    start,
                    count: self.page_size,
                },
            );

            let ids = self
                .api
                .match_ids(player, start, self.page_size, on_progress)
                .await?;

            let mut reached_older = false;
            for match_id in &ids {
                let detail = match self.api.match_detail(match_id, on_progress).await {
                    Ok(detail) => detail,
                    Err(e) => {
                        tracing::warn!(match_id = %match_id, error = %e, "Skipping match, detail fetch failed");
                        emit(
                            on_progress,
                            SyncProgress::MatchFetchFailed {
                                match_id: match_id.clone(),
                                error: e.to_string(),
                            },
                        );
                        continue;
                    }
                };

                match window.position(detail.end_time) {
                    WindowPosition::TooOld => {
                        tracing::debug!(match_id = %match_id, end = %detail.end_time, "Match older than window");
                        reached_older = true;
                    }
                    WindowPosition::TooNew => {
                        tracing::debug!(match_id = %match_id, end = %detail.end_time, "Match newer than window");
                    }
                    WindowPosition::Inside => found.push(detail),
                }
            }

            emit(
                on_progress,
                SyncProgress::FetchedPage {
                    page,
                    count: ids.len(),
                    in_window_so_far: found.len(),
                },
            );

            if reached_older {
                tracing::debug!(page, "Reached matches older than the window, stopping");
                emit(on_progress, SyncProgress::EarlyStop { page });
                break;
            }
            if ids.len() < self.page_size {
                break;
            }
            start += ids.len();
        }

        tracing::info!(total = found.len(), pages = page, "Scan complete");
        emit(on_progress, SyncProgress::ScanComplete { total: found.len() });

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::provider::ProviderError;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    /// Id listing over a fixed record list, in the order given.
    #[derive(Default)]
    struct FakeApi {
        records: Vec<(String, DateTime<Utc>)>,
        broken_details: HashSet<String>,
        fail_listing_at: Option<usize>,
        listing_calls: Mutex<Vec<(usize, usize)>>,
        detail_calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn with_ends(ends: &[DateTime<Utc>]) -> Self {
            Self {
                records: ends
                    .iter()
                    .enumerate()
                    .map(|(i, end)| (format!("EUW1_{i}"), *end))
                    .collect(),
                ..Default::default()
            }
        }

        fn listing_calls(&self) -> Vec<(usize, usize)> {
            self.listing_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PagedMatchApi for FakeApi {
        async fn match_ids(
            &self,
            _player: &PlayerIdentity,
            start: usize,
            count: usize,
            _on_progress: Option<&ProgressCallback>,
        ) -> Result<Vec<String>> {
            self.listing_calls.lock().unwrap().push((start, count));
            if self.fail_listing_at == Some(start) {
                return Err(ProviderError::Request {
                    resource: "/ids".to_string(),
                    status: 503,
                    status_text: "Service Unavailable".to_string(),
                    body: String::new(),
                });
            }
            Ok(self
                .records
                .iter()
                .skip(start)
                .take(count)
                .map(|(id, _)| id.clone())
                .collect())
        }

        async fn match_detail(
            &self,
            match_id: &str,
            _on_progress: Option<&ProgressCallback>,
        ) -> Result<CanonicalMatch> {
            self.detail_calls.lock().unwrap().push(match_id.to_string());
            if self.broken_details.contains(match_id) {
                return Err(ProviderError::malformed(match_id, "no info"));
            }
            let (_, end) = self
                .records
                .iter()
                .find(|(id, _)| id == match_id)
                .expect("known match id");
            Ok(CanonicalMatch::new(
                match_id,
                420,
                "Ranked Solo/Duo",
                "CLASSIC",
                *end,
                1_800,
                vec![],
            ))
        }
    }

    fn ids(matches: &[CanonicalMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.match_id.as_str()).collect()
    }

    #[tokio::test]
    async fn keeps_in_window_record_after_too_old_one_and_stops_after_page() {
        let day = Duration::days(1);
        // Page 1: 5, 3, 1 days ago. Page 2 would exist but must not be requested.
        let api = FakeApi::with_ends(&[
            now() - day * 5,
            now() - day * 3,
            now() - day,
            now() - Duration::hours(1),
        ]);
        let window = DateWindow::new(now() - day * 2, now());

        let found = RangeScanner::new(&api)
            .with_page_size(3)
            .scan(&PlayerIdentity::default(), &window, None)
            .await
            .expect("scan succeeds");

        assert_eq!(ids(&found), vec!["EUW1_2"]);
        assert_eq!(api.listing_calls(), vec![(0, 3)]);
        assert_eq!(api.detail_calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn short_page_ends_pagination() {
        let hour = Duration::hours(1);
        let api = FakeApi::with_ends(&[now() - hour, now() - hour * 2, now() - hour * 3, now() - hour * 4]);
        let window = DateWindow::last_days(7, now());

        let found = RangeScanner::new(&api)
            .with_page_size(3)
            .scan(&PlayerIdentity::default(), &window, None)
            .await
            .expect("scan succeeds");

        assert_eq!(found.len(), 4);
        assert_eq!(api.listing_calls(), vec![(0, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn exact_multiple_of_page_size_requests_one_empty_page() {
        let hour = Duration::hours(1);
        let api = FakeApi::with_ends(&[now() - hour, now() - hour * 2]);
        let window = DateWindow::last_days(7, now());

        let found = RangeScanner::new(&api)
            .with_page_size(2)
            .scan(&PlayerIdentity::default(), &window, None)
            .await
            .expect("scan succeeds");

        assert_eq!(found.len(), 2);
        assert_eq!(api.listing_calls(), vec![(0, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn newer_than_window_records_are_skipped_without_stopping() {
        let day = Duration::days(1);
        let api = FakeApi::with_ends(&[now() + day, now() - day, now() - day * 2]);
        let window = DateWindow::new(now() - day * 7, now());

        let found = RangeScanner::new(&api)
            .scan(&PlayerIdentity::default(), &window, None)
            .await
            .expect("scan succeeds");

        assert_eq!(ids(&found), vec!["EUW1_1", "EUW1_2"]);
    }

    #[tokio::test]
    async fn records_on_window_bounds_are_included() {
        let start = now() - Duration::days(7);
        let api = FakeApi::with_ends(&[now(), start]);
        let window = DateWindow::new(start, now());

        let found = RangeScanner::new(&api)
            .scan(&PlayerIdentity::default(), &window, None)
            .await
            .expect("scan succeeds");

        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn detail_failure_is_reported_and_skipped() {
        let hour = Duration::hours(1);
        let mut api = FakeApi::with_ends(&[now() - hour, now() - hour * 2]);
        api.broken_details.insert("EUW1_0".to_string());
        let window = DateWindow::last_days(7, now());

        let events: Arc<Mutex<Vec<SyncProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let events_capture = Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event| {
            events_capture.lock().unwrap().push(event);
        });

        let found = RangeScanner::new(&api)
            .scan(&PlayerIdentity::default(), &window, Some(&callback))
            .await
            .expect("scan succeeds");

        assert_eq!(ids(&found), vec!["EUW1_1"]);
        let events = events.lock().unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            SyncProgress::MatchFetchFailed { match_id, .. } if match_id == "EUW1_0"
        )));
        assert!(matches!(events.last(), Some(SyncProgress::ScanComplete { total: 1 })));
    }

    #[tokio::test]
    async fn listing_failure_is_fatal() {
        let hour = Duration::hours(1);
        let mut api = FakeApi::with_ends(&[now() - hour, now() - hour * 2, now() - hour * 3]);
        api.fail_listing_at = Some(2);
        let window = DateWindow::last_days(7, now());

        let err = RangeScanner::new(&api)
            .with_page_size(2)
            .scan(&PlayerIdentity::default(), &window, None)
            .await
            .expect_err("second listing fails");

        assert_eq!(err.status(), Some(503));
    }
}
