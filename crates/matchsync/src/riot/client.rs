//! Riot match-v5 API client.

use std::sync::Arc;

use async_trait::async_trait;

use super::convert::to_canonical_match;
use super::types::RiotMatch;
use crate::http::reqwest_transport::{DEFAULT_TIMEOUT, ReqwestTransport};
use crate::http::{HttpRequest, HttpTransport};
use crate::provider::{
    ApiRateLimiter, CanonicalMatch, DateWindow, MatchSource, PlayerIdentity, ProviderError,
    ProviderKind, Result,
};
use crate::retry::{RetryConfig, RetryingFetcher};
use crate::sync::{
    DEFAULT_PAGE_SIZE, PagedMatchApi, ProgressCallback, RangeScanner, SyncProgress, emit,
};

/// Regional routing host for EUW/EUNE/TR/RU accounts.
pub const RIOT_EUROPE_API_BASE: &str = "https://europe.api.riotgames.com";

/// Riot match-v5 client.
///
/// Every request goes through one [`RetryingFetcher`], so the client's
/// rate limiter covers both id listings and detail fetches.
#[derive(Clone)]
pub struct RiotClient {
    fetcher: RetryingFetcher,
    base_url: String,
    api_key: String,
    page_size: usize,
}

impl RiotClient {
    /// Create a client with the development-key rate limits.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = RiotClient::new(RIOT_EUROPE_API_BASE, "RGAPI-...")?;
    /// ```
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(DEFAULT_TIMEOUT)?;
        Ok(Self::new_with_transport(
            Arc::new(transport),
            base_url,
            api_key,
            ApiRateLimiter::default(),
            RetryConfig::default(),
        ))
    }

    pub fn new_with_transport(
        transport: Arc<dyn HttpTransport>,
        base_url: &str,
        api_key: &str,
        limiter: ApiRateLimiter,
        retry: RetryConfig,
    ) -> Self {
        Self {
            fetcher: RetryingFetcher::new(transport, limiter, retry),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the listing page size (Riot caps it at 100).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn limiter(&self) -> &ApiRateLimiter {
        self.fetcher.limiter()
    }

    fn request(&self, url: String) -> HttpRequest {
        HttpRequest::get(url).header("X-Riot-Token", self.api_key.as_str())
    }

    fn ids_url(&self, puuid: &str, start: usize, count: usize) -> String {
        format!(
            "{}/lol/match/v5/matches/by-puuid/{}/ids?start={}&count={}",
            self.base_url, puuid, start, count
        )
    }

    fn match_url(&self, match_id: &str) -> String {
        format!("{}/lol/match/v5/matches/{}", self.base_url, match_id)
    }

    /// Fetch the raw match-v5 record.
    pub async fn fetch_match(
        &self,
        match_id: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<RiotMatch> {
        self.fetcher
            .get_json(self.request(self.match_url(match_id)), on_progress)
            .await
    }

    /// The player's `count` most recent matches, regardless of date.
    ///
    /// Matches whose detail cannot be fetched are logged and skipped.
    pub async fn recent_matches(
        &self,
        puuid: &str,
        count: usize,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<CanonicalMatch>> {
        let player = PlayerIdentity::from_puuid(puuid);
        let ids = self
            .match_ids(&player, 0, count.clamp(1, DEFAULT_PAGE_SIZE), on_progress)
            .await?;

        let mut matches = Vec::with_capacity(ids.len());
        for match_id in &ids {
            match self.match_detail(match_id, on_progress).await {
                Ok(m) => matches.push(m),
                Err(e) => {
                    tracing::warn!(match_id = %match_id, error = %e, "Skipping match, detail fetch failed");
                    emit(
                        on_progress,
                        SyncProgress::MatchFetchFailed {
                            match_id: match_id.clone(),
                            error: e.to_string(),
                        },
                    );
                }
            }
        }
        Ok(matches)
    }
}

#[async_trait]
impl PagedMatchApi for RiotClient {
    async fn match_ids(
        &self,
        player: &PlayerIdentity,
        start: usize,
        count: usize,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<String>> {
        let puuid = player
            .puuid
            .as_deref()
            .ok_or_else(|| ProviderError::config("the Riot API needs the player's PUUID"))?;

        self.fetcher
            .get_json(self.request(self.ids_url(puuid, start, count)), on_progress)
            .await
    }

    async fn match_detail(
        &self,
        match_id: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<CanonicalMatch> {
        to_canonical_match(self.fetch_match(match_id, on_progress).await?)
    }
}

#[async_trait]
impl MatchSource for RiotClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Riot
    }

    async fn list_matches_in_window(
        &self,
        player: &PlayerIdentity,
        window: &DateWindow,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<CanonicalMatch>> {
        RangeScanner::new(self)
            .with_page_size(self.page_size)
            .scan(player, window, on_progress)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::http::{MockTransport, header_get};
    use crate::provider::RateLimitPolicy;

    const BASE: &str = "https://riot.test";
    const PUUID: &str = "puuid-me";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn client(transport: &MockTransport) -> RiotClient {
        RiotClient::new_with_transport(
            Arc::new(transport.clone()),
            BASE,
            "RGAPI-test",
            ApiRateLimiter::new(RateLimitPolicy::default()),
            RetryConfig::default(),
        )
    }

    fn match_json(id: &str, end: DateTime<Utc>) -> serde_json::Value {
        serde_json::json!({
            "metadata": {"matchId": id, "participants": [PUUID]},
            "info": {
                "gameDuration": 1500,
                "gameEndTimestamp": end.timestamp_millis(),
                "gameMode": "ARAM",
                "gameType": "MATCHED_GAME",
                "queueId": 450,
                "participants": [{
                    "puuid": PUUID,
                    "summonerName": "Me",
                    "riotIdGameName": "Me",
                    "riotIdTagline": "EUW",
                    "championId": 22,
                    "championName": "Ashe",
                    "teamId": 200,
                    "win": false,
                    "kills": 3,
                    "deaths": 8,
                    "assists": 20,
                    "totalMinionsKilled": 40,
                    "goldEarned": 10000
                }]
            }
        })
    }

    #[tokio::test]
    async fn lists_window_from_one_short_page_with_token_header() {
        let transport = MockTransport::new();
        let riot = client(&transport);
        transport.push_json(
            riot.ids_url(PUUID, 0, 100),
            200,
            serde_json::json!(["EUW1_3", "EUW1_2", "EUW1_1"]),
        );
        transport.push_json(riot.match_url("EUW1_3"), 200, match_json("EUW1_3", now() - Duration::hours(2)));
        transport.push_json(riot.match_url("EUW1_2"), 200, match_json("EUW1_2", now() - Duration::days(3)));
        transport.push_json(riot.match_url("EUW1_1"), 200, match_json("EUW1_1", now() - Duration::days(9)));

        let window = DateWindow::last_days(7, now());
        let matches = riot
            .list_matches_in_window(&PlayerIdentity::from_puuid(PUUID), &window, None)
            .await
            .expect("listing succeeds");

        let ids: Vec<&str> = matches.iter().map(|m| m.match_id.as_str()).collect();
        assert_eq!(ids, vec!["EUW1_3", "EUW1_2"]);
        assert_eq!(matches[0].queue_label, "ARAM");

        let requests = transport.requests();
        assert_eq!(requests.len(), 4);
        assert!(
            requests
                .iter()
                .all(|r| header_get(&r.headers, "x-riot-token") == Some("RGAPI-test"))
        );
        assert_eq!(riot.limiter().recorded().await, 4);
    }

    #[tokio::test]
    async fn failed_detail_is_skipped() {
        let transport = MockTransport::new();
        let riot = client(&transport);
        transport.push_json(riot.ids_url(PUUID, 0, 100), 200, serde_json::json!(["EUW1_2", "EUW1_1"]));
        transport.push_json(
            riot.match_url("EUW1_2"),
            404,
            serde_json::json!({"status": {"message": "Data not found", "status_code": 404}}),
        );
        transport.push_json(riot.match_url("EUW1_1"), 200, match_json("EUW1_1", now() - Duration::hours(1)));

        let matches = riot
            .list_matches_in_window(
                &PlayerIdentity::from_puuid(PUUID),
                &DateWindow::last_days(7, now()),
                None,
            )
            .await
            .expect("listing succeeds");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].match_id, "EUW1_1");
    }

    #[tokio::test]
    async fn failed_id_listing_aborts() {
        let transport = MockTransport::new();
        let riot = client(&transport);
        transport.push_json(
            riot.ids_url(PUUID, 0, 100),
            403,
            serde_json::json!({"status": {"message": "Forbidden", "status_code": 403}}),
        );

        let err = riot
            .list_matches_in_window(
                &PlayerIdentity::from_puuid(PUUID),
                &DateWindow::last_days(7, now()),
                None,
            )
            .await
            .expect_err("listing fails");
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn listing_without_puuid_is_a_config_error() {
        let transport = MockTransport::new();
        let riot = client(&transport);

        let err = riot
            .list_matches_in_window(
                &PlayerIdentity::default(),
                &DateWindow::last_days(7, now()),
                None,
            )
            .await
            .expect_err("needs puuid");
        assert!(matches!(err, ProviderError::Config(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn throttled_detail_is_retried() {
        let transport = MockTransport::new();
        let riot = client(&transport);
        transport.push_json(riot.ids_url(PUUID, 0, 100), 200, serde_json::json!(["EUW1_1"]));
        transport.push_json(riot.match_url("EUW1_1"), 429, serde_json::json!({}));
        transport.push_json(riot.match_url("EUW1_1"), 200, match_json("EUW1_1", now() - Duration::hours(1)));

        let matches = riot
            .list_matches_in_window(
                &PlayerIdentity::from_puuid(PUUID),
                &DateWindow::last_days(7, now()),
                None,
            )
            .await
            .expect("listing succeeds");
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn recent_matches_ignores_the_window() {
        let transport = MockTransport::new();
        let riot = client(&transport);
        transport.push_json(riot.ids_url(PUUID, 0, 2), 200, serde_json::json!(["EUW1_2", "EUW1_1"]));
        transport.push_json(riot.match_url("EUW1_2"), 200, match_json("EUW1_2", now() - Duration::days(40)));
        transport.push_json(riot.match_url("EUW1_1"), 200, match_json("EUW1_1", now() - Duration::days(90)));

        let matches = riot
            .recent_matches(PUUID, 2, None)
            .await
            .expect("listing succeeds");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn page_size_is_clamped() {
        let transport = MockTransport::new();
        assert_eq!(client(&transport).with_page_size(500).page_size, 100);
        assert_eq!(client(&transport).with_page_size(0).page_size, 1);
    }
}
