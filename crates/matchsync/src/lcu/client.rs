//! League client (LCU) match-history client.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use super::convert::to_canonical_match;
use super::lockfile::LockfileCredentials;
use super::types::LcuMatchHistory;
use crate::http::reqwest_transport::{DEFAULT_TIMEOUT, ReqwestTransport};
use crate::http::{HttpRequest, HttpTransport};
use crate::provider::{
    ApiRateLimiter, CanonicalMatch, DateWindow, MatchSource, PlayerIdentity, ProviderKind, Result,
};
use crate::retry::{RetryConfig, RetryingFetcher};
use crate::sync::{ProgressCallback, SyncProgress, emit};

/// Platform prefix used for match ids when none is configured.
pub const DEFAULT_PLATFORM_ID: &str = "EUN1";

/// Number of recent games requested from the client.
pub const DEFAULT_MATCH_COUNT: usize = 50;

const MATCH_HISTORY_PATH: &str = "/lol-match-history/v1/products/lol/current-summoner/matches";

/// Client for the local League client API.
///
/// The client only knows the logged-in summoner's recent games, so the
/// player identity passed to [`MatchSource::list_matches_in_window`] is used
/// for participant lookup during reconciliation, not for the request.
pub struct LcuClient {
    fetcher: RetryingFetcher,
    base_url: String,
    authorization: String,
    platform_id: String,
    match_count: usize,
}

impl LcuClient {
    /// Connect using the lock file at `lockfile`.
    ///
    /// The local API serves a self-signed certificate on 127.0.0.1.
    pub fn from_lockfile(lockfile: &Path, platform_id: &str) -> Result<Self> {
        let credentials = LockfileCredentials::read(lockfile)?;
        tracing::debug!(port = credentials.port, pid = credentials.pid, "Read League client lock file");

        let transport = ReqwestTransport::local_self_signed(DEFAULT_TIMEOUT)?;
        Ok(Self::new_with_transport(
            Arc::new(transport),
            &credentials,
            platform_id,
            ApiRateLimiter::default(),
            RetryConfig::default(),
        ))
    }

    pub fn new_with_transport(
        transport: Arc<dyn HttpTransport>,
        credentials: &LockfileCredentials,
        platform_id: &str,
        limiter: ApiRateLimiter,
        retry: RetryConfig,
    ) -> Self {
        Self {
            fetcher: RetryingFetcher::new(transport, limiter, retry),
            base_url: credentials.base_url(),
            authorization: credentials.authorization(),
            platform_id: platform_id.to_uppercase(),
            match_count: DEFAULT_MATCH_COUNT,
        }
    }

    #[must_use]
    pub fn with_match_count(mut self, count: usize) -> Self {
        self.match_count = count.max(1);
        self
    }

    pub fn platform_id(&self) -> &str {
        &self.platform_id
    }

    fn history_url(&self) -> String {
        format!(
            "{}{}?begIndex=0&endIndex={}",
            self.base_url, MATCH_HISTORY_PATH, self.match_count
        )
    }

    /// The logged-in summoner's most recent games, newest first.
    pub async fn fetch_recent_matches(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<CanonicalMatch>> {
        let request = HttpRequest::get(self.history_url())
            .header("Authorization", self.authorization.as_str())
            .header("Accept", "application/json");
        let history: LcuMatchHistory = self.fetcher.get_json(request, on_progress).await?;

        let matches: Vec<CanonicalMatch> = history
            .games
            .games
            .into_iter()
            .map(|game| to_canonical_match(game, &self.platform_id))
            .collect();
        tracing::debug!(count = matches.len(), "Fetched League client match history");
        Ok(matches)
    }
}

#[async_trait]
impl MatchSource for LcuClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::LeagueClient
    }

    async fn list_matches_in_window(
        &self,
        player: &PlayerIdentity,
        window: &DateWindow,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<CanonicalMatch>> {
        tracing::info!(player = %player, count = self.match_count, "Fetching League client match history");
        emit(
            on_progress,
            SyncProgress::FetchingPage {
                start: 0,
                count: self.match_count,
            },
        );

        let all = self.fetch_recent_matches(on_progress).await?;
        let total = all.len();
        let matches: Vec<CanonicalMatch> = all
            .into_iter()
            .filter(|m| window.contains(m.end_time))
            .collect();

        emit(
            on_progress,
            SyncProgress::FetchedPage {
                page: 1,
                count: total,
                in_window_so_far: matches.len(),
            },
        );
        emit(on_progress, SyncProgress::ScanComplete { total: matches.len() });

        Ok(matches)
    }
}
