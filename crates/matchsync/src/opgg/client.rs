//! OP.GG match-history client.

use std::sync::Arc;

use async_trait::async_trait;

use super::convert::to_canonical_match;
use super::mcp::McpClient;
use super::types::OpggMatchHistory;
use crate::http::HttpTransport;
use crate::http::reqwest_transport::{DEFAULT_TIMEOUT, ReqwestTransport};
use crate::provider::{
    ApiRateLimiter, CanonicalMatch, DateWindow, MatchSource, PlayerIdentity, ProviderError,
    ProviderKind, Result, RiotId,
};
use crate::retry::{RetryConfig, RetryingFetcher};
use crate::sync::{ProgressCallback, SyncProgress, emit};

/// Public OP.GG MCP endpoint.
pub const OPGG_MCP_ENDPOINT: &str = "https://mcp-api.op.gg/mcp";

const LIST_MATCHES_TOOL: &str = "lol_list_summoner_matches";

/// OP.GG client: one tool call returns the player's recent, fully hydrated
/// matches, which are then filtered to the window in memory.
pub struct OpggClient {
    mcp: McpClient,
    region: String,
}

impl OpggClient {
    pub fn new(endpoint: &str, region: &str) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(DEFAULT_TIMEOUT)?;
        Ok(Self::new_with_transport(
            Arc::new(transport),
            endpoint,
            region,
            ApiRateLimiter::default(),
            RetryConfig::default(),
        ))
    }

    pub fn new_with_transport(
        transport: Arc<dyn HttpTransport>,
        endpoint: &str,
        region: &str,
        limiter: ApiRateLimiter,
        retry: RetryConfig,
    ) -> Self {
        let fetcher = RetryingFetcher::new(transport, limiter, retry);
        Self {
            mcp: McpClient::new(fetcher, endpoint),
            region: region.to_lowercase(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Open the MCP session. Called implicitly by the first fetch.
    pub async fn connect(&self) -> Result<()> {
        self.mcp.connect(None).await
    }

    /// Close the MCP session.
    pub async fn disconnect(&self) -> Result<()> {
        self.mcp.disconnect().await
    }

    /// All matches OP.GG returns for `riot_id`, newest first.
    pub async fn fetch_match_history(
        &self,
        riot_id: &RiotId,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<CanonicalMatch>> {
        tracing::info!(player = %riot_id, region = %self.region, "Fetching OP.GG match history");

        let arguments = serde_json::json!({
            "game_name": riot_id.game_name,
            "tag_line": riot_id.tag_line,
            "region": self.region,
        });
        let result = self
            .mcp
            .call_tool(LIST_MATCHES_TOOL, arguments, on_progress)
            .await?;

        let text = result
            .content
            .iter()
            .find(|c| c.kind == "text")
            .and_then(|c| c.text.as_deref())
            .ok_or_else(|| ProviderError::Mcp("tool returned no text content".to_string()))?;

        let payload: OpggMatchHistory = serde_json::from_str(text)?;
        let champions = payload.metadata_maps.champion_ids;
        let matches: Vec<CanonicalMatch> = payload
            .data
            .game_history
            .into_iter()
            .map(|record| to_canonical_match(record, &champions))
            .collect();

        tracing::debug!(count = matches.len(), "Fetched OP.GG matches");
        Ok(matches)
    }
}

#[async_trait]
impl MatchSource for OpggClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::OpGg
    }

    async fn list_matches_in_window(
        &self,
        player: &PlayerIdentity,
        window: &DateWindow,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<CanonicalMatch>> {
        let riot_id = player
            .riot_id
            .as_ref()
            .ok_or_else(|| ProviderError::config("OP.GG needs the player's Riot ID (name#tag)"))?;

        let all = self.fetch_match_history(riot_id, on_progress).await?;
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
        tracing::info!(total, in_window = matches.len(), "Filtered OP.GG matches to window");
        emit(on_progress, SyncProgress::ScanComplete { total: matches.len() });

        Ok(matches)
    }
}
