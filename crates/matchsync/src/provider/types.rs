use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};

use crate::sync::ProgressCallback;

use super::errors::Result;

/// Which upstream variant produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Riot match-v5 API (id listing + detail fetch).
    Riot,
    /// OP.GG MCP server (one call, hydrated records).
    OpGg,
    /// Local League client API (lock-file credentials).
    LeagueClient,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Riot => write!(f, "riot"),
            Self::OpGg => write!(f, "op.gg"),
            Self::LeagueClient => write!(f, "league-client"),
        }
    }
}

/// A Riot ID (`game_name#tag_line`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RiotId {
    pub game_name: String,
    pub tag_line: String,
}

impl RiotId {
    pub fn new(game_name: impl Into<String>, tag_line: impl Into<String>) -> Self {
        Self {
            game_name: game_name.into(),
            tag_line: tag_line.into(),
        }
    }

    /// Parse `name#tag`. Returns `None` when either half is empty.
    pub fn parse(s: &str) -> Option<Self> {
        let (name, tag) = s.rsplit_once('#')?;
        let (name, tag) = (name.trim(), tag.trim());
        if name.is_empty() || tag.is_empty() {
            return None;
        }
        Some(Self::new(name, tag))
    }

    /// Case-insensitive comparison, the way the game client treats Riot IDs.
    pub fn eq_ignore_case(&self, other: &RiotId) -> bool {
        self.game_name.to_lowercase() == other.game_name.to_lowercase()
            && self.tag_line.to_lowercase() == other.tag_line.to_lowercase()
    }
}

impl fmt::Display for RiotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.game_name, self.tag_line)
    }
}

/// One player's line in a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Stable identity: the PUUID when the provider exposes one, otherwise the
    /// lowercased Riot ID.
    pub id: String,
    /// Human-readable name (`name#tag` when known).
    pub display_name: String,
    pub puuid: Option<String>,
    pub riot_id: Option<RiotId>,
    pub champion: String,
    pub team_id: u32,
    pub win: bool,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub minions: u32,
    pub gold: u32,
}

impl Participant {
    /// Build the stable id and display string from whatever identity the provider gave us.
    pub fn identity(puuid: Option<&str>, riot_id: Option<&RiotId>, fallback: &str) -> (String, String) {
        let display = riot_id
            .map(ToString::to_string)
            .unwrap_or_else(|| fallback.to_string());
        let id = match (puuid, riot_id) {
            (Some(p), _) if !p.is_empty() => p.to_string(),
            (_, Some(r)) => r.to_string().to_lowercase(),
            _ => fallback.to_lowercase(),
        };
        (id, display)
    }
}

/// Normalized, provider-agnostic representation of one completed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalMatch {
    /// Globally unique match id; the idempotency key.
    pub match_id: String,
    pub queue_id: i64,
    /// Resolved queue description (never empty; unknown queues get a synthetic label).
    pub queue_label: String,
    pub game_mode: String,
    pub duration_secs: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub participants: Vec<Participant>,
}

impl CanonicalMatch {
    /// Build a match from its recorded end and duration; the start is always
    /// `end - duration`.
    pub fn new(
        match_id: impl Into<String>,
        queue_id: i64,
        queue_label: impl Into<String>,
        game_mode: impl Into<String>,
        recorded_end: DateTime<Utc>,
        duration_secs: u64,
        participants: Vec<Participant>,
    ) -> Self {
        let start_time = i64::try_from(duration_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|d| recorded_end.checked_sub_signed(d))
            .unwrap_or(recorded_end);
        Self {
            match_id: match_id.into(),
            queue_id,
            queue_label: queue_label.into(),
            game_mode: game_mode.into(),
            duration_secs,
            start_time,
            end_time: recorded_end,
            participants,
        }
    }

    /// Find the participant matching `player`.
    pub fn find_participant(&self, player: &PlayerIdentity) -> Option<&Participant> {
        self.participants.iter().find(|p| player.matches(p))
    }
}

/// The player whose matches are synced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub puuid: Option<String>,
    pub riot_id: Option<RiotId>,
}

impl PlayerIdentity {
    pub fn from_puuid(puuid: impl Into<String>) -> Self {
        Self {
            puuid: Some(puuid.into()),
            riot_id: None,
        }
    }

    pub fn from_riot_id(riot_id: RiotId) -> Self {
        Self {
            puuid: None,
            riot_id: Some(riot_id),
        }
    }

    /// Attach a Riot ID to an identity.
    #[must_use]
    pub fn with_riot_id(mut self, riot_id: RiotId) -> Self {
        self.riot_id = Some(riot_id);
        self
    }

    /// Equal PUUIDs match; otherwise compare Riot IDs.
    ///
    /// PUUIDs are encrypted per API key, so the same player can carry a
    /// different PUUID on each provider. The Riot ID is the shared key.
    pub fn matches(&self, participant: &Participant) -> bool {
        if let (Some(mine), Some(theirs)) = (&self.puuid, &participant.puuid)
            && mine == theirs
        {
            return true;
        }
        match (&self.riot_id, &participant.riot_id) {
            (Some(mine), Some(theirs)) => mine.eq_ignore_case(theirs),
            _ => false,
        }
    }
}

impl fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.riot_id, &self.puuid) {
            (Some(riot_id), _) => write!(f, "{riot_id}"),
            (None, Some(puuid)) => write!(f, "{puuid}"),
            (None, None) => write!(f, "<unknown player>"),
        }
    }
}

/// Where a timestamp falls relative to a [`DateWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    /// Before `start`.
    TooOld,
    Inside,
    /// After `end`.
    TooNew,
}

/// An inclusive `[start, end]` time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateWindow {
    /// Create a window; the bounds are reordered if given backwards.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// The `days` days ending at `now`.
    pub fn last_days(days: u32, now: DateTime<Utc>) -> Self {
        Self::new(now - Duration::days(i64::from(days)), now)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn position(&self, at: DateTime<Utc>) -> WindowPosition {
        if at < self.start {
            WindowPosition::TooOld
        } else if at > self.end {
            WindowPosition::TooNew
        } else {
            WindowPosition::Inside
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.position(at) == WindowPosition::Inside
    }

    /// Range to list destination entries over: whole days, padded by one day on
    /// each side so entries that started before `start` are still seen.
    pub fn snapshot_range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let day = Duration::days(1);
        let start = self.start.duration_trunc(day).unwrap_or(self.start) - day;
        let end = self.end.duration_trunc(day).unwrap_or(self.end) + day + day;
        (start, end)
    }
}

/// Trait for upstream match-history providers.
///
/// Every provider variant (paginated id listing, single hydrated call, local
/// client session) converges on the same output, so the sync engine only ever
/// sees this one capability.
///
/// # Implementation Notes
///
/// Implementors should:
/// - Return only matches whose end time lies inside `window`
/// - Return matches newest-first, in the order the provider listed them
/// - Pace and retry their own upstream requests
/// - Report progress via the optional callback
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Which provider backs this source.
    fn provider(&self) -> ProviderKind;

    /// List the player's matches that ended inside `window`.
    async fn list_matches_in_window(
        &self,
        player: &PlayerIdentity,
        window: &DateWindow,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<CanonicalMatch>>;
}
