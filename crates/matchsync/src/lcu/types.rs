//! League client match-history payloads.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `GET /lol-match-history/v1/products/lol/current-summoner/matches`.
#[derive(Debug, Clone, Deserialize)]
pub struct LcuMatchHistory {
    #[serde(default)]
    pub games: LcuGameList,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LcuGameList {
    #[serde(default)]
    pub games: Vec<LcuGame>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcuGame {
    pub game_id: u64,
    pub game_creation_date: DateTime<Utc>,
    /// Seconds.
    pub game_duration: u64,
    #[serde(default)]
    pub game_mode: String,
    #[serde(default)]
    pub queue_id: i64,
    #[serde(default)]
    pub participant_identities: Vec<LcuParticipantIdentity>,
    #[serde(default)]
    pub participants: Vec<LcuParticipant>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcuParticipantIdentity {
    pub participant_id: u32,
    pub player: LcuPlayer,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcuPlayer {
    #[serde(default)]
    pub puuid: Option<String>,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub tag_line: String,
    #[serde(default)]
    pub summoner_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcuParticipant {
    pub participant_id: u32,
    pub champion_id: u32,
    #[serde(default)]
    pub team_id: u32,
    pub stats: LcuStats,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcuStats {
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub win: bool,
    #[serde(default)]
    pub total_minions_killed: u32,
    #[serde(default)]
    pub neutral_minions_killed: u32,
    #[serde(default)]
    pub gold_earned: u32,
}
