//! Riot match-v5 API data types.
//!
//! Only the fields we need are declared, which keeps deserialization
//! resilient to additions in the API.
//!
//! API docs: https://developer.riotgames.com/apis#match-v5

use serde::Deserialize;

/// `GET /lol/match/v5/matches/{matchId}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RiotMatch {
    pub metadata: RiotMatchMetadata,
    pub info: RiotMatchInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiotMatchMetadata {
    pub match_id: String,
    /// Participant PUUIDs.
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiotMatchInfo {
    /// Seconds when `gameEndTimestamp` is present.
    pub game_duration: u64,
    /// Epoch milliseconds; absent on matches played before patch 11.20.
    pub game_end_timestamp: Option<i64>,
    /// Epoch milliseconds.
    pub game_start_timestamp: Option<i64>,
    #[serde(default)]
    pub game_mode: String,
    #[serde(default)]
    pub game_type: String,
    pub queue_id: i64,
    #[serde(default)]
    pub participants: Vec<RiotParticipant>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiotParticipant {
    pub puuid: String,
    #[serde(default)]
    pub summoner_name: String,
    #[serde(default)]
    pub riot_id_game_name: Option<String>,
    #[serde(default)]
    pub riot_id_tagline: Option<String>,
    #[serde(default)]
    pub champion_id: u32,
    #[serde(default)]
    pub champion_name: String,
    pub team_id: u32,
    pub win: bool,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    #[serde(default)]
    pub total_minions_killed: u32,
    #[serde(default)]
    pub neutral_minions_killed: u32,
    #[serde(default)]
    pub gold_earned: u32,
}
