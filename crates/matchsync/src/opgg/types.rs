//! OP.GG MCP payload types.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 request or notification (no `id`).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    pub fn call(id: u64, method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: Some(id),
            method: method.into(),
            params: Some(params),
        }
    }

    pub fn notification(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: None,
            method: method.into(),
            params: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// Result of `tools/call`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    #[serde(default)]
    pub content: Vec<ToolContent>,
    #[serde(default)]
    pub is_error: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Payload of the `lol_list_summoner_matches` tool (the text content, parsed).
#[derive(Debug, Clone, Deserialize)]
pub struct OpggMatchHistory {
    pub data: OpggMatchHistoryData,
    #[serde(default)]
    pub metadata_maps: OpggMetadataMaps,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpggMatchHistoryData {
    #[serde(default)]
    pub game_history: Vec<OpggMatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpggMetadataMaps {
    /// Champion id (as a string) to name.
    #[serde(default)]
    pub champion_ids: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpggMatch {
    pub id: String,
    /// When OP.GG recorded the game; used as its end time.
    pub created_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub game_map: String,
    #[serde(default)]
    pub game_type: String,
    pub game_length_second: u64,
    #[serde(default)]
    pub participants: Vec<OpggParticipant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpggParticipant {
    pub summoner: OpggSummoner,
    pub champion_id: u32,
    /// `BLUE` or `RED`.
    pub team_key: String,
    #[serde(default)]
    pub position: Option<String>,
    pub stats: OpggStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpggSummoner {
    #[serde(default)]
    pub puuid: Option<String>,
    pub game_name: String,
    pub tagline: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpggStats {
    #[serde(default)]
    pub kill: u32,
    #[serde(default)]
    pub death: u32,
    #[serde(default)]
    pub assist: u32,
    #[serde(default)]
    pub minion_kill: u32,
    #[serde(default)]
    pub gold_earned: u32,
    /// `WIN` or `LOSE`.
    pub result: String,
}
