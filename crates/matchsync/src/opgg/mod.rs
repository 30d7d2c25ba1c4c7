//! OP.GG provider, reached through the OP.GG MCP server.
//!
//! # Module Structure
//!
//! - [`types`] - JSON-RPC envelopes and the match-history payload
//! - [`mcp`] - a small streamable-HTTP MCP client (JSON or SSE responses)
//! - [`client`] - `OpggClient`, implementing [`crate::provider::MatchSource`]
//! - [`convert`] - conversion to canonical matches

mod client;
mod convert;
pub mod mcp;
mod types;

pub use client::{OPGG_MCP_ENDPOINT, OpggClient};
pub use convert::{queue_id_for_game_type, to_canonical_match};
pub use mcp::McpClient;
pub use types::{OpggMatch, OpggMatchHistory, OpggParticipant, ToolCallResult, ToolContent};
