//! Riot Games match-v5 provider.
//!
//! Lists match identifiers for a PUUID page by page and resolves each one
//! with a detail request, pacing everything through the client's rate limiter.
//!
//! # Module Structure
//!
//! - [`types`] - match-v5 response types
//! - [`client`] - `RiotClient`, implementing [`crate::provider::MatchSource`]
//! - [`convert`] - conversion to canonical matches
//!
//! ```ignore
//! use matchsync::riot::{RIOT_EUROPE_API_BASE, RiotClient};
//!
//! let client = RiotClient::new(RIOT_EUROPE_API_BASE, &api_key)?;
//! let matches = client.list_matches_in_window(&player, &window, None).await?;
//! ```

mod client;
mod convert;
mod types;

pub use client::{RIOT_EUROPE_API_BASE, RiotClient};
pub use convert::to_canonical_match;
pub use types::{RiotMatch, RiotMatchInfo, RiotMatchMetadata, RiotParticipant};
