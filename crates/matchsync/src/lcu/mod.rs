//! Local League client provider.
//!
//! Reads the client's lock file for the port and password of its local API,
//! then asks for the logged-in summoner's recent games. Only works while the
//! client is running on the same machine.
//!
//! # Module Structure
//!
//! - [`lockfile`] - lock file discovery and parsing
//! - [`types`] - match-history payloads
//! - [`client`] - `LcuClient`, implementing [`crate::provider::MatchSource`]
//! - [`convert`] - conversion to canonical matches

mod client;
mod convert;
pub mod lockfile;
mod types;

pub use client::{DEFAULT_MATCH_COUNT, DEFAULT_PLATFORM_ID, LcuClient};
pub use convert::{match_id, to_canonical_match};
pub use lockfile::{LockfileCredentials, default_lockfile_path};
pub use types::{LcuGame, LcuGameList, LcuMatchHistory, LcuParticipant, LcuParticipantIdentity, LcuPlayer, LcuStats};
