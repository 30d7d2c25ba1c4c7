//! Matchsync - League of Legends match history as Clockify time entries.
//!
//! This library lists a player's matches inside a date window from one of
//! several upstream providers, normalizes them into [`CanonicalMatch`]
//! records and creates one time entry per match that is not already present
//! in the destination workspace.
//!
//! # Features
//!
//! - `riot` - Riot match-v5 API provider (API key).
//! - `opgg` - OP.GG provider over its MCP server (no key).
//! - `lcu` - local League client provider (lock-file credentials).
//!
//! # Example
//!
//! ```ignore
//! use chrono::Utc;
//! use matchsync::clockify::{CLOCKIFY_API_BASE, ClockifyClient};
//! use matchsync::riot::{RIOT_EUROPE_API_BASE, RiotClient};
//! use matchsync::{DateWindow, PlayerIdentity, SyncOptions, sync_matches};
//!
//! let source = RiotClient::new(RIOT_EUROPE_API_BASE, &riot_key)?;
//! let tracker = ClockifyClient::connect(CLOCKIFY_API_BASE, &clockify_key, Some("Gaming")).await?;
//!
//! let window = DateWindow::last_days(7, Utc::now());
//! let report = sync_matches(&source, &tracker, &player, &window, &SyncOptions::default(), None).await?;
//! println!("{} new, {} already synced", report.synced, report.skipped);
//! ```

pub mod catalog;
pub mod clockify;
pub mod destination;
pub mod http;
pub mod provider;
pub mod retry;
pub mod sync;

#[cfg(feature = "riot")]
pub mod riot;

#[cfg(feature = "opgg")]
pub mod opgg;

#[cfg(feature = "lcu")]
pub mod lcu;

pub use destination::{DestinationError, ExistingEntry, NewTimeEntry, TimeTracker};
pub use provider::{
    ApiRateLimiter, CanonicalMatch, DateWindow, MatchSource, Participant, PlayerIdentity,
    ProviderError, ProviderKind, RateLimitPolicy, RiotId, short_error_message,
};
pub use retry::{RetryConfig, RetryingFetcher};
pub use sync::{
    ProgressCallback, SyncError, SyncOptions, SyncProgress, SyncReport, sync_matches,
};
