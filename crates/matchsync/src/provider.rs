//! Provider-agnostic trait for upstream match-history sources.
//!
//! This module defines the `MatchSource` trait that gives the sync engine one
//! interface over every upstream (Riot match-v5, OP.GG, the local League
//! client), along with the canonical match model and the per-client rate
//! limiter.
//!
//! # Example
//!
//! ```ignore
//! use matchsync::provider::{DateWindow, MatchSource, PlayerIdentity};
//!
//! async fn show<S: MatchSource>(source: &S, player: &PlayerIdentity) -> matchsync::provider::Result<()> {
//!     let window = DateWindow::last_days(7, chrono::Utc::now());
//!     for m in source.list_matches_in_window(player, &window, None).await? {
//!         println!("{} {}", m.match_id, m.queue_label);
//!     }
//!     Ok(())
//! }
//! ```

mod errors;
mod rate_limit;
mod types;

pub use errors::{ProviderError, Result, short_error_message};
pub use rate_limit::{ApiRateLimiter, RateLimitPolicy, WindowKind, WindowQuota, rate_limits};
pub use types::{
    CanonicalMatch, DateWindow, MatchSource, Participant, PlayerIdentity, ProviderKind, RiotId,
    WindowPosition,
};
