//! Match synchronization pipeline.
//!
//! # Module Structure
//!
//! - [`types`] - `SyncReport`, `SyncOptions`, constants
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`scanner`] - `RangeScanner`: window-bounded pagination with early stop
//! - [`reconcile`] - `SyncReconciler`: idempotent entry creation
//! - [`engine`] - `sync_matches()`: scan, snapshot, reconcile
//!
//! # Example
//!
//! ```ignore
//! use matchsync::provider::{DateWindow, PlayerIdentity};
//! use matchsync::sync::{SyncOptions, sync_matches};
//!
//! let window = DateWindow::last_days(7, chrono::Utc::now());
//! let report = sync_matches(&source, &tracker, &player, &window, &SyncOptions::default(), None).await?;
//! println!("Synced {} matches", report.synced);
//! ```

pub mod engine;
mod progress;
pub mod reconcile;
pub mod scanner;
mod types;

pub use types::{SyncOptions, SyncReport};

pub use types::{DEFAULT_CREATION_COOLDOWN_MS, DEFAULT_PAGE_SIZE, DEFAULT_SYNC_DAYS};

pub use progress::{ProgressCallback, SyncProgress, emit};

pub use engine::{SyncError, queue_breakdown, sync_matches};
pub use reconcile::{
    MatchOutcome, ReconcileError, SyncReconciler, build_description, is_already_synced,
    match_marker,
};
pub use scanner::{PagedMatchApi, RangeScanner};
