//! Clockify time-tracking destination.
//!
//! # Module Structure
//!
//! - [`types`] - API payloads and their conversion to destination types
//! - [`client`] - `ClockifyClient`, the [`crate::destination::TimeTracker`] implementation
//!
//! ```ignore
//! use matchsync::clockify::{CLOCKIFY_API_BASE, ClockifyClient};
//!
//! let tracker = ClockifyClient::connect(CLOCKIFY_API_BASE, "api-key", Some("Gaming")).await?;
//! ```

mod client;
mod types;

pub use client::{CLOCKIFY_API_BASE, ClockifyClient};
pub use types::{ClockifyProject, ClockifyTimeEntry, ClockifyUser, CreateTimeEntryRequest};
