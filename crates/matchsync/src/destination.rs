//! Time-tracking destination abstraction.
//!
//! The sync engine only needs two operations from a time tracker: list the
//! entries in a date range and create a new one. [`crate::clockify`] provides
//! the production implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when talking to the time-tracking service.
#[derive(Debug, Error)]
pub enum DestinationError {
    /// Non-success response.
    #[error("Destination request failed ({status} {status_text}): {body}")]
    Request {
        status: u16,
        status_text: String,
        body: String,
    },

    /// Network or connection error.
    #[error("Network error: {0}")]
    Transport(#[from] HttpError),

    /// Response body did not deserialize.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The authenticated user has no active workspace.
    #[error("No active workspace for the authenticated user")]
    NoWorkspace,

    /// A project was configured by name but does not exist in the workspace.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),
}

impl DestinationError {
    /// Check if this error is a throttling response.
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Request { status: 429, .. })
    }
}

/// An entry already present in the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingEntry {
    pub id: String,
    pub description: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ExistingEntry {
    /// Entry carrying only a description, for snapshots built by hand.
    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            description: description.into(),
            start: None,
            end: None,
        }
    }
}

/// Payload for a new time entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTimeEntry {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub billable: bool,
    pub description: String,
}

/// A time-tracking service the sync writes into.
///
/// # Implementation Notes
///
/// Implementors should:
/// - Return every entry whose start lies in `[from, to)`, following pagination
/// - Surface throttling as an error for which `is_rate_limited()` is true
#[async_trait]
pub trait TimeTracker: Send + Sync {
    /// List entries in a date range.
    async fn list_entries(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ExistingEntry>, DestinationError>;

    /// Create one entry.
    async fn create_entry(&self, entry: &NewTimeEntry) -> Result<ExistingEntry, DestinationError>;
}
