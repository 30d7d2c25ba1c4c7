//! Clockify API data types.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::destination::{ExistingEntry, NewTimeEntry};

/// Authenticated user (`GET /user`).
///
/// API docs: https://docs.clockify.me/#tag/User/operation/getLoggedUser
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockifyUser {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    /// Workspace currently selected in the Clockify UI.
    pub active_workspace: Option<String>,
    pub default_workspace: Option<String>,
}

impl ClockifyUser {
    /// Active workspace, falling back to the default one.
    pub fn workspace_id(&self) -> Option<&str> {
        self.active_workspace
            .as_deref()
            .or(self.default_workspace.as_deref())
            .filter(|ws| !ws.is_empty())
    }
}

/// Workspace project.
#[derive(Debug, Clone, Deserialize)]
pub struct ClockifyProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub archived: bool,
}

/// Start/end of a time entry; `end` is null while a timer is running.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClockifyTimeInterval {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub duration: Option<String>,
}

/// Time entry as returned by the listing and create endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockifyTimeEntry {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub time_interval: ClockifyTimeInterval,
    #[serde(default)]
    pub billable: bool,
    pub project_id: Option<String>,
}

impl From<ClockifyTimeEntry> for ExistingEntry {
    fn from(entry: ClockifyTimeEntry) -> Self {
        Self {
            id: entry.id,
            description: entry.description.unwrap_or_default(),
            start: entry.time_interval.start,
            end: entry.time_interval.end,
        }
    }
}

/// Body of `POST /workspaces/{ws}/time-entries`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimeEntryRequest {
    pub start: String,
    pub end: String,
    pub billable: bool,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl CreateTimeEntryRequest {
    pub fn new(entry: &NewTimeEntry, project_id: Option<String>) -> Self {
        Self {
            start: format_timestamp(entry.start),
            end: format_timestamp(entry.end),
            billable: entry.billable,
            description: entry.description.clone(),
            project_id,
        }
    }
}

/// Timestamps the way Clockify accepts them: `2024-06-10T12:00:00Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn workspace_prefers_active_then_default() {
        let user: ClockifyUser = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "activeWorkspace": "ws-active",
            "defaultWorkspace": "ws-default"
        }))
        .unwrap();
        assert_eq!(user.workspace_id(), Some("ws-active"));

        let user: ClockifyUser = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "activeWorkspace": null,
            "defaultWorkspace": "ws-default"
        }))
        .unwrap();
        assert_eq!(user.workspace_id(), Some("ws-default"));

        let user: ClockifyUser = serde_json::from_value(serde_json::json!({"id": "u1"})).unwrap();
        assert_eq!(user.workspace_id(), None);
    }

    #[test]
    fn time_entry_converts_with_missing_description_and_running_timer() {
        let entry: ClockifyTimeEntry = serde_json::from_value(serde_json::json!({
            "id": "e1",
            "description": null,
            "timeInterval": {"start": "2024-06-10T12:00:00Z", "end": null, "duration": null}
        }))
        .unwrap();
        let existing = ExistingEntry::from(entry);
        assert_eq!(existing.id, "e1");
        assert_eq!(existing.description, "");
        assert_eq!(
            existing.start,
            Some(Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap())
        );
        assert!(existing.end.is_none());
    }

    #[test]
    fn create_request_serializes_camel_case_and_omits_missing_project() {
        let entry = NewTimeEntry {
            start: Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 6, 10, 12, 30, 0).unwrap(),
            billable: false,
            description: "x [Match:EUW1_1]".to_string(),
        };

        let body = serde_json::to_value(CreateTimeEntryRequest::new(&entry, None)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "start": "2024-06-10T12:00:00Z",
                "end": "2024-06-10T12:30:00Z",
                "billable": false,
                "description": "x [Match:EUW1_1]"
            })
        );

        let body =
            serde_json::to_value(CreateTimeEntryRequest::new(&entry, Some("p1".to_string()))).unwrap();
        assert_eq!(body["projectId"], "p1");
    }
}
