//! Clockify API client.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use super::types::{
    ClockifyProject, ClockifyTimeEntry, ClockifyUser, CreateTimeEntryRequest, format_timestamp,
};
use crate::destination::{DestinationError, ExistingEntry, NewTimeEntry, TimeTracker};
use crate::http::reqwest_transport::{DEFAULT_TIMEOUT, ReqwestTransport};
use crate::http::{HttpRequest, HttpResponse, HttpTransport};

/// Default Clockify API base URL.
pub const CLOCKIFY_API_BASE: &str = "https://api.clockify.me/api/v1";

/// Entries requested per listing page.
const PAGE_SIZE: usize = 50;

/// Clockify API client bound to one user and workspace.
#[derive(Clone)]
pub struct ClockifyClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
    user_id: String,
    workspace_id: String,
    project_id: Option<String>,
}

impl ClockifyClient {
    /// Authenticate and resolve the workspace (and project, when named).
    ///
    /// # Errors
    ///
    /// - [`DestinationError::Request`] if the API key is rejected
    /// - [`DestinationError::NoWorkspace`] if the user has no workspace
    /// - [`DestinationError::ProjectNotFound`] if `project_name` does not exist
    pub async fn connect(
        base_url: &str,
        api_key: &str,
        project_name: Option<&str>,
    ) -> Result<Self, DestinationError> {
        let transport = ReqwestTransport::with_timeout(DEFAULT_TIMEOUT)?;
        Self::connect_with_transport(Arc::new(transport), base_url, api_key, project_name).await
    }

    pub async fn connect_with_transport(
        transport: Arc<dyn HttpTransport>,
        base_url: &str,
        api_key: &str,
        project_name: Option<&str>,
    ) -> Result<Self, DestinationError> {
        let mut client = Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            user_id: String::new(),
            workspace_id: String::new(),
            project_id: None,
        };

        let user: ClockifyUser = client.get(&format!("{}/user", client.base_url)).await?;
        let workspace_id = user
            .workspace_id()
            .ok_or(DestinationError::NoWorkspace)?
            .to_string();
        client.user_id = user.id;
        client.workspace_id = workspace_id;

        if let Some(name) = project_name.filter(|n| !n.trim().is_empty()) {
            client.project_id = Some(client.find_project(name.trim()).await?);
        }

        tracing::info!(
            user_id = %client.user_id,
            workspace_id = %client.workspace_id,
            project_id = client.project_id.as_deref().unwrap_or("-"),
            "Connected to Clockify"
        );

        Ok(client)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    fn authed(&self, request: HttpRequest) -> HttpRequest {
        request
            .header("X-Api-Key", self.api_key.as_str())
            .header("Accept", "application/json")
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, DestinationError> {
        let response = self.transport.send(self.authed(request)).await?;
        if !response.is_success() {
            return Err(DestinationError::Request {
                status: response.status,
                status_text: response.status_text(),
                body: response.text(),
            });
        }
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, DestinationError> {
        let response = self.send(HttpRequest::get(url)).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Exact (case-insensitive) name match among non-archived projects.
    async fn find_project(&self, name: &str) -> Result<String, DestinationError> {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("name", name)
            .append_pair("archived", "false")
            .finish();
        let url = format!(
            "{}/workspaces/{}/projects?{}",
            self.base_url, self.workspace_id, query
        );

        let projects: Vec<ClockifyProject> = self.get(&url).await?;
        projects
            .into_iter()
            .find(|p| !p.archived && p.name.eq_ignore_ascii_case(name))
            .map(|p| p.id)
            .ok_or_else(|| DestinationError::ProjectNotFound(name.to_string()))
    }

    fn entries_url(&self, from: DateTime<Utc>, to: DateTime<Utc>, page: usize) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("start", &format_timestamp(from))
            .append_pair("end", &format_timestamp(to))
            .append_pair("page", &page.to_string())
            .append_pair("page-size", &PAGE_SIZE.to_string())
            .finish();
        format!(
            "{}/workspaces/{}/user/{}/time-entries?{}",
            self.base_url, self.workspace_id, self.user_id, query
        )
    }

    fn create_url(&self) -> String {
        format!("{}/workspaces/{}/time-entries", self.base_url, self.workspace_id)
    }
}

#[async_trait]
impl TimeTracker for ClockifyClient {
    async fn list_entries(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ExistingEntry>, DestinationError> {
        let mut entries = Vec::new();
        let mut page = 1;

        loop {
            let batch: Vec<ClockifyTimeEntry> = self.get(&self.entries_url(from, to, page)).await?;
            let count = batch.len();
            entries.extend(batch.into_iter().map(ExistingEntry::from));

            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        tracing::debug!(count = entries.len(), pages = page, "Listed Clockify time entries");
        Ok(entries)
    }

    async fn create_entry(&self, entry: &NewTimeEntry) -> Result<ExistingEntry, DestinationError> {
        let body = serde_json::to_value(CreateTimeEntryRequest::new(entry, self.project_id.clone()))?;
        let response = self
            .send(HttpRequest::post_json(self.create_url(), &body))
            .await?;
        let created: ClockifyTimeEntry = serde_json::from_slice(&response.body)?;
        Ok(created.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, HttpResponse, MockTransport, header_get};
    use chrono::TimeZone;

    const BASE: &str = "https://clockify.test/api/v1";

    fn user_json() -> serde_json::Value {
        serde_json::json!({
            "id": "user-1",
            "name": "Player",
            "email": "player@example.com",
            "activeWorkspace": "ws-1",
            "defaultWorkspace": "ws-1"
        })
    }

    fn entry_json(id: usize, description: &str) -> serde_json::Value {
        serde_json::json!({
            "id": format!("entry-{id}"),
            "description": description,
            "billable": false,
            "projectId": null,
            "timeInterval": {
                "start": "2024-06-10T12:00:00Z",
                "end": "2024-06-10T12:30:00Z",
                "duration": "PT30M"
            }
        })
    }

    async fn connected(transport: &MockTransport) -> ClockifyClient {
        transport.push_json(format!("{BASE}/user"), 200, user_json());
        ClockifyClient::connect_with_transport(Arc::new(transport.clone()), BASE, "key-123", None)
            .await
            .expect("connect succeeds")
    }

    #[tokio::test]
    async fn connect_resolves_user_and_workspace_with_api_key_header() {
        let transport = MockTransport::new();
        let client = connected(&transport).await;

        assert_eq!(client.user_id(), "user-1");
        assert_eq!(client.workspace_id(), "ws-1");
        assert!(client.project_id().is_none());

        let requests = transport.requests();
        assert_eq!(header_get(&requests[0].headers, "x-api-key"), Some("key-123"));
    }

    #[tokio::test]
    async fn connect_rejects_bad_key() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/user"),
            401,
            serde_json::json!({"message": "Full authentication is required", "code": 1000}),
        );

        let err = ClockifyClient::connect_with_transport(Arc::new(transport), BASE, "bad", None)
            .await
            .err()
            .expect("connect fails");
        assert!(matches!(err, DestinationError::Request { status: 401, .. }));
    }

    #[tokio::test]
    async fn connect_without_workspace_fails() {
        let transport = MockTransport::new();
        transport.push_json(format!("{BASE}/user"), 200, serde_json::json!({"id": "user-1"}));

        let err = ClockifyClient::connect_with_transport(Arc::new(transport), BASE, "k", None)
            .await
            .err()
            .expect("connect fails");
        assert!(matches!(err, DestinationError::NoWorkspace));
    }

    #[tokio::test]
    async fn connect_resolves_project_by_exact_name() {
        let transport = MockTransport::new();
        transport.push_json(format!("{BASE}/user"), 200, user_json());
        transport.push_json(
            format!("{BASE}/workspaces/ws-1/projects?name=League+of+Legends&archived=false"),
            200,
            serde_json::json!([
                {"id": "p-other", "name": "League of Legends Coaching", "archived": false},
                {"id": "p-lol", "name": "league of legends", "archived": false}
            ]),
        );

        let client = ClockifyClient::connect_with_transport(
            Arc::new(transport),
            BASE,
            "k",
            Some("League of Legends"),
        )
        .await
        .expect("connect succeeds");
        assert_eq!(client.project_id(), Some("p-lol"));
    }

    #[tokio::test]
    async fn connect_with_unknown_project_fails() {
        let transport = MockTransport::new();
        transport.push_json(format!("{BASE}/user"), 200, user_json());
        transport.push_json(
            format!("{BASE}/workspaces/ws-1/projects?name=Gaming&archived=false"),
            200,
            serde_json::json!([]),
        );

        let err = ClockifyClient::connect_with_transport(Arc::new(transport), BASE, "k", Some("Gaming"))
            .await
            .err()
            .expect("connect fails");
        assert!(matches!(err, DestinationError::ProjectNotFound(name) if name == "Gaming"));
    }

    #[tokio::test]
    async fn list_entries_follows_pages_until_short_page() {
        let transport = MockTransport::new();
        let client = connected(&transport).await;
        let from = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 6, 9, 0, 0, 0).unwrap();

        let full: Vec<serde_json::Value> = (0..PAGE_SIZE)
            .map(|i| entry_json(i, &format!("entry {i}")))
            .collect();
        transport.push_json(client.entries_url(from, to, 1), 200, serde_json::json!(full));
        transport.push_json(
            client.entries_url(from, to, 2),
            200,
            serde_json::json!([entry_json(99, "✅ Ahri - Win [Match:EUW1_1]")]),
        );

        let entries = client.list_entries(from, to).await.expect("listing succeeds");
        assert_eq!(entries.len(), PAGE_SIZE + 1);
        assert!(entries[PAGE_SIZE].description.contains("[Match:EUW1_1]"));

        let url = client.entries_url(from, to, 1);
        assert!(url.contains("start=2024-06-01T00%3A00%3A00Z"));
        assert!(url.contains("page-size=50"));
    }

    #[tokio::test]
    async fn create_entry_posts_payload_with_project() {
        let transport = MockTransport::new();
        transport.push_json(format!("{BASE}/user"), 200, user_json());
        transport.push_json(
            format!("{BASE}/workspaces/ws-1/projects?name=Gaming&archived=false"),
            200,
            serde_json::json!([{"id": "p-1", "name": "Gaming"}]),
        );
        let client =
            ClockifyClient::connect_with_transport(Arc::new(transport.clone()), BASE, "k", Some("Gaming"))
                .await
                .expect("connect succeeds");

        transport.push_response(
            HttpMethod::Post,
            client.create_url(),
            HttpResponse::json(201, &entry_json(1, "desc [Match:EUW1_1]")),
        );

        let entry = NewTimeEntry {
            start: Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 6, 10, 12, 30, 0).unwrap(),
            billable: false,
            description: "desc [Match:EUW1_1]".to_string(),
        };
        let created = client.create_entry(&entry).await.expect("create succeeds");
        assert_eq!(created.id, "entry-1");

        let post = transport
            .requests()
            .into_iter()
            .find(|r| r.method == HttpMethod::Post)
            .expect("post sent");
        let body: serde_json::Value = serde_json::from_slice(&post.body).unwrap();
        assert_eq!(body["projectId"], "p-1");
        assert_eq!(body["billable"], false);
        assert_eq!(body["start"], "2024-06-10T12:00:00Z");
    }

    #[tokio::test]
    async fn throttled_create_is_rate_limited_error() {
        let transport = MockTransport::new();
        let client = connected(&transport).await;
        transport.push_response(
            HttpMethod::Post,
            client.create_url(),
            HttpResponse::json(429, &serde_json::json!({"message": "Too many requests"})),
        );

        let entry = NewTimeEntry {
            start: Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 6, 10, 12, 30, 0).unwrap(),
            billable: false,
            description: "d".to_string(),
        };
        let err = client.create_entry(&entry).await.expect_err("throttled");
        assert!(err.is_rate_limited());
    }
}
