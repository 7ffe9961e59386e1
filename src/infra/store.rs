use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{
    ProjectSummary, SearchResult, SessionDetail, SessionSource, SessionSummary, UsageDetail,
    UsageSummary,
};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("store returned status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Read-only HTTP client for the session store. Cheap to clone; worker
/// threads each carry their own handle.
#[derive(Clone)]
pub struct SessionStore {
    agent: ureq::Agent,
    base_url: String,
}

impl SessionStore {
    pub fn new(base_url: &str) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build();
        Self {
            agent: config.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn list_sessions(
        &self,
        project: Option<&str>,
        source: SessionSource,
    ) -> Result<Vec<SessionSummary>, StoreError> {
        let url = format!("{}/api/sessions", self.base_url);
        let mut request = self.agent.get(&url).query("source", source.as_query());
        if let Some(project) = project {
            request = request.query("project", project);
        }
        read_json(request.call())
    }

    pub fn session_detail(
        &self,
        id: &str,
        source: SessionSource,
    ) -> Result<SessionDetail, StoreError> {
        let url = format!("{}/api/sessions/{id}", self.base_url);
        let result = self
            .agent
            .get(&url)
            .query("source", source.as_query())
            .call();
        match result {
            Err(ureq::Error::StatusCode(404)) => Err(StoreError::NotFound(id.to_string())),
            other => read_json(other),
        }
    }

    pub fn search(
        &self,
        query: &str,
        source: SessionSource,
    ) -> Result<Vec<SearchResult>, StoreError> {
        let url = format!("{}/api/search", self.base_url);
        read_json(
            self.agent
                .get(&url)
                .query("q", query)
                .query("source", source.as_query())
                .call(),
        )
    }

    pub fn projects(&self, source: SessionSource) -> Result<Vec<ProjectSummary>, StoreError> {
        let url = format!("{}/api/projects", self.base_url);
        read_json(
            self.agent
                .get(&url)
                .query("source", source.as_query())
                .call(),
        )
    }

    pub fn usage_summary(&self, source: SessionSource) -> Result<UsageSummary, StoreError> {
        let url = format!("{}/api/usage/summary", self.base_url);
        read_json(
            self.agent
                .get(&url)
                .query("source", source.as_query())
                .call(),
        )
    }

    pub fn usage_detail(
        &self,
        days: u32,
        source: SessionSource,
    ) -> Result<UsageDetail, StoreError> {
        let url = format!("{}/api/usage/detail", self.base_url);
        read_json(
            self.agent
                .get(&url)
                .query("days", &days.to_string())
                .query("source", source.as_query())
                .call(),
        )
    }

    /// Compacted context for "continue this conversation" copy actions.
    pub fn session_context(&self, id: &str) -> Result<String, StoreError> {
        #[derive(Deserialize)]
        struct ContextResponse {
            context: String,
        }
        let url = format!("{}/api/sessions/{id}/context", self.base_url);
        let response: ContextResponse = read_json(self.agent.get(&url).call())?;
        Ok(response.context)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(
    result: Result<ureq::http::Response<ureq::Body>, ureq::Error>,
) -> Result<T, StoreError> {
    let mut response = result.map_err(|error| match error {
        ureq::Error::StatusCode(code) => StoreError::Status(code),
        other => StoreError::Transport(other.to_string()),
    })?;
    response
        .body_mut()
        .read_json::<T>()
        .map_err(|error| StoreError::Decode(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let store = SessionStore::new("http://localhost:8000/");
        assert_eq!(store.base_url, "http://localhost:8000");
    }
}
