use std::fs;
use std::path::Path;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;
use tracing::debug;

use crate::constants::hub::{
    CONNECT_TIMEOUT_MS, DEFAULT_REVISION, REPO_TYPE, REQUEST_TIMEOUT_MS,
};
use crate::errors::PublishError;

/// Destination seam for finalized shards.
///
/// The pipeline depends only on this trait so tests can substitute a
/// scripted hub and no network is needed outside the real client.
pub trait DatasetHub {
    /// Create the dataset repository when missing; an existing repo succeeds.
    fn ensure_repo(&self, repo_id: &str, private: bool) -> Result<(), PublishError>;
    /// Upload one local file to `path_in_repo` as a single commit.
    fn upload_file(
        &self,
        repo_id: &str,
        local_path: &Path,
        path_in_repo: &str,
        commit_message: &str,
    ) -> Result<(), PublishError>;
}

/// Blocking HTTP client for the dataset hub API.
pub struct HubClient {
    endpoint: String,
    token: Option<String>,
    agent: ureq::Agent,
}

impl HubClient {
    /// Create a client for `endpoint` authenticating with `token` when set.
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(CONNECT_TIMEOUT_MS))
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build();
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token,
            agent,
        }
    }

    fn authorization(&self) -> Result<String, PublishError> {
        let token = self.token.as_deref().ok_or_else(|| {
            PublishError::Configuration(format!(
                "no hub token available; set {}",
                crate::constants::hub::TOKEN_ENV
            ))
        })?;
        Ok(format!("Bearer {token}"))
    }
}

impl DatasetHub for HubClient {
    fn ensure_repo(&self, repo_id: &str, private: bool) -> Result<(), PublishError> {
        let url = format!("{}/api/repos/create", self.endpoint);
        // The create endpoint takes the namespace separately from the repo name.
        let payload = match repo_id.split_once('/') {
            Some((owner, name)) => json!({
                "name": name,
                "organization": owner,
                "type": REPO_TYPE,
                "private": private,
            }),
            None => json!({
                "name": repo_id,
                "type": REPO_TYPE,
                "private": private,
            }),
        };
        let response = self
            .agent
            .post(&url)
            .set("Authorization", &self.authorization()?)
            .send_json(payload);
        match response {
            Ok(_) => {
                debug!(repo_id, private, "dataset repo created");
                Ok(())
            }
            // Re-running against an existing repo is the common case.
            Err(ureq::Error::Status(409, _)) => {
                debug!(repo_id, "dataset repo already exists");
                Ok(())
            }
            Err(ureq::Error::Status(code, resp)) => Err(PublishError::Hub(format!(
                "repo create for '{repo_id}' failed with status {code}: {}",
                resp.into_string().unwrap_or_default()
            ))),
            Err(err) => Err(PublishError::Hub(format!(
                "repo create request for '{repo_id}' failed: {err}"
            ))),
        }
    }

    fn upload_file(
        &self,
        repo_id: &str,
        local_path: &Path,
        path_in_repo: &str,
        commit_message: &str,
    ) -> Result<(), PublishError> {
        let bytes = fs::read(local_path)?;
        let header_line = json!({
            "key": "header",
            "value": {"summary": commit_message, "description": ""},
        });
        let file_line = json!({
            "key": "file",
            "value": {
                "path": path_in_repo,
                "content": BASE64.encode(&bytes),
                "encoding": "base64",
            },
        });
        let body = format!("{header_line}\n{file_line}\n");

        let url = format!(
            "{}/api/{REPO_TYPE}s/{repo_id}/commit/{DEFAULT_REVISION}",
            self.endpoint
        );
        let response = self
            .agent
            .post(&url)
            .set("Authorization", &self.authorization()?)
            .set("Content-Type", "application/x-ndjson")
            .send_string(&body);
        match response {
            Ok(_) => {
                debug!(repo_id, path_in_repo, bytes = bytes.len(), "file committed");
                Ok(())
            }
            Err(ureq::Error::Status(code, resp)) => Err(PublishError::Hub(format!(
                "commit of '{path_in_repo}' to '{repo_id}' failed with status {code}: {}",
                resp.into_string().unwrap_or_default()
            ))),
            Err(err) => Err(PublishError::Hub(format!(
                "commit request for '{path_in_repo}' to '{repo_id}' failed: {err}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_is_a_configuration_error() {
        let client = HubClient::new("https://hub.invalid", None);
        let result = client.authorization();
        assert!(matches!(result, Err(PublishError::Configuration(_))));
    }

    #[test]
    fn endpoint_trailing_slash_is_normalized() {
        let client = HubClient::new("https://hub.invalid/", Some("tok".to_string()));
        assert_eq!(client.endpoint, "https://hub.invalid");
        assert_eq!(client.authorization().expect("token set"), "Bearer tok");
    }
}
