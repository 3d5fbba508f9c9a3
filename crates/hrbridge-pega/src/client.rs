//! The Pega REST API client.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, warn};

use hrbridge_core::case::CaseClient;
use hrbridge_core::error::BridgeError;

use crate::config::{PegaConfig, PegaCredentials};

/// `CaseClient` implementation against the Pega case REST API
/// (`/cases`, `/cases/{id}`, `/cases/{id}/actions/...`).
#[derive(Debug, Clone)]
pub struct PegaClient {
    http: reqwest::Client,
    config: PegaConfig,
}

impl PegaClient {
    /// Builds a client with the configured timeout and credentials.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Upstream` if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: PegaConfig) -> Result<Self, BridgeError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| BridgeError::Upstream(format!("http client setup: {err}")))?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.credentials {
            PegaCredentials::Anonymous => request,
            PegaCredentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            PegaCredentials::ApiKey(key) => request.bearer_auth(key),
        }
    }

    /// Sends the request and normalizes failures: transport errors and
    /// non-2xx responses become `Upstream`, a 404 on a case path becomes
    /// `CaseNotFound`.
    async fn send(
        &self,
        request: RequestBuilder,
        case_id: Option<&str>,
    ) -> Result<Response, BridgeError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|err| BridgeError::Upstream(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND
            && let Some(case_id) = case_id
        {
            return Err(BridgeError::CaseNotFound(case_id.to_owned()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "case system call failed");
            return Err(BridgeError::Upstream(format!(
                "case system returned {status}: {body}"
            )));
        }
        Ok(response)
    }

    async fn json_body(response: Response) -> Result<Value, BridgeError> {
        response
            .json::<Value>()
            .await
            .map_err(|err| BridgeError::Upstream(format!("malformed case system response: {err}")))
    }
}

#[async_trait]
impl CaseClient for PegaClient {
    async fn create_case(&self, case_type: &str, content: &Value) -> Result<Value, BridgeError> {
        let body = json!({
            "caseTypeID": case_type,
            "content": content,
        });
        let request = self.http.post(self.url("/cases")).json(&body);
        let response = self.send(request, None).await?;
        debug!(case_type, "case created");
        Self::json_body(response).await
    }

    async fn update_case(&self, case_id: &str, content: &Value) -> Result<Value, BridgeError> {
        let request = self
            .http
            .put(self.url(&format!("/cases/{case_id}")))
            .json(content);
        let response = self.send(request, Some(case_id)).await?;
        debug!(case_id, "case updated");
        Self::json_body(response).await
    }

    async fn get_case(&self, case_id: &str) -> Result<Value, BridgeError> {
        let request = self.http.get(self.url(&format!("/cases/{case_id}")));
        let response = self.send(request, Some(case_id)).await?;
        Self::json_body(response).await
    }

    async fn add_case_note(&self, case_id: &str, note: &str) -> Result<(), BridgeError> {
        let body = json!({ "content": note });
        let request = self
            .http
            .post(self.url(&format!("/cases/{case_id}/actions/addNote")))
            .json(&body);
        self.send(request, Some(case_id)).await?;
        debug!(case_id, "note added");
        Ok(())
    }

    async fn execute_case_action(
        &self,
        case_id: &str,
        action_id: &str,
        data: &Value,
    ) -> Result<(), BridgeError> {
        let request = self
            .http
            .post(self.url(&format!("/cases/{case_id}/actions/{action_id}")))
            .json(data);
        self.send(request, Some(case_id)).await?;
        debug!(case_id, action_id, "case action executed");
        Ok(())
    }
}
