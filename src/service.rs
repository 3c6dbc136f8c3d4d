//! Request/response boundary to the remote recognition service.
//!
//! Every interaction with the service goes through [`GestureService`], so the
//! session controller can be driven against an in-process double in tests.
//! [`HttpGestureService`] is the production implementation, speaking JSON over
//! HTTP to the service's `/api/v1` endpoints.

use std::future::Future;
use std::time::Duration;

use log::debug;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::{SessionState, Template, VisualizerFrame};

/// Logical operations the remote service must provide.
///
/// All calls are request/response round trips; the service may clamp a
/// transition request, so the returned state - not the requested one - is
/// authoritative.
pub trait GestureService: Send + Sync + 'static {
    /// Fetch the current session state (initial load).
    fn session_state(&self) -> impl Future<Output = Result<SessionState>> + Send;

    /// Request a transition to `target`; returns the confirmed state.
    fn request_transition(
        &self,
        target: SessionState,
    ) -> impl Future<Output = Result<SessionState>> + Send;

    /// Fetch one frame of live model and detection data.
    fn visualizer_frame(&self) -> impl Future<Output = Result<VisualizerFrame>> + Send;

    /// List all stored templates.
    fn list_templates(&self) -> impl Future<Output = Result<Vec<Template>>> + Send;

    /// Create a template from the save candidate's `start..end` point range.
    fn create_template(
        &self,
        name: &str,
        start: usize,
        end: usize,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a template by id.
    fn delete_template(&self, id: u32) -> impl Future<Output = Result<()>> + Send;

    /// Bulk-populate the built-in template set.
    fn add_builtin_templates(&self) -> impl Future<Output = Result<()>> + Send;
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct StateResponse {
    state: SessionState,
}

#[derive(Debug, Deserialize)]
struct TemplatesResponse {
    templates: Vec<Template>,
}

#[derive(Debug, Serialize)]
struct CreateTemplateRequest<'a> {
    name: &'a str,
    start: usize,
    end: usize,
}

// ============================================================================
// HTTP Implementation
// ============================================================================

/// HTTP implementation of [`GestureService`].
#[derive(Debug, Clone)]
pub struct HttpGestureService {
    client: Client,
    base_url: String,
}

impl HttpGestureService {
    /// Create a client against `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    /// Map a non-success response to a transport error.
    fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::status(
                format!("service answered {}", status),
                status.as_u16(),
            ));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Ok(Self::check(response)?.json().await?)
    }
}

impl GestureService for HttpGestureService {
    async fn session_state(&self) -> Result<SessionState> {
        let response: StateResponse = self.get_json("session").await?;
        debug!("[HttpGestureService] current state: {}", response.state);
        Ok(response.state)
    }

    async fn request_transition(&self, target: SessionState) -> Result<SessionState> {
        let response = self
            .client
            .post(self.url(&format!("session/{}", target)))
            .send()
            .await?;
        let confirmed: StateResponse = Self::check(response)?.json().await?;
        debug!(
            "[HttpGestureService] requested {}, confirmed {}",
            target, confirmed.state
        );
        Ok(confirmed.state)
    }

    async fn visualizer_frame(&self) -> Result<VisualizerFrame> {
        self.get_json("visualizer").await
    }

    async fn list_templates(&self) -> Result<Vec<Template>> {
        let response: TemplatesResponse = self.get_json("templates").await?;
        Ok(response.templates)
    }

    async fn create_template(&self, name: &str, start: usize, end: usize) -> Result<()> {
        let response = self
            .client
            .post(self.url("templates"))
            .json(&CreateTemplateRequest { name, start, end })
            .send()
            .await?;
        Self::check(response)?;
        debug!(
            "[HttpGestureService] created template '{}' from {}..{}",
            name, start, end
        );
        Ok(())
    }

    async fn delete_template(&self, id: u32) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("templates/{}", id)))
            .send()
            .await?;
        Self::check(response)?;
        debug!("[HttpGestureService] deleted template {}", id);
        Ok(())
    }

    async fn add_builtin_templates(&self) -> Result<()> {
        let response = self
            .client
            .post(self.url("templates/builtin"))
            .send()
            .await?;
        Self::check(response)?;
        Ok(())
    }
}
