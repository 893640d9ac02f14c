//! Deployment of a rendered report to Vercel.
//!
//! A deployment is the dashboard template plus the report's data module,
//! posted to the v13 deployments API as a single production build.

pub mod template;

use crate::config::ServiceConfig;
use crate::retry::{retry_once, with_timeout, UpstreamError, DEFAULT_RETRY_DELAY};
use crate::theme::ReportTheme;
use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use template::DeployFile;
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_API_URL: &str = "https://api.vercel.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_HANDLE_LEN: usize = 50;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("failed to read template file {path:?}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Make a creator handle safe for use in a project name.
///
/// Strips one leading `@`, replaces anything outside `[A-Za-z0-9_-]` with
/// `-`, lowercases, and keeps the first 50 characters.
pub fn sanitize_handle(handle: &str) -> String {
    handle
        .strip_prefix('@')
        .unwrap_or(handle)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .take(MAX_HANDLE_LEN)
        .collect()
}

/// `celebfood-report-<handle>` or `celebeauty-report-<handle>`.
pub fn project_name(theme: ReportTheme, handle: &str) -> String {
    format!("{}-{}", theme.project_prefix(), sanitize_handle(handle))
}

/// A finished deployment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub project_name: String,
    pub deployment_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentRequest<'a> {
    name: &'a str,
    files: &'a [DeployFile],
    project_settings: ProjectSettings,
    target: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectSettings {
    framework: &'static str,
    build_command: &'static str,
    output_directory: &'static str,
    install_command: &'static str,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            framework: "vite",
            build_command: "npm run build",
            output_directory: "dist",
            install_command: "npm install",
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeploymentResponse {
    #[serde(default)]
    url: Option<String>,
}

/// Vercel deployments API client.
#[derive(Clone)]
pub struct VercelClient {
    client: Client,
    api_url: String,
    token: String,
    team_id: Option<String>,
    timeout: Duration,
    retry_delay: Duration,
}

impl VercelClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            team_id: None,
            timeout: DEFAULT_TIMEOUT,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Build a client from service settings. Fails when no deploy token is set.
    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        let token = config
            .vercel_token
            .clone()
            .context("VERCEL_DEPLOY_TOKEN environment variable not set")?;

        Ok(Self::new(token)
            .with_api_url(&config.vercel_api_url)
            .with_team_id(config.vercel_team_id.clone())
            .with_timeout(config.deploy_timeout())
            .with_retry_delay(config.retry_delay()))
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_team_id(mut self, team_id: Option<String>) -> Self {
        self.team_id = team_id;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Create a production deployment of `files` under `project_name`.
    pub async fn deploy(&self, project_name: &str, files: &[DeployFile]) -> Result<Deployment, DeployError> {
        info!("Deploying {} ({} files)", project_name, files.len());

        let request = DeploymentRequest {
            name: project_name,
            files,
            project_settings: ProjectSettings::default(),
            target: "production",
        };

        let client = self;
        let request = &request;
        let response = retry_once(self.retry_delay, move || {
            with_timeout(client.timeout, client.send(request))
        })
        .await?;

        let deployment_url = response.url.map(|url| format!("https://{url}"));
        info!("Deployment created: {:?}", deployment_url);

        Ok(Deployment {
            project_name: project_name.to_string(),
            deployment_url,
        })
    }

    async fn send(&self, request: &DeploymentRequest<'_>) -> Result<DeploymentResponse, UpstreamError> {
        let mut builder = self
            .client
            .post(format!("{}/v13/deployments", self.api_url))
            .header("Authorization", format!("Bearer {}", self.token))
            .json(request);
        if let Some(team_id) = &self.team_id {
            builder = builder.query(&[("teamId", team_id)]);
        }

        debug!("Posting deployment {}", request.name);
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: error_message(&body),
            });
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

/// Pull the human-readable message out of a Vercel error body.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
        })
        .map(str::to_string)
        .unwrap_or_else(|| "Vercel API error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> VercelClient {
        VercelClient::new("vercel-test")
            .with_api_url(&server.uri())
            .with_timeout(Duration::from_secs(5))
            .with_retry_delay(Duration::ZERO)
    }

    fn files() -> Vec<DeployFile> {
        vec![DeployFile {
            file: "src/data.ts".to_string(),
            data: "export const reportData = {};".to_string(),
        }]
    }

    #[test]
    fn test_sanitize_handle() {
        assert_eq!(sanitize_handle("@Chef.Kim"), "chef-kim");
        assert_eq!(sanitize_handle("food_lover-01"), "food_lover-01");
        assert_eq!(sanitize_handle("@@double"), "-double");
        assert_eq!(sanitize_handle("김셰프"), "---");
        assert_eq!(sanitize_handle(&"a".repeat(80)).len(), 50);
    }

    #[test]
    fn test_project_name_prefix() {
        assert_eq!(project_name(ReportTheme::Beauty, "@glow"), "celebeauty-report-glow");
        assert_eq!(project_name(ReportTheme::Food, "@chef"), "celebfood-report-chef");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"error": {"message": "forbidden"}}"#), "forbidden");
        assert_eq!(error_message(r#"{"message": "rate limited"}"#), "rate limited");
        assert_eq!(error_message("<html>"), "Vercel API error");
    }

    #[tokio::test]
    async fn test_deploy_posts_production_build() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v13/deployments"))
            .and(header("Authorization", "Bearer vercel-test"))
            .and(query_param("teamId", "team_1"))
            .and(body_partial_json(json!({
                "name": "celebfood-report-chef",
                "target": "production",
                "projectSettings": {
                    "framework": "vite",
                    "buildCommand": "npm run build",
                    "outputDirectory": "dist",
                    "installCommand": "npm install"
                },
                "files": [{"file": "src/data.ts"}]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"url": "celebfood-report-chef.vercel.app"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let deployment = test_client(&server)
            .with_team_id(Some("team_1".to_string()))
            .deploy("celebfood-report-chef", &files())
            .await
            .unwrap();
        assert_eq!(
            deployment,
            Deployment {
                project_name: "celebfood-report-chef".to_string(),
                deployment_url: Some("https://celebfood-report-chef.vercel.app".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_url_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v13/deployments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "dpl_1"})))
            .mount(&server)
            .await;

        let deployment = test_client(&server).deploy("p", &files()).await.unwrap();
        assert_eq!(deployment.deployment_url, None);
    }

    #[tokio::test]
    async fn test_client_error_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v13/deployments"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"error": {"message": "Not authorized"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server).deploy("p", &files()).await.unwrap_err();
        match err {
            DeployError::Upstream(UpstreamError::Status { status, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "Not authorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v13/deployments"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .expect(2)
            .mount(&server)
            .await;

        let err = test_client(&server).deploy("p", &files()).await.unwrap_err();
        assert!(matches!(
            err,
            DeployError::Upstream(UpstreamError::Status { status: 500, .. })
        ));
    }
}
