use crate::error::ApiError;
use crate::models::complaint::DashboardEnvelope;
use crate::models::config::ApiConfig;
use crate::models::reset::{ResetCodeRequest, ResetCodeResponse};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

pub const RESET_PASSWORD_CODE_PATH: &str = "reset_password_code";
pub const ADMIN_DASHBOARD_PATH: &str = "admin/dashboard";

/// The two calls the portal makes against the complaint API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComplaintApi: Send + Sync {
    async fn request_reset_code(&self, email: &str) -> Result<ResetCodeResponse, ApiError>;

    async fn fetch_dashboard(&self, token: Option<String>) -> Result<DashboardEnvelope, ApiError>;
}

pub struct HttpComplaintApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpComplaintApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: parse_base_url(&config.base_url)?,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Endpoint(format!("{path}: {e}")))
    }

    /// Bodies are decoded whatever the status code; the API reports
    /// failures inside the JSON envelope.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "complaint api responded");
        Ok(serde_json::from_str(&body)?)
    }
}

/// A base without a trailing slash would make `Url::join` drop its last
/// path segment.
fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| ApiError::Endpoint(format!("{raw}: {e}")))
}

#[async_trait]
impl ComplaintApi for HttpComplaintApi {
    async fn request_reset_code(&self, email: &str) -> Result<ResetCodeResponse, ApiError> {
        let url = self.endpoint(RESET_PASSWORD_CODE_PATH)?;
        let response = self
            .client
            .post(url)
            .json(&ResetCodeRequest { email })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn fetch_dashboard(&self, token: Option<String>) -> Result<DashboardEnvelope, ApiError> {
        let url = self.endpoint(ADMIN_DASHBOARD_PATH)?;
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        Self::decode(request.send().await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    fn client_for(base_url: String) -> HttpComplaintApi {
        HttpComplaintApi::new(&ApiConfig {
            base_url,
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn endpoint_keeps_the_base_path() {
        let api = client_for("http://api.example.edu/v1".to_string());

        assert_eq!(
            api.endpoint(RESET_PASSWORD_CODE_PATH).unwrap().as_str(),
            "http://api.example.edu/v1/reset_password_code"
        );
        assert_eq!(
            api.endpoint("/admin/dashboard").unwrap().as_str(),
            "http://api.example.edu/v1/admin/dashboard"
        );
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let result = HttpComplaintApi::new(&ApiConfig {
            base_url: "not a url".to_string(),
            ..ApiConfig::default()
        });

        assert!(matches!(result, Err(ApiError::Endpoint(_))));
    }

    #[tokio::test]
    async fn reset_code_posts_the_email_as_json() {
        let router = Router::new().route(
            "/api/reset_password_code",
            post(|Json(body): Json<Value>| async move {
                let email = body["email"].as_str().unwrap_or_default().to_string();
                Json(json!({ "success": true, "message": format!("Code sent to {email}") }))
            }),
        );
        let api = client_for(spawn_stub(router).await);

        let response = api.request_reset_code("ada@uni.edu").await.unwrap();

        assert!(response.success);
        assert_eq!(response.message, "Code sent to ada@uni.edu");
    }

    #[tokio::test]
    async fn error_status_bodies_are_still_decoded() {
        let router = Router::new().route(
            "/api/reset_password_code",
            post(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "success": false, "message": "Email not found" })),
                )
            }),
        );
        let api = client_for(spawn_stub(router).await);

        let response = api.request_reset_code("nobody@uni.edu").await.unwrap();

        assert!(!response.success);
        assert_eq!(response.message, "Email not found");
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let router = Router::new().route(
            "/api/reset_password_code",
            post(|| async { "<html>gateway timeout</html>" }),
        );
        let api = client_for(spawn_stub(router).await);

        let result = api.request_reset_code("ada@uni.edu").await;

        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn dashboard_sends_the_bearer_token() {
        let router = Router::new().route(
            "/api/admin/dashboard",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("missing")
                    .to_string();
                Json(json!({ "status": false, "message": auth }))
            }),
        );
        let api = client_for(spawn_stub(router).await);

        let with_token = api.fetch_dashboard(Some("abc123".to_string())).await.unwrap();
        let without_token = api.fetch_dashboard(None).await.unwrap();

        assert_eq!(with_token.message.as_deref(), Some("Bearer abc123"));
        assert_eq!(without_token.message.as_deref(), Some("missing"));
    }

    #[tokio::test]
    async fn unreachable_api_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let api = client_for(format!("http://{addr}/api"));

        let result = api.fetch_dashboard(None).await;

        assert!(matches!(result, Err(ApiError::Transport(_))));
    }
}
