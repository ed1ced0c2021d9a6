use async_trait::async_trait;
use reqwest::{header, redirect, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::backend::Backend;
use crate::error::{Error, Result};
use crate::models::{Repository, Team, UserProfile, UserStats};

/// Name of the backend's session cookie.
const SESSION_COOKIE: &str = "session";

pub struct ApiClient {
    pub(crate) client: Client,
    /// Same headers, but redirects are returned instead of followed.
    pub(crate) no_redirect: Client,
    pub(crate) base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, session_cookie: Option<&str>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("repo-analyser/0.1"),
        );
        if let Some(cookie) = session_cookie {
            headers.insert(
                header::COOKIE,
                header::HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, cookie))?,
            );
        }

        let client = Client::builder().default_headers(headers.clone()).build()?;
        let no_redirect = Client::builder()
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            no_redirect,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Where the browser must go to start the GitHub OAuth flow.
    pub fn login_url(&self) -> String {
        format!("{}/github/login", self.base_url)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request and turns any non-success status into [`Error::Http`].
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Backend call failed: {} - {}", status, body);
            return Err(Error::Http { status, body });
        }
        Ok(response)
    }

    /// Like [`ApiClient::send`], but only an exact `200 OK` counts as success.
    pub(crate) async fn send_expect_ok(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.send(request).await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Http { status, body });
        }
        Ok(response)
    }

    pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| Error::Decode(e.to_string()))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);
        let response = self.send(self.client.get(&url)).await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn check_session(&self) -> Result<Option<UserProfile>> {
        ApiClient::check_session(self).await
    }

    async fn user_stats(&self) -> Result<UserStats> {
        ApiClient::user_stats(self).await
    }

    async fn trigger_analysis(&self) -> Result<()> {
        ApiClient::trigger_analysis(self).await
    }

    async fn analysis_progress(&self) -> Result<f64> {
        ApiClient::analysis_progress(self).await
    }

    async fn account_repositories(&self) -> Result<Vec<Repository>> {
        ApiClient::account_repositories(self).await
    }

    async fn set_repositories(&self, ids: &[u64]) -> Result<()> {
        ApiClient::set_repositories(self, ids).await
    }

    async fn reset_repositories(&self) -> Result<()> {
        ApiClient::reset_repositories(self).await
    }

    async fn user_completed(&self) -> Result<bool> {
        ApiClient::user_completed(self).await
    }

    async fn logout(&self) -> Result<()> {
        ApiClient::logout(self).await
    }

    async fn list_teams(&self) -> Result<Vec<String>> {
        ApiClient::list_teams(self).await
    }

    async fn team_info(&self, team_name: &str) -> Result<Team> {
        ApiClient::team_info(self, team_name).await
    }

    async fn create_team(&self, team_name: &str, members: &[String]) -> Result<()> {
        ApiClient::create_team(self, team_name, members).await
    }

    async fn trigger_team_analysis(&self, team_name: &str) -> Result<()> {
        ApiClient::trigger_team_analysis(self, team_name).await
    }

    async fn delete_team(&self, team_name: &str) -> Result<()> {
        ApiClient::delete_team(self, team_name).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn test_client_urls() {
        let client = ApiClient::new("http://localhost:8000/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.login_url(), "http://localhost:8000/github/login");
    }

    #[tokio::test]
    async fn test_session_cookie_is_attached() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        let client = ApiClient::new(&mock_server.uri(), Some("abc123"))?;

        Mock::given(method("GET"))
            .and(path("/users/status"))
            .and(header("cookie", "session=abc123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "Completed"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        assert!(client.user_completed().await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_error_kinds_are_distinguished() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        let client = ApiClient::new(&mock_server.uri(), None)?;

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(serde_json::json!({"detail": "Not logged in"})),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let err = client.user_stats().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.to_string().contains("Not logged in"));

        let err = client.analysis_progress().await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));

        // Nothing listens on port 9 locally.
        let offline = ApiClient::new("http://127.0.0.1:9", None)?;
        let err = offline.user_completed().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(err.is_retryable());

        Ok(())
    }
}
