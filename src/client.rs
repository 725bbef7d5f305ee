//! Client handle for the v2 admin and write APIs.

use crate::api::{
    Authorization, AuthorizationList, CreateAuthorizationRequest, OrgList, Permission,
    SetupRequest, SetupStatus,
};
use crate::config::TOKEN_DESCRIPTION;
use crate::error::{Operation, Result, TelemetryError};
use crate::write::PointWriter;
use reqwest::{header, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Liveness probes are the only calls with a deadline.
pub const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how to connect.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Server URL (e.g., "http://localhost:8086")
    pub url: String,
    /// API token; when set, requests authenticate with
    /// `Authorization: Token <t>` instead of a session cookie.
    pub token: Option<String>,
}

impl Connection {
    /// Connection to the given URL without a token.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
        }
    }

    /// Use an API token for every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl From<&str> for Connection {
    fn from(url: &str) -> Self {
        Connection::new(url)
    }
}

impl From<String> for Connection {
    fn from(url: String) -> Self {
        Connection::new(url)
    }
}

/// What [`Client::setup`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Onboarding ran and created the initial user, org, and bucket.
    Completed,
    /// The server was already onboarded; nothing was posted.
    AlreadySetUp,
}

/// Handle over one server connection.
///
/// Owns the HTTP client, the base URL, the optional API token, and the
/// session cookie store that [`signin`](Client::signin) populates. Cloning
/// is cheap and shares the session; independent sessions need independent
/// [`connect`](Client::connect) calls.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl Client {
    /// Connect and verify the server is reachable.
    ///
    /// Accepts a bare URL or a [`Connection`] carrying an API token. The
    /// liveness probe runs under [`PING_TIMEOUT`]; an unreachable server is
    /// an error the caller can inspect, not a panic.
    pub async fn connect(cxn: impl Into<Connection>) -> Result<Self> {
        let cxn = cxn.into();
        let http = reqwest::Client::builder().cookie_store(true).build()?;

        let mut base_url = cxn.url;
        // Remove trailing slash
        if base_url.ends_with('/') {
            base_url.pop();
        }

        let client = Self {
            http,
            base_url,
            token: cxn.token,
        };
        client.ping().await?;
        info!(url = %client.base_url, "connected");
        Ok(client)
    }

    /// Probe `GET /ping` under the fixed timeout.
    pub async fn ping(&self) -> Result<()> {
        let url = format!("{}/ping", self.base_url);
        let response = self.http.get(&url).timeout(PING_TIMEOUT).send().await?;
        if !response.status().is_success() {
            return Err(api_error(Operation::Ping, response).await);
        }
        Ok(())
    }

    /// Report whether first-run onboarding is still available.
    pub async fn is_onboarding_allowed(&self) -> Result<bool> {
        let url = format!("{}/api/v2/setup", self.base_url);
        let response = self.add_auth_header(self.http.get(&url)).send().await?;
        if !response.status().is_success() {
            return Err(api_error(Operation::SetupStatus, response).await);
        }
        let status: SetupStatus = decode(response).await?;
        Ok(status.allowed)
    }

    /// Run first-run onboarding if the server still allows it.
    ///
    /// Safe to call on every start: once the server is set up, the call
    /// reports [`SetupOutcome::AlreadySetUp`] without posting anything, so
    /// two consecutive calls never error.
    pub async fn setup(&self, request: &SetupRequest) -> Result<SetupOutcome> {
        if !self.is_onboarding_allowed().await? {
            info!("server already set up");
            return Ok(SetupOutcome::AlreadySetUp);
        }

        let url = format!("{}/api/v2/setup", self.base_url);
        let response = self
            .add_auth_header(self.http.post(&url))
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(Operation::Setup, response).await);
        }
        info!(org = %request.org, bucket = %request.bucket, "setup completed");
        Ok(SetupOutcome::Completed)
    }

    /// Sign in with username and password.
    ///
    /// The server's session cookie lands in the handle's cookie store and
    /// rides along on every later call through this handle.
    pub async fn signin(&self, username: &str, password: &str) -> Result<()> {
        let url = format!("{}/api/v2/signin", self.base_url);
        let response = self
            .http
            .post(&url)
            .basic_auth(username, Some(password))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(Operation::Signin, response).await);
        }
        debug!(username, "signed in");
        Ok(())
    }

    /// End the cookie session server-side.
    pub async fn signout(&self) -> Result<()> {
        let url = format!("{}/api/v2/signout", self.base_url);
        let response = self.http.post(&url).send().await?;
        if !response.status().is_success() {
            return Err(api_error(Operation::Signout, response).await);
        }
        info!("signed out");
        Ok(())
    }

    /// Provision a fresh API token with read/write access to the
    /// organization's buckets, and return it.
    ///
    /// Signs in, then replaces any previous token carrying
    /// [`TOKEN_DESCRIPTION`]: the stale authorization is deleted before the
    /// new one is created, so at most one such token exists per
    /// organization afterwards.
    pub async fn authenticate(&self, username: &str, password: &str, org: &str) -> Result<String> {
        self.signin(username, password).await?;

        let stale = self
            .list_authorizations()
            .await?
            .into_iter()
            .find(|auth| auth.description == TOKEN_DESCRIPTION);

        let org_id = self.org_id(org).await?;

        if let Some(stale) = stale {
            self.delete_authorization(&stale.id).await?;
        }

        let body = CreateAuthorizationRequest {
            org_id: org_id.clone(),
            description: TOKEN_DESCRIPTION.to_string(),
            permissions: Permission::bucket_read_write(&org_id),
        };
        let url = format!("{}/api/v2/authorizations", self.base_url);
        let response = self
            .add_auth_header(self.http.post(&url))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(Operation::CreateAuthorization, response).await);
        }
        let created: Authorization = decode(response).await?;
        info!(org, "api token provisioned");
        Ok(created.token)
    }

    /// Resolve an organization name to its ID.
    pub async fn org_id(&self, org: &str) -> Result<String> {
        let url = format!("{}/api/v2/orgs", self.base_url);
        let response = self
            .add_auth_header(self.http.get(&url))
            .query(&[("org", org)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(Operation::OrgLookup, response).await);
        }
        let list: OrgList = decode(response).await?;
        match list.orgs.into_iter().next() {
            Some(found) => Ok(found.id),
            None => Err(TelemetryError::OrgNotFound(org.to_string())),
        }
    }

    /// Build a buffered write handle for one org/bucket pair.
    pub fn writer(&self, org: &str, bucket: &str) -> PointWriter {
        PointWriter::new(self.clone(), org, bucket)
    }

    async fn list_authorizations(&self) -> Result<Vec<Authorization>> {
        let url = format!("{}/api/v2/authorizations", self.base_url);
        let response = self.add_auth_header(self.http.get(&url)).send().await?;
        if !response.status().is_success() {
            return Err(api_error(Operation::ListAuthorizations, response).await);
        }
        let list: AuthorizationList = decode(response).await?;
        Ok(list.authorizations)
    }

    async fn delete_authorization(&self, id: &str) -> Result<()> {
        let url = format!("{}/api/v2/authorizations/{}", self.base_url, id);
        let response = self.add_auth_header(self.http.delete(&url)).send().await?;
        if !response.status().is_success() {
            return Err(api_error(Operation::DeleteAuthorization, response).await);
        }
        debug!(id, "stale authorization deleted");
        Ok(())
    }

    /// Post a line-protocol body with nanosecond precision.
    pub(crate) async fn write_lines(&self, org: &str, bucket: &str, body: String) -> Result<()> {
        let url = format!("{}/api/v2/write", self.base_url);
        let response = self
            .add_auth_header(self.http.post(&url))
            .query(&[("org", org), ("bucket", bucket), ("precision", "ns")])
            .header(header::CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(Operation::Write, response).await);
        }
        Ok(())
    }

    fn add_auth_header(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(header::AUTHORIZATION, format!("Token {}", token)),
            None => request,
        }
    }
}

async fn api_error(operation: Operation, response: Response) -> TelemetryError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    warn!(%operation, status, "request failed");
    TelemetryError::Api {
        operation,
        status,
        message,
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_from_url() {
        let cxn: Connection = "http://localhost:8086".into();
        assert_eq!(cxn.url, "http://localhost:8086");
        assert!(cxn.token.is_none());
    }

    #[test]
    fn test_connection_with_token() {
        let cxn = Connection::new("http://localhost:8086").with_token("secret");
        assert_eq!(cxn.token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_ping_timeout_is_ten_seconds() {
        assert_eq!(PING_TIMEOUT, Duration::from_secs(10));
    }
}
