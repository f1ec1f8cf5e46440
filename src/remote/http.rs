//! HTTP implementation of the backend capabilities.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::ClientConfig;
use crate::error::{ConfigError, RemoteError, RemoteResult};
use crate::leave::{LeaveApplication, NewLeaveApplication};
use crate::types::{BulkIngestRequest, BulkIngestResponse, ParsedBatch};

use super::{AuthProvider, AuthUser, BulkIngestOperation, DataStore, Session, Signup, UserProfile};

const LEAVE_COLUMNS: &str = "employee_id,employee_name,leave_type,start_date,end_date,status";
const USER_COLUMNS: &str = "uuid,full_name,email";

/// Client for the hosted auth, REST and function endpoints.
///
/// Requests carry the anon key, plus the session's access token once
/// [`HostedClient::with_session`] was used.
#[derive(Clone)]
pub struct HostedClient {
    http: reqwest::Client,
    config: ClientConfig,
    access_token: Option<String>,
}

impl std::fmt::Debug for HostedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedClient")
            .field("base_url", &self.config.base_url)
            .field("authenticated", &self.access_token.is_some())
            .finish()
    }
}

impl HostedClient {
    /// Validate `config` and build the underlying HTTP client.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            config,
            access_token: None,
        })
    }

    /// A client acting as the user of `session`. Shares the connection pool with `self`.
    pub fn with_session(&self, session: &Session) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            access_token: Some(session.access_token.clone()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.config.anon_key);
        self.request_as(method, path, bearer)
    }

    fn request_as(&self, method: Method, path: &str, bearer: &str) -> RequestBuilder {
        let url = self.config.endpoint(path);
        tracing::debug!(target: "leave_ingest::remote", %method, %url, "request");
        self.http
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> RemoteResult<T> {
        let resp = check_status(req.send().await?).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_empty(&self, req: RequestBuilder) -> RemoteResult<()> {
        check_status(req.send().await?).await?;
        Ok(())
    }

    fn function_path(name: &str) -> String {
        format!("/functions/v1/{name}")
    }
}

/// Turn a non-success response into [`RemoteError::Status`] carrying the service's message.
async fn check_status(resp: Response) -> RemoteResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    tracing::warn!(target: "leave_ingest::remote", status = status.as_u16(), %message, "service error");
    Err(RemoteError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Pick the human-readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|k| value.get(*k).and_then(|v| v.as_str()).map(str::to_string))
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<serde_json::Value>,
}

impl From<RawUser> for AuthUser {
    fn from(raw: RawUser) -> Self {
        let full_name = raw
            .user_metadata
            .as_ref()
            .and_then(|m| m.get("full_name"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        AuthUser {
            id: raw.id,
            email: raw.email,
            full_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: RawUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            user: self.user.into(),
        }
    }
}

/// Signup answers either a token response carrying `user`, or the bare user object when email
/// confirmation is pending.
fn parse_signup(value: serde_json::Value) -> RemoteResult<Signup> {
    let wrapped = value.get("user").is_some_and(|u| !u.is_null());
    if wrapped {
        if value.get("access_token").is_some_and(|t| t.is_string()) {
            let token: TokenResponse = serde_json::from_value(value)?;
            let session = token.into_session();
            return Ok(Signup {
                user: session.user.clone(),
                session: Some(session),
            });
        }
        let raw: RawUser = serde_json::from_value(value["user"].clone())?;
        return Ok(Signup {
            user: raw.into(),
            session: None,
        });
    }
    if value.get("id").is_some() {
        let raw: RawUser = serde_json::from_value(value)?;
        return Ok(Signup {
            user: raw.into(),
            session: None,
        });
    }
    Err(RemoteError::MissingData("No user data returned from signup".to_string()))
}

#[async_trait]
impl AuthProvider for HostedClient {
    async fn login(&self, email: &str, password: &str) -> RemoteResult<Session> {
        let req = self
            .request(Method::POST, "/auth/v1/token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let token: TokenResponse = self.send_json(req).await?;
        tracing::info!(target: "leave_ingest::remote", user = %token.user.id, "logged in");
        Ok(token.into_session())
    }

    async fn signup(&self, email: &str, password: &str, full_name: &str) -> RemoteResult<Signup> {
        let req = self.request(Method::POST, "/auth/v1/signup").json(&json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        }));
        let value: serde_json::Value = self.send_json(req).await?;
        parse_signup(value)
    }

    async fn logout(&self, session: &Session) -> RemoteResult<()> {
        let req = self.request_as(Method::POST, "/auth/v1/logout", &session.access_token);
        self.send_empty(req).await
    }
}

#[async_trait]
impl DataStore for HostedClient {
    async fn leave_applications(&self) -> RemoteResult<Vec<LeaveApplication>> {
        let req = self
            .request(Method::GET, "/rest/v1/leave_applications")
            .query(&[("select", LEAVE_COLUMNS)]);
        self.send_json(req).await
    }

    async fn submit_leave_application(
        &self,
        application: &NewLeaveApplication,
    ) -> RemoteResult<serde_json::Value> {
        let path = Self::function_path(&self.config.leave_function);
        let req = self.request(Method::POST, &path).json(application);
        self.send_json(req).await
    }

    async fn add_user_details(&self, profile: &UserProfile) -> RemoteResult<()> {
        let req = self
            .request(Method::POST, "/rest/v1/users")
            .header("Prefer", "return=minimal")
            .json(&[profile]);
        self.send_empty(req).await
    }

    async fn user_profile(&self, uuid: &str) -> RemoteResult<Option<UserProfile>> {
        let filter = format!("eq.{uuid}");
        let req = self
            .request(Method::GET, "/rest/v1/users")
            .query(&[("select", USER_COLUMNS), ("uuid", filter.as_str())]);
        let rows: Vec<UserProfile> = self.send_json(req).await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl BulkIngestOperation for HostedClient {
    async fn ingest(&self, batch: &ParsedBatch) -> RemoteResult<BulkIngestResponse> {
        let path = Self::function_path(&self.config.bulk_ingest_function);
        let req = self
            .request(Method::POST, &path)
            .json(&BulkIngestRequest { csv_data: batch });
        self.send_json(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(error_message(body).as_deref(), Some("Invalid login credentials"));
        assert_eq!(error_message(r#"{"msg":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(error_message("<html>"), None);
    }

    #[test]
    fn signup_accepts_session_wrapped_and_bare_user() {
        let with_session = json!({
            "access_token": "tok",
            "refresh_token": "ref",
            "user": { "id": "u0", "email": "a@b.c" }
        });
        let signup = parse_signup(with_session).unwrap();
        assert_eq!(signup.user.id, "u0");
        assert_eq!(signup.session.unwrap().access_token, "tok");

        let wrapped = json!({ "user": { "id": "u1", "email": "a@b.c", "user_metadata": { "full_name": "Ada L" } } });
        let signup = parse_signup(wrapped).unwrap();
        assert_eq!(signup.user.id, "u1");
        assert_eq!(signup.user.full_name.as_deref(), Some("Ada L"));
        assert!(signup.session.is_none());

        let bare = json!({ "id": "u2", "email": "x@y.z" });
        assert_eq!(parse_signup(bare).unwrap().user.id, "u2");

        let err = parse_signup(json!({ "user": null })).unwrap_err();
        assert!(err.to_string().contains("No user data"));
    }

    #[test]
    fn new_rejects_invalid_config() {
        let err = HostedClient::new(ClientConfig::new("", "k")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
