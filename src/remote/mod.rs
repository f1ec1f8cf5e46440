//! Capabilities of the hosted backend.
//!
//! The pipeline and views only see these traits; [`HostedClient`] implements all three against
//! the hosted REST/function endpoints, and tests substitute in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RemoteResult;
use crate::leave::{LeaveApplication, NewLeaveApplication};
use crate::types::{BulkIngestResponse, ParsedBatch};

pub mod http;

pub use http::HostedClient;

/// The authenticated user as reported by the auth service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// `user_metadata.full_name` given at signup.
    #[serde(default)]
    pub full_name: Option<String>,
}

/// A logged-in session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token_set", &self.refresh_token.is_some())
            .field("user", &self.user)
            .finish()
    }
}

/// Result of a signup: the new user, and a session when the service logs the user straight in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signup {
    pub user: AuthUser,
    pub session: Option<Session>,
}

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uuid: String,
    pub full_name: String,
    pub email: String,
}

/// Login, signup and logout.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Password login.
    async fn login(&self, email: &str, password: &str) -> RemoteResult<Session>;

    /// Register a new account; `full_name` is stored in the user metadata.
    async fn signup(&self, email: &str, password: &str, full_name: &str) -> RemoteResult<Signup>;

    /// End `session` on the server.
    async fn logout(&self, session: &Session) -> RemoteResult<()>;
}

/// Table reads/writes and the single-application function.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn leave_applications(&self) -> RemoteResult<Vec<LeaveApplication>>;

    /// Invoke the leave-application function; the service's JSON answer is returned as is.
    async fn submit_leave_application(&self, application: &NewLeaveApplication)
    -> RemoteResult<serde_json::Value>;

    async fn add_user_details(&self, profile: &UserProfile) -> RemoteResult<()>;

    async fn user_profile(&self, uuid: &str) -> RemoteResult<Option<UserProfile>>;
}

/// The remote bulk-ingestion operation. Deduplication and validation happen on the service side.
#[async_trait]
pub trait BulkIngestOperation: Send + Sync {
    /// Send the whole batch in one call.
    async fn ingest(&self, batch: &ParsedBatch) -> RemoteResult<BulkIngestResponse>;
}
