//! Session state and the registration flow.
//!
//! The current session lives in an explicit [`AuthState`] owned by the caller; nothing here is
//! global.

use crate::error::{RemoteError, RemoteResult};
use crate::remote::{AuthProvider, AuthUser, DataStore, Session, UserProfile};

/// The logged-in session, if any.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    session: Option<Session>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// The session, or [`RemoteError::Unauthenticated`].
    pub fn require_session(&self) -> RemoteResult<&Session> {
        self.session.as_ref().ok_or(RemoteError::Unauthenticated)
    }

    /// Log in and keep the session. A failed login leaves the previous state untouched.
    pub async fn login(&mut self, auth: &dyn AuthProvider, email: &str, password: &str) -> RemoteResult<&Session> {
        let session = auth.login(email, password).await?;
        Ok(self.session.insert(session))
    }

    /// Log out. The local session is cleared even if the service call fails; that error is still
    /// returned.
    pub async fn logout(&mut self, auth: &dyn AuthProvider) -> RemoteResult<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        auth.logout(&session).await.inspect_err(|e| {
            tracing::warn!(target: "leave_ingest::auth", error = %e, "remote logout failed; session dropped locally");
        })
    }
}

/// Create an account and its `users` row.
///
/// If the profile insert fails, the session handed out by signup (if any) is logged out again and
/// the insert error is returned.
pub async fn register(
    auth: &dyn AuthProvider,
    store: &dyn DataStore,
    email: &str,
    password: &str,
    full_name: &str,
) -> RemoteResult<AuthUser> {
    let signup = auth.signup(email, password, full_name).await?;
    let user = signup.user;

    let profile = UserProfile {
        uuid: user.id.clone(),
        full_name: full_name.to_string(),
        email: email.to_string(),
    };
    if let Err(e) = store.add_user_details(&profile).await {
        tracing::error!(target: "leave_ingest::auth", error = %e, user = %user.id, "adding user details failed");
        if let Some(session) = signup.session.as_ref() {
            if let Err(logout_err) = auth.logout(session).await {
                tracing::warn!(
                    target: "leave_ingest::auth",
                    error = %logout_err,
                    user = %user.id,
                    "logout after failed signup did not complete"
                );
            }
        }
        return Err(e);
    }

    tracing::info!(target: "leave_ingest::auth", user = %user.id, "signup complete");
    Ok(user)
}

/// Name, email and initials for the user menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUser {
    pub name: String,
    pub email: String,
    pub initials: String,
}

/// Prefer the stored profile, then the signup metadata, then a generic `User`.
pub fn display_user(session: &Session, profile: Option<&UserProfile>) -> DisplayUser {
    let name = profile
        .map(|p| p.full_name.clone())
        .filter(|n| !n.trim().is_empty())
        .or_else(|| session.user.full_name.clone().filter(|n| !n.trim().is_empty()))
        .unwrap_or_else(|| "User".to_string());
    let email = profile
        .map(|p| p.email.clone())
        .filter(|e| !e.is_empty())
        .or_else(|| session.user.email.clone())
        .unwrap_or_default();
    let initials = name
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    DisplayUser { name, email, initials }
}
