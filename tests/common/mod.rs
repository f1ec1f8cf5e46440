#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use leave_ingest::ingestion::{ParseStats, UploadContext, UploadObserver, UploadSeverity};
use leave_ingest::leave::{LeaveApplication, NewLeaveApplication};
use leave_ingest::remote::{AuthProvider, AuthUser, BulkIngestOperation, DataStore, Session, Signup, UserProfile};
use leave_ingest::types::{BulkIngestResponse, ParsedBatch, UploadSummary};
use leave_ingest::{RemoteError, RemoteResult, UploadError};

pub fn fixture(name: &str) -> String {
    format!("tests/fixtures/{name}")
}

pub fn status_error(status: u16, message: &str) -> RemoteError {
    RemoteError::Status {
        status,
        message: message.to_string(),
    }
}

/// Bulk ingestion that records every batch and answers from a script.
#[derive(Default)]
pub struct FakeBulkIngest {
    pub calls: Mutex<Vec<ParsedBatch>>,
    /// Answers in call order; once exhausted, every call fails with a 500.
    pub answers: Mutex<Vec<RemoteResult<BulkIngestResponse>>>,
}

impl FakeBulkIngest {
    pub fn answering(answers: Vec<RemoteResult<BulkIngestResponse>>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            answers: Mutex::new(answers),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BulkIngestOperation for FakeBulkIngest {
    async fn ingest(&self, batch: &ParsedBatch) -> RemoteResult<BulkIngestResponse> {
        self.calls.lock().unwrap().push(batch.clone());
        let mut answers = self.answers.lock().unwrap();
        if answers.is_empty() {
            return Err(status_error(500, "no scripted answer"));
        }
        answers.remove(0)
    }
}

pub fn response(total: u64, inserted: u64, duplicates: u64, errors: u64) -> BulkIngestResponse {
    BulkIngestResponse {
        summary: UploadSummary {
            total,
            inserted,
            duplicates,
            errors,
        },
        details: Default::default(),
    }
}

/// Auth service with one known account.
#[derive(Default)]
pub struct FakeAuth {
    pub logouts: Mutex<Vec<String>>,
    pub fail_logout: bool,
    pub signup_session: bool,
}

pub const KNOWN_EMAIL: &str = "ada@example.test";
pub const KNOWN_PASSWORD: &str = "correct horse";

pub fn session_for(email: &str) -> Session {
    Session {
        access_token: format!("token-{email}"),
        refresh_token: Some("refresh".to_string()),
        user: AuthUser {
            id: format!("uid-{email}"),
            email: Some(email.to_string()),
            full_name: None,
        },
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn login(&self, email: &str, password: &str) -> RemoteResult<Session> {
        if email == KNOWN_EMAIL && password == KNOWN_PASSWORD {
            Ok(session_for(email))
        } else {
            Err(status_error(400, "Invalid login credentials"))
        }
    }

    async fn signup(&self, email: &str, _password: &str, full_name: &str) -> RemoteResult<Signup> {
        let mut session = session_for(email);
        session.user.full_name = Some(full_name.to_string());
        Ok(Signup {
            user: session.user.clone(),
            session: self.signup_session.then_some(session),
        })
    }

    async fn logout(&self, session: &Session) -> RemoteResult<()> {
        self.logouts.lock().unwrap().push(session.access_token.clone());
        if self.fail_logout {
            Err(status_error(503, "unavailable"))
        } else {
            Ok(())
        }
    }
}

/// In-memory tables.
#[derive(Default)]
pub struct FakeStore {
    pub applications: Vec<LeaveApplication>,
    pub submitted: Mutex<Vec<NewLeaveApplication>>,
    pub profiles: Mutex<Vec<UserProfile>>,
    pub fail_profile_insert: bool,
}

#[async_trait]
impl DataStore for FakeStore {
    async fn leave_applications(&self) -> RemoteResult<Vec<LeaveApplication>> {
        Ok(self.applications.clone())
    }

    async fn submit_leave_application(&self, application: &NewLeaveApplication) -> RemoteResult<serde_json::Value> {
        self.submitted.lock().unwrap().push(application.clone());
        Ok(serde_json::json!({ "message": "Leave application submitted" }))
    }

    async fn add_user_details(&self, profile: &UserProfile) -> RemoteResult<()> {
        if self.fail_profile_insert {
            return Err(status_error(409, "duplicate key value"));
        }
        self.profiles.lock().unwrap().push(profile.clone());
        Ok(())
    }

    async fn user_profile(&self, uuid: &str) -> RemoteResult<Option<UserProfile>> {
        Ok(self.profiles.lock().unwrap().iter().find(|p| p.uuid == uuid).cloned())
    }
}

/// Observer that records every callback.
#[derive(Default)]
pub struct RecordingObserver {
    pub parsed: Mutex<Vec<usize>>,
    pub submitted: Mutex<Vec<UploadSummary>>,
    pub failures: Mutex<Vec<UploadSeverity>>,
    pub alerts: Mutex<Vec<UploadSeverity>>,
}

impl UploadObserver for RecordingObserver {
    fn on_parsed(&self, _ctx: &UploadContext, stats: ParseStats) {
        self.parsed.lock().unwrap().push(stats.rows);
    }

    fn on_submitted(&self, _ctx: &UploadContext, summary: &UploadSummary) {
        self.submitted.lock().unwrap().push(*summary);
    }

    fn on_failure(&self, _ctx: &UploadContext, severity: UploadSeverity, _error: &UploadError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &UploadContext, severity: UploadSeverity, _error: &UploadError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

/// Bulk ingestion that never answers.
pub struct HangingBulkIngest;

#[async_trait]
impl BulkIngestOperation for HangingBulkIngest {
    async fn ingest(&self, _batch: &ParsedBatch) -> RemoteResult<BulkIngestResponse> {
        std::future::pending().await
    }
}
