//! `leave-ingest` is the client side of a leave-management workflow: it parses CSV and xlsx
//! uploads of leave records, previews them, and hands the batch to a remote bulk-ingestion
//! operation in a single call.
//!
//! The primary entrypoint is [`pipeline::BulkUpload`], which drives one upload through
//! select → parse → preview → submit → report. Parsing alone is available through
//! [`ingestion::parse_upload`].
//!
//! ## What you can upload
//!
//! Files are accepted by declared MIME type only:
//!
//! - **CSV**: `text/csv`. The first line is the header; every value stays text.
//! - **xlsx** (requires the Cargo feature `excel`, on by default):
//!   `application/vnd.openxmlformats-officedocument.spreadsheetml.sheet`. Only the first sheet is
//!   read. Numeric cells under `Start Date` / `End Date` are spreadsheet date serials and are
//!   converted to `YYYY-MM-DD`.
//!
//! Anything else is rejected before parsing.
//!
//! ## Quick example: parse and submit
//!
//! ```no_run
//! use leave_ingest::config::ClientConfig;
//! use leave_ingest::ingestion::{UploadFile, UploadOptions};
//! use leave_ingest::pipeline::BulkUpload;
//! use leave_ingest::remote::HostedClient;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HostedClient::new(ClientConfig::from_json_path("client.json")?)?;
//!
//! let mut upload = BulkUpload::new(UploadOptions::default());
//! upload.try_select_file(UploadFile::from_path("leave.xlsx")?)?;
//! for row in upload.preview() {
//!     println!("{:?}", row);
//! }
//! for note in upload.submit(&client).await {
//!     println!("{note}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: file-type checks, CSV/xlsx parsing, date-serial conversion, observers
//! - [`pipeline`]: the upload state machine and [`pipeline::submit_batch`]
//! - [`report`]: notifications derived from an upload outcome
//! - [`remote`]: backend capability traits and the HTTP client
//! - [`auth`]: session state and registration
//! - [`leave`]: leave applications, the single-application form, table state and dashboard stats
//! - [`calendar`]: month/year calendar views of approved leave
//! - [`config`]: client configuration
//! - [`types`]: rows, batches and the bulk-ingestion wire types
//! - [`error`]: error types

pub mod auth;
pub mod calendar;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod leave;
pub mod pipeline;
pub mod remote;
pub mod report;
pub mod types;

pub use error::{ConfigError, RemoteError, RemoteResult, UploadError, UploadResult};
