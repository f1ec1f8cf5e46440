use std::sync::Arc;
use std::time::Duration;

use leave_ingest::ingestion::{UploadFile, UploadOptions, CSV_MIME_TYPE};
use leave_ingest::pipeline::{submit_batch, BulkUpload, UploadState};
use leave_ingest::report::NotificationLevel;
use leave_ingest::types::{BulkIngestRequest, BulkIngestResponse, ParsedBatch, RowIssue, UploadDetail, UploadSummary};
use leave_ingest::UploadError;
use serde_json::json;

mod common;

use common::{response, status_error, FakeBulkIngest, HangingBulkIngest, RecordingObserver};

fn csv_file(body: &str) -> UploadFile {
    UploadFile::new("leave.csv", CSV_MIME_TYPE, body.as_bytes().to_vec())
}

fn ten_row_csv() -> UploadFile {
    let mut body = String::from("Staff ID,Start Date,End Date\n");
    for i in 1..=10 {
        body.push_str(&format!("S{i:03},2024-05-{i:02},2024-05-{i:02}\n"));
    }
    csv_file(&body)
}

#[tokio::test]
async fn mixed_outcome_reports_three_notifications() {
    let answer = BulkIngestResponse {
        summary: UploadSummary {
            total: 10,
            inserted: 7,
            duplicates: 2,
            errors: 1,
        },
        details: UploadDetail {
            errors: vec![RowIssue::new(json!({ "row": 4, "reason": "invalid date" }))],
            duplicates: vec![RowIssue::new(json!({ "row": 2 })), RowIssue::new(json!({ "row": 9 }))],
        },
    };
    let op = FakeBulkIngest::answering(vec![Ok(answer.clone())]);

    let mut upload = BulkUpload::default();
    assert!(upload.select_file(ten_row_csv()).is_empty());
    assert_eq!(upload.state(), UploadState::Previewing);
    assert_eq!(upload.preview().len(), 5);
    assert_eq!(upload.batch().unwrap().row_count(), 10);

    let notes = upload.submit(&op).await;

    assert_eq!(op.call_count(), 1);
    assert_eq!(op.calls.lock().unwrap()[0].row_count(), 10);
    assert_eq!(notes.len(), 3);
    assert_eq!(notes[0].level, NotificationLevel::Success);
    assert_eq!(
        notes[0].description,
        "Processed 10 records: 7 inserted, 2 duplicates, 1 errors"
    );
    assert_eq!(notes[1].level, NotificationLevel::Error);
    assert!(notes[1].description.contains("row 4 (invalid date)"));
    assert_eq!(notes[2].level, NotificationLevel::Warning);
    assert!(notes[2].description.starts_with("2 duplicate records were skipped."));

    assert_eq!(upload.state(), UploadState::Succeeded);
    assert!(upload.batch().is_none());
    assert!(upload.file().is_none());
    assert_eq!(upload.last_response(), Some(&answer));
}

#[tokio::test]
async fn one_of_each_outcome_gives_one_of_each_notification() {
    let answer: BulkIngestResponse = serde_json::from_str(
        r#"{
            "summary": { "total": 3, "inserted": 1, "duplicates": 1, "errors": 1 },
            "details": {
                "errors": [{ "row": 3, "error": "End Date before Start Date" }],
                "duplicates": [{ "row": { "Staff ID": "S1" }, "message": "already exists" }]
            }
        }"#,
    )
    .unwrap();
    let op = FakeBulkIngest::answering(vec![Ok(answer.clone())]);
    let mut upload = BulkUpload::default();
    upload.select_file(csv_file("Staff ID\nS1\nS2\nS3\n"));

    let notes = upload.submit(&op).await;
    let levels: Vec<_> = notes.iter().map(|n| n.level).collect();
    assert_eq!(
        levels,
        vec![NotificationLevel::Success, NotificationLevel::Error, NotificationLevel::Warning]
    );
    assert!(notes[0].description.contains("1 inserted"));
    assert!(notes[1].description.contains("row 3 (End Date before Start Date)"));
    assert!(notes[2].description.contains("Staff ID S1 (already exists)"));
    assert_eq!(upload.last_response(), Some(&answer));
}

#[tokio::test]
async fn submitted_batch_is_sent_under_csv_data() {
    let op = FakeBulkIngest::answering(vec![Ok(response(2, 2, 0, 0))]);
    let mut upload = BulkUpload::default();
    upload.select_file(csv_file("Staff ID,Start Date\nS1,2024-05-01\nS2,2024-05-02\n"));
    upload.submit(&op).await;

    let sent = op.calls.lock().unwrap()[0].clone();
    let body = serde_json::to_value(BulkIngestRequest { csv_data: &sent }).unwrap();
    assert_eq!(
        body,
        json!({
            "csvData": [
                { "Staff ID": "S1", "Start Date": "2024-05-01" },
                { "Staff ID": "S2", "Start Date": "2024-05-02" }
            ]
        })
    );
}

#[tokio::test]
async fn unsupported_file_is_rejected_without_remote_call() {
    let op = FakeBulkIngest::default();
    let mut upload = BulkUpload::default();

    let notes = upload.select_file(UploadFile::new("leave.pdf", "application/pdf", b"%PDF-1.7".to_vec()));

    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Invalid file type");
    assert_eq!(upload.state(), UploadState::Idle);
    assert!(upload.batch().is_none());

    let err = upload.try_submit(&op).await.unwrap_err();
    assert!(matches!(err, UploadError::EmptyBatch));
    assert_eq!(op.call_count(), 0);
}

#[tokio::test]
async fn unsupported_file_keeps_the_previous_preview() {
    let mut upload = BulkUpload::default();
    upload.select_file(ten_row_csv());
    upload.select_file(UploadFile::new("notes.txt", "text/plain", b"hello".to_vec()));

    assert_eq!(upload.state(), UploadState::Previewing);
    assert_eq!(upload.batch().unwrap().row_count(), 10);
}

#[tokio::test]
async fn failed_submission_keeps_batch_for_retry() {
    let op = FakeBulkIngest::answering(vec![
        Err(status_error(502, "bad gateway")),
        Ok(response(10, 10, 0, 0)),
    ]);
    let mut upload = BulkUpload::default();
    upload.select_file(ten_row_csv());

    let notes = upload.submit(&op).await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Upload failed");
    assert!(notes[0].description.contains("bad gateway"));
    assert_eq!(upload.state(), UploadState::Failed);
    assert!(upload.can_submit());
    assert_eq!(upload.batch().unwrap().row_count(), 10);

    let notes = upload.submit(&op).await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Success);
    assert_eq!(upload.state(), UploadState::Succeeded);
    assert_eq!(op.call_count(), 2);
}

#[tokio::test]
async fn parse_error_discards_batch_and_returns_to_idle() {
    let mut upload = BulkUpload::default();
    upload.select_file(ten_row_csv());

    let notes = upload.select_file(csv_file("Staff ID,Status\nS1\n"));
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Error parsing file");
    assert_eq!(upload.state(), UploadState::Idle);
    assert!(upload.batch().is_none());
    assert!(upload.preview().is_empty());
}

#[tokio::test]
async fn header_only_file_cannot_be_submitted() {
    let op = FakeBulkIngest::default();
    let mut upload = BulkUpload::default();
    upload.select_file(csv_file("Staff ID,Status\n"));
    assert_eq!(upload.state(), UploadState::Previewing);
    assert!(!upload.can_submit());

    let notes = upload.submit(&op).await;
    assert_eq!(notes[0].title, "No records to upload");
    assert_eq!(op.call_count(), 0);
}

#[tokio::test]
async fn submit_batch_refuses_empty_batch() {
    let op = FakeBulkIngest::default();
    let err = submit_batch(&op, &ParsedBatch::default()).await.unwrap_err();
    assert!(matches!(err, UploadError::EmptyBatch));
    assert_eq!(op.call_count(), 0);
}

#[tokio::test]
async fn submit_batch_returns_response_unchanged() {
    let op = FakeBulkIngest::answering(vec![Ok(response(3, 2, 1, 0))]);
    let batch = leave_ingest::ingestion::csv::parse_csv_bytes(b"Staff ID\nS1\nS2\nS3\n").unwrap();
    let answer = submit_batch(&op, &batch).await.unwrap();
    assert_eq!(answer, response(3, 2, 1, 0));
}

#[tokio::test]
async fn reset_clears_everything() {
    let op = FakeBulkIngest::answering(vec![Ok(response(10, 10, 0, 0))]);
    let mut upload = BulkUpload::default();
    upload.select_file(ten_row_csv());
    upload.submit(&op).await;

    upload.reset();
    assert_eq!(upload.state(), UploadState::Idle);
    assert!(upload.last_response().is_none());
    assert!(upload.batch().is_none());
}

#[tokio::test]
async fn preview_respects_configured_row_count() {
    let options = UploadOptions {
        preview_rows: 3,
        ..Default::default()
    };
    let mut upload = BulkUpload::new(options);
    let rows = upload.try_select_file(ten_row_csv()).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].text("Staff ID"), Some("S001"));
}

#[tokio::test]
async fn observer_sees_parse_and_submit() {
    let obs = Arc::new(RecordingObserver::default());
    let options = UploadOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };
    let op = FakeBulkIngest::answering(vec![Ok(response(10, 8, 2, 0))]);

    let mut upload = BulkUpload::new(options);
    upload.select_file(ten_row_csv());
    upload.submit(&op).await;

    assert_eq!(*obs.parsed.lock().unwrap(), vec![10]);
    assert_eq!(obs.submitted.lock().unwrap()[0].duplicates, 2);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[tokio::test]
async fn abandoned_submit_leaves_pipeline_actionable() {
    let mut upload = BulkUpload::default();
    upload.select_file(ten_row_csv());

    let timed_out = tokio::time::timeout(Duration::from_millis(20), upload.submit(&HangingBulkIngest)).await;
    assert!(timed_out.is_err());

    assert_eq!(upload.state(), UploadState::Previewing);
    assert!(upload.can_submit());
    assert_eq!(upload.batch().unwrap().row_count(), 10);

    let op = FakeBulkIngest::answering(vec![Ok(response(10, 10, 0, 0))]);
    let notes = upload.submit(&op).await;
    assert_eq!(notes[0].level, NotificationLevel::Success);
    assert_eq!(upload.state(), UploadState::Succeeded);
}

#[tokio::test]
async fn abandoned_retry_returns_to_failed() {
    let op = FakeBulkIngest::answering(vec![Err(status_error(503, "unavailable"))]);
    let mut upload = BulkUpload::default();
    upload.select_file(ten_row_csv());
    upload.submit(&op).await;
    assert_eq!(upload.state(), UploadState::Failed);

    let _ = tokio::time::timeout(Duration::from_millis(20), upload.submit(&HangingBulkIngest)).await;
    assert_eq!(upload.state(), UploadState::Failed);
    assert!(upload.select_file(ten_row_csv()).is_empty());
}
