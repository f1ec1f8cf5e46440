use std::sync::Arc;

use leave_ingest::ingestion::{
    parse_upload, severity_for_error, CompositeObserver, FileObserver, UploadFile, UploadObserver, UploadOptions,
    UploadSeverity, CSV_MIME_TYPE,
};
use leave_ingest::pipeline::BulkUpload;
use leave_ingest::UploadError;

mod common;

use common::{status_error, FakeBulkIngest, RecordingObserver};

#[test]
fn rejected_mime_type_is_reported_as_error_without_alert() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = UploadOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: UploadSeverity::Critical,
        ..Default::default()
    };

    let file = UploadFile::new("leave.pdf", "application/pdf", b"%PDF".to_vec());
    let _ = parse_upload(&file, &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![UploadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lower_threshold_raises_alerts_for_parse_errors() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = UploadOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: UploadSeverity::Error,
        ..Default::default()
    };

    let file = UploadFile::new("leave.csv", CSV_MIME_TYPE, b"a,b\n1\n".to_vec());
    let _ = parse_upload(&file, &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![UploadSeverity::Error]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![UploadSeverity::Error]);
}

#[test]
fn missing_file_is_critical() {
    let err = UploadFile::from_path(common::fixture("does_not_exist.csv")).unwrap_err();
    assert!(matches!(err, UploadError::Io(_)));
    assert_eq!(severity_for_error(&err), UploadSeverity::Critical);
}

#[test]
fn pipeline_warnings_are_not_errors() {
    assert_eq!(severity_for_error(&UploadError::EmptyBatch), UploadSeverity::Warning);
    assert_eq!(
        severity_for_error(&UploadError::Submission(status_error(500, "boom"))),
        UploadSeverity::Error
    );
}

#[tokio::test]
async fn failed_submission_reaches_every_composite_member() {
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let members: Vec<Arc<dyn UploadObserver>> = vec![a.clone(), b.clone()];
    let composite: Arc<dyn UploadObserver> = Arc::new(CompositeObserver::new(members));
    let opts = UploadOptions {
        observer: Some(composite),
        ..Default::default()
    };
    let op = FakeBulkIngest::answering(vec![Err(status_error(500, "boom"))]);

    let mut upload = BulkUpload::new(opts);
    upload.select_file(UploadFile::new("leave.csv", CSV_MIME_TYPE, b"Staff ID\nS1\n".to_vec()));
    upload.submit(&op).await;

    for obs in [&a, &b] {
        assert_eq!(*obs.parsed.lock().unwrap(), vec![1]);
        assert_eq!(*obs.failures.lock().unwrap(), vec![UploadSeverity::Error]);
        assert!(obs.submitted.lock().unwrap().is_empty());
    }
}

#[test]
fn file_observer_appends_lines() {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("leave-ingest-observer-{nanos}.log"));
    let opts = UploadOptions {
        observer: Some(Arc::new(FileObserver::new(&path))),
        ..Default::default()
    };

    let ok = UploadFile::new("leave.csv", CSV_MIME_TYPE, b"Staff ID\nS1\nS2\n".to_vec());
    parse_upload(&ok, &opts).unwrap();
    let bad = UploadFile::new("leave.pdf", "application/pdf", Vec::new());
    let _ = parse_upload(&bad, &opts).unwrap_err();

    let log = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("leave.csv"));
    assert!(lines[1].contains("leave.pdf"));

    let _ = std::fs::remove_file(&path);
}
