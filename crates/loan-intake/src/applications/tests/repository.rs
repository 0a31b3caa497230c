use super::common::*;
use std::fs;

use crate::applications::domain::ApplicationStatus;
use crate::applications::repository::{
    ApplicationRepository, InMemoryRepository, JsonFileRepository, STORAGE_KEY,
};

fn sample_list() -> Vec<crate::applications::domain::LoanApplication> {
    vec![
        application("a", 1000.0, ApplicationStatus::Pending, timestamp(2025, 10, 1, 9)),
        application("b", 2500.5, ApplicationStatus::Approved, timestamp(2025, 10, 2, 14)),
        application("c", 640.0, ApplicationStatus::Rejected, timestamp(2025, 10, 3, 17)),
    ]
}

#[test]
fn file_repository_loads_empty_when_file_is_absent() {
    let dir = tempfile::tempdir().expect("temp dir");
    let repository = JsonFileRepository::new(dir.path());

    assert!(repository.load().is_empty());
    assert_eq!(
        repository.path(),
        dir.path().join(format!("{STORAGE_KEY}.json")).as_path()
    );
}

#[test]
fn file_repository_round_trips_a_saved_list() {
    let dir = tempfile::tempdir().expect("temp dir");
    let repository = JsonFileRepository::new(dir.path().join("nested"));
    let applications = sample_list();

    repository.save(&applications).expect("save succeeds");
    let loaded = repository.load();
    assert_eq!(loaded, applications);

    repository.save(&loaded).expect("second save succeeds");
    assert_eq!(repository.load(), applications);
    assert!(!repository.path().with_extension("json.tmp").exists());
}

#[test]
fn file_repository_treats_malformed_content_as_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let repository = JsonFileRepository::new(dir.path());
    fs::write(repository.path(), "[{\"id\": 42}").expect("write garbage");

    assert!(repository.load().is_empty());
}

#[test]
fn persisted_layout_uses_camel_case_fields() {
    let repository = InMemoryRepository::default();
    repository.save(&sample_list()).expect("save succeeds");

    let raw = repository.raw().expect("slot populated");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    let first = &value[0];

    assert_eq!(first["id"], "a");
    assert_eq!(first["fullName"], "Casey Morgan");
    assert_eq!(first["loanAmount"], 1000.0);
    assert_eq!(first["purpose"], "home");
    assert_eq!(first["employmentStatus"], "selfemployed");
    assert_eq!(first["annualIncome"], 88000.0);
    assert_eq!(first["status"], "pending");
    assert_eq!(first["createdAt"], "2025-10-01T09:00:00Z");
}

#[test]
fn memory_repository_reads_browser_style_timestamps() {
    let raw = r#"[{
        "id": "k3j9x0a1b",
        "fullName": "Riley Chen",
        "email": "riley@example.com",
        "phone": "5155550100",
        "loanAmount": 12000,
        "purpose": "education",
        "employmentStatus": "parttime",
        "annualIncome": 41000,
        "status": "approved",
        "createdAt": "2025-10-04T15:30:12.345Z"
    }]"#;
    let repository = InMemoryRepository::with_raw(raw);

    let loaded = repository.load();

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id.as_str(), "k3j9x0a1b");
    assert_eq!(loaded[0].loan_amount, 12000.0);
    assert_eq!(loaded[0].status, ApplicationStatus::Approved);
}

#[test]
fn memory_repository_treats_garbage_as_empty() {
    assert!(InMemoryRepository::with_raw("").load().is_empty());
    assert!(InMemoryRepository::with_raw("null").load().is_empty());
    assert!(InMemoryRepository::default().load().is_empty());
}
