//! Tests for the JSON file member store and the service container

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use orgtree::config::Settings;
use orgtree::domain::Member;
use orgtree::infrastructure::di::ServiceContainer;
use orgtree::infrastructure::repository::{JsonFileRepository, MemberDocument, Organization};
use orgtree::infrastructure::traits::MemberRepository;
use orgtree::infrastructure::InfraError;

const DOCUMENT: &str = r#"{
  "organization": { "id": "acme", "name": "Acme Corp" },
  "members": [
    { "id": "a", "displayName": "Ada", "role": "CEO", "mentor_id": null },
    { "id": "b", "displayName": "Bob", "role": "CTO", "mentor_id": "a", "designation": "VP" },
    { "id": "c", "displayName": "Cy", "role": "Dev", "joining_date": "2022-01-15" }
  ]
}"#;

fn write_document(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("members.json");
    fs::write(&path, DOCUMENT).expect("write member document");
    path
}

#[test]
fn given_member_file_when_fetching_then_members_are_parsed() {
    let temp = TempDir::new().unwrap();
    let repo = JsonFileRepository::new(write_document(&temp));

    let members = repo.fetch_members("acme").unwrap();

    assert_eq!(members.len(), 3);
    assert_eq!(members[1].mentor(), Some("a"));
    assert_eq!(members[1].designation.as_deref(), Some("VP"));
    assert_eq!(members[2].joining_date.as_deref(), Some("2022-01-15"));
}

#[test]
fn given_other_organization_when_fetching_then_not_found() {
    let temp = TempDir::new().unwrap();
    let repo = JsonFileRepository::new(write_document(&temp));

    let err = repo.fetch_members("globex").unwrap_err();

    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}

#[test]
fn given_mentor_update_when_applied_then_file_is_rewritten() {
    let temp = TempDir::new().unwrap();
    let path = write_document(&temp);
    let repo = JsonFileRepository::new(&path);

    let first = repo.update_mentor("c", Some("b"));
    let second = repo.update_mentor("c", Some("b"));

    assert!(first.success);
    assert!(second.success, "repeating an update is idempotent");
    let document: MemberDocument =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let cy = document.members.iter().find(|m| m.id == "c").unwrap();
    assert_eq!(cy.mentor(), Some("b"));
    assert_eq!(document.organization.name, "Acme Corp");
}

#[test]
fn given_removal_when_applied_then_mentor_is_cleared() {
    let temp = TempDir::new().unwrap();
    let repo = JsonFileRepository::new(write_document(&temp));

    assert!(repo.update_mentor("b", None).success);

    let members = repo.fetch_members("acme").unwrap();
    assert_eq!(members[1].mentor(), None);
}

#[test]
fn given_invalid_update_when_applied_then_failure_and_file_unchanged() {
    let temp = TempDir::new().unwrap();
    let path = write_document(&temp);
    let repo = JsonFileRepository::new(&path);

    let self_mentor = repo.update_mentor("a", Some("a"));
    let unknown_mentor = repo.update_mentor("a", Some("ghost"));
    let unknown_member = repo.update_mentor("ghost", Some("a"));

    for result in [&self_mentor, &unknown_mentor, &unknown_member] {
        assert!(!result.success);
        assert!(result.message.is_some());
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), DOCUMENT);
}

#[test]
fn given_concurrent_fetches_when_reading_then_all_callers_get_the_same_members() {
    let temp = TempDir::new().unwrap();
    let repo = Arc::new(JsonFileRepository::new(write_document(&temp)));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || repo.fetch_members("acme").unwrap())
        })
        .collect();
    let results: Vec<Vec<Member>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn given_member_file_when_building_container_then_organization_comes_from_document() {
    let temp = TempDir::new().unwrap();
    let settings = Settings {
        members_file: write_document(&temp),
        ..Settings::default()
    };

    let container = ServiceContainer::new(settings).unwrap();

    assert_eq!(
        container.organization,
        Organization {
            id: "acme".into(),
            name: "Acme Corp".into()
        }
    );
    let mut service = container.mentor_service();
    assert_eq!(service.refresh().unwrap().len(), 3);
    let mut session = container.chart_session().unwrap();
    session.set_members(service.members());
    assert_eq!(session.organization_name(), "Acme Corp");
    assert_eq!(session.tree().children().len(), 1);
}

#[test]
fn given_configured_name_when_building_container_then_chart_uses_it() {
    let temp = TempDir::new().unwrap();
    let settings = Settings {
        members_file: write_document(&temp),
        organization_name: Some("ACME Holdings".into()),
        ..Settings::default()
    };

    let container = ServiceContainer::new(settings).unwrap();

    assert_eq!(container.chart_session().unwrap().organization_name(), "ACME Holdings");
}

#[test]
fn given_missing_member_file_when_building_container_then_error() {
    let temp = TempDir::new().unwrap();
    let settings = Settings {
        members_file: temp.path().join("absent.json"),
        ..Settings::default()
    };

    assert!(matches!(
        ServiceContainer::new(settings),
        Err(InfraError::MemberFileMissing(_))
    ));
}
