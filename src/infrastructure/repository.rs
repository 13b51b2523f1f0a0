//! Member store implementations: JSON file and in-memory.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::{DomainError, Member, MutationResult};
use crate::infrastructure::dedup::FetchDeduplicator;
use crate::infrastructure::traits::MemberRepository;

/// Header of a member document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

/// On-disk shape: one organization and its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDocument {
    pub organization: Organization,
    #[serde(default)]
    pub members: Vec<Member>,
}

type FetchOutcome = Result<Vec<Member>, (io::ErrorKind, String)>;

/// Validate a mentor change against the current member list and apply it.
fn apply_mentor_update(
    members: &mut [Member],
    member_id: &str,
    mentor_id: Option<&str>,
) -> MutationResult {
    if members.iter().filter(|m| m.id == member_id).count() > 1 {
        return MutationResult::failed(DomainError::DuplicateMember(member_id.to_string()).to_string());
    }
    if mentor_id == Some(member_id) {
        return MutationResult::failed(format!("member cannot mentor themselves: {member_id}"));
    }
    if let Some(mentor) = mentor_id {
        if !members.iter().any(|m| m.id == mentor) {
            return MutationResult::failed(format!("mentor not found: {mentor}"));
        }
    }
    match members.iter_mut().find(|m| m.id == member_id) {
        Some(member) => {
            member.mentor_id = mentor_id.map(str::to_string);
            MutationResult::ok()
        }
        None => MutationResult::failed(format!("member not found: {member_id}")),
    }
}

/// Member store backed by a pretty-printed JSON [`MemberDocument`].
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    in_flight: FetchDeduplicator<FetchOutcome>,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            in_flight: FetchDeduplicator::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_document(&self) -> io::Result<MemberDocument> {
        let content = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("parse {}: {}", self.path.display(), e),
            )
        })
    }

    pub fn save_document(&self, document: &MemberDocument) -> io::Result<()> {
        let content = serde_json::to_string_pretty(document)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(&self.path, content + "\n")
    }

    fn read_members(&self, organization_id: &str) -> FetchOutcome {
        let document = self.load_document().map_err(|e| (e.kind(), e.to_string()))?;
        if document.organization.id != organization_id {
            return Err((
                io::ErrorKind::NotFound,
                format!("organization {organization_id} not in {}", self.path.display()),
            ));
        }
        Ok(document.members)
    }
}

impl MemberRepository for JsonFileRepository {
    #[instrument(level = "debug", skip(self))]
    fn fetch_members(&self, organization_id: &str) -> io::Result<Vec<Member>> {
        self.in_flight
            .run(organization_id, || self.read_members(organization_id))
            .map_err(|(kind, message)| io::Error::new(kind, message))
    }

    #[instrument(level = "debug", skip(self))]
    fn update_mentor(&self, member_id: &str, mentor_id: Option<&str>) -> MutationResult {
        let mut document = match self.load_document() {
            Ok(document) => document,
            Err(e) => return MutationResult::failed(e.to_string()),
        };
        let result = apply_mentor_update(&mut document.members, member_id, mentor_id);
        if !result.success {
            return result;
        }
        match self.save_document(&document) {
            Ok(()) => {
                debug!(member_id, ?mentor_id, "mentor updated");
                result
            }
            Err(e) => MutationResult::failed(format!("write {}: {}", self.path.display(), e)),
        }
    }
}

/// Member store held in memory, keyed by organization id.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    organizations: Mutex<HashMap<String, Vec<Member>>>,
    fetches: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_organization(self, organization_id: &str, members: Vec<Member>) -> Self {
        self.lock().insert(organization_id.to_string(), members);
        self
    }

    /// Number of `fetch_members` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Member>>> {
        self.organizations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MemberRepository for InMemoryRepository {
    fn fetch_members(&self, organization_id: &str) -> io::Result<Vec<Member>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.lock().get(organization_id).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("organization not found: {organization_id}"),
            )
        })
    }

    /// Resolves the member across all organizations. An id present in more
    /// than one organization is rejected and nothing is mutated.
    fn update_mentor(&self, member_id: &str, mentor_id: Option<&str>) -> MutationResult {
        let mut organizations = self.lock();
        let mut owners: Vec<&mut Vec<Member>> = organizations
            .values_mut()
            .filter(|members| members.iter().any(|m| m.id == member_id))
            .collect();
        let count = owners.len();
        match owners.pop() {
            None => MutationResult::failed(format!("member not found: {member_id}")),
            Some(members) if count == 1 => apply_mentor_update(members, member_id, mentor_id),
            Some(_) => {
                warn!(
                    member_id,
                    organizations = count,
                    "member id is ambiguous across organizations"
                );
                MutationResult::failed(format!("member {member_id} exists in {count} organizations"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members() -> Vec<Member> {
        vec![
            Member::new("a", "Ada", "Lead"),
            Member::new("b", "Bob", "Dev"),
        ]
    }

    #[test]
    fn test_apply_rejects_self_mentor() {
        let mut list = members();
        let result = apply_mentor_update(&mut list, "a", Some("a"));
        assert!(!result.success);
        assert_eq!(list, members());
    }

    #[test]
    fn test_apply_rejects_unknown_mentor() {
        let mut list = members();
        let result = apply_mentor_update(&mut list, "b", Some("ghost"));
        assert!(!result.success);
        assert!(result.message.unwrap().contains("ghost"));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut list = members();
        assert!(apply_mentor_update(&mut list, "b", Some("a")).success);
        let once = list.clone();
        assert!(apply_mentor_update(&mut list, "b", Some("a")).success);
        assert_eq!(list, once);
    }

    #[test]
    fn test_apply_rejects_ambiguous_member() {
        let mut list = members();
        list.push(Member::new("b", "Bob Two", "Dev"));
        let result = apply_mentor_update(&mut list, "b", Some("a"));
        assert!(!result.success);
        assert!(result.message.unwrap().contains("duplicate"));
    }

    #[test]
    fn test_in_memory_rejects_member_shared_by_organizations() {
        let repo = InMemoryRepository::new()
            .with_organization("acme", members())
            .with_organization("globex", members());

        let result = repo.update_mentor("b", Some("a"));

        assert!(!result.success);
        assert!(result.message.unwrap().contains("2 organizations"));
        assert_eq!(repo.fetch_members("acme").unwrap(), members());
        assert_eq!(repo.fetch_members("globex").unwrap(), members());
    }

    #[test]
    fn test_in_memory_counts_fetches() {
        let repo = InMemoryRepository::new().with_organization("acme", members());
        repo.fetch_members("acme").unwrap();
        assert!(repo.fetch_members("other").is_err());
        assert_eq!(repo.fetch_count(), 2);
    }
}
