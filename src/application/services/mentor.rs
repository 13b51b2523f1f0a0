//! Mentor assignment service
//!
//! Picks a mentor for a member, issues the mutation against the member store
//! and re-fetches the member list so the hierarchy can be rebuilt.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::optimistic::attempt;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{DomainError, Member, MutationResult};
use crate::infrastructure::traits::{MemberRepository, SelectionItem, Selector};

/// Service for assigning and removing mentors within one organization.
pub struct MentorService {
    repo: Arc<dyn MemberRepository>,
    organization_id: String,
    members: Vec<Member>,
}

impl MentorService {
    /// Create a service with an empty member cache; call [`refresh`](Self::refresh) to load.
    pub fn new(repo: Arc<dyn MemberRepository>, organization_id: impl Into<String>) -> Self {
        Self {
            repo,
            organization_id: organization_id.into(),
            members: Vec::new(),
        }
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    /// Latest member list: fetched, or optimistically updated.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Re-fetch all members from the store.
    #[instrument(level = "debug", skip(self), fields(org = %self.organization_id))]
    pub fn refresh(&mut self) -> ApplicationResult<&[Member]> {
        self.members = self
            .repo
            .fetch_members(&self.organization_id)
            .with_org_context("fetch members", &self.organization_id)?;
        debug!(count = self.members.len(), "members fetched");
        Ok(&self.members)
    }

    fn require_member(&self, member_id: &str) -> ApplicationResult<&Member> {
        self.members
            .iter()
            .find(|m| m.id == member_id)
            .ok_or_else(|| DomainError::UnknownMember(member_id.to_string()).into())
    }

    /// Every other member matching `query` (case-insensitive name, role, designation or id).
    pub fn candidates(&self, target_id: &str, query: &str) -> ApplicationResult<Vec<&Member>> {
        self.require_member(target_id)?;
        let needle = query.trim().to_lowercase();
        Ok(self
            .members
            .iter()
            .filter(|m| m.id != target_id)
            .filter(|m| needle.is_empty() || matches_query(m, &needle))
            .collect())
    }

    pub fn selection_items(&self, target_id: &str, query: &str) -> ApplicationResult<Vec<SelectionItem>> {
        Ok(self
            .candidates(target_id, query)?
            .into_iter()
            .map(|m| SelectionItem {
                display: candidate_label(m),
                value: m.id.clone(),
            })
            .collect())
    }

    /// Let the user pick a mentor for `target_id`. None when cancelled.
    pub fn pick_mentor(
        &self,
        target_id: &str,
        query: &str,
        selector: &dyn Selector,
    ) -> ApplicationResult<Option<String>> {
        let items = self.selection_items(target_id, query)?;
        let target = self.require_member(target_id)?;
        let prompt = format!("Mentor for {}> ", target.display_name);
        let selected = selector
            .select_one(&items, &prompt)
            .map_err(ApplicationError::Selection)?;
        Ok(selected.map(|item| item.value))
    }

    pub fn assign(&mut self, target_id: &str, mentor_id: &str) -> ApplicationResult<MutationResult> {
        if target_id == mentor_id {
            return Err(DomainError::SelfMentorship(target_id.to_string()).into());
        }
        self.require_member(mentor_id)?;
        self.mutate(target_id, Some(mentor_id))
    }

    pub fn remove(&mut self, target_id: &str) -> ApplicationResult<MutationResult> {
        self.mutate(target_id, None)
    }

    #[instrument(level = "debug", skip(self))]
    fn mutate(&mut self, target_id: &str, mentor_id: Option<&str>) -> ApplicationResult<MutationResult> {
        self.require_member(target_id)?;

        let repo = Arc::clone(&self.repo);
        let result = attempt(
            &mut self.members,
            |members| {
                if let Some(member) = members.iter_mut().find(|m| m.id == target_id) {
                    member.mentor_id = mentor_id.map(str::to_string);
                }
            },
            || repo.update_mentor(target_id, mentor_id),
        );

        if result.success {
            if let Err(e) = self.refresh() {
                warn!(error = %e, "re-fetch after mentor update failed, keeping optimistic state");
            }
        } else {
            debug!(message = ?result.message, "mentor update rejected");
        }
        Ok(result)
    }
}

fn matches_query(member: &Member, needle: &str) -> bool {
    [
        Some(member.display_name.as_str()),
        Some(member.role.as_str()),
        member.designation.as_deref(),
        Some(member.id.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

fn candidate_label(member: &Member) -> String {
    match &member.designation {
        Some(designation) => format!("{} ({}, {})", member.display_name, designation, member.role),
        None => format!("{} ({})", member.display_name, member.role),
    }
}
