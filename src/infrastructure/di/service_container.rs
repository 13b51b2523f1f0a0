//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{ChartSession, MentorService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::repository::{JsonFileRepository, Organization};
use crate::infrastructure::traits::{MemberRepository, Selector, SkimSelector};

/// Container holding the member store, the selector, and the organization they serve.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Organization whose members are loaded
    pub organization: Organization,

    /// Member store
    pub repo: Arc<dyn MemberRepository>,

    /// Interactive picker
    pub selector: Arc<dyn Selector>,
}

impl ServiceContainer {
    /// Create a container over the JSON member file named in `settings`.
    ///
    /// The organization comes from `settings.organization_id` when set, otherwise
    /// from the document header.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let path = settings.members_file.clone();
        if !path.exists() {
            return Err(InfraError::MemberFileMissing(path));
        }

        let repo = JsonFileRepository::new(&path);
        let document = repo
            .load_document()
            .map_err(|e| InfraError::io(format!("read {}", path.display()), e))?;

        let organization = match &settings.organization_id {
            Some(id) if *id != document.organization.id => Organization {
                id: id.clone(),
                name: id.clone(),
            },
            _ => document.organization,
        };
        debug!(org = %organization.id, file = %path.display(), "member store ready");

        Ok(Self::with_deps(
            settings,
            organization,
            Arc::new(repo),
            Arc::new(SkimSelector),
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        organization: Organization,
        repo: Arc<dyn MemberRepository>,
        selector: Arc<dyn Selector>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            organization,
            repo,
            selector,
        }
    }

    pub fn mentor_service(&self) -> MentorService {
        MentorService::new(Arc::clone(&self.repo), self.organization.id.clone())
    }

    pub fn chart_session(&self) -> ApplicationResult<ChartSession> {
        ChartSession::from_settings(&self.settings, &self.organization.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Member;
    use crate::infrastructure::repository::InMemoryRepository;

    #[test]
    fn test_services_share_organization() {
        let repo = InMemoryRepository::new()
            .with_organization("acme", vec![Member::new("a", "Ada", "CEO")]);
        let container = ServiceContainer::with_deps(
            Settings::default(),
            Organization {
                id: "acme".into(),
                name: "Acme".into(),
            },
            Arc::new(repo),
            Arc::new(SkimSelector),
        );

        let mut service = container.mentor_service();
        assert_eq!(service.refresh().map(|m| m.len()).ok(), Some(1));
        assert_eq!(container.chart_session().unwrap().organization_name(), "Acme");
    }

    #[test]
    fn test_missing_member_file() {
        let settings = Settings {
            members_file: "/nonexistent/members.json".into(),
            ..Settings::default()
        };
        assert!(matches!(
            ServiceContainer::new(settings),
            Err(InfraError::MemberFileMissing(_))
        ));
    }
}
