//! Error conversion helpers for repository I/O
//!
//! Provides extension traits for cleaner error handling with organization context.

use std::io;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add organization context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// repo.fetch_members(org)
    ///     .with_org_context("fetch members", org)?;
    /// ```
    fn with_org_context(self, action: &str, organization_id: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_org_context(self, action: &str, organization_id: &str) -> ApplicationResult<T> {
        self.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                return ApplicationError::UnknownOrganization(organization_id.to_string());
            }
            ApplicationError::OperationFailed {
                context: format!("{}: {}", action, organization_id),
                source: Box::new(e),
            }
        })
    }
}
