//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent business rule violations.
///
/// Dangling mentor references and mentor cycles are not errors: the builder
/// degrades those members to unassigned roots.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown member: {0}")]
    UnknownMember(String),

    #[error("member cannot mentor themselves: {0}")]
    SelfMentorship(String),

    #[error("duplicate member id: {0}")]
    DuplicateMember(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}
