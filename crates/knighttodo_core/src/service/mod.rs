//! Aggregate use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into aggregate-level operations.
//! - Translate repository failures into the service error taxonomy.
//! - Log every failure with the identifier that caused it.
//!
//! # Invariants
//! - Child-scoped operations fail `NotFound` when the child belongs to a
//!   different parent.
//! - Services remain storage-agnostic; they only see repository traits.

pub mod day_service;
pub mod routine_instance_service;
pub mod routine_service;
pub mod todo_service;

use crate::experience::ExperienceError;
use crate::model::common::{EntityKind, TodoDraft};
use crate::repo::RepoError;
use log::{error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by aggregate services.
#[derive(Debug)]
pub enum ServiceError {
    /// Identifier does not resolve, or resolves under a different parent.
    NotFound { entity: EntityKind, id: Uuid },
    /// Input rejected before reaching storage.
    Validation(String),
    /// A dependent delete step failed; nothing was committed.
    Cascade {
        entity: EntityKind,
        id: Uuid,
        source: RepoError,
    },
    /// Experience award failed; the ready flag was not committed.
    ExternalService { id: Uuid, source: ExperienceError },
    /// Any other repository failure.
    Repo(RepoError),
}

impl ServiceError {
    pub(crate) fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Stable label used in log events and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation",
            Self::Cascade { .. } => "cascade_failure",
            Self::ExternalService { .. } => "external_service_failure",
            Self::Repo(_) => "repository_failure",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Validation(message) => write!(f, "{message}"),
            Self::Cascade { entity, id, source } => {
                write!(f, "cascade delete of {entity} {id} failed: {source}")
            }
            Self::ExternalService { id, source } => {
                write!(f, "experience award for {id} failed: {source}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Cascade { source, .. } => Some(source),
            Self::ExternalService { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

/// Maps a failed cascade delete, keeping `NotFound` distinct.
pub(crate) fn cascade_error(entity: EntityKind, id: Uuid, err: RepoError) -> ServiceError {
    match err {
        RepoError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
        source => ServiceError::Cascade { entity, id, source },
    }
}

/// Trims `value` and rejects blank names.
pub(crate) fn normalize_name(value: &str, field: &'static str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_string())
}

/// Returns `draft` with its name normalized under the wire `field` label.
pub(crate) fn normalize_draft(draft: &TodoDraft, field: &'static str) -> ServiceResult<TodoDraft> {
    Ok(TodoDraft {
        name: normalize_name(&draft.name, field)?,
        ..draft.clone()
    })
}

/// Runs `op`, logging its failure under `event` with the offending `id`.
pub(crate) fn logged<T>(
    module: &'static str,
    event: &'static str,
    id: impl Display,
    op: impl FnOnce() -> ServiceResult<T>,
) -> ServiceResult<T> {
    op().inspect_err(|err| log_failure(module, event, id, err))
}

/// Emits one failure event; caller-side misses log at `warn`, the rest at `error`.
pub(crate) fn log_failure(
    module: &'static str,
    event: &'static str,
    id: impl Display,
    err: &ServiceError,
) {
    match err {
        ServiceError::NotFound { .. } | ServiceError::Validation(_) => warn!(
            "event={event} module={module} status=error id={id} kind={} error={err}",
            err.kind()
        ),
        _ => error!(
            "event={event} module={module} status=error id={id} kind={} error={err}",
            err.kind()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{cascade_error, normalize_name, ServiceError};
    use crate::model::common::{EntityKind, TodoDraft};
    use crate::repo::RepoError;
    use uuid::Uuid;

    #[test]
    fn normalize_name_trims_and_rejects_blank() {
        assert_eq!(normalize_name("  Monday ", "dayName").unwrap(), "Monday");
        let err = normalize_name(" \t", "dayName").expect_err("blank must be rejected");
        assert!(matches!(err, ServiceError::Validation(message) if message.contains("dayName")));
    }

    #[test]
    fn cascade_error_keeps_not_found_distinct() {
        let id = Uuid::new_v4();
        let missing = cascade_error(
            EntityKind::Day,
            id,
            RepoError::NotFound {
                entity: EntityKind::Day,
                id,
            },
        );
        assert!(matches!(missing, ServiceError::NotFound { .. }));

        let failed = cascade_error(
            EntityKind::Day,
            id,
            RepoError::InvalidData("boom".to_string()),
        );
        assert_eq!(failed.kind(), "cascade_failure");
    }
}
