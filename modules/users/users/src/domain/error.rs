use tg_errors::PersistenceFailure;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// One or more input rules were violated. Every violation is kept.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("persistence failure ({})", .0.code)]
    Persistence(PersistenceFailure),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    #[must_use]
    pub fn not_found() -> Self {
        Self::Persistence(PersistenceFailure::record_not_found())
    }

    #[must_use]
    pub fn validation(violations: impl IntoIterator<Item = String>) -> Self {
        Self::Validation(violations.into_iter().collect())
    }
}

impl From<PersistenceFailure> for DomainError {
    fn from(value: PersistenceFailure) -> Self {
        Self::Persistence(value)
    }
}
