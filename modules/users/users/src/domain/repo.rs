use async_trait::async_trait;
use users_sdk::{NewUser, User, UserPatch};
use uuid::Uuid;

use super::error::DomainError;

/// Storage port of the users domain.
///
/// Implementations assign `uuid`, `created_at` and `updated_at`, and report
/// storage failures as [`DomainError::Persistence`] where they can be classified.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find(&self, uuid: Uuid) -> Result<Option<User>, DomainError>;

    /// Newest first (`created_at` desc, ties by `uuid` desc).
    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<User>, DomainError>;

    async fn insert(&self, new_user: NewUser) -> Result<User, DomainError>;

    /// Apply `patch` and bump `updated_at`. A missing record is `RecordNotFound`.
    async fn update(&self, uuid: Uuid, patch: UserPatch) -> Result<User, DomainError>;

    /// Remove the record, returning it as it was before deletion.
    async fn delete(&self, uuid: Uuid) -> Result<Option<User>, DomainError>;
}
