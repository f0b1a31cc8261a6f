use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, instrument};
use users_sdk::{NewUser, PageRequest, User, UserPatch};
use uuid::Uuid;

use super::error::DomainError;
use super::fields::UserFields;
use super::repo::UsersRepository;

/// Configuration for the domain service, read from `modules.users.config`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub min_name_length: usize,
    pub max_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            min_name_length: 6,
            max_page_size: 100,
        }
    }
}

/// Domain service with the business rules for user management.
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    config: ServiceConfig,
}

impl Service {
    #[must_use]
    pub fn new(repo: Arc<dyn UsersRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    #[instrument(skip(self), fields(user_uuid = %uuid))]
    pub async fn get_user(&self, uuid: Uuid) -> Result<User, DomainError> {
        debug!("Getting user by uuid");
        self.repo.find(uuid).await?.ok_or_else(DomainError::not_found)
    }

    #[instrument(skip(self), fields(page = page.page, limit = page.limit))]
    pub async fn list_users(&self, page: PageRequest) -> Result<Vec<User>, DomainError> {
        self.validate_page(page)?;

        let users = self.repo.list(page.offset(), page.limit).await?;
        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    #[instrument(skip(self, new_user), fields(tg_id = new_user.tg_id))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        let mut violations = Vec::new();
        self.check_name(UserFields::FIRST_NAME, &new_user.first_name, &mut violations);
        self.check_name(UserFields::USER_NAME, &new_user.user_name, &mut violations);
        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        let user = self.repo.insert(new_user).await?;
        info!(user_uuid = %user.uuid, "Created user");
        Ok(user)
    }

    #[instrument(skip(self, patch), fields(user_uuid = %uuid))]
    pub async fn update_user(&self, uuid: Uuid, patch: UserPatch) -> Result<User, DomainError> {
        let mut violations = Vec::new();
        if let Some(ref first_name) = patch.first_name {
            self.check_name(UserFields::FIRST_NAME, first_name, &mut violations);
        }
        if let Some(ref user_name) = patch.user_name {
            self.check_name(UserFields::USER_NAME, user_name, &mut violations);
        }
        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        let user = self.repo.update(uuid, patch).await?;
        info!("Updated user");
        Ok(user)
    }

    #[instrument(skip(self), fields(user_uuid = %uuid))]
    pub async fn delete_user(&self, uuid: Uuid) -> Result<User, DomainError> {
        let user = self
            .repo
            .delete(uuid)
            .await?
            .ok_or_else(DomainError::not_found)?;
        info!("Deleted user");
        Ok(user)
    }

    fn check_name(&self, field: &str, value: &str, violations: &mut Vec<String>) {
        let min = self.config.min_name_length;
        if value.chars().count() < min {
            violations.push(format!(
                "{field} must be longer than or equal to {min} characters"
            ));
        }
    }

    fn validate_page(&self, page: PageRequest) -> Result<(), DomainError> {
        let mut violations = Vec::new();
        if page.page < 1 {
            violations.push(format!("{} must not be less than 1", UserFields::PAGE));
        }
        if page.limit < 1 {
            violations.push(format!("{} must not be less than 1", UserFields::LIMIT));
        } else if page.limit > self.config.max_page_size {
            violations.push(format!(
                "{} must not be greater than {}",
                UserFields::LIMIT,
                self.config.max_page_size
            ));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(violations))
        }
    }
}
