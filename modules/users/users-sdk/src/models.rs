//! Public models for the `users` module.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered Telegram account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uuid: Uuid,
    pub tg_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for registering a user. Identity and timestamps are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub tg_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub user_name: String,
}

/// Partial update data for a user. `None` leaves the field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserPatch {
    pub tg_id: Option<i64>,
    pub first_name: Option<String>,
    /// `Some(None)` clears the last name.
    pub last_name: Option<Option<String>>,
    pub user_name: Option<String>,
}

impl UserPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tg_id.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.user_name.is_none()
    }
}

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// 1-based offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Rows to skip: `(page - 1) * limit`, saturating.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}
