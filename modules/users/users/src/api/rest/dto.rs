use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tg_errors::{Failure, Message};
use users_sdk::{NewUser, PageRequest, User, UserPatch};
use users_sdk::models::{DEFAULT_LIMIT, DEFAULT_PAGE};
use uuid::Uuid;

use crate::domain::fields::UserFields;

const NUMERIC_EXPECTED: &str = "Validation failed (numeric string is expected)";

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_millis<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Request body for `POST /users`. Unknown fields are ignored.
///
/// Fields are captured as raw JSON so that every type violation is reported
/// at once by [`CreateUserReq::into_new_user`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserReq {
    #[serde(default, deserialize_with = "present")]
    pub tg_id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub first_name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub last_name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub user_name: Option<Value>,
}

/// Request body for `PUT /users/{uuid}`. Every field is optional; an explicit
/// `null` clears `lastName` and leaves the other fields untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserReq {
    #[serde(default, deserialize_with = "present")]
    pub tg_id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub first_name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub last_name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub user_name: Option<Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)`; absent fields stay `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn integer(field: &str, value: &Value, violations: &mut Vec<String>) -> Option<i64> {
    let parsed = value.as_i64();
    if parsed.is_none() {
        violations.push(format!("{field} must be an integer number"));
    }
    parsed
}

fn string(field: &str, value: &Value, violations: &mut Vec<String>) -> Option<String> {
    if let Value::String(s) = value {
        Some(s.clone())
    } else {
        violations.push(format!("{field} must be a string"));
        None
    }
}

fn rejected(violations: Vec<String>) -> Failure {
    Failure::bad_request(Message::list(violations))
}

impl CreateUserReq {
    /// Check field types and build the domain input.
    ///
    /// # Errors
    /// Returns a 400 failure listing every missing or mistyped field.
    pub fn into_new_user(self) -> Result<NewUser, Failure> {
        let mut violations = Vec::new();
        let null = Value::Null;

        let tg_id = integer(UserFields::TG_ID, self.tg_id.as_ref().unwrap_or(&null), &mut violations);
        let first_name = string(
            UserFields::FIRST_NAME,
            self.first_name.as_ref().unwrap_or(&null),
            &mut violations,
        );
        let last_name = match self.last_name {
            None | Some(Value::Null) => None,
            Some(ref v) => string(UserFields::LAST_NAME, v, &mut violations),
        };
        let user_name = string(
            UserFields::USER_NAME,
            self.user_name.as_ref().unwrap_or(&null),
            &mut violations,
        );

        match (tg_id, first_name, user_name) {
            (Some(tg_id), Some(first_name), Some(user_name)) if violations.is_empty() => Ok(NewUser {
                tg_id,
                first_name,
                last_name,
                user_name,
            }),
            _ => Err(rejected(violations)),
        }
    }
}

impl UpdateUserReq {
    /// Check field types and build the patch.
    ///
    /// # Errors
    /// Returns a 400 failure listing every mistyped field.
    pub fn into_patch(self) -> Result<UserPatch, Failure> {
        let mut violations = Vec::new();

        let tg_id = match self.tg_id {
            None | Some(Value::Null) => None,
            Some(ref v) => integer(UserFields::TG_ID, v, &mut violations),
        };
        let first_name = match self.first_name {
            None | Some(Value::Null) => None,
            Some(ref v) => string(UserFields::FIRST_NAME, v, &mut violations),
        };
        let last_name = match self.last_name {
            None => None,
            Some(Value::Null) => Some(None),
            Some(ref v) => string(UserFields::LAST_NAME, v, &mut violations).map(Some),
        };
        let user_name = match self.user_name {
            None | Some(Value::Null) => None,
            Some(ref v) => string(UserFields::USER_NAME, v, &mut violations),
        };

        if !violations.is_empty() {
            return Err(rejected(violations));
        }
        Ok(UserPatch {
            tg_id,
            first_name,
            last_name,
            user_name,
        })
    }
}

/// Full view, returned by get-one and delete.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub uuid: Uuid,
    pub tg_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub user_name: String,
    #[serde(serialize_with = "serialize_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_millis")]
    pub updated_at: DateTime<Utc>,
}

/// Public view without timestamps, returned by create and update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserDto {
    pub uuid: Uuid,
    pub tg_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub user_name: String,
}

/// Listed view without timestamps and `tgId`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedUserDto {
    pub uuid: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub user_name: String,
}

/// Raw `page`/`limit` query values, parsed by [`ListUsersQuery::page_request`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn parse_count(raw: Option<&str>, default: u64) -> Result<u64, Failure> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| Failure::bad_request(NUMERIC_EXPECTED))?;
    // Negative values fail the `>= 1` rule downstream.
    Ok(u64::try_from(value).unwrap_or(0))
}

impl ListUsersQuery {
    /// Defaults are page 1, limit 10.
    ///
    /// # Errors
    /// Returns a 400 failure if a value is not an integer.
    pub fn page_request(&self) -> Result<PageRequest, Failure> {
        Ok(PageRequest {
            page: parse_count(self.page.as_deref(), DEFAULT_PAGE)?,
            limit: parse_count(self.limit.as_deref(), DEFAULT_LIMIT)?,
        })
    }
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            uuid: u.uuid,
            tg_id: u.tg_id,
            first_name: u.first_name,
            last_name: u.last_name,
            user_name: u.user_name,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

impl From<User> for PublicUserDto {
    fn from(u: User) -> Self {
        Self {
            uuid: u.uuid,
            tg_id: u.tg_id,
            first_name: u.first_name,
            last_name: u.last_name,
            user_name: u.user_name,
        }
    }
}

impl From<User> for ListedUserDto {
    fn from(u: User) -> Self {
        Self {
            uuid: u.uuid,
            first_name: u.first_name,
            last_name: u.last_name,
            user_name: u.user_name,
        }
    }
}
