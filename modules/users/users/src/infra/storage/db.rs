//! Translation of storage errors into domain failures.

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use tg_errors::PersistenceFailure;

use crate::domain::error::DomainError;
use crate::domain::fields::UserFields;

const TABLE_PREFIX: &str = "users";

/// Map a `DbErr` to a domain error.
///
/// Unique violations keep the colliding fields (public names), missing rows
/// become `RecordNotFound`, other driver errors keep their vendor code, and
/// everything else (pool, connection, decoding) is left unclassified.
#[must_use]
pub fn db_err(err: DbErr) -> DomainError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => {
            return PersistenceFailure::unique_violation(unique_target(&message)).into();
        }
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            let code = vendor_code(&err).unwrap_or_else(|| "foreign_key_violation".to_owned());
            return PersistenceFailure::vendor(code).into();
        }
        _ => {}
    }

    match err {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => DomainError::not_found(),
        other => match vendor_code(&other) {
            Some(code) => PersistenceFailure::vendor(code).into(),
            None => DomainError::Internal(anyhow::Error::new(other).context("database operation failed")),
        },
    }
}

fn vendor_code(err: &DbErr) -> Option<String> {
    let (DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e))) = err
    else {
        return None;
    };
    e.as_database_error()
        .and_then(|db| db.code())
        .map(std::borrow::Cow::into_owned)
}

/// Extract the public field names from a unique-violation message.
///
/// Understands the SQLite form (`UNIQUE constraint failed: users.tg_id, users.user_name`)
/// and the Postgres form (`duplicate key value violates unique constraint "users_tg_id_key"`).
pub(crate) fn unique_target(message: &str) -> Vec<String> {
    if let Some((_, columns)) = message.split_once("UNIQUE constraint failed:") {
        return columns
            .split(',')
            .map(|c| {
                let c = c.trim();
                let column = c.rsplit_once('.').map_or(c, |(_, col)| col);
                UserFields::from_column(column).to_owned()
            })
            .filter(|c| !c.is_empty())
            .collect();
    }

    if let Some(constraint) = message.split('"').nth(1) {
        let column = constraint
            .strip_prefix(TABLE_PREFIX)
            .and_then(|c| c.strip_prefix('_'))
            .unwrap_or(constraint);
        if column == "pkey" {
            return vec![UserFields::UUID.to_owned()];
        }
        let column = column
            .strip_suffix("_key")
            .or_else(|| column.strip_suffix("_idx"))
            .unwrap_or(column);
        return vec![UserFields::from_column(column).to_owned()];
    }

    Vec::new()
}
