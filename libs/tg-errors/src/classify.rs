//! Pure mapping from a [`Failure`] to `{status, message, error}`.

use http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::failure::{ClientFailure, Failure, Message, PersistenceCode, PersistenceFailure};

/// Error label used for every storage-layer failure.
pub const DATABASE_ERROR: &str = "Database Error";

/// Message returned for unclassified failures. Nothing else leaks.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Error label returned for unclassified failures.
pub const INTERNAL_LABEL: &str = "Internal Server Error";

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

fn deserialize_status_code<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
where
    D: Deserializer<'de>,
{
    let code = u16::deserialize(deserializer)?;
    StatusCode::from_u16(code).map_err(serde::de::Error::custom)
}

/// Tunable parts of the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierPolicy {
    /// Status used for storage codes without a dedicated rule.
    #[serde(
        serialize_with = "serialize_status_code",
        deserialize_with = "deserialize_status_code"
    )]
    pub unrecognized_db_status: StatusCode,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            unrecognized_db_status: StatusCode::BAD_REQUEST,
        }
    }
}

/// Outcome of classifying one failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: StatusCode,
    pub message: Message,
    pub error: String,
}

fn reason_phrase(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_owned(), ToOwned::to_owned)
}

/// Classify a failure. Total and side-effect free.
#[must_use]
pub fn classify(failure: &Failure, policy: &ClassifierPolicy) -> Classification {
    match failure {
        Failure::Client(client) => classify_client(client),
        Failure::Persistence(persistence) => classify_persistence(persistence, policy),
        Failure::Unknown(_) => Classification {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: Message::Text(INTERNAL_MESSAGE.to_owned()),
            error: INTERNAL_LABEL.to_owned(),
        },
    }
}

fn classify_client(client: &ClientFailure) -> Classification {
    let phrase = reason_phrase(client.status);
    Classification {
        status: client.status,
        message: client
            .message
            .clone()
            .unwrap_or_else(|| Message::Text(phrase.clone())),
        error: client.error.clone().unwrap_or(phrase),
    }
}

fn classify_persistence(p: &PersistenceFailure, policy: &ClassifierPolicy) -> Classification {
    let (status, message) = match &p.code {
        PersistenceCode::UniqueViolation => (
            StatusCode::CONFLICT,
            format!("Unique constraint failed on: {}", p.meta.target.join(",")),
        ),
        PersistenceCode::RecordNotFound => (StatusCode::NOT_FOUND, "Record not found".to_owned()),
        PersistenceCode::Vendor(code) => (
            policy.unrecognized_db_status,
            format!("Database error: {code}"),
        ),
    };
    Classification {
        status,
        message: Message::Text(message),
        error: DATABASE_ERROR.to_owned(),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn text(c: &Classification) -> String {
        c.message.to_string()
    }

    #[test]
    fn client_failure_passes_status_and_message_through() {
        let f = Failure::client(StatusCode::FORBIDDEN, "nope").with_error_label("Forbidden Zone");
        let c = classify(&f, &ClassifierPolicy::default());
        assert_eq!(c.status, StatusCode::FORBIDDEN);
        assert_eq!(text(&c), "nope");
        assert_eq!(c.error, "Forbidden Zone");
    }

    #[test]
    fn client_failure_falls_back_to_reason_phrase() {
        let f = Failure::status(StatusCode::UNPROCESSABLE_ENTITY);
        let c = classify(&f, &ClassifierPolicy::default());
        assert_eq!(c.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(text(&c), "Unprocessable Entity");
        assert_eq!(c.error, "Unprocessable Entity");
    }

    #[test]
    fn client_failure_keeps_structured_message() {
        let f = Failure::bad_request(Message::list(["firstName too short"]));
        let c = classify(&f, &ClassifierPolicy::default());
        assert_eq!(c.message, Message::list(["firstName too short"]));
        assert_eq!(c.error, "Bad Request");
    }

    #[test]
    fn unique_violation_names_fields() {
        let f = Failure::from(PersistenceFailure::unique_violation(["tgId", "userName"]));
        let c = classify(&f, &ClassifierPolicy::default());
        assert_eq!(c.status, StatusCode::CONFLICT);
        assert_eq!(text(&c), "Unique constraint failed on: tgId,userName");
        assert_eq!(c.error, DATABASE_ERROR);
    }

    #[test]
    fn record_not_found_is_404() {
        let f = Failure::from(PersistenceFailure::record_not_found());
        let c = classify(&f, &ClassifierPolicy::default());
        assert_eq!(c.status, StatusCode::NOT_FOUND);
        assert_eq!(text(&c), "Record not found");
        assert_eq!(c.error, DATABASE_ERROR);
    }

    #[test]
    fn vendor_code_uses_policy_status() {
        let f = Failure::from(PersistenceFailure::vendor("23503"));

        let c = classify(&f, &ClassifierPolicy::default());
        assert_eq!(c.status, StatusCode::BAD_REQUEST);
        assert_eq!(text(&c), "Database error: 23503");

        let strict = ClassifierPolicy {
            unrecognized_db_status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert_eq!(
            classify(&f, &strict).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unknown_failure_is_opaque() {
        let f = Failure::unknown(anyhow::anyhow!("password=hunter2 leaked"));
        let c = classify(&f, &ClassifierPolicy::default());
        assert_eq!(c.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(text(&c), INTERNAL_MESSAGE);
        assert_eq!(c.error, INTERNAL_LABEL);
    }

    #[test]
    fn classification_is_idempotent() {
        let policy = ClassifierPolicy::default();
        let failures = [
            Failure::bad_request("x"),
            Failure::from(PersistenceFailure::unique_violation(["tgId"])),
            Failure::unknown(anyhow::anyhow!("boom")),
        ];
        for f in &failures {
            assert_eq!(classify(f, &policy), classify(f, &policy));
        }
    }

    #[test]
    fn policy_status_deserializes_from_u16() {
        let p: ClassifierPolicy =
            serde_json::from_str(r#"{"unrecognized_db_status":500}"#).unwrap();
        assert_eq!(p.unrecognized_db_status, StatusCode::INTERNAL_SERVER_ERROR);

        let p: ClassifierPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(p, ClassifierPolicy::default());

        assert!(serde_json::from_str::<ClassifierPolicy>(r#"{"unrecognized_db_status":42}"#).is_err());
    }
}
