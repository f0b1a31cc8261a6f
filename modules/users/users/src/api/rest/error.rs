use tg_errors::{Failure, Message};

use crate::domain::error::DomainError;

/// Map a domain error to the failure handed to the classifier.
#[must_use]
pub fn domain_error_to_failure(e: DomainError) -> Failure {
    match e {
        DomainError::Validation(violations) => Failure::bad_request(Message::list(violations)),
        DomainError::Persistence(p) => Failure::Persistence(p),
        DomainError::Internal(source) => Failure::Unknown(source),
    }
}

impl From<DomainError> for Failure {
    fn from(e: DomainError) -> Self {
        domain_error_to_failure(e)
    }
}
