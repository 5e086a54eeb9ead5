use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use eoi_core::DomainError;
use eoi_infra::{RegistrationError, StoreError};

/// Status and machine-readable code for a store failure.
pub fn store_error_status(err: &StoreError) -> (StatusCode, &'static str) {
    match err {
        StoreError::ConstraintViolation(_) => (StatusCode::CONFLICT, "constraint_violation"),
        StoreError::Transaction(_) => (StatusCode::INTERNAL_SERVER_ERROR, "transaction_failure"),
        StoreError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable"),
    }
}

/// Status and code for a registration failure.
///
/// An unavailable store reports 503 whichever step it broke.
pub fn registration_error_status(err: &RegistrationError) -> (StatusCode, &'static str) {
    match err {
        RegistrationError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        RegistrationError::ConstraintViolation(_) => (StatusCode::CONFLICT, "constraint_violation"),
        RegistrationError::TransactionFailure(StoreError::Unavailable(_))
        | RegistrationError::Lookup(StoreError::Unavailable(_)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
        }
        RegistrationError::TransactionFailure(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "transaction_failure")
        }
        RegistrationError::Lookup(_) => (StatusCode::INTERNAL_SERVER_ERROR, "lookup_failure"),
    }
}

pub fn domain_error_status(err: &DomainError) -> (StatusCode, &'static str) {
    match err {
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        DomainError::InvalidId(_) => (StatusCode::BAD_REQUEST, "invalid_id"),
    }
}

pub fn registration_error_to_response(err: RegistrationError) -> axum::response::Response {
    let (status, code) = registration_error_status(&err);
    log_failure(status, code, &err);
    json_error(status, code, message_with_cause(&err))
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    let (status, code) = store_error_status(&err);
    log_failure(status, code, &err);
    json_error(status, code, err.to_string())
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let (status, code) = domain_error_status(&err);
    json_error(status, code, err.to_string())
}

/// Malformed or incomplete request bodies keep axum's status (400/415/422)
/// but use the uniform error body.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(rejection.status(), "invalid_body", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn not_found(what: impl core::fmt::Display) -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
}

/// `"outer: inner"` so the client sees the store's reason, not just the step.
pub fn message_with_cause(err: &RegistrationError) -> String {
    match err.store_error() {
        Some(cause) => format!("{err}: {cause}"),
        None => err.to_string(),
    }
}

/// Client errors are expected traffic; server errors are logged at error level.
pub fn log_failure(status: StatusCode, code: &'static str, err: &dyn std::error::Error) {
    if status.is_server_error() {
        match err.source() {
            Some(cause) => tracing::error!(code, error = %err, cause = %cause, "request failed"),
            None => tracing::error!(code, error = %err, "request failed"),
        }
    } else {
        tracing::warn!(code, error = %err, "request rejected");
    }
}
