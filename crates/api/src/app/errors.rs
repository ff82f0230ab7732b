use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use zambrano_core::DomainError;
use zambrano_infra::catalog_store::CatalogError;
use zambrano_infra::ledger::LedgerError;
use zambrano_infra::stock_service::MutationError;

use crate::app::services::CatalogCommandError;

/// The failure shape every endpoint shares: `{"ok": false, "error": ...}`.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "ok": false,
            "error": message.into(),
        })),
    )
        .into_response()
}

pub fn mutation_error_to_response(err: MutationError) -> axum::response::Response {
    match err {
        MutationError::NotFound => json_error(StatusCode::NOT_FOUND, "variant not found"),
        MutationError::InvalidQuantity(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        MutationError::Storage(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub fn catalog_command_error_to_response(err: CatalogCommandError) -> axum::response::Response {
    match err {
        CatalogCommandError::Domain(e) => domain_error_to_response(e),
        // A missing reference inside a command body is the caller's mistake,
        // not a missing route target.
        CatalogCommandError::Catalog(CatalogError::NotFound) => json_error(
            StatusCode::BAD_REQUEST,
            "referenced category or color does not exist",
        ),
        CatalogCommandError::Catalog(e) => catalog_error_to_response(e),
        CatalogCommandError::Ledger(e) => ledger_error_to_response(e),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
            json_error(StatusCode::BAD_REQUEST, msg)
        }
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, msg),
    }
}

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::NotFound => json_error(StatusCode::NOT_FOUND, "not found"),
        CatalogError::Conflict(msg) => json_error(StatusCode::CONFLICT, msg),
        CatalogError::Storage(msg) => json_error(StatusCode::INTERNAL_SERVER_ERROR, msg),
    }
}

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::NotFound => json_error(StatusCode::NOT_FOUND, "variant not found"),
        LedgerError::Conflict(msg) => json_error(StatusCode::CONFLICT, msg),
        LedgerError::Storage(msg) => json_error(StatusCode::INTERNAL_SERVER_ERROR, msg),
    }
}
