use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::auth::TokenError;
use crate::middleware::trace_id;
use crate::profile::StoreError;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("UnauthorizedMissingBearer")]
    UnauthorizedMissingBearer,
    #[error("UnauthorizedExpiredToken")]
    UnauthorizedExpiredToken,
    #[error("UnauthorizedInvalidToken: {0}")]
    UnauthorizedInvalidToken(TokenError),
    #[error("Forbidden")]
    Forbidden,
    #[error("Not found: {detail}")]
    NotFound { code: &'static str, detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: &'static str, detail: String },
    #[error("Store error: {detail}")]
    Store { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            AppError::UnauthorizedExpiredToken => "UNAUTHORIZED_EXPIRED_TOKEN",
            AppError::UnauthorizedInvalidToken(_) => "UNAUTHORIZED_INVALID_TOKEN",
            AppError::Forbidden => "FORBIDDEN",
            AppError::NotFound { code, .. } => *code,
            AppError::BadRequest { code, .. } => *code,
            AppError::Store { .. } => "STORE_ERROR",
            AppError::Internal { .. } => "INTERNAL",
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::UnauthorizedMissingBearer => "Missing or malformed Bearer token".to_string(),
            AppError::UnauthorizedExpiredToken => "Token expired".to_string(),
            AppError::UnauthorizedInvalidToken(TokenError::MissingSubjectClaim) => {
                "Token missing subject claim".to_string()
            }
            AppError::UnauthorizedInvalidToken(_) => "Invalid token".to_string(),
            AppError::Forbidden => "Access denied".to_string(),
            AppError::NotFound { detail, .. } => detail.clone(),
            AppError::BadRequest { detail, .. } => detail.clone(),
            // Store and internal failures keep their details in the logs only.
            AppError::Store { .. } => "Profile storage failed".to_string(),
            AppError::Internal { .. } => "Internal server error".to_string(),
        }
    }

    pub fn not_found(code: &'static str, detail: String) -> Self {
        Self::NotFound { code, detail }
    }

    pub fn bad_request(code: &'static str, detail: String) -> Self {
        Self::BadRequest { code, detail }
    }

    pub fn internal(detail: String) -> Self {
        Self::Internal { detail }
    }

    pub fn to_problem(&self, trace_id: String) -> ProblemDetails {
        let code = self.code();
        ProblemDetails {
            type_: format!(
                "https://profiles.example/errors/{}",
                code.to_ascii_lowercase().replace('_', "-")
            ),
            title: humanize_code(code),
            status: self.status_code().as_u16(),
            detail: self.detail(),
            code: code.to_string(),
            trace_id,
        }
    }

    fn log(&self) {
        match self {
            AppError::Store { detail } | AppError::Internal { detail } => {
                tracing::error!(code = self.code(), %detail, "request failed");
            }
            _ => tracing::debug!(code = self.code(), "request rejected"),
        }
    }
}

fn humanize_code(code: &str) -> String {
    code.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnauthorizedMissingBearer
            | AppError::UnauthorizedExpiredToken
            | AppError::UnauthorizedInvalidToken(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Store { .. } | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();
        HttpResponse::build(self.status_code()).json(self.to_problem(trace_id()))
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::ExpiredToken { .. } => AppError::UnauthorizedExpiredToken,
            other => AppError::UnauthorizedInvalidToken(other),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => {
                AppError::not_found("PROFILE_NOT_FOUND", "Profile not found".to_string())
            }
            other => AppError::Store {
                detail: other.to_string(),
            },
        }
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::internal(format!("blocking task failed: {e}"))
    }
}
