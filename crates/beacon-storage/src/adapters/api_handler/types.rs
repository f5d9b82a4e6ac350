//! # API Handler Types
//!
//! Response envelope, caller credentials and the client-facing error table.

use crate::domain::errors::StorageError;
use crate::domain::types::EntityKind;
use beacon_types::{ErrorMsg, UserId};

/// Client-facing error codes. Each maps to a fixed HTTP status and a
/// generic message; the underlying cause is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ProtocolError,
    JsonError,
    DatabaseError,
    ServerError,
    ExternalServiceError,
    NoAccountFound,
    UsernameExists,
    UnspecifiedError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 8] = [
        ErrorCode::ProtocolError,
        ErrorCode::JsonError,
        ErrorCode::DatabaseError,
        ErrorCode::ServerError,
        ErrorCode::ExternalServiceError,
        ErrorCode::NoAccountFound,
        ErrorCode::UsernameExists,
        ErrorCode::UnspecifiedError,
    ];

    /// The numeric code sent in `ErrorMsg::code`.
    pub const fn code(&self) -> u16 {
        match self {
            ErrorCode::ProtocolError => 31,
            ErrorCode::JsonError => 32,
            ErrorCode::DatabaseError => 40,
            ErrorCode::ServerError => 41,
            ErrorCode::ExternalServiceError => 42,
            ErrorCode::NoAccountFound => 50,
            ErrorCode::UsernameExists => 51,
            ErrorCode::UnspecifiedError => 99,
        }
    }

    pub const fn http_status(&self) -> u16 {
        match self {
            ErrorCode::DatabaseError | ErrorCode::ServerError | ErrorCode::UnspecifiedError => 500,
            _ => 400,
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::ProtocolError => "Protocol error.",
            ErrorCode::JsonError => "Json error.",
            ErrorCode::DatabaseError => "Database error.",
            ErrorCode::ServerError => "Server error.",
            ErrorCode::ExternalServiceError => "External service error.",
            ErrorCode::NoAccountFound => "No account found.",
            ErrorCode::UsernameExists => "Username already exists.",
            ErrorCode::UnspecifiedError => "Unspecified error.",
        }
    }

    /// Unknown codes fall back to `UnspecifiedError`.
    pub fn from_code(code: u16) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .unwrap_or(ErrorCode::UnspecifiedError)
    }

    pub fn to_msg(self) -> ErrorMsg {
        ErrorMsg {
            code: self.code(),
            error: self.message().to_string(),
        }
    }
}

/// Classify a storage failure for the client.
pub fn error_code_for(err: &StorageError) -> ErrorCode {
    match err {
        StorageError::NotFound {
            entity: EntityKind::User,
            ..
        } => ErrorCode::NoAccountFound,
        StorageError::UsernameExists { .. } => ErrorCode::UsernameExists,
        StorageError::NotFound { .. }
        | StorageError::AlreadyVoted { .. }
        | StorageError::NotVoted { .. }
        | StorageError::EmailExists { .. }
        | StorageError::AuthFailure { .. }
        | StorageError::InvalidLocation { .. } => ErrorCode::ProtocolError,
        StorageError::Decode { .. } | StorageError::Storage(_) => ErrorCode::DatabaseError,
        StorageError::Config(_) => ErrorCode::ServerError,
    }
}

/// Basic-auth style caller identity: user ID plus bearer secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: UserId,
    pub secret: Vec<u8>,
}

impl Credentials {
    pub fn new(user_id: UserId, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            user_id,
            secret: secret.into(),
        }
    }
}

/// Status plus JSON body, ready for the HTTP layer to write out.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub fn ok(body: serde_json::Value) -> Self {
        Self { status: 200, body }
    }

    /// 200 with an empty body.
    pub fn empty() -> Self {
        Self::ok(serde_json::Value::Null)
    }

    pub fn error(code: ErrorCode) -> Self {
        Self {
            status: code.http_status(),
            body: serde_json::to_value(code.to_msg()).unwrap_or_default(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// The error code carried in the body, if this is an error response.
    pub fn error_code(&self) -> Option<ErrorCode> {
        if self.is_success() {
            return None;
        }
        self.body
            .get("code")
            .and_then(|c| c.as_u64())
            .map(|c| u16::try_from(c).map_or(ErrorCode::UnspecifiedError, ErrorCode::from_code))
    }
}
