//! # Domain Errors
//!
//! Error types for the beacon storage core.
//!
//! The storage layer never logs a user-facing message or writes a response;
//! every failure is returned as a `StorageError` and mapped to a transport
//! code by the caller (see `adapters::api_handler`).

use crate::domain::codec::DecodeError;
use crate::domain::types::{ConfigError, EntityKind, VoteKind};
use beacon_types::{PostId, UserId};
use thiserror::Error;

/// Errors returned by the storage facade.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    /// Missing post, comment or user.
    #[error("{entity} not found: {reference}")]
    NotFound {
        entity: EntityKind,
        reference: String,
    },

    /// The user already holds this vote on the post.
    #[error("User {user_id} already cast a {kind} on post {post_id}")]
    AlreadyVoted {
        kind: VoteKind,
        post_id: PostId,
        user_id: UserId,
    },

    /// The user does not hold this vote on the post.
    #[error("User {user_id} has no {kind} on post {post_id}")]
    NotVoted {
        kind: VoteKind,
        post_id: PostId,
        user_id: UserId,
    },

    #[error("Username already taken: {username}")]
    UsernameExists { username: String },

    #[error("Email already registered: {email}")]
    EmailExists { email: String },

    /// A stored field under `key` could not be decoded.
    #[error("Malformed record at {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: DecodeError,
    },

    /// Connectivity failure or corruption detected in the store.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Authentication failed for user {user_id}")]
    AuthFailure { user_id: UserId },

    /// Coordinates outside [-90, 90] x [-180, 180] or not finite.
    #[error("Invalid location: ({latitude}, {longitude})")]
    InvalidLocation { latitude: f64, longitude: f64 },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl StorageError {
    pub fn not_found(entity: EntityKind, reference: impl std::fmt::Display) -> Self {
        StorageError::NotFound {
            entity,
            reference: reference.to_string(),
        }
    }

    pub fn corruption(message: impl Into<String>) -> Self {
        StorageError::Storage(message.into())
    }

    pub fn decode(key: impl Into<String>, source: DecodeError) -> Self {
        StorageError::Decode {
            key: key.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// Connectivity or I/O failure talking to the store.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// A command was applied to a key holding another value type.
    #[error("KV store wrong type at {key}: holds {found}")]
    WrongType { key: String, found: &'static str },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

impl From<KVStoreError> for StorageError {
    fn from(err: KVStoreError) -> Self {
        StorageError::Storage(err.to_string())
    }
}
