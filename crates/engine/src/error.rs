//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when an input field is malformed or out of range.
//! - [`KeyNotFound`] thrown when an item is missing or not owned by the caller.
//! - [`ExistingKey`] thrown when a unique key (e.g. a month) is already taken.
//! - [`Precondition`] thrown when an allocation is attempted without categories.
//! - [`InvalidCredentials`] thrown when a password check fails.
//! - [`PasswordHash`] thrown when bcrypt cannot hash a password.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Precondition`]: EngineError::Precondition
//!  [`InvalidCredentials`]: EngineError::InvalidCredentials
//!  [`PasswordHash`]: EngineError::PasswordHash
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("{0}")]
    Precondition(String),
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Maps a unique-constraint violation to [`EngineError::ExistingKey`],
    /// any other database error is kept as is.
    pub(crate) fn from_insert(err: DbErr, key: impl Into<String>) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::ExistingKey(key.into()),
            _ => Self::Database(err),
        }
    }

    /// Name of the offending field for validation errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Validation {
                    field: a,
                    reason: ra,
                },
                Self::Validation {
                    field: b,
                    reason: rb,
                },
            ) => a == b && ra == rb,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Precondition(a), Self::Precondition(b)) => a == b,
            (Self::InvalidCredentials(a), Self::InvalidCredentials(b)) => a == b,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
