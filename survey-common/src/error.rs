//! Common error types for the survey service

use thiserror::Error;

use crate::assembly::AssemblyError;

/// Common result type for survey operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the survey crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unknown username or wrong password; the two cases are deliberately indistinguishable
    #[error("Login failed. Incorrect username and/or password")]
    LoginFailed,

    /// Password hashing failed, or the hashing task did not finish
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// Answers handed to storage do not line up with the survey's questions
    #[error("Answers do not match survey: {0}")]
    AnswerMismatch(String),

    /// Stored answers could not be mapped back onto their survey
    #[error("Reply reconstruction failed: {0}")]
    Assembly(#[from] AssemblyError),
}
