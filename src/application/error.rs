use thiserror::Error;

use crate::domain::Role;

/// Errors crossing the service boundary. Repository failures are logged
/// with full detail where they happen; callers only ever see the coarse
/// `Storage` class.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No signed-in user")]
    Unauthorized,

    #[error("Role {role} may not {action}")]
    Forbidden { role: Role, action: &'static str },

    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("{0} already exists: {1}")]
    AlreadyExists(&'static str, String),

    #[error("Database already staffed; an admin must add further users")]
    AlreadyStaffed,

    #[error("Storage operation failed: {0}")]
    Storage(#[from] anyhow::Error),
}
