//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use sea_orm::error::DbErr;

/// Errors while executing operations related to entities.
/// The intent is to categorize errors into three major types:
///  * Errors related to data. Ex DbError::RecordNotFound
///  * Errors related to interactions with the database itself. Ex DbError::Conn
///  * Errors that threaten tenant isolation. These are never recovered with a
///    fallback; any fallback risks cross-tenant leakage.
#[derive(Debug)]
pub struct Error {
    // Underlying error emitted from seaORM internals or the tenant context
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum EntityApiErrorKind {
    // Invalid search term
    InvalidQueryTerm,
    // Record not found
    RecordNotFound,
    // Record not updated
    RecordNotUpdated,
    // No tenant context bound where one is required. Fatal to the operation;
    // the guard never falls back to an unfiltered query.
    NoContextBound,
    // Attempted tenant scoping of an entity that is not on the tenant-owned
    // allow-list. Programmer error, expected to be caught in testing.
    NotAllowlisted,
    // Errors related to interactions with the database itself. Ex DbError::Conn
    SystemError,
    // Other errors
    Other,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entity API Error: {:?}", self)
    }
}

impl StdError for Error {}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(_) => Error {
                source: Some(Box::new(err)),
                error_kind: EntityApiErrorKind::RecordNotFound,
            },
            DbErr::RecordNotUpdated => Error {
                source: Some(Box::new(err)),
                error_kind: EntityApiErrorKind::RecordNotUpdated,
            },
            DbErr::ConnectionAcquire(_) => Error {
                source: Some(Box::new(err)),
                error_kind: EntityApiErrorKind::SystemError,
            },
            DbErr::Conn(_) => Error {
                source: Some(Box::new(err)),
                error_kind: EntityApiErrorKind::SystemError,
            },
            DbErr::Exec(_) => Error {
                source: Some(Box::new(err)),
                error_kind: EntityApiErrorKind::SystemError,
            },
            _ => Error {
                source: Some(Box::new(err)),
                error_kind: EntityApiErrorKind::SystemError,
            },
        }
    }
}

impl From<tenant::Error> for Error {
    fn from(err: tenant::Error) -> Self {
        match err.error_kind {
            tenant::TenantErrorKind::NoContextBound => Error {
                source: Some(Box::new(err)),
                error_kind: EntityApiErrorKind::NoContextBound,
            },
        }
    }
}
