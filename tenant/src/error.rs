//! Error types for the tenant context store.
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

/// Errors raised while reading the tenant context.
#[derive(Debug)]
pub struct Error {
    // Underlying error, when one exists
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    // Enum representing which category of error
    pub error_kind: TenantErrorKind,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum TenantErrorKind {
    // current() was called outside any bound tenant scope. Always fatal to
    // the operation; never silently tolerated.
    NoContextBound,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tenant Context Error: {:?}", self)
    }
}

impl StdError for Error {}
