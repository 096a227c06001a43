//! Error types for vaultweave-core.
//!
//! `VaultError` covers configuration and invariant failures: bad shape
//! documents, invalid regexes, malformed inputs handed to the core.
//! Validation findings (shape violations, broken links, orphans) are data,
//! not errors; they are collected and reported by the validators.

use thiserror::Error;

pub type VaultResult<T> = Result<T, VaultError>;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl VaultError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        VaultError::InvalidArgument(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        VaultError::Serialization(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        VaultError::Invariant(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let e = VaultError::invalid_argument("bad shape");
        assert_eq!(e.to_string(), "invalid argument: bad shape");
    }
}
