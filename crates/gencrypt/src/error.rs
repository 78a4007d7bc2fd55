//! Error types for key generation, hybrid encryption and signatures

use std::io;

use thiserror::Error;

use crate::group::ObjectId;

/// Errors from gencrypt operations
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Group tag is malformed, unknown, or names a family without a backend
    #[error("invalid group: {group}")]
    InvalidGroup {
        /// The tag that failed to resolve
        group: ObjectId,
    },

    /// Stream header length prefix exceeds the allowed bound
    #[error("header too big: {len} bytes, limit is {max}")]
    HeaderTooBig {
        /// Length announced by the stream
        len: u32,
        /// Effective limit
        max: u32,
    },

    /// Ephemeral key in the stream belongs to a different group than the
    /// recipient's private key
    #[error("group mismatch: key is {expected}, stream is {actual}")]
    GroupMismatch {
        /// Group of the private key
        expected: ObjectId,
        /// Group announced by the stream header
        actual: ObjectId,
    },

    /// Key material is not a valid element of its group
    #[error("invalid key: {reason}")]
    InvalidKey {
        /// What was wrong with the key
        reason: String,
    },

    /// Structured encoding or decoding failed
    #[error("encoding error: {reason}")]
    Encoding {
        /// Underlying codec message
        reason: String,
    },

    /// Underlying reader or writer failed
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// Randomness source failed
    #[error("randomness source failed: {0}")]
    Random(#[from] rand::Error),
}

impl CryptoError {
    pub(crate) fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey { reason: reason.into() }
    }

    pub(crate) fn invalid_group(group: &ObjectId) -> Self {
        Self::InvalidGroup { group: group.clone() }
    }

    /// Returns true if the error was caused by malformed or hostile input
    ///
    /// Such errors never go away on retry. Failures of the underlying reader,
    /// writer or randomness source are environmental and may be transient.
    pub fn is_malformed_input(&self) -> bool {
        match self {
            Self::InvalidGroup { .. } => true,
            Self::HeaderTooBig { .. } => true,
            Self::GroupMismatch { .. } => true,
            Self::InvalidKey { .. } => true,
            Self::Encoding { .. } => true,

            Self::Io(_) => false,
            Self::Random(_) => false,
        }
    }
}

impl From<CryptoError> for io::Error {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Io(inner) => inner,
            CryptoError::HeaderTooBig { .. }
            | CryptoError::Encoding { .. }
            | CryptoError::InvalidKey { .. } => io::Error::new(io::ErrorKind::InvalidData, err),
            CryptoError::InvalidGroup { .. } | CryptoError::GroupMismatch { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            },
            CryptoError::Random(_) => io::Error::other(err),
        }
    }
}

/// Result alias for gencrypt operations
pub type Result<T> = std::result::Result<T, CryptoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_too_big_is_malformed_input() {
        let err = CryptoError::HeaderTooBig { len: u32::MAX, max: 1 << 20 };
        assert!(err.is_malformed_input());
    }

    #[test]
    fn io_error_is_not_malformed_input() {
        let err = CryptoError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert!(!err.is_malformed_input());
    }

    #[test]
    fn error_display() {
        let err = CryptoError::GroupMismatch {
            expected: ObjectId::new(vec![2, 256]),
            actual: ObjectId::new(vec![2, 384]),
        };
        assert_eq!(err.to_string(), "group mismatch: key is [2, 256], stream is [2, 384]");
    }

    #[test]
    fn converts_to_io_error_kind() {
        let err: io::Error = CryptoError::HeaderTooBig { len: 5, max: 4 }.into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let err: io::Error = CryptoError::invalid_group(&ObjectId::new(vec![9])).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let inner = io::Error::new(io::ErrorKind::UnexpectedEof, "short");
        let err: io::Error = CryptoError::Io(inner).into();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
