//! Backend error types.

use thiserror::Error;

use nsprobe_core::ScanError;

/// Errors raised while preparing the NT backend.
#[derive(Debug, Error)]
pub enum NtError {
    /// A Win32 call failed while preparing the probing token.
    #[error("{operation} failed: {message}")]
    Token {
        operation: &'static str,
        message: String,
    },

    /// The object manager namespace is not available on this platform.
    #[error("The NT object namespace is only available on Windows")]
    Unsupported,
}

impl From<NtError> for ScanError {
    fn from(err: NtError) -> Self {
        match err {
            NtError::Unsupported => ScanError::Unsupported {
                message: NtError::Unsupported.to_string(),
            },
            other => ScanError::SecurityContext {
                message: other.to_string(),
            },
        }
    }
}
