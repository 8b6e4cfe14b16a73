/// Call-scoped collection of error and warning codes
///
/// Every entry point of the dispatcher and writer clears the sink before it
/// starts, so one instance can be reused serially across calls.
use crate::error::{ErrorCode, ImageError};
use std::fmt;

/// Severity of a recorded diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The operation produced output but the caller should inspect it
    Warning,
    /// The operation failed
    Error,
}

/// Tri-state result of a parse, check or write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Completed without diagnostics
    Success,
    /// Completed with at least one warning
    Warning,
    /// Failed
    Failure,
}

/// A single recorded diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Machine readable code
    pub code: ErrorCode,
    /// Human readable message
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

/// Diagnostics sink
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything recorded by a previous call
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Record a hard failure
    pub fn error(&mut self, err: &ImageError) {
        log::error!("{}", err);
        self.entries.push(Diagnostic {
            severity: Severity::Error,
            code: err.code(),
            message: err.to_string(),
        });
    }

    /// Record a warning
    pub fn warning<S: Into<String>>(&mut self, code: ErrorCode, message: S) {
        let message = message.into();
        log::warn!("{}", message);
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            code,
            message,
        });
    }

    /// Record the error of a failed result and pass the result through
    pub fn track<T>(&mut self, result: crate::Result<T>) -> crate::Result<T> {
        if let Err(err) = &result {
            self.error(err);
        }
        result
    }

    /// Get the tri-state outcome of everything recorded so far
    pub fn outcome(&self) -> Outcome {
        if self.entries.iter().any(|d| d.severity == Severity::Error) {
            Outcome::Failure
        } else if self.entries.is_empty() {
            Outcome::Success
        } else {
            Outcome::Warning
        }
    }

    /// Get the first recorded error, which is the one that stopped the call
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.entries.iter().find(|d| d.severity == Severity::Error)
    }

    /// Get all recorded codes in order
    pub fn codes(&self) -> Vec<ErrorCode> {
        self.entries.iter().map(|d| d.code).collect()
    }

    /// Iterate over recorded diagnostics
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Check whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_transitions() {
        let mut diag = Diagnostics::new();
        assert_eq!(diag.outcome(), Outcome::Success);

        diag.warning(ErrorCode::ManualGeometryRequired, "pick a geometry");
        assert_eq!(diag.outcome(), Outcome::Warning);

        diag.error(&ImageError::ImageTooSmall);
        assert_eq!(diag.outcome(), Outcome::Failure);
        assert_eq!(
            diag.codes(),
            vec![ErrorCode::ManualGeometryRequired, ErrorCode::ImageTooSmall]
        );
    }

    #[test]
    fn test_clear_resets() {
        let mut diag = Diagnostics::new();
        diag.error(&ImageError::NoDisk);
        diag.clear();
        assert!(diag.is_empty());
        assert!(diag.first_error().is_none());
    }

    #[test]
    fn test_track_records_errors_only() {
        let mut diag = Diagnostics::new();
        let ok: crate::Result<u8> = Ok(1);
        assert!(diag.track(ok).is_ok());
        assert!(diag.is_empty());

        let err: crate::Result<u8> = Err(ImageError::NoData);
        assert!(diag.track(err).is_err());
        assert_eq!(diag.first_error().map(|d| d.code), Some(ErrorCode::NoData));
    }
}
