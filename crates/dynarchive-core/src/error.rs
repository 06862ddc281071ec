//! Error types for the table tools.

use dynarchive_model::{ErrorCode, TableOperation};

/// Every way a run can fail.
///
/// Configuration problems are reported before any request is sent. Remote
/// failures keep the service's own code and message.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Missing or inconsistent configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The service rejected a request.
    #[error("{operation} on table {table} failed: {code}: {message}")]
    Remote {
        /// The operation that failed.
        operation: TableOperation,
        /// The table the operation targeted.
        table: String,
        /// The error code reported by the service.
        code: ErrorCode,
        /// The error message reported by the service.
        message: String,
    },

    /// The service answered without the data the operation should carry.
    #[error("{operation} on table {table} returned no data")]
    MissingData {
        /// The operation that came back empty.
        operation: TableOperation,
        /// The table the operation targeted.
        table: String,
    },

    /// A line of an item stream could not be decoded.
    #[error("invalid item on line {line}: {message}")]
    Input {
        /// One-based line number.
        line: u64,
        /// What was wrong with the line.
        message: String,
    },

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An item or key could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArchiveError {
    /// Build a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Build a remote error from a service error code.
    pub fn remote(
        operation: TableOperation,
        table: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self::Remote {
            operation,
            table: table.into(),
            code,
            message: message.into(),
        }
    }

    /// Build a missing-data error.
    pub fn missing_data(operation: TableOperation, table: impl Into<String>) -> Self {
        Self::MissingData {
            operation,
            table: table.into(),
        }
    }

    /// The service error code, when the service rejected the request.
    #[must_use]
    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            Self::Remote { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether the service rejected the request for exceeding throughput.
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        self.code().is_some_and(ErrorCode::is_throttling)
    }
}

/// Convenience result type for the table tools.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_format_remote_error() {
        let err = ArchiveError::remote(
            TableOperation::PutItem,
            "Dest",
            ErrorCode::ValidationException,
            "bad item",
        );
        assert_eq!(
            err.to_string(),
            "PutItem on table Dest failed: ValidationException: bad item"
        );
        assert_eq!(err.code(), Some(&ErrorCode::ValidationException));
    }

    #[test]
    fn test_should_distinguish_missing_data() {
        let err = ArchiveError::missing_data(TableOperation::DescribeTable, "Src");
        assert_eq!(err.to_string(), "DescribeTable on table Src returned no data");
        assert!(err.code().is_none());
    }

    #[test]
    fn test_should_flag_throttled_requests() {
        let throttled = ArchiveError::remote(
            TableOperation::Scan,
            "Src",
            ErrorCode::ProvisionedThroughputExceededException,
            "slow down",
        );
        assert!(throttled.is_throttled());
        let limited = ArchiveError::remote(
            TableOperation::PutItem,
            "Dest",
            ErrorCode::RequestLimitExceeded,
            "slow down",
        );
        assert!(limited.is_throttled());
        assert!(!ArchiveError::config("bad").is_throttled());
        assert!(
            !ArchiveError::remote(TableOperation::Scan, "Src", ErrorCode::ValidationException, "x")
                .is_throttled()
        );
    }
}
