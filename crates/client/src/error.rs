use snafu::Snafu;

/// Guidance shown whenever the analysis service cannot be reached at all.
pub const UNREACHABLE_MESSAGE: &str = "Could not reach server. Make sure the API is running.";

/// Payload-free view of [`FetchError`] for callers that only branch on the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    Unreachable,
    ServerError,
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FetchError {
    /// No response was received: connection refused, DNS failure, TLS failure or timeout.
    #[snafu(display("server unreachable at {url} on `{stage}`: {message}"))]
    Unreachable {
        stage: &'static str,
        url: String,
        message: String,
    },
    /// A response arrived with a non-success status.
    #[snafu(display("server returned status {status} on `{stage}`{}", detail_suffix(detail)))]
    ServerError {
        stage: &'static str,
        status: u16,
        detail: Option<String>,
    },
    /// A success response arrived but its body does not match the expected shape.
    #[snafu(display("malformed response from {url} on `{stage}`: {details}"))]
    Malformed {
        stage: &'static str,
        url: String,
        details: String,
    },
}

pub type FetchResult<T> = Result<T, FetchError>;

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Unreachable { .. } => FetchErrorKind::Unreachable,
            Self::ServerError { .. } => FetchErrorKind::ServerError,
            Self::Malformed { .. } => FetchErrorKind::Malformed,
        }
    }

    /// HTTP status for server errors; `None` when no response was received
    /// or the success body was unusable.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError { status, .. } => Some(*status),
            Self::Unreachable { .. } | Self::Malformed { .. } => None,
        }
    }

    /// Message suitable for an error banner.
    ///
    /// The server-supplied `detail` wins for server errors. Everything else
    /// falls back to `fallback`, except transport failures which always get
    /// [`UNREACHABLE_MESSAGE`].
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Unreachable { .. } => UNREACHABLE_MESSAGE.to_string(),
            Self::ServerError {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            Self::ServerError { .. } | Self::Malformed { .. } => fallback.to_string(),
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_detail_is_preferred_over_fallback() {
        let error = FetchError::ServerError {
            stage: "test",
            status: 404,
            detail: Some("not found".to_string()),
        };
        assert_eq!(error.user_message("Failed to delete video"), "not found");
        assert_eq!(error.kind(), FetchErrorKind::ServerError);
        assert_eq!(error.status(), Some(404));
    }

    #[test]
    fn missing_or_blank_detail_uses_fallback() {
        let missing = FetchError::ServerError {
            stage: "test",
            status: 500,
            detail: None,
        };
        let blank = FetchError::ServerError {
            stage: "test",
            status: 500,
            detail: Some("   ".to_string()),
        };
        assert_eq!(missing.user_message("Server error."), "Server error.");
        assert_eq!(blank.user_message("Server error."), "Server error.");
    }

    #[test]
    fn unreachable_ignores_fallback() {
        let error = FetchError::Unreachable {
            stage: "test",
            url: "http://localhost:8000/images".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(error.user_message("Failed to fetch history"), UNREACHABLE_MESSAGE);
        assert_eq!(error.status(), None);
    }

    #[test]
    fn malformed_uses_fallback() {
        let error = FetchError::Malformed {
            stage: "test",
            url: "http://localhost:8000/image".to_string(),
            details: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(error.kind(), FetchErrorKind::Malformed);
        assert_eq!(error.user_message("Server error."), "Server error.");
    }
}
