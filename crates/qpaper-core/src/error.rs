//! Error types for the generation-service boundary and the assembly core.
//!
//! `ClientError` lives here rather than in `qpaper-client` so that the pool
//! and the assembly can classify failures without string matching.

use thiserror::Error;

/// Errors that can occur when talking to the generation service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service rejected the session token (HTTP 401/403).
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// The faculty member is not mapped to the requested course.
    #[error("no access to course {0}")]
    CourseAccessDenied(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service answered with a non-success status.
    ///
    /// The body is kept as raw bytes: generation responses are requested as
    /// binary, so a JSON error document arrives encoded in the same channel.
    #[error("service rejected the request (HTTP {status})")]
    Rejected { status: u16, body: Vec<u8> },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The service could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// A success response could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Returns `true` when no response from the service was reachable.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Timeout(_) | ClientError::Network(_))
    }

    /// Best-effort human-readable text for a failure.
    ///
    /// For `Rejected` this decodes the body and pulls out its `error` or
    /// `detail` field when present.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Rejected { status, body } => {
                crate::assembly::decode_error_payload(body)
                    .unwrap_or_else(|| format!("request failed with HTTP {status}"))
            }
            other => other.to_string(),
        }
    }
}

/// Failures surfaced by [`QuestionPool`](crate::pool::QuestionPool).
#[derive(Debug, Error)]
pub enum PoolError {
    /// Loading or filtering the question bank failed. The filtered view
    /// keeps its previous contents.
    #[error("failed to fetch questions: {0}")]
    FetchFailed(String),
}

impl From<ClientError> for PoolError {
    fn from(err: ClientError) -> Self {
        PoolError::FetchFailed(err.user_message())
    }
}

/// Failures surfaced by [`PaperAssembly`](crate::assembly::PaperAssembly)
/// and [`AssemblySession`](crate::session::AssemblySession).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    /// Nothing is selected in either part. No request was sent.
    #[error("Please select at least one question")]
    EmptySelection,

    /// The generation service rejected the assembled paper.
    #[error("{0}")]
    ValidationFailed(String),

    /// The generation service could not be reached or answered unreadably.
    #[error("{0}")]
    TransportFailed(String),

    /// The session may not assemble papers for this course.
    #[error("access denied: {0}")]
    AccessDenied(String),
}
