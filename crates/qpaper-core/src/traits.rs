//! The generation-service boundary.
//!
//! Implemented over HTTP by `qpaper-client`; tests substitute in-memory
//! clients.

use async_trait::async_trait;

use crate::assembly::GenerationRequest;
use crate::error::ClientError;
use crate::filter::FilterQuery;
use crate::model::{CourseContext, Question};

/// Remote question bank and paper generation service.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Resolve the course a faculty member is assembling a paper for.
    ///
    /// Fails with [`ClientError::CourseAccessDenied`] when the session is
    /// not mapped to the course.
    async fn course_context(&self, course_id: &str) -> Result<CourseContext, ClientError>;

    /// Every candidate question for a course.
    async fn fetch_questions(&self, course_id: &str) -> Result<Vec<Question>, ClientError>;

    /// Candidate questions matching `query`, evaluated against the whole
    /// course question bank.
    async fn filter_questions(
        &self,
        course_id: &str,
        query: &FilterQuery,
    ) -> Result<Vec<Question>, ClientError>;

    /// Request the rendered paper. The body is always read as binary:
    /// success yields the document bytes, a rejection yields
    /// [`ClientError::Rejected`] with the raw body.
    async fn generate_paper(&self, request: &GenerationRequest) -> Result<Vec<u8>, ClientError>;
}
