//! Mock generation client for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use qpaper_core::assembly::GenerationRequest;
use qpaper_core::error::ClientError;
use qpaper_core::filter::FilterQuery;
use qpaper_core::model::{CourseContext, Question};
use qpaper_core::traits::GenerationClient;

/// How the mock answers generation requests.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Success with these document bytes.
    Document(Vec<u8>),
    /// Non-success status with this raw body.
    Rejected { status: u16, body: Vec<u8> },
    /// No response reachable.
    Unreachable,
}

/// An in-memory question bank and generation service.
///
/// Filters are evaluated locally with [`FilterQuery::matches`], so the mock
/// behaves like the real service for pool tests.
pub struct MockGenerationClient {
    course: CourseContext,
    questions: Vec<Question>,
    reply: Mutex<MockReply>,
    fetch_calls: AtomicU32,
    filter_calls: AtomicU32,
    generate_calls: AtomicU32,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockGenerationClient {
    /// A mock serving `questions` for `course` and returning a small
    /// placeholder document.
    pub fn new(course: CourseContext, questions: Vec<Question>) -> Self {
        Self {
            course,
            questions,
            reply: Mutex::new(MockReply::Document(b"PK\x03\x04mock".to_vec())),
            fetch_calls: AtomicU32::new(0),
            filter_calls: AtomicU32::new(0),
            generate_calls: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Change how generation requests are answered.
    pub fn set_reply(&self, reply: MockReply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    pub fn filter_calls(&self) -> u32 {
        self.filter_calls.load(Ordering::Relaxed)
    }

    pub fn generate_calls(&self) -> u32 {
        self.generate_calls.load(Ordering::Relaxed)
    }

    /// The last generation request received.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }

    fn check_course(&self, course_id: &str) -> Result<(), ClientError> {
        if course_id == self.course.course_id {
            Ok(())
        } else {
            Err(ClientError::CourseAccessDenied(course_id.to_string()))
        }
    }
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    async fn course_context(&self, course_id: &str) -> Result<CourseContext, ClientError> {
        self.check_course(course_id)?;
        Ok(self.course.clone())
    }

    async fn fetch_questions(&self, course_id: &str) -> Result<Vec<Question>, ClientError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        self.check_course(course_id)?;
        Ok(self.questions.clone())
    }

    async fn filter_questions(
        &self,
        course_id: &str,
        query: &FilterQuery,
    ) -> Result<Vec<Question>, ClientError> {
        self.filter_calls.fetch_add(1, Ordering::Relaxed);
        self.check_course(course_id)?;
        Ok(self
            .questions
            .iter()
            .filter(|q| query.matches(q))
            .cloned()
            .collect())
    }

    async fn generate_paper(&self, request: &GenerationRequest) -> Result<Vec<u8>, ClientError> {
        self.generate_calls.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match self.reply.lock().unwrap().clone() {
            MockReply::Document(bytes) => Ok(bytes),
            MockReply::Rejected { status, body } => Err(ClientError::Rejected { status, body }),
            MockReply::Unreachable => Err(ClientError::Network("connection refused".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qpaper_core::filter::FilterCriteria;
    use qpaper_core::model::QuestionId;

    fn course() -> CourseContext {
        CourseContext {
            course_id: "CS301".into(),
            course_code: "CS301".into(),
            course_title: "Operating Systems".into(),
        }
    }

    fn question(id: i64, marks: u32) -> Question {
        serde_json::from_value(serde_json::json!({
            "id": id, "text": format!("Question {id}"), "unit_id": 1, "co": "CO1", "bt": "L2", "marks": marks
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn filters_locally() {
        let mock = MockGenerationClient::new(course(), vec![question(1, 2), question(2, 10)]);
        let query = FilterCriteria::default().with_marks("10").normalize();

        let result = mock.filter_questions("CS301", &query).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, QuestionId::new(2));
        assert_eq!(mock.filter_calls(), 1);
    }

    #[tokio::test]
    async fn unknown_course_is_denied() {
        let mock = MockGenerationClient::new(course(), vec![]);
        let err = mock.fetch_questions("EE101").await.unwrap_err();
        assert!(matches!(err, ClientError::CourseAccessDenied(_)));
    }

    #[tokio::test]
    async fn configurable_generation_reply() {
        let mock = MockGenerationClient::new(course(), vec![]);
        mock.set_reply(MockReply::Rejected {
            status: 400,
            body: b"{}".to_vec(),
        });

        let request: GenerationRequest = serde_json::from_value(serde_json::json!({
            "course_id": "CS301", "course_code": "CS301", "course_title": "OS",
            "selected_questions": {"part_a": [1], "part_b": []},
            "exam_type": "CIE", "date": "2026-11-02", "max_marks": 20,
            "duration": "1 hour", "semester": "V"
        }))
        .unwrap();

        let err = mock.generate_paper(&request).await.unwrap_err();
        assert!(matches!(err, ClientError::Rejected { status: 400, .. }));
        assert_eq!(mock.generate_calls(), 1);
        assert_eq!(mock.last_request().unwrap().max_marks, Some(20));
    }
}
