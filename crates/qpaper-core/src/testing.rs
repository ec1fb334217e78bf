//! In-memory generation client shared by the unit tests in this crate.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::assembly::GenerationRequest;
use crate::error::ClientError;
use crate::filter::FilterQuery;
use crate::model::{CourseContext, Question, QuestionId};
use crate::traits::GenerationClient;

pub(crate) enum Reply {
    Document(Vec<u8>),
    Rejected(u16, Vec<u8>),
    Unreachable,
}

pub(crate) struct StubClient {
    pub questions: Vec<Question>,
    pub fail_fetch: AtomicBool,
    pub fail_filter: AtomicBool,
    pub reply: Mutex<Reply>,
    pub generate_calls: AtomicU32,
    pub last_request: Mutex<Option<GenerationRequest>>,
}

impl StubClient {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            fail_fetch: AtomicBool::new(false),
            fail_filter: AtomicBool::new(false),
            reply: Mutex::new(Reply::Document(b"PK\x03\x04docx".to_vec())),
            generate_calls: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn replying(self, reply: Reply) -> Self {
        *self.reply.lock().unwrap() = reply;
        self
    }

    pub fn generate_calls(&self) -> u32 {
        self.generate_calls.load(Ordering::Relaxed)
    }
}

pub(crate) fn question(id: i64, unit: &str, marks: u32) -> Question {
    Question {
        id: QuestionId::new(id),
        text: format!("Question {id}"),
        unit_id: unit.into(),
        unit_name: None,
        co: "CO1".into(),
        bt: "L2".into(),
        marks,
        difficulty_level: None,
        kind: None,
        tags: vec![],
        image_paths: vec![],
        equations: vec![],
    }
}

pub(crate) fn course() -> CourseContext {
    CourseContext {
        course_id: "CS301".into(),
        course_code: "CS301".into(),
        course_title: "Operating Systems".into(),
    }
}

#[async_trait]
impl GenerationClient for StubClient {
    async fn course_context(&self, course_id: &str) -> Result<CourseContext, ClientError> {
        if course_id == "CS301" {
            Ok(course())
        } else {
            Err(ClientError::CourseAccessDenied(course_id.to_string()))
        }
    }

    async fn fetch_questions(&self, _course_id: &str) -> Result<Vec<Question>, ClientError> {
        if self.fail_fetch.load(Ordering::Relaxed) {
            return Err(ClientError::Network("connection refused".into()));
        }
        Ok(self.questions.clone())
    }

    async fn filter_questions(
        &self,
        _course_id: &str,
        query: &FilterQuery,
    ) -> Result<Vec<Question>, ClientError> {
        if self.fail_filter.load(Ordering::Relaxed) {
            return Err(ClientError::Rejected {
                status: 500,
                body: br#"{"error":"database unavailable"}"#.to_vec(),
            });
        }
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
        match &*self.reply.lock().unwrap() {
            Reply::Document(bytes) => Ok(bytes.clone()),
            Reply::Rejected(status, body) => Err(ClientError::Rejected {
                status: *status,
                body: body.clone(),
            }),
            Reply::Unreachable => Err(ClientError::Network("connection refused".into())),
        }
    }
}
