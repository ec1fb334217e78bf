//! Paper assembly: turning metadata and a selection into a generation
//! request, and interpreting what the generation service sends back.
//!
//! The service is asked for a binary body. A successful response is the
//! rendered document; a rejected one carries a JSON error document in that
//! same binary body, which has to be decoded to recover the message.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::{AssemblyError, ClientError};
use crate::ledger::{Section, SelectionLedger};
use crate::model::{CourseContext, ExamType, PaperMetadata};
use crate::traits::GenerationClient;

/// Extension of generated documents.
pub const DOCUMENT_EXTENSION: &str = "docx";

/// MIME type of generated documents.
pub const DOCUMENT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Shown when a rejection carries no readable message.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to generate paper. Please check your selections and try again.";

/// Shown when the generation service cannot be reached.
pub const CONNECTIVITY_MESSAGE: &str =
    "Could not reach the paper generation service. Check your network connection and try again.";

/// Question IDs per part, as integers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedQuestions {
    pub part_a: Vec<i64>,
    pub part_b: Vec<i64>,
}

impl SelectedQuestions {
    pub fn from_ledger(ledger: &SelectionLedger) -> Self {
        Self {
            part_a: ledger.ids_in(Section::PartA).map(i64::from).collect(),
            part_b: ledger.ids_in(Section::PartB).map(i64::from).collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.part_a.len() + self.part_b.len()
    }
}

/// Body of a generation request. Field names are the service's wire
/// contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub course_id: String,
    pub course_code: String,
    pub course_title: String,
    pub selected_questions: SelectedQuestions,
    pub exam_type: ExamType,
    pub date: String,
    /// `null` when the entered value has no leading integer; the service
    /// rejects it with a readable message.
    pub max_marks: Option<i64>,
    pub duration: String,
    pub semester: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_improvement_cie: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl GenerationRequest {
    /// Build a request from the form state.
    ///
    /// Fails with [`AssemblyError::EmptySelection`] when neither part has
    /// a question.
    pub fn build(
        metadata: &PaperMetadata,
        ledger: &SelectionLedger,
        course: &CourseContext,
    ) -> Result<Self, AssemblyError> {
        if ledger.is_empty() {
            return Err(AssemblyError::EmptySelection);
        }

        Ok(Self {
            course_id: course.course_id.clone(),
            course_code: metadata.course_code().to_string(),
            course_title: metadata.course_title().to_string(),
            selected_questions: SelectedQuestions::from_ledger(ledger),
            exam_type: metadata.exam_type,
            date: metadata.date.clone(),
            max_marks: metadata.max_marks_value(),
            duration: metadata.duration.clone(),
            semester: metadata.semester.clone(),
            is_improvement_cie: metadata.is_improvement_cie,
        })
    }
}

/// A rendered paper ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPaper {
    /// Opaque document bytes.
    pub document: Vec<u8>,
    pub filename: String,
}

impl GeneratedPaper {
    /// Write the document into `dir` under its suggested filename.
    pub async fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.document).await?;
        Ok(path)
    }
}

/// `question_paper_<ISO-8601 timestamp>.docx` with `:` and `.` replaced by
/// `-` so the name is safe on every filesystem.
pub fn suggested_filename(at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("question_paper_{stamp}.{DOCUMENT_EXTENSION}")
}

/// Decode a binary error body as UTF-8 JSON and pull out its `error` or
/// `detail` field. An empty `error` falls through to `detail`.
pub fn decode_error_payload(body: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?;
    let value: Value = serde_json::from_str(text).ok()?;
    ["error", "detail"]
        .into_iter()
        .find_map(|key| match value.get(key)? {
            Value::String(s) => Some(s.trim().to_string()).filter(|m| !m.is_empty()),
            Value::Null | Value::Bool(false) => None,
            other => Some(other.to_string()),
        })
}

/// Map a failed generation call onto the assembly error taxonomy.
pub fn interpret_failure(err: ClientError) -> AssemblyError {
    match err {
        ClientError::Rejected { status, body } => match decode_error_payload(&body) {
            Some(message) => AssemblyError::ValidationFailed(message),
            None => {
                warn!(status, bytes = body.len(), "unreadable rejection body");
                AssemblyError::TransportFailed(GENERIC_FAILURE_MESSAGE.to_string())
            }
        },
        ClientError::Unauthorized(message) | ClientError::CourseAccessDenied(message) => {
            AssemblyError::AccessDenied(message)
        }
        ClientError::NotFound(message) => AssemblyError::ValidationFailed(message),
        ClientError::Timeout(_) | ClientError::Network(_) => {
            AssemblyError::TransportFailed(CONNECTIVITY_MESSAGE.to_string())
        }
        ClientError::Decode(_) => {
            AssemblyError::TransportFailed(GENERIC_FAILURE_MESSAGE.to_string())
        }
    }
}

/// Submits assembled papers to the generation service.
pub struct PaperAssembly {
    client: Arc<dyn GenerationClient>,
}

impl PaperAssembly {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self { client }
    }

    /// Validate the selection, request the document and interpret the
    /// response. Nothing in `metadata` or `ledger` is modified, so a failed
    /// submission can be corrected and resubmitted.
    #[instrument(skip_all, fields(course_id = %course.course_id))]
    pub async fn submit(
        &self,
        metadata: &PaperMetadata,
        ledger: &SelectionLedger,
        course: &CourseContext,
    ) -> Result<GeneratedPaper, AssemblyError> {
        let request = GenerationRequest::build(metadata, ledger, course)?;
        debug!(
            part_a = request.selected_questions.part_a.len(),
            part_b = request.selected_questions.part_b.len(),
            exam_type = %request.exam_type,
            "submitting paper"
        );

        match self.client.generate_paper(&request).await {
            Ok(document) => {
                let filename = suggested_filename(Utc::now());
                info!(bytes = document.len(), %filename, "paper generated");
                Ok(GeneratedPaper { document, filename })
            }
            Err(e) => {
                warn!(error = %e, "paper generation failed");
                Err(interpret_failure(e))
            }
        }
    }
}
