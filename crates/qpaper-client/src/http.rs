//! HTTP implementation of the generation-service client.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use qpaper_core::assembly::{decode_error_payload, GenerationRequest, DOCUMENT_CONTENT_TYPE};
use qpaper_core::error::ClientError;
use qpaper_core::filter::FilterQuery;
use qpaper_core::model::{CourseContext, Question, SessionContext};
use qpaper_core::traits::GenerationClient;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Client for the question bank / paper generation REST API.
pub struct HttpGenerationClient {
    base_url: String,
    session: SessionContext,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpGenerationClient {
    pub fn new(base_url: &str, session: SessionContext) -> Self {
        Self::with_timeout(base_url, session, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, session: SessionContext, timeout_secs: u64) -> Self {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base.trim_end_matches('/').to_string(),
            session,
            timeout_secs,
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        if self.session.token.is_empty() {
            request
        } else {
            request.header("Authorization", format!("Token {}", self.session.token))
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = self.authorized(request).send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                ClientError::Network(format!(
                    "generation service not reachable at {}",
                    self.base_url
                ))
            } else {
                ClientError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status < 400 {
            return Ok(response);
        }

        let body = response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .unwrap_or_default();

        // Only a decoded `error`/`detail` field is ever surfaced as a message;
        // anything else stays a raw rejection.
        Err(match (status, decode_error_payload(&body)) {
            (401 | 403, Some(message)) => ClientError::Unauthorized(message),
            (401 | 403, None) => ClientError::Unauthorized(format!("HTTP {status}")),
            (404, Some(message)) => ClientError::NotFound(message),
            _ => ClientError::Rejected { status, body },
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(self.client.get(self.url(path))).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(format!("{path}: {e}")))
    }
}

#[derive(Deserialize)]
struct QuestionsResponse {
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct MappingsResponse {
    #[serde(default)]
    mappings: Vec<CourseMapping>,
}

#[derive(Deserialize)]
struct CourseMapping {
    course_id: String,
}

#[derive(Deserialize)]
struct DashboardResponse {
    #[serde(default)]
    courses: Vec<DashboardCourse>,
}

#[derive(Deserialize)]
struct DashboardCourse {
    id: String,
    name: String,
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    #[instrument(skip(self))]
    async fn course_context(&self, course_id: &str) -> Result<CourseContext, ClientError> {
        let mappings: MappingsResponse = self.get_json("faculty-courses/").await?;
        if !mappings.mappings.iter().any(|m| m.course_id == course_id) {
            return Err(ClientError::CourseAccessDenied(course_id.to_string()));
        }

        let dashboard: DashboardResponse = self.get_json("faculty-dashboard/").await?;
        let course = dashboard
            .courses
            .into_iter()
            .find(|c| c.id == course_id)
            .ok_or_else(|| ClientError::NotFound(format!("course {course_id}")))?;

        Ok(CourseContext {
            course_id: course_id.to_string(),
            course_code: course.id,
            course_title: course.name,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_questions(&self, course_id: &str) -> Result<Vec<Question>, ClientError> {
        let response: QuestionsResponse = self
            .get_json(&format!("course/{course_id}/questions/"))
            .await?;
        debug!(count = response.questions.len(), "fetched questions");
        Ok(response.questions)
    }

    #[instrument(skip(self, query))]
    async fn filter_questions(
        &self,
        course_id: &str,
        query: &FilterQuery,
    ) -> Result<Vec<Question>, ClientError> {
        let path = format!("course/{course_id}/filter-questions/");
        let payload = query.payload(course_id);
        debug!(?payload, "sending filter request");

        let response = self
            .send(self.client.post(self.url(&path)).json(&payload))
            .await?;
        let body: QuestionsResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("{path}: {e}")))?;
        Ok(body.questions)
    }

    #[instrument(skip(self, request), fields(course_id = %request.course_id))]
    async fn generate_paper(&self, request: &GenerationRequest) -> Result<Vec<u8>, ClientError> {
        let response = self
            .send(
                self.client
                    .post(self.url("generate-paper/"))
                    .header(
                        "Accept",
                        format!("{DOCUMENT_CONTENT_TYPE}, application/json"),
                    )
                    .json(request),
            )
            .await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
