//! The full and filtered views of a course's candidate questions.
//!
//! Filter requests are tagged with a monotonically increasing sequence
//! number; only the response to the most recently issued request may
//! replace the filtered view.

use tracing::{debug, info, warn};

use crate::error::{ClientError, PoolError};
use crate::filter::{FilterCriteria, FilterQuery};
use crate::model::{Question, QuestionId};
use crate::traits::GenerationClient;

/// An issued filter request awaiting its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTicket {
    pub seq: u64,
    pub query: FilterQuery,
}

/// What happened to a filter response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The filtered view now holds this many questions.
    Applied(usize),
    /// A newer request was issued meanwhile; the response was discarded.
    Stale,
}

/// Candidate questions for one course.
#[derive(Debug, Clone)]
pub struct QuestionPool {
    course_id: String,
    all: Vec<Question>,
    filtered: Vec<Question>,
    latest_seq: u64,
}

impl QuestionPool {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            all: Vec::new(),
            filtered: Vec::new(),
            latest_seq: 0,
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn all(&self) -> &[Question] {
        &self.all
    }

    pub fn filtered(&self) -> &[Question] {
        &self.filtered
    }

    /// Sequence number of the most recently issued filter request.
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Look a question up by ID in either view.
    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.all
            .iter()
            .chain(self.filtered.iter())
            .find(|q| q.id == id)
    }

    /// Fetch every candidate question and seed both views with them.
    ///
    /// Outstanding filter requests become stale. On failure both views keep
    /// their previous contents.
    pub async fn load(&mut self, client: &dyn GenerationClient) -> Result<usize, PoolError> {
        self.latest_seq += 1;
        match client.fetch_questions(&self.course_id).await {
            Ok(questions) => {
                info!(course_id = %self.course_id, count = questions.len(), "loaded question pool");
                self.filtered = questions.clone();
                self.all = questions;
                Ok(self.all.len())
            }
            Err(e) => {
                warn!(course_id = %self.course_id, error = %e, "failed to load question pool");
                Err(e.into())
            }
        }
    }

    /// Issue a filter request: normalize the criteria and take the next
    /// sequence number.
    pub fn begin_filter(&mut self, criteria: &FilterCriteria) -> FilterTicket {
        self.latest_seq += 1;
        let ticket = FilterTicket {
            seq: self.latest_seq,
            query: criteria.normalize(),
        };
        debug!(seq = ticket.seq, query = ?ticket.query, "issued filter request");
        ticket
    }

    /// Deliver the response to a filter request.
    ///
    /// Responses for anything but the latest issued request are discarded,
    /// failures included. A failure for the latest request leaves the
    /// filtered view unchanged.
    pub fn complete_filter(
        &mut self,
        seq: u64,
        result: Result<Vec<Question>, ClientError>,
    ) -> Result<FilterOutcome, PoolError> {
        if seq != self.latest_seq {
            warn!(seq, latest = self.latest_seq, "discarding stale filter response");
            return Ok(FilterOutcome::Stale);
        }

        match result {
            Ok(questions) => {
                debug!(seq, count = questions.len(), "applied filter response");
                self.filtered = questions;
                Ok(FilterOutcome::Applied(self.filtered.len()))
            }
            Err(e) => {
                warn!(seq, error = %e, "filter request failed, keeping previous view");
                Err(e.into())
            }
        }
    }

    /// Filter the pool against the full server-side question bank.
    ///
    /// Criteria never accumulate: each call replaces the filtered view
    /// with the result for exactly these criteria.
    pub async fn apply_filter(
        &mut self,
        client: &dyn GenerationClient,
        criteria: &FilterCriteria,
    ) -> Result<FilterOutcome, PoolError> {
        let ticket = self.begin_filter(criteria);
        let result = client
            .filter_questions(&self.course_id, &ticket.query)
            .await;
        self.complete_filter(ticket.seq, result)
    }
}
