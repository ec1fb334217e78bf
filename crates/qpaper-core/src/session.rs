//! One open paper form: the course it is for, the filter, the pool, the
//! selection and the metadata, all owned together.

use std::sync::Arc;

use tracing::info;

use crate::assembly::{GeneratedPaper, PaperAssembly};
use crate::error::{AssemblyError, ClientError, PoolError};
use crate::filter::FilterCriteria;
use crate::ledger::{Section, SelectionLedger};
use crate::model::{CourseContext, PaperMetadata, QuestionId, Role, SessionContext};
use crate::pool::{FilterOutcome, QuestionPool};
use crate::traits::GenerationClient;

/// State of one paper being assembled.
///
/// The selection persists across filters and across submissions; it is
/// only discarded with the session itself.
pub struct AssemblySession {
    session: SessionContext,
    client: Arc<dyn GenerationClient>,
    assembly: PaperAssembly,
    course: CourseContext,
    pub metadata: PaperMetadata,
    pub criteria: FilterCriteria,
    pool: QuestionPool,
    ledger: SelectionLedger,
}

impl AssemblySession {
    /// Open a form for `course_id`.
    ///
    /// Only faculty may assemble papers, and only for courses they are
    /// mapped to. The question pool starts empty; call [`refresh`].
    ///
    /// [`refresh`]: AssemblySession::refresh
    pub async fn open(
        session: SessionContext,
        client: Arc<dyn GenerationClient>,
        course_id: &str,
    ) -> Result<Self, AssemblyError> {
        if session.role != Role::Faculty {
            return Err(AssemblyError::AccessDenied(
                "paper assembly requires the faculty role".into(),
            ));
        }

        let course = client
            .course_context(course_id)
            .await
            .map_err(|e| match e {
                ClientError::CourseAccessDenied(id) => {
                    AssemblyError::AccessDenied(format!("you do not have access to course {id}"))
                }
                other => crate::assembly::interpret_failure(other),
            })?;
        info!(course_id = %course.course_id, title = %course.course_title, "opened assembly session");

        Ok(Self {
            metadata: PaperMetadata::for_course(&course),
            criteria: FilterCriteria::default(),
            pool: QuestionPool::new(course.course_id.clone()),
            ledger: SelectionLedger::new(),
            assembly: PaperAssembly::new(client.clone()),
            session,
            client,
            course,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn course(&self) -> &CourseContext {
        &self.course
    }

    pub fn pool(&self) -> &QuestionPool {
        &self.pool
    }

    pub fn ledger(&self) -> &SelectionLedger {
        &self.ledger
    }

    /// Load the full question pool for the course.
    pub async fn refresh(&mut self) -> Result<usize, PoolError> {
        self.pool.load(self.client.as_ref()).await
    }

    /// Apply the current [`criteria`](AssemblySession::criteria).
    pub async fn apply_filter(&mut self) -> Result<FilterOutcome, PoolError> {
        self.pool
            .apply_filter(self.client.as_ref(), &self.criteria)
            .await
    }

    pub fn toggle(&mut self, id: QuestionId, section: Section) -> Option<Section> {
        self.ledger.toggle(id, section)
    }

    pub fn is_selected(&self, id: QuestionId, section: Section) -> bool {
        self.ledger.is_selected(id, section)
    }

    /// Submit the paper. The selection and metadata are kept either way.
    pub async fn submit(&self) -> Result<GeneratedPaper, AssemblyError> {
        self.assembly
            .submit(&self.metadata, &self.ledger, &self.course)
            .await
    }
}
