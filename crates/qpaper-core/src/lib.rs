//! qpaper-core: Question selection and paper-assembly core.
//!
//! This crate holds the domain model, the filter/pool/ledger state that one
//! open paper form works with, and the logic that turns a selection into a
//! generation request and interprets what the generation service returns.

pub mod assembly;
pub mod error;
pub mod filter;
pub mod ledger;
pub mod model;
pub mod pool;
pub mod session;
pub mod traits;

#[cfg(test)]
mod testing;

pub use assembly::{GeneratedPaper, GenerationRequest, PaperAssembly, SelectedQuestions};
pub use error::{AssemblyError, ClientError, PoolError};
pub use filter::{FilterCriteria, FilterQuery};
pub use ledger::{Section, SelectionLedger};
pub use model::{CourseContext, ExamType, PaperMetadata, Question, QuestionId, Role, SessionContext};
pub use pool::{FilterOutcome, FilterTicket, QuestionPool};
pub use session::AssemblySession;
pub use traits::GenerationClient;
