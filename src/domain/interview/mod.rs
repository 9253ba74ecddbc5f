//! Interview domain: lifecycle, questions, aggregate

#[allow(clippy::module_inception)]
mod interview;
mod question;
mod state;
mod summary;

pub use interview::Interview;
pub use question::{default_questions, Question, QuestionProgress};
pub use state::{InterviewAction, InterviewStatus};
pub use summary::InterviewSummary;
