//! Interview aggregate

use chrono::{DateTime, Utc};

use super::question::Question;
use super::state::{InterviewAction, InterviewStatus};
use super::summary::InterviewSummary;
use crate::domain::error::{InvalidQuestionSet, InvalidStateTransition};

/// One interview for one job application.
///
/// Identity fields are fixed at construction; only the status and the
/// per-question progress change afterwards.
#[derive(Debug, Clone)]
pub struct Interview {
    id: String,
    job_id: String,
    candidature_id: Option<String>,
    user_id: String,
    questions: Vec<Question>,
    status: InterviewStatus,
    created_at: DateTime<Utc>,
}

impl Interview {
    /// Build an interview in Setup.
    /// Questions are sorted by order and must be contiguous from 1.
    pub fn new(
        id: impl Into<String>,
        job_id: impl Into<String>,
        candidature_id: Option<String>,
        user_id: impl Into<String>,
        mut questions: Vec<Question>,
    ) -> Result<Self, InvalidQuestionSet> {
        if questions.is_empty() {
            return Err(InvalidQuestionSet::Empty);
        }
        questions.sort_by_key(|q| q.order);
        if let Some(pair) = questions.windows(2).find(|w| w[0].order == w[1].order) {
            return Err(InvalidQuestionSet::DuplicateOrder(pair[0].order));
        }
        for (expected, question) in (1u32..).zip(questions.iter()) {
            if question.order != expected {
                return Err(InvalidQuestionSet::NonContiguous {
                    expected,
                    found: question.order,
                });
            }
        }

        Ok(Self {
            id: id.into(),
            job_id: job_id.into(),
            candidature_id,
            user_id: user_id.into(),
            questions,
            status: InterviewStatus::Setup,
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn candidature_id(&self) -> Option<&str> {
        self.candidature_id.as_deref()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> InterviewStatus {
        self.status
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Question at a zero-based position
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn question_by_order_mut(&mut self, order: u32) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.order == order)
    }

    pub fn answered_count(&self) -> usize {
        self.questions.iter().filter(|q| q.answered).count()
    }

    pub fn summary(&self) -> InterviewSummary {
        InterviewSummary::from_questions(&self.questions)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Apply a lifecycle action
    pub fn apply(&mut self, action: InterviewAction) -> Result<InterviewStatus, InvalidStateTransition> {
        self.status = self.status.on(action)?;
        Ok(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(orders: &[u32]) -> Vec<Question> {
        orders
            .iter()
            .map(|o| Question::new(format!("q{}", o), *o, format!("Question {}", o)))
            .collect()
    }

    #[test]
    fn questions_are_sorted_by_order() {
        let interview = Interview::new("1", "job", None, "user", questions(&[3, 1, 2])).unwrap();
        let orders: Vec<u32> = interview.questions().iter().map(|q| q.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(interview.status(), InterviewStatus::Setup);
    }

    #[test]
    fn rejects_empty_set() {
        let err = Interview::new("1", "job", None, "user", Vec::new()).unwrap_err();
        assert_eq!(err, InvalidQuestionSet::Empty);
    }

    #[test]
    fn rejects_duplicate_order() {
        let err = Interview::new("1", "job", None, "user", questions(&[1, 2, 2])).unwrap_err();
        assert_eq!(err, InvalidQuestionSet::DuplicateOrder(2));
    }

    #[test]
    fn rejects_gap() {
        let err = Interview::new("1", "job", None, "user", questions(&[1, 3])).unwrap_err();
        assert_eq!(err, InvalidQuestionSet::NonContiguous { expected: 2, found: 3 });
    }

    #[test]
    fn rejects_not_starting_at_one() {
        let err = Interview::new("1", "job", None, "user", questions(&[0, 1])).unwrap_err();
        assert_eq!(err, InvalidQuestionSet::NonContiguous { expected: 1, found: 0 });
    }

    #[test]
    fn apply_moves_status() {
        let mut interview = Interview::new("1", "job", Some("c9".into()), "user", questions(&[1])).unwrap();
        assert_eq!(interview.candidature_id(), Some("c9"));
        assert_eq!(
            interview.apply(InterviewAction::DeviceAcquired).unwrap(),
            InterviewStatus::Active
        );
        assert!(interview.apply(InterviewAction::DeviceAcquired).is_err());
        assert_eq!(interview.status(), InterviewStatus::Active);
    }
}
