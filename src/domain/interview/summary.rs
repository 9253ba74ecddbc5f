//! End-of-interview report

use crate::domain::interview::Question;
use crate::domain::recording::Duration;

/// Totals shown to the candidate once the interview is completed
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewSummary {
    pub total: usize,
    pub answered: usize,
    pub skipped: usize,
    /// Answers still carrying the placeholder analysis
    pub pending_analyses: usize,
    /// Mean score of finished analyses; None when none finished
    pub average_score: Option<f64>,
    /// Sum of the submitted takes
    pub recorded: Duration,
}

impl InterviewSummary {
    pub fn from_questions(questions: &[Question]) -> Self {
        let answered: Vec<&Question> = questions.iter().filter(|q| q.answered).collect();

        let scores: Vec<f64> = answered
            .iter()
            .filter_map(|q| q.analysis.as_ref())
            .filter(|a| !a.pending)
            .map(|a| a.score)
            .collect();
        let average_score =
            (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64);

        let pending_analyses = answered
            .iter()
            .filter(|q| q.analysis.as_ref().is_some_and(|a| a.pending))
            .count();

        let recorded_ms = answered
            .iter()
            .filter_map(|q| q.answer_duration)
            .map(|d| d.as_millis())
            .sum();

        Self {
            total: questions.len(),
            answered: answered.len(),
            skipped: questions.iter().filter(|q| q.skipped).count(),
            pending_analyses,
            average_score,
            recorded: Duration::from_millis(recorded_ms),
        }
    }
}
