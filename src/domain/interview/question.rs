//! Interview questions and their per-question progress

use std::fmt;

use crate::domain::analysis::AnalysisResult;
use crate::domain::recording::Duration;

/// Where a question is in the record, upload, analyze cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionProgress {
    #[default]
    Unanswered,
    Recording,
    Uploading,
    Processing,
    UploadFailed { retryable: bool },
    AnalysisFailed,
    Answered,
    Skipped,
}

impl QuestionProgress {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unanswered => "unanswered",
            Self::Recording => "recording",
            Self::Uploading => "uploading",
            Self::Processing => "processing",
            Self::UploadFailed { .. } => "upload failed",
            Self::AnalysisFailed => "analysis failed",
            Self::Answered => "answered",
            Self::Skipped => "skipped",
        }
    }

    /// A pipeline task is currently working on this question
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::Recording | Self::Uploading | Self::Processing)
    }
}

impl fmt::Display for QuestionProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single interview question
#[derive(Debug, Clone)]
pub struct Question {
    pub id: String,
    pub order: u32,
    pub text: String,
    pub answered: bool,
    pub skipped: bool,
    pub progress: QuestionProgress,
    pub analysis: Option<AnalysisResult>,
    pub last_error: Option<String>,
    /// Length of the take that was submitted for this question
    pub answer_duration: Option<Duration>,
}

impl Question {
    pub fn new(id: impl Into<String>, order: u32, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            order,
            text: text.into(),
            answered: false,
            skipped: false,
            progress: QuestionProgress::Unanswered,
            analysis: None,
            last_error: None,
            answer_duration: None,
        }
    }

    /// Answered or explicitly skipped
    pub fn is_resolved(&self) -> bool {
        self.answered || self.skipped
    }

    /// Attach the analysis and mark the question answered
    pub fn mark_answered(&mut self, analysis: AnalysisResult) {
        self.answered = true;
        self.progress = QuestionProgress::Answered;
        self.analysis = Some(analysis);
        self.last_error = None;
    }

    pub fn mark_skipped(&mut self) {
        self.skipped = true;
        self.progress = QuestionProgress::Skipped;
    }

    /// Record a failure; the question stays unanswered
    pub fn mark_failed(&mut self, progress: QuestionProgress, message: impl Into<String>) {
        self.progress = progress;
        self.last_error = Some(message.into());
    }
}

/// Generic question set used when the backend returns none
pub fn default_questions() -> Vec<Question> {
    [
        "Tell me about your professional background and what motivated you to apply for this position.",
        "How do you see yourself contributing to the growth of this company?",
        "Describe a challenging situation you faced professionally and how you resolved it.",
        "What are your main career goals for the next few years?",
        "Why do you believe you are the ideal candidate for this position?",
    ]
    .iter()
    .zip(1u32..)
    .map(|(text, order)| Question::new(format!("default-{}", order), order, *text))
    .collect()
}
