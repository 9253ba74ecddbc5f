//! Analysis result value object

/// Neutral score attached when analysis did not finish in time (0-10 scale)
pub const PENDING_SCORE: f64 = 5.0;

/// Recommendation label of the pending placeholder
pub const PENDING_RECOMMENDATION: &str = "processing";

/// AI analysis of one answer
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub transcription: String,
    pub score: f64,
    pub recommendation: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// True for the synthetic placeholder used on poll budget exhaustion
    pub pending: bool,
}

impl AnalysisResult {
    /// Placeholder attached when the backend is still processing after the
    /// poll budget ran out
    pub fn pending_fallback() -> Self {
        Self {
            transcription: String::new(),
            score: PENDING_SCORE,
            recommendation: PENDING_RECOMMENDATION.to_string(),
            strengths: Vec::new(),
            improvements: Vec::new(),
            pending: true,
        }
    }
}
