//! CLI presenter for output formatting

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ports::RequirementsReport;
use crate::application::InterviewSnapshot;
use crate::domain::analysis::AnalysisResult;
use crate::domain::interview::{InterviewSummary, Question};
use crate::domain::recording::Duration;

/// Presenter for CLI output formatting
#[derive(Clone, Default)]
pub struct Presenter {
    spinner: Arc<Mutex<Option<ProgressBar>>>,
    recording: Arc<Mutex<Option<ProgressBar>>>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a spinner with message
    pub fn start_spinner(&self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(StdDuration::from_millis(80));
        if let Some(previous) = self.swap(&self.spinner, Some(spinner)) {
            previous.finish_and_clear();
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&self, message: &str) {
        if let Some(spinner) = self.finished_spinner() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        } else {
            self.success(message);
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&self, message: &str) {
        if let Some(spinner) = self.finished_spinner() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        } else {
            self.error(message);
        }
    }

    /// Take the spinner if it draws to a terminal; clear it otherwise
    fn finished_spinner(&self) -> Option<ProgressBar> {
        let spinner = self.swap(&self.spinner, None)?;
        if spinner.is_hidden() {
            spinner.finish_and_clear();
            return None;
        }
        Some(spinner)
    }

    /// Stop spinner without status
    pub fn stop_spinner(&self) {
        if let Some(spinner) = self.swap(&self.spinner, None) {
            spinner.finish_and_clear();
        }
    }

    /// Show a countdown bar for the current take
    pub fn start_recording_progress(&self, order: u32, max: Duration) {
        let total = max.as_secs().max(1);
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:.red} [{bar:20.cyan/white}] {pos:>3}s / {len}s  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█░ "),
        );
        bar.set_prefix(format!("● Q{}", order));
        bar.set_message("type 's' + Enter to stop");
        if let Some(previous) = self.swap(&self.recording, Some(bar.clone())) {
            previous.finish_and_clear();
        }

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(StdDuration::from_secs(1));
            ticker.tick().await;
            while !bar.is_finished() && bar.position() < total {
                ticker.tick().await;
                bar.inc(1);
            }
        });
    }

    /// Clear the countdown bar
    pub fn stop_recording_progress(&self) {
        if let Some(bar) = self.swap(&self.recording, None) {
            bar.finish_and_clear();
        }
    }

    fn swap(
        &self,
        slot: &Mutex<Option<ProgressBar>>,
        value: Option<ProgressBar>,
    ) -> Option<ProgressBar> {
        let mut guard = slot.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, value)
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print the question the candidate should answer
    pub fn question(&self, question: &Question, total: usize) {
        eprintln!();
        eprintln!(
            "{} {}",
            format!("Question {}/{}", question.order, total).bold().cyan(),
            question.progress.as_str().dimmed()
        );
        eprintln!("  {}", question.text);
    }

    /// Print the analysis of one answer
    pub fn analysis(&self, order: u32, analysis: &AnalysisResult) {
        if analysis.pending {
            self.warn(&format!(
                "Q{}: analysis still running, scored {:.1} for now",
                order, analysis.score
            ));
            return;
        }

        self.success(&format!(
            "Q{}: score {:.1}/10 ({})",
            order, analysis.score, analysis.recommendation
        ));
        for strength in &analysis.strengths {
            eprintln!("    {} {}", "+".green(), strength);
        }
        for improvement in &analysis.improvements {
            eprintln!("    {} {}", "-".yellow(), improvement);
        }
    }

    /// Print an overview of the whole interview
    pub fn status(&self, snapshot: &InterviewSnapshot) {
        let status = snapshot.status.map(|s| s.as_str()).unwrap_or("none");
        eprintln!(
            "{} Interview {} [{}] | recording: {} | tracks: {} | answered: {}/{}",
            "●".cyan(),
            snapshot.interview_id.as_deref().unwrap_or("-"),
            status,
            snapshot.recording,
            snapshot.track_count,
            snapshot.answered,
            snapshot.questions.len()
        );
        for (index, question) in snapshot.questions.iter().enumerate() {
            let marker = if index == snapshot.current_index { "›" } else { " " };
            eprintln!(
                "  {} {:>2}. {:<11} {}",
                marker.cyan(),
                question.order,
                question.progress.as_str(),
                question.text
            );
        }
    }

    /// Print the end-of-interview report
    pub fn summary(&self, summary: &InterviewSummary) {
        self.key_value(
            "Answered",
            &format!("{} of {}", summary.answered, summary.total),
        );
        if summary.skipped > 0 {
            self.key_value("Skipped", &summary.skipped.to_string());
        }
        self.key_value("Recorded", &summary.recorded.to_string());
        match summary.average_score {
            Some(score) => self.key_value("Average score", &format!("{:.1}/10", score)),
            None => self.key_value("Average score", "not available yet"),
        }
        if summary.pending_analyses > 0 {
            self.warn(&format!(
                "{} analyses were still running and are not in the average",
                summary.pending_analyses
            ));
        }
    }

    /// Print a requirements report
    pub fn requirements(&self, report: &RequirementsReport) {
        if report.is_valid() {
            self.success("All interview requirements met");
            return;
        }
        self.warn("Missing interview requirements:");
        for requirement in &report.missing {
            eprintln!("    {} {}", "✗".red(), requirement.label());
        }
    }

    /// Print interactive commands
    pub fn command_help(&self) {
        let commands = [
            ("r", "record an answer to the current question"),
            ("s", "stop recording"),
            ("n", "next question"),
            ("k", "skip question"),
            ("u", "retry a failed upload"),
            ("m", "toggle microphone"),
            ("c", "toggle camera"),
            ("d", "retry camera and microphone"),
            ("f", "finish the interview"),
            ("q", "abandon the interview"),
            ("?", "show interview status"),
        ];
        for (key, description) in commands {
            eprintln!("  {}  {}", key.bold(), description);
        }
    }
}
