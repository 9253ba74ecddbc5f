//! Interview requirements port interface

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::session::UserSession;

/// Something a candidate must have before interviewing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    Resume,
    DiscTest,
    Onboarding,
    LinkedIn,
}

impl Requirement {
    pub const ALL: [Requirement; 4] = [
        Requirement::Resume,
        Requirement::DiscTest,
        Requirement::Onboarding,
        Requirement::LinkedIn,
    ];

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Resume => "résumé uploaded",
            Self::DiscTest => "DISC test completed",
            Self::Onboarding => "onboarding questionnaire",
            Self::LinkedIn => "LinkedIn profile",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Outcome of a requirements check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementsReport {
    pub missing: Vec<Requirement>,
}

impl RequirementsReport {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }

    /// Comma-separated labels of the missing requirements
    pub fn describe_missing(&self) -> String {
        self.missing
            .iter()
            .map(Requirement::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Validation could not run at all
#[derive(Debug, Clone, Error)]
#[error("Requirements check failed: {0}")]
pub struct ValidationFailure(pub String);

/// Port for checking interview prerequisites
#[async_trait]
pub trait RequirementsValidator: Send + Sync {
    async fn validate(&self, session: &UserSession) -> Result<RequirementsReport, ValidationFailure>;
}
