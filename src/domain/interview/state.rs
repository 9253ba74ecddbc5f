//! Interview lifecycle state machine

use std::fmt;

use crate::domain::error::InvalidStateTransition;

/// Interview lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterviewStatus {
    #[default]
    Setup,
    Active,
    Completing,
    Completed,
    Abandoned,
}

/// Actions that move an interview through its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterviewAction {
    DeviceAcquired,
    BeginFinish,
    Complete,
    Abandon,
}

impl InterviewAction {
    const fn describe(&self) -> &'static str {
        match self {
            Self::DeviceAcquired => "activate interview",
            Self::BeginFinish => "finish interview",
            Self::Complete => "complete interview",
            Self::Abandon => "abandon interview",
        }
    }
}

/// Transition table:
///   SETUP      -> ACTIVE     (device acquired)
///   ACTIVE     -> COMPLETING (finish)
///   COMPLETING -> COMPLETING (finish retried after a backend failure)
///   COMPLETING -> COMPLETED  (backend confirmed)
///   SETUP | ACTIVE | COMPLETING -> ABANDONED
const TRANSITIONS: &[(InterviewStatus, InterviewAction, InterviewStatus)] = &[
    (InterviewStatus::Setup, InterviewAction::DeviceAcquired, InterviewStatus::Active),
    (InterviewStatus::Active, InterviewAction::BeginFinish, InterviewStatus::Completing),
    (InterviewStatus::Completing, InterviewAction::BeginFinish, InterviewStatus::Completing),
    (InterviewStatus::Completing, InterviewAction::Complete, InterviewStatus::Completed),
    (InterviewStatus::Setup, InterviewAction::Abandon, InterviewStatus::Abandoned),
    (InterviewStatus::Active, InterviewAction::Abandon, InterviewStatus::Abandoned),
    (InterviewStatus::Completing, InterviewAction::Abandon, InterviewStatus::Abandoned),
];

impl InterviewStatus {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Active => "active",
            Self::Completing => "completing",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    /// Completed and Abandoned accept no further actions
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }

    /// Look up the next status for an action
    pub fn on(self, action: InterviewAction) -> Result<Self, InvalidStateTransition> {
        TRANSITIONS
            .iter()
            .find(|(from, a, _)| *from == self && *a == action)
            .map(|(_, _, to)| *to)
            .ok_or(InvalidStateTransition {
                current_state: self.as_str(),
                action: action.describe(),
            })
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
