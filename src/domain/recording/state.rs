//! Recording session state machine

use std::fmt;

use crate::domain::error::InvalidStateTransition;

/// Per-question recording states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Armed,
    Recording,
    Stopped,
}

/// Events that drive a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordingEvent {
    Arm,
    Start,
    Stop,
    Cancel,
}

impl RecordingEvent {
    const fn action(&self) -> &'static str {
        match self {
            Self::Arm => "arm recording",
            Self::Start => "start recording",
            Self::Stop => "stop recording",
            Self::Cancel => "cancel recording",
        }
    }
}

/// Transition table:
///   IDLE      -> ARMED     (arm)
///   STOPPED   -> ARMED     (arm, discards the previous take)
///   ARMED     -> RECORDING (start)
///   RECORDING -> STOPPED   (stop, manual or deadline)
///   any       -> IDLE      (cancel)
const TRANSITIONS: &[(RecordingState, RecordingEvent, RecordingState)] = &[
    (RecordingState::Idle, RecordingEvent::Arm, RecordingState::Armed),
    (RecordingState::Stopped, RecordingEvent::Arm, RecordingState::Armed),
    (RecordingState::Armed, RecordingEvent::Start, RecordingState::Recording),
    (RecordingState::Recording, RecordingEvent::Stop, RecordingState::Stopped),
    (RecordingState::Idle, RecordingEvent::Cancel, RecordingState::Idle),
    (RecordingState::Armed, RecordingEvent::Cancel, RecordingState::Idle),
    (RecordingState::Recording, RecordingEvent::Cancel, RecordingState::Idle),
    (RecordingState::Stopped, RecordingEvent::Cancel, RecordingState::Idle),
];

impl RecordingState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Armed => "armed",
            Self::Recording => "recording",
            Self::Stopped => "stopped",
        }
    }

    /// Whether the session currently holds the recorder
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Armed | Self::Recording)
    }

    /// Look up the next state for an event
    pub fn on(self, event: RecordingEvent) -> Result<Self, InvalidStateTransition> {
        TRANSITIONS
            .iter()
            .find(|(from, ev, _)| *from == self && *ev == event)
            .map(|(_, _, to)| *to)
            .ok_or(InvalidStateTransition {
                current_state: self.as_str(),
                action: event.action(),
            })
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
