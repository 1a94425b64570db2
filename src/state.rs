use serde::{Deserialize, Serialize};
use std::fmt;

/// Job lifecycle states.
///
/// `Idle -> Scheduled -> Running -> (Scheduled | Idle)`: a run moves back
/// to `Scheduled` while rows remain and to `Idle` once exhausted. `Idle`
/// is both the initial and the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// No batch running and no trigger pending.
    Idle,
    /// A trigger for the batch handler is pending.
    Scheduled,
    /// A batch is executing right now.
    Running,
}

impl JobState {
    /// Check if the job has work in flight or pending.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Scheduled | Self::Running)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Scheduled => write!(f, "scheduled"),
            Self::Running => write!(f, "running"),
        }
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "scheduled" => Ok(Self::Scheduled),
            "running" => Ok(Self::Running),
            _ => Err(format!("Invalid job state: {s}")),
        }
    }
}

impl Default for JobState {
    fn default() -> Self {
        Self::Idle
    }
}
