use std::fmt;

use crate::error::Error;

/// Progress value the backend reports when no analysis is running.
pub const PROGRESS_DONE: f64 = -1.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressState {
    Idle,
    /// Fraction in `[0, 1]`.
    Running(f64),
    Completed,
    /// A poll call failed. Polling stops here.
    Failed { message: String, retryable: bool },
}

impl ProgressState {
    /// Next state after one poll response.
    pub fn observe(result: Result<f64, Error>) -> Self {
        match result {
            Ok(value) if value == PROGRESS_DONE => ProgressState::Completed,
            Ok(value) => ProgressState::Running(value),
            Err(e) => ProgressState::Failed {
                retryable: e.is_retryable(),
                message: e.to_string(),
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressState::Completed | ProgressState::Failed { .. })
    }

    /// Percentage to display while running.
    pub fn percent(&self) -> Option<f64> {
        match self {
            ProgressState::Running(fraction) => Some(fraction * 100.0),
            _ => None,
        }
    }
}

impl fmt::Display for ProgressState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressState::Idle => write!(f, "idle"),
            ProgressState::Running(fraction) => write!(f, "{:.0}%", fraction * 100.0),
            ProgressState::Completed => write!(f, "completed"),
            ProgressState::Failed { message, .. } => write!(f, "failed: {}", message),
        }
    }
}
