/// Process lifecycle state machine
///
/// Every process moves through the same small set of states:
///
/// ```text
/// Uninitialized -> Executing -> Success
///                            -> Warning
///                            -> Failed
/// ```
///
/// - `Uninitialized` - Initial state, re-entered when an upstream value changes
/// - `Executing` - Transient, set at the start of every run
/// - `Success` - Run finished without errors
/// - `Warning` - Run recorded errors but the process is optional
/// - `Failed` - Run recorded errors on a mandatory process, or blew up
///
/// Terminal states are never locked: a new run always goes back through
/// `Executing`.
pub mod transitions;

pub use transitions::resolve_terminal;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current lifecycle state of a process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStatus {
    #[default]
    Uninitialized,
    Executing,
    Success,
    Warning,
    Failed,
}

impl ProcessStatus {
    /// Get the current state as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::Executing => "EXECUTING",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Failed => "FAILED",
        }
    }

    /// Check if this is the end state of a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Warning | Self::Failed)
    }

    /// Check if the status means the process has not run since its last reset
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Uninitialized)
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
