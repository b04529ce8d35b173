/// State transition rules
///
/// The engine assigns statuses directly (hosts may reset a process at any
/// time), so these rules are advisory: irregular edges are logged, not refused.
use super::ProcessStatus;

impl ProcessStatus {
    /// Check whether moving from `self` to `next` follows the lifecycle
    ///
    /// Legal edges:
    /// - any state -> `Uninitialized` (manual reset)
    /// - any state -> `Executing` (a new run)
    /// - `Executing` -> `Success` | `Warning` | `Failed`
    pub fn can_transition_to(&self, next: ProcessStatus) -> bool {
        match (self, next) {
            (_, ProcessStatus::Uninitialized) => true,
            (_, ProcessStatus::Executing) => true,
            (ProcessStatus::Executing, next) => next.is_terminal(),
            _ => false,
        }
    }
}

/// Compute the terminal status of a run that returned normally
pub fn resolve_terminal(has_errors: bool, mandatory: bool) -> ProcessStatus {
    match (has_errors, mandatory) {
        (false, _) => ProcessStatus::Success,
        (true, false) => ProcessStatus::Warning,
        (true, true) => ProcessStatus::Failed,
    }
}
