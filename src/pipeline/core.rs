use crate::error::{PublisherError, PublisherResult};
use crate::state_machine::ProcessStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::collector::ValueKind;
use super::context::Context;
use super::process::{ProcessScope, ProcessState};

/// Execution phase a process belongs to
///
/// Declaration order is execution order: nothing is checked, extracted or
/// pushed before every input has been collected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Collect,
    Check,
    Extract,
    Push,
}

impl Category {
    /// All categories in execution order
    pub const ALL: [Category; 4] = [
        Category::Collect,
        Category::Check,
        Category::Extract,
        Category::Push,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Collect => "collect",
            Category::Check => "check",
            Category::Extract => "extract",
            Category::Push => "push",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = PublisherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "collect" => Ok(Category::Collect),
            "check" => Ok(Category::Check),
            "extract" => Ok(Category::Extract),
            "push" => Ok(Category::Push),
            _ => Err(PublisherError::UnknownCategory(s.to_string())),
        }
    }
}

/// A single stage in a publish
///
/// Implementations supply the business logic; the engine owns status, errors
/// and callbacks. Problems are reported through [`ProcessScope::add_error`];
/// returning `Err` (or panicking) is treated as an unhandled failure and
/// always ends the run in `Failed`.
///
/// # Example
/// ```
/// use publisher_lib::error::PublisherResult;
/// use publisher_lib::pipeline::{Category, Process, ProcessScope, ValueKind};
/// use serde_json::json;
///
/// struct CollectTask;
///
/// impl Process for CollectTask {
///     fn name(&self) -> &str {
///         "task_id"
///     }
///
///     fn category(&self) -> Category {
///         Category::Collect
///     }
///
///     fn expected_kind(&self) -> ValueKind {
///         ValueKind::Integer
///     }
///
///     fn process(&mut self, scope: &mut ProcessScope<'_>) -> PublisherResult<()> {
///         scope.set_value(json!(512))
///     }
/// }
/// ```
pub trait Process: Send {
    /// Name shown to users; collectors publish their value under this key
    fn name(&self) -> &str;

    /// Bucket this process is registered into
    fn category(&self) -> Category;

    /// Whether a failure aborts the whole publish
    fn mandatory(&self) -> bool {
        true
    }

    /// Free-text description for UI layers
    fn info(&self) -> &str {
        "..."
    }

    /// Kind a collect process validates its value against. Ignored for
    /// other categories.
    fn expected_kind(&self) -> ValueKind {
        ValueKind::String
    }

    /// Business logic of the stage
    fn process(&mut self, scope: &mut ProcessScope<'_>) -> PublisherResult<()>;

    /// Whether [`Process::fix`] does anything useful
    fn can_fix(&self) -> bool {
        false
    }

    /// Semi-automatic remediation of the problems found by the last run.
    ///
    /// Invoked by a host (e.g. a "Fix" button), never by `publish()`.
    fn fix(&mut self, _context: &mut Context) -> PublisherResult<()> {
        Err(PublisherError::FixNotImplemented(self.name().to_string()))
    }
}

/// Outcome of one process within a publish
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    pub name: String,
    pub category: Category,
    pub status: ProcessStatus,
    pub mandatory: bool,
    pub error_count: usize,
    pub duration: Duration,
    pub skipped: bool,
}

impl ProcessOutcome {
    /// Record a process that ran
    pub fn executed(state: &ProcessState, duration: Duration) -> Self {
        Self {
            name: state.name().to_string(),
            category: state.category(),
            status: state.status(),
            mandatory: state.mandatory(),
            error_count: state.errors().len(),
            duration,
            skipped: false,
        }
    }

    /// Record a process that was left untouched
    pub fn skipped(state: &ProcessState) -> Self {
        Self {
            skipped: true,
            ..Self::executed(state, Duration::from_secs(0))
        }
    }
}

/// Result of a publish that ran to the end
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReport {
    pub session_id: String,
    pub outcomes: Vec<ProcessOutcome>,
    pub total_duration: Duration,
}

impl PublishReport {
    /// Get the number of processes that were executed (not skipped)
    pub fn executed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.skipped).count()
    }

    /// Get the number of processes that were skipped
    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.skipped).count()
    }

    /// Processes that finished with a recoverable problem
    pub fn degraded(&self) -> impl Iterator<Item = &ProcessOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ProcessStatus::Warning | ProcessStatus::Failed))
    }

    /// True when every process ended in `Success`
    pub fn is_clean(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| o.status == ProcessStatus::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(status: ProcessStatus) -> ProcessState {
        let mut state = ProcessState::new("Check", Category::Check, false, "", None);
        state.status = status;
        state
    }

    #[test]
    fn test_category_order() {
        let mut shuffled = vec![
            Category::Push,
            Category::Collect,
            Category::Extract,
            Category::Check,
        ];
        shuffled.sort();
        assert_eq!(shuffled, Category::ALL.to_vec());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Collect".parse::<Category>().unwrap(), Category::Collect);
        assert_eq!(" push ".parse::<Category>().unwrap(), Category::Push);
        assert!(matches!(
            "validate".parse::<Category>(),
            Err(PublisherError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_outcome_skipped() {
        let outcome = ProcessOutcome::skipped(&state(ProcessStatus::Success));
        assert!(outcome.skipped);
        assert_eq!(outcome.duration, Duration::from_secs(0));
        assert_eq!(outcome.status, ProcessStatus::Success);
    }

    #[test]
    fn test_report_counts() {
        let report = PublishReport {
            session_id: "session-123".to_string(),
            outcomes: vec![
                ProcessOutcome::executed(&state(ProcessStatus::Success), Duration::from_millis(5)),
                ProcessOutcome::skipped(&state(ProcessStatus::Success)),
                ProcessOutcome::executed(&state(ProcessStatus::Warning), Duration::from_millis(5)),
            ],
            total_duration: Duration::from_millis(10),
        };

        assert_eq!(report.executed_count(), 2);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.degraded().count(), 1);
        assert!(!report.is_clean());
    }
}
