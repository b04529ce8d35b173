use crate::pipeline::{Category, ErrorRecord, ProcessHandle, ProcessState};
use crate::state_machine::ProcessStatus;
use serde::Serialize;
use serde_json::Value;

/// Event names - centralized for consistency
pub mod event_names {
    pub const PROCESS_STATUS_CHANGED: &str = "process:status-changed";
}

/// Serializable view of a registered process, for UI layers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSnapshot {
    pub name: String,
    pub category: Category,
    pub mandatory: bool,
    pub info: String,
    pub status: ProcessStatus,
    pub errors: Vec<ErrorRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub can_fix: bool,
}

impl ProcessSnapshot {
    pub fn from_handle(handle: &ProcessHandle) -> Self {
        let state = handle.state();
        Self {
            name: state.name().to_string(),
            category: state.category(),
            mandatory: state.mandatory(),
            info: state.info().to_string(),
            status: state.status(),
            errors: state.errors().to_vec(),
            value: state.value().cloned(),
            can_fix: handle.can_fix(),
        }
    }
}

/// Process status changed event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangedEvent {
    pub event: &'static str,
    pub process_name: String,
    pub category: Category,
    pub status: ProcessStatus,
    pub error_count: usize,
    pub timestamp: String,
}

impl StatusChangedEvent {
    pub fn from_state(state: &ProcessState) -> Self {
        Self {
            event: event_names::PROCESS_STATUS_CHANGED,
            process_name: state.name().to_string(),
            category: state.category(),
            status: state.status(),
            error_count: state.errors().len(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Build a `StatusChanged` callback that hands each change to `emit` as an event
///
/// # Example
/// ```
/// use publisher_lib::events::status_emitter;
/// use publisher_lib::pipeline::{CallbackKind, Manager, ValueKind};
/// use publisher_lib::pipeline::stages::StaticCollector;
///
/// let mut manager = Manager::new();
/// manager
///     .register(StaticCollector::new("shot", ValueKind::String, None))
///     .unwrap();
/// manager.process_mut("shot").unwrap().add_callback(
///     CallbackKind::StatusChanged,
///     status_emitter(|event| println!("{}", serde_json::to_string(&event).unwrap())),
/// );
/// ```
pub fn status_emitter<F>(emit: F) -> impl Fn(&ProcessState) + Send + Sync + 'static
where
    F: Fn(StatusChangedEvent) + Send + Sync + 'static,
{
    move |state: &ProcessState| emit(StatusChangedEvent::from_state(state))
}
