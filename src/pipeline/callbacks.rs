use super::process::ProcessState;
use crate::logger::{LogHandle, LogLevel};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

/// Moment in a process lifecycle an observer can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    /// Right after the status flips to `Executing`, before the process body
    PreProcess,
    /// After a non-failed run has settled its status
    PostProcess,
    /// Every status assignment, including manual resets
    StatusChanged,
}

/// Token returned by `add_callback`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

pub type Callback = Box<dyn Fn(&ProcessState) + Send + Sync>;

/// Ordered per-kind subscriber lists
///
/// Subscribers run synchronously in registration order. A subscriber that
/// panics is logged and skipped; the remaining subscribers still run.
#[derive(Default)]
pub struct CallbackRegistry {
    next_id: u64,
    entries: HashMap<CallbackKind, Vec<(CallbackId, Callback)>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: CallbackKind, callback: Callback) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.entries.entry(kind).or_default().push((id, callback));
        id
    }

    /// Remove a subscriber; returns `false` if the token is unknown
    pub fn remove(&mut self, id: CallbackId) -> bool {
        for callbacks in self.entries.values_mut() {
            if let Some(index) = callbacks.iter().position(|(entry, _)| *entry == id) {
                callbacks.remove(index);
                return true;
            }
        }
        false
    }

    pub fn count(&self, kind: CallbackKind) -> usize {
        self.entries.get(&kind).map_or(0, Vec::len)
    }

    pub fn run(&self, kind: CallbackKind, state: &ProcessState, logger: &LogHandle) {
        let Some(callbacks) = self.entries.get(&kind) else {
            return;
        };

        for (id, callback) in callbacks {
            logger.log(
                LogLevel::Debug,
                &format!("{} callback {:?} executing: {:?}", state.name(), kind, id),
                "callbacks",
            );
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(state))) {
                logger.log(
                    LogLevel::Error,
                    &format!(
                        "Callback execution failed for {} ({:?}): {}",
                        state.name(),
                        kind,
                        panic_message(payload.as_ref())
                    ),
                    "callbacks",
                );
            }
        }
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
