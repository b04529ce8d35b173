use super::callbacks::{panic_message, CallbackId, CallbackKind, CallbackRegistry};
use super::collector::{CollectedValue, ValueKind};
use super::context::Context;
use super::core::{Category, Process};
use super::error_record::{ErrorItem, ErrorRecord};
use crate::error::{PublisherError, PublisherResult};
use crate::logger::{LogHandle, LogLevel};
use crate::state_machine::{resolve_terminal, ProcessStatus};
use serde::Serialize;
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};

const FAILED_PROCESS: &str = "Failed process";

/// Per-instance runtime state of a registered process
///
/// This is what observers see: callbacks receive a `&ProcessState`.
#[derive(Debug, Clone)]
pub struct ProcessState {
    pub(crate) name: String,
    pub(crate) category: Category,
    pub(crate) mandatory: bool,
    pub(crate) info: String,
    pub(crate) status: ProcessStatus,
    pub(crate) errors: Vec<ErrorRecord>,
    pub(crate) collected: Option<CollectedValue>,
}

impl ProcessState {
    pub(crate) fn new(
        name: impl Into<String>,
        category: Category,
        mandatory: bool,
        info: impl Into<String>,
        collected: Option<CollectedValue>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            mandatory,
            info: info.into(),
            status: ProcessStatus::Uninitialized,
            errors: Vec::new(),
            collected,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn status(&self) -> ProcessStatus {
        self.status
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn is_collector(&self) -> bool {
        self.collected.is_some()
    }

    /// Currently collected value, for collect processes
    pub fn value(&self) -> Option<&Value> {
        self.collected.as_ref().and_then(CollectedValue::value)
    }

    pub fn expected_kind(&self) -> Option<ValueKind> {
        self.collected.as_ref().map(CollectedValue::expected)
    }

    pub(crate) fn push_error(&mut self, record: ErrorRecord) {
        self.errors.push(record);
    }

    pub(crate) fn assign_value(
        &mut self,
        value: Value,
        context: &mut Context,
        logger: &LogHandle,
    ) -> PublisherResult<()> {
        let Some(slot) = self.collected.as_mut() else {
            return Err(PublisherError::NotACollector(self.name.clone()));
        };

        match slot.assign(&self.name, value, context, &mut self.errors) {
            Ok(()) => {
                logger.log(
                    LogLevel::Debug,
                    &format!(
                        "Context updated: {} (session: {})",
                        self.name,
                        context.session_id()
                    ),
                    "collector",
                );
                Ok(())
            }
            Err(e) => {
                logger.log(
                    LogLevel::Error,
                    &format!("{}: {}", self.name, e),
                    "collector",
                );
                Err(e)
            }
        }
    }
}

/// What a process body gets to work with during a run
pub struct ProcessScope<'a> {
    state: &'a mut ProcessState,
    context: &'a mut Context,
    logger: &'a LogHandle,
}

impl<'a> ProcessScope<'a> {
    pub(crate) fn new(
        state: &'a mut ProcessState,
        context: &'a mut Context,
        logger: &'a LogHandle,
    ) -> Self {
        Self {
            state,
            context,
            logger,
        }
    }

    pub fn name(&self) -> &str {
        self.state.name()
    }

    pub fn context(&self) -> &Context {
        &*self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut *self.context
    }

    /// Record a problem found by this run. Does not change the status.
    pub fn add_error(
        &mut self,
        code: impl Into<String>,
        details: impl Into<String>,
        items: Vec<ErrorItem>,
    ) {
        self.state.push_error(ErrorRecord::new(code, details, items));
    }

    /// Errors recorded so far in this run
    pub fn errors(&self) -> &[ErrorRecord] {
        self.state.errors()
    }

    /// Set the collected value and publish it into the context
    pub fn set_value(&mut self, value: Value) -> PublisherResult<()> {
        self.state.assign_value(value, &mut *self.context, self.logger)
    }

    /// Serialize `value` and collect it
    pub fn collect<T: Serialize>(&mut self, value: T) -> PublisherResult<()> {
        let value = serde_json::to_value(value)?;
        self.set_value(value)
    }

    pub fn value(&self) -> Option<&Value> {
        self.state.value()
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        self.logger.log(level, message, "process");
    }
}

/// A registered process: the implementation plus the state the engine keeps for it
pub struct ProcessHandle {
    definition: Box<dyn Process>,
    state: ProcessState,
    callbacks: CallbackRegistry,
    logger: LogHandle,
}

impl ProcessHandle {
    pub fn new(definition: Box<dyn Process>, logger: LogHandle) -> Self {
        let category = definition.category();
        let collected = match category {
            Category::Collect => Some(CollectedValue::new(definition.expected_kind())),
            _ => None,
        };
        let state = ProcessState::new(
            definition.name(),
            category,
            definition.mandatory(),
            definition.info(),
            collected,
        );

        Self {
            definition,
            state,
            callbacks: CallbackRegistry::new(),
            logger,
        }
    }

    pub fn state(&self) -> &ProcessState {
        &self.state
    }

    pub fn name(&self) -> &str {
        self.state.name()
    }

    pub fn category(&self) -> Category {
        self.state.category()
    }

    pub fn mandatory(&self) -> bool {
        self.state.mandatory()
    }

    pub fn info(&self) -> &str {
        self.state.info()
    }

    pub fn status(&self) -> ProcessStatus {
        self.state.status()
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        self.state.errors()
    }

    pub fn value(&self) -> Option<&Value> {
        self.state.value()
    }

    pub fn can_fix(&self) -> bool {
        self.definition.can_fix()
    }

    /// Append an error record. The status is left as is.
    pub fn add_error(
        &mut self,
        code: impl Into<String>,
        details: impl Into<String>,
        items: Vec<ErrorItem>,
    ) {
        self.state.push_error(ErrorRecord::new(code, details, items));
    }

    /// Assign the status and notify `StatusChanged` subscribers
    pub fn set_status(&mut self, status: ProcessStatus) {
        if !self.state.status.can_transition_to(status) {
            self.logger.log(
                LogLevel::Warn,
                &format!(
                    "Irregular status change for {}: {} -> {}",
                    self.state.name, self.state.status, status
                ),
                "process",
            );
        }
        self.state.status = status;
        self.callbacks
            .run(CallbackKind::StatusChanged, &self.state, &self.logger);
        self.logger.log(
            LogLevel::Debug,
            &format!("Status for {} set to {}", self.state.name, status),
            "process",
        );
    }

    pub fn add_callback<F>(&mut self, kind: CallbackKind, callback: F) -> CallbackId
    where
        F: Fn(&ProcessState) + Send + Sync + 'static,
    {
        let id = self.callbacks.add(kind, Box::new(callback));
        self.logger.log(
            LogLevel::Debug,
            &format!("Add callback {} {:?}: {:?}", self.state.name, kind, id),
            "process",
        );
        id
    }

    pub fn remove_callback(&mut self, id: CallbackId) -> bool {
        self.callbacks.remove(id)
    }

    /// Set the collected value from outside a run, e.g. a form edit
    ///
    /// The context is updated immediately. A type mismatch is both returned
    /// and recorded on the process.
    pub fn set_value(&mut self, context: &mut Context, value: Value) -> PublisherResult<()> {
        self.state.assign_value(value, context, &self.logger)
    }

    /// Run the process once
    ///
    /// Errors from the previous run are dropped first. Failures inside the
    /// process body never escape: they end up as an error record and a
    /// `Failed` status.
    pub fn execute(&mut self, context: &mut Context) {
        self.logger.log(
            LogLevel::Info,
            &format!(
                "Starting {} process: {} (session: {})",
                self.state.category,
                self.state.name,
                context.session_id()
            ),
            "process",
        );

        self.state.errors.clear();
        self.set_status(ProcessStatus::Executing);
        self.callbacks
            .run(CallbackKind::PreProcess, &self.state, &self.logger);

        let outcome = {
            let definition = &mut self.definition;
            let mut scope = ProcessScope::new(&mut self.state, context, &self.logger);
            panic::catch_unwind(AssertUnwindSafe(|| definition.process(&mut scope)))
        };

        match outcome {
            Ok(Ok(())) => {
                if self.state.collected.as_ref().is_some_and(CollectedValue::is_empty) {
                    self.state
                        .push_error(CollectedValue::missing_value_record());
                }

                let status = resolve_terminal(!self.state.errors.is_empty(), self.state.mandatory);
                self.set_status(status);
                if status == ProcessStatus::Failed {
                    self.logger.log(
                        LogLevel::Error,
                        &format!(
                            "{} failed with {} error(s) (session: {})",
                            self.state.name,
                            self.state.errors.len(),
                            context.session_id()
                        ),
                        "process",
                    );
                } else {
                    self.callbacks
                        .run(CallbackKind::PostProcess, &self.state, &self.logger);
                }
            }
            Ok(Err(e)) => self.fail_unhandled(e.to_string(), context),
            Err(payload) => self.fail_unhandled(panic_message(payload.as_ref()), context),
        }

        self.logger.log(
            LogLevel::Info,
            &format!(
                "Completed {} process: {} with status {} (session: {})",
                self.state.category,
                self.state.name,
                self.state.status,
                context.session_id()
            ),
            "process",
        );
    }

    /// Invoke the remediation hook, then mark the process as needing a rerun
    pub fn fix(&mut self, context: &mut Context) -> PublisherResult<()> {
        self.definition.fix(context)?;
        self.set_status(ProcessStatus::Uninitialized);
        Ok(())
    }

    fn fail_unhandled(&mut self, message: String, context: &Context) {
        self.logger.log(
            LogLevel::Error,
            &format!(
                "{} raised an unhandled error: {} (session: {})",
                self.state.name,
                message,
                context.session_id()
            ),
            "process",
        );
        self.state.push_error(ErrorRecord::new(
            FAILED_PROCESS,
            message.clone(),
            vec![ErrorItem::new(message.clone(), message)],
        ));
        self.set_status(ProcessStatus::Failed);
    }
}
