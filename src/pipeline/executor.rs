use super::context::Context;
use super::core::{Category, Process, ProcessOutcome, PublishReport};
use super::process::ProcessHandle;
use crate::config::PublisherConfig;
use crate::error::{PublisherError, PublisherResult};
use crate::events::ProcessSnapshot;
use crate::logger::{LogHandle, LogLevel, LogSink, TracingSink};
use crate::state_machine::ProcessStatus;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Registry of processes and the driver that publishes them
///
/// Processes are grouped by [`Category`] and run Collect → Check → Extract →
/// Push, each bucket in registration order. The first mandatory process that
/// ends `Failed` aborts the publish.
///
/// # Example
/// ```
/// use publisher_lib::pipeline::stages::{RequiredKeysCheck, StaticCollector};
/// use publisher_lib::pipeline::{Manager, ValueKind};
/// use serde_json::json;
///
/// let mut manager = Manager::new();
/// manager
///     .register(StaticCollector::new("task_id", ValueKind::Integer, Some(json!(512))))
///     .unwrap();
/// manager
///     .register(RequiredKeysCheck::new("Check inputs", ["task_id"]))
///     .unwrap();
///
/// let report = manager.publish().unwrap();
/// assert!(report.is_clean());
/// assert_eq!(manager.context().get("task_id"), Some(&json!(512)));
/// ```
pub struct Manager {
    context: Context,
    registry: BTreeMap<Category, Vec<ProcessHandle>>,
    logger: LogHandle,
    config: PublisherConfig,
}

impl Manager {
    /// Create a manager with the default configuration, logging to `tracing`
    pub fn new() -> Self {
        Self::with_config(PublisherConfig::default())
    }

    pub fn with_config(config: PublisherConfig) -> Self {
        Self::with_logger(config, Arc::new(TracingSink))
    }

    /// Create a manager that sends its log lines to `sink`
    pub fn with_logger(config: PublisherConfig, sink: Arc<dyn LogSink>) -> Self {
        let registry = Category::ALL
            .iter()
            .map(|category| (*category, Vec::new()))
            .collect();

        Self {
            context: Context::new(),
            registry,
            logger: LogHandle::new(sink, config.log_level),
            config,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Register a process into the bucket named by its category
    ///
    /// Names double as context keys and lookup keys, so they must be unique
    /// across the whole manager.
    pub fn register<P: Process + 'static>(&mut self, process: P) -> PublisherResult<()> {
        self.register_boxed(Box::new(process))
    }

    /// Register a process built from its `Default` implementation
    pub fn register_default<P: Process + Default + 'static>(&mut self) -> PublisherResult<()> {
        self.register(P::default())
    }

    pub fn register_boxed(&mut self, process: Box<dyn Process>) -> PublisherResult<()> {
        if self.process(process.name()).is_some() {
            self.logger.log(
                LogLevel::Error,
                &format!("Duplicate process name: {}", process.name()),
                "manager",
            );
            return Err(PublisherError::DuplicateProcess(process.name().to_string()));
        }

        let handle = ProcessHandle::new(process, self.logger.clone());
        let category = handle.category();
        self.logger.log(
            LogLevel::Debug,
            &format!("Registered {} as a {} process", handle.name(), category),
            "manager",
        );
        self.registry.entry(category).or_default().push(handle);
        Ok(())
    }

    /// All registered processes, keyed by category in execution order
    pub fn processes(&self) -> &BTreeMap<Category, Vec<ProcessHandle>> {
        &self.registry
    }

    /// Processes of one category in registration order
    pub fn processes_in(&self, category: Category) -> &[ProcessHandle] {
        self.registry
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of registered processes
    pub fn len(&self) -> usize {
        self.registry.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn process(&self, name: &str) -> Option<&ProcessHandle> {
        self.registry
            .values()
            .flatten()
            .find(|handle| handle.name() == name)
    }

    pub fn process_mut(&mut self, name: &str) -> Option<&mut ProcessHandle> {
        self.registry
            .values_mut()
            .flatten()
            .find(|handle| handle.name() == name)
    }

    /// Set a collector's value from outside a publish (e.g. a form edit)
    ///
    /// The context is updated right away. Every process from the collector's
    /// category onwards is reset to `Uninitialized`, since their previous
    /// runs saw the old value.
    pub fn set_value(&mut self, name: &str, value: Value) -> PublisherResult<()> {
        let handle = self
            .registry
            .values_mut()
            .flatten()
            .find(|handle| handle.name() == name)
            .ok_or_else(|| PublisherError::ProcessNotFound(name.to_string()))?;

        handle.set_value(&mut self.context, value)?;
        let category = handle.category();
        self.invalidate_from(category);
        Ok(())
    }

    /// Put a process back to `Uninitialized`, notifying its observers
    pub fn reset(&mut self, name: &str) -> PublisherResult<()> {
        let handle = self
            .process_mut(name)
            .ok_or_else(|| PublisherError::ProcessNotFound(name.to_string()))?;
        handle.set_status(ProcessStatus::Uninitialized);
        Ok(())
    }

    /// Run a process's remediation hook
    pub fn fix(&mut self, name: &str) -> PublisherResult<()> {
        let handle = self
            .registry
            .values_mut()
            .flatten()
            .find(|handle| handle.name() == name)
            .ok_or_else(|| PublisherError::ProcessNotFound(name.to_string()))?;

        self.logger.log(
            LogLevel::Info,
            &format!("Running fix for {} (session: {})", name, self.context.session_id()),
            "manager",
        );
        if let Err(e) = handle.fix(&mut self.context) {
            self.logger.log(LogLevel::Warn, &e.to_string(), "manager");
            return Err(e);
        }
        let category = handle.category();
        self.invalidate_from(category);
        Ok(())
    }

    /// Reset every process in `category` and later categories
    fn invalidate_from(&mut self, category: Category) {
        for handle in self.registry.range_mut(category..).flat_map(|(_, handles)| handles) {
            if handle.status() != ProcessStatus::Uninitialized {
                handle.set_status(ProcessStatus::Uninitialized);
            }
        }
    }

    /// Serializable view of every process, in execution order
    pub fn snapshot(&self) -> Vec<ProcessSnapshot> {
        self.registry
            .values()
            .flatten()
            .map(ProcessSnapshot::from_handle)
            .collect()
    }

    /// Execute every registered process in category order
    ///
    /// A process that ends `Warning`, or `Failed` while optional, does not
    /// stop the publish. A mandatory process that ends `Failed` does: the
    /// remaining processes never run and the error lists the failed
    /// process's records.
    pub fn publish(&mut self) -> PublisherResult<PublishReport> {
        let total = self.len();
        self.logger.log(
            LogLevel::Info,
            &format!(
                "Publisher starting publish with {} processes (session: {})",
                total,
                self.context.session_id()
            ),
            "manager",
        );

        let publish_start = Instant::now();
        let mut outcomes = Vec::with_capacity(total);

        for (category, handles) in self.registry.iter_mut() {
            for handle in handles.iter_mut() {
                if self.config.skip_succeeded && handle.status() == ProcessStatus::Success {
                    self.logger.log(
                        LogLevel::Info,
                        &format!(
                            "Skipping {}: {} already succeeded (session: {})",
                            category,
                            handle.name(),
                            self.context.session_id()
                        ),
                        "manager",
                    );
                    outcomes.push(ProcessOutcome::skipped(handle.state()));
                    continue;
                }

                self.logger.log(
                    LogLevel::Info,
                    &format!(
                        "Executing {} {}/{}: {} (session: {})",
                        category,
                        outcomes.len() + 1,
                        total,
                        handle.name(),
                        self.context.session_id()
                    ),
                    "manager",
                );

                let process_start = Instant::now();
                handle.execute(&mut self.context);
                outcomes.push(ProcessOutcome::executed(
                    handle.state(),
                    process_start.elapsed(),
                ));

                if handle.status() == ProcessStatus::Failed && handle.mandatory() {
                    let details = handle
                        .errors()
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("\n");
                    self.logger.log(
                        LogLevel::Error,
                        &format!(
                            "An error occurred during publishing: {} failed after {:.2}s (session: {})",
                            handle.name(),
                            publish_start.elapsed().as_secs_f64(),
                            self.context.session_id()
                        ),
                        "manager",
                    );
                    return Err(PublisherError::PublishAborted {
                        process: handle.name().to_string(),
                        details,
                    });
                }
            }
        }

        let total_duration = publish_start.elapsed();
        self.logger.log(
            LogLevel::Info,
            &format!(
                "Publisher finished publish in {:.2}s (session: {})",
                total_duration.as_secs_f64(),
                self.context.session_id()
            ),
            "manager",
        );

        Ok(PublishReport {
            session_id: self.context.session_id().to_string(),
            outcomes,
            total_duration,
        })
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
