use crate::error::PublisherResult;
use crate::logger::LogLevel;
use crate::pipeline::{Category, Process, ProcessScope, ValueKind};
use serde_json::Value;

/// Collector whose value is known when the pipeline is assembled
///
/// With `None` the collector produces nothing on its own, so the value has to
/// come from an interactive edit (`Manager::set_value`); otherwise the run
/// reports a missing value.
///
/// # Context Outputs
/// - `<name>` - The collected value
///
/// # Example
/// ```
/// use publisher_lib::pipeline::stages::StaticCollector;
/// use publisher_lib::pipeline::{Manager, ValueKind};
/// use serde_json::json;
///
/// let mut manager = Manager::new();
/// manager
///     .register(StaticCollector::new("file", ValueKind::String, Some(json!("/shots/sh010.ma"))))
///     .unwrap();
/// manager.publish().unwrap();
/// assert_eq!(manager.context().get_string("file").unwrap(), "/shots/sh010.ma");
/// ```
pub struct StaticCollector {
    name: String,
    kind: ValueKind,
    value: Option<Value>,
    mandatory: bool,
    info: String,
}

impl StaticCollector {
    pub fn new(name: impl Into<String>, kind: ValueKind, value: Option<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
            mandatory: true,
            info: "...".to_string(),
        }
    }

    /// A missing value only downgrades the publish to a warning
    pub fn optional(mut self) -> Self {
        self.mandatory = false;
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }
}

impl Process for StaticCollector {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Collect
    }

    fn mandatory(&self) -> bool {
        self.mandatory
    }

    fn info(&self) -> &str {
        &self.info
    }

    fn expected_kind(&self) -> ValueKind {
        self.kind
    }

    fn process(&mut self, scope: &mut ProcessScope<'_>) -> PublisherResult<()> {
        match &self.value {
            Some(value) => scope.set_value(value.clone()),
            None => {
                scope.log(
                    LogLevel::Debug,
                    &format!("No preset value for {}", self.name),
                );
                Ok(())
            }
        }
    }
}
