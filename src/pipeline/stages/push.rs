use crate::error::PublisherResult;
use crate::logger::LogLevel;
use crate::pipeline::{Category, Process, ProcessScope};
use serde_json::{json, Value};

/// Stage that publishes the manifest as a new version
///
/// # Context Requirements
/// - Input: `source_key` (any non-null) - Usually the manifest
/// - Input: `target_key` (Array, optional) - Version history so far
///
/// # Context Outputs
/// - `target_key` (Array) - History with `{ "version": n, "record": <source> }` appended
/// - `version` (Number) - The version just pushed
pub struct RecordPush {
    name: String,
    source_key: String,
    target_key: String,
}

impl RecordPush {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_key: "manifest".to_string(),
            target_key: "published_versions".to_string(),
        }
    }

    pub fn with_keys(mut self, source_key: impl Into<String>, target_key: impl Into<String>) -> Self {
        self.source_key = source_key.into();
        self.target_key = target_key.into();
        self
    }
}

impl Process for RecordPush {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Push
    }

    fn info(&self) -> &str {
        "Registers the extracted manifest as a new version."
    }

    fn process(&mut self, scope: &mut ProcessScope<'_>) -> PublisherResult<()> {
        let record = match scope.context().get(&self.source_key) {
            Some(value) if !value.is_null() => value.clone(),
            _ => {
                let details = format!("{} has not been extracted", self.source_key);
                scope.add_error("Nothing to push", details, Vec::new());
                return Ok(());
            }
        };

        let mut history = match scope.context().get(&self.target_key) {
            None => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => {
                let details = format!("{} is not a version history", self.target_key);
                scope.add_error("Invalid history", details, Vec::new());
                return Ok(());
            }
        };

        let version = history.len() + 1;
        history.push(json!({ "version": version, "record": record }));

        let context = scope.context_mut();
        context.set(self.target_key.clone(), Value::Array(history));
        context.set("version", json!(version));

        scope.log(
            LogLevel::Info,
            &format!("Pushed version {} to {}", version, self.target_key),
        );
        Ok(())
    }
}
