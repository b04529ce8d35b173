use crate::error::PublisherResult;
use crate::pipeline::{is_empty_value, Category, ErrorItem, Process, ProcessScope};

/// Check that every listed context key holds a non-empty value
///
/// # Context Requirements
/// - Input: each of `keys` (any non-empty value)
pub struct RequiredKeysCheck {
    name: String,
    keys: Vec<String>,
    mandatory: bool,
}

impl RequiredKeysCheck {
    pub fn new<I, K>(name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            name: name.into(),
            keys: keys.into_iter().map(Into::into).collect(),
            mandatory: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.mandatory = false;
        self
    }
}

impl Process for RequiredKeysCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Check
    }

    fn mandatory(&self) -> bool {
        self.mandatory
    }

    fn info(&self) -> &str {
        "Checks that every required input has been collected."
    }

    fn process(&mut self, scope: &mut ProcessScope<'_>) -> PublisherResult<()> {
        let missing: Vec<ErrorItem> = self
            .keys
            .iter()
            .filter(|key| is_empty_value(scope.context().get(key)))
            .map(|key| ErrorItem::new(key.as_str(), key.as_str()))
            .collect();

        if !missing.is_empty() {
            scope.add_error(
                "Missing inputs",
                format!("{} required input(s) are empty", missing.len()),
                missing,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PublisherError;
    use crate::pipeline::Manager;
    use crate::state_machine::ProcessStatus;
    use serde_json::json;

    #[test]
    fn test_passes_when_all_present() {
        let mut manager = Manager::new();
        manager.context_mut().set("file", json!("/shots/sh010.ma"));
        manager.context_mut().set("task_id", json!(512));
        manager
            .register(RequiredKeysCheck::new("Check inputs", ["file", "task_id"]))
            .unwrap();

        manager.publish().unwrap();

        assert_eq!(
            manager.process("Check inputs").unwrap().status(),
            ProcessStatus::Success
        );
    }

    #[test]
    fn test_lists_every_empty_key() {
        let mut manager = Manager::new();
        manager.context_mut().set("file", json!(""));
        manager.context_mut().set("preview", json!(null));
        manager.context_mut().set("task_id", json!(512));
        manager
            .register(RequiredKeysCheck::new(
                "Check inputs",
                ["file", "preview", "task_id", "Description"],
            ))
            .unwrap();

        let err = manager.publish().unwrap_err();
        assert!(matches!(err, PublisherError::PublishAborted { .. }));

        let process = manager.process("Check inputs").unwrap();
        let record = &process.errors()[0];
        assert_eq!(record.code(), "Missing inputs");
        assert_eq!(record.details(), "3 required input(s) are empty");
        let labels: Vec<&str> = record.items().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["file", "preview", "Description"]);
    }

    #[test]
    fn test_optional_check_warns() {
        let mut manager = Manager::new();
        manager
            .register(RequiredKeysCheck::new("Check inputs", ["BID"]).optional())
            .unwrap();

        manager.publish().unwrap();

        assert_eq!(
            manager.process("Check inputs").unwrap().status(),
            ProcessStatus::Warning
        );
    }
}
