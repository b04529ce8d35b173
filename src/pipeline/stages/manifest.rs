use crate::error::PublisherResult;
use crate::logger::LogLevel;
use crate::pipeline::{is_empty_value, Category, Process, ProcessScope};
use chrono::Utc;
use serde_json::{Map, Value};

/// Stage that gathers collected inputs into a manifest
///
/// # Context Requirements
/// - Input: each of `keys` (any). Empty inputs are left out of the manifest.
///
/// # Context Outputs
/// - `output_key` (Object) - `{ "sessionId", "createdAt", "data": { <key>: <value> } }`
pub struct ManifestExtract {
    name: String,
    keys: Vec<String>,
    output_key: String,
}

impl ManifestExtract {
    /// Create a new manifest stage writing to `manifest`
    pub fn new<I, K>(name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            name: name.into(),
            keys: keys.into_iter().map(Into::into).collect(),
            output_key: "manifest".to_string(),
        }
    }

    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = key.into();
        self
    }
}

impl Process for ManifestExtract {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Extract
    }

    fn info(&self) -> &str {
        "Builds the manifest describing this version."
    }

    fn process(&mut self, scope: &mut ProcessScope<'_>) -> PublisherResult<()> {
        let context = scope.context();

        let mut data = Map::new();
        for key in &self.keys {
            if let Some(value) = context.get(key).filter(|v| !is_empty_value(Some(*v))) {
                data.insert(key.clone(), value.clone());
            }
        }

        let mut manifest = Map::new();
        manifest.insert(
            "sessionId".to_string(),
            Value::String(context.session_id().to_string()),
        );
        manifest.insert(
            "createdAt".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        let field_count = data.len();
        manifest.insert("data".to_string(), Value::Object(data));

        scope
            .context_mut()
            .set(self.output_key.clone(), Value::Object(manifest));
        scope.log(
            LogLevel::Debug,
            &format!("Manifest written to {} with {} field(s)", self.output_key, field_count),
        );
        Ok(())
    }
}
