use crate::error::{PublisherError, PublisherResult};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Shared blackboard passed to every process
///
/// The context is the only channel processes use to talk to each other.
/// Collectors publish their value under their own name; later categories read
/// it back. Keys are unique and the last write wins.
///
/// # Example
/// ```
/// use publisher_lib::pipeline::Context;
/// use serde_json::json;
///
/// let mut context = Context::new();
/// context.set("task_id", json!(512));
/// context.set_string("file", "/show/seq/shot/model.ma");
///
/// assert_eq!(context.get("task_id"), Some(&json!(512)));
/// assert_eq!(context.get_string("file").unwrap(), "/show/seq/shot/model.ma");
/// assert!(context.get("missing").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Context {
    /// Identifier of the run that owns this context, used to tag log lines
    session_id: String,

    /// Key-value store for pipeline data
    data: HashMap<String, Value>,
}

impl Context {
    /// Create a context with a fresh session ID
    pub fn new() -> Self {
        Self::with_session_id(Uuid::new_v4().to_string())
    }

    /// Create a context with an explicit session ID
    pub fn with_session_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            data: HashMap::new(),
        }
    }

    /// Get the session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Set a value in the context, overwriting silently
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Get a value from the context or return an error if not found
    pub fn get_required(&self, key: &str) -> PublisherResult<&Value> {
        self.data
            .get(key)
            .ok_or_else(|| PublisherError::MissingContextKey(key.to_string()))
    }

    /// Set a string value
    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), Value::String(value.into()));
    }

    /// Get a string value
    pub fn get_string(&self, key: &str) -> PublisherResult<String> {
        match self.get_required(key)? {
            Value::String(s) => Ok(s.clone()),
            _ => Err(PublisherError::ContextType {
                key: key.to_string(),
                expected: "string",
            }),
        }
    }

    /// Set a boolean value
    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.data.insert(key.into(), Value::Bool(value));
    }

    /// Get a boolean value
    pub fn get_bool(&self, key: &str) -> PublisherResult<bool> {
        match self.get_required(key)? {
            Value::Bool(b) => Ok(*b),
            _ => Err(PublisherError::ContextType {
                key: key.to_string(),
                expected: "boolean",
            }),
        }
    }

    /// Get an integer value
    pub fn get_i64(&self, key: &str) -> PublisherResult<i64> {
        self.get_required(key)?
            .as_i64()
            .ok_or_else(|| PublisherError::ContextType {
                key: key.to_string(),
                expected: "integer",
            })
    }

    /// Get a number value
    pub fn get_number(&self, key: &str) -> PublisherResult<f64> {
        self.get_required(key)?
            .as_f64()
            .ok_or_else(|| PublisherError::ContextType {
                key: key.to_string(),
                expected: "number",
            })
    }

    /// Check if a key exists in the context
    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove a value from the context
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Get all data keys
    pub fn keys(&self) -> Vec<&String> {
        self.data.keys().collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
