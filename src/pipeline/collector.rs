use super::context::Context;
use super::error_record::{ErrorItem, ErrorRecord};
use crate::error::{PublisherError, PublisherResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub(crate) const FAILED_COLLECT: &str = "Failed collect";
pub(crate) const MISSING_VALUE: &str = "missing value";

/// Type descriptor a collector validates its value against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Any non-null JSON value
    Any,
    String,
    Integer,
    Float,
    /// Integer or float
    Number,
    Bool,
    Array,
    Object,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Any => "any",
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Number => "number",
            ValueKind::Bool => "bool",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }

    /// Check whether `value` is of this kind. `null` only matches nothing.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ValueKind::Any => !value.is_null(),
            ValueKind::String => value.is_string(),
            ValueKind::Integer => value.is_i64() || value.is_u64(),
            ValueKind::Float => value.is_f64(),
            ValueKind::Number => value.is_number(),
            ValueKind::Bool => value.is_boolean(),
            ValueKind::Array => value.is_array(),
            ValueKind::Object => value.is_object(),
        }
    }

    /// Name of the kind a concrete value has
    pub fn describe(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(n) if n.is_f64() => "float",
            Value::Number(_) => "integer",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `None`, `null` and `""` all count as "nothing collected"
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Value slot owned by a collect process
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedValue {
    expected: ValueKind,
    value: Option<Value>,
}

impl CollectedValue {
    pub fn new(expected: ValueKind) -> Self {
        Self {
            expected,
            value: None,
        }
    }

    pub fn expected(&self) -> ValueKind {
        self.expected
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        is_empty_value(self.value.as_ref())
    }

    /// Validate and store `value`, publishing it under `name`
    ///
    /// On a kind mismatch the record is pushed to `errors`, the context is left
    /// alone and the mismatch is returned to the caller as well.
    pub(crate) fn assign(
        &mut self,
        name: &str,
        value: Value,
        context: &mut Context,
        errors: &mut Vec<ErrorRecord>,
    ) -> PublisherResult<()> {
        if !self.expected.matches(&value) {
            let message = format!("Value must be of type {}", self.expected);
            errors.push(ErrorRecord::new(
                FAILED_COLLECT,
                message.clone(),
                vec![ErrorItem::new(message.clone(), message)],
            ));
            return Err(PublisherError::TypeMismatch {
                expected: self.expected.to_string(),
                found: ValueKind::describe(&value).to_string(),
            });
        }

        context.set(name, value.clone());
        self.value = Some(value);
        Ok(())
    }

    pub(crate) fn missing_value_record() -> ErrorRecord {
        ErrorRecord::new(
            FAILED_COLLECT,
            MISSING_VALUE,
            vec![ErrorItem::new(MISSING_VALUE, MISSING_VALUE)],
        )
    }
}
