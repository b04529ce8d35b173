use serde::Serialize;
use std::fmt;

/// One offending item attached to an [`ErrorRecord`]
///
/// `label` is what a UI shows (e.g. a short node name), `identifier` is what
/// a fix or a selection tool needs (e.g. the full DAG path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorItem {
    pub label: String,
    pub identifier: String,
}

impl ErrorItem {
    pub fn new(label: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            identifier: identifier.into(),
        }
    }
}

impl<L: Into<String>, I: Into<String>> From<(L, I)> for ErrorItem {
    fn from((label, identifier): (L, I)) -> Self {
        Self::new(label, identifier)
    }
}

/// Immutable description of one failure reported by a process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    code: String,
    details: String,
    items: Vec<ErrorItem>,
}

impl ErrorRecord {
    pub fn new(code: impl Into<String>, details: impl Into<String>, items: Vec<ErrorItem>) -> Self {
        Self {
            code: code.into(),
            details: details.into(),
            items,
        }
    }

    /// Short error code, e.g. `"Repeated node names"`
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn items(&self) -> &[ErrorItem] {
        &self.items
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.code, self.details)
    }
}
