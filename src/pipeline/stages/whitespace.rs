use crate::error::PublisherResult;
use crate::pipeline::{Category, Context, ErrorItem, Process, ProcessScope};
use serde_json::Value;

/// Check for string inputs with leading or trailing whitespace
///
/// Fixable: `fix` trims the offending values in place.
///
/// # Context Requirements
/// - Input: each of `keys` (String). Other kinds are ignored.
pub struct WhitespaceCheck {
    name: String,
    keys: Vec<String>,
}

impl WhitespaceCheck {
    pub fn new<I, K>(name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            name: name.into(),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    fn padded<'c>(&'c self, context: &'c Context) -> impl Iterator<Item = (&'c str, &'c str)> + 'c {
        self.keys.iter().filter_map(move |key| {
            let text = context.get(key)?.as_str()?;
            (text.trim() != text).then_some((key.as_str(), text))
        })
    }
}

impl Process for WhitespaceCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Check
    }

    fn mandatory(&self) -> bool {
        false
    }

    fn info(&self) -> &str {
        "Looks for padded text inputs; fixing will trim them."
    }

    fn process(&mut self, scope: &mut ProcessScope<'_>) -> PublisherResult<()> {
        let items: Vec<ErrorItem> = self
            .padded(scope.context())
            .map(|(key, text)| ErrorItem::new(key, format!("{:?}", text)))
            .collect();

        if !items.is_empty() {
            scope.add_error("Padded values", "leading or trailing whitespace", items);
        }
        Ok(())
    }

    fn can_fix(&self) -> bool {
        true
    }

    fn fix(&mut self, context: &mut Context) -> PublisherResult<()> {
        let trimmed: Vec<(String, String)> = self
            .padded(context)
            .map(|(key, text)| (key.to_string(), text.trim().to_string()))
            .collect();

        for (key, text) in trimmed {
            context.set(key, Value::String(text));
        }
        Ok(())
    }
}
