use crate::error::PublisherResult;
use crate::pipeline::{Category, ErrorItem, Process, ProcessScope};
use std::collections::BTreeMap;

/// Separator between levels of a hierarchy path (`|root|group|node`)
pub const PATH_SEPARATOR: char = '|';

/// Check that no two hierarchy paths end in the same short name
///
/// # Context Requirements
/// - Input: `key` (Array of strings) - Full hierarchy paths. Nothing to check when absent.
pub struct RepeatedNamesCheck {
    name: String,
    key: String,
}

impl RepeatedNamesCheck {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

fn short_name(path: &str) -> &str {
    path.rsplit(PATH_SEPARATOR).next().unwrap_or(path)
}

impl Process for RepeatedNamesCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Check
    }

    fn info(&self) -> &str {
        "Checks whether there are 2 or more nodes sharing the same short name."
    }

    fn process(&mut self, scope: &mut ProcessScope<'_>) -> PublisherResult<()> {
        let Some(value) = scope.context().get(&self.key) else {
            return Ok(());
        };

        let Some(paths) = value.as_array() else {
            let details = format!("{} must be an array of paths", self.key);
            scope.add_error("Invalid input", details, Vec::new());
            return Ok(());
        };

        // Short name -> every full path carrying it
        let mut by_short: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for path in paths.iter().filter_map(|p| p.as_str()) {
            by_short.entry(short_name(path)).or_default().push(path);
        }

        let items: Vec<ErrorItem> = by_short
            .iter()
            .filter(|(_, full)| full.len() > 1)
            .flat_map(|(short, full)| full.iter().map(|path| ErrorItem::new(*short, *path)))
            .collect();

        if !items.is_empty() {
            let details = format!("{} nodes share a short name", items.len());
            scope.add_error("Repeated node names", details, items);
        }
        Ok(())
    }
}
