//! The category vocabulary scored against every image.
//!
//! Small, closed, and fixed for the process lifetime. The default set matches
//! the wallpaper sorting use case; config can inject any other list.

use crate::error::ConfigError;

/// Default category labels.
pub const DEFAULT_CATEGORIES: [&str; 6] =
    ["nature", "city", "space", "abstract", "animals", "technology"];

/// A validated, ordered set of category labels.
#[derive(Debug, Clone)]
pub struct CategorySet {
    names: Vec<String>,
}

impl CategorySet {
    /// Build a category set, rejecting empty lists, blank labels, and
    /// duplicates (a duplicate label would double-count in the softmax).
    pub fn new(names: Vec<String>) -> Result<Self, ConfigError> {
        if names.is_empty() {
            return Err(ConfigError::ValidationError(
                "category list must not be empty".into(),
            ));
        }
        for name in &names {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "category labels must not be blank".into(),
                ));
            }
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate category label: {name}"
                )));
            }
        }
        Ok(Self { names })
    }

    /// All labels, in scoring order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the set is empty (never true for a constructed set).
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether a label belongs to this set.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self {
            names: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}
