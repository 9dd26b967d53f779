/*!
 * Scope Types
 * Configuration property set with default/override composition
 */

use serde::Serialize;
use std::collections::BTreeMap;

/// String-keyed configuration for a scope.
///
/// Mutable while a scope is being assembled, read-only once it is built.
/// Composition is last-write-wins per key: merging overrides onto defaults
/// keeps every default the overrides do not name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge `overrides` into this set; overrides win on key collision.
    pub fn merge(&mut self, overrides: &Properties) {
        for (key, value) in &overrides.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_on_collision() {
        let mut base = Properties::new().with("A", "0").with("B", "2");
        let overrides = Properties::new().with("A", "1");

        base.merge(&overrides);

        assert_eq!(base.get("A"), Some("1"));
        assert_eq!(base.get("B"), Some("2"));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_merge_of_empty_is_identity() {
        let mut props = Properties::new().with("key", "value");
        props.merge(&Properties::new());
        assert_eq!(props.get("key"), Some("value"));
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn test_iter_yields_all_entries() {
        let props = Properties::new().with("x", "1").with("y", "2");
        let collected: Vec<_> = props.iter().collect();
        assert_eq!(collected, vec![("x", "1"), ("y", "2")]);
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let props = Properties::new().with("mode", "strict");
        let value = serde_json::to_value(&props).unwrap();
        assert_eq!(value, serde_json::json!({"mode": "strict"}));
    }
}
