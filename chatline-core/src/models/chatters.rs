//! Chatter username index.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Usernames seen in a channel, indexed case-insensitively.
///
/// Names keep the casing they were last added with; lookups ignore case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ChatterIndex {
    // lowercase -> display name
    names: BTreeMap<String, String>,
}

impl ChatterIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or re-cases) a chatter.
    pub fn add_chatter(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        self.names.insert(name.to_lowercase(), name);
    }

    /// Removes a chatter, ignoring case.
    pub fn remove_chatter(&mut self, name: &str) -> bool {
        self.names.remove(&name.to_lowercase()).is_some()
    }

    /// Returns true if `name` is present, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&name.to_lowercase())
    }

    /// Returns every chatter whose name starts with `prefix`, ignoring
    /// case, in case-insensitive alphabetical order.
    pub fn filter_by_prefix(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        self.names
            .range(prefix.clone()..)
            .take_while(|(lower, _)| lower.starts_with(&prefix))
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Number of chatters.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no chatters are known.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<String> for ChatterIndex {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut index = Self::new();
        for name in iter {
            index.add_chatter(name);
        }
        index
    }
}

impl From<Vec<String>> for ChatterIndex {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<ChatterIndex> for Vec<String> {
    fn from(index: ChatterIndex) -> Self {
        index.names.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(names: &[&str]) -> ChatterIndex {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn test_filter_by_prefix_ignores_case() {
        let chatters = index(&["Forsen", "forsenBot", "xQc", "FOOBAR", "bar"]);

        assert_eq!(
            chatters.filter_by_prefix("fo"),
            vec!["FOOBAR", "Forsen", "forsenBot"]
        );
        assert_eq!(chatters.filter_by_prefix("XQ"), vec!["xQc"]);
        assert!(chatters.filter_by_prefix("z").is_empty());
    }

    #[test]
    fn test_empty_prefix_returns_everyone() {
        let chatters = index(&["b", "A", "c"]);
        assert_eq!(chatters.filter_by_prefix(""), vec!["A", "b", "c"]);
    }

    #[test]
    fn test_add_recases_existing() {
        let mut chatters = index(&["pajlada"]);
        chatters.add_chatter("Pajlada");
        chatters.add_chatter("");

        assert_eq!(chatters.len(), 1);
        assert_eq!(chatters.filter_by_prefix("p"), vec!["Pajlada"]);
        assert!(chatters.contains("PAJLADA"));
        assert!(chatters.remove_chatter("pAjLaDa"));
        assert!(chatters.is_empty());
    }
}
