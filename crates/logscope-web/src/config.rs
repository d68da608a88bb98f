//! Persisted rule configuration.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use logscope_types::Rule;

use crate::error::WebError;

/// Rule configuration loaded from the saved JSON file.
///
/// The file is re-read for every request, so edits to it show up on the next
/// page load without a restart.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SavedConfig {
    /// Global rule sets by name
    #[serde(rename = "RuleSets", default)]
    pub rule_sets: HashMap<String, Rule>,

    /// Directory-specific rule sets, consulted before the global ones
    #[serde(rename = "LogDirs", default)]
    pub log_dirs: HashMap<String, HashMap<String, Rule>>,
}

impl SavedConfig {
    /// Load and decode the configuration file
    pub fn load(path: &Path) -> Result<Self, WebError> {
        let raw = std::fs::read_to_string(path).map_err(|source| WebError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| WebError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve a rule-set name for a directory.
    ///
    /// A directory-specific rule set shadows a global one of the same name.
    /// An unknown name resolves to no rule at all, which scans unfiltered.
    pub fn resolve_rule(&self, dir: &str, rule_set: &str) -> Option<&Rule> {
        self.log_dirs
            .get(dir)
            .and_then(|rules| rules.get(rule_set))
            .or_else(|| self.rule_sets.get(rule_set))
    }

    /// Sorted global rule-set names
    pub fn rule_set_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rule_sets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Sorted rule-set names specific to one directory
    pub fn dir_rule_set_names(&self, dir: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .log_dirs
            .get(dir)
            .map(|rules| rules.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Sorted directory names
    pub fn dir_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.log_dirs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SavedConfig {
        serde_json::from_str(
            r#"{
                "RuleSets": {
                    "errors": { "Op": "contains", "Data": "ERROR" },
                    "warnings": { "Op": "contains", "Data": "WARN" }
                },
                "LogDirs": {
                    "api": {
                        "errors": { "Op": "contains", "Data": "FATAL" }
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_decodes_rule_trees() {
        let config = sample();
        assert_eq!(config.rule_sets["errors"].op, "contains");
        assert_eq!(config.log_dirs["api"]["errors"].data, serde_json::json!("FATAL"));
    }

    #[test]
    fn test_dir_rules_shadow_global_ones() {
        let config = sample();
        let rule = config.resolve_rule("api", "errors").unwrap();
        assert_eq!(rule.data, serde_json::json!("FATAL"));

        // Other directories still see the global rule set.
        let rule = config.resolve_rule("worker", "errors").unwrap();
        assert_eq!(rule.data, serde_json::json!("ERROR"));
    }

    #[test]
    fn test_unknown_rule_set_resolves_to_none() {
        let config = sample();
        assert!(config.resolve_rule("api", "nope").is_none());
        assert!(config.resolve_rule("api", "").is_none());
    }

    #[test]
    fn test_names_are_sorted() {
        let config = sample();
        assert_eq!(config.rule_set_names(), ["errors", "warnings"]);
        assert_eq!(config.dir_rule_set_names("api"), ["errors"]);
        assert!(config.dir_rule_set_names("worker").is_empty());
        assert_eq!(config.dir_names(), ["api"]);
    }

    #[test]
    fn test_empty_document_decodes_to_defaults() {
        let config: SavedConfig = serde_json::from_str("{}").unwrap();
        assert!(config.rule_sets.is_empty());
        assert!(config.log_dirs.is_empty());
    }
}
