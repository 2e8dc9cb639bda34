//! Topic-to-filenames mapping and its JSON serialization.
//!
//! The mapping is the pipeline's final artifact: each topic label maps to the
//! transcript file names assigned to it. Label collisions merge rather than
//! overwrite, and merging is case-insensitive with the first-seen casing
//! kept, so "Cooking" and "cooking" end up as one topic.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, ResultExt};

/// Mapping from topic label to the file names assigned to that topic.
///
/// Insertion order is preserved so the written JSON lists topics in the order
/// they were produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicMapping {
    topics: IndexMap<String, Vec<String>>,
}

impl TopicMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file under a label, merging case-insensitively with any label
    /// already present. The casing of the first occurrence wins.
    pub fn insert(&mut self, label: &str, file_name: impl Into<String>) {
        let key = self.canonical_key(label);
        self.topics.entry(key).or_default().push(file_name.into());
    }

    /// Add several files under one label at once.
    pub fn insert_all<I, S>(&mut self, label: &str, file_names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = self.canonical_key(label);
        let entry = self.topics.entry(key).or_default();
        entry.extend(file_names.into_iter().map(Into::into));
    }

    fn canonical_key(&self, label: &str) -> String {
        let lowered = label.to_lowercase();
        self.topics
            .keys()
            .find(|existing| existing.to_lowercase() == lowered)
            .cloned()
            .unwrap_or_else(|| label.to_string())
    }

    /// Number of distinct topics.
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Total number of file entries across all topics.
    pub fn file_count(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }

    /// Whether the mapping holds no topics.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Files assigned to `label`, matched case-insensitively.
    pub fn files_for(&self, label: &str) -> Option<&[String]> {
        let lowered = label.to_lowercase();
        self.topics
            .iter()
            .find(|(key, _)| key.to_lowercase() == lowered)
            .map(|(_, files)| files.as_slice())
    }

    /// Iterate over `(label, files)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.topics.iter()
    }

    /// Write the mapping as pretty-printed JSON.
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing topic mapping")?;
        fs::write(path, json)
            .with_context(|| format!("writing topic mapping to {}", path.display()))?;
        Ok(())
    }

    /// Read a mapping back from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading topic mapping from {}", path.display()))?;
        let mut raw: Self =
            serde_json::from_str(&contents).context("parsing topic mapping JSON")?;
        raw.merge_duplicate_labels();
        Ok(raw)
    }

    /// Collapse labels that differ only in case into one entry each.
    pub fn merge_duplicate_labels(&mut self) {
        let mut seen: HashMap<String, String> = HashMap::new();
        let mut merged: IndexMap<String, Vec<String>> = IndexMap::new();

        for (label, files) in self.topics.drain(..) {
            let lowered = label.to_lowercase();
            let key = seen.entry(lowered).or_insert_with(|| label.clone()).clone();
            merged.entry(key).or_default().extend(files);
        }

        self.topics = merged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn insert_merges_case_insensitively() {
        let mut mapping = TopicMapping::new();
        mapping.insert("Cooking", "talk_1.stm");
        mapping.insert("cooking", "talk_2.stm");
        mapping.insert("COOKING", "talk_3.stm");

        assert_eq!(mapping.topic_count(), 1);
        assert_eq!(
            mapping.files_for("cooking").unwrap(),
            &["talk_1.stm", "talk_2.stm", "talk_3.stm"]
        );
    }

    #[test]
    fn first_seen_casing_wins() {
        let mut mapping = TopicMapping::new();
        mapping.insert("Machine Learning", "a.stm");
        mapping.insert("machine learning", "b.stm");

        let labels: Vec<_> = mapping.iter().map(|(label, _)| label.clone()).collect();
        assert_eq!(labels, vec!["Machine Learning"]);
    }

    #[test]
    fn collisions_append_rather_than_overwrite() {
        let mut mapping = TopicMapping::new();
        mapping.insert_all("travel", ["a.stm", "b.stm"]);
        mapping.insert_all("travel", ["c.stm"]);

        assert_eq!(mapping.files_for("travel").unwrap().len(), 3);
    }

    #[test]
    fn json_round_trip_preserves_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("topic_mappings.json");

        let mut mapping = TopicMapping::new();
        mapping.insert_all("cooking", ["talk_1.stm", "talk_2.stm"]);
        mapping.insert("engines", "talk_3.stm");
        mapping.to_json_file(&path).unwrap();

        let restored = TopicMapping::from_json_file(&path).unwrap();
        assert_eq!(restored, mapping);
    }

    #[test]
    fn loading_merges_duplicate_labels_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("topic_mappings.json");
        fs::write(
            &path,
            r#"{"Cooking": ["a.stm"], "cooking": ["b.stm"]}"#,
        )
        .unwrap();

        let mapping = TopicMapping::from_json_file(&path).unwrap();
        assert_eq!(mapping.topic_count(), 1);
        assert_eq!(mapping.files_for("Cooking").unwrap(), &["a.stm", "b.stm"]);
    }
}
