use std::fs;
use std::path::{Path, PathBuf};

use super::RuleSource;
use crate::error::Result;
use crate::types::RuleSet;

/// File-based RuleSource reading a JSON `RuleSet`.
///
/// The file is read on every fetch, so edits are picked up by the next reload.
pub struct FileRuleSource {
    path: PathBuf,
}

impl FileRuleSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RuleSource for FileRuleSource {
    fn fetch(&self) -> Result<RuleSet> {
        let data = fs::read(&self.path)?;
        let rules: RuleSet = serde_json::from_slice(&data)?;
        tracing::debug!(
            path = %self.path.display(),
            redirects = rules.redirects.len(),
            pages = rules.pages.len(),
            "loaded rule file"
        );
        Ok(rules)
    }
}
