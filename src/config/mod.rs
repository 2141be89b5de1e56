pub mod settings;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{CoreError, ExtractionOptions, IgnoreSet, DEFAULT_MAX_FILE_SIZE_KB};

/// User defaults persisted between runs. Command-line flags override them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HarvestConfig {
    pub max_file_size_kb: u64,
    pub include_binary: bool,
    /// Added to the built-in ignore tokens on every extraction.
    pub custom_ignore_patterns: Vec<String>,
    /// File name suggested when the document is written to disk.
    pub output_filename: String,
}

impl HarvestConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        settings::load_config(path)
    }

    /// Like [`HarvestConfig::load`], but a config that cannot be read or
    /// created never blocks a run: it is logged and defaults are used.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {:#}", e);
            Self::default()
        })
    }

    /// Builds validated extraction options from these defaults plus the
    /// comma-separated `extra_patterns` given for this run.
    pub fn extraction_options(
        &self,
        max_file_size_kb: Option<u64>,
        include_binary: bool,
        extra_patterns: &str,
    ) -> Result<ExtractionOptions, CoreError> {
        let options = ExtractionOptions {
            max_file_size_bytes: max_file_size_kb
                .unwrap_or(self.max_file_size_kb)
                .saturating_mul(1024),
            include_binary: include_binary || self.include_binary,
            ignore: IgnoreSet::with_custom(extra_patterns).union(&self.custom_ignore_patterns),
        };
        options.validate()?;
        Ok(options)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_file_size_kb: DEFAULT_MAX_FILE_SIZE_KB,
            include_binary: false,
            custom_ignore_patterns: Vec::new(),
            output_filename: "code_extract.txt".to_string(),
        }
    }
}
