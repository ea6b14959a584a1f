//! Writes a finished run's artifacts into an output directory.

use adspend_reporting::PipelineOutput;
use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::csv_table::write_table;

pub const BUSINESS_FILE: &str = "processed_business.csv";
pub const MARKETING_FILE: &str = "processed_marketing.csv";
pub const COMBINED_FILE: &str = "processed_combined.csv";
pub const DAILY_MARKETING_FILE: &str = "processed_daily_marketing.csv";
pub const SUMMARY_FILE: &str = "summary.json";

const TABLE_FILES: [&str; 4] = [BUSINESS_FILE, MARKETING_FILE, COMBINED_FILE, DAILY_MARKETING_FILE];

pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.output_dir.join(file)
    }

    /// Write the four tabular artifacts, all of them or none.
    ///
    /// Tables are staged in a scratch directory under the output directory
    /// and renamed into place once every write succeeded. If a rename fails
    /// the files already moved are removed again.
    pub fn write_all(&self, output: &PipelineOutput) -> anyhow::Result<()> {
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("failed to create {}", self.output_dir.display()))?;

        let staging = tempfile::Builder::new()
            .prefix(".adspend-")
            .tempdir_in(&self.output_dir)
            .with_context(|| format!("failed to stage in {}", self.output_dir.display()))?;
        let staged = |file: &str| staging.path().join(file);

        write_table(&staged(BUSINESS_FILE), &output.business)?;
        write_table(&staged(MARKETING_FILE), &output.marketing)?;
        write_table(&staged(COMBINED_FILE), &output.combined)?;
        write_table(&staged(DAILY_MARKETING_FILE), &output.daily)?;

        for (i, &file) in TABLE_FILES.iter().enumerate() {
            if let Err(e) = fs::rename(staged(file), self.path(file)) {
                self.remove(&TABLE_FILES[..i]);
                return Err(e).with_context(|| {
                    format!("failed to move {file} into {}", self.output_dir.display())
                });
            }
        }

        info!(output_dir = %self.output_dir.display(), "Processed tables saved");
        Ok(())
    }

    fn remove(&self, files: &[&str]) {
        for file in files {
            let path = self.path(file);
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "Failed to roll back artifact");
            }
        }
    }

    pub fn write_json<T: Serialize>(&self, file: &str, value: &T) -> anyhow::Result<()> {
        write_json(&self.path(file), value)
    }
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
