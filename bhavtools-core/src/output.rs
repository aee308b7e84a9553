use crate::error::BhavError;
use crate::rename::{PlannedRename, RenameCollision, RenamePlan, SkippedFile};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Output format for batch reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

/// A file the batch gave up on while continuing with the rest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub error: String,
}

impl FileFailure {
    pub fn new(err: &BhavError) -> Self {
        Self {
            path: err.path().cloned(),
            error: err.to_string(),
        }
    }
}

/// Result of a rename batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameReport {
    pub root: PathBuf,
    pub pattern: String,
    pub matched: usize,
    pub renamed: Vec<PlannedRename>,
    pub skipped: Vec<SkippedFile>,
    pub collisions: Vec<RenameCollision>,
    pub failures: Vec<FileFailure>,
    pub dry_run: bool,
}

impl RenameReport {
    pub(crate) fn new(root: &Path, pattern: &str, plan: &RenamePlan, dry_run: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            pattern: pattern.to_string(),
            matched: plan.matched(),
            renamed: Vec::new(),
            skipped: plan.skipped().cloned().collect(),
            collisions: plan.collisions.clone(),
            failures: Vec::new(),
            dry_run,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of a merge batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    pub root: PathBuf,
    pub pattern: String,
    /// Set once the output file has been written
    pub output: Option<PathBuf>,
    pub inputs: Vec<PathBuf>,
    /// Rows written, header included
    pub rows_written: usize,
    pub headers_dropped: usize,
    pub failures: Vec<FileFailure>,
}

impl MergeReport {
    pub(crate) fn new(root: &Path, pattern: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            pattern: pattern.to_string(),
            output: None,
            inputs: Vec::new(),
            rows_written: 0,
            headers_dropped: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Trait for formatting output in different formats
pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }
    fn format_json(&self) -> String;
    fn format_summary(&self) -> String;
}

impl OutputFormatter for RenameReport {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.is_success(),
            "operation": "rename",
            "root": self.root,
            "pattern": self.pattern,
            "dry_run": self.dry_run,
            "summary": {
                "matched": self.matched,
                "renamed": self.renamed.len(),
                "skipped": self.skipped.len(),
                "collisions": self.collisions.len(),
                "failures": self.failures.len(),
            },
            "renamed": self.renamed,
            "skipped": self.skipped,
            "collisions": self.collisions,
            "failures": self.failures,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        if self.matched == 0 {
            return "No files matched the pattern\n".to_string();
        }

        let mut output = String::new();
        let verb = if self.dry_run { "Would rename" } else { "Renamed" };
        writeln!(
            output,
            "{} {} of {} matched files ({} skipped)",
            verb,
            self.renamed.len(),
            self.matched,
            self.skipped.len()
        )
        .unwrap();

        for collision in &self.collisions {
            writeln!(
                output,
                "Collision: {} -> {} (date {})",
                collision.from.display(),
                collision.to.display(),
                collision.token
            )
            .unwrap();
        }

        for failure in &self.failures {
            writeln!(output, "Failed: {}", failure.error).unwrap();
        }

        output
    }
}

impl OutputFormatter for MergeReport {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.is_success(),
            "operation": "merge",
            "root": self.root,
            "pattern": self.pattern,
            "output": self.output,
            "summary": {
                "inputs": self.inputs.len(),
                "rows_written": self.rows_written,
                "headers_dropped": self.headers_dropped,
                "failures": self.failures.len(),
            },
            "inputs": self.inputs,
            "failures": self.failures,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let Some(ref path) = self.output else {
            return "No files matched the pattern\n".to_string();
        };
        if self.inputs.is_empty() && self.failures.is_empty() {
            return format!(
                "No files matched the pattern\nWrote empty {}\n",
                path.display()
            );
        }

        let mut output = format!(
            "Merged {} files into {}\n",
            self.inputs.len(),
            path.display()
        );
        writeln!(output, "Rows written: {}", self.rows_written).unwrap();

        for failure in &self.failures {
            writeln!(output, "Failed: {}", failure.error).unwrap();
        }

        output
    }
}
