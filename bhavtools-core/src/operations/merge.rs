use crate::error::Result;
use crate::merge::{merge_files, MergeOptions};
use crate::output::MergeReport;
use crate::progress::StdoutProgress;
use std::path::Path;

/// Merge every CSV matched by `pattern` under `root` into `root/output_name`.
pub fn merge_operation(
    root: impl AsRef<Path>,
    pattern: &str,
    output_name: impl AsRef<Path>,
) -> Result<MergeReport> {
    merge_files(
        root.as_ref(),
        pattern,
        output_name.as_ref(),
        &MergeOptions::default(),
        &mut StdoutProgress,
    )
}
