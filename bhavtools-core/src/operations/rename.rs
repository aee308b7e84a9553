use crate::error::Result;
use crate::output::RenameReport;
use crate::progress::StdoutProgress;
use crate::rename::{rename_files, RenameOptions};
use std::path::Path;

/// Rename every `BhavCopy` file matched by `pattern` under `root` to
/// `<date>_bhav.csv`.
pub fn rename_operation(root: impl AsRef<Path>, pattern: &str) -> Result<RenameReport> {
    rename_files(
        root.as_ref(),
        pattern,
        &RenameOptions::default(),
        &mut StdoutProgress,
    )
}
