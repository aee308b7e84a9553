#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Rename and merge exchange bhavcopy CSV downloads.
//!
//! Two independent batch operations over the files a glob selects in a
//! directory:
//!
//! - [`rename_files`] turns `...BhavCopy...20241210...csv` into
//!   `20241210_bhav.csv` in place.
//! - [`merge_files`] concatenates CSV files into one, keeping only the first
//!   header row.

pub mod config;
pub mod error;
pub mod merge;
pub mod operations;
pub mod output;
pub mod pattern;
pub mod progress;
pub mod rename;

pub use config::Config;
pub use error::{BhavError, ErrorPolicy, Result};
pub use merge::{merge_files, read_records, MergeOptions};
pub use operations::{merge_operation, rename_operation};
pub use output::{FileFailure, MergeReport, OutputFormat, OutputFormatter, RenameReport};
pub use pattern::{find_files, FilePattern};
pub use progress::{
    NoProgress, ProgressCadence, ProgressEvent, ProgressSink, Stage, StdoutProgress,
};
pub use rename::{
    extract_date_token, normalized_name, plan_renames, rename_files, CollisionKind,
    CollisionPolicy, PlannedRename, RenameAction, RenameCollision, RenameOptions, RenamePlan,
    SkipReason, SkippedFile, DEFAULT_MARKER, DEFAULT_SUFFIX,
};
