use crate::error::{BhavError, ErrorPolicy, Result};
use crate::output::{FileFailure, RenameReport};
use crate::pattern::FilePattern;
use crate::progress::{ProgressCadence, ProgressSink, ProgressTracker, Stage};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Literal text a file name must contain to be eligible for renaming
pub const DEFAULT_MARKER: &str = "BhavCopy";

/// Appended to the date token to form the normalized file name
pub const DEFAULT_SUFFIX: &str = "_bhav.csv";

// ASCII only: `\d` would also accept other Unicode digits.
static DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[0-9]{8}").expect("date token regex is valid"));

/// What to do when two files would end up with the same normalized name, or
/// the normalized name already exists on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Leave the source file alone and report the collision
    #[default]
    Skip,
    /// Let the filesystem rename replace the destination
    Overwrite,
    /// Refuse to rename anything if any collision is found
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameOptions {
    pub marker: String,
    pub suffix: String,
    pub collisions: CollisionPolicy,
    pub on_error: ErrorPolicy,
    pub progress: ProgressCadence,
    /// Build and report the plan without renaming anything
    pub dry_run: bool,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
            collisions: CollisionPolicy::default(),
            on_error: ErrorPolicy::default(),
            progress: ProgressCadence::default(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedRename {
    pub from: PathBuf,
    pub to: PathBuf,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoMarker,
    NoDateToken,
    /// The file already carries its normalized name
    AlreadyNormalized,
    Collision,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    /// The destination was already on disk before the batch started
    Existing,
    /// An earlier file in the same batch claimed the destination
    Batch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameCollision {
    pub token: String,
    pub from: PathBuf,
    pub to: PathBuf,
    pub kind: CollisionKind,
    /// The earlier source that claimed `to`, for batch collisions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<PathBuf>,
}

/// Decision for one matched file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameAction {
    Rename(PlannedRename),
    Skip(SkippedFile),
}

/// Every matched file in enumeration order, with the decision taken for it.
#[derive(Debug, Clone, Default)]
pub struct RenamePlan {
    pub actions: Vec<RenameAction>,
    pub collisions: Vec<RenameCollision>,
}

impl RenamePlan {
    pub fn matched(&self) -> usize {
        self.actions.len()
    }

    pub fn renames(&self) -> impl Iterator<Item = &PlannedRename> {
        self.actions.iter().filter_map(|action| match action {
            RenameAction::Rename(rename) => Some(rename),
            RenameAction::Skip(_) => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SkippedFile> {
        self.actions.iter().filter_map(|action| match action {
            RenameAction::Skip(skip) => Some(skip),
            RenameAction::Rename(_) => None,
        })
    }
}

/// First run of eight ASCII digits in `file_name`. A longer run yields its
/// first eight digits.
pub fn extract_date_token(file_name: &str) -> Option<&str> {
    DATE_TOKEN.find(file_name).map(|m| m.as_str())
}

pub fn normalized_name(token: &str, suffix: &str) -> String {
    format!("{token}{suffix}")
}

/// Decide what happens to each file matched by `pattern` under `root`,
/// without touching the filesystem.
pub fn plan_renames(root: &Path, pattern: &str, options: &RenameOptions) -> Result<RenamePlan> {
    let files = FilePattern::new(pattern)?.enumerate(root)?;
    Ok(plan_for_files(files, options))
}

fn plan_for_files(files: Vec<PathBuf>, options: &RenameOptions) -> RenamePlan {
    let mut plan = RenamePlan::default();
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

    for path in files {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !file_name.contains(options.marker.as_str()) {
            plan.actions.push(skip(path, SkipReason::NoMarker));
            continue;
        }

        let Some(token) = extract_date_token(&file_name).map(str::to_string) else {
            plan.actions.push(skip(path, SkipReason::NoDateToken));
            continue;
        };

        let to = path.with_file_name(normalized_name(&token, &options.suffix));
        if to == path {
            plan.actions.push(skip(path, SkipReason::AlreadyNormalized));
            continue;
        }

        let collision = if let Some(first) = claimed.get(&to) {
            Some((CollisionKind::Batch, Some(first.clone())))
        } else if fs::symlink_metadata(&to).is_ok() {
            Some((CollisionKind::Existing, None))
        } else {
            None
        };

        if let Some((kind, claimed_by)) = collision {
            plan.collisions.push(RenameCollision {
                token: token.clone(),
                from: path.clone(),
                to: to.clone(),
                kind,
                claimed_by,
            });
            if options.collisions != CollisionPolicy::Overwrite {
                plan.actions.push(skip(path, SkipReason::Collision));
                continue;
            }
        }

        claimed.entry(to.clone()).or_insert_with(|| path.clone());
        plan.actions.push(RenameAction::Rename(PlannedRename {
            from: path,
            to,
            token,
        }));
    }

    plan
}

fn skip(path: PathBuf, reason: SkipReason) -> RenameAction {
    RenameAction::Skip(SkippedFile { path, reason })
}

/// Rename every eligible file matched by `pattern` under `root` to its
/// normalized `<token><suffix>` name in the same directory.
///
/// The batch is not atomic: with [`ErrorPolicy::FailFast`] the first failed
/// rename ends the batch and files renamed before it stay renamed.
pub fn rename_files(
    root: &Path,
    pattern: &str,
    options: &RenameOptions,
    progress: &mut dyn ProgressSink,
) -> Result<RenameReport> {
    let plan = plan_renames(root, pattern, options)?;

    if options.collisions == CollisionPolicy::Fail {
        if let Some(collision) = plan.collisions.first() {
            return Err(BhavError::Collision {
                token: collision.token.clone(),
                from: collision.from.clone(),
                to: collision.to.clone(),
            });
        }
    }

    let mut report = RenameReport::new(root, pattern, &plan, options.dry_run);
    if options.dry_run {
        report.renamed = plan.renames().cloned().collect();
        return Ok(report);
    }

    let total = plan.matched();
    let mut tracker = ProgressTracker::new(Stage::Rename, total, options.progress, progress);

    for (index, action) in plan.actions.iter().enumerate() {
        if let RenameAction::Rename(rename) = action {
            match fs::rename(&rename.from, &rename.to) {
                Ok(()) => report.renamed.push(rename.clone()),
                Err(source) => {
                    let err = BhavError::Rename {
                        from: rename.from.clone(),
                        to: rename.to.clone(),
                        source,
                    };
                    match options.on_error {
                        ErrorPolicy::FailFast => return Err(err),
                        ErrorPolicy::Continue => report.failures.push(FileFailure::new(&err)),
                    }
                },
            }
        }
        tracker.file_done(index);
    }

    Ok(report)
}
