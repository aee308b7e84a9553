use crate::error::{BhavError, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A compiled file name pattern, rooted at a directory.
///
/// `*` and `?` never cross a path separator, so `*.csv` only matches files
/// directly inside the root. Patterns with a directory part (`2024/*.csv`)
/// descend exactly that many levels, and `**` lifts the depth limit.
#[derive(Debug, Clone)]
pub struct FilePattern {
    matcher: GlobMatcher,
    max_depth: usize,
}

impl FilePattern {
    /// Compile a glob pattern. Fails before any file is touched if the
    /// pattern is malformed.
    pub fn new(pattern: &str) -> Result<Self> {
        let normalized = pattern.trim_start_matches("./");
        let glob = GlobBuilder::new(normalized)
            .literal_separator(true)
            .build()
            .map_err(|source| BhavError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;

        let max_depth = if normalized.split('/').any(|part| part == "**") {
            usize::MAX
        } else {
            normalized.split('/').filter(|part| !part.is_empty()).count().max(1)
        };

        Ok(Self {
            matcher: glob.compile_matcher(),
            max_depth,
        })
    }

    /// Check a path relative to the root against the pattern
    pub fn is_match(&self, relative: &Path) -> bool {
        self.matcher.is_match(relative)
    }

    /// List every file under `root` matching the pattern.
    ///
    /// Entries are returned in lexical file-name order within each directory.
    /// A missing or unreadable root is an error, not an empty result.
    pub fn enumerate(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(self.max_depth)
            .sort_by_file_name();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|source| BhavError::Enumerate {
                root: root.to_path_buf(),
                source,
            })?;
            // Symlinks count when they point at a regular file
            if !entry.path().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            if self.is_match(relative) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

/// Compile `pattern` and enumerate the files it selects under `root`.
pub fn find_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    FilePattern::new(pattern)?.enumerate(root)
}
