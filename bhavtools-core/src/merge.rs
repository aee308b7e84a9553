use crate::error::{BhavError, ErrorPolicy, Result};
use crate::output::{FileFailure, MergeReport};
use crate::pattern::FilePattern;
use crate::progress::{ProgressCadence, ProgressSink, ProgressTracker, Stage};
use csv::{ByteRecord, ReaderBuilder, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Applies to reading inputs. Failures writing the output always end the
    /// batch.
    pub on_error: ErrorPolicy,
    pub progress: ProgressCadence,
    /// Reject an input whose rows do not all have the same number of fields
    pub require_uniform_rows: bool,
}

/// Read every record of one CSV file. The file handle is closed before this
/// returns.
pub fn read_records(path: &Path, require_uniform_rows: bool) -> Result<Vec<ByteRecord>> {
    let file = File::open(path).map_err(|source| BhavError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(!require_uniform_rows)
        .from_reader(file);
    reader
        .byte_records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|source| BhavError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

/// Concatenate every CSV file matched by `pattern` under `root` into
/// `root/output_name`.
///
/// The first file contributing any rows supplies the header; the first row
/// of every later file is dropped. Rows go to a temporary file next to the
/// output which only replaces `output_name` once every input is merged.
/// The output is always written, so no match leaves it empty.
pub fn merge_files(
    root: &Path,
    pattern: &str,
    output_name: &Path,
    options: &MergeOptions,
    progress: &mut dyn ProgressSink,
) -> Result<MergeReport> {
    let matcher = FilePattern::new(pattern)?;
    let output_path = root.join(output_name);
    let inputs = exclude_output(matcher.enumerate(root)?, &output_path);

    let mut report = MergeReport::new(root, pattern);
    let temp = create_output_temp(&output_path).map_err(|source| BhavError::Write {
        path: output_path.clone(),
        source,
    })?;

    let mut writer = WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(temp);

    let mut tracker = ProgressTracker::new(Stage::Merge, inputs.len(), options.progress, progress);
    let mut header_written = false;

    for (index, input) in inputs.iter().enumerate() {
        let records = match read_records(input, options.require_uniform_rows) {
            Ok(records) => records,
            Err(err) => match options.on_error {
                ErrorPolicy::FailFast => return Err(err),
                ErrorPolicy::Continue => {
                    report.failures.push(FileFailure::new(&err));
                    tracker.file_done(index);
                    continue;
                },
            },
        };

        let skip = usize::from(header_written && !records.is_empty());
        for record in &records[skip..] {
            writer
                .write_byte_record(record)
                .map_err(|source| BhavError::WriteRecord {
                    path: output_path.clone(),
                    source,
                })?;
        }

        report.headers_dropped += skip;
        report.rows_written += records.len() - skip;
        header_written |= !records.is_empty();
        report.inputs.push(input.clone());
        tracker.file_done(index);
    }

    let temp = writer.into_inner().map_err(|err| BhavError::Write {
        path: output_path.clone(),
        source: io::Error::new(err.error().kind(), err.error().to_string()),
    })?;
    temp.persist(&output_path).map_err(|source| BhavError::Persist {
        path: output_path.clone(),
        source,
    })?;

    report.output = Some(output_path);
    Ok(report)
}

/// Create the temp file that later replaces `output_path`.
///
/// It takes the permissions of an existing output, or those a freshly created
/// file would get (0666 less the umask on Unix).
fn create_output_temp(output_path: &Path) -> io::Result<NamedTempFile> {
    let output_dir = match output_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let existing = fs::metadata(output_path)
        .ok()
        .filter(fs::Metadata::is_file)
        .map(|metadata| metadata.permissions());

    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let temp = builder.tempfile_in(&output_dir)?;

    if let Some(permissions) = existing {
        temp.as_file().set_permissions(permissions)?;
    }
    Ok(temp)
}

/// Drop the output file from the inputs when the pattern also selects it.
fn exclude_output(inputs: Vec<PathBuf>, output_path: &Path) -> Vec<PathBuf> {
    let canonical_output = fs::canonicalize(output_path).ok();
    inputs
        .into_iter()
        .filter(|input| {
            if input == output_path {
                return false;
            }
            match canonical_output {
                Some(ref output) => fs::canonicalize(input).ok().as_ref() != Some(output),
                None => true,
            }
        })
        .collect()
}
