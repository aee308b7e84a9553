//! Entry points with the default behavior of each batch: default options and
//! progress lines on stdout.
//!
//! Callers that need other options or a different progress sink use
//! [`crate::rename_files`] and [`crate::merge_files`] directly.

pub mod merge;
pub mod rename;

pub use merge::merge_operation;
pub use rename::rename_operation;
