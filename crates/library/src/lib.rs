//! Organizing a tree of downloaded work folders.
//!
//! 1. [`scan`] discovers [`WorkFolder`]s under a storage backend.
//! 2. [`organize::plan`] resolves each one to its metadata and computes a
//!    conflict-free set of renames towards the [`PathGenerator`]'s canonical
//!    paths, without touching the filesystem.
//! 3. [`organize::execute`] applies the plan and tidies up the directories it
//!    leaves empty.

pub mod error;
pub mod organize;
pub mod scan;
mod template;

pub use crate::scan::{Depth, WorkFolder, scan};
pub use crate::template::{DEFAULT_TEMPLATE, PathGenerator};
