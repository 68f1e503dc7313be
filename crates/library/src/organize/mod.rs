//! Moving work folders to their canonical paths.
//!
//! Organizing is split in two so the dangerous half can be previewed:
//!
//! - [`plan`] resolves each [`WorkFolder`](crate::WorkFolder) through a
//!   [`Resolver`] (normally the metadata cache), renders its destination with
//!   a [`PathGenerator`](crate::PathGenerator) and settles every collision up
//!   front. It only ever *reads* the filesystem.
//! - [`execute`] applies a [`Plan`] in order, never overwriting anything, and
//!   then removes directories the moves left empty.
//!
//! Collisions are settled by appending ` (2)`, ` (3)`, ... to the destination,
//! at most [`MAX_DISAMBIGUATION`] times. A work already sitting at its
//! destination (or at one of those variants) is left alone, which makes
//! organizing an already-organized tree a no-op.

mod conflict;
pub mod error;
mod execute;
mod plan;

pub use self::conflict::MAX_DISAMBIGUATION;
pub use self::execute::{ExecutionFailure, Report, execute};
pub use self::plan::{Plan, PlanFailure, Rename, Resolver, plan};
