//! Subversion Operations
//!
//! Running `svn`, parsing its output and turning the result into
//! status-line segments. Split into focused submodules:
//! - `inspector`: runs `svn info` / `svn status`
//! - `info`: branch extraction from `svn info`
//! - `status`: status code tally from `svn status`
//! - `segments`: the per-render orchestration

pub mod info;
pub mod inspector;
pub mod segments;
pub mod status;

pub use info::parse_info;
pub use inspector::{CommandOutput, SvnCli, SvnRunner, SvnSubcommand, execute_info, execute_status};
pub use segments::{SegmentOptions, SvnStatusSegment};
pub use status::{StatusCounts, StatusFilter, is_dirty, parse_status};
