//! Status-line segment for Subversion working copies.
//!
//! Given a directory, [`svn::SvnStatusSegment`] runs `svn info` and
//! `svn status`, and returns a branch segment followed by one segment per
//! status code with its file count:
//!
//! ```no_run
//! use svnstatus::{SegmentContext, SegmentOptions, SvnCli, SvnStatusSegment};
//!
//! let segment = SvnStatusSegment::new(SegmentOptions::default())?;
//! let mut errors = |line: &str| eprintln!("{line}");
//!
//! if let Some(segments) = segment.render(&SvnCli::default(), &SegmentContext::from_process(), &mut errors) {
//!     for segment in segments {
//!         println!("{} {:?}", segment.contents, segment.highlight_groups);
//!     }
//! }
//! # Ok::<(), svnstatus::errors::SvnStatusError>(())
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod render;
pub mod segment;
pub mod svn;
pub mod utils;

pub use context::{CancelFlag, ErrorSink, SegmentContext};
pub use segment::{Segment, build_status_segment};
pub use svn::{SegmentOptions, SvnCli, SvnRunner, SvnStatusSegment, is_dirty, parse_info, parse_status};
