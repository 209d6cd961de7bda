//! Subversion Status Segments
//!
//! Sequences `svn info` and `svn status` for one render and turns their
//! output into the branch segment followed by one segment per status code.

use regex::Regex;
use tracing::debug;

use crate::{
    context::{ErrorSink, SegmentContext},
    errors::{ConfigError, Result, SvnError},
    segment::{BranchFormat, Segment, build_status_segment},
    svn::{
        info::{DEFAULT_LINE_START, default_branch_regex, parse_info},
        inspector::{CommandOutput, SvnRunner, execute_info, execute_status},
        status::{StatusFilter, is_dirty, parse_status},
    },
};

/// Suffix of the `svn` error emitted for directories outside a working copy.
pub const NOT_A_WORKING_COPY: &str = "is not a working copy";

/// Caller-supplied overrides. `None` selects the documented default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentOptions {
    /// Branch display format with one `%s`, default `"\u{e0a0} %s"`.
    pub branch_format: Option<String>,
    /// Branch pattern whose capture groups are joined into the branch name.
    pub branch_re: Option<String>,
    /// Prefix of the `svn info` line the pattern runs against, default `"URL: "`.
    pub line_start: Option<String>,
    /// Extra `svn status` line prefixes to ignore.
    pub status_ignore: Vec<String>,
}

/// The Subversion status segment provider.
///
/// Holds only validated configuration, so one instance can serve any number
/// of concurrent renders.
#[derive(Debug, Clone)]
pub struct SvnStatusSegment {
    branch_format: BranchFormat,
    branch_re: Option<Regex>,
    line_start: String,
    status_filter: StatusFilter,
}

impl SvnStatusSegment {
    /// Validates the options.
    ///
    /// # Errors
    /// * If `branch_re` is not a valid regular expression
    /// * If `branch_format` does not hold exactly one `%s` placeholder
    pub fn new(options: SegmentOptions) -> Result<Self> {
        let branch_format = match options.branch_format.filter(|format| !format.is_empty()) {
            Some(format) => BranchFormat::new(format)?,
            None => BranchFormat::default(),
        };

        let branch_re = options
            .branch_re
            .filter(|pattern| !pattern.is_empty())
            .map(|pattern| Regex::new(&pattern).map_err(ConfigError::RegexError))
            .transpose()?;

        let line_start = options
            .line_start
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| DEFAULT_LINE_START.to_string());

        Ok(Self {
            branch_format,
            branch_re,
            line_start,
            status_filter: StatusFilter::with_extra_prefixes(options.status_ignore),
        })
    }

    fn branch_regex(&self) -> &Regex {
        self.branch_re.as_ref().unwrap_or(default_branch_regex())
    }

    /// Renders the segments for the context's directory.
    ///
    /// # Returns
    /// * `Some(segments)` - The branch segment, then one segment per status code
    /// * `None` - Nothing to show: not a working copy, no directory to
    ///   inspect, a failed command, or a cancelled render. Failures other
    ///   than "not a working copy" have been forwarded to `errors`.
    pub fn render(
        &self,
        runner: &dyn SvnRunner,
        ctx: &SegmentContext,
        errors: &mut dyn ErrorSink,
    ) -> Option<Vec<Segment>> {
        let info = checked_output(execute_info(runner, ctx), errors)?;
        if info.stdout.is_empty() {
            // Nothing was inspected, e.g. the host had no working directory
            debug!("svn info produced no output");
            return None;
        }

        let branch = parse_info(&info.stdout, Some(self.branch_regex()), Some(&self.line_start));
        let mut segments = vec![Segment::branch(self.branch_format.render(&branch))];

        let status = checked_output(execute_status(runner, ctx), errors)?;
        if status.stdout.is_empty() {
            return Some(segments);
        }

        let counts = parse_status(&status.stdout, &self.status_filter);
        if counts.is_empty() {
            return Some(segments);
        }

        debug!(branch = %branch, codes = counts.len(), files = counts.total(), "svn status tallied");

        if is_dirty(&counts) {
            segments[0].mark_dirty();
        }

        segments.extend(
            counts
                .iter()
                .map(|(code, count)| build_status_segment(code, count)),
        );

        Some(segments)
    }
}

/// Passes clean output through. Anything else ends the render: stderr lines
/// and runner errors are forwarded, except the "not a working copy" notice
/// and cancellation, which end it silently.
fn checked_output(
    result: std::result::Result<CommandOutput, SvnError>,
    errors: &mut dyn ErrorSink,
) -> Option<CommandOutput> {
    let output = match result {
        Ok(output) => output,
        Err(SvnError::Cancelled { command }) => {
            debug!(command = %command, "render cancelled");
            return None;
        }
        Err(err) => {
            errors.error(&err.to_string());
            return None;
        }
    };

    if output.stderr.is_empty() {
        return Some(output);
    }

    for line in &output.stderr {
        if line.ends_with(NOT_A_WORKING_COPY) {
            debug!(line = %line, "not a working copy");
        } else {
            errors.error(line);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, path::PathBuf, time::Duration};

    use mockall::{Sequence, predicate::eq};

    use super::*;
    use crate::{
        errors::SvnStatusError,
        segment::{CLEAN_BRANCH_GROUPS, DIRTY_BRANCH_GROUPS},
        svn::inspector::{MockSvnRunner, SvnCli, SvnSubcommand},
    };

    const TRUNK_INFO: &[&str] = &[
        "Path: .",
        "URL: https://example.com/svn/repo/trunk",
        "Revision: 12",
    ];

    fn lines(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|line| (*line).to_string()).collect()
    }

    fn stdout(out: &[&str]) -> CommandOutput {
        CommandOutput {
            stdout: lines(out),
            stderr: Vec::new(),
        }
    }

    fn stderr(err: &[&str]) -> CommandOutput {
        CommandOutput {
            stdout: Vec::new(),
            stderr: lines(err),
        }
    }

    fn context() -> SegmentContext {
        SegmentContext::new(Some(PathBuf::from("/home/me/wc")), HashMap::new())
    }

    fn mock_runner(info: CommandOutput, status: Option<CommandOutput>) -> MockSvnRunner {
        let mut runner = MockSvnRunner::new();
        let mut seq = Sequence::new();

        runner
            .expect_run()
            .with(eq(SvnSubcommand::Info), mockall::predicate::always())
            .times(1)
            .in_sequence(&mut seq)
            .return_once(move |_, _| Ok(info));

        match status {
            Some(status) => {
                runner
                    .expect_run()
                    .with(eq(SvnSubcommand::Status), mockall::predicate::always())
                    .times(1)
                    .in_sequence(&mut seq)
                    .return_once(move |_, _| Ok(status));
            }
            None => {
                runner
                    .expect_run()
                    .with(eq(SvnSubcommand::Status), mockall::predicate::always())
                    .never();
            }
        }

        runner
    }

    fn render(
        segment: &SvnStatusSegment,
        runner: &MockSvnRunner,
    ) -> (Option<Vec<Segment>>, Vec<String>) {
        let mut reported = Vec::new();
        let mut sink = |line: &str| reported.push(line.to_string());
        let segments = segment.render(runner, &context(), &mut sink);
        (segments, reported)
    }

    fn default_segment() -> SvnStatusSegment {
        SvnStatusSegment::new(SegmentOptions::default()).unwrap()
    }

    #[test]
    fn test_dirty_working_copy() {
        let runner = mock_runner(
            stdout(TRUNK_INFO),
            Some(stdout(&["A       foo.txt", "M       bar.txt", "A       baz.txt"])),
        );

        let (segments, reported) = render(&default_segment(), &runner);
        let segments = segments.unwrap();

        assert!(reported.is_empty());
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].contents, "\u{e0a0} trunk");
        assert_eq!(segments[0].highlight_groups, DIRTY_BRANCH_GROUPS);
        assert_eq!(segments[1], build_status_segment("A", 2));
        assert_eq!(segments[2], build_status_segment("M", 1));
    }

    #[test]
    fn test_clean_working_copy() {
        let runner = mock_runner(stdout(TRUNK_INFO), Some(CommandOutput::default()));

        let (segments, reported) = render(&default_segment(), &runner);

        assert!(reported.is_empty());
        assert_eq!(
            segments,
            Some(vec![Segment::branch("\u{e0a0} trunk".to_string())])
        );
    }

    #[test]
    fn test_only_ignored_status_lines() {
        let runner = mock_runner(
            stdout(TRUNK_INFO),
            Some(stdout(&["", "Summary of conflicts:", "  Text conflicts: 1"])),
        );

        let (segments, _) = render(&default_segment(), &runner);
        let segments = segments.unwrap();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].highlight_groups, CLEAN_BRANCH_GROUPS);
    }

    #[test]
    fn test_switched_and_externals_stay_clean() {
        let runner = mock_runner(
            stdout(TRUNK_INFO),
            Some(stdout(&["    S   lib", "X       vendor/dep"])),
        );

        let (segments, _) = render(&default_segment(), &runner);
        let segments = segments.unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].highlight_groups, CLEAN_BRANCH_GROUPS);
        assert_eq!(segments[1].contents, "S 1");
        assert_eq!(segments[2].contents, "X 1");
    }

    #[test]
    fn test_empty_info_output_is_silent() {
        let runner = mock_runner(CommandOutput::default(), None);

        let (segments, reported) = render(&default_segment(), &runner);

        assert_eq!(segments, None);
        assert!(reported.is_empty());
    }

    #[test]
    fn test_not_a_working_copy_is_silent() {
        let runner = mock_runner(
            stderr(&["svn: E155007: '/tmp/x' is not a working copy"]),
            None,
        );

        let (segments, reported) = render(&default_segment(), &runner);

        assert_eq!(segments, None);
        assert!(reported.is_empty());
    }

    #[test]
    fn test_info_error_is_reported() {
        let runner = mock_runner(stderr(&["svn: E000001: network unreachable"]), None);

        let (segments, reported) = render(&default_segment(), &runner);

        assert_eq!(segments, None);
        assert_eq!(reported, vec!["svn: E000001: network unreachable"]);
    }

    #[test]
    fn test_only_other_error_lines_are_reported() {
        let runner = mock_runner(
            stderr(&[
                "svn: warning: W155007: '/tmp/x' is not a working copy",
                "svn: E200009: Could not display info for all targets",
            ]),
            None,
        );

        let (segments, reported) = render(&default_segment(), &runner);

        assert_eq!(segments, None);
        assert_eq!(
            reported,
            vec!["svn: E200009: Could not display info for all targets"]
        );
    }

    #[test]
    fn test_status_error_discards_branch() {
        let runner = mock_runner(
            stdout(TRUNK_INFO),
            Some(stderr(&["svn: E155037: Previous operation has not finished"])),
        );

        let (segments, reported) = render(&default_segment(), &runner);

        assert_eq!(segments, None);
        assert_eq!(
            reported,
            vec!["svn: E155037: Previous operation has not finished"]
        );
    }

    #[test]
    fn test_runner_timeout_is_reported() {
        let mut runner = MockSvnRunner::new();
        runner.expect_run().times(1).returning(|_, _| {
            Err(SvnError::TimedOut {
                command: "svn info /home/me/wc".to_string(),
                timeout: Duration::from_millis(250),
            })
        });

        let (segments, reported) = render(&default_segment(), &runner);

        assert_eq!(segments, None);
        assert_eq!(reported, vec!["svn info /home/me/wc timed out after 250ms"]);
    }

    #[test]
    fn test_cancelled_render_is_silent() {
        let mut runner = MockSvnRunner::new();
        runner.expect_run().times(1).returning(|_, _| {
            Err(SvnError::Cancelled {
                command: "svn info /home/me/wc".to_string(),
            })
        });

        let (segments, reported) = render(&default_segment(), &runner);

        assert_eq!(segments, None);
        assert!(reported.is_empty());
    }

    #[test]
    fn test_no_branch_found_still_renders() {
        let runner = mock_runner(
            stdout(&["Path: .", "URL: https://example.com/svn/repo/vendor/x"]),
            Some(CommandOutput::default()),
        );

        let (segments, _) = render(&default_segment(), &runner);

        assert_eq!(segments.unwrap()[0].contents, "\u{e0a0} ");
    }

    #[test]
    fn test_custom_options() {
        let segment = SvnStatusSegment::new(SegmentOptions {
            branch_format: Some("svn:%s".to_string()),
            branch_re: Some(r"/svn/([^/]+)/".to_string()),
            line_start: Some("Repository Root: ".to_string()),
            status_ignore: vec!["--- Changelist".to_string()],
        })
        .unwrap();

        let runner = mock_runner(
            stdout(&[
                "URL: https://example.com/svn/repo/trunk",
                "Repository Root: https://example.com/svn/project/",
            ]),
            Some(stdout(&["--- Changelist 'review':", "?       new.txt"])),
        );

        let (segments, _) = render(&segment, &runner);
        let segments = segments.unwrap();

        assert_eq!(segments[0].contents, "svn:project");
        assert_eq!(segments[0].highlight_groups, DIRTY_BRANCH_GROUPS);
        assert_eq!(segments[1].contents, "? 1");
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_invalid_options() {
        let bad_regex = SvnStatusSegment::new(SegmentOptions {
            branch_re: Some("(unclosed".to_string()),
            ..SegmentOptions::default()
        });
        assert!(matches!(
            bad_regex,
            Err(SvnStatusError::Config(ConfigError::RegexError(_)))
        ));

        let bad_format = SvnStatusSegment::new(SegmentOptions {
            branch_format: Some("no placeholder".to_string()),
            ..SegmentOptions::default()
        });
        assert!(matches!(
            bad_format,
            Err(SvnStatusError::Config(ConfigError::InvalidBranchFormat { .. }))
        ));
    }

    #[test]
    fn test_empty_working_dir_matches_silent_skip() {
        let runner = SvnCli::new("svnstatus-no-such-binary", Duration::from_secs(1));
        let ctx = SegmentContext::new(None, HashMap::new());
        let mut reported: Vec<String> = Vec::new();
        let mut sink = |line: &str| reported.push(line.to_string());

        let segments = default_segment().render(&runner, &ctx, &mut sink);

        assert_eq!(segments, None);
        assert!(reported.is_empty());
    }
}
