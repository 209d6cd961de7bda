//! `svn info` Parsing
//!
//! Branch and tag name extraction from the repository URL reported by
//! `svn info`.

use std::sync::LazyLock;

use regex::Regex;

/// Line of `svn info` output holding the repository URL.
pub const DEFAULT_LINE_START: &str = "URL: ";

/// Matches `/trunk`, `/tags/<name>`, `/branch/<name>` and `/branches/<name>`.
pub const DEFAULT_BRANCH_RE: &str = r"/(trunk)(?:/|$)|/(?:tags|branch(?:es)?)/([^/]+)";

static DEFAULT_BRANCH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_BRANCH_RE).expect("default branch pattern is valid"));

/// Returns the compiled default branch pattern.
#[must_use]
pub fn default_branch_regex() -> &'static Regex {
    &DEFAULT_BRANCH_REGEX
}

/// Extracts the branch name from `svn info` output.
///
/// Selects the first line starting with `line_start`, strips that prefix,
/// and searches the rest with `pattern`. All capture groups of the match are
/// concatenated in order, with groups that did not participate counting as
/// empty. Returns an empty string if no line or no match is found.
///
/// # Arguments
/// * `lines` - The `svn info` stdout lines
/// * `pattern` - Branch pattern, or `None` for [`DEFAULT_BRANCH_RE`]
/// * `line_start` - Prefix of the line of interest, or `None` for [`DEFAULT_LINE_START`]
///
/// # Examples
///
/// ```
/// use svnstatus::svn::info::parse_info;
///
/// let lines = ["Path: .", "URL: https://example.com/svn/repo/tags/1.2.0/src"];
/// assert_eq!(parse_info(&lines, None, None), "1.2.0");
/// ```
#[must_use]
pub fn parse_info<S: AsRef<str>>(
    lines: &[S],
    pattern: Option<&Regex>,
    line_start: Option<&str>,
) -> String {
    let line_start = line_start
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or(DEFAULT_LINE_START);

    let Some(url) = lines
        .iter()
        .find_map(|line| line.as_ref().strip_prefix(line_start))
    else {
        return String::new();
    };

    let pattern = pattern.unwrap_or(default_branch_regex());

    pattern
        .captures(url)
        .map(|captures| {
            captures
                .iter()
                .skip(1)
                .map(|group| group.map_or("", |m| m.as_str()))
                .collect()
        })
        .unwrap_or_default()
}
