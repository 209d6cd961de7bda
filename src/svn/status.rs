//! `svn status` Parsing
//!
//! Tallies the status codes of an `svn status` listing and decides whether
//! the working copy counts as dirty.

/// Number of leading columns of an `svn status` line holding status flags.
pub const STATUS_COLUMNS: usize = 7;

/// Lines starting with these prefixes are not file entries.
pub const DEFAULT_EXCLUDED_PREFIXES: [&str; 3] =
    ["Performing", "Summary of conflicts", "  Text conflicts"];

/// Status codes that are informational rather than local modifications:
/// `S` (switched) and `X` (external).
const CLEAN_STATUS_CHARS: [char; 2] = ['S', 'X'];

/// Which `svn status` lines are dropped before tallying.
///
/// A line is dropped if it is blank, if its first seven characters are all
/// spaces (continuation lines such as `        >   moved from old.txt`), or
/// if it starts with any of the excluded prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFilter {
    excluded_prefixes: Vec<String>,
}

impl StatusFilter {
    /// Creates a filter using the default prefixes plus `extra` ones.
    pub fn with_extra_prefixes<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter = Self::default();
        filter
            .excluded_prefixes
            .extend(extra.into_iter().map(Into::into).filter(|p: &String| !p.is_empty()));
        filter
    }

    /// Returns true if `line` should not be counted.
    #[must_use]
    pub fn is_excluded(&self, line: &str) -> bool {
        if line.trim().is_empty() {
            return true;
        }

        let leading_spaces = line.chars().take_while(|c| *c == ' ').count();
        if leading_spaces >= STATUS_COLUMNS {
            return true;
        }

        self.excluded_prefixes
            .iter()
            .any(|prefix| line.starts_with(prefix.as_str()))
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self {
            excluded_prefixes: DEFAULT_EXCLUDED_PREFIXES
                .iter()
                .map(|prefix| (*prefix).to_string())
                .collect(),
        }
    }
}

/// Occurrence counts per status code, iterated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
    entries: Vec<(String, usize)>,
}

impl StatusCounts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count for `code`, appending it if unseen.
    pub fn add(&mut self, code: &str) {
        if let Some((_, count)) = self.entries.iter_mut().find(|(seen, _)| seen == code) {
            *count += 1;
        } else {
            self.entries.push((code.to_string(), 1));
        }
    }

    /// Returns the count for `code`, or 0 if it never appeared.
    #[cfg(test)]
    fn get(&self, code: &str) -> usize {
        self.entries
            .iter()
            .find(|(seen, _)| seen == code)
            .map_or(0, |(_, count)| *count)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of counted lines.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries
            .iter()
            .map(|(code, count)| (code.as_str(), *count))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(code, _)| code.as_str())
    }
}

/// Normalizes one `svn status` line into its status code: the first seven
/// characters with every space removed (`"A  +   file"` becomes `"A+"`).
#[must_use]
pub fn status_code(line: &str) -> String {
    line.chars()
        .take(STATUS_COLUMNS)
        .filter(|c| *c != ' ')
        .collect()
}

/// Tallies the status codes of an `svn status` listing.
///
/// # Arguments
/// * `lines` - The `svn status` stdout lines
/// * `filter` - Which lines to skip
///
/// # Returns
/// * `StatusCounts` - Code counts in first-seen order, like `{A+: 2, !C: 1, D: 3}`
///
/// # Examples
///
/// ```
/// use svnstatus::svn::status::{StatusFilter, parse_status};
///
/// let lines = ["A       foo.txt", "M       bar.txt", "A       baz.txt"];
/// let counts = parse_status(&lines, &StatusFilter::default());
///
/// assert_eq!(counts.iter().collect::<Vec<_>>(), vec![("A", 2), ("M", 1)]);
/// ```
#[must_use]
pub fn parse_status<S: AsRef<str>>(lines: &[S], filter: &StatusFilter) -> StatusCounts {
    let mut counts = StatusCounts::new();

    for line in lines {
        let line: &str = line.as_ref();
        if filter.is_excluded(line) {
            continue;
        }

        counts.add(&status_code(line));
    }

    counts
}

/// Returns true if any counted status code denotes a local modification,
/// i.e. its first character is neither `S` nor `X`.
#[must_use]
pub fn is_dirty(counts: &StatusCounts) -> bool {
    counts.codes().any(|code| {
        !code
            .chars()
            .next()
            .is_some_and(|first| CLEAN_STATUS_CHARS.contains(&first))
    })
}
