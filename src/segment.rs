//! Segment Records
//!
//! Renderable units handed back to the status-line host, together with the
//! highlight group lists used for the branch and per-status segments.

use serde::Serialize;

use crate::errors::{ConfigError, Result};

/// Default branch format: the "branch" powerline glyph followed by the name.
pub const DEFAULT_BRANCH_FORMAT: &str = "\u{e0a0} %s";

/// Highlight groups of the branch segment for a clean working copy.
pub const CLEAN_BRANCH_GROUPS: [&str; 4] = ["svnstatus_clean", "branch_clean", "svnstatus", "branch"];

/// Highlight groups of the branch segment for a dirty working copy.
pub const DIRTY_BRANCH_GROUPS: [&str; 4] = ["svnstatus_dirty", "branch_dirty", "svnstatus", "branch"];

/// One unit of status-line output.
///
/// Serializes with the field names status-line hosts expect
/// (`contents`, `highlight_groups`, `draw_inner_divider`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub contents: String,
    /// Most specific group first; the host falls back along the list.
    pub highlight_groups: Vec<String>,
    pub draw_inner_divider: bool,
}

impl Segment {
    /// Builds a branch segment with clean-flavored highlight groups.
    #[must_use]
    pub fn branch(contents: String) -> Self {
        Self {
            contents,
            highlight_groups: to_groups(&CLEAN_BRANCH_GROUPS),
            draw_inner_divider: true,
        }
    }

    /// Switches a branch segment over to the dirty highlight groups.
    pub fn mark_dirty(&mut self) {
        self.highlight_groups = to_groups(&DIRTY_BRANCH_GROUPS);
    }
}

fn to_groups(groups: &[&str]) -> Vec<String> {
    groups.iter().map(|group| (*group).to_string()).collect()
}

/// Builds the segment for one status code and its file count.
///
/// # Arguments
/// * `code` - The normalized status code, like `A+` or `!C`
/// * `count` - Number of files carrying that code
///
/// # Examples
///
/// ```
/// use svnstatus::segment::build_status_segment;
///
/// let segment = build_status_segment("A+", 2);
/// assert_eq!(segment.contents, "A+ 2");
/// assert_eq!(segment.highlight_groups[0], "svnstatus_A+");
/// assert_eq!(segment.highlight_groups[1], "svnstatus_A");
/// ```
#[must_use]
pub fn build_status_segment(code: &str, count: usize) -> Segment {
    let specific_group = format!("svnstatus_{code}");
    let general_group = code
        .chars()
        .next()
        .map_or_else(|| "svnstatus_".to_string(), |first| format!("svnstatus_{first}"));

    Segment {
        contents: format!("{code} {count}"),
        highlight_groups: vec![
            specific_group,
            general_group,
            "svnstatus_unknown".to_string(),
            "svnstatus_dirty".to_string(),
            "branch_dirty".to_string(),
            "svnstatus".to_string(),
            "branch".to_string(),
        ],
        draw_inner_divider: true,
    }
}

/// A validated branch display format.
///
/// The format holds exactly one `%s` placeholder, which is replaced by the
/// branch name. `%%` renders a literal percent sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchFormat {
    format: String,
}

impl BranchFormat {
    /// Validates a branch format string.
    ///
    /// # Errors
    /// * If the format does not contain exactly one `%s` placeholder
    pub fn new(format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        let found = count_placeholders(&format);

        if found != 1 {
            return Err(ConfigError::InvalidBranchFormat { format, found }.into());
        }

        Ok(Self { format })
    }

    /// Substitutes the branch name into the format.
    #[must_use]
    pub fn render(&self, branch: &str) -> String {
        let mut rendered = String::with_capacity(self.format.len() + branch.len());
        let mut chars = self.format.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                rendered.push(c);
                continue;
            }

            match chars.peek() {
                Some('s') => {
                    chars.next();
                    rendered.push_str(branch);
                }
                Some('%') => {
                    chars.next();
                    rendered.push('%');
                }
                _ => rendered.push('%'),
            }
        }

        rendered
    }
}

impl Default for BranchFormat {
    fn default() -> Self {
        Self {
            format: DEFAULT_BRANCH_FORMAT.to_string(),
        }
    }
}

fn count_placeholders(format: &str) -> usize {
    let mut found = 0;
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        // `%%` consumes both characters, so an escaped `%s` is never counted
        if c == '%' && chars.next() == Some('s') {
            found += 1;
        }
    }

    found
}
