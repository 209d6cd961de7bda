//! Terminal Rendering
//!
//! Stand-in for a status-line host: resolves each segment's highlight groups
//! against a small palette and prints the result, or dumps the segments as
//! JSON for hosts that do their own styling.

use console::Style;

use crate::{errors::Result, segment::Segment};

/// Returns the style of the first highlight group the palette knows.
fn style_for(highlight_groups: &[String]) -> Option<Style> {
    highlight_groups.iter().find_map(|group| {
        let style = match group.as_str() {
            "svnstatus_clean" | "branch_clean" => Style::new().green(),
            "svnstatus_dirty" | "branch_dirty" => Style::new().yellow(),
            "svnstatus_C" | "svnstatus_!" | "svnstatus_~" => Style::new().red().bold(),
            "svnstatus_A" => Style::new().green(),
            "svnstatus_D" => Style::new().red(),
            "svnstatus_M" | "svnstatus_R" => Style::new().yellow(),
            "svnstatus_?" => Style::new().cyan(),
            "svnstatus_unknown" => Style::new().magenta(),
            _ => return None,
        };
        Some(style)
    })
}

/// Renders segments as one line of text, separated by spaces.
///
/// # Arguments
/// * `segments` - The segments to render
/// * `color` - Whether to emit ANSI styling
#[must_use]
pub fn render_text(segments: &[Segment], color: bool) -> String {
    segments
        .iter()
        .map(|segment| match style_for(&segment.highlight_groups) {
            Some(style) => style
                .force_styling(color)
                .apply_to(&segment.contents)
                .to_string(),
            None => segment.contents.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders segments as a JSON array.
///
/// # Errors
/// * If serialization fails
pub fn render_json(segments: &[Segment]) -> Result<String> {
    Ok(serde_json::to_string(segments)?)
}
