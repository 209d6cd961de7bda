//! User-facing messages of the command line tool.

use console::style;

/// Kind of a user-facing message, deciding its label and output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notice {
    Error,
    Success,
}

impl Notice {
    fn label(self) -> String {
        match self {
            Self::Error => style("🚨 ERROR").red().bold().for_stderr().to_string(),
            Self::Success => style("✅ SUCCESS").green().bold().to_string(),
        }
    }

    /// Builds the message: a labelled title, then each non-empty paragraph.
    fn compose(self, title: &str, paragraphs: &[&str]) -> String {
        paragraphs
            .iter()
            .filter(|paragraph| !paragraph.is_empty())
            .fold(format!("{}: {title}", self.label()), |message, paragraph| {
                format!("{message}\n\n{paragraph}")
            })
    }
}

/// Prints an error to stderr, with details and a hint on how to fix it.
pub fn print_error(title: &str, details: &str, suggestion: &str) {
    eprintln!("{}", Notice::Error.compose(title, &[details, suggestion]));
}

/// Prints a success message to stdout.
pub fn print_success(title: &str, details: &str) {
    println!("{}", Notice::Success.compose(title, &[details]));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose() {
        let message = Notice::Success.compose("Config created", &["/tmp/config.toml"]);
        assert_eq!(
            console::strip_ansi_codes(&message),
            "✅ SUCCESS: Config created\n\n/tmp/config.toml"
        );

        let message = Notice::Error.compose("Bad pattern", &["unclosed group", "", "Fix it"]);
        assert_eq!(
            console::strip_ansi_codes(&message),
            "🚨 ERROR: Bad pattern\n\nunclosed group\n\nFix it"
        );
    }
}
