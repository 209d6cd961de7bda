use std::{io, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use tracing::debug;

use crate::{
    config::{Config, Settings},
    context::SegmentContext,
    errors::Result,
    render::{render_json, render_text},
    svn::SvnStatusSegment,
    utils::print_success,
};

/// Output formats of the `segments` subcommand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Space separated segment contents, colored by highlight group
    #[default]
    Text,
    /// The segment records as a JSON array
    Json,
}

#[derive(Debug, clap::Args, Default)]
struct SegmentsArgs {
    /// Directory to inspect (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    cwd: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Branch display format, with one `%s` for the branch name
    #[arg(long, value_name = "FORMAT")]
    branch_format: Option<String>,

    /// Regex whose capture groups are joined into the branch name
    #[arg(long, value_name = "REGEX")]
    branch_re: Option<String>,

    /// Prefix of the `svn info` line the branch regex runs against
    #[arg(long, value_name = "PREFIX")]
    line_start: Option<String>,

    /// Upper bound on each `svn` call, in milliseconds
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the segments for a directory (the default)
    #[command(short_flag = 's')]
    Segments(SegmentsArgs),

    /// Write a configuration file with the default settings
    #[command(short_flag = 'i')]
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Print a shell completion script
    Completions {
        /// Shell to generate the script for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
#[command(about = "Status-line segment for Subversion working copies:\n\
\t- Shows the branch or tag of the working copy.\n\
\t- Counts the files per `svn status` code.")]
#[command(help_template = "{about}\n\nUSAGE:\n{usage}\n\n{all-args}\n")]
#[command(name = "svnstatus", version)]
pub struct Cli {
    /// Commands
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose
    /// If passed, debug logs are written to stderr.
    #[arg(short, long, default_value = "false", global = true)]
    pub verbose: bool,
}

/// # `run`
/// Runs the program.
///
/// ## Errors
/// Returns an error if the configuration is invalid or output fails.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Segments(args)) => print_segments(args),
        None => print_segments(SegmentsArgs::default()),
        Some(Commands::Init { force }) => {
            let path = Config::new()?.create_config_file(force)?;
            print_success("Configuration file created", &path.display().to_string());
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "svnstatus", &mut io::stdout());
            Ok(())
        }
    }
}

/// Applies command line overrides on top of the loaded settings.
fn apply_overrides(mut settings: Settings, args: &SegmentsArgs) -> Settings {
    if let Some(branch_format) = &args.branch_format {
        settings.branch_format = Some(branch_format.clone());
    }
    if let Some(branch_re) = &args.branch_re {
        settings.branch_re = Some(branch_re.clone());
    }
    if let Some(line_start) = &args.line_start {
        settings.line_start = Some(line_start.clone());
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.timeout_ms = timeout_ms;
    }
    settings
}

fn print_segments(args: SegmentsArgs) -> Result<()> {
    let settings = apply_overrides(Config::new()?.load()?, &args);
    debug!(?settings, "resolved settings");

    let segment = SvnStatusSegment::new(settings.segment_options())?;
    let runner = settings.runner();

    let mut ctx = SegmentContext::from_process();
    if let Some(cwd) = args.cwd {
        ctx.cwd = Some(cwd);
    }

    let mut report = |line: &str| eprintln!("{line}");
    let Some(segments) = segment.render(&runner, &ctx, &mut report) else {
        return Ok(());
    };

    match args.output {
        OutputFormat::Text => {
            println!("{}", render_text(&segments, console::colors_enabled()));
        }
        OutputFormat::Json => println!("{}", render_json(&segments)?),
    }

    Ok(())
}
