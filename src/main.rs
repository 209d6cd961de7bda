use clap::Parser;

use svnstatus::{cli::Cli, cli::run, utils::print_error};

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        print_error(
            "svnstatus failed",
            &e.to_string(),
            "Check ~/.config/svnstatus/config.toml and the SVNSTATUS_* environment variables.",
        );
        std::process::exit(1);
    }
}
