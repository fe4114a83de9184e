use clap::Parser;
use tidykit::cli::{Cli, run_cli};
use tidykit::output::OutputFormatter;

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run_cli(&cli) {
        OutputFormatter::error(&e);
        std::process::exit(1);
    }
}
