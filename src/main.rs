use clap::Parser;
use tickerlens::cli::{run, Cli};
use tickerlens::logging::init_logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}
