use clap::Parser;
use realprices::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
