use clap::Parser;
use confluence::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
