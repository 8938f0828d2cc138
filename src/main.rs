use clap::Parser;
use walkforge::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
