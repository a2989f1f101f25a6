// suitecase command-line entry point
// Usage: cargo run --bin suitecase -- run [PATHS]... [--filter S] [--format pretty|json]

use std::process::ExitCode;

fn main() -> ExitCode {
    suitecase::cli::run()
}
