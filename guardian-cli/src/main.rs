//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use guardian_cli::CliError;

fn main() {
    guardian_cli::init_logging();
    match guardian_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("guardian: {err}");
            std::process::exit(1);
        }
    }
}
