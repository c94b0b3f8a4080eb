//! Data-center cooling TEA entry point.

use dc_tea::cli::run_cli;

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("Error: {err:?}");

        // Terminate program, signalling an error
        std::process::exit(1);
    }
}
