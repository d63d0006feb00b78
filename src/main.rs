use std::process::ExitCode;

use schema_bindgen::cli;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let command_line_interface = cli::CommandLineInterface::load();

    // RUST_LOG wins over -v
    let fallback = match command_line_interface.verbose {
        0 => "warn",
        1 => "schema_bindgen=debug",
        _ => "schema_bindgen=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    command_line_interface.run()
}
