//! The `ember` binary.

mod args;
mod driver;
mod repl;

use std::process::ExitCode;

use args::{Arg, parse_args};
use ember_common::set_colored_output;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("EMBER_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(1);
        }
    };

    if args.has_arg(Arg::Help) {
        driver::print_help();
    }
    if args.has_arg(Arg::NoColor) {
        set_colored_output(false);
    }

    let summary = match driver::run(&args) {
        Ok(summary) => summary,
        Err(err) => {
            eprintln!("ember: {err:#}");
            return ExitCode::from(1);
        }
    };

    // With no options and no inputs (or with -e) drop into the REPL.
    if args.has_arg(Arg::Eval) || (args.is_empty() && args.input_files.is_empty()) {
        let mut program = ember_types::Program::new();
        repl::run(&mut program);
    }

    ExitCode::from(summary.exit_code() as u8)
}
