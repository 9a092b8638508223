//! The compilation driver: per-file pipeline, diagnostics flushing,
//! phase timing, and output writing.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use ember_common::{Diagnostic, DiagnosticBuffer, diagnostics::codes};
use ember_parser::{Parser, print::print_source_file};
use ember_types::Program;

use crate::args::{Arg, CompilerArgs};

/// Outcome of one driver run, for the process exit code.
pub struct RunSummary {
    pub error_count: usize,
}

impl RunSummary {
    pub fn exit_code(&self) -> i32 {
        if self.error_count == 0 { 0 } else { 1 }
    }
}

/// Compile every input file in sequence. Declared types are cleared
/// between files so each compiles independently against the same arena.
pub fn run(args: &CompilerArgs) -> Result<RunSummary> {
    let mut program = Program::new();
    let mut error_count = 0;

    for input in &args.input_files {
        error_count += compile_file(&mut program, input, args)?;
        program.clear_declared_types();
    }

    Ok(RunSummary { error_count })
}

fn compile_file(program: &mut Program, input: &str, args: &CompilerArgs) -> Result<usize> {
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("cannot read input file '{input}'"))?;
    let mut diagnostics = DiagnosticBuffer::new();

    let parse_start = Instant::now();
    let (file, parse_diags) = Parser::new(&source).parse_source_file();
    let parse_time = parse_start.elapsed();

    for diag in parse_diags {
        diagnostics.push(Diagnostic::error(
            input,
            diag.span,
            diag.message,
            codes::PARSE_ERROR,
        ));
    }

    if args.has_arg(Arg::Parse) {
        print!("{}", print_source_file(&file));
    }

    let check_start = Instant::now();
    program.declare_source_file(&file, input, &mut diagnostics);
    let check_time = check_start.elapsed();

    let mut emit_time = None;
    if !args.has_arg(Arg::Check) && diagnostics.error_count() == 0 {
        let emit_start = Instant::now();
        emit_outputs(program, input, args, &mut diagnostics)?;
        emit_time = Some(emit_start.elapsed());
    }

    if args.has_arg(Arg::Time) {
        println!("{input}:");
        println!("  parsing:       {parse_time:?}");
        println!("  type checking: {check_time:?}");
        if let Some(emit_time) = emit_time {
            println!("  codegen:       {emit_time:?}");
        }
    }

    diagnostics.render(&source);
    Ok(diagnostics.error_count())
}

fn emit_outputs(
    program: &Program,
    input: &str,
    args: &CompilerArgs,
    diagnostics: &mut DiagnosticBuffer,
) -> Result<()> {
    let wants_object = args.has_arg(Arg::CompileToObj) || args.has_arg(Arg::Lib);
    let wants_ir = args.has_arg(Arg::EmitIr);
    let wants_run = args.has_arg(Arg::CompileAndRun);
    if !wants_object && !wants_ir && !wants_run {
        return Ok(());
    }

    tracing::debug!(opt_level = args.opt_level(), "lowering {input}");
    let module = ember_codegen::emit_program(
        program,
        input,
        args.has_arg(Arg::Lib),
        diagnostics,
    );
    let printed = module.print();

    if wants_ir {
        print!("{printed}");
    }

    if wants_object {
        let output = output_name(input, args);
        std::fs::write(&output, &printed)
            .with_context(|| format!("cannot write output file '{output}'"))?;
        tracing::info!("wrote {output}");
    }

    if wants_run {
        anyhow::bail!("native execution is not available in this build; use -c or -emit-llvm");
    }
    Ok(())
}

fn output_name(input: &str, args: &CompilerArgs) -> String {
    if let Some(named) = args.get_arg(Arg::OutputName) {
        return named.value.clone();
    }
    let stem = Path::new(input)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    format!("{stem}.ll")
}

/// The `-help` message.
pub fn print_help() {
    println!("Compiler for the Ember programming language\n");
    println!("Usage: ember [options] <inputs>");
    println!("options:");
    println!("\t-c\t\tcompile to object file");
    println!("\t-o <filename>\tspecify output name");
    println!("\t-p\t\tprint parse tree");
    println!("\t-O <number>\tSet optimization level. Arg of 0 = none, 3 = all");
    println!("\t-r\t\tcompile and run");
    println!("\t-help\t\tprint this message");
    println!(
        "\t-lib\t\tcompile as library (include all functions in binary and compile to object file)"
    );
    println!("\t-emit-llvm\tprint llvm-IR as output");
    println!("\t-check\t\tCheck program for errors without compiling");
    println!("\t-no-color\tprint uncolored output");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::parse_args;
    use std::io::Write as _;

    fn args_of(argv: &[&str]) -> CompilerArgs {
        let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        parse_args(&argv).unwrap()
    }

    fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> String {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_check_reports_no_errors_for_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(&dir, "ok.em", "type Point = f64, f64\n");
        let summary = run(&args_of(&["-check", &input])).unwrap();
        assert_eq!(summary.error_count, 0);
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn test_check_counts_errors() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(&dir, "bad.em", "type T = T\n");
        let summary = run(&args_of(&["-check", "-no-color", &input])).unwrap();
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_compile_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(&dir, "point.em", "type Point = f64, f64\n");
        let output = dir.path().join("point.out");
        let output_str = output.to_string_lossy().into_owned();
        let summary = run(&args_of(&["-c", "-o", &output_str, &input])).unwrap();
        assert_eq!(summary.error_count, 0);
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("%Point = type { double, double }"));
    }

    #[test]
    fn test_missing_input_is_a_driver_error() {
        let result = run(&args_of(&["-check", "/no/such/file.em"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_run_flag_fails_without_backend() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(&dir, "r.em", "type Point = f64, f64\n");
        assert!(run(&args_of(&["-r", &input])).is_err());
    }
}
