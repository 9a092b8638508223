//! Line-oriented read-eval loop.
//!
//! Declarations feed the program state; a bare type expression prints its
//! canonical form and bit width. Terminal raw-mode editing is deliberately
//! absent — plain buffered lines only.

use std::io::{BufRead, Write};

use ember_common::DiagnosticBuffer;
use ember_parser::Parser;
use ember_types::{Program, format_type, from_syntactic, size_in_bits};

pub fn run(program: &mut Program) {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!(": ");
        let _ = std::io::stdout().flush();
        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => break,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == ":quit" || trimmed == ":q" {
            break;
        }
        eval_line(program, trimmed);
    }
}

/// Evaluate one REPL line, printing results to stdout and problems to
/// stderr.
pub fn eval_line(program: &mut Program, line: &str) {
    let starts_decl = line.starts_with("type ")
        || line.starts_with("trait ")
        || line.starts_with("impl ")
        || line.starts_with("fn ");

    if starts_decl {
        let (file, parse_diags) = Parser::new(line).parse_source_file();
        if !parse_diags.is_empty() {
            for diag in parse_diags {
                eprintln!("error: {}", diag.message);
            }
            return;
        }
        let mut diagnostics = DiagnosticBuffer::new();
        program.declare_source_file(&file, "<repl>", &mut diagnostics);
        diagnostics.render(line);
        return;
    }

    match Parser::new(line).parse_standalone_type() {
        Ok(expr) => {
            let ty = from_syntactic(&program.types, &expr);
            let canonical = format_type(&program.types, ty);
            match size_in_bits(&program.types, &program.scope, ty, false) {
                Ok(bits) => println!("{canonical} : {bits} bits"),
                Err(err) => {
                    println!("{canonical}");
                    eprintln!("error: {err}");
                }
            }
        }
        Err(diag) => eprintln!("error: {}", diag.message),
    }
}
