//! Diagnostic types and accumulation for the Ember compiler.
//!
//! Errors discovered during checking are not fatal: they are collected into
//! a [`DiagnosticBuffer`] keyed by source location and flushed at the end of
//! each declaration or file, so one run surfaces as many problems as it can.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use serde::Serialize;

use crate::span::{LineMap, Span};

/// Global switch for colored terminal output (`-no-color` clears it).
static COLORED_OUTPUT: AtomicBool = AtomicBool::new(true);

/// Enable or disable colored diagnostic rendering.
pub fn set_colored_output(enabled: bool) {
    COLORED_OUTPUT.store(enabled, Ordering::Relaxed);
}

fn colored_output() -> bool {
    COLORED_OUTPUT.load(Ordering::Relaxed)
}

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Note = 2,
}

/// Stable diagnostic codes for the type layer.
pub mod codes {
    pub const UNKNOWN_PRIMITIVE: u32 = 1;
    pub const INCOMPLETE_TYPE: u32 = 2;
    pub const RECURSIVE_TYPE: u32 = 3;
    pub const UNBOUND_TYPE_VAR: u32 = 4;
    pub const TYPE_MISMATCH: u32 = 5;
    pub const AMBIGUOUS_MATCH: u32 = 6;
    pub const PARSE_ERROR: u32 = 100;
}

/// A single compiler diagnostic with its source location.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub span: Span,
    pub message: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub fn error(file: impl Into<String>, span: Span, message: impl Into<String>, code: u32) -> Self {
        Diagnostic {
            file: file.into(),
            span,
            message: message.into(),
            category: DiagnosticCategory::Error,
            code,
        }
    }

    /// Create a new warning diagnostic.
    #[must_use]
    pub fn warning(
        file: impl Into<String>,
        span: Span,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Diagnostic {
            file: file.into(),
            span,
            message: message.into(),
            category: DiagnosticCategory::Warning,
            code,
        }
    }
}

/// Accumulates diagnostics for a compilation, ordered by source location.
#[derive(Debug, Default)]
pub struct DiagnosticBuffer {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBuffer {
    pub fn new() -> Self {
        DiagnosticBuffer {
            diagnostics: Vec::new(),
        }
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Error)
            .count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drop diagnostics recorded after a checkpoint (speculative checks).
    pub fn truncate(&mut self, checkpoint: usize) {
        self.diagnostics.truncate(checkpoint);
    }

    /// Render every diagnostic to stderr, sorted by span start.
    pub fn render(&self, source: &str) {
        let map = LineMap::new(source);
        let mut sorted: Vec<&Diagnostic> = self.diagnostics.iter().collect();
        sorted.sort_by_key(|d| d.span.start);

        for diag in sorted {
            eprintln!("{}", render_one(diag, &map));
        }
    }
}

fn render_one(diag: &Diagnostic, map: &LineMap) -> String {
    let (line, col) = if diag.span.is_dummy() {
        (0, 0)
    } else {
        map.line_col(diag.span.start)
    };

    let label = match diag.category {
        DiagnosticCategory::Error => "error",
        DiagnosticCategory::Warning => "warning",
        DiagnosticCategory::Note => "note",
    };

    let label = if colored_output() {
        match diag.category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Note => label.cyan().to_string(),
        }
    } else {
        label.to_string()
    };

    if line == 0 {
        format!("{}: {}: {}", diag.file, label, diag.message)
    } else {
        format!("{}:{}:{}: {}: {}", diag.file, line, col, label, diag.message)
    }
}
