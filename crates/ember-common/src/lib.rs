//! Common types and utilities for the Ember compiler.
//!
//! This crate provides foundational types used across all ember crates:
//! - Source spans (`Span`, `Spanned`) and line/column mapping (`LineMap`)
//! - Diagnostics (`Diagnostic`, `DiagnosticBuffer`) and terminal rendering

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::{LineMap, Span, Spanned};

// Diagnostic accumulation and rendering
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticBuffer, DiagnosticCategory, set_colored_output};
