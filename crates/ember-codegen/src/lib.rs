//! Lowering from canonical Ember types to the SSA IR.
//!
//! - `lower` — the type-lowering adapter, memoized per data type
//! - `casts` — implicit numeric conversions applied to an IR builder
//! - `emit` — whole-program emission for `-emit-llvm` and `-c`

pub mod casts;
pub mod emit;
pub mod lower;

pub use casts::{apply_cast, emit_implicit_conversion};
pub use emit::emit_program;
pub use lower::Lowerer;
