//! The Ember type layer.
//!
//! This crate is the core of the compiler: the interned type graph, the
//! generic/type-variable substitution machinery, and the
//! structural-with-constraints equivalence algorithm that drives call-site
//! resolution. Everything else in the workspace is a collaborator around
//! this crate.
//!
//! Architecture:
//! - `intern` — the process-wide arena; one canonical `TypeId` per
//!   structurally-identical type
//! - `ty` / `tag` / `modifier` — the closed type representation
//! - `display` / `canon` — the stable canonical string form (printer and
//!   round-trip parser)
//! - `convert` — canonicalization of syntactic type expressions
//! - `bind` — generic instantiation and substitution through type graphs
//! - `unify` — type equivalence with accumulated bindings and trait
//!   fallback
//! - `resolve` — overload candidate filtering by match count
//! - `numeric` — implicit widening rules (applied by codegen)
//! - `size` / `validate` — bit widths and declaration validation
//! - `program` — declaration-level driver entry points

pub mod bind;
pub mod canon;
pub mod convert;
pub mod display;
pub mod error;
pub mod intern;
pub mod modifier;
pub mod numeric;
pub mod program;
pub mod resolve;
pub mod scope;
pub mod size;
pub mod tag;
pub mod ty;
pub mod unify;
pub mod validate;

pub use bind::{TypeBinding, bind_type_args, find_binding, substitute};
pub use canon::{data_ref, from_canonical_string};
pub use convert::from_syntactic;
pub use display::{bound_name, display_name, format_type};
pub use error::TypeError;
pub use intern::TypeInterner;
pub use modifier::ModifierSet;
pub use numeric::{CastOp, WideningPlan, widen_to, widening_plan};
pub use program::{FuncSig, Program};
pub use resolve::{CandidateMatch, ResolvedCall, filter_best_matches, resolve_call};
pub use scope::{TraitRegistry, TypeVarScope};
pub use size::{largest_member, size_in_bits};
pub use tag::Prim;
pub use ty::{DataDef, DataId, DataKind, TypeId, TypeKind};
pub use unify::{CheckStatus, TypeCheckResult, Unifier};
pub use validate::validate_declared;
