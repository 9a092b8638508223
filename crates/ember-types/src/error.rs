//! Error kinds of the type layer.
//!
//! Ordinary equivalence outcomes are not errors — they travel as a tagged
//! `TypeCheckResult`. Errors here come from interning misuse, size
//! queries, validation, call-site resolution, and the one fatal
//! equivalence condition (a self-referential type-variable binding,
//! carried in `TypeCheckResult::fatal`). All but `UnknownPrimitive` are
//! recoverable: the driver records them as diagnostics and moves to the
//! next declaration.

use ember_common::diagnostics::codes;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeError {
    /// Programming error: a primitive was requested by a non-primitive
    /// name. Fatal.
    UnknownPrimitive(String),
    /// Size or lowering was requested on a stub.
    IncompleteType(String),
    /// A declaration contains itself not behind a pointer.
    RecursiveType(String),
    /// A type variable with no binding in scope and no declaring generic.
    UnboundTypeVar(String),
    /// A type variable bound to itself in scope. Fatal wherever it shows
    /// up: size queries, and the one fatal case inside equivalence.
    SelfReferentialTypeVar(String),
    /// Reference to a data type that was never declared.
    UndeclaredType(String),
    /// No candidate matched at a call site.
    TypeMismatch { name: String, args: String },
    /// Two or more candidates tied on match count.
    AmbiguousMatch { name: String, count: usize },
}

impl TypeError {
    /// Stable diagnostic code for rendering.
    pub fn code(&self) -> u32 {
        match self {
            TypeError::UnknownPrimitive(_) => codes::UNKNOWN_PRIMITIVE,
            TypeError::IncompleteType(_) => codes::INCOMPLETE_TYPE,
            TypeError::RecursiveType(_) => codes::RECURSIVE_TYPE,
            TypeError::UnboundTypeVar(_) | TypeError::SelfReferentialTypeVar(_) => {
                codes::UNBOUND_TYPE_VAR
            }
            TypeError::UndeclaredType(_) => codes::INCOMPLETE_TYPE,
            TypeError::TypeMismatch { .. } => codes::TYPE_MISMATCH,
            TypeError::AmbiguousMatch { .. } => codes::AMBIGUOUS_MATCH,
        }
    }
}

impl std::fmt::Display for TypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeError::UnknownPrimitive(name) => {
                write!(f, "'{name}' is not a primitive type")
            }
            TypeError::IncompleteType(name) => {
                write!(f, "type {name} is incomplete; its definition has not been seen")
            }
            TypeError::RecursiveType(name) => {
                write!(
                    f,
                    "recursive types are disallowed, wrap {name} in a pointer instead"
                )
            }
            TypeError::UnboundTypeVar(name) => {
                write!(f, "lookup for type variable {name} not found")
            }
            TypeError::SelfReferentialTypeVar(name) => {
                write!(f, "type variable {name} refers to itself")
            }
            TypeError::UndeclaredType(name) => {
                write!(f, "type {name} has not been declared")
            }
            TypeError::TypeMismatch { name, args } => {
                write!(f, "no matching candidate for {name} with arguments {args}")
            }
            TypeError::AmbiguousMatch { name, count } => {
                write!(f, "call to {name} is ambiguous: {count} candidates tie")
            }
        }
    }
}

impl std::error::Error for TypeError {}
