//! Overload / candidate resolution.
//!
//! A call site checks its argument list against every candidate signature
//! by list equivalence. Failures drop out; survivors rank by descending
//! match count, which prefers the most specific candidate (a concrete
//! parameter out-scores a type variable). Ties come back as a group for
//! the caller to disambiguate or report. A fatal check outcome (a
//! self-referential type-variable binding) aborts resolution outright —
//! it must not look like just another non-matching candidate.

use crate::error::TypeError;
use crate::ty::{TypeId, TypeKind};
use crate::unify::{TypeCheckResult, Unifier};

/// One surviving candidate: its index in the input list and the check
/// result carrying the bindings needed to specialize it.
#[derive(Clone, Debug)]
pub struct CandidateMatch {
    pub index: usize,
    pub check: TypeCheckResult,
}

/// Outcome of resolving a call site against its candidates.
#[derive(Clone, Debug)]
pub enum ResolvedCall {
    NoMatch,
    Unique(CandidateMatch),
    /// Two or more candidates tie on match count.
    Ambiguous(Vec<CandidateMatch>),
}

/// Check every candidate function type against the argument list; return
/// the survivors sorted by descending match count. A fatal equivalence
/// outcome is an error, not a dropped candidate.
pub fn filter_best_matches(
    unifier: &Unifier<'_>,
    candidates: &[TypeId],
    args: &[TypeId],
) -> Result<Vec<CandidateMatch>, TypeError> {
    let mut matches = Vec::new();
    for (index, &candidate) in candidates.iter().enumerate() {
        let base = unifier.types.strip_modifiers(candidate);
        let params = match unifier.types.kind(base) {
            TypeKind::Function { params, .. } => params,
            _ => {
                tracing::debug!("candidate {index} is not a function type; skipping");
                continue;
            }
        };
        let mut check = unifier.type_eq_list(&params, args);
        if let Some(err) = check.fatal.take() {
            return Err(err);
        }
        if check.succeeded() {
            matches.push(CandidateMatch { index, check });
        }
    }
    matches.sort_by(|a, b| b.check.match_count.cmp(&a.check.match_count));
    Ok(matches)
}

/// Resolve to a unique best candidate, or report the tied head group.
pub fn resolve_call(
    unifier: &Unifier<'_>,
    candidates: &[TypeId],
    args: &[TypeId],
) -> Result<ResolvedCall, TypeError> {
    let mut matches = filter_best_matches(unifier, candidates, args)?;
    let resolved = match matches.len() {
        0 => ResolvedCall::NoMatch,
        1 => ResolvedCall::Unique(matches.remove(0)),
        _ => {
            let best = matches[0].check.match_count;
            let tied: Vec<CandidateMatch> = matches
                .into_iter()
                .take_while(|m| m.check.match_count == best)
                .collect();
            if tied.len() == 1 {
                ResolvedCall::Unique(tied.into_iter().next().unwrap())
            } else {
                ResolvedCall::Ambiguous(tied)
            }
        }
    };
    Ok(resolved)
}
