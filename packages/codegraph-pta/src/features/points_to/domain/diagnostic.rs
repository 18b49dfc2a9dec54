//! Non-fatal findings collected during a run

use crate::features::call_graph::CallSiteId;
use crate::shared::models::MethodId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Callee could not be found; the call result is the unknown object
    UnresolvedReference {
        call_site: CallSiteId,
        caller: MethodId,
        callee: String,
    },
    /// The unknown object reached a receiver; it resolves no target
    UnknownReceiver {
        call_site: CallSiteId,
        caller: MethodId,
    },
    /// A recursive component used up its pop cap and was frozen
    RecursionCapExceeded { methods: Vec<MethodId>, pops: usize },
    /// Host worklist budget reached before the fixpoint
    BudgetExhausted { pops: u64, remaining: usize },
    Cancelled { pops: u64, remaining: usize },
    DumpFailed { path: PathBuf, reason: String },
}

impl Diagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::UnresolvedReference { .. } => "unresolved_reference",
            Diagnostic::UnknownReceiver { .. } => "unknown_receiver",
            Diagnostic::RecursionCapExceeded { .. } => "recursion_cap_exceeded",
            Diagnostic::BudgetExhausted { .. } => "budget_exhausted",
            Diagnostic::Cancelled { .. } => "cancelled",
            Diagnostic::DumpFailed { .. } => "dump_failed",
        }
    }

    /// Whether the run stopped before reaching its fixpoint
    pub fn is_incomplete_run(&self) -> bool {
        matches!(
            self,
            Diagnostic::BudgetExhausted { .. } | Diagnostic::Cancelled { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnresolvedReference {
                call_site,
                caller,
                callee,
            } => write!(
                f,
                "call site {} in method {}: no declaration for {}",
                call_site, caller, callee
            ),
            Diagnostic::UnknownReceiver { call_site, caller } => write!(
                f,
                "call site {} in method {}: receiver may be an unknown object",
                call_site, caller
            ),
            Diagnostic::RecursionCapExceeded { methods, pops } => write!(
                f,
                "recursive component {:?} frozen after {} pops",
                methods, pops
            ),
            Diagnostic::BudgetExhausted { pops, remaining } => write!(
                f,
                "worklist budget exhausted after {} pops ({} nodes pending)",
                pops, remaining
            ),
            Diagnostic::Cancelled { pops, remaining } => write!(
                f,
                "cancelled after {} pops ({} nodes pending)",
                pops, remaining
            ),
            Diagnostic::DumpFailed { path, reason } => {
                write!(f, "failed to write {}: {}", path.display(), reason)
            }
        }
    }
}
