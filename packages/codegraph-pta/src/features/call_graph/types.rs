//! Call graph value types

use crate::shared::models::{CallKind, Local, MethodId, MethodSignature, Value};
use serde::{Deserialize, Serialize};

/// Call graph node id (dense, assigned in creation order)
pub type FuncId = u32;

/// Call site id (dense, assigned in creation order)
pub type CallSiteId = u32;

/// How a call edge's target was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispatchKind {
    /// Target named by the call's signature
    Static,
    /// Target chosen from the receiver's concrete class
    Dynamic,
    /// Target taken from a function value
    PointerIndirect,
}

impl DispatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchKind::Static => "static",
            DispatchKind::Dynamic => "dynamic",
            DispatchKind::PointerIndirect => "pointer",
        }
    }
}

impl From<CallKind> for DispatchKind {
    fn from(kind: CallKind) -> Self {
        match kind {
            CallKind::Static => DispatchKind::Static,
            CallKind::Virtual => DispatchKind::Dynamic,
            CallKind::Pointer => DispatchKind::PointerIndirect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallGraphNodeKind {
    Normal,
    Constructor,
    /// Declared without a body
    Sdk,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallGraphNode {
    pub id: FuncId,
    pub method: MethodId,
    pub kind: CallGraphNodeKind,
    pub call_sites: Vec<CallSiteId>,
}

/// One invoke statement of a caller's body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub id: CallSiteId,
    pub caller: FuncId,
    pub method: MethodId,
    pub stmt_index: usize,
    pub kind: DispatchKind,
    /// Signature named at the call (for dynamic calls only the method name matters)
    pub callee_sig: MethodSignature,
    /// Receiver for dynamic calls, function value for pointer calls
    pub receiver: Option<Local>,
    pub args: Vec<Value>,
    pub result: Option<Local>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallGraphEdge {
    pub caller: FuncId,
    pub callee: FuncId,
    pub call_site: CallSiteId,
    pub kind: DispatchKind,
    /// Solver pop count at which the edge was added (0 = seeding)
    pub discovered_at: u64,
}
