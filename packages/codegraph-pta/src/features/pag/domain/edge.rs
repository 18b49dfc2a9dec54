//! PAG edges

use super::node::{FieldKey, PagNodeId};
use crate::features::call_graph::CallSiteId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PagEdgeKind {
    /// dst ⊇ src
    Copy,
    /// dst ⊇ src.field
    Load,
    /// dst.field ⊇ src
    Store,
    /// formal ⊇ actual
    CallArg,
    /// result ⊇ callee return
    CallReturn,
    /// dst ∋ src (src is a heap object)
    Address,
    /// callee this ∋ src (src is the dispatching receiver object)
    This,
}

impl PagEdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PagEdgeKind::Copy => "copy",
            PagEdgeKind::Load => "load",
            PagEdgeKind::Store => "store",
            PagEdgeKind::CallArg => "call-arg",
            PagEdgeKind::CallReturn => "call-ret",
            PagEdgeKind::Address => "address",
            PagEdgeKind::This => "this",
        }
    }

    /// Edges that forward the source's points-to set unchanged
    pub fn is_copy_like(&self) -> bool {
        matches!(
            self,
            PagEdgeKind::Copy | PagEdgeKind::CallArg | PagEdgeKind::CallReturn
        )
    }

    /// Edges whose source is a heap object rather than a pointer
    pub fn is_object_flow(&self) -> bool {
        matches!(self, PagEdgeKind::Address | PagEdgeKind::This)
    }
}

/// Immutable edge. For `Load` the base is `src`; for `Store` it is `dst`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PagEdge {
    pub kind: PagEdgeKind,
    pub src: PagNodeId,
    pub dst: PagNodeId,
    pub field: Option<FieldKey>,
    pub call_site: Option<CallSiteId>,
}

impl PagEdge {
    pub fn new(kind: PagEdgeKind, src: PagNodeId, dst: PagNodeId) -> Self {
        Self {
            kind,
            src,
            dst,
            field: None,
            call_site: None,
        }
    }

    pub fn copy(src: PagNodeId, dst: PagNodeId) -> Self {
        Self::new(PagEdgeKind::Copy, src, dst)
    }

    pub fn address(object: PagNodeId, dst: PagNodeId) -> Self {
        Self::new(PagEdgeKind::Address, object, dst)
    }

    pub fn load(base: PagNodeId, dst: PagNodeId, field: FieldKey) -> Self {
        Self {
            field: Some(field),
            ..Self::new(PagEdgeKind::Load, base, dst)
        }
    }

    pub fn store(src: PagNodeId, base: PagNodeId, field: FieldKey) -> Self {
        Self {
            field: Some(field),
            ..Self::new(PagEdgeKind::Store, src, base)
        }
    }

    pub fn call_arg(actual: PagNodeId, formal: PagNodeId, site: CallSiteId) -> Self {
        Self {
            call_site: Some(site),
            ..Self::new(PagEdgeKind::CallArg, actual, formal)
        }
    }

    pub fn call_return(ret: PagNodeId, result: PagNodeId, site: CallSiteId) -> Self {
        Self {
            call_site: Some(site),
            ..Self::new(PagEdgeKind::CallReturn, ret, result)
        }
    }

    pub fn this(receiver: PagNodeId, callee_this: PagNodeId, site: CallSiteId) -> Self {
        Self {
            call_site: Some(site),
            ..Self::new(PagEdgeKind::This, receiver, callee_this)
        }
    }
}
