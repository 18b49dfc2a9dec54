//! PAG nodes
//!
//! Node identity is structural: `(kind, context)` is interned to a dense
//! `PagNodeId`. Heap objects use their allocating instance's context, field
//! nodes inherit the context of their base object, globals use the empty
//! context.

use super::alloc_site::AllocSiteId;
use crate::features::points_to::domain::ContextId;
use crate::shared::models::{MethodId, Type};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type PagNodeId = u32;

/// Reserved local holding the receiver of an instance method
pub const THIS_LOCAL: &str = "%this";

/// Reserved local receiving every returned value
pub const RETURN_LOCAL: &str = "%ret";

/// Reserved local for formal parameter `index`
pub fn param_local(index: usize) -> String {
    format!("%param{}", index)
}

/// Field key of a field node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldKey {
    Named(String),
    /// Every element of a container instance, merged
    ContainerElement,
}

impl FieldKey {
    pub fn named(name: impl Into<String>) -> Self {
        FieldKey::Named(name.into())
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Named(name) => write!(f, "{}", name),
            FieldKey::ContainerElement => write!(f, "[container-elem]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PagNodeKind {
    LocalVar { method: MethodId, name: String },
    HeapObject { site: AllocSiteId, ty: Type },
    Field { base: PagNodeId, field: FieldKey },
    Global(String),
}

impl PagNodeKind {
    pub fn local(method: MethodId, name: impl Into<String>) -> Self {
        PagNodeKind::LocalVar {
            method,
            name: name.into(),
        }
    }

    pub fn this_of(method: MethodId) -> Self {
        Self::local(method, THIS_LOCAL)
    }

    pub fn param_of(method: MethodId, index: usize) -> Self {
        Self::local(method, param_local(index))
    }

    pub fn return_of(method: MethodId) -> Self {
        Self::local(method, RETURN_LOCAL)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, PagNodeKind::HeapObject { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagNode {
    pub id: PagNodeId,
    pub kind: PagNodeKind,
    pub ctx: ContextId,
}
