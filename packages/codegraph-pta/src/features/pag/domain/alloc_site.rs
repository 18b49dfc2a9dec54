//! Allocation sites

use crate::shared::models::{MethodId, Type};
use serde::{Deserialize, Serialize};

pub type AllocSiteId = u32;

/// Unknown-object sentinel site (always id 0)
pub const UNKNOWN_SITE: AllocSiteId = 0;

/// `globalThis` site (always id 1)
pub const GLOBAL_THIS_SITE: AllocSiteId = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AllocSiteKind {
    New,
    NewArray,
    FunctionRef,
    /// Result of `f.bind(..)`: the target function with a fixed `this`
    BoundFunction,
    /// Return value of a body-less method
    SdkReturn,
    /// Receiver synthesized for an instance entry method
    EntryReceiver,
    /// Argument synthesized for an entry method's parameter
    EntryParameter(usize),
    /// The single `globalThis` object
    GlobalThis,
    Unknown,
}

impl AllocSiteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocSiteKind::New => "new",
            AllocSiteKind::NewArray => "new-array",
            AllocSiteKind::FunctionRef => "function",
            AllocSiteKind::BoundFunction => "bound-function",
            AllocSiteKind::SdkReturn => "sdk-return",
            AllocSiteKind::EntryReceiver => "entry-this",
            AllocSiteKind::EntryParameter(_) => "entry-param",
            AllocSiteKind::GlobalThis => "globalThis",
            AllocSiteKind::Unknown => "unknown",
        }
    }

    /// Objects made up by the analysis rather than by program statements
    pub fn is_synthetic(&self) -> bool {
        matches!(
            self,
            AllocSiteKind::SdkReturn
                | AllocSiteKind::EntryReceiver
                | AllocSiteKind::EntryParameter(_)
                | AllocSiteKind::GlobalThis
                | AllocSiteKind::Unknown
        )
    }
}

/// One allocation site; interned by full structural equality
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocSite {
    pub kind: AllocSiteKind,
    /// Allocating method (None for program-wide sites)
    pub method: Option<MethodId>,
    pub stmt_index: Option<usize>,
    pub ty: Type,
}

impl AllocSite {
    pub fn in_method(kind: AllocSiteKind, method: MethodId, stmt_index: usize, ty: Type) -> Self {
        Self {
            kind,
            method: Some(method),
            stmt_index: Some(stmt_index),
            ty,
        }
    }

    pub fn synthetic(kind: AllocSiteKind, method: Option<MethodId>, ty: Type) -> Self {
        Self {
            kind,
            method,
            stmt_index: None,
            ty,
        }
    }
}
