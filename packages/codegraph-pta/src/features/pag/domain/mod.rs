//! Domain layer - PAG node, edge and allocation-site types

pub mod alloc_site;
pub mod edge;
pub mod node;

pub use alloc_site::{AllocSite, AllocSiteId, AllocSiteKind, GLOBAL_THIS_SITE, UNKNOWN_SITE};
pub use edge::{PagEdge, PagEdgeKind};
pub use node::{param_local, FieldKey, PagNode, PagNodeId, PagNodeKind, RETURN_LOCAL, THIS_LOCAL};
