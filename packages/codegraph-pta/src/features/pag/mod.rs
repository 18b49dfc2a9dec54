//! # Pointer Assignment Graph
//!
//! Nodes are abstract storage locations (locals, heap objects, fields,
//! globals), each instantiated per context. Edges are the inclusion
//! constraints between them:
//!
//! | Edge         | Meaning                  |
//! |--------------|--------------------------|
//! | `Address`    | `x = new T`              |
//! | `Copy`       | `x = y`                  |
//! | `Load`       | `x = y.f`                |
//! | `Store`      | `y.f = x`                |
//! | `CallArg`    | formal ⊇ actual          |
//! | `CallReturn` | result ⊇ callee return   |
//! | `This`       | callee `this` ∋ receiver |
//!
//! Element accesses on arrays and collection objects all go through one
//! merged `[container-elem]` field per container instance.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{FuncPag, TemplateNode};
pub use domain::{
    param_local, AllocSite, AllocSiteId, AllocSiteKind, FieldKey, PagEdge, PagEdgeKind, PagNode,
    PagNodeId, PagNodeKind, RETURN_LOCAL, THIS_LOCAL,
};
pub use infrastructure::{ContainerKind, Pag};
