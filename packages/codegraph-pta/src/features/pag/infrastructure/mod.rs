//! Infrastructure layer - PAG storage and built-in method models

pub mod builtin;
pub mod graph;

pub use builtin::{
    classify_container_call, classify_function_call, ArgSelection, ContainerKind, ContainerOp,
    FunctionOp,
};
pub use graph::Pag;
