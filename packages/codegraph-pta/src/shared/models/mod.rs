//! Shared models

pub mod ir;
mod program;

pub use ir::{
    CallKind, Constant, InvokeExpr, Local, Method, MethodId, MethodSignature, Stmt, Type, Value,
};
pub use program::{Class, MethodBuilder, Program, ProgramBuilder};
