//! Built-in container and function method models
//!
//! Calls on container objects are not dispatched into SDK bodies; they are
//! rewritten into loads and stores of the container's merged element field.
//! Views (`values()`, iterators) alias the container itself, so a later
//! `next()` on the view reads the same merged field.

use crate::shared::models::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Array,
    Set,
    Map,
    WeakSet,
    WeakMap,
}

impl ContainerKind {
    /// Container kind of a declared type (`Set<T>` matches `Set`)
    pub fn of(ty: &Type) -> Option<Self> {
        match ty {
            Type::Array(_) => Some(ContainerKind::Array),
            Type::Class(name) => {
                let base = name.split('<').next().unwrap_or(name).trim();
                match base {
                    "Array" => Some(ContainerKind::Array),
                    "Set" => Some(ContainerKind::Set),
                    "Map" => Some(ContainerKind::Map),
                    "WeakSet" => Some(ContainerKind::WeakSet),
                    "WeakMap" => Some(ContainerKind::WeakMap),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// forEach callbacks get the element in their second slot too
    /// (`(value, key)` on maps, `(value, value)` on sets)
    pub fn element_in_second_callback_param(&self) -> bool {
        matches!(self, ContainerKind::Set | ContainerKind::Map)
    }
}

/// Which actual arguments a write stores into the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgSelection {
    Index(usize),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerOp {
    /// Selected arguments flow into the element field
    Write(ArgSelection),
    /// The element field flows into the result
    Read,
    /// The result aliases the container
    View,
    /// First argument is a callback receiving elements
    ForEach,
}

pub fn classify_container_call(kind: ContainerKind, method: &str) -> Option<ContainerOp> {
    let op = match (kind, method) {
        (ContainerKind::Set | ContainerKind::WeakSet, "add") => {
            ContainerOp::Write(ArgSelection::Index(0))
        }
        (ContainerKind::Map | ContainerKind::WeakMap, "set") => {
            ContainerOp::Write(ArgSelection::Index(1))
        }
        (ContainerKind::Map | ContainerKind::WeakMap, "get") => ContainerOp::Read,
        (ContainerKind::Array, "push" | "unshift") => ContainerOp::Write(ArgSelection::All),
        (ContainerKind::Array, "pop" | "shift" | "at" | "find") => ContainerOp::Read,
        (_, "next") => ContainerOp::Read,
        (_, "values" | "keys" | "entries" | "iterator" | "[Symbol.iterator]") => ContainerOp::View,
        (_, "forEach") => ContainerOp::ForEach,
        _ => return None,
    };
    Some(op)
}

/// `Function.prototype` methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionOp {
    /// `f.call(thisArg, a0, a1, ...)`
    Call,
    /// `f.apply(thisArg, argsArray)`
    Apply,
    /// `f.bind(thisArg, a0, ...)`: result is a new function value with
    /// `this` and the leading arguments fixed
    Bind,
}

pub fn classify_function_call(method: &str) -> Option<FunctionOp> {
    match method {
        "call" => Some(FunctionOp::Call),
        "apply" => Some(FunctionOp::Apply),
        "bind" => Some(FunctionOp::Bind),
        _ => None,
    }
}
