//! Three-address IR consumed by the analysis
//!
//! Statements are already lowered: every operand is a local, a constant, or
//! a single field / element / static reference. Invoke expressions appear
//! either as standalone statements or as the right-hand side of an assign.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Method identifier (index into [`super::Program`]'s method table)
pub type MethodId = u32;

/// Fully-qualified method signature (`Class.method`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodSignature {
    pub class_name: String,
    pub method_name: String,
}

impl MethodSignature {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
        }
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class_name, self.method_name)
    }
}

/// Declared type of a local, field or allocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Unknown,
    Void,
    Number,
    String,
    Boolean,
    /// Class or interface type by name
    Class(String),
    /// `T[]`
    Array(Box<Type>),
    /// Function type bound to a concrete method
    Function(MethodSignature),
}

impl Type {
    pub fn class(name: impl Into<String>) -> Self {
        Type::Class(name.into())
    }

    pub fn array_of(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    /// Class name for class types
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class(name) => Some(name),
            _ => None,
        }
    }

    /// Whether values of this type can hold heap references
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Class(_) | Type::Array(_) | Type::Function(_) | Type::Unknown
        )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unknown => write!(f, "unknown"),
            Type::Void => write!(f, "void"),
            Type::Number => write!(f, "number"),
            Type::String => write!(f, "string"),
            Type::Boolean => write!(f, "boolean"),
            Type::Class(name) => write!(f, "{}", name),
            Type::Array(elem) => write!(f, "{}[]", elem),
            Type::Function(sig) => write!(f, "fn {}", sig),
        }
    }
}

/// Named local variable of a method body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Local {
    pub name: String,
    pub ty: Type,
}

impl Local {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Null,
    Undefined,
    Literal(String),
}

/// Dispatch shape of an invoke expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallKind {
    /// Target fixed by signature
    Static,
    /// Target chosen by the receiver's concrete class
    Virtual,
    /// Target is whatever function object the base local holds
    Pointer,
}

/// Invoke expression
///
/// For `Virtual` calls `base` is the receiver; for `Pointer` calls it is the
/// local holding the function value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvokeExpr {
    pub kind: CallKind,
    pub callee: MethodSignature,
    pub base: Option<Local>,
    pub args: Vec<Value>,
}

impl InvokeExpr {
    pub fn new_static(callee: MethodSignature, args: Vec<Value>) -> Self {
        Self {
            kind: CallKind::Static,
            callee,
            base: None,
            args,
        }
    }

    pub fn new_virtual(base: Local, callee: MethodSignature, args: Vec<Value>) -> Self {
        Self {
            kind: CallKind::Virtual,
            callee,
            base: Some(base),
            args,
        }
    }

    pub fn new_pointer(func: Local, callee: MethodSignature, args: Vec<Value>) -> Self {
        Self {
            kind: CallKind::Pointer,
            callee,
            base: Some(func),
            args,
        }
    }
}

/// Operand or right-hand side
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Local(Local),
    /// The enclosing method's receiver
    This,
    /// Formal parameter `index` of the enclosing method
    Parameter { index: usize },
    /// `base.field`
    InstanceField { base: Local, field: String },
    /// `Class.field`
    StaticField { class: String, field: String },
    /// `base[i]` (index value is irrelevant to the analysis)
    ArrayElement { base: Local },
    /// `new T`
    New(Type),
    /// `new T[n]`
    NewArray { element: Type },
    /// Reference to a method used as a first-class value
    FunctionRef(MethodSignature),
    /// Local `name` of an enclosing method (closure capture or a
    /// module-level variable), read from inside a nested function
    Captured { method: MethodSignature, name: String },
    GlobalThis,
    Constant(Constant),
    Invoke(InvokeExpr),
    /// Anything the analysis does not model (arithmetic, casts of primitives, ...)
    Opaque,
}

impl Value {
    pub fn local(name: impl Into<String>, ty: Type) -> Self {
        Value::Local(Local::new(name, ty))
    }

    pub fn field(base: Local, field: impl Into<String>) -> Self {
        Value::InstanceField {
            base,
            field: field.into(),
        }
    }

    pub fn static_field(class: impl Into<String>, field: impl Into<String>) -> Self {
        Value::StaticField {
            class: class.into(),
            field: field.into(),
        }
    }

    pub fn captured(method: MethodSignature, name: impl Into<String>) -> Self {
        Value::Captured {
            method,
            name: name.into(),
        }
    }

    pub fn new_object(class: impl Into<String>) -> Self {
        Value::New(Type::Class(class.into()))
    }
}

/// Statement of a method body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stmt {
    Assign { lhs: Value, rhs: Value },
    Invoke(InvokeExpr),
    Return(Option<Value>),
    Nop,
}

impl Stmt {
    pub fn assign(lhs: Value, rhs: Value) -> Self {
        Stmt::Assign { lhs, rhs }
    }

    /// Invoke expression carried by this statement, if any
    pub fn invoke_expr(&self) -> Option<&InvokeExpr> {
        match self {
            Stmt::Invoke(expr) => Some(expr),
            Stmt::Assign {
                rhs: Value::Invoke(expr),
                ..
            } => Some(expr),
            _ => None,
        }
    }

    /// Local receiving the call's result (`x = call(...)`)
    pub fn call_result(&self) -> Option<&Local> {
        match self {
            Stmt::Assign {
                lhs: Value::Local(local),
                rhs: Value::Invoke(_),
            } => Some(local),
            _ => None,
        }
    }
}

/// Method declaration with optional body
///
/// A method without a body is an SDK / ambient declaration: calls into it
/// are resolved but only its declared return type is modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub id: MethodId,
    pub signature: MethodSignature,
    pub params: Vec<Local>,
    pub return_type: Type,
    pub is_static: bool,
    pub is_constructor: bool,
    pub body: Option<Vec<Stmt>>,
}

impl Method {
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn stmts(&self) -> &[Stmt] {
        self.body.as_deref().unwrap_or(&[])
    }

    /// Name of the declaring class
    pub fn class_name(&self) -> &str {
        &self.signature.class_name
    }
}
