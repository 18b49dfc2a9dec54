//! Read-only program view
//!
//! The analysis never mutates the program; it is passed explicitly to every
//! component that needs class hierarchy or method lookups.

use super::ir::{Local, Method, MethodId, MethodSignature, Stmt, Type};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Class declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub name: String,
    pub super_class: Option<String>,
    /// Declared methods by simple name
    pub methods: FxHashMap<String, MethodId>,
}

impl Class {
    pub fn new(name: impl Into<String>, super_class: Option<String>) -> Self {
        Self {
            name: name.into(),
            super_class,
            methods: FxHashMap::default(),
        }
    }
}

/// Whole program: classes plus a dense method table
#[derive(Debug, Clone, Default)]
pub struct Program {
    classes: FxHashMap<String, Class>,
    methods: Vec<Method>,
    by_signature: FxHashMap<MethodSignature, MethodId>,
}

impl Program {
    pub fn method(&self, id: MethodId) -> Option<&Method> {
        self.methods.get(id as usize)
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    /// Exact signature lookup
    pub fn resolve(&self, sig: &MethodSignature) -> Option<MethodId> {
        self.by_signature.get(sig).copied()
    }

    /// Find `name` on `class_name` or the nearest superclass declaring it
    pub fn lookup_virtual(&self, class_name: &str, name: &str) -> Option<MethodId> {
        let mut seen = FxHashSet::default();
        let mut current = Some(class_name);
        while let Some(cls_name) = current {
            if !seen.insert(cls_name) {
                // Malformed hierarchy with a superclass cycle
                return None;
            }
            let cls = self.classes.get(cls_name)?;
            if let Some(id) = cls.methods.get(name) {
                return Some(*id);
            }
            current = cls.super_class.as_deref();
        }
        None
    }

    /// Whether `sub` is `sup` or transitively extends it
    pub fn is_subclass_of(&self, sub: &str, sup: &str) -> bool {
        let mut seen = FxHashSet::default();
        let mut current = Some(sub);
        while let Some(name) = current {
            if name == sup {
                return true;
            }
            if !seen.insert(name) {
                return false;
            }
            current = self.classes.get(name).and_then(|c| c.super_class.as_deref());
        }
        false
    }

    pub fn stmt(&self, method: MethodId, index: usize) -> Option<&Stmt> {
        self.method(method)?.body.as_ref()?.get(index)
    }

    /// Whether statement `index` of `method` carries an invoke expression
    pub fn is_call_stmt(&self, method: MethodId, index: usize) -> bool {
        self.stmt(method, index)
            .map(|s| s.invoke_expr().is_some())
            .unwrap_or(false)
    }
}

/// Fluent construction of a [`Program`]
///
/// ```rust,ignore
/// let mut b = ProgramBuilder::new();
/// b.class("Animal", None);
/// b.class("Dog", Some("Animal"));
/// let speak = b.method("Dog", "speak").returns(Type::Void).finish();
/// let program = b.build();
/// ```
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a class (re-declaring only updates the superclass)
    pub fn class(&mut self, name: &str, super_class: Option<&str>) -> &mut Self {
        let entry = self
            .program
            .classes
            .entry(name.to_string())
            .or_insert_with(|| Class::new(name, None));
        entry.super_class = super_class.map(str::to_string);
        self
    }

    /// Start declaring a method; the class is created if missing
    pub fn method(&mut self, class: &str, name: &str) -> MethodBuilder<'_> {
        if !self.program.classes.contains_key(class) {
            self.class(class, None);
        }
        let id = self.program.methods.len() as MethodId;
        MethodBuilder {
            builder: self,
            method: Method {
                id,
                signature: MethodSignature::new(class, name),
                params: Vec::new(),
                return_type: Type::Void,
                is_static: false,
                is_constructor: false,
                body: Some(Vec::new()),
            },
        }
    }

    fn push_method(&mut self, method: Method) -> MethodId {
        let id = method.id;
        if let Some(cls) = self.program.classes.get_mut(&method.signature.class_name) {
            cls.methods.insert(method.signature.method_name.clone(), id);
        }
        self.program.by_signature.insert(method.signature.clone(), id);
        self.program.methods.push(method);
        id
    }

    pub fn build(self) -> Program {
        self.program
    }
}

/// Builder for a single method, created by [`ProgramBuilder::method`]
pub struct MethodBuilder<'a> {
    builder: &'a mut ProgramBuilder,
    method: Method,
}

impl<'a> MethodBuilder<'a> {
    pub fn param(mut self, name: &str, ty: Type) -> Self {
        self.method.params.push(Local::new(name, ty));
        self
    }

    pub fn returns(mut self, ty: Type) -> Self {
        self.method.return_type = ty;
        self
    }

    pub fn static_method(mut self) -> Self {
        self.method.is_static = true;
        self
    }

    pub fn constructor(mut self) -> Self {
        self.method.is_constructor = true;
        self
    }

    pub fn body(mut self, stmts: Vec<Stmt>) -> Self {
        self.method.body = Some(stmts);
        self
    }

    /// Declaration only (SDK / ambient method)
    pub fn without_body(mut self) -> Self {
        self.method.body = None;
        self
    }

    pub fn finish(self) -> MethodId {
        self.builder.push_method(self.method)
    }
}
