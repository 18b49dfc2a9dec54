//! Per-method PAG fragments
//!
//! A method body is lowered once into context-free edge templates plus the
//! list of its calls. The solver instantiates the fragment for every
//! `(method, context)` that becomes reachable; call binding happens later,
//! when targets are known.

use crate::features::pag::domain::*;
use crate::features::pag::infrastructure::Pag;
use crate::features::points_to::domain::{ContextId, EMPTY_CONTEXT};
use crate::shared::models::{
    InvokeExpr, Local, Method, MethodId, MethodSignature, Stmt, Type, Value,
};

/// Context-free node reference inside a fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateNode {
    /// Local of the fragment's method (includes reserved names)
    Local(String),
    /// Object allocated by the fragment's method
    Object(AllocSiteId),
    Global(String),
    GlobalThis,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateEdge {
    pub kind: PagEdgeKind,
    pub src: TemplateNode,
    pub dst: TemplateNode,
    pub field: Option<FieldKey>,
}

/// One invoke statement with its operands already lowered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentCall {
    pub stmt_index: usize,
    pub expr: InvokeExpr,
    /// Receiver (virtual) or function value (pointer)
    pub receiver: Option<TemplateNode>,
    /// One slot per actual; `None` for constants and unmodeled operands
    pub args: Vec<Option<TemplateNode>>,
    pub result: Option<TemplateNode>,
    pub result_local: Option<Local>,
}

/// Read of an enclosing method's local; linked once both sides exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub outer: MethodSignature,
    pub name: String,
    pub dst: TemplateNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncPag {
    pub method: MethodId,
    pub edges: Vec<TemplateEdge>,
    pub calls: Vec<FragmentCall>,
    pub captures: Vec<Capture>,
}

impl FuncPag {
    /// Lower `method` into a fragment, registering its allocation sites
    pub fn build(method: &Method, pag: &mut Pag) -> Self {
        let mut builder = FragmentBuilder {
            method,
            pag,
            edges: Vec::new(),
            calls: Vec::new(),
            captures: Vec::new(),
        };
        builder.lower();
        tracing::trace!(
            method = %method.signature,
            edges = builder.edges.len(),
            calls = builder.calls.len(),
            "built PAG fragment"
        );
        FuncPag {
            method: method.id,
            edges: builder.edges,
            calls: builder.calls,
            captures: builder.captures,
        }
    }

    /// Concrete edges of this fragment under `ctx`
    pub fn instantiate(&self, pag: &mut Pag, ctx: ContextId) -> Vec<PagEdge> {
        self.edges
            .iter()
            .map(|t| PagEdge {
                kind: t.kind,
                src: materialize(self.method, &t.src, pag, ctx),
                dst: materialize(self.method, &t.dst, pag, ctx),
                field: t.field.clone(),
                call_site: None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.calls.is_empty() && self.captures.is_empty()
    }
}

/// Resolve a template node of `method` under `ctx`
pub fn materialize(
    method: MethodId,
    node: &TemplateNode,
    pag: &mut Pag,
    ctx: ContextId,
) -> PagNodeId {
    match node {
        TemplateNode::Local(name) => {
            pag.get_or_create_node(PagNodeKind::local(method, name.clone()), ctx)
        }
        TemplateNode::Object(site) => pag.object_node(*site, ctx),
        TemplateNode::Global(name) => {
            pag.get_or_create_node(PagNodeKind::Global(name.clone()), EMPTY_CONTEXT)
        }
        TemplateNode::GlobalThis => pag.global_this_object(),
    }
}

struct FragmentBuilder<'a> {
    method: &'a Method,
    pag: &'a mut Pag,
    edges: Vec<TemplateEdge>,
    calls: Vec<FragmentCall>,
    captures: Vec<Capture>,
}

impl<'a> FragmentBuilder<'a> {
    fn lower(&mut self) {
        let method = self.method;

        let Some(body) = method.body.as_ref() else {
            self.lower_sdk_return();
            return;
        };

        // Bodies may name formals directly instead of reading `parameter i`
        for (i, param) in method.params.iter().enumerate() {
            let reserved = param_local(i);
            if param.name != reserved {
                self.edge(
                    PagEdgeKind::Copy,
                    TemplateNode::Local(reserved),
                    TemplateNode::Local(param.name.clone()),
                    None,
                );
            }
        }
        if !method.is_static {
            self.edge(
                PagEdgeKind::Copy,
                TemplateNode::Local(THIS_LOCAL.to_string()),
                TemplateNode::Local("this".to_string()),
                None,
            );
        }

        for (idx, stmt) in body.iter().enumerate() {
            self.lower_stmt(idx, stmt);
        }
    }

    fn lower_sdk_return(&mut self) {
        let ty = &self.method.return_type;
        if !matches!(ty, Type::Class(_) | Type::Array(_) | Type::Function(_)) {
            return;
        }
        let site = self.pag.intern_alloc_site(AllocSite::synthetic(
            AllocSiteKind::SdkReturn,
            Some(self.method.id),
            ty.clone(),
        ));
        self.edge(
            PagEdgeKind::Address,
            TemplateNode::Object(site),
            TemplateNode::Local(RETURN_LOCAL.to_string()),
            None,
        );
    }

    fn lower_stmt(&mut self, idx: usize, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { lhs, rhs } => match lhs {
                Value::Local(local) => {
                    let dst = TemplateNode::Local(local.name.clone());
                    self.lower_into(dst, rhs, idx, Some(local));
                }
                Value::InstanceField { base, field } => {
                    if let Some(src) = self.stored_value(rhs, idx) {
                        self.edge(
                            PagEdgeKind::Store,
                            src,
                            TemplateNode::Local(base.name.clone()),
                            Some(FieldKey::named(field.clone())),
                        );
                    }
                }
                Value::ArrayElement { base } => {
                    if let Some(src) = self.stored_value(rhs, idx) {
                        self.edge(
                            PagEdgeKind::Store,
                            src,
                            TemplateNode::Local(base.name.clone()),
                            Some(FieldKey::ContainerElement),
                        );
                    }
                }
                Value::StaticField { class, field } => {
                    if let Some(src) = self.stored_value(rhs, idx) {
                        self.edge(
                            PagEdgeKind::Copy,
                            src,
                            TemplateNode::Global(format!("{}.{}", class, field)),
                            None,
                        );
                    }
                }
                _ => {
                    tracing::trace!(stmt = idx, "skipping assignment to unmodeled target");
                }
            },
            Stmt::Invoke(expr) => self.call(idx, expr, None, None),
            Stmt::Return(Some(value)) => {
                if let Some(src) = self.stored_value(value, idx) {
                    self.edge(
                        PagEdgeKind::Copy,
                        src,
                        TemplateNode::Local(RETURN_LOCAL.to_string()),
                        None,
                    );
                }
            }
            Stmt::Return(None) | Stmt::Nop => {}
        }
    }

    /// Emit the edges for `dst = rhs`
    fn lower_into(&mut self, dst: TemplateNode, rhs: &Value, idx: usize, result: Option<&Local>) {
        let method_id = self.method.id;
        match rhs {
            Value::Local(src) => {
                self.edge(PagEdgeKind::Copy, TemplateNode::Local(src.name.clone()), dst, None)
            }
            Value::This => self.edge(
                PagEdgeKind::Copy,
                TemplateNode::Local(THIS_LOCAL.to_string()),
                dst,
                None,
            ),
            Value::Parameter { index } => {
                self.edge(PagEdgeKind::Copy, TemplateNode::Local(param_local(*index)), dst, None)
            }
            Value::InstanceField { base, field } => self.edge(
                PagEdgeKind::Load,
                TemplateNode::Local(base.name.clone()),
                dst,
                Some(FieldKey::named(field.clone())),
            ),
            Value::ArrayElement { base } => self.edge(
                PagEdgeKind::Load,
                TemplateNode::Local(base.name.clone()),
                dst,
                Some(FieldKey::ContainerElement),
            ),
            Value::StaticField { class, field } => self.edge(
                PagEdgeKind::Copy,
                TemplateNode::Global(format!("{}.{}", class, field)),
                dst,
                None,
            ),
            Value::New(ty) => {
                let site = self.pag.intern_alloc_site(AllocSite::in_method(
                    AllocSiteKind::New,
                    method_id,
                    idx,
                    ty.clone(),
                ));
                self.edge(PagEdgeKind::Address, TemplateNode::Object(site), dst, None);
            }
            Value::NewArray { element } => {
                let site = self.pag.intern_alloc_site(AllocSite::in_method(
                    AllocSiteKind::NewArray,
                    method_id,
                    idx,
                    Type::array_of(element.clone()),
                ));
                self.edge(PagEdgeKind::Address, TemplateNode::Object(site), dst, None);
            }
            Value::FunctionRef(sig) => {
                let site = self.pag.intern_alloc_site(AllocSite::in_method(
                    AllocSiteKind::FunctionRef,
                    method_id,
                    idx,
                    Type::Function(sig.clone()),
                ));
                self.edge(PagEdgeKind::Address, TemplateNode::Object(site), dst, None);
            }
            Value::GlobalThis => {
                self.edge(PagEdgeKind::Address, TemplateNode::GlobalThis, dst, None)
            }
            Value::Captured { method, name } => {
                let capture = Capture {
                    outer: method.clone(),
                    name: name.clone(),
                    dst,
                };
                if !self.captures.contains(&capture) {
                    self.captures.push(capture);
                }
            }
            Value::Invoke(expr) => self.call(idx, expr, Some(dst), result.cloned()),
            Value::Constant(_) | Value::Opaque => {}
        }
    }

    /// Node holding a value that is stored or returned rather than
    /// assigned to a local; a call gets its own result temporary
    fn stored_value(&mut self, value: &Value, idx: usize) -> Option<TemplateNode> {
        match value {
            Value::Invoke(expr) => {
                let temp = TemplateNode::Local(format!("%call{}", idx));
                self.call(idx, expr, Some(temp.clone()), None);
                Some(temp)
            }
            _ => self.operand(value, idx, 0),
        }
    }

    /// Node holding the value of an operand, lowering compound operands
    /// through a temporary
    fn operand(&mut self, value: &Value, idx: usize, slot: usize) -> Option<TemplateNode> {
        match value {
            Value::Local(local) => Some(TemplateNode::Local(local.name.clone())),
            Value::This => Some(TemplateNode::Local(THIS_LOCAL.to_string())),
            Value::Parameter { index } => Some(TemplateNode::Local(param_local(*index))),
            Value::StaticField { class, field } => {
                Some(TemplateNode::Global(format!("{}.{}", class, field)))
            }
            Value::Constant(_) | Value::Opaque => None,
            // One call site per statement
            Value::Invoke(_) => None,
            _ => {
                let temp = TemplateNode::Local(format!("%tmp{}_{}", idx, slot));
                self.lower_into(temp.clone(), value, idx, None);
                Some(temp)
            }
        }
    }

    fn call(
        &mut self,
        idx: usize,
        expr: &InvokeExpr,
        result: Option<TemplateNode>,
        result_local: Option<Local>,
    ) {
        let receiver = expr
            .base
            .as_ref()
            .map(|b| TemplateNode::Local(b.name.clone()));
        let args = expr
            .args
            .iter()
            .enumerate()
            .map(|(slot, arg)| self.operand(arg, idx, slot))
            .collect();
        self.calls.push(FragmentCall {
            stmt_index: idx,
            expr: expr.clone(),
            receiver,
            args,
            result,
            result_local,
        });
    }

    fn edge(
        &mut self,
        kind: PagEdgeKind,
        src: TemplateNode,
        dst: TemplateNode,
        field: Option<FieldKey>,
    ) {
        let edge = TemplateEdge {
            kind,
            src,
            dst,
            field,
        };
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }
}
