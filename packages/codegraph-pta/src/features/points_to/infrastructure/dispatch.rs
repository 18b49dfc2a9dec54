//! Receiver-driven call resolution
//!
//! A dynamic or pointer call site watches its receiver node. Each object
//! that reaches the receiver is resolved here exactly once per
//! `(site, context)`:
//!
//! | Receiver object          | Effect                                         |
//! |--------------------------|------------------------------------------------|
//! | unknown                  | `UnknownReceiver` diagnostic, no target        |
//! | function value           | pointer call, or `call` / `apply` / `bind`     |
//! | bound function           | as above, with the bound `this` and arguments  |
//! | container (`Set`, ...)   | element-field load/store, view alias, callback |
//! | class instance           | virtual lookup along the superclass chain      |

use super::solver::{ArgFlow, BoundFunction, SiteNodes, Solver, ThisSource, Watch, WatchRole};
use crate::features::call_graph::{CallSiteId, DispatchKind};
use crate::features::pag::domain::{AllocSite, AllocSiteKind, FieldKey, PagEdge, PagNodeId};
use crate::features::pag::infrastructure::{
    classify_container_call, classify_function_call, ArgSelection, ContainerKind, ContainerOp,
    FunctionOp,
};
use crate::features::points_to::domain::{ContextId, Diagnostic};
use crate::shared::models::{MethodSignature, Type};

impl<'p> Solver<'p> {
    pub(crate) fn resolve_receiver(&mut self, site: CallSiteId, ctx: ContextId, obj: PagNodeId) {
        let (kind, callee, caller) = match self.cg.call_site(site) {
            Ok(cs) => (cs.kind, cs.callee_sig.clone(), cs.method),
            Err(err) => {
                tracing::warn!(error = %err, "receiver resolved for unknown call site");
                return;
            }
        };

        if self.pag.is_unknown(obj) {
            self.report_once(
                site,
                Diagnostic::UnknownReceiver {
                    call_site: site,
                    caller,
                },
            );
            return;
        }

        let Some(ty) = self.pag.object_type(obj).cloned() else {
            return;
        };

        match (kind, &ty) {
            (DispatchKind::PointerIndirect, Type::Function(sig)) => {
                self.call_function_value(site, ctx, obj, sig, &callee);
            }
            (DispatchKind::PointerIndirect, _) => {
                tracing::trace!(site, obj, "non-function value reached a pointer call");
            }
            (DispatchKind::Dynamic, Type::Function(sig)) => {
                self.call_function_method(site, ctx, obj, sig, &callee);
            }
            (DispatchKind::Dynamic, _) => {
                if let Some(container) = ContainerKind::of(&ty) {
                    if let Some(op) = classify_container_call(container, &callee.method_name) {
                        self.apply_container_op(site, ctx, obj, container, op);
                        return;
                    }
                }
                self.call_virtual(site, ctx, obj, &ty, &callee);
            }
            (DispatchKind::Static, _) => {}
        }
    }

    /// Callback `func` handed to `forEach` on `container`
    pub(crate) fn resolve_callback(
        &mut self,
        site: CallSiteId,
        ctx: ContextId,
        func: PagNodeId,
        container: PagNodeId,
        kind: ContainerKind,
    ) {
        if self.pag.is_unknown(func) {
            if let Ok(cs) = self.cg.call_site(site) {
                let caller = cs.method;
                self.report_once(
                    site,
                    Diagnostic::UnknownReceiver {
                        call_site: site,
                        caller,
                    },
                );
            }
            return;
        }
        let Some(Type::Function(sig)) = self.pag.object_type(func).cloned() else {
            return;
        };
        let program = self.program;
        let Some(target) = program.resolve(&sig) else {
            self.report_unresolved(site, &sig);
            return;
        };

        let (this, mut args) = self.bound_prefix(func);
        args.push(Some(ArgFlow::ElementField(container)));
        if kind.element_in_second_callback_param() {
            args.push(Some(ArgFlow::ElementField(container)));
        }
        self.bind_call(
            site,
            ctx,
            target,
            DispatchKind::PointerIndirect,
            this.unwrap_or(ThisSource::None),
            args,
            None,
        );
    }

    fn call_function_value(
        &mut self,
        site: CallSiteId,
        ctx: ContextId,
        obj: PagNodeId,
        sig: &MethodSignature,
        callee: &MethodSignature,
    ) {
        let program = self.program;
        let Some(target) = program.resolve(sig) else {
            self.report_unresolved(site, callee);
            return;
        };
        let nodes = self.site_nodes(site, ctx);
        let (this, mut args) = self.bound_prefix(obj);
        args.extend(nodes.args.iter().map(|a| a.map(ArgFlow::Direct)));
        self.bind_call(
            site,
            ctx,
            target,
            DispatchKind::PointerIndirect,
            this.unwrap_or(ThisSource::None),
            args,
            nodes.result,
        );
    }

    /// `this` and leading arguments fixed on a bound function object
    fn bound_prefix(&self, obj: PagNodeId) -> (Option<ThisSource>, Vec<Option<ArgFlow>>) {
        match self.bound_functions.get(&obj) {
            Some(bound) => (
                Some(bound.this.map(ThisSource::Var).unwrap_or(ThisSource::None)),
                bound.args.iter().map(|a| a.map(ArgFlow::Direct)).collect(),
            ),
            None => (None, Vec::new()),
        }
    }

    /// `f.call(..)`, `f.apply(..)`, `f.bind(..)` on a function value
    fn call_function_method(
        &mut self,
        site: CallSiteId,
        ctx: ContextId,
        obj: PagNodeId,
        sig: &MethodSignature,
        callee: &MethodSignature,
    ) {
        let Some(op) = classify_function_call(&callee.method_name) else {
            self.report_unresolved(site, callee);
            return;
        };
        let nodes = self.site_nodes(site, ctx);

        if op == FunctionOp::Bind {
            self.bind_function(site, ctx, obj, sig, &nodes);
            return;
        }

        let program = self.program;
        let Some(target) = program.resolve(sig) else {
            self.report_unresolved(site, sig);
            return;
        };
        let (bound_this, mut args) = self.bound_prefix(obj);
        let this = bound_this.unwrap_or_else(|| {
            nodes
                .args
                .first()
                .copied()
                .flatten()
                .map(ThisSource::Var)
                .unwrap_or(ThisSource::None)
        });

        match op {
            FunctionOp::Call => {
                let rest = nodes.args.iter().skip(1);
                args.extend(rest.map(|a| a.map(ArgFlow::Direct)));
            }
            FunctionOp::Apply => {
                let arity = program.method(target).map_or(0, |m| m.params.len());
                let spread = nodes.args.get(1).copied().flatten();
                let fixed = args.len();
                args.extend((fixed..arity).map(|_| spread.map(ArgFlow::ElementsOf)));
            }
            FunctionOp::Bind => {}
        }
        self.bind_call(
            site,
            ctx,
            target,
            DispatchKind::Dynamic,
            this,
            args,
            nodes.result,
        );
    }

    /// The result of `f.bind(thisArg, a0, ..)` is a fresh function object
    /// per bind site that remembers `thisArg` and the leading arguments.
    /// Rebinding a bound function keeps its `this` and appends arguments.
    fn bind_function(
        &mut self,
        site: CallSiteId,
        ctx: ContextId,
        obj: PagNodeId,
        sig: &MethodSignature,
        nodes: &SiteNodes,
    ) {
        let Some(result) = nodes.result else {
            return;
        };
        let (method, stmt_index) = match self.cg.call_site(site) {
            Ok(cs) => (cs.method, cs.stmt_index),
            Err(err) => {
                tracing::warn!(error = %err, "bind through unknown call site");
                return;
            }
        };

        let bound = match self.bound_functions.get(&obj) {
            Some(inner) => {
                let mut args = inner.args.clone();
                args.extend(nodes.args.iter().skip(1).copied());
                BoundFunction {
                    this: inner.this,
                    args,
                }
            }
            None => BoundFunction {
                this: nodes.args.first().copied().flatten(),
                args: nodes.args.iter().skip(1).copied().collect(),
            },
        };

        let alloc = self.pag.intern_alloc_site(AllocSite::in_method(
            AllocSiteKind::BoundFunction,
            method,
            stmt_index,
            Type::Function(sig.clone()),
        ));
        let bound_obj = self.pag.object_node(alloc, ctx);
        self.bound_functions.entry(bound_obj).or_insert(bound);
        self.add_pag_edge(PagEdge::address(bound_obj, result));
    }

    fn apply_container_op(
        &mut self,
        site: CallSiteId,
        ctx: ContextId,
        obj: PagNodeId,
        kind: ContainerKind,
        op: ContainerOp,
    ) {
        let nodes = self.site_nodes(site, ctx);
        match op {
            ContainerOp::Write(selection) => {
                let stored: Vec<PagNodeId> = match selection {
                    ArgSelection::Index(i) => {
                        nodes.args.get(i).copied().flatten().into_iter().collect()
                    }
                    ArgSelection::All => nodes.args.iter().flatten().copied().collect(),
                };
                if stored.is_empty() {
                    return;
                }
                let elem = self.pag.field_node(obj, FieldKey::ContainerElement);
                for value in stored {
                    self.add_pag_edge(PagEdge::copy(value, elem));
                }
            }
            ContainerOp::Read => {
                if let Some(result) = nodes.result {
                    let elem = self.pag.field_node(obj, FieldKey::ContainerElement);
                    self.add_pag_edge(PagEdge::copy(elem, result));
                }
            }
            ContainerOp::View => {
                if let Some(result) = nodes.result {
                    self.add_pag_edge(PagEdge::address(obj, result));
                }
            }
            ContainerOp::ForEach => {
                if let Some(Some(callback)) = nodes.args.first().copied() {
                    self.add_watch(
                        callback,
                        Watch {
                            site,
                            ctx,
                            role: WatchRole::Callback {
                                container: obj,
                                kind,
                            },
                        },
                    );
                }
            }
        }
    }

    fn call_virtual(
        &mut self,
        site: CallSiteId,
        ctx: ContextId,
        obj: PagNodeId,
        ty: &Type,
        callee: &MethodSignature,
    ) {
        let program = self.program;
        let target = ty
            .class_name()
            .and_then(|class| program.lookup_virtual(class, &callee.method_name));
        let Some(target) = target else {
            self.report_unresolved(site, callee);
            return;
        };
        let nodes = self.site_nodes(site, ctx);
        let args = nodes.args.iter().map(|a| a.map(ArgFlow::Direct)).collect();
        self.bind_call(
            site,
            ctx,
            target,
            DispatchKind::Dynamic,
            ThisSource::Object(obj),
            args,
            nodes.result,
        );
    }

    fn report_unresolved(&mut self, site: CallSiteId, callee: &MethodSignature) {
        let Ok(cs) = self.cg.call_site(site) else {
            return;
        };
        let caller = cs.method;
        self.report_once(
            site,
            Diagnostic::UnresolvedReference {
                call_site: site,
                caller,
                callee: callee.to_string(),
            },
        );
    }
}
