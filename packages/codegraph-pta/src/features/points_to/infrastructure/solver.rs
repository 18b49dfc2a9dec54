//! Context-sensitive inclusion solver with on-the-fly call graph
//!
//! Andersen-style fixpoint over the PAG using difference propagation:
//! each dirty node carries the objects it gained since its last pop, and
//! only those flow onward. New edges immediately receive the full
//! points-to set of their source.
//!
//! The worklist is organized in passes. Before a pass the call-graph SCCs
//! are recomputed if the call graph grew, and queued nodes are re-bucketed
//! by their owning method's component position (callees first). A pass
//! ends as soon as a new call edge appears.
//!
//! # References
//! - Andersen, L. O. "Program Analysis and Specialization for C" (PhD 1994)
//! - Pearce et al. "Online Cycle Detection and Difference Propagation" (SAS 2003)
//! - Hardekopf & Lin "The Ant and the Grasshopper" (PLDI 2007)

use super::cancel::CancelHandle;
use super::wave_worklist::WaveWorklist;
use crate::config::PointerAnalysisConfig;
use crate::errors::{PtaError, PtaResult};
use crate::features::call_graph::{CallGraph, CallSiteId, DispatchKind, FuncId};
use crate::features::pag::application::{materialize, Capture, FragmentCall, FuncPag, TemplateNode};
use crate::features::pag::domain::*;
use crate::features::pag::infrastructure::{ContainerKind, Pag};
use crate::features::points_to::domain::*;
use crate::features::points_to::ports::SolverObserver;
use crate::features::scc::{detect_sccs, SccResult};
use crate::shared::models::{CallKind, MethodId, Program, Type};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

static EMPTY_SET: PointsToSet = PointsToSet::new();

/// What a watched node's new objects trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum WatchRole {
    /// Receiver of a dynamic call or function value of a pointer call
    Receiver,
    /// Callback argument of `forEach` on `container`
    Callback {
        container: PagNodeId,
        kind: ContainerKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Watch {
    pub site: CallSiteId,
    pub ctx: ContextId,
    pub role: WatchRole,
}

/// Caller-side operands of a call site, context-free
#[derive(Debug, Clone)]
pub(crate) struct SiteTemplate {
    pub method: MethodId,
    pub receiver: Option<TemplateNode>,
    pub args: Vec<Option<TemplateNode>>,
    pub result: Option<TemplateNode>,
}

impl SiteTemplate {
    fn from_call(method: MethodId, call: &FragmentCall) -> Self {
        Self {
            method,
            receiver: call.receiver.clone(),
            args: call.args.clone(),
            result: call.result.clone(),
        }
    }
}

/// Caller-side operands of a call site under one context
#[derive(Debug, Clone, Default)]
pub(crate) struct SiteNodes {
    pub receiver: Option<PagNodeId>,
    pub args: Vec<Option<PagNodeId>>,
    pub result: Option<PagNodeId>,
}

/// How the callee's `this` is bound
#[derive(Debug, Clone, Copy)]
pub(crate) enum ThisSource {
    None,
    /// The dispatching receiver object
    Object(PagNodeId),
    /// Whatever a caller-side variable holds
    Var(PagNodeId),
}

/// How one formal parameter is fed
#[derive(Debug, Clone, Copy)]
pub(crate) enum ArgFlow {
    /// From a caller-side variable
    Direct(PagNodeId),
    /// From the merged elements of whatever container a variable holds
    ElementsOf(PagNodeId),
    /// From the merged elements of one container object
    ElementField(PagNodeId),
}

/// Receiver and leading arguments fixed by `bind`
#[derive(Debug, Clone, Default)]
pub(crate) struct BoundFunction {
    /// Caller-side variable passed as `thisArg`
    pub this: Option<PagNodeId>,
    /// Caller-side variables placed before the call's own arguments
    pub args: Vec<Option<PagNodeId>>,
}

pub struct Solver<'p> {
    pub(crate) program: &'p Program,
    pub(crate) config: PointerAnalysisConfig,
    pub(crate) contexts: ContextTable,
    pub(crate) pag: Pag,
    pub(crate) cg: CallGraph,

    fragments: FxHashMap<MethodId, Arc<FuncPag>>,
    handled: FxHashSet<(MethodId, ContextId)>,
    pending_instances: VecDeque<(MethodId, ContextId)>,
    pub(crate) site_templates: FxHashMap<CallSiteId, SiteTemplate>,

    pts: Vec<PointsToSet>,
    diff: Vec<PointsToSet>,
    worklist: WaveWorklist,
    watchers: FxHashMap<PagNodeId, Vec<Watch>>,
    resolved: FxHashSet<(Watch, PagNodeId)>,
    pub(crate) bound_functions: FxHashMap<PagNodeId, BoundFunction>,
    /// Outer method -> captured local name -> reading nodes in closures
    captured: FxHashMap<MethodId, Vec<(String, Vec<PagNodeId>)>>,

    scc: Option<SccResult<FuncId>>,
    scc_version: Option<u64>,
    method_wave: FxHashMap<MethodId, usize>,
    component_pops: FxHashMap<FuncId, usize>,
    frozen: FxHashSet<MethodId>,

    reported: FxHashSet<(CallSiteId, &'static str)>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) stats: AnalysisStats,
    pub(crate) pops: u64,

    cancel: CancelHandle,
    observer: Option<Box<dyn SolverObserver>>,
}

impl<'p> Solver<'p> {
    pub fn new(program: &'p Program, config: PointerAnalysisConfig) -> Self {
        let contexts = ContextTable::new(config.context_depth());
        Self {
            program,
            config,
            contexts,
            pag: Pag::new(),
            cg: CallGraph::new(),
            fragments: FxHashMap::default(),
            handled: FxHashSet::default(),
            pending_instances: VecDeque::new(),
            site_templates: FxHashMap::default(),
            pts: Vec::new(),
            diff: Vec::new(),
            worklist: WaveWorklist::new(1),
            watchers: FxHashMap::default(),
            resolved: FxHashSet::default(),
            bound_functions: FxHashMap::default(),
            captured: FxHashMap::default(),
            scc: None,
            scc_version: None,
            method_wave: FxHashMap::default(),
            component_pops: FxHashMap::default(),
            frozen: FxHashSet::default(),
            reported: FxHashSet::default(),
            diagnostics: Vec::new(),
            stats: AnalysisStats::default(),
            pops: 0,
            cancel: CancelHandle::new(),
            observer: None,
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn set_observer(&mut self, observer: Box<dyn SolverObserver>) {
        self.observer = Some(observer);
    }

    // ------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------

    /// Make `entries` reachable under the empty context
    ///
    /// Every id is checked before anything is seeded.
    pub fn seed(&mut self, entries: &[MethodId]) -> PtaResult<()> {
        let program = self.program;
        for &id in entries {
            if program.method(id).is_none() {
                return Err(PtaError::UnknownEntry(id));
            }
        }

        let mut funcs = Vec::with_capacity(entries.len());
        for &id in entries {
            let Some(method) = program.method(id) else {
                continue;
            };
            funcs.push(self.cg.add_node(method));
            self.schedule_instance(id, EMPTY_CONTEXT);

            if !method.is_static {
                let site = self.pag.intern_alloc_site(AllocSite::synthetic(
                    AllocSiteKind::EntryReceiver,
                    Some(id),
                    Type::class(method.class_name()),
                ));
                let obj = self.pag.object_node(site, EMPTY_CONTEXT);
                let this = self
                    .pag
                    .get_or_create_node(PagNodeKind::this_of(id), EMPTY_CONTEXT);
                self.add_pag_edge(PagEdge::address(obj, this));
            }

            for (i, param) in method.params.iter().enumerate() {
                if !matches!(param.ty, Type::Class(_) | Type::Array(_)) {
                    continue;
                }
                let site = self.pag.intern_alloc_site(AllocSite::synthetic(
                    AllocSiteKind::EntryParameter(i),
                    Some(id),
                    param.ty.clone(),
                ));
                let obj = self.pag.object_node(site, EMPTY_CONTEXT);
                let formal = self
                    .pag
                    .get_or_create_node(PagNodeKind::param_of(id, i), EMPTY_CONTEXT);
                self.add_pag_edge(PagEdge::address(obj, formal));
            }
        }
        funcs.dedup();
        self.cg.set_entries(funcs);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Main loop
    // ------------------------------------------------------------------

    /// Run to fixpoint (or until cancelled / out of budget)
    ///
    /// Returns whether the fixpoint was reached.
    pub fn solve(&mut self) -> bool {
        let started = Instant::now();
        self.drain_instances();

        let reached = loop {
            if self.worklist.is_empty() && self.pending_instances.is_empty() {
                break true;
            }
            self.refresh_scc();
            self.stats.passes += 1;
            tracing::debug!(
                pass = self.stats.passes,
                queued = self.worklist.len(),
                cg_edges = self.cg.edge_count(),
                "solver pass"
            );

            let version = self.cg.version();
            let mut stopped = false;
            loop {
                if self.cancel.is_cancelled() {
                    self.record(Diagnostic::Cancelled {
                        pops: self.pops,
                        remaining: self.worklist.len(),
                    });
                    stopped = true;
                    break;
                }
                if let Some(budget) = self.config.max_worklist_pops() {
                    if self.pops >= budget as u64 && !self.worklist.is_empty() {
                        self.record(Diagnostic::BudgetExhausted {
                            pops: self.pops,
                            remaining: self.worklist.len(),
                        });
                        stopped = true;
                        break;
                    }
                }
                let Some(node) = self.worklist.pop() else {
                    break;
                };
                self.pops += 1;
                self.process_node(node);
                self.drain_instances();
                if self.cg.version() != version {
                    break;
                }
            }
            if stopped {
                break false;
            }
        };

        self.finish_stats(reached, started);
        reached
    }

    fn refresh_scc(&mut self) {
        if self.scc.is_some() && self.scc_version == Some(self.cg.version()) {
            return;
        }
        let result = detect_sccs(&self.cg);
        self.method_wave.clear();
        for (pos, comp) in result.components().iter().enumerate() {
            for &member in &comp.members {
                if let Ok(node) = self.cg.node(member) {
                    self.method_wave.insert(node.method, pos);
                }
            }
        }
        tracing::debug!(
            components = result.component_count(),
            cycles = result.stats.cycle_count,
            "recomputed call graph SCCs"
        );

        let queued = self.worklist.drain();
        self.worklist = WaveWorklist::new(result.component_count() + 1);
        self.scc = Some(result);
        self.scc_version = Some(self.cg.version());
        self.stats.scc_recomputations += 1;
        for node in queued {
            self.enqueue(node);
        }
    }

    fn wave_of(&self, node: PagNodeId) -> usize {
        self.pag
            .owner_method(node)
            .and_then(|m| self.method_wave.get(&m))
            .map(|pos| pos + 1)
            .unwrap_or(0)
    }

    fn enqueue(&mut self, node: PagNodeId) {
        let wave = self.wave_of(node);
        self.worklist.push(node, wave);
    }

    fn process_node(&mut self, node: PagNodeId) {
        let Some(slot) = self.diff.get_mut(node as usize) else {
            return;
        };
        let delta = std::mem::take(slot);
        if delta.is_empty() {
            return;
        }
        if let Some(method) = self.pag.owner_method(node) {
            if !self.charge_component(method) {
                return;
            }
        }

        let out: Vec<usize> = self.pag.out_edge_indices(node).to_vec();
        for idx in out {
            let Some(edge) = self.pag.edge(idx).cloned() else {
                continue;
            };
            match edge.kind {
                kind if kind.is_copy_like() => {
                    self.add_objects(edge.dst, &delta);
                }
                PagEdgeKind::Load => {
                    if let Some(field) = &edge.field {
                        for obj in delta.iter() {
                            self.materialize_load(obj, field, edge.dst);
                        }
                    }
                }
                _ => {}
            }
        }

        let inc: Vec<usize> = self.pag.in_edge_indices(node).to_vec();
        for idx in inc {
            let Some(edge) = self.pag.edge(idx).cloned() else {
                continue;
            };
            if edge.kind == PagEdgeKind::Store {
                if let Some(field) = &edge.field {
                    for obj in delta.iter() {
                        self.materialize_store(edge.src, obj, field);
                    }
                }
            }
        }

        if let Some(watches) = self.watchers.get(&node).cloned() {
            for watch in watches {
                for obj in delta.iter() {
                    self.on_watch_object(watch, obj);
                }
            }
        }
    }

    /// Count a pop against `method`'s recursive component
    ///
    /// Returns false if the component is (or just became) frozen.
    fn charge_component(&mut self, method: MethodId) -> bool {
        if self.frozen.contains(&method) {
            return false;
        }
        let Some(scc) = &self.scc else {
            return true;
        };
        let Some(func) = self.cg.node_of_method(method) else {
            return true;
        };
        let Some(comp) = scc.component_of(func) else {
            return true;
        };
        if !comp.is_cycle {
            return true;
        }

        let key = comp.members.iter().copied().min().unwrap_or(func);
        let count = self.component_pops.entry(key).or_insert(0);
        *count += 1;
        if *count <= self.config.scc_iteration_cap() {
            return true;
        }

        let pops = *count;
        let mut methods: Vec<MethodId> = comp
            .members
            .iter()
            .filter_map(|&f| self.cg.node(f).ok().map(|n| n.method))
            .collect();
        methods.sort_unstable();
        self.frozen.extend(methods.iter().copied());
        self.stats.frozen_components += 1;
        if let Some(obs) = self.observer.as_mut() {
            obs.on_component_frozen(&methods);
        }
        self.record(Diagnostic::RecursionCapExceeded { methods, pops });
        false
    }

    // ------------------------------------------------------------------
    // Points-to updates
    // ------------------------------------------------------------------

    fn ensure_capacity(&mut self) {
        let n = self.pag.node_count();
        if self.pts.len() < n {
            self.pts.resize_with(n, PointsToSet::new);
            self.diff.resize_with(n, PointsToSet::new);
        }
    }

    /// Merge `objs` into `node`; schedules the node if it grew
    pub(crate) fn add_objects(&mut self, node: PagNodeId, objs: &PointsToSet) {
        if objs.is_empty() {
            return;
        }
        if let Some(method) = self.pag.owner_method(node) {
            if self.frozen.contains(&method) {
                return;
            }
        }
        self.ensure_capacity();
        let added = self.pts[node as usize].union_diff(objs);
        if added.is_empty() {
            return;
        }
        self.diff[node as usize].union_diff(&added);
        if let Some(obs) = self.observer.as_mut() {
            obs.on_points_to_grow(node, &added);
        }
        self.enqueue(node);
    }

    /// Insert an edge and push existing facts across it
    pub(crate) fn add_pag_edge(&mut self, edge: PagEdge) -> bool {
        if !self.pag.add_edge(edge.clone()) {
            return false;
        }
        match edge.kind {
            kind if kind.is_object_flow() => {
                self.add_objects(edge.dst, &PointsToSet::singleton(edge.src));
            }
            kind if kind.is_copy_like() => {
                let src = self.points_to(edge.src).clone();
                self.add_objects(edge.dst, &src);
            }
            PagEdgeKind::Load => {
                if let Some(field) = &edge.field {
                    let base = self.points_to(edge.src).clone();
                    for obj in base.iter() {
                        self.materialize_load(obj, field, edge.dst);
                    }
                }
            }
            PagEdgeKind::Store => {
                if let Some(field) = &edge.field {
                    let base = self.points_to(edge.dst).clone();
                    for obj in base.iter() {
                        self.materialize_store(edge.src, obj, field);
                    }
                }
            }
            _ => {}
        }
        true
    }

    /// `dst ⊇ obj.field`
    fn materialize_load(&mut self, obj: PagNodeId, field: &FieldKey, dst: PagNodeId) {
        if self.pag.is_unknown(obj) {
            // Reading through an unknown object yields an unknown object
            let unknown = PointsToSet::singleton(obj);
            self.add_objects(dst, &unknown);
            return;
        }
        let field_node = self.pag.field_node(obj, field.clone());
        self.add_pag_edge(PagEdge::copy(field_node, dst));
    }

    /// `obj.field ⊇ src`
    fn materialize_store(&mut self, src: PagNodeId, obj: PagNodeId, field: &FieldKey) {
        if self.pag.is_unknown(obj) {
            return;
        }
        let field_node = self.pag.field_node(obj, field.clone());
        self.add_pag_edge(PagEdge::copy(src, field_node));
    }

    pub fn points_to(&self, node: PagNodeId) -> &PointsToSet {
        self.pts.get(node as usize).unwrap_or(&EMPTY_SET)
    }

    // ------------------------------------------------------------------
    // Method instances
    // ------------------------------------------------------------------

    pub(crate) fn schedule_instance(&mut self, method: MethodId, ctx: ContextId) {
        if !self.handled.contains(&(method, ctx)) {
            self.pending_instances.push_back((method, ctx));
        }
    }

    fn drain_instances(&mut self) {
        while let Some((method, ctx)) = self.pending_instances.pop_front() {
            self.instantiate(method, ctx);
        }
    }

    fn fragment(&mut self, method: MethodId) -> Option<Arc<FuncPag>> {
        if let Some(frag) = self.fragments.get(&method) {
            return Some(Arc::clone(frag));
        }
        let program = self.program;
        let decl = program.method(method)?;
        let frag = Arc::new(FuncPag::build(decl, &mut self.pag));
        self.fragments.insert(method, Arc::clone(&frag));
        Some(frag)
    }

    /// Import `method`'s fragment under `ctx`, once
    fn instantiate(&mut self, method: MethodId, ctx: ContextId) {
        if !self.handled.insert((method, ctx)) {
            return;
        }
        let program = self.program;
        let Some(decl) = program.method(method) else {
            return;
        };
        let Some(frag) = self.fragment(method) else {
            return;
        };
        let caller = self.cg.add_node(decl);
        self.stats.method_instances += 1;
        tracing::trace!(
            method = %decl.signature,
            ctx = %self.contexts.describe(ctx),
            "instantiating method"
        );

        for edge in frag.instantiate(&mut self.pag, ctx) {
            self.add_pag_edge(edge);
        }
        for call in &frag.calls {
            self.process_call(caller, method, ctx, call);
        }
        for capture in &frag.captures {
            self.link_capture(method, ctx, capture);
        }
        self.export_captured(method, ctx);
    }

    /// Feed a closure's captured read from every instance of the outer local
    fn link_capture(&mut self, method: MethodId, ctx: ContextId, capture: &Capture) {
        let dst = materialize(method, &capture.dst, &mut self.pag, ctx);
        let program = self.program;
        let Some(outer) = program.resolve(&capture.outer) else {
            tracing::warn!(
                outer = %capture.outer,
                name = %capture.name,
                "captured variable from unknown method"
            );
            let unknown = self.pag.unknown_object();
            self.add_pag_edge(PagEdge::address(unknown, dst));
            return;
        };

        let names = self.captured.entry(outer).or_default();
        match names.iter_mut().find(|(n, _)| *n == capture.name) {
            Some((_, sinks)) if sinks.contains(&dst) => return,
            Some((_, sinks)) => sinks.push(dst),
            None => names.push((capture.name.clone(), vec![dst])),
        }

        let sources = self
            .pag
            .nodes_of(&PagNodeKind::local(outer, capture.name.clone()))
            .to_vec();
        for src in sources {
            self.add_pag_edge(PagEdge::copy(src, dst));
        }
        // Module-level code may never be called; give it one instance
        if self.cg.node_of_method(outer).is_none() {
            self.schedule_instance(outer, EMPTY_CONTEXT);
        }
    }

    /// Connect the locals of a fresh `(method, ctx)` instance to the
    /// closures already reading them
    fn export_captured(&mut self, method: MethodId, ctx: ContextId) {
        let Some(names) = self.captured.get(&method).cloned() else {
            return;
        };
        for (name, sinks) in names {
            let Some(src) = self.pag.find_node(&PagNodeKind::local(method, name), ctx) else {
                continue;
            };
            for dst in sinks {
                self.add_pag_edge(PagEdge::copy(src, dst));
            }
        }
    }

    fn process_call(
        &mut self,
        caller: FuncId,
        method: MethodId,
        ctx: ContextId,
        call: &FragmentCall,
    ) {
        let site = match self.cg.add_call_site(
            caller,
            call.stmt_index,
            &call.expr,
            call.result_local.clone(),
        ) {
            Ok(site) => site,
            Err(err) => {
                tracing::warn!(error = %err, "failed to register call site");
                return;
            }
        };
        self.site_templates
            .entry(site)
            .or_insert_with(|| SiteTemplate::from_call(method, call));
        let nodes = self.site_nodes(site, ctx);

        match call.expr.kind {
            CallKind::Static => {
                let program = self.program;
                match program.resolve(&call.expr.callee) {
                    Some(target) => {
                        let this = nodes
                            .receiver
                            .map(ThisSource::Var)
                            .unwrap_or(ThisSource::None);
                        let args = nodes
                            .args
                            .iter()
                            .map(|a| a.map(ArgFlow::Direct))
                            .collect();
                        self.bind_call(
                            site,
                            ctx,
                            target,
                            DispatchKind::Static,
                            this,
                            args,
                            nodes.result,
                        );
                    }
                    None => {
                        self.report_once(
                            site,
                            Diagnostic::UnresolvedReference {
                                call_site: site,
                                caller: method,
                                callee: call.expr.callee.to_string(),
                            },
                        );
                        if let Some(result) = nodes.result {
                            let unknown = self.pag.unknown_object();
                            self.add_pag_edge(PagEdge::address(unknown, result));
                        }
                    }
                }
            }
            CallKind::Virtual | CallKind::Pointer => match nodes.receiver {
                Some(receiver) => self.add_watch(
                    receiver,
                    Watch {
                        site,
                        ctx,
                        role: WatchRole::Receiver,
                    },
                ),
                None => self.report_once(
                    site,
                    Diagnostic::UnresolvedReference {
                        call_site: site,
                        caller: method,
                        callee: call.expr.callee.to_string(),
                    },
                ),
            },
        }
    }

    /// Caller-side nodes of `site` under `ctx`
    pub(crate) fn site_nodes(&mut self, site: CallSiteId, ctx: ContextId) -> SiteNodes {
        let Some(tmpl) = self.site_templates.get(&site).cloned() else {
            return SiteNodes::default();
        };
        let m = tmpl.method;
        SiteNodes {
            receiver: tmpl
                .receiver
                .as_ref()
                .map(|r| materialize(m, r, &mut self.pag, ctx)),
            args: tmpl
                .args
                .iter()
                .map(|a| a.as_ref().map(|t| materialize(m, t, &mut self.pag, ctx)))
                .collect(),
            result: tmpl
                .result
                .as_ref()
                .map(|r| materialize(m, r, &mut self.pag, ctx)),
        }
    }

    /// Watch `node`; objects it already holds are handled right away
    pub(crate) fn add_watch(&mut self, node: PagNodeId, watch: Watch) {
        let list = self.watchers.entry(node).or_default();
        if list.contains(&watch) {
            return;
        }
        list.push(watch);
        let existing = self.points_to(node).clone();
        for obj in existing.iter() {
            self.on_watch_object(watch, obj);
        }
    }

    fn on_watch_object(&mut self, watch: Watch, obj: PagNodeId) {
        if !self.resolved.insert((watch, obj)) {
            return;
        }
        match watch.role {
            WatchRole::Receiver => self.resolve_receiver(watch.site, watch.ctx, obj),
            WatchRole::Callback { container, kind } => {
                self.resolve_callback(watch.site, watch.ctx, obj, container, kind)
            }
        }
    }

    /// Add the call edge and the four bindings for one resolved target
    ///
    /// The whole binding is applied before returning; cancellation is only
    /// observed between worklist pops.
    pub(crate) fn bind_call(
        &mut self,
        site: CallSiteId,
        caller_ctx: ContextId,
        target: MethodId,
        kind: DispatchKind,
        this: ThisSource,
        args: Vec<Option<ArgFlow>>,
        result: Option<PagNodeId>,
    ) {
        let program = self.program;
        let Some(callee) = program.method(target) else {
            return;
        };
        let caller = match self.cg.call_site(site) {
            Ok(cs) => cs.caller,
            Err(err) => {
                tracing::warn!(error = %err, "binding through unknown call site");
                return;
            }
        };
        let callee_func = self.cg.add_node(callee);
        match self.cg.add_edge(caller, callee_func, site, kind, self.pops) {
            Ok(true) => {
                tracing::debug!(
                    site,
                    callee = %callee.signature,
                    kind = kind.as_str(),
                    pops = self.pops,
                    "new call edge"
                );
                if let Some(edge) = self.cg.edges().last().cloned() {
                    if let Some(obs) = self.observer.as_mut() {
                        obs.on_call_edge(&edge);
                    }
                }
            }
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(error = %err, "rejected call edge");
                return;
            }
        }

        let callee_ctx = self.contexts.push_k(caller_ctx, site);
        self.schedule_instance(target, callee_ctx);

        match this {
            ThisSource::None => {}
            ThisSource::Object(obj) => {
                let callee_this = self
                    .pag
                    .get_or_create_node(PagNodeKind::this_of(target), callee_ctx);
                self.add_pag_edge(PagEdge::this(obj, callee_this, site));
            }
            ThisSource::Var(var) => {
                let callee_this = self
                    .pag
                    .get_or_create_node(PagNodeKind::this_of(target), callee_ctx);
                self.add_pag_edge(PagEdge::call_arg(var, callee_this, site));
            }
        }

        for (i, flow) in args.into_iter().enumerate() {
            let Some(flow) = flow else {
                continue;
            };
            let formal = self
                .pag
                .get_or_create_node(PagNodeKind::param_of(target, i), callee_ctx);
            match flow {
                ArgFlow::Direct(actual) => {
                    self.add_pag_edge(PagEdge::call_arg(actual, formal, site));
                }
                ArgFlow::ElementsOf(container_var) => {
                    self.add_pag_edge(PagEdge::load(
                        container_var,
                        formal,
                        FieldKey::ContainerElement,
                    ));
                }
                ArgFlow::ElementField(container_obj) => {
                    let elem = self
                        .pag
                        .field_node(container_obj, FieldKey::ContainerElement);
                    self.add_pag_edge(PagEdge::call_arg(elem, formal, site));
                }
            }
        }

        if let Some(result) = result {
            let ret = self
                .pag
                .get_or_create_node(PagNodeKind::return_of(target), callee_ctx);
            self.add_pag_edge(PagEdge::call_return(ret, result, site));
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics & stats
    // ------------------------------------------------------------------

    pub(crate) fn report_once(&mut self, site: CallSiteId, diagnostic: Diagnostic) {
        if self.reported.insert((site, diagnostic.kind())) {
            self.record(diagnostic);
        }
    }

    pub(crate) fn record(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(kind = diagnostic.kind(), "{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn finish_stats(&mut self, reached: bool, started: Instant) {
        let stats = &mut self.stats;
        stats.pag_nodes = self.pag.node_count();
        stats.pag_edges = self.pag.edge_count();
        stats.contexts = self.contexts.len();
        stats.call_graph_nodes = self.cg.node_count();
        stats.call_graph_edges = self.cg.edge_count();
        stats.worklist_pops = self.pops;
        stats.max_points_to_size = self.pts.iter().map(PointsToSet::len).max().unwrap_or(0);
        stats.total_points_to_size = self.pts.iter().map(PointsToSet::len).sum();
        stats.diagnostics = self.diagnostics.len();
        stats.reached_fixpoint = reached;
        stats.elapsed_ms += started.elapsed().as_millis() as u64;
    }

    pub fn is_frozen(&self, method: MethodId) -> bool {
        self.frozen.contains(&method)
    }
}
