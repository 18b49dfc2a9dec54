//! Grow-only call graph
//!
//! Nodes, call sites and edges live in dense vectors indexed by their ids.
//! Nothing is ever removed; `version` increases with every new edge so the
//! solver knows when its SCC view is stale.

use super::types::*;
use crate::errors::{PtaError, PtaResult};
use crate::shared::models::{InvokeExpr, Local, Method, MethodId};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    nodes: Vec<CallGraphNode>,
    method_to_node: FxHashMap<MethodId, FuncId>,
    call_sites: Vec<CallSite>,
    site_index: FxHashMap<(MethodId, usize), CallSiteId>,
    edges: Vec<CallGraphEdge>,
    edge_index: FxHashSet<(FuncId, FuncId, CallSiteId)>,
    out_edges: Vec<Vec<usize>>,
    in_edges: Vec<Vec<usize>>,
    entries: Vec<FuncId>,
    version: u64,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node for `method`, created on first request
    pub fn add_node(&mut self, method: &Method) -> FuncId {
        if let Some(&id) = self.method_to_node.get(&method.id) {
            return id;
        }
        let id = self.nodes.len() as FuncId;
        let kind = if !method.has_body() {
            CallGraphNodeKind::Sdk
        } else if method.is_constructor {
            CallGraphNodeKind::Constructor
        } else {
            CallGraphNodeKind::Normal
        };
        self.nodes.push(CallGraphNode {
            id,
            method: method.id,
            kind,
            call_sites: Vec::new(),
        });
        self.out_edges.push(Vec::new());
        self.in_edges.push(Vec::new());
        self.method_to_node.insert(method.id, id);
        id
    }

    /// Call site for statement `stmt_index` of `caller`, created on first request
    pub fn add_call_site(
        &mut self,
        caller: FuncId,
        stmt_index: usize,
        expr: &InvokeExpr,
        result: Option<Local>,
    ) -> PtaResult<CallSiteId> {
        let method = self.node(caller)?.method;
        if let Some(&id) = self.site_index.get(&(method, stmt_index)) {
            return Ok(id);
        }
        let id = self.call_sites.len() as CallSiteId;
        self.call_sites.push(CallSite {
            id,
            caller,
            method,
            stmt_index,
            kind: expr.kind.into(),
            callee_sig: expr.callee.clone(),
            receiver: expr.base.clone(),
            args: expr.args.clone(),
            result,
        });
        self.site_index.insert((method, stmt_index), id);
        self.nodes[caller as usize].call_sites.push(id);
        Ok(id)
    }

    /// Add `caller -> callee` at `site`; returns whether the edge is new.
    ///
    /// The site must belong to `caller`.
    pub fn add_edge(
        &mut self,
        caller: FuncId,
        callee: FuncId,
        site: CallSiteId,
        kind: DispatchKind,
        discovered_at: u64,
    ) -> PtaResult<bool> {
        self.node(caller)?;
        self.node(callee)?;
        let owner = self
            .call_sites
            .get(site as usize)
            .ok_or(PtaError::UnknownCallSite(site))?
            .caller;
        if owner != caller {
            return Err(PtaError::ForeignCallSite {
                site,
                owner,
                caller,
            });
        }
        if !self.edge_index.insert((caller, callee, site)) {
            return Ok(false);
        }
        let idx = self.edges.len();
        self.edges.push(CallGraphEdge {
            caller,
            callee,
            call_site: site,
            kind,
            discovered_at,
        });
        self.out_edges[caller as usize].push(idx);
        self.in_edges[callee as usize].push(idx);
        self.version += 1;
        Ok(true)
    }

    pub fn node(&self, id: FuncId) -> PtaResult<&CallGraphNode> {
        self.nodes.get(id as usize).ok_or(PtaError::UnknownNode(id))
    }

    pub fn node_of_method(&self, method: MethodId) -> Option<FuncId> {
        self.method_to_node.get(&method).copied()
    }

    pub fn call_site(&self, id: CallSiteId) -> PtaResult<&CallSite> {
        self.call_sites
            .get(id as usize)
            .ok_or(PtaError::UnknownCallSite(id))
    }

    pub fn call_site_at(&self, method: MethodId, stmt_index: usize) -> Option<CallSiteId> {
        self.site_index.get(&(method, stmt_index)).copied()
    }

    /// Distinct callees in first-discovery order
    pub fn callees(&self, node: FuncId) -> Vec<FuncId> {
        let mut seen = FxHashSet::default();
        self.edges_from(node)
            .map(|e| e.callee)
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Distinct callers in first-discovery order
    pub fn callers(&self, node: FuncId) -> Vec<FuncId> {
        let mut seen = FxHashSet::default();
        self.edges_to(node)
            .map(|e| e.caller)
            .filter(|c| seen.insert(*c))
            .collect()
    }

    pub fn edges_from(&self, node: FuncId) -> impl Iterator<Item = &CallGraphEdge> + '_ {
        self.out_edges
            .get(node as usize)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    pub fn edges_to(&self, node: FuncId) -> impl Iterator<Item = &CallGraphEdge> + '_ {
        self.in_edges
            .get(node as usize)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    pub fn entries(&self) -> &[FuncId] {
        &self.entries
    }

    pub fn set_entries(&mut self, entries: Vec<FuncId>) {
        self.entries = entries;
    }

    pub fn nodes(&self) -> &[CallGraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[CallGraphEdge] {
        &self.edges
    }

    pub fn call_sites(&self) -> &[CallSite] {
        &self.call_sites
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Bumped on every new edge
    pub fn version(&self) -> u64 {
        self.version
    }
}
