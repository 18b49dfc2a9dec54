//! Pointer Assignment Graph storage
//!
//! Arena of interned nodes plus deduplicated edges with per-node in/out
//! adjacency. The graph only grows. Two sentinel objects exist from the
//! start: the unknown object and `globalThis`.

use crate::features::pag::domain::*;
use crate::features::points_to::domain::{ContextId, EMPTY_CONTEXT};
use crate::shared::models::{MethodId, Type};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone)]
pub struct Pag {
    nodes: Vec<PagNode>,
    node_index: FxHashMap<(PagNodeKind, ContextId), PagNodeId>,
    by_kind: FxHashMap<PagNodeKind, Vec<PagNodeId>>,
    edges: Vec<PagEdge>,
    edge_index: FxHashSet<PagEdge>,
    out_edges: Vec<Vec<usize>>,
    in_edges: Vec<Vec<usize>>,
    alloc_sites: Vec<AllocSite>,
    alloc_index: FxHashMap<AllocSite, AllocSiteId>,
    unknown_object: PagNodeId,
    global_this_object: PagNodeId,
}

impl Default for Pag {
    fn default() -> Self {
        Self::new()
    }
}

impl Pag {
    pub fn new() -> Self {
        let mut pag = Self {
            nodes: Vec::new(),
            node_index: FxHashMap::default(),
            by_kind: FxHashMap::default(),
            edges: Vec::new(),
            edge_index: FxHashSet::default(),
            out_edges: Vec::new(),
            in_edges: Vec::new(),
            alloc_sites: Vec::new(),
            alloc_index: FxHashMap::default(),
            unknown_object: 0,
            global_this_object: 0,
        };

        let unknown = pag.intern_alloc_site(AllocSite::synthetic(
            AllocSiteKind::Unknown,
            None,
            Type::Unknown,
        ));
        let global_this = pag.intern_alloc_site(AllocSite::synthetic(
            AllocSiteKind::GlobalThis,
            None,
            Type::class("globalThis"),
        ));
        debug_assert_eq!(unknown, UNKNOWN_SITE);
        debug_assert_eq!(global_this, GLOBAL_THIS_SITE);

        pag.unknown_object = pag.object_node(UNKNOWN_SITE, EMPTY_CONTEXT);
        pag.global_this_object = pag.object_node(GLOBAL_THIS_SITE, EMPTY_CONTEXT);
        pag
    }

    /// Interned node for `(kind, ctx)`
    pub fn get_or_create_node(&mut self, kind: PagNodeKind, ctx: ContextId) -> PagNodeId {
        let key = (kind, ctx);
        if let Some(&id) = self.node_index.get(&key) {
            return id;
        }
        let (kind, ctx) = key;
        let id = self.nodes.len() as PagNodeId;
        self.nodes.push(PagNode {
            id,
            kind: kind.clone(),
            ctx,
        });
        self.out_edges.push(Vec::new());
        self.in_edges.push(Vec::new());
        self.by_kind.entry(kind.clone()).or_default().push(id);
        self.node_index.insert((kind, ctx), id);
        id
    }

    pub fn find_node(&self, kind: &PagNodeKind, ctx: ContextId) -> Option<PagNodeId> {
        self.node_index.get(&(kind.clone(), ctx)).copied()
    }

    /// Heap object for `site` allocated under `ctx`
    pub fn object_node(&mut self, site: AllocSiteId, ctx: ContextId) -> PagNodeId {
        let ty = self
            .alloc_sites
            .get(site as usize)
            .map(|s| s.ty.clone())
            .unwrap_or(Type::Unknown);
        self.get_or_create_node(PagNodeKind::HeapObject { site, ty }, ctx)
    }

    /// Field node `base.field`; the field inherits the base's context
    pub fn field_node(&mut self, base: PagNodeId, field: FieldKey) -> PagNodeId {
        let ctx = self.nodes.get(base as usize).map(|n| n.ctx).unwrap_or(EMPTY_CONTEXT);
        self.get_or_create_node(PagNodeKind::Field { base, field }, ctx)
    }

    /// Add an edge; returns false if an identical edge exists
    pub fn add_edge(&mut self, edge: PagEdge) -> bool {
        if self.edge_index.contains(&edge) {
            return false;
        }
        let idx = self.edges.len();
        if let Some(out) = self.out_edges.get_mut(edge.src as usize) {
            out.push(idx);
        }
        if let Some(inc) = self.in_edges.get_mut(edge.dst as usize) {
            inc.push(idx);
        }
        self.edge_index.insert(edge.clone());
        self.edges.push(edge);
        true
    }

    pub fn edges_from(&self, node: PagNodeId) -> impl Iterator<Item = &PagEdge> + '_ {
        self.out_edges
            .get(node as usize)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    pub fn edges_to(&self, node: PagNodeId) -> impl Iterator<Item = &PagEdge> + '_ {
        self.in_edges
            .get(node as usize)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    /// Edge indices leaving / entering `node` (stable while the graph grows)
    pub(crate) fn out_edge_indices(&self, node: PagNodeId) -> &[usize] {
        self.out_edges.get(node as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn in_edge_indices(&self, node: PagNodeId) -> &[usize] {
        self.in_edges.get(node as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge(&self, idx: usize) -> Option<&PagEdge> {
        self.edges.get(idx)
    }

    /// All context instances of a structural kind
    pub fn nodes_of(&self, kind: &PagNodeKind) -> &[PagNodeId] {
        self.by_kind.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node(&self, id: PagNodeId) -> Option<&PagNode> {
        self.nodes.get(id as usize)
    }

    pub fn nodes(&self) -> &[PagNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[PagEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn intern_alloc_site(&mut self, site: AllocSite) -> AllocSiteId {
        if let Some(&id) = self.alloc_index.get(&site) {
            return id;
        }
        let id = self.alloc_sites.len() as AllocSiteId;
        self.alloc_index.insert(site.clone(), id);
        self.alloc_sites.push(site);
        id
    }

    pub fn alloc_site(&self, id: AllocSiteId) -> Option<&AllocSite> {
        self.alloc_sites.get(id as usize)
    }

    /// Allocation site of an object node
    pub fn object_site(&self, node: PagNodeId) -> Option<&AllocSite> {
        match &self.node(node)?.kind {
            PagNodeKind::HeapObject { site, .. } => self.alloc_site(*site),
            _ => None,
        }
    }

    /// Declared type of an object node
    pub fn object_type(&self, node: PagNodeId) -> Option<&Type> {
        match &self.node(node)?.kind {
            PagNodeKind::HeapObject { ty, .. } => Some(ty),
            _ => None,
        }
    }

    pub fn unknown_object(&self) -> PagNodeId {
        self.unknown_object
    }

    pub fn global_this_object(&self) -> PagNodeId {
        self.global_this_object
    }

    pub fn is_unknown(&self, node: PagNodeId) -> bool {
        node == self.unknown_object
    }

    /// Method instance a node belongs to, for scheduling
    ///
    /// Locals answer with their method, objects with their allocating
    /// method, fields with the owner of their base object. Globals and
    /// program-wide objects have no owner.
    pub fn owner_method(&self, node: PagNodeId) -> Option<MethodId> {
        let mut current = node;
        loop {
            match &self.node(current)?.kind {
                PagNodeKind::LocalVar { method, .. } => return Some(*method),
                PagNodeKind::HeapObject { site, .. } => return self.alloc_site(*site)?.method,
                PagNodeKind::Field { base, .. } => current = *base,
                PagNodeKind::Global(_) => return None,
            }
        }
    }
}
