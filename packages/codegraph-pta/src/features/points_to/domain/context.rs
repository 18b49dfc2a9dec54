//! k-limited call-string contexts
//!
//! A context is the sequence of the last `k` call sites on the path to a
//! method instance. Contexts are interned so PAG keys carry a single
//! `ContextId`; heap objects reuse the allocating instance's id, which
//! bounds allocation contexts by the same `k`.

use crate::features::call_graph::CallSiteId;
use rustc_hash::FxHashMap;

pub type ContextId = u32;

/// The empty call string (entries, globals, synthetic objects)
pub const EMPTY_CONTEXT: ContextId = 0;

#[derive(Debug, Clone)]
pub struct ContextTable {
    contexts: Vec<Vec<CallSiteId>>,
    index: FxHashMap<Vec<CallSiteId>, ContextId>,
    max_depth: usize,
}

impl ContextTable {
    pub fn new(max_depth: usize) -> Self {
        let mut index = FxHashMap::default();
        index.insert(Vec::new(), EMPTY_CONTEXT);
        Self {
            contexts: vec![Vec::new()],
            index,
            max_depth,
        }
    }

    /// Context for a callee reached from `ctx` through `site`
    ///
    /// Appends `site` and drops the oldest elements beyond `k`.
    pub fn push_k(&mut self, ctx: ContextId, site: CallSiteId) -> ContextId {
        if self.max_depth == 0 {
            return EMPTY_CONTEXT;
        }
        let mut elements = self.elements(ctx).to_vec();
        elements.push(site);
        if elements.len() > self.max_depth {
            let excess = elements.len() - self.max_depth;
            elements.drain(..excess);
        }
        self.intern(elements)
    }

    fn intern(&mut self, elements: Vec<CallSiteId>) -> ContextId {
        if let Some(&id) = self.index.get(&elements) {
            return id;
        }
        let id = self.contexts.len() as ContextId;
        self.contexts.push(elements.clone());
        self.index.insert(elements, id);
        id
    }

    /// Call sites of `ctx`, oldest first (empty for unknown ids)
    pub fn elements(&self, ctx: ContextId) -> &[CallSiteId] {
        self.contexts
            .get(ctx as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        // The empty context is always present
        false
    }

    /// `[s1, s2]` rendering for dumps
    pub fn describe(&self, ctx: ContextId) -> String {
        let parts: Vec<String> = self.elements(ctx).iter().map(|s| s.to_string()).collect();
        format!("[{}]", parts.join(", "))
    }
}
