//! Pointer analysis driver
//!
//! # Usage
//! ```text
//! let config = PointerAnalysisConfig::new(1, "out", false, false)?;
//! let mut analysis = PointerAnalysis::new(&program, config)?;
//! analysis.set_entries(&[main])?;
//! analysis.start()?;
//!
//! let objs = analysis.points_to_of_local(main, "v");
//! let edges = analysis.call_graph().edge_count();
//! ```

use crate::config::{PointerAnalysisConfig, Validatable};
use crate::errors::{PtaError, PtaResult};
use crate::features::call_graph::CallGraph;
use crate::features::export::{write_dumps, DumpSources};
use crate::features::pag::domain::{PagNodeId, PagNodeKind};
use crate::features::pag::infrastructure::Pag;
use crate::features::points_to::domain::{AnalysisStats, ContextTable, Diagnostic, PointsToSet};
use crate::features::points_to::infrastructure::{CancelHandle, Solver};
use crate::features::points_to::ports::{PointsToQuery, SolverObserver};
use crate::shared::models::{MethodId, Program};
use std::time::Instant;

/// One analysis run over a program
pub struct PointerAnalysis<'p> {
    solver: Solver<'p>,
    entries: Vec<MethodId>,
    seeded: bool,
}

impl<'p> PointerAnalysis<'p> {
    pub fn new(program: &'p Program, config: PointerAnalysisConfig) -> PtaResult<Self> {
        config.validate()?;
        Ok(Self {
            solver: Solver::new(program, config),
            entries: Vec::new(),
            seeded: false,
        })
    }

    /// Set the entry methods; every id must exist in the program
    pub fn set_entries(&mut self, entries: &[MethodId]) -> PtaResult<()> {
        if self.seeded {
            return Err(PtaError::config("entries cannot change after start()"));
        }
        for &id in entries {
            if self.solver.program.method(id).is_none() {
                return Err(PtaError::UnknownEntry(id));
            }
        }
        self.entries = entries.to_vec();
        Ok(())
    }

    pub fn entries(&self) -> &[MethodId] {
        &self.entries
    }

    /// Solve to fixpoint, then write the requested dumps
    ///
    /// A run stopped by the budget or a cancel still returns `Ok`; check
    /// `reached_fixpoint` and the diagnostics.
    pub fn start(&mut self) -> PtaResult<&AnalysisStats> {
        let started = Instant::now();
        if !self.seeded {
            self.solver.seed(&self.entries)?;
            self.seeded = true;
        }
        tracing::info!(
            entries = self.entries.len(),
            context_depth = self.solver.config.context_depth(),
            "pointer analysis started"
        );

        let reached = self.solver.solve();

        let failures = write_dumps(
            &self.solver.config,
            &DumpSources {
                program: self.solver.program,
                pag: &self.solver.pag,
                call_graph: &self.solver.cg,
                contexts: &self.solver.contexts,
                stats: &self.solver.stats,
            },
        );
        for failure in failures {
            self.solver.record(failure);
        }
        self.solver.stats.diagnostics = self.solver.diagnostics.len();

        let stats = &self.solver.stats;
        tracing::info!(
            reached_fixpoint = reached,
            pag_nodes = stats.pag_nodes,
            call_graph_edges = stats.call_graph_edges,
            pops = stats.worklist_pops,
            diagnostics = stats.diagnostics,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pointer analysis finished"
        );
        Ok(stats)
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.solver.cancel_handle()
    }

    pub fn set_observer(&mut self, observer: Box<dyn SolverObserver>) {
        self.solver.set_observer(observer);
    }

    /// Nodes related to a local: its per-context nodes, the objects they
    /// point to, and every variable, field or global sharing one of those
    /// objects. Sorted by id.
    pub fn get_related_nodes(&self, method: MethodId, name: &str) -> Vec<PagNodeId> {
        let pag = &self.solver.pag;
        let own = pag.nodes_of(&PagNodeKind::local(method, name));
        if own.is_empty() {
            return Vec::new();
        }

        let objects = self.points_to_of_local(method, name);
        let mut related: Vec<PagNodeId> = own.to_vec();
        related.extend(objects.iter());
        if !objects.is_empty() {
            for node in pag.nodes() {
                if node.kind.is_object() {
                    continue;
                }
                if self.solver.points_to(node.id).intersects(&objects) {
                    related.push(node.id);
                }
            }
        }
        related.sort_unstable();
        related.dedup();
        related
    }

    /// Points-to set of one PAG node
    pub fn points_to(&self, node: PagNodeId) -> &PointsToSet {
        self.solver.points_to(node)
    }

    pub fn call_graph(&self) -> &CallGraph {
        &self.solver.cg
    }

    pub fn pag(&self) -> &Pag {
        &self.solver.pag
    }

    pub fn contexts(&self) -> &ContextTable {
        &self.solver.contexts
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.solver.diagnostics
    }

    pub fn stats(&self) -> &AnalysisStats {
        &self.solver.stats
    }

    pub fn config(&self) -> &PointerAnalysisConfig {
        &self.solver.config
    }

    pub fn program(&self) -> &'p Program {
        self.solver.program
    }

    /// Whether `method` belongs to a component frozen by the recursion cap
    pub fn is_frozen(&self, method: MethodId) -> bool {
        self.solver.is_frozen(method)
    }
}

impl PointsToQuery for PointerAnalysis<'_> {
    fn points_to_of_local(&self, method: MethodId, name: &str) -> PointsToSet {
        let pag = &self.solver.pag;
        let mut merged = PointsToSet::new();
        for &node in pag.nodes_of(&PagNodeKind::local(method, name)) {
            merged.union_diff(self.solver.points_to(node));
        }
        merged
    }
}
