//! Post-run dumps under the configured output directory
//!
//! | File             | Flag              |
//! |------------------|-------------------|
//! | `pag.dot`        | `dump_pag`        |
//! | `call_graph.dot` | `dump_call_graph` |
//! | `stats.json`     | `dump_stats`      |
//!
//! A failed write never fails the run; it becomes a `DumpFailed` diagnostic.

use super::dot::{call_graph_to_dot, pag_to_dot};
use crate::config::PointerAnalysisConfig;
use crate::errors::{PtaError, PtaResult};
use crate::features::call_graph::CallGraph;
use crate::features::pag::infrastructure::Pag;
use crate::features::points_to::domain::{AnalysisStats, ContextTable, Diagnostic};
use crate::shared::models::Program;
use std::path::{Path, PathBuf};

pub const PAG_DOT_FILE: &str = "pag.dot";
pub const CALL_GRAPH_DOT_FILE: &str = "call_graph.dot";
pub const STATS_FILE: &str = "stats.json";

/// Everything a dump may render
pub struct DumpSources<'a> {
    pub program: &'a Program,
    pub pag: &'a Pag,
    pub call_graph: &'a CallGraph,
    pub contexts: &'a ContextTable,
    pub stats: &'a AnalysisStats,
}

/// Serialize run statistics as pretty JSON
pub fn stats_to_json(stats: &AnalysisStats) -> PtaResult<String> {
    Ok(serde_json::to_string_pretty(stats)?)
}

/// Write every requested dump; returns one diagnostic per failed file
pub fn write_dumps(config: &PointerAnalysisConfig, sources: &DumpSources<'_>) -> Vec<Diagnostic> {
    let mut failures = Vec::new();
    if !config.wants_dumps() {
        return failures;
    }

    let dir = config.output_directory();
    if let Err(e) = std::fs::create_dir_all(dir) {
        failures.push(Diagnostic::DumpFailed {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        });
        return failures;
    }

    if config.dump_pag() {
        let dot = pag_to_dot(sources.pag, sources.program, sources.contexts);
        write_one(dir, PAG_DOT_FILE, Ok(dot), &mut failures);
    }
    if config.dump_call_graph() {
        let dot = call_graph_to_dot(sources.call_graph, sources.program);
        write_one(dir, CALL_GRAPH_DOT_FILE, Ok(dot), &mut failures);
    }
    if config.dump_stats() {
        write_one(dir, STATS_FILE, stats_to_json(sources.stats), &mut failures);
    }
    failures
}

fn write_one(
    dir: &Path,
    name: &str,
    content: PtaResult<String>,
    failures: &mut Vec<Diagnostic>,
) {
    let path: PathBuf = dir.join(name);
    let result = content.and_then(|text| std::fs::write(&path, text).map_err(PtaError::from));
    match result {
        Ok(()) => tracing::debug!(path = %path.display(), "wrote dump"),
        Err(e) => failures.push(Diagnostic::DumpFailed {
            path,
            reason: e.to_string(),
        }),
    }
}
