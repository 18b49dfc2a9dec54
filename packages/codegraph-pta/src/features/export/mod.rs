//! Diagnostic exports: DOT renderings and the JSON stats dump

pub mod dot;
pub mod dump;

pub use dot::{call_graph_to_dot, pag_to_dot};
pub use dump::{stats_to_json, write_dumps, DumpSources};
