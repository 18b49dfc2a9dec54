//! Graphviz rendering of the PAG and the call graph

use crate::features::call_graph::{CallGraph, CallGraphNodeKind, DispatchKind};
use crate::features::pag::domain::{PagEdgeKind, PagNode, PagNodeKind};
use crate::features::pag::infrastructure::Pag;
use crate::features::points_to::domain::{ContextTable, EMPTY_CONTEXT};
use crate::shared::models::{MethodId, Program};
use rustc_hash::FxHashSet;
use std::fmt::Write;

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn method_name(program: &Program, method: MethodId) -> String {
    program
        .method(method)
        .map(|m| m.signature.to_string())
        .unwrap_or_else(|| format!("method#{}", method))
}

fn pag_label(node: &PagNode, pag: &Pag, program: &Program, contexts: &ContextTable) -> String {
    let base = match &node.kind {
        PagNodeKind::LocalVar { method, name } => {
            format!("{}:{}", method_name(program, *method), name)
        }
        PagNodeKind::HeapObject { site, ty } => {
            let kind = pag.alloc_site(*site).map(|s| s.kind.as_str()).unwrap_or("?");
            format!("{} {} #{}", kind, ty, site)
        }
        PagNodeKind::Field { base, field } => format!("n{}.{}", base, field),
        PagNodeKind::Global(name) => name.clone(),
    };
    if node.ctx == EMPTY_CONTEXT {
        base
    } else {
        format!("{} {}", base, contexts.describe(node.ctx))
    }
}

/// Render the PAG; objects are drawn as boxes (dashed when synthetic), everything else as ellipses
pub fn pag_to_dot(pag: &Pag, program: &Program, contexts: &ContextTable) -> String {
    let mut dot = String::new();
    dot.push_str("digraph PAG {\n");
    dot.push_str("    node [fontname=\"Courier\", fontsize=10];\n");
    dot.push_str("    edge [fontname=\"Courier\", fontsize=9];\n\n");

    for node in pag.nodes() {
        let (shape, style) = match &node.kind {
            PagNodeKind::HeapObject { site, .. } => {
                let synthetic = pag.alloc_site(*site).is_some_and(|s| s.kind.is_synthetic());
                ("box", if synthetic { ", style=dashed" } else { "" })
            }
            _ => ("ellipse", ""),
        };
        let _ = writeln!(
            dot,
            "    n{} [label=\"{}\", shape={}{}];",
            node.id,
            escape_dot(&pag_label(node, pag, program, contexts)),
            shape,
            style
        );
    }
    dot.push('\n');

    for edge in pag.edges() {
        let label = match (&edge.field, edge.call_site) {
            (Some(field), _) => format!("{} {}", edge.kind.as_str(), field),
            (None, Some(site)) => format!("{} @{}", edge.kind.as_str(), site),
            (None, None) => edge.kind.as_str().to_string(),
        };
        let style = match edge.kind {
            PagEdgeKind::Address | PagEdgeKind::This => ", style=bold",
            PagEdgeKind::Load | PagEdgeKind::Store => ", style=dashed",
            _ => "",
        };
        let _ = writeln!(
            dot,
            "    n{} -> n{} [label=\"{}\"{}];",
            edge.src,
            edge.dst,
            escape_dot(&label),
            style
        );
    }

    dot.push_str("}\n");
    dot
}

/// Render the call graph; entries are filled green, SDK methods grey
pub fn call_graph_to_dot(cg: &CallGraph, program: &Program) -> String {
    let mut dot = String::new();
    dot.push_str("digraph CallGraph {\n");
    dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n");
    dot.push_str("    edge [fontname=\"Courier\", fontsize=9];\n");
    dot.push_str("    rankdir=TB;\n\n");

    let entries: FxHashSet<_> = cg.entries().iter().copied().collect();
    for node in cg.nodes() {
        let style = if entries.contains(&node.id) {
            ", style=filled, fillcolor=lightgreen"
        } else if node.kind == CallGraphNodeKind::Sdk {
            ", style=filled, fillcolor=lightgrey"
        } else {
            ""
        };
        let _ = writeln!(
            dot,
            "    f{} [label=\"{}\"{}];",
            node.id,
            escape_dot(&method_name(program, node.method)),
            style
        );
    }
    dot.push('\n');

    for edge in cg.edges() {
        let style = match edge.kind {
            DispatchKind::Static => "",
            DispatchKind::Dynamic => ", style=dashed",
            DispatchKind::PointerIndirect => ", style=dotted",
        };
        let _ = writeln!(
            dot,
            "    f{} -> f{} [label=\"@{}\"{}];",
            edge.caller, edge.callee, edge.call_site, style
        );
    }

    dot.push_str("}\n");
    dot
}
