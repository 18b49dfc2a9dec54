//! Property-based tests
//!
//! Invariants that must hold for every generated input:
//! - SCC partition matches petgraph's Tarjan, components come callees-first
//! - A budgeted run is a prefix of the full run (monotone points-to sets)
//! - Runs are deterministic
//! - Every call-graph edge sits on a call statement owned by its caller

#[path = "../common/mod.rs"]
mod common;
use common::*;

use codegraph_pta::features::call_graph::DispatchKind;
use codegraph_pta::shared::models::{Local, ProgramBuilder, Stmt, Type, Value};
use codegraph_pta::{detect_sccs, MethodId, PointerAnalysisConfig, Program};
use petgraph::graph::{DiGraph, NodeIndex};
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..24).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n), 0..(n * 3));
        (Just(n), edges)
    })
}

#[derive(Debug, Clone)]
enum Op {
    Alloc(u8, u8),
    Copy(u8, u8),
    Store(u8, u8),
    Load(u8, u8),
    Call(u8, u8, u8),
    Return(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<u8>(), any::<u8>()).prop_map(|(a, b)| Op::Alloc(a, b)),
        (any::<u8>(), any::<u8>()).prop_map(|(a, b)| Op::Copy(a, b)),
        (any::<u8>(), any::<u8>()).prop_map(|(a, b)| Op::Store(a, b)),
        (any::<u8>(), any::<u8>()).prop_map(|(a, b)| Op::Load(a, b)),
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(a, b, c)| Op::Call(a, b, c)),
        any::<u8>().prop_map(Op::Return),
    ]
}

fn body_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 0..10)
}

fn slot(i: u8) -> Local {
    var(&format!("l{}", i % 4), "C0")
}

fn class_name(i: u8) -> String {
    format!("C{}", i % 3)
}

fn lower(ops: &[Op]) -> Vec<Stmt> {
    ops.iter()
        .map(|op| match *op {
            Op::Alloc(dst, cls) => Stmt::assign(
                Value::Local(slot(dst)),
                Value::new_object(class_name(cls)),
            ),
            Op::Copy(dst, src) => Stmt::assign(Value::Local(slot(dst)), Value::Local(slot(src))),
            Op::Store(base, src) => {
                Stmt::assign(Value::field(slot(base), "f"), Value::Local(slot(src)))
            }
            Op::Load(dst, base) => {
                Stmt::assign(Value::Local(slot(dst)), Value::field(slot(base), "f"))
            }
            Op::Call(dst, recv, arg) => call_virtual(
                &slot(dst).name,
                &slot(recv).name,
                "C0",
                "m",
                &[slot(arg).name.as_str()],
            ),
            Op::Return(src) => Stmt::Return(Some(Value::Local(slot(src)))),
        })
        .collect()
}

/// `C1, C2 extend C0`; `C0.m` and `C1.m` take one parameter; `main` is static.
/// Locals read `%param0` through `l0`.
fn build_program(main_ops: &[Op], base_ops: &[Op], derived_ops: &[Op]) -> (Program, MethodId) {
    let mut b = ProgramBuilder::new();
    b.class("C0", None);
    b.class("C1", Some("C0"));
    b.class("C2", Some("C0"));

    let with_param = |ops: &[Op]| {
        let mut body = vec![Stmt::assign(
            Value::Local(slot(0)),
            Value::Parameter { index: 0 },
        )];
        body.extend(lower(ops));
        body
    };
    b.method("C0", "m")
        .param("%param0", Type::class("C0"))
        .returns(Type::class("C0"))
        .body(with_param(base_ops))
        .finish();
    b.method("C1", "m")
        .param("%param0", Type::class("C0"))
        .returns(Type::class("C0"))
        .body(with_param(derived_ops))
        .finish();
    let main = b
        .method("Main", "main")
        .static_method()
        .body(lower(main_ops))
        .finish();
    (b.build(), main)
}

fn budget_config(pops: Option<usize>) -> PointerAnalysisConfig {
    config_with_depth(1).with_max_worklist_pops(pops).unwrap()
}

// ============================================================================
// SCC properties
// ============================================================================

proptest! {
    #[test]
    fn prop_scc_partition_matches_petgraph((n, edges) in graph_strategy()) {
        let mut g = DiGraph::<(), ()>::new();
        let nodes: Vec<NodeIndex> = (0..n).map(|_| g.add_node(())).collect();
        for &(a, b) in &edges {
            g.add_edge(nodes[a], nodes[b], ());
        }

        let ours = detect_sccs(&g);
        let mut ours_sets: Vec<Vec<usize>> = ours
            .components()
            .iter()
            .map(|c| {
                let mut m: Vec<usize> = c.members.iter().map(|x| x.index()).collect();
                m.sort_unstable();
                m
            })
            .collect();
        ours_sets.sort();

        let mut theirs: Vec<Vec<usize>> = petgraph::algo::tarjan_scc(&g)
            .into_iter()
            .map(|c| {
                let mut m: Vec<usize> = c.iter().map(|x| x.index()).collect();
                m.sort_unstable();
                m
            })
            .collect();
        theirs.sort();

        prop_assert_eq!(ours_sets, theirs);
    }

    #[test]
    fn prop_components_are_callees_first((n, edges) in graph_strategy()) {
        let mut g = DiGraph::<(), ()>::new();
        let nodes: Vec<NodeIndex> = (0..n).map(|_| g.add_node(())).collect();
        for &(a, b) in &edges {
            g.add_edge(nodes[a], nodes[b], ());
        }
        let scc = detect_sccs(&g);

        let total: usize = scc.components().iter().map(|c| c.members.len()).sum();
        prop_assert_eq!(total, n);
        prop_assert_eq!(scc.topo_and_collapsed_node_stack().len(), scc.component_count());

        for &(a, b) in &edges {
            let pa = scc.position_of(nodes[a]).unwrap();
            let pb = scc.position_of(nodes[b]).unwrap();
            prop_assert!(pb <= pa, "edge {}->{} goes to a later component", a, b);
            if a == b {
                prop_assert!(scc.is_in_cycle(nodes[a]));
            }
        }
    }
}

// ============================================================================
// Solver properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_budgeted_run_is_prefix_of_full_run(
        main_ops in body_strategy(),
        base_ops in body_strategy(),
        derived_ops in body_strategy(),
        budget in 1usize..40,
    ) {
        let (program, main) = build_program(&main_ops, &base_ops, &derived_ops);
        let partial = analyze(&program, &[main], budget_config(Some(budget)));
        let full = analyze(&program, &[main], budget_config(None));

        prop_assert!(full.stats().reached_fixpoint);
        prop_assert!(partial.pag().node_count() <= full.pag().node_count());
        for node in partial.pag().nodes() {
            prop_assert_eq!(Some(node), full.pag().node(node.id));
            prop_assert!(partial.points_to(node.id).is_subset(full.points_to(node.id)));
        }
        for edge in partial.call_graph().edges() {
            prop_assert!(full.call_graph().edges().contains(edge));
        }
    }

    #[test]
    fn prop_runs_are_deterministic(
        main_ops in body_strategy(),
        base_ops in body_strategy(),
        derived_ops in body_strategy(),
    ) {
        let (program, main) = build_program(&main_ops, &base_ops, &derived_ops);
        let first = analyze(&program, &[main], budget_config(None));
        let second = analyze(&program, &[main], budget_config(None));

        prop_assert_eq!(first.pag().nodes(), second.pag().nodes());
        prop_assert_eq!(first.call_graph().edges(), second.call_graph().edges());
        for node in first.pag().nodes() {
            prop_assert_eq!(first.points_to(node.id), second.points_to(node.id));
        }
        prop_assert_eq!(first.diagnostics(), second.diagnostics());
    }

    #[test]
    fn prop_call_edges_are_valid(
        main_ops in body_strategy(),
        base_ops in body_strategy(),
        derived_ops in body_strategy(),
    ) {
        let (program, main) = build_program(&main_ops, &base_ops, &derived_ops);
        let analysis = analyze(&program, &[main], budget_config(None));
        let cg = analysis.call_graph();

        for edge in cg.edges() {
            let site = cg.call_site(edge.call_site).unwrap();
            prop_assert_eq!(site.caller, edge.caller);
            prop_assert!(program.is_call_stmt(site.method, site.stmt_index));

            let callee = program.method(cg.node(edge.callee).unwrap().method).unwrap();
            prop_assert_eq!(edge.kind, DispatchKind::Dynamic);
            prop_assert_eq!(&callee.signature.method_name, &site.callee_sig.method_name);
            prop_assert!(program.is_subclass_of(callee.class_name(), &site.callee_sig.class_name));
        }

        for edge in cg.edges() {
            prop_assert!(edge.discovered_at <= analysis.stats().worklist_pops);
        }
    }
}
