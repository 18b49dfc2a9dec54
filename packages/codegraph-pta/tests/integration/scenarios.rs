//! End-to-end analysis scenarios
//!
//! Each test builds a small program, runs the full analysis and checks the
//! call graph, points-to sets and diagnostics.

#[path = "../common/mod.rs"]
mod common;
use common::*;

use codegraph_pta::features::call_graph::{CallGraphNodeKind, DispatchKind};
use codegraph_pta::features::pag::{AllocSiteKind, PagNodeKind};
use codegraph_pta::shared::models::{
    Constant, InvokeExpr, Local, MethodSignature, ProgramBuilder, Stmt, Type, Value,
};
use codegraph_pta::{detect_sccs, PointerAnalysisConfig, PointsToQuery};
use pretty_assertions::assert_eq;

// ═══════════════════════════════════════════════════════════════════════════
// Call-graph shape (SCC)
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_diamond_call_graph_has_singleton_components_callees_first() {
    let mut b = ProgramBuilder::new();
    let d = b.method("M", "d").static_method().finish();
    let bm = b
        .method("M", "b")
        .static_method()
        .body(vec![call_static("r", "M", "d", &[])])
        .finish();
    let c = b
        .method("M", "c")
        .static_method()
        .body(vec![call_static("r", "M", "d", &[])])
        .finish();
    let a = b
        .method("M", "a")
        .static_method()
        .body(vec![
            call_static("r1", "M", "b", &[]),
            call_static("r2", "M", "c", &[]),
        ])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[a], PointerAnalysisConfig::default());

    let cg = analysis.call_graph();
    assert_eq!(cg.node_count(), 4);
    assert_eq!(cg.edge_count(), 4);

    let scc = detect_sccs(cg);
    assert_eq!(scc.component_count(), 4);
    assert_eq!(scc.stats.cycle_count, 0);

    let order = scc.topo_and_collapsed_node_stack();
    let pos = |m| {
        let f = cg.node_of_method(m).unwrap();
        order.iter().position(|&x| x == f).unwrap()
    };
    assert!(pos(d) < pos(bm));
    assert!(pos(d) < pos(c));
    assert!(pos(bm) < pos(a));
    assert!(pos(c) < pos(a));
}

#[test]
fn test_mutual_recursion_forms_one_component() {
    let mut b = ProgramBuilder::new();
    let e = b
        .method("M", "e")
        .static_method()
        .body(vec![call_static("r", "M", "f", &[])])
        .finish();
    let f = b
        .method("M", "f")
        .static_method()
        .body(vec![call_static("r", "M", "e", &[])])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[e], PointerAnalysisConfig::default());

    let cg = analysis.call_graph();
    let scc = detect_sccs(cg);
    let fe = cg.node_of_method(e).unwrap();
    let ff = cg.node_of_method(f).unwrap();

    assert_eq!(scc.component_count(), 1);
    let comp = scc.component_of(fe).unwrap();
    assert!(comp.is_cycle);
    let mut members = comp.members.clone();
    members.sort_unstable();
    assert_eq!(members, vec![fe.min(ff), fe.max(ff)]);
    assert_eq!(scc.my_scc_nodes(comp.rep).len(), 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// Containers
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_set_iteration_reads_every_added_object() {
    let mut b = ProgramBuilder::new();
    b.class("A", None);
    b.class("B", None);
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![
            alloc("s", "Set"),
            alloc("x", "A"),
            alloc("y", "B"),
            Stmt::Invoke(invoke_virtual("s", "Set", "add", &["x"])),
            copy("t", "s"),
            Stmt::Invoke(invoke_virtual("t", "Set", "add", &["y"])),
            call_virtual("it", "s", "Set", "values", &[]),
            call_virtual("v", "it", "Iterator", "next", &[]),
        ])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[main], PointerAnalysisConfig::default());

    let v = analysis.points_to_of_local(main, "v");
    let x = analysis.points_to_of_local(main, "x");
    let y = analysis.points_to_of_local(main, "y");
    assert!(x.is_subset(&v));
    assert!(y.is_subset(&v));
    assert_eq!(v.len(), 2);

    // The view aliases the set itself
    assert!(analysis.may_alias((main, "it"), (main, "s")));
    // Built-in container calls never enter the call graph
    assert_eq!(analysis.call_graph().edge_count(), 0);
}

#[test]
fn test_map_stores_only_values() {
    let mut b = ProgramBuilder::new();
    b.class("K", None);
    b.class("V", None);
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![
            alloc("m", "Map"),
            alloc("k", "K"),
            alloc("val", "V"),
            Stmt::Invoke(invoke_virtual("m", "Map", "set", &["k", "val"])),
            call_virtual("out", "m", "Map", "get", &["k"]),
            call_virtual("ks", "m", "Map", "keys", &[]),
            call_virtual("key", "ks", "Iterator", "next", &[]),
        ])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[main], PointerAnalysisConfig::default());

    assert!(analysis.may_alias((main, "out"), (main, "val")));
    assert!(!analysis.may_alias((main, "out"), (main, "k")));
    // Keys are not stored; a key iterator reads the merged values
    assert!(analysis.may_alias((main, "key"), (main, "val")));
    assert!(!analysis.may_alias((main, "key"), (main, "k")));
}

#[test]
fn test_array_element_store_and_load_merge() {
    let mut b = ProgramBuilder::new();
    b.class("A", None);
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![
            Stmt::assign(
                Value::Local(var("arr", "A")),
                Value::NewArray {
                    element: Type::class("A"),
                },
            ),
            alloc("x", "A"),
            Stmt::assign(
                Value::ArrayElement {
                    base: var("arr", "A"),
                },
                Value::Local(var("x", "A")),
            ),
            alloc("y", "A"),
            Stmt::Invoke(invoke_virtual("arr", "Array", "push", &["y"])),
            Stmt::assign(
                Value::Local(var("e", "A")),
                Value::ArrayElement {
                    base: var("arr", "A"),
                },
            ),
            call_virtual("p", "arr", "Array", "pop", &[]),
        ])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[main], PointerAnalysisConfig::default());

    let e = analysis.points_to_of_local(main, "e");
    let p = analysis.points_to_of_local(main, "p");
    assert_eq!(e.len(), 2);
    assert_eq!(e, p);
}

#[test]
fn test_for_each_callback_receives_elements() {
    let mut b = ProgramBuilder::new();
    b.class("A", None);
    let cb = b
        .method("Main", "cb")
        .static_method()
        .param("elem", Type::class("A"))
        .param("again", Type::class("A"))
        .finish();
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![
            alloc("s", "Set"),
            alloc("x", "A"),
            Stmt::Invoke(invoke_virtual("s", "Set", "add", &["x"])),
            Stmt::assign(
                Value::Local(var("f", "Function")),
                Value::FunctionRef(MethodSignature::new("Main", "cb")),
            ),
            Stmt::Invoke(invoke_virtual("s", "Set", "forEach", &["f"])),
        ])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[main], PointerAnalysisConfig::default());

    let x = analysis.points_to_of_local(main, "x");
    assert_eq!(analysis.points_to_of_local(cb, "elem"), x);
    // Sets pass the element twice
    assert_eq!(analysis.points_to_of_local(cb, "again"), x);

    let cg = analysis.call_graph();
    let cb_node = cg.node_of_method(cb).unwrap();
    assert_eq!(cg.callers(cb_node), vec![cg.node_of_method(main).unwrap()]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Dispatch
// ═══════════════════════════════════════════════════════════════════════════

/// `v = w; w = u; u = new T2; v = new T1; v.run()`
#[test]
fn test_virtual_call_gains_targets_as_receiver_grows() {
    let mut b = ProgramBuilder::new();
    b.class("T", None);
    b.class("T1", Some("T"));
    b.class("T2", Some("T"));
    let t1_run = b.method("T1", "run").finish();
    let t2_run = b.method("T2", "run").finish();
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![
            copy("v", "w"),
            copy("w", "u"),
            alloc("u", "T2"),
            alloc("v", "T1"),
            Stmt::Invoke(invoke_virtual("v", "T", "run", &[])),
        ])
        .finish();
    let program = b.build();

    let recorder = Recorder::default();
    let mut analysis =
        codegraph_pta::PointerAnalysis::new(&program, PointerAnalysisConfig::default()).unwrap();
    analysis.set_observer(Box::new(recorder.clone()));
    analysis.set_entries(&[main]).unwrap();
    analysis.start().unwrap();

    let cg = analysis.call_graph();
    let f1 = cg.node_of_method(t1_run).unwrap();
    let f2 = cg.node_of_method(t2_run).unwrap();
    let edge1 = cg.edges().iter().find(|e| e.callee == f1).unwrap();
    let edge2 = cg.edges().iter().find(|e| e.callee == f2).unwrap();
    assert_eq!(edge1.kind, DispatchKind::Dynamic);
    assert_eq!(edge2.kind, DispatchKind::Dynamic);
    assert!(edge1.discovered_at < edge2.discovered_at);

    // v learns about T2 strictly before the T2.run edge appears
    let pag = analysis.pag();
    let v = pag.nodes_of(&PagNodeKind::local(main, "v"))[0];
    let t2_obj = analysis.points_to_of_local(main, "u").as_slice()[0];
    let events = recorder.snapshot();
    let grow_at = events
        .iter()
        .position(|ev| {
            matches!(ev, Event::Grow { node, added } if *node == v && added.contains(&t2_obj))
        })
        .unwrap();
    let edge_at = events
        .iter()
        .position(|ev| matches!(ev, Event::CallEdge(e) if e.callee == f2))
        .unwrap();
    assert!(grow_at < edge_at);

    // Each callee's `this` holds exactly its own receiver
    let this1 = analysis.points_to_of_local(t1_run, "%this");
    let this2 = analysis.points_to_of_local(t2_run, "%this");
    assert_eq!(this1.len(), 1);
    assert_eq!(this2.as_slice(), &[t2_obj]);
}

#[test]
fn test_virtual_lookup_walks_superclasses() {
    let mut b = ProgramBuilder::new();
    b.class("Base", None);
    b.class("Derived", Some("Base"));
    let base_m = b
        .method("Base", "m")
        .body(vec![copy("self", "this")])
        .finish();
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![
            alloc("d", "Derived"),
            Stmt::Invoke(invoke_virtual("d", "Derived", "m", &[])),
        ])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[main], PointerAnalysisConfig::default());

    let cg = analysis.call_graph();
    assert_eq!(
        cg.callees(cg.node_of_method(main).unwrap()),
        vec![cg.node_of_method(base_m).unwrap()]
    );
    assert!(analysis.may_alias((base_m, "self"), (main, "d")));
}

#[test]
fn test_call_strings_separate_call_sites() {
    let mut b = ProgramBuilder::new();
    b.class("A", None);
    b.class("B", None);
    let id = b
        .method("Main", "id")
        .static_method()
        .param("p", Type::class("Object"))
        .returns(Type::class("Object"))
        .body(vec![Stmt::Return(Some(Value::Local(var("p", "Object"))))])
        .finish();
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![
            alloc("a", "A"),
            alloc("b", "B"),
            call_static("ra", "Main", "id", &["a"]),
            call_static("rb", "Main", "id", &["b"]),
        ])
        .finish();
    let program = b.build();

    let sensitive = analyze(&program, &[main], config_with_depth(1));
    assert_eq!(sensitive.points_to_of_local(main, "ra").len(), 1);
    assert!(!sensitive.may_alias((main, "ra"), (main, "rb")));
    assert_eq!(
        sensitive.pag().nodes_of(&PagNodeKind::local(id, "p")).len(),
        2
    );

    let insensitive = analyze(&program, &[main], config_with_depth(0));
    assert_eq!(insensitive.points_to_of_local(main, "ra").len(), 2);
    assert!(insensitive.may_alias((main, "ra"), (main, "rb")));
}

#[test]
fn test_pointer_call_and_function_methods() {
    let mut b = ProgramBuilder::new();
    b.class("A", None);
    let target = b
        .method("Main", "target")
        .static_method()
        .param("p", Type::class("A"))
        .returns(Type::class("A"))
        .body(vec![Stmt::Return(Some(Value::Local(var("p", "A"))))])
        .finish();
    let fn_sig = MethodSignature::new("Main", "target");
    let func = |name: &str| Local::new(name, Type::Function(fn_sig.clone()));
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![
            alloc("x", "A"),
            alloc("y", "A"),
            alloc("z", "A"),
            Stmt::assign(Value::Local(func("f")), Value::FunctionRef(fn_sig.clone())),
            // r1 = f(x)
            Stmt::assign(
                Value::Local(var("r1", "A")),
                Value::Invoke(InvokeExpr::new_pointer(
                    func("f"),
                    fn_sig.clone(),
                    vec![Value::Local(var("x", "A"))],
                )),
            ),
            // r2 = f.call(null, y)
            Stmt::assign(
                Value::Local(var("r2", "A")),
                Value::Invoke(InvokeExpr::new_virtual(
                    func("f"),
                    MethodSignature::new("Function", "call"),
                    vec![
                        Value::Constant(Constant::Null),
                        Value::Local(var("y", "A")),
                    ],
                )),
            ),
            // g = f.bind(null); r3 = g(z)
            Stmt::assign(
                Value::Local(func("g")),
                Value::Invoke(InvokeExpr::new_virtual(
                    func("f"),
                    MethodSignature::new("Function", "bind"),
                    vec![Value::Constant(Constant::Null)],
                )),
            ),
            Stmt::assign(
                Value::Local(var("r3", "A")),
                Value::Invoke(InvokeExpr::new_pointer(
                    func("g"),
                    fn_sig.clone(),
                    vec![Value::Local(var("z", "A"))],
                )),
            ),
        ])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[main], config_with_depth(1));

    assert!(analysis.may_alias((main, "r1"), (main, "x")));
    assert!(analysis.may_alias((main, "r2"), (main, "y")));
    assert!(analysis.may_alias((main, "r3"), (main, "z")));
    assert!(!analysis.may_alias((main, "r1"), (main, "y")));
    // The bound function is a distinct object
    assert!(!analysis.may_alias((main, "g"), (main, "f")));
    let bound = analysis.points_to_of_local(main, "g");
    assert_eq!(bound.len(), 1);
    assert_eq!(
        analysis.pag().object_site(bound.as_slice()[0]).map(|s| s.kind),
        Some(AllocSiteKind::BoundFunction)
    );

    let cg = analysis.call_graph();
    let kinds: Vec<DispatchKind> = cg
        .edges_to(cg.node_of_method(target).unwrap())
        .map(|e| e.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            DispatchKind::PointerIndirect,
            DispatchKind::Dynamic,
            DispatchKind::PointerIndirect
        ]
    );
}

#[test]
fn test_bind_fixes_receiver_and_leading_arguments() {
    let mut b = ProgramBuilder::new();
    b.class("C", None);
    let get = b
        .method("C", "get")
        .returns(Type::class("C"))
        .body(vec![Stmt::Return(Some(Value::This))])
        .finish();
    b.method("C", "pick")
        .static_method()
        .param("p", Type::class("C"))
        .returns(Type::class("C"))
        .body(vec![Stmt::Return(Some(Value::Local(var("p", "C"))))])
        .finish();
    let get_sig = MethodSignature::new("C", "get");
    let pick_sig = MethodSignature::new("C", "pick");
    let bind_sig = MethodSignature::new("Function", "bind");
    let get_fn = |name: &str| Local::new(name, Type::Function(get_sig.clone()));
    let pick_fn = |name: &str| Local::new(name, Type::Function(pick_sig.clone()));
    let bind = |result: Local, func: Local, args: Vec<Value>| {
        Stmt::assign(
            Value::Local(result),
            Value::Invoke(InvokeExpr::new_virtual(func, bind_sig.clone(), args)),
        )
    };
    let call = |result: &str, func: Local, sig: &MethodSignature| {
        Stmt::assign(
            Value::Local(var(result, "C")),
            Value::Invoke(InvokeExpr::new_pointer(func, sig.clone(), vec![])),
        )
    };

    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![
            alloc("c", "C"),
            alloc("other", "C"),
            alloc("a", "C"),
            Stmt::assign(Value::Local(get_fn("f")), Value::FunctionRef(get_sig.clone())),
            // g = f.bind(c); r = g()
            bind(get_fn("g"), get_fn("f"), vec![Value::Local(var("c", "C"))]),
            call("r", get_fn("g"), &get_sig),
            // k = g.bind(other); rk = k()  (a bound this cannot be replaced)
            bind(get_fn("k"), get_fn("g"), vec![Value::Local(var("other", "C"))]),
            call("rk", get_fn("k"), &get_sig),
            // h = pick.bind(null, a); rh = h()
            Stmt::assign(Value::Local(pick_fn("p")), Value::FunctionRef(pick_sig.clone())),
            bind(
                pick_fn("h"),
                pick_fn("p"),
                vec![Value::Constant(Constant::Null), Value::Local(var("a", "C"))],
            ),
            call("rh", pick_fn("h"), &pick_sig),
        ])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[main], config_with_depth(1));

    assert!(analysis.may_alias((main, "r"), (main, "c")));
    assert!(!analysis.may_alias((main, "r"), (main, "other")));
    assert!(analysis.may_alias((main, "rk"), (main, "c")));
    assert!(!analysis.may_alias((main, "rk"), (main, "other")));
    assert!(analysis.may_alias((main, "rh"), (main, "a")));

    let this_nodes = analysis
        .pag()
        .nodes_of(&PagNodeKind::this_of(get))
        .to_vec();
    assert!(!this_nodes.is_empty());
    for node in this_nodes {
        let pts = analysis.points_to(node);
        assert!(pts.is_subset(&analysis.points_to_of_local(main, "c")));
    }
}

#[test]
fn test_function_apply_spreads_array_elements() {
    let mut b = ProgramBuilder::new();
    b.class("A", None);
    let target = b
        .method("Main", "target")
        .static_method()
        .param("p", Type::class("A"))
        .param("q", Type::class("A"))
        .finish();
    let fn_sig = MethodSignature::new("Main", "target");
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![
            alloc("x", "A"),
            alloc("args", "Array"),
            Stmt::Invoke(invoke_virtual("args", "Array", "push", &["x"])),
            Stmt::assign(
                Value::Local(Local::new("f", Type::Function(fn_sig.clone()))),
                Value::FunctionRef(fn_sig.clone()),
            ),
            Stmt::Invoke(InvokeExpr::new_virtual(
                Local::new("f", Type::Function(fn_sig.clone())),
                MethodSignature::new("Function", "apply"),
                vec![
                    Value::Constant(Constant::Undefined),
                    Value::Local(var("args", "Array")),
                ],
            )),
        ])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[main], PointerAnalysisConfig::default());

    let x = analysis.points_to_of_local(main, "x");
    assert_eq!(analysis.points_to_of_local(target, "p"), x);
    assert_eq!(analysis.points_to_of_local(target, "q"), x);
}

// ═══════════════════════════════════════════════════════════════════════════
// Seeding, SDK and globals
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_instance_entry_gets_synthetic_receiver_and_parameters() {
    let mut b = ProgramBuilder::new();
    b.class("Service", None);
    b.class("Request", None);
    let handle = b
        .method("Service", "handle")
        .param("req", Type::class("Request"))
        .param("count", Type::Number)
        .body(vec![copy("me", "this")])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[handle], PointerAnalysisConfig::default());

    let pag = analysis.pag();
    let me = analysis.points_to_of_local(handle, "me");
    assert_eq!(me.len(), 1);
    let site = pag.object_site(me.as_slice()[0]).unwrap();
    assert_eq!(site.kind, AllocSiteKind::EntryReceiver);
    assert_eq!(site.ty, Type::class("Service"));

    let req = analysis.points_to_of_local(handle, "req");
    assert_eq!(
        pag.object_site(req.as_slice()[0]).unwrap().kind,
        AllocSiteKind::EntryParameter(0)
    );
    assert!(analysis.points_to_of_local(handle, "count").is_empty());
}

#[test]
fn test_sdk_method_returns_object_of_declared_type() {
    let mut b = ProgramBuilder::new();
    let make = b
        .method("Lib", "make")
        .static_method()
        .returns(Type::class("Widget"))
        .without_body()
        .finish();
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![call_static("w", "Lib", "make", &[])])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[main], PointerAnalysisConfig::default());

    let w = analysis.points_to_of_local(main, "w");
    assert_eq!(w.len(), 1);
    let site = analysis.pag().object_site(w.as_slice()[0]).unwrap();
    assert_eq!(site.kind, AllocSiteKind::SdkReturn);
    assert_eq!(site.ty, Type::class("Widget"));

    let cg = analysis.call_graph();
    let node = cg.node(cg.node_of_method(make).unwrap()).unwrap();
    assert_eq!(node.kind, CallGraphNodeKind::Sdk);
}

#[test]
fn test_call_results_stored_into_fields_are_tracked() {
    let mut b = ProgramBuilder::new();
    b.class("Box", None);
    b.class("A", None);
    let make = b
        .method("Main", "make")
        .static_method()
        .returns(Type::class("A"))
        .body(vec![
            alloc("a", "A"),
            Stmt::Return(Some(Value::Local(var("a", "A")))),
        ])
        .finish();
    let make_call = || {
        Value::Invoke(InvokeExpr::new_static(
            MethodSignature::new("Main", "make"),
            vec![],
        ))
    };
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![
            alloc("o", "Box"),
            Stmt::assign(Value::field(var("o", "Box"), "f"), make_call()),
            Stmt::assign(
                Value::Local(var("x", "A")),
                Value::field(var("o", "Box"), "f"),
            ),
            Stmt::assign(Value::static_field("Main", "cached"), make_call()),
            Stmt::assign(
                Value::Local(var("y", "A")),
                Value::static_field("Main", "cached"),
            ),
        ])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[main], config_with_depth(1));

    let cg = analysis.call_graph();
    let make_node = cg.node_of_method(make).expect("make is reachable");
    assert_eq!(cg.edges_to(make_node).count(), 2);
    assert!(analysis.may_alias((main, "x"), (make, "a")));
    assert!(analysis.may_alias((main, "y"), (make, "a")));
}

#[test]
fn test_closure_reads_captured_and_module_variables() {
    let mut b = ProgramBuilder::new();
    b.class("A", None);
    b.class("Config", None);
    let module = b
        .method("Module", "%dflt")
        .static_method()
        .body(vec![alloc("cfg", "Config")])
        .finish();
    let lambda_sig = MethodSignature::new("Main", "lambda");
    let lambda = b
        .method("Main", "lambda")
        .static_method()
        .returns(Type::class("A"))
        .body(vec![
            Stmt::assign(
                Value::Local(var("x", "A")),
                Value::captured(MethodSignature::new("Main", "main"), "o"),
            ),
            Stmt::assign(
                Value::Local(var("c", "Config")),
                Value::captured(MethodSignature::new("Module", "%dflt"), "cfg"),
            ),
            Stmt::Return(Some(Value::Local(var("x", "A")))),
        ])
        .finish();
    let func = Local::new("f", Type::Function(lambda_sig.clone()));
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![
            alloc("o", "A"),
            Stmt::assign(Value::Local(func.clone()), Value::FunctionRef(lambda_sig.clone())),
            Stmt::assign(
                Value::Local(var("r", "A")),
                Value::Invoke(InvokeExpr::new_pointer(func, lambda_sig, vec![])),
            ),
        ])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[main], config_with_depth(1));

    assert!(analysis.may_alias((main, "r"), (main, "o")));
    assert!(analysis.may_alias((lambda, "x"), (main, "o")));
    assert!(analysis.may_alias((lambda, "c"), (module, "cfg")));
    assert_eq!(analysis.points_to_of_local(lambda, "c").len(), 1);
    // Module code is analysed once for the capture, without a call edge
    let cg = analysis.call_graph();
    let module_node = cg.node_of_method(module).unwrap();
    assert_eq!(cg.edges_to(module_node).count(), 0);
}

#[test]
fn test_static_fields_and_global_this_are_shared() {
    let mut b = ProgramBuilder::new();
    b.class("A", None);
    let writer = b
        .method("Main", "writer")
        .static_method()
        .body(vec![
            alloc("a", "A"),
            Stmt::assign(
                Value::static_field("Config", "instance"),
                Value::Local(var("a", "A")),
            ),
            Stmt::assign(Value::Local(var("g1", "Object")), Value::GlobalThis),
        ])
        .finish();
    let reader = b
        .method("Main", "reader")
        .static_method()
        .body(vec![
            Stmt::assign(
                Value::Local(var("b", "A")),
                Value::static_field("Config", "instance"),
            ),
            Stmt::assign(Value::Local(var("g2", "Object")), Value::GlobalThis),
        ])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[writer, reader], PointerAnalysisConfig::default());

    assert!(analysis.may_alias((writer, "a"), (reader, "b")));
    assert_eq!(
        analysis.points_to_of_local(reader, "g2").as_slice(),
        &[analysis.pag().global_this_object()]
    );
    assert!(analysis.may_alias((writer, "g1"), (reader, "g2")));
}

// ═══════════════════════════════════════════════════════════════════════════
// Failure policy
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_unknown_receiver_reported_once_per_site() {
    let mut b = ProgramBuilder::new();
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![
            call_static("r", "Lib", "missing", &[]),
            Stmt::Invoke(invoke_virtual("r", "Object", "foo", &[])),
            Stmt::Invoke(invoke_virtual("r", "Object", "foo", &[])),
        ])
        .finish();
    let program = b.build();
    let analysis = analyze(&program, &[main], PointerAnalysisConfig::default());

    let kinds: Vec<&str> = analysis.diagnostics().iter().map(|d| d.kind()).collect();
    assert_eq!(
        kinds,
        vec!["unresolved_reference", "unknown_receiver", "unknown_receiver"]
    );
    assert_eq!(analysis.call_graph().edge_count(), 0);
    assert!(analysis.stats().reached_fixpoint);
}

#[test]
fn test_recursion_cap_freezes_component() {
    let mut b = ProgramBuilder::new();
    b.class("A", None);
    let rec = b
        .method("Main", "rec")
        .static_method()
        .param("p", Type::class("A"))
        .returns(Type::class("A"))
        .body(vec![
            alloc("x", "A"),
            call_static("r", "Main", "rec", &["x"]),
            copy("q", "p"),
            Stmt::Return(Some(Value::Local(var("r", "A")))),
        ])
        .finish();
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![alloc("a", "A"), call_static("out", "Main", "rec", &["a"])])
        .finish();
    let program = b.build();

    let config = PointerAnalysisConfig::default()
        .with_scc_iteration_cap(1)
        .unwrap();
    let recorder = Recorder::default();
    let mut analysis = codegraph_pta::PointerAnalysis::new(&program, config).unwrap();
    analysis.set_observer(Box::new(recorder.clone()));
    analysis.set_entries(&[main]).unwrap();
    let stats = analysis.start().unwrap().clone();

    assert!(stats.reached_fixpoint);
    assert_eq!(stats.frozen_components, 1);
    assert!(analysis.is_frozen(rec));
    assert!(!analysis.is_frozen(main));

    let capped: Vec<_> = analysis
        .diagnostics()
        .iter()
        .filter(|d| d.kind() == "recursion_cap_exceeded")
        .collect();
    assert_eq!(capped.len(), 1);
    assert!(recorder
        .snapshot()
        .iter()
        .any(|ev| matches!(ev, Event::Frozen(methods) if methods == &vec![rec])));
}

#[test]
fn test_budget_exhaustion_stops_early() {
    let mut b = ProgramBuilder::new();
    b.class("A", None);
    let main = b
        .method("Main", "main")
        .static_method()
        // Edges exist before `a` gets its object, so every step needs a pop
        .body(vec![copy("c", "b"), copy("b", "a"), alloc("a", "A")])
        .finish();
    let program = b.build();

    let config = PointerAnalysisConfig::default()
        .with_max_worklist_pops(Some(1))
        .unwrap();
    let analysis = analyze(&program, &[main], config);

    assert!(!analysis.stats().reached_fixpoint);
    assert_eq!(analysis.stats().worklist_pops, 1);
    assert!(analysis
        .diagnostics()
        .iter()
        .any(|d| d.kind() == "budget_exhausted" && d.is_incomplete_run()));
    assert!(analysis.points_to_of_local(main, "c").is_empty());
}

#[test]
fn test_cancel_before_start() {
    let mut b = ProgramBuilder::new();
    b.class("A", None);
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![alloc("a", "A"), copy("b", "a")])
        .finish();
    let program = b.build();

    let mut analysis =
        codegraph_pta::PointerAnalysis::new(&program, PointerAnalysisConfig::default()).unwrap();
    analysis.set_entries(&[main]).unwrap();
    analysis.cancel_handle().cancel();
    let stats = analysis.start().unwrap();

    assert!(!stats.reached_fixpoint);
    assert_eq!(stats.worklist_pops, 0);
    assert_eq!(analysis.diagnostics()[0].kind(), "cancelled");
}

#[test]
fn test_dumps_written_to_output_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let mut b = ProgramBuilder::new();
    b.class("A", None);
    let main = b
        .method("Main", "main")
        .static_method()
        .body(vec![alloc("a", "A")])
        .finish();
    let program = b.build();

    let config = PointerAnalysisConfig::new(1, tmp.path(), true, true)
        .unwrap()
        .with_dump_stats(true);
    let analysis = analyze(&program, &[main], config);

    assert!(analysis.diagnostics().is_empty());
    let pag_dot = std::fs::read_to_string(tmp.path().join("pag.dot")).unwrap();
    assert!(pag_dot.contains("Main.main:a"));
    let cg_dot = std::fs::read_to_string(tmp.path().join("call_graph.dot")).unwrap();
    assert!(cg_dot.contains("Main.main"));
    let stats: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(tmp.path().join("stats.json")).unwrap())
            .unwrap();
    assert_eq!(stats["reached_fixpoint"], serde_json::Value::Bool(true));
}
