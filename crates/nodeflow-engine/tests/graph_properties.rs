use nodeflow_core::error::EngineError;
use nodeflow_core::types::ValueMap;
use nodeflow_engine::{Builder, Driver, FnNode, Module};
use nodeflow_test_utils::{
    assert_topological, chain_module, counting_node, cycle_module, dag_module, dag_node_name,
    diamond_module, value_map, InvocationCounter,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn driver(module: Module) -> Driver {
    Builder::new().with_module(module).build().unwrap()
}

#[test]
fn shared_dependency_runs_once() {
    let counter = InvocationCounter::new();
    let driver = driver(diamond_module(&counter));

    let run = driver
        .execute(&["top", "left", "right"], ValueMap::new())
        .unwrap();

    assert_eq!(counter.count("base"), 1);
    assert_eq!(counter.total(), 4);
    assert_eq!(run.execution_log.len(), 4);
    assert_eq!(run.execution_log[0], "base");
    assert_eq!(run.execution_log[3], "top");
}

#[test]
fn execution_log_is_topological() {
    let counter = InvocationCounter::new();
    let driver = driver(diamond_module(&counter));
    let run = driver.execute_with_defaults(&["top"]).unwrap();
    assert_topological(&run.execution_log, &driver.nodes());
}

#[test]
fn input_value_wins_over_node() {
    let counter = InvocationCounter::new();
    let driver = driver(chain_module(&counter));

    let run = driver
        .execute(&["c"], value_map(json!({"b": "supplied"})))
        .unwrap();

    assert_eq!(counter.count("a"), 0);
    assert_eq!(counter.count("b"), 0);
    assert_eq!(run.execution_log, vec!["c"]);
    assert_eq!(run.value["c"]["inputs"]["b"], json!("supplied"));
}

#[test]
fn missing_dependency_names_requester() {
    let counter = InvocationCounter::new();
    let module = Module::new("m")
        .with(counting_node("report", &["summary"], &counter))
        .with(counting_node("summary", &["ledger"], &counter));
    let driver = driver(module);

    let err = driver.execute_with_defaults(&["report"]).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("summary"), "{msg}");
    assert!(msg.contains("ledger"), "{msg}");
    assert!(err.is_graph_error());
    assert_eq!(counter.total(), 0);
}

#[test]
fn adapters_compose_in_registration_order() {
    let counter = InvocationCounter::new();
    let driver = Builder::new()
        .with_module(chain_module(&counter))
        .with_adapter(|v: Value| json!({ "first": v }))
        .with_adapter(|v: Value| json!([v]))
        .build()
        .unwrap();

    let run = driver.execute_with_defaults(&["a"]).unwrap();
    assert_eq!(
        run.value,
        json!([{ "first": { "a": { "node": "a", "inputs": {} } } }])
    );
}

#[test]
fn no_adapter_returns_raw_mapping() {
    let counter = InvocationCounter::new();
    let driver = driver(chain_module(&counter));
    let run = driver.execute_with_defaults(&["b", "a"]).unwrap();

    let object = run.value.as_object().unwrap();
    let keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["b", "a"]);
    assert_eq!(object["a"], json!({"node": "a", "inputs": {}}));
}

#[test]
fn build_without_modules_is_configuration_error() {
    let result = Builder::new().with_adapter_names(["keys"]).build();
    assert!(matches!(result, Err(EngineError::Configuration(_))));
}

#[test]
fn cycle_is_reported_not_overflowed() {
    let driver = driver(cycle_module());
    let err = driver.execute_with_defaults(&["a"]).unwrap_err();
    match err {
        EngineError::CycleDetected { cycle } => {
            assert_eq!(cycle, vec!["a", "b", "c", "a"]);
        }
        other => panic!("expected cycle, got {other}"),
    }
}

fn long_chain(len: usize, closing: Option<&str>) -> Module {
    let mut module = Module::new("long");
    module.add(FnNode::new("n0", closing.into_iter().map(String::from).collect::<Vec<_>>(), |_| {
        Ok(json!(0))
    }));
    for i in 1..len {
        let previous = format!("n{}", i - 1);
        module.add(FnNode::new(format!("n{}", i), [previous.clone()], move |args| {
            Ok(json!(args.u64(&previous)? + 1))
        }));
    }
    module
}

#[test]
fn ten_thousand_node_chain_on_a_small_stack() {
    let run = std::thread::Builder::new()
        .stack_size(256 * 1024)
        .spawn(|| {
            let driver = driver(long_chain(10_000, None));
            driver.execute_with_defaults(&["n9999"]).unwrap()
        })
        .unwrap()
        .join()
        .unwrap();

    assert_eq!(run.value["n9999"], json!(9999));
    assert_eq!(run.execution_log.len(), 10_000);
    assert_eq!(run.execution_log.last().map(String::as_str), Some("n9999"));
}

#[test]
fn long_cycle_is_reported_in_full() {
    let driver = driver(long_chain(10_000, Some("n9999")));
    let err = driver.execute_with_defaults(&["n9999"]).unwrap_err();
    match err {
        EngineError::CycleDetected { cycle } => {
            assert_eq!(cycle.len(), 10_001);
            assert_eq!(cycle.first(), cycle.last());
            assert_eq!(cycle[1], "n9998");
        }
        other => panic!("expected cycle, got {other}"),
    }
}

#[test]
fn failed_run_leaves_driver_usable() {
    let counter = InvocationCounter::new();
    let module = Module::new("m")
        .with(counting_node("a", &[], &counter))
        .with(counting_node("b", &["absent"], &counter));
    let driver = driver(module);

    assert!(driver.execute_with_defaults(&["a", "b"]).is_err());
    let run = driver.execute_with_defaults(&["a"]).unwrap();
    assert_eq!(run.execution_log, vec!["a"]);
    assert_eq!(counter.count("a"), 2);
}

fn dag_edges() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..12).prop_flat_map(|n| prop::collection::vec(prop::collection::vec(0..n, 0..4), n))
}

proptest! {
    #[test]
    fn every_node_runs_at_most_once(edges in dag_edges(), picks in prop::collection::vec(any::<prop::sample::Index>(), 1..6)) {
        let counter = InvocationCounter::new();
        let driver = driver(dag_module(&edges, &counter));
        let targets: Vec<String> = picks.iter().map(|p| dag_node_name(p.index(edges.len()))).collect();

        let run = driver.execute(&targets, ValueMap::new()).unwrap();

        prop_assert!(counter.max() <= 1);
        prop_assert_eq!(counter.total(), run.execution_log.len());
        assert_topological(&run.execution_log, &driver.nodes());
    }

    #[test]
    fn inputs_are_never_computed(edges in dag_edges(), supplied in any::<prop::sample::Index>()) {
        let counter = InvocationCounter::new();
        let driver = driver(dag_module(&edges, &counter));
        let last = dag_node_name(edges.len() - 1);
        let input = dag_node_name(supplied.index(edges.len()));

        let mut inputs = ValueMap::new();
        inputs.insert(input.clone(), json!("given"));
        let run = driver.execute(&[last], inputs).unwrap();

        prop_assert_eq!(counter.count(&input), 0);
        prop_assert!(!run.execution_log.contains(&input));
        assert_topological(&run.execution_log, &driver.nodes());
    }
}
