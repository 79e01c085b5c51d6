use labella::{Algorithm, Error, Force, ForceOptions, Metric, Node, NodeId};
use serde_json::json;

fn nodes() -> Vec<Node> {
    let ideals = [
        1.0, 2.0, 3.0, 3.0, 3.0, 304.0, 454.0, 454.0, 454.0, 804.0, 804.0, 804.0, 804.0, 854.0,
        854.0,
    ];
    ideals
        .iter()
        .enumerate()
        .map(|(i, &p)| Node::new(p, if i == 10 { 70.0 } else { 50.0 }))
        .collect()
}

fn computed(options: serde_json::Value) -> Force {
    let mut force = Force::new(ForceOptions::from_value(options).unwrap()).unwrap();
    force.set_nodes(nodes());
    force.compute().unwrap();
    force
}

fn placement(force: &Force) -> Vec<(f64, usize)> {
    force
        .nodes()
        .iter()
        .map(|n| (n.current_pos, n.layer_index))
        .collect()
}

fn assert_no_overlap(force: &Force) {
    let arena = force.arena();
    for layer in force.layers().unwrap() {
        let mut sorted = layer.clone();
        sorted.sort_by(|&a, &b| arena[a].current_pos.total_cmp(&arena[b].current_pos));
        for pair in sorted.windows(2) {
            assert!(
                arena[pair[0]].current_right() <= arena[pair[1]].current_left(),
                "{:?} overlaps {:?}",
                arena[pair[0]],
                arena[pair[1]]
            );
        }
    }
}

#[test]
fn defaults_place_every_node_on_one_layer() {
    let force = computed(json!({}));
    let current: Vec<f64> = force.nodes().iter().map(|n| n.current_pos).collect();
    assert_eq!(
        current,
        vec![
            25.0, 78.0, 131.0, 184.0, 237.0, 304.0, 401.0, 454.0, 507.0, 673.0, 736.0, 799.0,
            852.0, 905.0, 958.0
        ]
    );
    assert_eq!(force.layers().unwrap().len(), 1);
    assert_eq!(force.unsatisfiable_constraints(), 0);
    assert_no_overlap(&force);
}

#[test]
fn unbounded_layout_is_monotonic_with_spacing() {
    let mut force: Force = Force::new(ForceOptions::from_value(json!({ "minPos": null })).unwrap())
        .unwrap();
    force.set_nodes(nodes().into_iter().map(|n| Node::new(n.ideal_pos(), 50.0)).collect());
    force.compute().unwrap();

    let current: Vec<f64> = force.nodes().iter().map(|n| n.current_pos).collect();
    assert_eq!(
        current,
        vec![
            -104.0, -51.0, 2.0, 55.0, 108.0, 304.0, 401.0, 454.0, 507.0, 688.0, 741.0, 794.0,
            847.0, 900.0, 953.0
        ]
    );
    for pair in force.nodes().windows(2) {
        assert!(pair[1].current_left() - pair[0].current_right() >= 3.0);
    }
}

#[test]
fn max_pos_pushes_nodes_to_a_second_layer() {
    let force = computed(json!({ "maxPos": 904 }));
    assert_eq!(
        placement(&force),
        vec![
            (25.0, 0),
            (78.0, 0),
            (131.0, 0),
            (184.0, 0),
            (237.0, 0),
            (304.0, 0),
            (401.0, 0),
            (454.0, 0),
            (507.0, 0),
            (663.0, 0),
            (798.0, 1),
            (716.0, 0),
            (769.0, 0),
            (826.0, 0),
            (879.0, 0),
        ]
    );
    for node in force.nodes() {
        assert!(node.current_right() <= 904.0);
    }
    assert_no_overlap(&force);
}

#[test]
fn min_pos_shifts_the_leftmost_nodes() {
    let force = computed(json!({ "minPos": 30 }));
    let current: Vec<f64> = force.nodes().iter().map(|n| n.current_pos).collect();
    assert_eq!(
        current,
        vec![
            55.0, 108.0, 161.0, 214.0, 267.0, 320.0, 401.0, 454.0, 507.0, 673.0, 736.0, 799.0,
            852.0, 905.0, 958.0
        ]
    );
    for node in force.nodes() {
        assert!(node.current_left() >= 30.0);
        assert_eq!(node.layer_index, 0);
    }
}

#[test]
fn narrow_bounds_spread_nodes_over_three_layers() {
    let force = computed(json!({ "minPos": 0, "maxPos": 500 }));
    assert_eq!(
        placement(&force),
        vec![
            (25.0, 1),
            (78.0, 1),
            (131.0, 1),
            (32.0, 0),
            (85.0, 0),
            (246.0, 0),
            (285.0, 1),
            (338.0, 1),
            (299.0, 0),
            (395.0, 1),
            (366.0, 2),
            (448.0, 1),
            (359.0, 0),
            (422.0, 0),
            (475.0, 0),
        ]
    );
    assert_eq!(force.layers().unwrap().len(), 3);
    assert_no_overlap(&force);
}

#[test]
fn stubs_sit_on_every_layer_below_their_label() {
    let force = computed(json!({ "minPos": 0, "maxPos": 500 }));
    let arena = force.arena();
    for (id, node) in force.nodes().iter().enumerate() {
        let chain = arena.path_to_root(NodeId(id));
        assert_eq!(chain.len(), node.layer_index + 1);
        for (depth, &link) in chain.iter().enumerate() {
            assert_eq!(arena[link].layer_index, node.layer_index - depth);
        }
    }
}

#[test]
fn compute_is_idempotent() {
    let mut force = computed(json!({ "minPos": 0, "maxPos": 500 }));
    let first = placement(&force);
    let stubs = force.arena().len();
    force.compute().unwrap();
    assert_eq!(placement(&force), first);
    assert_eq!(force.arena().len(), stubs);
}

#[test]
fn layers_keep_ideal_order() {
    let force = computed(json!({ "minPos": 0, "maxPos": 500 }));
    let arena = force.arena();
    for layer in force.layers().unwrap() {
        for pair in layer.windows(2) {
            let (a, b) = (&arena[pair[0]], &arena[pair[1]]);
            assert!(a.ideal_pos() <= b.ideal_pos());
            assert!(a.current_pos < b.current_pos);
        }
    }
}

#[test]
fn simple_algorithm_adds_one_stub_per_crossed_layer() {
    let force = computed(json!({ "algorithm": "simple", "maxPos": 500 }));
    let layers = force.layers().unwrap();
    let expected_stubs: usize = force.nodes().iter().map(|n| n.layer_index).sum();
    assert_eq!(force.arena().len(), force.nodes().len() + expected_stubs);
    assert_eq!(
        layers.iter().map(Vec::len).sum::<usize>(),
        force.arena().len()
    );
}

#[test]
fn set_nodes_forgets_the_previous_layout() {
    let mut force = computed(json!({ "maxPos": 500 }));
    assert!(force.layers().is_some());
    let ids = force.set_nodes(vec![Node::new(10.0, 10.0)]);
    assert_eq!(ids, vec![NodeId(0)]);
    assert!(force.layers().is_none());
    assert_eq!(force.arena().len(), 1);
    assert_eq!(force.metric(Metric::Displacement), 0.0);

    force.compute().unwrap();
    assert_eq!(force.node(NodeId(0)).unwrap().current_pos, 10.0);
}

#[test]
fn set_options_merges_partial_objects() {
    let mut force: Force = Force::default();
    force.set_options(&json!({ "maxPos": 200 })).unwrap();
    assert_eq!(force.options().max_pos, Some(200.0));
    force
        .set_options(&json!({ "maxPos": 400, "stubWidth": 30 }))
        .unwrap();
    assert_eq!(force.options().max_pos, Some(400.0));
    assert_eq!(force.options().stub_width, 30.0);
    assert_eq!(force.options().algorithm, Algorithm::Overlap);

    let err = force
        .set_options(&json!({ "algorithm": "roundRobin" }))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
    assert_eq!(force.options().max_pos, Some(400.0));
}

#[test]
fn invalid_nodes_are_rejected() {
    let mut force: Force = Force::default();
    force.set_nodes(vec![Node::new(0.0, 10.0), Node::new(f64::NAN, 10.0)]);
    let err = force.compute().unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInput {
            node: 1,
            field: "ideal_pos",
            ..
        }
    ));

    force.set_nodes(vec![Node::new(0.0, -1.0)]);
    assert!(matches!(
        force.compute().unwrap_err(),
        Error::InvalidInput { field: "width", .. }
    ));
}

#[test]
fn empty_and_single_node_inputs() {
    let mut force: Force = Force::default();
    force.compute().unwrap();
    assert!(force.layers().unwrap().is_empty());

    force.set_nodes(vec![Node::new(100.0, 20.0)]);
    force.compute().unwrap();
    assert_eq!(force.nodes()[0].current_pos, 100.0);
    assert_eq!(force.layers().unwrap(), &[vec![NodeId(0)]]);
}

#[test]
fn metrics_report_every_metric() {
    let force = computed(json!({ "minPos": 0, "maxPos": 500 }));
    let metrics = force.metrics();
    assert_eq!(metrics.len(), Metric::ALL.len());
    for (metric, value) in metrics {
        assert!(value.is_finite(), "{metric}");
        assert!(value >= 0.0, "{metric}");
    }
    assert_eq!(force.metric(Metric::OverlapCount), 0.0);
    assert!(force.metric(Metric::WeightedAllocation) > 0.0);
}
