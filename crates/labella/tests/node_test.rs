use labella::{Node, NodeArena, NodeId};

fn placed(ideal: f64, width: f64, current: f64) -> Node {
    let mut node = Node::new(ideal, width);
    node.current_pos = current;
    node
}

#[test]
fn distance_is_the_gap_between_extents() {
    let n = Node::new(10.0, 10.0);
    assert_eq!(n.distance_from(&Node::new(30.0, 10.0)), 10.0);
    assert_eq!(n.distance_from(&Node::new(20.0, 10.0)), 0.0);
    assert_eq!(n.distance_from(&Node::new(10.0, 10.0)), -10.0);
}

#[test]
fn displacement_tracks_the_current_position() {
    let mut n = Node::new(10.0, 10.0);
    assert_eq!(n.displacement(), 0.0);
    n.current_pos = 20.0;
    assert_eq!(n.displacement(), -10.0);
    n.current_pos = 0.0;
    assert_eq!(n.displacement(), 10.0);
    n.move_to_ideal_position();
    assert_eq!(n.current_pos, n.ideal_pos());
}

#[test]
fn overlaps_node_honors_the_buffer() {
    let n1 = Node::new(10.0, 10.0);
    let n2 = Node::new(19.0, 10.0);
    let n3 = Node::new(20.0, 10.0);
    let n4 = Node::new(21.0, 10.0);
    let n5 = Node::new(22.0, 10.0);

    assert!(n1.overlaps_node(&n2, 0.0));
    assert!(!n1.overlaps_node(&n3, 0.0));
    assert!(!n1.overlaps_node(&n4, 0.0));

    assert!(n1.overlaps_node(&n2, 2.0));
    assert!(n1.overlaps_node(&n3, 2.0));
    assert!(n1.overlaps_node(&n4, 2.0));
    assert!(!n1.overlaps_node(&n5, 2.0));
}

#[test]
fn overlaps_point_includes_both_edges() {
    let n = Node::new(10.0, 10.0);
    assert!(!n.overlaps_point(4.0));
    assert!(n.overlaps_point(5.0));
    assert!(n.overlaps_point(10.0));
    assert!(n.overlaps_point(15.0));
    assert!(!n.overlaps_point(16.0));
}

#[test]
fn position_before_and_after_another_node() {
    let n1 = Node::new(10.0, 10.0);
    let n2 = Node::new(19.0, 10.0);
    assert_eq!(n1.position_before(&n2, 0.0), 9.0);
    assert_eq!(n1.position_before(&n2, 2.0), 7.0);
    assert_eq!(n1.position_after(&n2, 0.0), 29.0);
    assert_eq!(n1.position_after(&n2, 2.0), 31.0);
}

#[test]
fn extents_follow_current_and_ideal_positions() {
    let n = placed(10.0, 10.0, 20.0);
    assert_eq!(n.current_left(), 15.0);
    assert_eq!(n.current_right(), 25.0);
    assert_eq!(n.ideal_left(), 5.0);
    assert_eq!(n.ideal_right(), 15.0);
}

#[test]
fn create_stub_copies_position_and_data() {
    let mut arena = NodeArena::new();
    let mut node = Node::with_data(10.0, 10.0, "a");
    node.current_pos = 12.0;
    let n1 = arena.add(node);
    let stub = arena.create_stub(n1, 5.0);

    assert_eq!(arena[stub].width, 5.0);
    assert_eq!(arena[stub].ideal_pos(), 10.0);
    assert_eq!(arena[stub].current_pos, 12.0);
    assert_eq!(arena[stub].data, "a");
    assert!(arena.is_stub(stub));
    assert!(!arena.is_stub(n1));
    assert_eq!(arena[n1].parent(), Some(stub));
    assert_eq!(arena[stub].child(), Some(n1));
}

#[test]
fn remove_stub_unlinks_both_ends() {
    let mut arena = NodeArena::new();
    let n1 = arena.add(Node::new(10.0, 10.0));
    let stub = arena.create_stub(n1, 5.0);
    arena.remove_stub(n1);
    assert_eq!(arena[n1].parent(), None);
    assert_eq!(arena[stub].child(), None);
    assert!(arena[n1].is_root());
}

#[test]
fn paths_walk_the_stub_chain() {
    let mut arena = NodeArena::new();
    let n1 = arena.add(Node::new(10.0, 10.0));
    assert_eq!(arena.path_to_root(n1), vec![n1]);
    assert_eq!(arena.root(n1), n1);

    let n2 = arena.create_stub(n1, 5.0);
    assert_eq!(arena.root(n1), n2);
    let n3 = arena.create_stub(n2, 5.0);
    assert_eq!(arena.path_to_root(n1), vec![n1, n2, n3]);
    assert_eq!(arena.path_from_root(n1), vec![n3, n2, n1]);
    assert_eq!(arena.root(n1), n3);
}

#[test]
fn path_to_root_length_sums_horizontal_travel() {
    let mut arena = NodeArena::new();
    let n4 = arena.add(placed(854.0, 50.0, 800.0));
    let stub = arena.create_stub(n4, 1.0);
    arena[stub].current_pos = 700.0;
    assert_eq!(arena.path_to_root_length(n4), 254.0);
}

#[test]
fn clone_node_drops_chain_links() {
    let mut arena = NodeArena::new();
    let mut node = Node::with_data(10.0, 11.0, 'a');
    node.current_pos = 20.0;
    node.layer_index = 3;
    let n1 = arena.add(node);
    arena.create_stub(n1, 1.0);

    let copy = arena.clone_node(n1);
    assert_eq!(copy.ideal_pos(), 10.0);
    assert_eq!(copy.current_pos, 20.0);
    assert_eq!(copy.width, 11.0);
    assert_eq!(copy.layer_index, 3);
    assert_eq!(copy.data, 'a');
    assert!(copy.is_root());
}

#[test]
fn truncate_clears_links_into_removed_nodes() {
    let mut arena = NodeArena::new();
    let n1 = arena.add(Node::new(10.0, 10.0));
    arena.create_stub(n1, 1.0);
    arena.truncate(1);
    assert_eq!(arena.len(), 1);
    assert!(arena[NodeId(0)].is_root());
    assert!(arena.get(NodeId(1)).is_none());
}
