use super::*;
use crate::ai::fixed_math::{FixedNum, FixedVec3};

fn child(id: u32, x: f32, y: f32, z: f32) -> ChildRef {
    ChildRef {
        id: WaypointId(id),
        position: FixedVec3::from_f32(x, y, z),
        radius: FixedNum::ZERO,
    }
}

#[test]
fn test_collection_insert_recomputes_centroid() {
    let mut coll = WaypointCollection::new(WaypointId(100), 4);
    assert!(coll.insert(child(1, 0.0, 0.0, 0.0)));
    assert_eq!(coll.position(), FixedVec3::ZERO);

    assert!(coll.insert(child(2, 4.0, 0.0, 0.0)));
    assert_eq!(coll.position(), FixedVec3::from_f32(2.0, 0.0, 0.0));
    assert_eq!(coll.radius(), FixedNum::from_num(2));
    assert_eq!(coll.len(), 2);
}

#[test]
fn test_collection_rejects_when_full() {
    let mut coll = WaypointCollection::new(WaypointId(100), 2);
    assert!(coll.insert(child(1, 0.0, 0.0, 0.0)));
    assert!(coll.insert(child(2, 2.0, 0.0, 0.0)));
    assert!(coll.is_full());

    let before = coll.position();
    assert!(!coll.insert(child(3, 10.0, 10.0, 10.0)));
    assert_eq!(coll.len(), 2);
    assert_eq!(coll.position(), before);
    assert!(!coll.contains(WaypointId(3)));
}

#[test]
fn test_collection_ignores_duplicate_child() {
    let mut coll = WaypointCollection::new(WaypointId(100), 4);
    assert!(coll.insert(child(1, 0.0, 0.0, 0.0)));
    assert!(!coll.insert(child(1, 5.0, 0.0, 0.0)));
    assert_eq!(coll.len(), 1);
}

#[test]
fn test_collection_remove_and_empty() {
    let mut coll = WaypointCollection::new(WaypointId(100), 4);
    coll.insert(child(1, 0.0, 0.0, 0.0));
    coll.insert(child(2, 2.0, 2.0, 0.0));

    assert!(coll.remove(WaypointId(1)));
    assert!(!coll.remove(WaypointId(1)));
    assert_eq!(coll.position(), FixedVec3::from_f32(2.0, 2.0, 0.0));
    assert_eq!(coll.radius(), FixedNum::ZERO);

    assert!(coll.remove(WaypointId(2)));
    assert!(coll.is_empty());
    assert_eq!(coll.position(), FixedVec3::ZERO);
}

#[test]
fn test_collection_children_keep_insertion_order() {
    let mut coll = WaypointCollection::new(WaypointId(100), 4);
    for id in [7, 3, 5] {
        coll.insert(child(id, id as f32, 0.0, 0.0));
    }
    let ids: Vec<u32> = coll.child_ids().map(|id| id.0).collect();
    assert_eq!(ids, vec![7, 3, 5]);
}

#[test]
fn test_radius_includes_child_radius() {
    // A nested collection's children must lie within the parent's radius too
    let mut coll = WaypointCollection::new(WaypointId(100), 4);
    coll.insert(ChildRef {
        id: WaypointId(1),
        position: FixedVec3::from_f32(-3.0, 0.0, 0.0),
        radius: FixedNum::from_num(1),
    });
    coll.insert(ChildRef {
        id: WaypointId(2),
        position: FixedVec3::from_f32(3.0, 0.0, 0.0),
        radius: FixedNum::from_num(2),
    });
    assert_eq!(coll.radius(), FixedNum::from_num(5));
}

#[test]
fn test_update_child_moves_centroid() {
    let mut coll = WaypointCollection::new(WaypointId(100), 4);
    coll.insert(child(1, 0.0, 0.0, 0.0));
    coll.insert(child(2, 2.0, 0.0, 0.0));

    assert!(coll.update_child(child(2, 4.0, 0.0, 0.0)));
    assert_eq!(coll.position(), FixedVec3::from_f32(2.0, 0.0, 0.0));
    assert!(!coll.update_child(child(9, 0.0, 0.0, 0.0)));
}

#[test]
fn test_nav_mesh_segment_update_does_not_duplicate() {
    let mut mesh = NavMesh::new();
    let a = WaypointId(1);
    let b = WaypointId(2);
    mesh.insert_node(a);
    mesh.insert_node(b);

    assert!(mesh.insert_segment(a, b, FixedNum::from_num(3)));
    assert!(!mesh.insert_segment(a, b, FixedNum::from_num(1)));
    assert_eq!(mesh.segments(a).len(), 1);
    assert_eq!(mesh.cost(a, b), Some(FixedNum::from_num(1)));
    assert_eq!(mesh.cost(b, a), None);
    assert!(mesh.connected(b, a));
}

#[test]
fn test_nav_mesh_remove_node_drops_incoming_segments() {
    let mut mesh = NavMesh::new();
    let (a, b, c) = (WaypointId(1), WaypointId(2), WaypointId(3));
    for id in [a, b, c] {
        mesh.insert_node(id);
    }
    mesh.insert_segment(a, b, FixedNum::ONE);
    mesh.insert_segment(c, b, FixedNum::ONE);
    mesh.insert_segment(b, a, FixedNum::ONE);

    assert!(mesh.remove_node(b));
    assert!(!mesh.remove_node(b));
    assert!(mesh.segments(a).is_empty());
    assert!(mesh.segments(c).is_empty());
    assert_eq!(mesh.node_count(), 2);
}

#[test]
fn test_leaf_node_reports_waypoint_position() {
    let wp = Waypoint::new(WaypointId(4), FixedVec3::from_f32(1.0, 2.0, 3.0));
    let node = WaypointNode::leaf(wp);
    assert_eq!(node.position(), wp.position);
    assert_eq!(node.radius(), FixedNum::ZERO);
    assert!(!node.is_collection());
    assert_eq!(node.level, 0);
}

#[test]
fn test_nav_mesh_data_from_ron() {
    let text = r#"(
        waypoints: [
            (id: 1, position: (0.0, 0.0, 0.0)),
            (id: 2, position: (3.0, 4.0, 0.0)),
        ],
        edges: [
            (from: 1, to: 2),
            (from: 2, to: 1, cost: Some(9.0), one_way: true),
        ],
    )"#;
    let data: NavMeshData = ron::from_str(text).unwrap();
    assert_eq!(data.waypoints.len(), 2);
    assert_eq!(data.edges[0].cost, None);
    assert!(!data.edges[0].one_way);
    assert!(data.edges[1].one_way);
}
