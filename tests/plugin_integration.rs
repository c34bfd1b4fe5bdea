use bevy::prelude::*;
use wayfinder::ai::builder::{BuildStop, BuilderConfig};
use wayfinder::ai::components::{HierarchyStatus, PathFailure, PathRequest, RebuildHierarchy, WaypointPath};
use wayfinder::ai::config::AiConfig;
use wayfinder::ai::fixed_math::{FixedNum, FixedVec3};
use wayfinder::ai::graph::WaypointGraph;
use wayfinder::ai::search::{AStarConfig, ResourceLimit};
use wayfinder::ai::waypoint::WaypointId;
use wayfinder::ai::WaypointPlugin;

/// 4x4 grid with unit spacing and 4-neighbor edges.
fn grid_graph() -> (WaypointGraph, Vec<WaypointId>) {
    let mut graph = WaypointGraph::new();
    let ids: Vec<WaypointId> = (0..16)
        .map(|i| graph.add_waypoint(FixedVec3::from_f32((i % 4) as f32, (i / 4) as f32, 0.0)).unwrap())
        .collect();
    for i in 0..16 {
        if i % 4 < 3 {
            graph.connect(ids[i], ids[i + 1]).unwrap();
        }
        if i < 12 {
            graph.connect(ids[i], ids[i + 4]).unwrap();
        }
    }
    (graph, ids)
}

fn setup_app(config: AiConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(config);
    app.add_plugins(WaypointPlugin::default());
    app
}

#[test]
fn test_rebuild_then_answer_requests_in_one_frame() {
    let (graph, ids) = grid_graph();
    let mut app = setup_app(AiConfig::default());
    app.insert_resource(graph);

    let entity = app.world_mut().spawn_empty().id();
    app.world_mut().write_message(RebuildHierarchy);
    app.world_mut().write_message(PathRequest { entity, start: ids[0], goal: ids[15] });
    app.update();

    let status = app.world().resource::<HierarchyStatus>();
    let report = status.last_build.as_ref().expect("hierarchy should be rebuilt");
    assert_eq!(report.level_sizes[0], 16);
    assert_eq!(report.stop, BuildStop::BelowThreshold);
    assert_eq!(status.builds, 1);
    assert!(app.world().resource::<WaypointGraph>().num_levels() > 1);

    let path = app.world().get::<WaypointPath>(entity).expect("path should be attached");
    let WaypointPath::Found(found) = path else {
        panic!("expected a path, got {:?}", path);
    };
    assert_eq!(found.path.first(), Some(&ids[0]));
    assert_eq!(found.path.last(), Some(&ids[15]));
    // Manhattan distance is the lower bound on a unit grid
    assert!(found.cost >= FixedNum::from_num(6));
    let graph = app.world().resource::<WaypointGraph>();
    for step in found.path.windows(2) {
        assert!(graph.edge_cost(step[0], step[1]).is_some());
    }
}

#[test]
fn test_rebuild_requests_collapse() {
    let (graph, _ids) = grid_graph();
    let mut app = setup_app(AiConfig::default());
    app.insert_resource(graph);

    for _ in 0..3 {
        app.world_mut().write_message(RebuildHierarchy);
    }
    app.update();
    app.update();
    assert_eq!(app.world().resource::<HierarchyStatus>().builds, 1);
}

#[test]
fn test_invalid_request_is_reported_on_entity() {
    let (graph, ids) = grid_graph();
    let mut app = setup_app(AiConfig::default());
    app.insert_resource(graph);

    let entity = app.world_mut().spawn_empty().id();
    app.world_mut().write_message(PathRequest { entity, start: ids[0], goal: WaypointId(999) });
    app.update();

    assert_eq!(
        app.world().get::<WaypointPath>(entity),
        Some(&WaypointPath::Failed(PathFailure::InvalidRequest))
    );
}

#[test]
fn test_search_limits_come_from_config() {
    let (graph, ids) = grid_graph();
    let config = AiConfig {
        builder: BuilderConfig::default(),
        search: AStarConfig { max_nodes_explored: Some(1), ..Default::default() },
    };
    let mut app = setup_app(config);
    app.insert_resource(graph);

    let entity = app.world_mut().spawn_empty().id();
    app.world_mut().write_message(PathRequest { entity, start: ids[0], goal: ids[15] });
    app.update();

    let path = app.world().get::<WaypointPath>(entity).unwrap();
    assert_eq!(path, &WaypointPath::Failed(PathFailure::LimitExceeded(ResourceLimit::NodesExplored)));
    assert!(path.waypoints().is_empty());
}

#[test]
fn test_despawned_requester_is_skipped() {
    let (graph, ids) = grid_graph();
    let mut app = setup_app(AiConfig::default());
    app.insert_resource(graph);

    let entity = app.world_mut().spawn_empty().id();
    app.world_mut().despawn(entity);
    app.world_mut().write_message(PathRequest { entity, start: ids[0], goal: ids[3] });
    app.update();

    let mut paths = app.world_mut().query::<&WaypointPath>();
    assert_eq!(paths.iter(app.world()).count(), 0);
}

#[test]
fn test_invalid_builder_config_leaves_graph_alone() {
    let (graph, _ids) = grid_graph();
    let config = AiConfig {
        builder: BuilderConfig { max_clique_size: 1, ..Default::default() },
        search: AStarConfig::default(),
    };
    let mut app = setup_app(config);
    app.insert_resource(graph);

    app.world_mut().write_message(RebuildHierarchy);
    app.update();

    assert!(app.world().resource::<HierarchyStatus>().last_build.is_none());
    assert_eq!(app.world().resource::<WaypointGraph>().num_levels(), 1);
}
