use bevy::prelude::*;

use super::builder::WaypointGraphBuilder;
use super::components::{HierarchyStatus, PathFailure, PathRequest, RebuildHierarchy, WaypointPath};
use super::config::AiConfig;
use super::graph::WaypointGraph;
use super::search::WaypointAStar;

pub(super) fn rebuild_hierarchy(
    mut requests: MessageReader<RebuildHierarchy>,
    mut graph: ResMut<WaypointGraph>,
    mut status: ResMut<HierarchyStatus>,
    config: Res<AiConfig>,
) {
    // Several requests in one frame collapse into a single rebuild
    if requests.read().count() == 0 {
        return;
    }

    let builder = match WaypointGraphBuilder::new(config.builder.clone()) {
        Ok(builder) => builder,
        Err(e) => {
            error!("[BUILDER] Invalid builder config: {}", e);
            return;
        }
    };

    let start_time = std::time::Instant::now();
    match builder.build(&mut graph) {
        Ok(report) => {
            info!(
                "[BUILDER] Rebuilt hierarchy in {:?}: {} levels",
                start_time.elapsed(),
                report.levels_built()
            );
            status.last_build = Some(report);
            status.builds += 1;
        }
        Err(e) => error!("[BUILDER] Hierarchy rebuild failed: {}", e),
    }
}

pub(super) fn process_path_requests(
    mut path_requests: MessageReader<PathRequest>,
    mut commands: Commands,
    graph: Res<WaypointGraph>,
    config: Res<AiConfig>,
) {
    if path_requests.is_empty() {
        return;
    }

    let start_time = std::time::Instant::now();
    let request_count = path_requests.len();
    if request_count > 10 {
        warn!("[PATHFINDING] High path request count: {} pending requests!", request_count);
    }

    let search = WaypointAStar::new(&graph, config.search.clone());
    for request in path_requests.read() {
        let path = match search.hierarchical_find_path(request.start, request.goal) {
            Ok(result) => WaypointPath::from(result),
            Err(e) => {
                warn!("[PATHFINDING] Rejected request {} -> {}: {}", request.start, request.goal, e);
                WaypointPath::Failed(PathFailure::InvalidRequest)
            }
        };
        if let Ok(mut entity) = commands.get_entity(request.entity) {
            entity.insert(path);
        } else {
            debug!("[PATHFINDING] Requesting entity {:?} no longer exists", request.entity);
        }
    }

    let total_duration = start_time.elapsed();
    if total_duration.as_millis() > 100 {
        warn!("[PATHFINDING] Slow batch processing: {:?} for {} requests", total_duration, request_count);
    }
}
