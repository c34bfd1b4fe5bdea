use bevy::prelude::*;

pub mod fixed_math;
pub mod error;
pub mod waypoint;
pub mod graph;
pub mod builder;
pub mod search;
pub mod fsm;
pub mod config;
pub mod components;
mod systems;

use components::{HierarchyStatus, PathRequest, RebuildHierarchy};
use config::{AiConfig, AI_CONFIG_PATH};
use graph::WaypointGraph;

/// Registers the waypoint graph, its config and the request messages.
///
/// A `RebuildHierarchy` sent in the same frame as path requests is applied
/// before those requests are answered.
pub struct WaypointPlugin {
    pub config_path: String,
}

impl Default for WaypointPlugin {
    fn default() -> Self {
        Self { config_path: AI_CONFIG_PATH.to_string() }
    }
}

impl Plugin for WaypointPlugin {
    fn build(&self, app: &mut App) {
        // A config inserted by the app before this plugin wins over the file
        if !app.world().contains_resource::<AiConfig>() {
            app.insert_resource(AiConfig::load_or_default(&self.config_path));
        }
        app.add_message::<PathRequest>();
        app.add_message::<RebuildHierarchy>();
        app.init_resource::<WaypointGraph>();
        app.init_resource::<HierarchyStatus>();
        app.add_systems(
            Update,
            (systems::rebuild_hierarchy, systems::process_path_requests).chain(),
        );
    }
}
