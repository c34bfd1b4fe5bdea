use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use wayfinder_macros::profile;

use crate::ai::error::{GraphError, GraphResult};
use crate::ai::graph::WaypointGraph;
use crate::ai::waypoint::WaypointCollection;
use super::cliques::{assign_remaining, create_all_n_cliques};
use super::context::BuildContext;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Upper bound on children per collection (branching factor, at least 2).
    pub max_clique_size: usize,
    /// Stop once the newest level has at most this many nodes.
    pub termination_node_threshold: usize,
    /// Cap on the total number of levels, level 0 included.
    pub max_levels: u32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_clique_size: 4,
            termination_node_threshold: 1,
            max_levels: 16,
        }
    }
}

/// Result of consuming one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelOutcome {
    pub level: u32,
    pub consumed: usize,
    pub produced: usize,
}

impl LevelOutcome {
    pub fn compacted(&self) -> bool {
        self.produced < self.consumed
    }
}

/// Why a build stopped. None of these are errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildStop {
    EmptyNavMesh,
    BelowThreshold,
    /// The last pass produced as many nodes as it consumed. Its level is kept.
    NoCompaction,
    MaxLevels,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildReport {
    /// Node count of every level, level 0 first.
    pub level_sizes: Vec<usize>,
    pub stop: BuildStop,
}

impl BuildReport {
    pub fn levels_built(&self) -> usize {
        self.level_sizes.len().saturating_sub(1)
    }
}

/// Bottom-up clique clustering of a waypoint graph.
///
/// Each pass partitions one level into collections of at most
/// `max_clique_size` mutually adjacent nodes, largest groups first, then
/// links the new collections wherever their children were linked.
#[derive(Clone, Debug)]
pub struct WaypointGraphBuilder {
    config: BuilderConfig,
}

impl WaypointGraphBuilder {
    pub fn new(config: BuilderConfig) -> GraphResult<Self> {
        if config.max_clique_size < 2 {
            return Err(GraphError::Configuration(format!(
                "max_clique_size must be at least 2, got {}",
                config.max_clique_size
            )));
        }
        if config.max_levels == 0 {
            return Err(GraphError::Configuration("max_levels must be at least 1".into()));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Rebuilds the whole hierarchy above level 0.
    pub fn build(&self, graph: &mut WaypointGraph) -> GraphResult<BuildReport> {
        graph.clear_hierarchy();
        let mut level_sizes = vec![graph.waypoint_count()];

        if graph.waypoint_count() == 0 {
            info!("[BUILDER] Navmesh is empty, nothing to build");
            return Ok(BuildReport { level_sizes, stop: BuildStop::EmptyNavMesh });
        }

        let mut level = 0;
        let stop = loop {
            let newest = level_sizes[level as usize];
            if newest <= self.config.termination_node_threshold {
                break BuildStop::BelowThreshold;
            }
            if graph.num_levels() >= self.config.max_levels {
                warn!("[BUILDER] Hit max_levels ({}) with {} nodes on top", self.config.max_levels, newest);
                break BuildStop::MaxLevels;
            }

            let outcome = self.create_next_search_level(graph, level)?;
            level_sizes.push(outcome.produced);
            if !outcome.compacted() {
                info!("[BUILDER] Level {} did not compact ({} nodes), stopping", outcome.level + 1, outcome.produced);
                break BuildStop::NoCompaction;
            }
            level += 1;
        };

        info!("[BUILDER] Built {} levels: {:?} ({:?})", level_sizes.len(), level_sizes, stop);
        Ok(BuildReport { level_sizes, stop })
    }

    /// Consumes the top level `level` and appends level `level + 1`.
    #[profile(5)]
    pub fn create_next_search_level(&self, graph: &mut WaypointGraph, level: u32) -> GraphResult<LevelOutcome> {
        if level != graph.top_level() {
            return Err(GraphError::InvalidState(format!(
                "can only build on the top level {}, got {}",
                graph.top_level(),
                level
            )));
        }

        let mut ctx = BuildContext::from_level(graph, level)?;
        if ctx.is_empty() {
            return Err(GraphError::InvalidState(format!("search level {} is empty", level)));
        }

        let k = self.config.max_clique_size;
        for size in (2..=k).rev() {
            let formed = create_all_n_cliques(&mut ctx, size);
            if formed > 0 {
                debug!("[BUILDER] Level {}: {} cliques of size {}", level, formed, size);
            }
            if ctx.unassigned_count() < 2 {
                break;
            }
        }
        let singles = assign_remaining(&mut ctx);

        let new_level = graph.create_search_level()?;
        for clique in ctx.cliques() {
            let id = graph.allocate_id()?;
            let mut collection = WaypointCollection::new(id, k);
            for child in ctx.clique_ids(clique) {
                if let Some(child_ref) = graph.child_ref(child) {
                    collection.insert(child_ref);
                }
            }
            graph.insert_collection(new_level, collection)?;
        }
        graph.create_abstract_edges_at_level(new_level)?;

        let outcome = LevelOutcome {
            level,
            consumed: ctx.len(),
            produced: ctx.cliques().len(),
        };
        info!(
            "[BUILDER] Level {} -> {}: {} nodes into {} collections ({} singletons)",
            level, new_level, outcome.consumed, outcome.produced, singles
        );
        Ok(outcome)
    }
}
