use bevy::prelude::*;
use std::collections::BTreeMap;

use crate::ai::error::{GraphError, GraphResult};
use crate::ai::fixed_math::FixedNum;
use crate::ai::waypoint::WaypointId;
use super::graph::WaypointGraph;

impl WaypointGraph {
    /// Rebuilds the inter-collection edges of every level above 0.
    pub fn create_abstract_edges(&mut self) -> GraphResult<()> {
        for level in 1..self.num_levels() {
            self.create_abstract_edges_at_level(level)?;
        }
        Ok(())
    }

    /// Replaces the edges of `level` with ones derived from `level - 1`.
    ///
    /// Collection A gets a segment to collection B when some child of A has a
    /// segment to some child of B. Its cost is the cheapest such child segment.
    /// Children without a parent contribute nothing.
    pub fn create_abstract_edges_at_level(&mut self, level: u32) -> GraphResult<()> {
        if level == 0 || level >= self.num_levels() {
            return Err(GraphError::InvalidState(format!(
                "abstract edges need a level in 1..{}, got {}",
                self.num_levels(),
                level
            )));
        }

        let mut cheapest: BTreeMap<(WaypointId, WaypointId), FixedNum> = BTreeMap::new();
        for (from, segments) in self.levels[(level - 1) as usize].nav_mesh().iter() {
            let Some(from_parent) = self.parent(from) else { continue };
            for seg in segments {
                let Some(to_parent) = self.parent(seg.to) else { continue };
                if from_parent == to_parent {
                    continue;
                }
                cheapest
                    .entry((from_parent, to_parent))
                    .and_modify(|c| *c = (*c).min(seg.cost))
                    .or_insert(seg.cost);
            }
        }

        let count = cheapest.len();
        if let Some(mesh) = self.nav_mesh_mut(level) {
            mesh.clear_segments();
            for ((from, to), cost) in cheapest {
                mesh.insert_segment(from, to, cost);
            }
        }
        debug!("[GRAPH] Level {}: {} abstract segments", level, count);
        Ok(())
    }
}
