use bevy::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ai::error::{GraphError, GraphResult};
use crate::ai::fixed_math::{FixedNum, FixedVec3};
use crate::ai::waypoint::{
    ChildRef, NavMesh, NavMeshData, PathSegment, Waypoint, WaypointCollection, WaypointId,
    WaypointNode,
};

/// One stratum of the hierarchy: its nodes and the adjacency among them.
///
/// Level 0 holds raw waypoints; level N holds collections grouping level N-1.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchLevel {
    index: u32,
    nav_mesh: NavMesh,
}

impl SearchLevel {
    fn new(index: u32) -> Self {
        Self { index, nav_mesh: NavMesh::new() }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn nav_mesh(&self) -> &NavMesh {
        &self.nav_mesh
    }

    /// Node IDs in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = WaypointId> + '_ {
        self.nav_mesh.nodes()
    }

    pub fn contains(&self, id: WaypointId) -> bool {
        self.nav_mesh.contains(id)
    }

    pub fn len(&self) -> usize {
        self.nav_mesh.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.nav_mesh.is_empty()
    }
}

/// Summary numbers for logging and debug overlays.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub waypoints: usize,
    pub collections: usize,
    pub nodes_per_level: Vec<usize>,
    pub segments_per_level: Vec<usize>,
}

/// Multi-level waypoint graph.
///
/// Owns every node (waypoints and collections) in one arena keyed by ID.
/// Collections and levels refer to nodes by ID only. Parent/child links are
/// kept mutually consistent by every mutator: if `n.parent == Some(p)` then
/// `p`'s collection contains `n`, and vice versa.
///
/// The graph is single-writer. Build it, then hand out shared references for
/// searches.
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
pub struct WaypointGraph {
    pub(super) nodes: FxHashMap<WaypointId, WaypointNode>,
    pub(super) levels: Vec<SearchLevel>,
    next_id: u32,
}

impl Default for WaypointGraph {
    fn default() -> Self {
        Self {
            nodes: FxHashMap::default(),
            levels: vec![SearchLevel::new(0)],
            next_id: 0,
        }
    }
}

impl WaypointGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds level 0 from plain navmesh data.
    ///
    /// Edges without an explicit cost use the straight-line distance.
    pub fn from_nav_mesh_data(data: &NavMeshData) -> GraphResult<Self> {
        let mut graph = Self::new();
        for wp in &data.waypoints {
            let id = WaypointId(wp.id);
            let [x, y, z] = wp.position;
            let position = FixedVec3::checked_from_f32(x, y, z)
                .ok_or_else(|| GraphError::invalid_reference(id, format!("unrepresentable position {:?}", wp.position)))?;
            graph.insert_waypoint(Waypoint::new(id, position))?;
        }
        for edge in &data.edges {
            let (from, to) = (WaypointId(edge.from), WaypointId(edge.to));
            let cost = match edge.cost {
                Some(c) if c < 0.0 => return Err(GraphError::NegativeCost { from, to, cost: c }),
                Some(c) => FixedNum::checked_from_num(c)
                    .ok_or_else(|| GraphError::invalid_reference(from, format!("unrepresentable cost {} to {}", c, to)))?,
                None => graph.distance(from, to)?,
            };
            if edge.one_way {
                graph.add_directed_edge(from, to, cost)?;
            } else {
                graph.add_edge(from, to, cost)?;
            }
        }
        info!(
            "[GRAPH] Loaded navmesh: {} waypoints, {} segments",
            graph.levels[0].len(),
            graph.levels[0].nav_mesh.segment_count()
        );
        Ok(graph)
    }

    /// Reads RON navmesh data from `path` and builds level 0 from it.
    pub fn load_nav_mesh(path: impl AsRef<Path>) -> GraphResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let data: NavMeshData = ron::from_str(&contents)?;
        Self::from_nav_mesh_data(&data)
    }

    // ------------------------------------------------------------------
    // IDs and lookup
    // ------------------------------------------------------------------

    /// Hands out a fresh ID. IDs are never reused while the graph lives.
    ///
    /// `u32::MAX` is never handed out; reaching it means the ID space is spent.
    pub fn allocate_id(&mut self) -> GraphResult<WaypointId> {
        if self.next_id == u32::MAX {
            return Err(GraphError::InvalidState("waypoint ID space exhausted".into()));
        }
        let id = WaypointId(self.next_id);
        self.next_id += 1;
        Ok(id)
    }

    /// Moves the ID counter past an externally chosen ID.
    fn reserve_id(&mut self, id: WaypointId) -> GraphResult<()> {
        let next = id
            .0
            .checked_add(1)
            .ok_or_else(|| GraphError::invalid_reference(id, "ID is reserved"))?;
        self.next_id = self.next_id.max(next);
        Ok(())
    }

    pub fn find(&self, id: WaypointId) -> Option<&WaypointNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: WaypointId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn search_level_of(&self, id: WaypointId) -> Option<u32> {
        self.nodes.get(&id).map(|n| n.level)
    }

    pub fn position(&self, id: WaypointId) -> Option<FixedVec3> {
        self.nodes.get(&id).map(|n| n.position())
    }

    pub fn parent(&self, id: WaypointId) -> Option<WaypointId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Children of a collection; empty for leaves and unknown IDs.
    pub fn children(&self, id: WaypointId) -> impl Iterator<Item = WaypointId> + '_ {
        self.nodes
            .get(&id)
            .and_then(|n| n.as_collection())
            .into_iter()
            .flat_map(|c| c.child_ids())
    }

    pub fn collection(&self, id: WaypointId) -> Option<&WaypointCollection> {
        self.nodes.get(&id).and_then(|n| n.as_collection())
    }

    pub fn level(&self, index: u32) -> Option<&SearchLevel> {
        self.levels.get(index as usize)
    }

    pub fn levels(&self) -> &[SearchLevel] {
        &self.levels
    }

    /// Always at least 1: level 0 exists even when empty.
    pub fn num_levels(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn top_level(&self) -> u32 {
        self.num_levels() - 1
    }

    pub fn waypoint_count(&self) -> usize {
        self.levels[0].len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            waypoints: self.levels[0].len(),
            collections: self.nodes.values().filter(|n| n.is_collection()).count(),
            nodes_per_level: self.levels.iter().map(|l| l.len()).collect(),
            segments_per_level: self.levels.iter().map(|l| l.nav_mesh.segment_count()).collect(),
        }
    }

    // ------------------------------------------------------------------
    // Waypoints
    // ------------------------------------------------------------------

    /// Fails only when the position is out of range or the ID space is spent.
    pub fn add_waypoint(&mut self, position: FixedVec3) -> GraphResult<WaypointId> {
        check_position(position)?;
        let id = self.allocate_id()?;
        self.register(WaypointNode::leaf(Waypoint::new(id, position)));
        Ok(id)
    }

    /// Inserts a waypoint carrying its own ID. The ID counter is moved past it.
    ///
    /// `u32::MAX` is reserved and rejected.
    pub fn insert_waypoint(&mut self, waypoint: Waypoint) -> GraphResult<()> {
        if self.nodes.contains_key(&waypoint.id) {
            return Err(GraphError::DuplicateId(waypoint.id));
        }
        check_position(waypoint.position)?;
        self.reserve_id(waypoint.id)?;
        self.register(WaypointNode::leaf(waypoint));
        Ok(())
    }

    /// Moves a level-0 waypoint and refreshes every ancestor's centroid.
    pub fn move_waypoint(&mut self, id: WaypointId, position: FixedVec3) -> GraphResult<()> {
        check_position(position)?;
        let node = self.nodes.get_mut(&id).ok_or_else(|| GraphError::unknown(id))?;
        if !node.set_leaf_position(position) {
            return Err(GraphError::invalid_reference(id, "collections are positioned by their children"));
        }
        self.refresh_ancestors(id);
        Ok(())
    }

    /// Removes a node, every edge touching it and, for a collection, its
    /// whole subtree. Collections left empty are pruned up the hierarchy.
    ///
    /// Unknown IDs are ignored and reported with `false`.
    pub fn remove_waypoint(&mut self, id: WaypointId) -> bool {
        let Some(parent) = self.nodes.get(&id).map(|n| n.parent) else {
            return false;
        };
        let removed = self.remove_subtree(id);
        debug!("[GRAPH] Removed {} ({} nodes including subtree)", id, removed);
        if let Some(parent) = parent {
            self.detach_child(parent, id);
        }
        true
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Adds (or re-costs) the edge in both directions. Costs must not be negative.
    pub fn add_edge(&mut self, a: WaypointId, b: WaypointId, cost: FixedNum) -> GraphResult<()> {
        check_cost(a, b, cost)?;
        let level = self.check_edge(a, b)?;
        let mesh = &mut self.levels[level as usize].nav_mesh;
        mesh.insert_segment(a, b, cost);
        mesh.insert_segment(b, a, cost);
        Ok(())
    }

    pub fn add_directed_edge(&mut self, from: WaypointId, to: WaypointId, cost: FixedNum) -> GraphResult<()> {
        check_cost(from, to, cost)?;
        let level = self.check_edge(from, to)?;
        self.levels[level as usize].nav_mesh.insert_segment(from, to, cost);
        Ok(())
    }

    /// Symmetric edge costed by the distance between the two nodes.
    pub fn connect(&mut self, a: WaypointId, b: WaypointId) -> GraphResult<FixedNum> {
        let cost = self.distance(a, b)?;
        self.add_edge(a, b, cost)?;
        Ok(cost)
    }

    /// Removes the directed segment `from -> to`.
    pub fn remove_edge(&mut self, from: WaypointId, to: WaypointId) -> bool {
        match self.nodes.get(&from) {
            Some(node) => self.levels[node.level as usize].nav_mesh.remove_segment(from, to),
            None => false,
        }
    }

    /// Removes every segment leaving or entering `id`.
    pub fn remove_all_edges(&mut self, id: WaypointId) -> bool {
        match self.nodes.get(&id) {
            Some(node) => {
                self.levels[node.level as usize].nav_mesh.clear_node(id);
                true
            }
            None => false,
        }
    }

    /// Outgoing segments of `id` at its own level.
    pub fn edges(&self, id: WaypointId) -> GraphResult<impl Iterator<Item = PathSegment> + '_> {
        let node = self.nodes.get(&id).ok_or_else(|| GraphError::unknown(id))?;
        Ok(self.levels[node.level as usize].nav_mesh.segments(id).iter().copied())
    }

    /// Outgoing neighbors; empty for unknown IDs.
    pub fn neighbors(&self, id: WaypointId) -> impl Iterator<Item = WaypointId> + '_ {
        self.nodes
            .get(&id)
            .map(|n| self.levels[n.level as usize].nav_mesh.segments(id))
            .unwrap_or(&[])
            .iter()
            .map(|s| s.to)
    }

    pub fn edge_cost(&self, from: WaypointId, to: WaypointId) -> Option<FixedNum> {
        let node = self.nodes.get(&from)?;
        self.levels[node.level as usize].nav_mesh.cost(from, to)
    }

    pub fn distance(&self, a: WaypointId, b: WaypointId) -> GraphResult<FixedNum> {
        let pa = self.position(a).ok_or_else(|| GraphError::unknown(a))?;
        let pb = self.position(b).ok_or_else(|| GraphError::unknown(b))?;
        Ok(pa.distance(pb))
    }

    // ------------------------------------------------------------------
    // Levels and collections
    // ------------------------------------------------------------------

    /// Appends an empty level above the current top and returns its index.
    pub fn create_search_level(&mut self) -> GraphResult<u32> {
        if self.levels[0].is_empty() {
            return Err(GraphError::InvalidState(
                "cannot create a search level before level 0 has waypoints".into(),
            ));
        }
        let index = self.num_levels();
        self.levels.push(SearchLevel::new(index));
        Ok(index)
    }

    /// Registers `collection` at `level` and links its children to it.
    ///
    /// Children must already live at `level - 1` and have no parent. The
    /// child entries are refreshed from the graph, so callers only need to
    /// get the IDs right. `level` may be one past the current top, in which
    /// case the level is created.
    pub fn insert_collection(&mut self, level: u32, collection: WaypointCollection) -> GraphResult<()> {
        let id = collection.id();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        if level == 0 {
            return Err(GraphError::invalid_reference(id, "collections cannot live on level 0"));
        }
        if id.0 == u32::MAX {
            return Err(GraphError::invalid_reference(id, "ID is reserved"));
        }
        for child in collection.child_ids() {
            let node = self.nodes.get(&child).ok_or_else(|| GraphError::unknown(child))?;
            if node.level + 1 != level {
                return Err(GraphError::invalid_reference(
                    child,
                    format!("child is on level {}, collection on level {}", node.level, level),
                ));
            }
            if let Some(existing) = node.parent {
                return Err(GraphError::InvalidState(format!(
                    "{} already belongs to collection {}",
                    child, existing
                )));
            }
        }
        self.ensure_level(level)?;

        let mut fresh = WaypointCollection::new(id, collection.max_size());
        for child in collection.child_ids() {
            if let Some(child_ref) = self.child_ref(child) {
                fresh.insert(child_ref);
            }
            if let Some(node) = self.nodes.get_mut(&child) {
                node.parent = Some(id);
            }
        }
        self.reserve_id(id)?;
        self.register(WaypointNode::collection(fresh, level));
        Ok(())
    }

    /// Registers an empty, unbounded collection for manual hierarchies.
    pub fn create_collection(&mut self, level: u32) -> GraphResult<WaypointId> {
        let id = self.allocate_id()?;
        self.insert_collection(level, WaypointCollection::new(id, usize::MAX))?;
        Ok(id)
    }

    /// Makes `child` a member of collection `parent`.
    ///
    /// The parent must sit exactly one level above the child. An empty,
    /// parentless collection on the wrong level is moved to the right one.
    /// Returns `false` if the child is already a member or the collection is full.
    pub fn assign(&mut self, child: WaypointId, parent: WaypointId) -> GraphResult<bool> {
        let child_node = self.nodes.get(&child).ok_or_else(|| GraphError::unknown(child))?;
        let child_level = child_node.level;
        let current_parent = child_node.parent;
        let parent_node = self.nodes.get(&parent).ok_or_else(|| GraphError::unknown(parent))?;
        let Some(coll) = parent_node.as_collection() else {
            return Err(GraphError::invalid_reference(parent, "not a collection"));
        };
        if coll.contains(child) {
            return Ok(false);
        }
        if let Some(existing) = current_parent {
            return Err(GraphError::InvalidState(format!(
                "{} already belongs to collection {}",
                child, existing
            )));
        }
        if coll.is_full() {
            return Ok(false);
        }

        let wanted = child_level + 1;
        if parent_node.level != wanted {
            if parent_node.parent.is_some() || !coll.is_empty() {
                return Err(GraphError::invalid_reference(
                    parent,
                    format!(
                        "collection is on level {}, child {} is on level {}",
                        parent_node.level, child, child_level
                    ),
                ));
            }
            self.rehome_collection(parent, wanted)?;
        }

        let Some(child_ref) = self.child_ref(child) else {
            return Err(GraphError::unknown(child));
        };
        let inserted = self
            .nodes
            .get_mut(&parent)
            .and_then(|n| n.as_collection_mut())
            .map(|c| c.insert(child_ref))
            .unwrap_or(false);
        if inserted {
            if let Some(node) = self.nodes.get_mut(&child) {
                node.parent = Some(parent);
            }
            self.refresh_ancestors(parent);
        }
        Ok(inserted)
    }

    /// Drops every level above 0 and unlinks all waypoints. Keeps the ID counter.
    pub fn clear_hierarchy(&mut self) {
        self.levels.truncate(1);
        self.nodes.retain(|_, n| !n.is_collection());
        for node in self.nodes.values_mut() {
            node.parent = None;
        }
    }

    /// Empties the graph entirely, including the ID counter.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn register(&mut self, node: WaypointNode) {
        self.levels[node.level as usize].nav_mesh.insert_node(node.id);
        self.nodes.insert(node.id, node);
    }

    fn ensure_level(&mut self, level: u32) -> GraphResult<()> {
        let count = self.num_levels();
        if level < count {
            Ok(())
        } else if level == count {
            self.create_search_level().map(|_| ())
        } else {
            Err(GraphError::InvalidState(format!(
                "level {} requested but only {} levels exist",
                level, count
            )))
        }
    }

    fn check_edge(&self, a: WaypointId, b: WaypointId) -> GraphResult<u32> {
        let la = self.search_level_of(a).ok_or_else(|| GraphError::unknown(a))?;
        let lb = self.search_level_of(b).ok_or_else(|| GraphError::unknown(b))?;
        if la != lb {
            return Err(GraphError::invalid_reference(
                b,
                format!("edge endpoints on different levels ({} and {})", la, lb),
            ));
        }
        Ok(la)
    }

    pub(crate) fn child_ref(&self, id: WaypointId) -> Option<ChildRef> {
        self.nodes.get(&id).map(|n| ChildRef {
            id,
            position: n.position(),
            radius: n.radius(),
        })
    }

    /// Pushes the current position/radius of `id` into each ancestor in turn.
    fn refresh_ancestors(&mut self, mut id: WaypointId) {
        while let Some(parent) = self.parent(id) {
            let Some(child_ref) = self.child_ref(id) else { break };
            let Some(node) = self.nodes.get_mut(&parent) else { break };
            if let Some(coll) = node.as_collection_mut() {
                coll.update_child(child_ref);
            }
            id = parent;
        }
    }

    fn rehome_collection(&mut self, id: WaypointId, level: u32) -> GraphResult<()> {
        self.ensure_level(level)?;
        let Some(node) = self.nodes.get_mut(&id) else {
            return Err(GraphError::unknown(id));
        };
        let old = node.level;
        node.level = level;
        self.levels[old as usize].nav_mesh.remove_node(id);
        self.levels[level as usize].nav_mesh.insert_node(id);
        debug!("[GRAPH] Moved empty collection {} from level {} to {}", id, old, level);
        Ok(())
    }

    /// Removes `root` and all descendants from the arena and their levels.
    fn remove_subtree(&mut self, root: WaypointId) -> usize {
        let mut stack = vec![root];
        let mut removed = 0;
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.remove(&id) else { continue };
            self.levels[node.level as usize].nav_mesh.remove_node(id);
            if let Some(coll) = node.as_collection() {
                stack.extend(coll.child_ids());
            }
            removed += 1;
        }
        removed
    }

    /// Unlinks `child` from `parent`, pruning collections that become empty.
    fn detach_child(&mut self, mut parent: WaypointId, mut child: WaypointId) {
        loop {
            let Some(node) = self.nodes.get_mut(&parent) else { return };
            let Some(coll) = node.as_collection_mut() else { return };
            coll.remove(child);
            if !coll.is_empty() {
                self.refresh_ancestors(parent);
                return;
            }
            let grandparent = node.parent;
            let level = node.level;
            self.nodes.remove(&parent);
            self.levels[level as usize].nav_mesh.remove_node(parent);
            debug!("[GRAPH] Pruned empty collection {}", parent);
            match grandparent {
                Some(gp) => {
                    child = parent;
                    parent = gp;
                }
                None => return,
            }
        }
    }

    pub(super) fn nav_mesh_mut(&mut self, level: u32) -> Option<&mut NavMesh> {
        self.levels.get_mut(level as usize).map(|l| &mut l.nav_mesh)
    }
}

fn check_position(position: FixedVec3) -> GraphResult<()> {
    if position.is_in_range() {
        Ok(())
    } else {
        Err(GraphError::PositionOutOfRange(position))
    }
}

fn check_cost(from: WaypointId, to: WaypointId, cost: FixedNum) -> GraphResult<()> {
    if cost < FixedNum::ZERO {
        return Err(GraphError::NegativeCost { from, to, cost: cost.to_num() });
    }
    Ok(())
}
