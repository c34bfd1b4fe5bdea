use fixedbitset::FixedBitSet;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::ai::error::{GraphError, GraphResult};
use crate::ai::graph::WaypointGraph;
use crate::ai::waypoint::WaypointId;

pub type Clique = SmallVec<[usize; 8]>;

/// Working state for one builder pass over one search level.
///
/// Nodes are addressed by dense index (position in ascending-ID order).
/// Neighbor lists are undirected: an edge in either direction counts.
#[derive(Debug, Default)]
pub struct BuildContext {
    nodes: Vec<WaypointId>,
    index: FxHashMap<WaypointId, usize>,
    neighbors: Vec<SmallVec<[usize; 8]>>,
    assigned: FixedBitSet,
    cliques: Vec<Clique>,
}

impl BuildContext {
    pub fn from_level(graph: &WaypointGraph, level: u32) -> GraphResult<Self> {
        let search_level = graph.level(level).ok_or_else(|| {
            GraphError::InvalidState(format!("search level {} does not exist", level))
        })?;
        let mesh = search_level.nav_mesh();
        let edges = mesh
            .iter()
            .flat_map(|(from, segs)| segs.iter().map(move |s| (from, s.to)));
        Ok(Self::new(search_level.nodes().collect(), edges))
    }

    /// Builds the context from a node list and directed edges. Edges touching
    /// unknown nodes are ignored.
    pub fn new(mut nodes: Vec<WaypointId>, edges: impl IntoIterator<Item = (WaypointId, WaypointId)>) -> Self {
        nodes.sort_unstable();
        nodes.dedup();
        let index: FxHashMap<WaypointId, usize> =
            nodes.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut neighbors: Vec<SmallVec<[usize; 8]>> = vec![SmallVec::new(); nodes.len()];
        for (from, to) in edges {
            let (Some(&a), Some(&b)) = (index.get(&from), index.get(&to)) else {
                continue;
            };
            if a == b {
                continue;
            }
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        let assigned = FixedBitSet::with_capacity(nodes.len());
        Self {
            nodes,
            index,
            neighbors,
            assigned,
            cliques: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn id(&self, index: usize) -> WaypointId {
        self.nodes[index]
    }

    pub fn index_of(&self, id: WaypointId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Ascending neighbor indices.
    pub fn neighbors(&self, index: usize) -> &[usize] {
        &self.neighbors[index]
    }

    pub fn adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbors[a].binary_search(&b).is_ok()
    }

    pub fn is_assigned(&self, index: usize) -> bool {
        self.assigned.contains(index)
    }

    pub fn unassigned_count(&self) -> usize {
        self.nodes.len() - self.assigned.count_ones(..)
    }

    /// Records a clique and marks its members assigned. Members are stored
    /// in ascending order.
    pub fn commit(&mut self, mut clique: Clique) {
        clique.sort_unstable();
        for &member in &clique {
            debug_assert!(!self.assigned.contains(member), "node assigned twice in one pass");
            self.assigned.insert(member);
        }
        self.cliques.push(clique);
    }

    /// Cliques in discovery order.
    pub fn cliques(&self) -> &[Clique] {
        &self.cliques
    }

    pub fn clique_ids<'a>(&'a self, clique: &'a Clique) -> impl Iterator<Item = WaypointId> + 'a {
        clique.iter().map(move |&i| self.nodes[i])
    }
}
