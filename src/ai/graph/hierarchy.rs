use crate::ai::waypoint::WaypointId;
use super::graph::WaypointGraph;

// Tree queries over the parent links. All of them walk upward only, so they
// cost O(depth) and never touch the navmeshes.
impl WaypointGraph {
    /// Topmost ancestor of `id`, or `id` itself when it has no parent.
    pub fn root(&self, id: WaypointId) -> Option<WaypointId> {
        let mut current = self.find(id)?.id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    /// Ancestor of `id` on `level`, or `id` itself if it already lives there.
    pub fn ancestor_at_level(&self, id: WaypointId, level: u32) -> Option<WaypointId> {
        let mut current = id;
        let mut current_level = self.search_level_of(id)?;
        while current_level < level {
            current = self.parent(current)?;
            current_level += 1;
        }
        (current_level == level).then_some(current)
    }

    /// Lowest node that is an ancestor-or-self of both `a` and `b`.
    ///
    /// The deeper node is first lifted to the level of the other, then both
    /// climb in lock-step.
    pub fn common_parent(&self, a: WaypointId, b: WaypointId) -> Option<WaypointId> {
        let la = self.search_level_of(a)?;
        let lb = self.search_level_of(b)?;
        let level = la.max(lb);
        let mut a = self.ancestor_at_level(a, level)?;
        let mut b = self.ancestor_at_level(b, level)?;
        loop {
            if a == b {
                return Some(a);
            }
            a = self.parent(a)?;
            b = self.parent(b)?;
        }
    }

    /// Chain from `child` up to, but excluding, `ancestor`.
    ///
    /// Starts with `child` itself. `None` when `ancestor` is not above `child`.
    pub fn node_path(&self, child: WaypointId, ancestor: WaypointId) -> Option<Vec<WaypointId>> {
        self.find(child)?;
        let mut path = Vec::new();
        let mut current = Some(child);
        while let Some(id) = current {
            if id == ancestor {
                return Some(path);
            }
            path.push(id);
            current = self.parent(id);
        }
        None
    }

    /// True when both nodes hang under the same root.
    ///
    /// With a hierarchy built from connectivity this is a cheap
    /// "could a path exist" check; it does not run a search.
    pub fn has_path(&self, a: WaypointId, b: WaypointId) -> bool {
        match (self.root(a), self.root(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        }
    }
}
