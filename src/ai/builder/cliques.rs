use smallvec::SmallVec;

use super::context::{BuildContext, Clique};

pub type Candidates = SmallVec<[usize; 16]>;

/// Unassigned neighbors of `node`, ascending.
pub fn find_candidates(ctx: &BuildContext, node: usize) -> Candidates {
    ctx.neighbors(node)
        .iter()
        .copied()
        .filter(|&n| !ctx.is_assigned(n))
        .collect()
}

/// Lexicographically first subset of `candidates` with `size` members that
/// are pairwise adjacent. `candidates` must be ascending.
pub fn find_clique(ctx: &BuildContext, candidates: &[usize], size: usize) -> Option<Clique> {
    if size == 0 {
        return Some(Clique::new());
    }
    let mut chosen = Clique::new();
    extend(ctx, candidates, 0, size, &mut chosen).then_some(chosen)
}

fn extend(ctx: &BuildContext, candidates: &[usize], start: usize, size: usize, chosen: &mut Clique) -> bool {
    if chosen.len() == size {
        return true;
    }
    let needed = size - chosen.len();
    if candidates.len() < start + needed {
        return false;
    }
    for i in start..=candidates.len() - needed {
        let c = candidates[i];
        if chosen.iter().all(|&m| ctx.adjacent(m, c)) {
            chosen.push(c);
            if extend(ctx, candidates, i + 1, size, chosen) {
                return true;
            }
            chosen.pop();
        }
    }
    false
}

/// One greedy sweep forming cliques of exactly `size` members.
///
/// Seeds are visited by ascending ID; each seed takes the first fitting set
/// of its unassigned neighbors. Returns how many cliques were formed.
pub fn create_all_n_cliques(ctx: &mut BuildContext, size: usize) -> usize {
    if size < 2 {
        return 0;
    }
    let mut formed = 0;
    for seed in 0..ctx.len() {
        if ctx.is_assigned(seed) {
            continue;
        }
        let candidates = find_candidates(ctx, seed);
        if candidates.len() < size - 1 {
            continue;
        }
        if let Some(mut clique) = find_clique(ctx, &candidates, size - 1) {
            clique.push(seed);
            ctx.commit(clique);
            formed += 1;
        }
    }
    formed
}

/// Every node still unassigned becomes a singleton, by ascending ID.
pub fn assign_remaining(ctx: &mut BuildContext) -> usize {
    let mut formed = 0;
    for node in 0..ctx.len() {
        if !ctx.is_assigned(node) {
            let mut single = Clique::new();
            single.push(node);
            ctx.commit(single);
            formed += 1;
        }
    }
    formed
}
