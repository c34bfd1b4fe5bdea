mod builder;
mod cliques;
mod context;


pub use builder::{BuildReport, BuildStop, BuilderConfig, LevelOutcome, WaypointGraphBuilder};
pub use cliques::{assign_remaining, create_all_n_cliques, find_candidates, find_clique};
pub use context::{BuildContext, Clique};
