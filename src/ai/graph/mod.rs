mod graph;
mod hierarchy;
mod abstract_edges;
mod persistence;


pub use graph::{GraphStats, SearchLevel, WaypointGraph};
pub use persistence::{load_graph, read_graph, save_graph, write_graph, GRAPH_FILE_VERSION};
