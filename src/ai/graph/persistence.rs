use bevy::prelude::*;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::ai::error::{GraphError, GraphResult};
use super::graph::WaypointGraph;

pub const GRAPH_FILE_VERSION: u32 = 2;

/// Writes a version header followed by the graph, zlib-compressed bincode.
pub fn write_graph<W: Write>(writer: W, graph: &WaypointGraph) -> GraphResult<()> {
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    bincode::serialize_into(&mut encoder, &GRAPH_FILE_VERSION)?;
    bincode::serialize_into(&mut encoder, graph)?;
    encoder.finish()?;
    Ok(())
}

pub fn read_graph<R: Read>(reader: R) -> GraphResult<WaypointGraph> {
    let mut decoder = ZlibDecoder::new(reader);
    let version: u32 = bincode::deserialize_from(&mut decoder)?;
    if version != GRAPH_FILE_VERSION {
        return Err(GraphError::UnsupportedVersion {
            found: version,
            expected: GRAPH_FILE_VERSION,
        });
    }
    let graph: WaypointGraph = bincode::deserialize_from(&mut decoder)?;
    Ok(graph)
}

pub fn save_graph(path: impl AsRef<Path>, graph: &WaypointGraph) -> GraphResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_graph(BufWriter::new(file), graph)?;
    info!("[GRAPH] Saved {} nodes to {}", graph.len(), path.display());
    Ok(())
}

pub fn load_graph(path: impl AsRef<Path>) -> GraphResult<WaypointGraph> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let graph = read_graph(BufReader::new(file))?;
    info!("[GRAPH] Loaded {} nodes from {}", graph.len(), path.display());
    Ok(graph)
}
