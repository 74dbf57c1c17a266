//! Knowledge Graph Example
//!
//! Demonstrates using manifold-graph to store a small movie knowledge graph
//! on the EKey representation, favored here for its minimal table count and
//! compact storage when most vertices have few relationships.
//!
//! - Weighted edges standing in for relationship strength/confidence
//! - Bulk loading followed by an explicit `create_indices()` pass

use manifold_graph::{Edge, Graph, GraphHandle, GraphOpts, GraphType};
use std::collections::HashMap;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Knowledge Graph Example ===\n");

    let temp_dir = tempfile::tempdir()?;
    let opts = GraphOpts::builder("knowledge_graph")
        .db_dir(temp_dir.path().to_string_lossy().into_owned())
        .repr(GraphType::EKey)
        .is_directed(true)
        .is_weighted(true)
        .optimize_create(true)
        .build()?;
    let graph = Graph::open(opts)?;

    let entities = [
        (1, "Denis Villeneuve"),
        (2, "Dune"),
        (3, "Dune: Part Two"),
        (4, "Legendary Pictures"),
    ];
    let mut names = HashMap::new();
    for (id, name) in entities {
        graph.add_node(id)?;
        names.insert(id, name);
    }

    // Bulk-load relationships without maintaining the dst index yet.
    graph.add_edge(Edge::new(1, 2, 10), true)?; // directed 10
    graph.add_edge(Edge::new(1, 3, 10), true)?; // directed 10
    graph.add_edge(Edge::new(4, 2, 8), true)?; // produced_by-ish, weight 8
    graph.add_edge(Edge::new(4, 3, 8), true)?;

    graph.create_indices()?;

    println!("films directed by Denis Villeneuve:");
    for edge in graph.get_out_edges(1)? {
        println!("  -> {} (confidence {})", names[&edge.dst_id], edge.weight);
    }

    println!("entities connected to Dune: Part Two:");
    for edge in graph.get_in_edges(3)? {
        println!("  <- {} (confidence {})", names[&edge.src_id], edge.weight);
    }

    graph.close()?;
    Ok(())
}
