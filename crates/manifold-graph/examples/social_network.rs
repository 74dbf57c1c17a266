//! Social Network Graph Example
//!
//! Demonstrates:
//! - Opening a directed, read-optimized graph on the Std representation
//! - Following/follower queries via `get_out_edges`/`get_in_edges`
//! - Removing a user and observing the cascade to their follows
//!
//! Models a Twitter-like network where users follow other users.

use manifold_graph::{Edge, Graph, GraphHandle, GraphOpts, GraphType};
use std::collections::HashMap;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Social Network Graph Example ===\n");

    let temp_dir = tempfile::tempdir()?;
    let opts = GraphOpts::builder("social_network")
        .db_dir(temp_dir.path().to_string_lossy().into_owned())
        .repr(GraphType::Std)
        .is_directed(true)
        .read_optimize(true)
        .build()?;
    let graph = Graph::open(opts)?;

    let mut usernames = HashMap::new();
    for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol"), (4, "dave")] {
        graph.add_node(id)?;
        usernames.insert(id, name);
    }

    // alice follows bob and carol; bob follows carol; dave follows alice.
    graph.add_edge(Edge::new(1, 2, 1), false)?;
    graph.add_edge(Edge::new(1, 3, 1), false)?;
    graph.add_edge(Edge::new(2, 3, 1), false)?;
    graph.add_edge(Edge::new(4, 1, 1), false)?;

    println!("alice follows:");
    for edge in graph.get_out_edges(1)? {
        println!("  -> {}", usernames[&edge.dst_id]);
    }

    println!("carol's followers:");
    for edge in graph.get_in_edges(3)? {
        println!("  <- {}", usernames[&edge.src_id]);
    }

    println!(
        "bob: in_degree={} out_degree={}",
        graph.get_in_degree(2)?,
        graph.get_out_degree(2)?
    );

    // Removing alice cascades to every edge she's part of, in either
    // direction.
    graph.delete_node(1)?;
    assert!(!graph.has_node(1)?);
    assert!(graph.get_out_edges(4)?.is_empty());
    println!(
        "\nafter removing alice, dave now follows nobody: {}",
        graph.get_out_edges(4)?.is_empty()
    );

    graph.close()?;
    Ok(())
}
