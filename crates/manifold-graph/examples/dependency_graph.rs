//! Dependency Graph Example
//!
//! Demonstrates using manifold-graph for build-system/package-management
//! dependency tracking with:
//! - The Adj representation, tuned for repeated neighborhood traversal
//! - Topological-order-friendly queries via `get_out_nodes`/`get_in_nodes`
//! - Detecting packages with no remaining dependents before removal

use manifold_graph::{Edge, Graph, GraphHandle, GraphOpts, GraphType};
use std::collections::HashMap;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Dependency Graph Example ===\n");

    let temp_dir = tempfile::tempdir()?;
    let opts = GraphOpts::builder("dependency_graph")
        .db_dir(temp_dir.path().to_string_lossy().into_owned())
        .repr(GraphType::Adj)
        .is_directed(true)
        .build()?;
    let graph = Graph::open(opts)?;

    let packages = [(1, "app"), (2, "http"), (3, "tls"), (4, "rand"), (5, "core")];
    let mut names = HashMap::new();
    for (id, name) in packages {
        graph.add_node(id)?;
        names.insert(id, name);
    }

    // app depends on http and rand; http depends on tls; tls and rand both
    // depend on core.
    for (from, to) in [(1, 2), (1, 4), (2, 3), (3, 5), (4, 5)] {
        graph.add_edge(Edge::new(from, to, 1), false)?;
    }

    println!("direct dependencies of app:");
    for dep in graph.get_out_nodes(1)? {
        println!("  -> {}", names[&dep]);
    }

    println!("packages depending on core:");
    for dep in graph.get_in_nodes(5)? {
        println!("  <- {}", names[&dep]);
    }

    // A package can be safely removed once nothing depends on it anymore.
    let safe_to_remove: Vec<_> = names
        .keys()
        .copied()
        .filter(|&id| graph.get_in_degree(id).unwrap_or(1) == 0)
        .collect();
    println!(
        "\npackages nothing depends on: {:?}",
        safe_to_remove
            .iter()
            .map(|id| names[id])
            .collect::<Vec<_>>()
    );

    graph.close()?;
    Ok(())
}
