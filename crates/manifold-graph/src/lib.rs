//! # manifold-graph
//!
//! A multi-representation graph storage engine built on Manifold's
//! column-family KVS.
//!
//! Three physical representations share one [`GraphHandle`] contract:
//!
//! - **Std** — separate node/edge tables plus src/dst secondary indices,
//!   tuned for write-heavy workloads that can defer index maintenance.
//! - **Adj** — a node table plus packed in-/out-adjacency side tables,
//!   tuned for read-heavy neighborhood traversal.
//! - **EKey** — a single `(src, dst)`-keyed table with a sentinel row
//!   standing in for each vertex's own record, tuned for minimal table
//!   count and compact storage.
//!
//! [`GraphEngine`] opens the shared KVS connection for a graph and hands
//! out per-worker handles, computing key-space partitions for parallel
//! read-only scans.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use manifold_graph::{Edge, GraphHandle, GraphOpts, GraphType, Graph};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let opts = GraphOpts::builder("social")
//!     .db_dir("/tmp/graphs")
//!     .repr(GraphType::Std)
//!     .is_directed(true)
//!     .build()?;
//! let graph = Graph::open(opts)?;
//!
//! graph.add_edge(Edge::new(1, 2, 1), false)?;
//! assert!(graph.has_edge(1, 2)?);
//!
//! for edge in graph.get_edge_iter()? {
//!     let edge = edge?;
//!     println!("{} -> {} (w={})", edge.src_id, edge.dst_id, edge.weight);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! This crate does not implement graph algorithms (BFS, DFS, PageRank,
//! etc.) — it focuses on efficient storage of nodes and edges and exposes
//! iteration primitives ([`NodeCursor`], [`EdgeCursor`], [`OutCursor`],
//! [`InCursor`]) for external graph-algorithm libraries to consume.

#![deny(missing_docs)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod codec;
pub mod engine;
pub mod error;
pub mod handle;
pub mod iter;
pub mod kvs;
pub mod model;
pub mod options;
pub mod repr;

pub use engine::GraphEngine;
pub use error::{GraphError, GraphResult};
pub use handle::GraphHandle;
pub use iter::{EdgeCursor, InCursor, NodeCursor, OutCursor};
pub use model::{AdjList, Degree, Edge, EdgeRange, KeyRange, Node, NodeId, Weight, SENTINEL};
pub use options::{GraphOpts, GraphOptsBuilder, GraphType};
pub use repr::Graph;
