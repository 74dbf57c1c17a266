//! The graph contract common to every storage representation (§6).

use crate::iter::{EdgeCursor, InCursor, NodeCursor, OutCursor};
use crate::model::{Degree, Edge, Node, NodeId, Weight};
use crate::GraphResult;

/// The operations every storage representation (Std, Adj, EKey) supports.
///
/// [`crate::repr::Graph`] dispatches to one of three concrete
/// implementations of this trait rather than boxing a trait object, since
/// the set of representations is closed and known at compile time.
pub trait GraphHandle {
    /// Inserts a node with zero degrees. Idempotent: re-adding an existing
    /// node id is not an error (§7 "nodes are idempotent on existence").
    fn add_node(&self, id: NodeId) -> GraphResult<()>;

    /// True if a node with this id exists.
    fn has_node(&self, id: NodeId) -> GraphResult<bool>;

    /// Fetches a node by id. `NotFound` if absent.
    fn get_node(&self, id: NodeId) -> GraphResult<Node>;

    /// Returns an arbitrary existing node, for algorithms that need a seed
    /// vertex. `NotFound` on an empty graph.
    fn get_random_node(&self) -> GraphResult<Node>;

    /// Removes a node and cascades to every incident edge and any derived
    /// adjacency record (§3 Lifecycle).
    fn delete_node(&self, id: NodeId) -> GraphResult<()>;

    /// All nodes, in key order.
    fn get_nodes(&self) -> GraphResult<Vec<Node>>;

    /// Inserts (or overwrites) an edge. Endpoint nodes are created
    /// implicitly if absent. When `bulk` is set, the implementation may
    /// skip maintenance it would otherwise perform eagerly (secondary
    /// indices for Std/EKey, read-modify-write of adjacency records for
    /// Adj), trusting the caller to finish with `create_indices()` or
    /// pre-supplied adjacency lists (§4.2, §4.3 Bulk load mode).
    fn add_edge(&self, edge: Edge, bulk: bool) -> GraphResult<()>;

    /// True if an edge `u -> v` exists.
    fn has_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<bool>;

    /// Fetches an edge by endpoints. `NotFound` if absent.
    fn get_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<Edge>;

    /// Removes an edge (and its reverse, if undirected), decrementing
    /// endpoint degrees in lock-step when read-optimize is on.
    fn delete_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<()>;

    /// Overwrites the weight of an existing edge. `Unsupported` on an
    /// unweighted graph.
    fn update_edge_weight(&self, src: NodeId, dst: NodeId, weight: Weight) -> GraphResult<()>;

    /// Number of incoming edges. Authoritative only under read-optimize;
    /// otherwise derived by counting `get_in_edges`.
    fn get_in_degree(&self, id: NodeId) -> GraphResult<Degree>;

    /// Number of outgoing edges. Authoritative only under read-optimize;
    /// otherwise derived by counting `get_out_edges`.
    fn get_out_degree(&self, id: NodeId) -> GraphResult<Degree>;

    /// All edges with `dst = id`.
    fn get_in_edges(&self, id: NodeId) -> GraphResult<Vec<Edge>>;

    /// All edges with `src = id`.
    fn get_out_edges(&self, id: NodeId) -> GraphResult<Vec<Edge>>;

    /// Source vertex of every incoming edge.
    fn get_in_nodes(&self, id: NodeId) -> GraphResult<Vec<NodeId>>;

    /// Destination vertex of every outgoing edge.
    fn get_out_nodes(&self, id: NodeId) -> GraphResult<Vec<NodeId>>;

    /// Total node count.
    fn get_num_nodes(&self) -> GraphResult<u64>;

    /// Total edge count (directed rows; an undirected logical edge counts
    /// as two).
    fn get_num_edges(&self) -> GraphResult<u64>;

    /// A cursor sweeping every node in key order.
    fn get_node_iter(&self) -> GraphResult<NodeCursor>;

    /// A cursor sweeping every edge in `(src, dst)` order.
    fn get_edge_iter(&self) -> GraphResult<EdgeCursor>;

    /// A cursor sweeping per-vertex outgoing adjacency.
    fn get_outnbd_cursor(&self) -> GraphResult<OutCursor>;

    /// A cursor sweeping per-vertex incoming adjacency.
    fn get_innbd_cursor(&self) -> GraphResult<InCursor>;

    /// Builds the secondary indices deferred by `optimize_create` (§4.2
    /// Bulk load mode). A no-op for representations with nothing to defer.
    fn create_indices(&self) -> GraphResult<()>;

    /// Drops the secondary indices, e.g. before a fresh bulk load.
    fn drop_indices(&self) -> GraphResult<()>;

    /// Rebuilds cached degrees and adjacency records from the edge table,
    /// the sole authoritative source (§9 Cross-table atomicity).
    fn repair(&self) -> GraphResult<()>;

    /// Releases this handle's resources. The underlying connection stays
    /// open until every handle sharing it has been closed.
    fn close(self) -> GraphResult<()>;
}
