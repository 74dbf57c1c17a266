//! The three physical storage representations and the enum that dispatches
//! between them (§4).

pub mod adj_repr;
pub mod ekey_repr;
pub mod std_repr;

use crate::error::GraphResult;
use crate::handle::GraphHandle;
use crate::iter::{EdgeCursor, InCursor, NodeCursor, OutCursor};
use crate::kvs::{check_compatible, open_connection, read_metadata, write_metadata, Connection};
use crate::model::{Degree, Edge, Node, NodeId, Weight};
use crate::options::{GraphOpts, GraphType};

use adj_repr::AdjGraph;
use ekey_repr::EKeyGraph;
use std_repr::StdGraph;

/// A graph instance, backing onto one of the three physical representations
/// chosen at creation time via [`GraphOpts::repr`].
///
/// Dispatches by `match` rather than a boxed trait object: the set of
/// representations is closed and known at compile time, so there is no
/// value in erasing it (§4 "exactly one of the three").
pub enum Graph {
    /// Separate node/edge tables plus secondary indices (§4.2).
    Std(StdGraph),
    /// Node table plus packed adjacency side tables (§4.3).
    Adj(AdjGraph),
    /// Single `(src, dst)`-keyed table with a sentinel node row (§4.4).
    EKey(EKeyGraph),
}

impl Graph {
    /// Opens a graph at `opts.path()`, creating it fresh or restoring an
    /// existing one depending on `opts.create_new` (§3 Lifecycle).
    pub fn open(opts: GraphOpts) -> GraphResult<Self> {
        let conn = open_connection(&opts)?;

        if opts.create_new {
            let txn = conn.cf().begin_write()?;
            write_metadata(&txn, &opts)?;
            txn.commit()?;
        } else {
            let txn = conn.cf().begin_read()?;
            let stored = read_metadata(&txn)?;
            check_compatible(&stored, &opts)?;
        }

        Ok(Self::from_parts(conn, opts))
    }

    fn from_parts(conn: Connection, opts: GraphOpts) -> Self {
        match opts.repr {
            GraphType::Std => Self::Std(StdGraph::new(conn, opts)),
            GraphType::Adj => Self::Adj(AdjGraph::new(conn, opts)),
            GraphType::EKey => Self::EKey(EKeyGraph::new(conn, opts)),
        }
    }

    /// Builds a handle onto an already-open connection, skipping the
    /// metadata check `open` performs — used by [`crate::engine::GraphEngine`]
    /// to hand out one handle per worker against a connection it already
    /// validated (§4.6 "per-worker handles share the connection").
    pub(crate) fn from_connection(conn: Connection, opts: GraphOpts) -> Self {
        Self::from_parts(conn, opts)
    }

    /// Adjacency-only bulk-loading entry point (§4.3 Bulk path). `Unsupported`
    /// on any representation other than Adj.
    pub fn add_node_with_adjacency(
        &self,
        id: NodeId,
        in_neighbors: Vec<NodeId>,
        out_neighbors: Vec<NodeId>,
    ) -> GraphResult<()> {
        match self {
            Self::Adj(g) => g.add_node_with_adjacency(id, in_neighbors, out_neighbors),
            _ => Err(crate::error::GraphError::Unsupported(
                "add_node_with_adjacency is only available on the Adj representation".to_string(),
            )),
        }
    }
}

impl GraphHandle for Graph {
    fn add_node(&self, id: NodeId) -> GraphResult<()> {
        match self {
            Self::Std(g) => g.add_node(id),
            Self::Adj(g) => g.add_node(id),
            Self::EKey(g) => g.add_node(id),
        }
    }

    fn has_node(&self, id: NodeId) -> GraphResult<bool> {
        match self {
            Self::Std(g) => g.has_node(id),
            Self::Adj(g) => g.has_node(id),
            Self::EKey(g) => g.has_node(id),
        }
    }

    fn get_node(&self, id: NodeId) -> GraphResult<Node> {
        match self {
            Self::Std(g) => g.get_node(id),
            Self::Adj(g) => g.get_node(id),
            Self::EKey(g) => g.get_node(id),
        }
    }

    fn get_random_node(&self) -> GraphResult<Node> {
        match self {
            Self::Std(g) => g.get_random_node(),
            Self::Adj(g) => g.get_random_node(),
            Self::EKey(g) => g.get_random_node(),
        }
    }

    fn delete_node(&self, id: NodeId) -> GraphResult<()> {
        match self {
            Self::Std(g) => g.delete_node(id),
            Self::Adj(g) => g.delete_node(id),
            Self::EKey(g) => g.delete_node(id),
        }
    }

    fn get_nodes(&self) -> GraphResult<Vec<Node>> {
        match self {
            Self::Std(g) => g.get_nodes(),
            Self::Adj(g) => g.get_nodes(),
            Self::EKey(g) => g.get_nodes(),
        }
    }

    fn add_edge(&self, edge: Edge, bulk: bool) -> GraphResult<()> {
        match self {
            Self::Std(g) => g.add_edge(edge, bulk),
            Self::Adj(g) => g.add_edge(edge, bulk),
            Self::EKey(g) => g.add_edge(edge, bulk),
        }
    }

    fn has_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<bool> {
        match self {
            Self::Std(g) => g.has_edge(src, dst),
            Self::Adj(g) => g.has_edge(src, dst),
            Self::EKey(g) => g.has_edge(src, dst),
        }
    }

    fn get_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<Edge> {
        match self {
            Self::Std(g) => g.get_edge(src, dst),
            Self::Adj(g) => g.get_edge(src, dst),
            Self::EKey(g) => g.get_edge(src, dst),
        }
    }

    fn delete_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<()> {
        match self {
            Self::Std(g) => g.delete_edge(src, dst),
            Self::Adj(g) => g.delete_edge(src, dst),
            Self::EKey(g) => g.delete_edge(src, dst),
        }
    }

    fn update_edge_weight(&self, src: NodeId, dst: NodeId, weight: Weight) -> GraphResult<()> {
        match self {
            Self::Std(g) => g.update_edge_weight(src, dst, weight),
            Self::Adj(g) => g.update_edge_weight(src, dst, weight),
            Self::EKey(g) => g.update_edge_weight(src, dst, weight),
        }
    }

    fn get_in_degree(&self, id: NodeId) -> GraphResult<Degree> {
        match self {
            Self::Std(g) => g.get_in_degree(id),
            Self::Adj(g) => g.get_in_degree(id),
            Self::EKey(g) => g.get_in_degree(id),
        }
    }

    fn get_out_degree(&self, id: NodeId) -> GraphResult<Degree> {
        match self {
            Self::Std(g) => g.get_out_degree(id),
            Self::Adj(g) => g.get_out_degree(id),
            Self::EKey(g) => g.get_out_degree(id),
        }
    }

    fn get_in_edges(&self, id: NodeId) -> GraphResult<Vec<Edge>> {
        match self {
            Self::Std(g) => g.get_in_edges(id),
            Self::Adj(g) => g.get_in_edges(id),
            Self::EKey(g) => g.get_in_edges(id),
        }
    }

    fn get_out_edges(&self, id: NodeId) -> GraphResult<Vec<Edge>> {
        match self {
            Self::Std(g) => g.get_out_edges(id),
            Self::Adj(g) => g.get_out_edges(id),
            Self::EKey(g) => g.get_out_edges(id),
        }
    }

    fn get_in_nodes(&self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        match self {
            Self::Std(g) => g.get_in_nodes(id),
            Self::Adj(g) => g.get_in_nodes(id),
            Self::EKey(g) => g.get_in_nodes(id),
        }
    }

    fn get_out_nodes(&self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        match self {
            Self::Std(g) => g.get_out_nodes(id),
            Self::Adj(g) => g.get_out_nodes(id),
            Self::EKey(g) => g.get_out_nodes(id),
        }
    }

    fn get_num_nodes(&self) -> GraphResult<u64> {
        match self {
            Self::Std(g) => g.get_num_nodes(),
            Self::Adj(g) => g.get_num_nodes(),
            Self::EKey(g) => g.get_num_nodes(),
        }
    }

    fn get_num_edges(&self) -> GraphResult<u64> {
        match self {
            Self::Std(g) => g.get_num_edges(),
            Self::Adj(g) => g.get_num_edges(),
            Self::EKey(g) => g.get_num_edges(),
        }
    }

    fn get_node_iter(&self) -> GraphResult<NodeCursor> {
        match self {
            Self::Std(g) => g.get_node_iter(),
            Self::Adj(g) => g.get_node_iter(),
            Self::EKey(g) => g.get_node_iter(),
        }
    }

    fn get_edge_iter(&self) -> GraphResult<EdgeCursor> {
        match self {
            Self::Std(g) => g.get_edge_iter(),
            Self::Adj(g) => g.get_edge_iter(),
            Self::EKey(g) => g.get_edge_iter(),
        }
    }

    fn get_outnbd_cursor(&self) -> GraphResult<OutCursor> {
        match self {
            Self::Std(g) => g.get_outnbd_cursor(),
            Self::Adj(g) => g.get_outnbd_cursor(),
            Self::EKey(g) => g.get_outnbd_cursor(),
        }
    }

    fn get_innbd_cursor(&self) -> GraphResult<InCursor> {
        match self {
            Self::Std(g) => g.get_innbd_cursor(),
            Self::Adj(g) => g.get_innbd_cursor(),
            Self::EKey(g) => g.get_innbd_cursor(),
        }
    }

    fn create_indices(&self) -> GraphResult<()> {
        match self {
            Self::Std(g) => g.create_indices(),
            Self::Adj(g) => g.create_indices(),
            Self::EKey(g) => g.create_indices(),
        }
    }

    fn drop_indices(&self) -> GraphResult<()> {
        match self {
            Self::Std(g) => g.drop_indices(),
            Self::Adj(g) => g.drop_indices(),
            Self::EKey(g) => g.drop_indices(),
        }
    }

    fn repair(&self) -> GraphResult<()> {
        match self {
            Self::Std(g) => g.repair(),
            Self::Adj(g) => g.repair(),
            Self::EKey(g) => g.repair(),
        }
    }

    fn close(self) -> GraphResult<()> {
        match self {
            Self::Std(g) => g.close(),
            Self::Adj(g) => g.close(),
            Self::EKey(g) => g.close(),
        }
    }
}
