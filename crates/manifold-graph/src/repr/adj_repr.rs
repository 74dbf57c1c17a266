//! Adjacency-List representation: a node table plus packed per-vertex
//! in-/out-adjacency side tables (§4.3).

use std::collections::HashMap;

use manifold::{ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::codec::{IdKey, NeighborList};
use crate::error::{GraphError, GraphResult};
use crate::handle::GraphHandle;
use crate::iter::{EdgeCursor, InCursor, NodeCursor, OutCursor};
use crate::kvs::{tables, Connection};
use crate::model::{AdjList, Degree, Edge, KeyRange, Node, NodeId, Weight};
use crate::options::GraphOpts;

type NodeVal = (Degree, Degree);
type EdgeKey = (IdKey, IdKey);

fn node_def() -> TableDefinition<'static, IdKey, NodeVal> {
    TableDefinition::new(tables::NODE)
}
fn edge_def() -> TableDefinition<'static, EdgeKey, Weight> {
    TableDefinition::new(tables::EDGE)
}
fn out_adj_def() -> TableDefinition<'static, IdKey, NeighborList> {
    TableDefinition::new(tables::ADJLIST_OUT)
}
fn in_adj_def() -> TableDefinition<'static, IdKey, NeighborList> {
    TableDefinition::new(tables::ADJLIST_IN)
}

/// The Adjacency-List storage representation.
pub struct AdjGraph {
    conn: Connection,
    opts: GraphOpts,
}

impl AdjGraph {
    pub(crate) fn new(conn: Connection, opts: GraphOpts) -> Self {
        Self { conn, opts }
    }

    fn ensure_node(
        nodes: &mut manifold::Table<'_, IdKey, NodeVal>,
        out_adj: &mut manifold::Table<'_, IdKey, NeighborList>,
        in_adj: &mut manifold::Table<'_, IdKey, NeighborList>,
        id: NodeId,
    ) -> GraphResult<()> {
        if nodes.get(IdKey(id))?.is_none() {
            nodes.insert(IdKey(id), (0, 0))?;
            out_adj.insert(IdKey(id), NeighborList::default())?;
            in_adj.insert(IdKey(id), NeighborList::default())?;
        }
        Ok(())
    }

    fn bump_degree(
        table: &mut manifold::Table<'_, IdKey, NodeVal>,
        id: NodeId,
        delta_in: i64,
        delta_out: i64,
    ) -> GraphResult<()> {
        let (in_d, out_d) = table.get(IdKey(id))?.map(|g| g.value()).unwrap_or((0, 0));
        let new_in = (in_d as i64 + delta_in).max(0) as Degree;
        let new_out = (out_d as i64 + delta_out).max(0) as Degree;
        table.insert(IdKey(id), (new_in, new_out))?;
        Ok(())
    }

    fn append_neighbor(
        table: &mut manifold::Table<'_, IdKey, NeighborList>,
        id: NodeId,
        neighbor: NodeId,
    ) -> GraphResult<()> {
        let mut list = table
            .get(IdKey(id))?
            .map(|g| g.value())
            .unwrap_or_default();
        list.0.push(neighbor);
        table.insert(IdKey(id), list)?;
        Ok(())
    }

    fn remove_neighbor(
        table: &mut manifold::Table<'_, IdKey, NeighborList>,
        id: NodeId,
        neighbor: NodeId,
    ) -> GraphResult<()> {
        let mut list = table
            .get(IdKey(id))?
            .map(|g| g.value())
            .unwrap_or_default();
        if let Some(pos) = list.0.iter().position(|&n| n == neighbor) {
            list.0.remove(pos);
        }
        table.insert(IdKey(id), list)?;
        Ok(())
    }

    /// Bulk-loading entry point (§4.3 Bulk path): writes the node row and
    /// both packed adjacency lists directly from pre-supplied neighbor
    /// vectors, bypassing the read-modify-write `add_edge` performs.
    pub fn add_node_with_adjacency(
        &self,
        id: NodeId,
        in_neighbors: Vec<NodeId>,
        out_neighbors: Vec<NodeId>,
    ) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        {
            let mut nodes = txn.open_table(node_def())?;
            let in_degree = in_neighbors.len() as Degree;
            let out_degree = out_neighbors.len() as Degree;
            nodes.insert(IdKey(id), (in_degree, out_degree))?;
            let mut out_adj = txn.open_table(out_adj_def())?;
            let mut in_adj = txn.open_table(in_adj_def())?;
            out_adj.insert(IdKey(id), NeighborList::new(out_neighbors))?;
            in_adj.insert(IdKey(id), NeighborList::new(in_neighbors))?;
        }
        txn.commit()?;
        Ok(())
    }
}

impl GraphHandle for AdjGraph {
    fn add_node(&self, id: NodeId) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        {
            let mut nodes = txn.open_table(node_def())?;
            let mut out_adj = txn.open_table(out_adj_def())?;
            let mut in_adj = txn.open_table(in_adj_def())?;
            Self::ensure_node(&mut nodes, &mut out_adj, &mut in_adj, id)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn has_node(&self, id: NodeId) -> GraphResult<bool> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(node_def())?;
        Ok(table.get(IdKey(id))?.is_some())
    }

    fn get_node(&self, id: NodeId) -> GraphResult<Node> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(node_def())?;
        let (in_degree, out_degree) = table
            .get(IdKey(id))?
            .map(|g| g.value())
            .ok_or_else(|| GraphError::NotFound(format!("node {id}")))?;
        Ok(Node {
            id,
            in_degree,
            out_degree,
        })
    }

    fn get_random_node(&self) -> GraphResult<Node> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(node_def())?;
        let mut iter = table.iter()?;
        let (key_guard, val_guard) = iter
            .next()
            .ok_or_else(|| GraphError::NotFound("graph has no nodes".to_string()))??;
        let (in_degree, out_degree) = val_guard.value();
        Ok(Node {
            id: key_guard.value().0,
            in_degree,
            out_degree,
        })
    }

    fn delete_node(&self, id: NodeId) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        {
            let mut nodes = txn.open_table(node_def())?;
            let mut out_adj = txn.open_table(out_adj_def())?;
            let mut in_adj = txn.open_table(in_adj_def())?;
            let mut edges = txn.open_table(edge_def())?;

            let out_neighbors = out_adj
                .get(IdKey(id))?
                .map(|g| g.value().into_inner())
                .unwrap_or_default();
            let in_neighbors = in_adj
                .get(IdKey(id))?
                .map(|g| g.value().into_inner())
                .unwrap_or_default();

            for &m in &out_neighbors {
                Self::remove_neighbor(&mut in_adj, m, id)?;
                edges.remove((IdKey(id), IdKey(m)))?;
                if self.opts.read_optimize && m != id {
                    Self::bump_degree(&mut nodes, m, -1, 0)?;
                }
            }
            for &m in &in_neighbors {
                Self::remove_neighbor(&mut out_adj, m, id)?;
                edges.remove((IdKey(m), IdKey(id)))?;
                if self.opts.read_optimize && m != id {
                    Self::bump_degree(&mut nodes, m, 0, -1)?;
                }
            }

            out_adj.remove(IdKey(id))?;
            in_adj.remove(IdKey(id))?;
            nodes.remove(IdKey(id))?;
        }
        txn.commit()?;
        Ok(())
    }

    fn get_nodes(&self) -> GraphResult<Vec<Node>> {
        self.get_node_iter()?.collect()
    }

    fn add_edge(&self, edge: Edge, bulk: bool) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        {
            let mut nodes = txn.open_table(node_def())?;
            let mut out_adj = txn.open_table(out_adj_def())?;
            let mut in_adj = txn.open_table(in_adj_def())?;
            if !bulk {
                Self::ensure_node(&mut nodes, &mut out_adj, &mut in_adj, edge.src_id)?;
                Self::ensure_node(&mut nodes, &mut out_adj, &mut in_adj, edge.dst_id)?;
            }

            let weight = if self.opts.is_weighted { edge.weight } else { 0 };
            let mut edges = txn.open_table(edge_def())?;
            edges.insert((IdKey(edge.src_id), IdKey(edge.dst_id)), weight)?;
            if !self.opts.is_directed {
                edges.insert((IdKey(edge.dst_id), IdKey(edge.src_id)), weight)?;
            }

            if !bulk {
                Self::append_neighbor(&mut out_adj, edge.src_id, edge.dst_id)?;
                Self::append_neighbor(&mut in_adj, edge.dst_id, edge.src_id)?;
                if !self.opts.is_directed {
                    Self::append_neighbor(&mut out_adj, edge.dst_id, edge.src_id)?;
                    Self::append_neighbor(&mut in_adj, edge.src_id, edge.dst_id)?;
                }
                if self.opts.read_optimize {
                    Self::bump_degree(&mut nodes, edge.src_id, 0, 1)?;
                    Self::bump_degree(&mut nodes, edge.dst_id, 1, 0)?;
                    if !self.opts.is_directed {
                        Self::bump_degree(&mut nodes, edge.dst_id, 0, 1)?;
                        Self::bump_degree(&mut nodes, edge.src_id, 1, 0)?;
                    }
                }
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn has_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<bool> {
        let txn = self.conn.cf().begin_read()?;
        let edges = txn.open_table(edge_def())?;
        Ok(edges.get((IdKey(src), IdKey(dst)))?.is_some())
    }

    fn get_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<Edge> {
        let txn = self.conn.cf().begin_read()?;
        let edges = txn.open_table(edge_def())?;
        let weight = edges
            .get((IdKey(src), IdKey(dst)))?
            .map(|g| g.value())
            .ok_or_else(|| GraphError::NotFound(format!("edge {src}->{dst}")))?;
        Ok(Edge::new(src, dst, weight))
    }

    fn delete_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        {
            let mut edges = txn.open_table(edge_def())?;
            if edges.remove((IdKey(src), IdKey(dst)))?.is_none() {
                return Err(GraphError::NotFound(format!("edge {src}->{dst}")));
            }
            let mut out_adj = txn.open_table(out_adj_def())?;
            let mut in_adj = txn.open_table(in_adj_def())?;
            let mut nodes = txn.open_table(node_def())?;
            Self::remove_neighbor(&mut out_adj, src, dst)?;
            Self::remove_neighbor(&mut in_adj, dst, src)?;
            if self.opts.read_optimize {
                Self::bump_degree(&mut nodes, src, 0, -1)?;
                Self::bump_degree(&mut nodes, dst, -1, 0)?;
            }
            if !self.opts.is_directed {
                edges.remove((IdKey(dst), IdKey(src)))?;
                Self::remove_neighbor(&mut out_adj, dst, src)?;
                Self::remove_neighbor(&mut in_adj, src, dst)?;
                if self.opts.read_optimize {
                    Self::bump_degree(&mut nodes, dst, 0, -1)?;
                    Self::bump_degree(&mut nodes, src, -1, 0)?;
                }
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn update_edge_weight(&self, src: NodeId, dst: NodeId, weight: Weight) -> GraphResult<()> {
        if !self.opts.is_weighted {
            return Err(GraphError::Unsupported(
                "update_edge_weight on an unweighted graph".to_string(),
            ));
        }
        let txn = self.conn.cf().begin_write()?;
        {
            let mut edges = txn.open_table(edge_def())?;
            if edges.get((IdKey(src), IdKey(dst)))?.is_none() {
                return Err(GraphError::NotFound(format!("edge {src}->{dst}")));
            }
            edges.insert((IdKey(src), IdKey(dst)), weight)?;
            if !self.opts.is_directed {
                edges.insert((IdKey(dst), IdKey(src)), weight)?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn get_in_degree(&self, id: NodeId) -> GraphResult<Degree> {
        if self.opts.read_optimize {
            Ok(self.get_node(id)?.in_degree)
        } else {
            Ok(self.get_in_nodes(id)?.len() as Degree)
        }
    }

    fn get_out_degree(&self, id: NodeId) -> GraphResult<Degree> {
        if self.opts.read_optimize {
            Ok(self.get_node(id)?.out_degree)
        } else {
            Ok(self.get_out_nodes(id)?.len() as Degree)
        }
    }

    fn get_in_edges(&self, id: NodeId) -> GraphResult<Vec<Edge>> {
        let txn = self.conn.cf().begin_read()?;
        let in_adj = txn.open_table(in_adj_def())?;
        let edges = txn.open_table(edge_def())?;
        let neighbors = in_adj
            .get(IdKey(id))?
            .map(|g| g.value().into_inner())
            .unwrap_or_default();
        let mut out = Vec::with_capacity(neighbors.len());
        for m in neighbors {
            let weight = edges.get((IdKey(m), IdKey(id)))?.map(|g| g.value()).unwrap_or(0);
            out.push(Edge::new(m, id, weight));
        }
        Ok(out)
    }

    fn get_out_edges(&self, id: NodeId) -> GraphResult<Vec<Edge>> {
        let txn = self.conn.cf().begin_read()?;
        let out_adj = txn.open_table(out_adj_def())?;
        let edges = txn.open_table(edge_def())?;
        let neighbors = out_adj
            .get(IdKey(id))?
            .map(|g| g.value().into_inner())
            .unwrap_or_default();
        let mut out = Vec::with_capacity(neighbors.len());
        for m in neighbors {
            let weight = edges.get((IdKey(id), IdKey(m)))?.map(|g| g.value()).unwrap_or(0);
            out.push(Edge::new(id, m, weight));
        }
        Ok(out)
    }

    fn get_in_nodes(&self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        let txn = self.conn.cf().begin_read()?;
        let in_adj = txn.open_table(in_adj_def())?;
        Ok(in_adj
            .get(IdKey(id))?
            .map(|g| g.value().into_inner())
            .unwrap_or_default())
    }

    fn get_out_nodes(&self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        let txn = self.conn.cf().begin_read()?;
        let out_adj = txn.open_table(out_adj_def())?;
        Ok(out_adj
            .get(IdKey(id))?
            .map(|g| g.value().into_inner())
            .unwrap_or_default())
    }

    fn get_num_nodes(&self) -> GraphResult<u64> {
        let txn = self.conn.cf().begin_read()?;
        Ok(txn.open_table(node_def())?.len()?)
    }

    fn get_num_edges(&self) -> GraphResult<u64> {
        let txn = self.conn.cf().begin_read()?;
        Ok(txn.open_table(edge_def())?.len()?)
    }

    fn get_node_iter(&self) -> GraphResult<NodeCursor> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(node_def())?;
        Ok(NodeCursor::Adj(AdjNodeCursor::new(table, KeyRange::full())))
    }

    fn get_edge_iter(&self) -> GraphResult<EdgeCursor> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(edge_def())?;
        Ok(EdgeCursor::Adj(AdjEdgeCursor::new(table, KeyRange::full())))
    }

    fn get_outnbd_cursor(&self) -> GraphResult<OutCursor> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(out_adj_def())?;
        Ok(OutCursor::Adj(AdjOutCursor::new(table, KeyRange::full())))
    }

    fn get_innbd_cursor(&self) -> GraphResult<InCursor> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(in_adj_def())?;
        Ok(InCursor::Adj(AdjInCursor::new(table, KeyRange::full())))
    }

    /// Rebuilds the node table, `in_adj`/`out_adj`, and cached degrees from
    /// the edge table, the sole authoritative source. Shared by
    /// `create_indices` (closing out a bulk load that skipped per-edge
    /// adjacency maintenance) and `repair` (recovering from a crash
    /// mid-transaction).
    fn rebuild_from_edges(&self) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        {
            let edges = txn.open_table(edge_def())?;
            let mut out_lists: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
            let mut in_lists: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
            let mut iter = edges.iter()?;
            while let Some(entry) = iter.next() {
                let (key_guard, _) = entry?;
                let (src, dst) = key_guard.value();
                out_lists.entry(src.0).or_default().push(dst.0);
                in_lists.entry(dst.0).or_default().push(src.0);
            }
            let mut out_adj = txn.open_table(out_adj_def())?;
            let mut in_adj = txn.open_table(in_adj_def())?;
            let mut nodes = txn.open_table(node_def())?;
            let mut ids: Vec<NodeId> = Vec::new();
            {
                let mut iter = nodes.iter()?;
                while let Some(entry) = iter.next() {
                    let (key_guard, _) = entry?;
                    ids.push(key_guard.value().0);
                }
            }
            // A bulk load (`add_edge(.., bulk = true)`) skips `ensure_node`
            // entirely, so endpoints may be absent from the node table even
            // though they have edge rows; pick those up too.
            let mut seen: std::collections::HashSet<NodeId> = ids.iter().copied().collect();
            for id in out_lists.keys().chain(in_lists.keys()) {
                if seen.insert(*id) {
                    ids.push(*id);
                }
            }
            for id in ids {
                let out_list = out_lists.remove(&id).unwrap_or_default();
                let in_list = in_lists.remove(&id).unwrap_or_default();
                if self.opts.read_optimize {
                    nodes.insert(IdKey(id), (in_list.len() as Degree, out_list.len() as Degree))?;
                } else if nodes.get(IdKey(id))?.is_none() {
                    nodes.insert(IdKey(id), (0, 0))?;
                }
                out_adj.insert(IdKey(id), NeighborList::new(out_list))?;
                in_adj.insert(IdKey(id), NeighborList::new(in_list))?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn create_indices(&self) -> GraphResult<()> {
        #[cfg(feature = "logging")]
        log::info!(
            "building adjacency lists for '{}' (adj, bulk load)",
            self.opts.db_name
        );
        self.rebuild_from_edges()
    }

    fn drop_indices(&self) -> GraphResult<()> {
        Ok(())
    }

    fn repair(&self) -> GraphResult<()> {
        #[cfg(feature = "logging")]
        log::info!("rebuilding adjacency lists for '{}' (adj)", self.opts.db_name);
        self.rebuild_from_edges()
    }

    fn close(self) -> GraphResult<()> {
        self.conn.checkpoint()
    }
}

/// Sweeps every node in key order.
pub struct AdjNodeCursor {
    table: manifold::ReadOnlyTable<IdKey, NodeVal>,
    cursor: NodeId,
    range: KeyRange,
    done: bool,
}

impl AdjNodeCursor {
    fn new(table: manifold::ReadOnlyTable<IdKey, NodeVal>, range: KeyRange) -> Self {
        Self {
            table,
            cursor: range.start,
            range,
            done: false,
        }
    }

    pub(crate) fn set_key_range(&mut self, range: KeyRange) {
        self.range = range;
        self.cursor = range.start;
        self.done = false;
    }
}

impl Iterator for AdjNodeCursor {
    type Item = GraphResult<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cursor >= self.range.end {
            self.done = true;
            return None;
        }
        let mut range = match self.table.range(IdKey(self.cursor)..IdKey(self.range.end)) {
            Ok(r) => r,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        match range.next() {
            Some(Ok((key_guard, val_guard))) => {
                let id = key_guard.value().0;
                self.cursor = id.saturating_add(1);
                let (in_degree, out_degree) = val_guard.value();
                Some(Ok(Node {
                    id,
                    in_degree,
                    out_degree,
                }))
            }
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e.into()))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Sweeps the edge table directly; already `(src, dst)`-ordered.
pub struct AdjEdgeCursor {
    table: manifold::ReadOnlyTable<EdgeKey, Weight>,
    cursor: (NodeId, NodeId),
    range: KeyRange,
    done: bool,
}

impl AdjEdgeCursor {
    fn new(table: manifold::ReadOnlyTable<EdgeKey, Weight>, range: KeyRange) -> Self {
        Self {
            table,
            cursor: (range.start, 0),
            range,
            done: false,
        }
    }

    pub(crate) fn set_key_range(&mut self, range: KeyRange) {
        self.range = range;
        self.cursor = (range.start, 0);
        self.done = false;
    }
}

impl Iterator for AdjEdgeCursor {
    type Item = GraphResult<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let start = (IdKey(self.cursor.0), IdKey(self.cursor.1));
        let end = (IdKey(self.range.end), IdKey(0));
        let mut range = match self.table.range(start..end) {
            Ok(r) => r,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        match range.next() {
            Some(Ok((key_guard, val_guard))) => {
                let (src, dst) = key_guard.value();
                self.cursor = (src.0, dst.0.saturating_add(1));
                Some(Ok(Edge::new(src.0, dst.0, val_guard.value())))
            }
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e.into()))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Sweeps the out-adjacency side table, skipping vertices with no
/// outgoing edges (§4.5 "next node with outgoing edges in range").
pub struct AdjOutCursor {
    table: manifold::ReadOnlyTable<IdKey, NeighborList>,
    cursor: NodeId,
    range: KeyRange,
    done: bool,
}

impl AdjOutCursor {
    fn new(table: manifold::ReadOnlyTable<IdKey, NeighborList>, range: KeyRange) -> Self {
        Self {
            table,
            cursor: range.start,
            range,
            done: false,
        }
    }

    pub(crate) fn set_key_range(&mut self, range: KeyRange) {
        self.range = range;
        self.cursor = range.start;
        self.done = false;
    }

    /// Positions at a specific vertex and returns its adjacency directly.
    pub fn seek(&mut self, node_id: NodeId) -> GraphResult<AdjList> {
        let neighbors = self
            .table
            .get(IdKey(node_id))?
            .map(|g| g.value().into_inner())
            .unwrap_or_default();
        Ok(AdjList::from_neighbors(node_id, neighbors))
    }
}

impl Iterator for AdjOutCursor {
    type Item = GraphResult<AdjList>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done || self.cursor >= self.range.end {
                self.done = true;
                return None;
            }
            let mut range = match self.table.range(IdKey(self.cursor)..IdKey(self.range.end)) {
                Ok(r) => r,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };
            match range.next() {
                Some(Ok((key_guard, val_guard))) => {
                    let id = key_guard.value().0;
                    self.cursor = id.saturating_add(1);
                    let neighbors = val_guard.value().into_inner();
                    if neighbors.is_empty() {
                        continue;
                    }
                    return Some(Ok(AdjList::from_neighbors(id, neighbors)));
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

/// Dual of [`AdjOutCursor`] over the in-adjacency side table.
pub struct AdjInCursor {
    table: manifold::ReadOnlyTable<IdKey, NeighborList>,
    cursor: NodeId,
    range: KeyRange,
    done: bool,
}

impl AdjInCursor {
    fn new(table: manifold::ReadOnlyTable<IdKey, NeighborList>, range: KeyRange) -> Self {
        Self {
            table,
            cursor: range.start,
            range,
            done: false,
        }
    }

    pub(crate) fn set_key_range(&mut self, range: KeyRange) {
        self.range = range;
        self.cursor = range.start;
        self.done = false;
    }

    /// Positions at a specific vertex and returns its incoming adjacency.
    pub fn seek(&mut self, node_id: NodeId) -> GraphResult<AdjList> {
        let neighbors = self
            .table
            .get(IdKey(node_id))?
            .map(|g| g.value().into_inner())
            .unwrap_or_default();
        Ok(AdjList::from_neighbors(node_id, neighbors))
    }
}

impl Iterator for AdjInCursor {
    type Item = GraphResult<AdjList>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done || self.cursor >= self.range.end {
                self.done = true;
                return None;
            }
            let mut range = match self.table.range(IdKey(self.cursor)..IdKey(self.range.end)) {
                Ok(r) => r,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };
            match range.next() {
                Some(Ok((key_guard, val_guard))) => {
                    let id = key_guard.value().0;
                    self.cursor = id.saturating_add(1);
                    let neighbors = val_guard.value().into_inner();
                    if neighbors.is_empty() {
                        continue;
                    }
                    return Some(Ok(AdjList::from_neighbors(id, neighbors)));
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}
