//! Standard representation: separate node/edge tables plus src/dst
//! secondary indices (§4.2).

use manifold::{ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::codec::IdKey;
use crate::error::{GraphError, GraphResult};
use crate::handle::GraphHandle;
use crate::iter::{EdgeCursor, InCursor, NodeCursor, OutCursor};
use crate::kvs::{next_edge_id, tables, Connection};
use crate::model::{AdjList, Degree, Edge, KeyRange, Node, NodeId, Weight};
use crate::options::GraphOpts;

type NodeVal = (Degree, Degree);
type EdgeVal = (IdKey, IdKey, Weight);
type IndexKey = (IdKey, IdKey);

fn node_def() -> TableDefinition<'static, IdKey, NodeVal> {
    TableDefinition::new(tables::NODE)
}
fn edge_def() -> TableDefinition<'static, IdKey, EdgeVal> {
    TableDefinition::new(tables::EDGE)
}
fn ix_src_def() -> TableDefinition<'static, IndexKey, ()> {
    TableDefinition::new(tables::IX_EDGE_SRC)
}
fn ix_dst_def() -> TableDefinition<'static, IndexKey, ()> {
    TableDefinition::new(tables::IX_EDGE_DST)
}

/// Finds the edge id of the `u -> v` row, scanning the src index. Works
/// against either a live `Table` (inside a write transaction) or a
/// `ReadOnlyTable`, since both implement `ReadableTable`.
fn find_edge_id<TIx, TEdge>(
    ix: &TIx,
    edges: &TEdge,
    u: NodeId,
    v: NodeId,
) -> GraphResult<Option<(NodeId, Weight)>>
where
    TIx: ReadableTable<IndexKey, ()>,
    TEdge: ReadableTable<IdKey, EdgeVal>,
{
    let start = (IdKey(u), IdKey(0));
    let end = (IdKey(u), IdKey(NodeId::MAX));
    let mut range = ix.range(start..=end)?;
    while let Some(entry) = range.next() {
        let (key_guard, _) = entry?;
        let (_, edge_id) = key_guard.value();
        if let Some(guard) = edges.get(edge_id)? {
            let (_, dst, weight) = guard.value();
            if dst.0 == v {
                return Ok(Some((edge_id.0, weight)));
            }
        }
    }
    Ok(None)
}

/// The Standard storage representation.
pub struct StdGraph {
    conn: Connection,
    opts: GraphOpts,
}

impl StdGraph {
    pub(crate) fn new(conn: Connection, opts: GraphOpts) -> Self {
        Self { conn, opts }
    }

    fn ensure_node(
        table: &mut manifold::Table<'_, IdKey, NodeVal>,
        id: NodeId,
    ) -> GraphResult<()> {
        if table.get(IdKey(id))?.is_none() {
            table.insert(IdKey(id), (0, 0))?;
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
}

impl GraphHandle for StdGraph {
    fn add_node(&self, id: NodeId) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        {
            let mut table = txn.open_table(node_def())?;
            Self::ensure_node(&mut table, id)?;
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
            let mut edges = txn.open_table(edge_def())?;
            let mut ix_src = txn.open_table(ix_src_def())?;
            let mut ix_dst = txn.open_table(ix_dst_def())?;
            let mut nodes = txn.open_table(node_def())?;

            let mut touched = Vec::new();
            {
                let start = (IdKey(id), IdKey(0));
                let end = (IdKey(id), IdKey(NodeId::MAX));
                let mut range = ix_src.range(start..=end)?;
                while let Some(entry) = range.next() {
                    let (key_guard, _) = entry?;
                    let (_, edge_id) = key_guard.value();
                    touched.push(edge_id);
                }
            }
            {
                let start = (IdKey(id), IdKey(0));
                let end = (IdKey(id), IdKey(NodeId::MAX));
                let mut range = ix_dst.range(start..=end)?;
                while let Some(entry) = range.next() {
                    let (key_guard, _) = entry?;
                    let (_, edge_id) = key_guard.value();
                    touched.push(edge_id);
                }
            }

            for edge_id in touched {
                let Some(guard) = edges.get(edge_id)? else {
                    continue;
                };
                let (src, dst, _) = guard.value();
                edges.remove(edge_id)?;
                ix_src.remove((src, edge_id))?;
                ix_dst.remove((dst, edge_id))?;
                if self.opts.read_optimize {
                    let other = if src.0 == id { dst.0 } else { src.0 };
                    if other != id {
                        if src.0 == id {
                            Self::bump_degree(&mut nodes, other, -1, 0)?;
                        } else {
                            Self::bump_degree(&mut nodes, other, 0, -1)?;
                        }
                    }
                }
            }

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
            Self::ensure_node(&mut nodes, edge.src_id)?;
            Self::ensure_node(&mut nodes, edge.dst_id)?;

            let weight = if self.opts.is_weighted { edge.weight } else { 0 };
            let mut insert_one = |src: NodeId, dst: NodeId| -> GraphResult<()> {
                let edge_id = next_edge_id(&txn)?;
                let mut edges = txn.open_table(edge_def())?;
                edges.insert(IdKey(edge_id), (IdKey(src), IdKey(dst), weight))?;
                if !bulk {
                    let mut ix_src = txn.open_table(ix_src_def())?;
                    let mut ix_dst = txn.open_table(ix_dst_def())?;
                    ix_src.insert((IdKey(src), IdKey(edge_id)), ())?;
                    ix_dst.insert((IdKey(dst), IdKey(edge_id)), ())?;
                }
                Ok(())
            };
            insert_one(edge.src_id, edge.dst_id)?;
            if !self.opts.is_directed {
                insert_one(edge.dst_id, edge.src_id)?;
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
        txn.commit()?;
        Ok(())
    }

    fn has_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<bool> {
        let txn = self.conn.cf().begin_read()?;
        let ix = txn.open_table(ix_src_def())?;
        let edges = txn.open_table(edge_def())?;
        Ok(find_edge_id(&ix, &edges, src, dst)?.is_some())
    }

    fn get_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<Edge> {
        let txn = self.conn.cf().begin_read()?;
        let ix = txn.open_table(ix_src_def())?;
        let edges = txn.open_table(edge_def())?;
        let (_, weight) = find_edge_id(&ix, &edges, src, dst)?
            .ok_or_else(|| GraphError::NotFound(format!("edge {src}->{dst}")))?;
        Ok(Edge::new(src, dst, weight))
    }

    fn delete_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        {
            let mut edges = txn.open_table(edge_def())?;
            let mut ix_src = txn.open_table(ix_src_def())?;
            let mut ix_dst = txn.open_table(ix_dst_def())?;
            let mut nodes = txn.open_table(node_def())?;

            let (edge_id, _) = find_edge_id(&ix_src, &edges, src, dst)?
                .ok_or_else(|| GraphError::NotFound(format!("edge {src}->{dst}")))?;
            edges.remove(IdKey(edge_id))?;
            ix_src.remove((IdKey(src), IdKey(edge_id)))?;
            ix_dst.remove((IdKey(dst), IdKey(edge_id)))?;
            if self.opts.read_optimize {
                Self::bump_degree(&mut nodes, src, 0, -1)?;
                Self::bump_degree(&mut nodes, dst, -1, 0)?;
            }

            if !self.opts.is_directed {
                if let Some((rev_id, _)) = find_edge_id(&ix_src, &edges, dst, src)? {
                    edges.remove(IdKey(rev_id))?;
                    ix_src.remove((IdKey(dst), IdKey(rev_id)))?;
                    ix_dst.remove((IdKey(src), IdKey(rev_id)))?;
                    if self.opts.read_optimize {
                        Self::bump_degree(&mut nodes, dst, 0, -1)?;
                        Self::bump_degree(&mut nodes, src, -1, 0)?;
                    }
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
            let ix_src = txn.open_table(ix_src_def())?;
            let mut edges = txn.open_table(edge_def())?;
            let (edge_id, _) = find_edge_id(&ix_src, &edges, src, dst)?
                .ok_or_else(|| GraphError::NotFound(format!("edge {src}->{dst}")))?;
            edges.insert(IdKey(edge_id), (IdKey(src), IdKey(dst), weight))?;
            if !self.opts.is_directed {
                if let Some((rev_id, _)) = find_edge_id(&ix_src, &edges, dst, src)? {
                    edges.insert(IdKey(rev_id), (IdKey(dst), IdKey(src), weight))?;
                }
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn get_in_degree(&self, id: NodeId) -> GraphResult<Degree> {
        if self.opts.read_optimize {
            Ok(self.get_node(id)?.in_degree)
        } else {
            Ok(self.get_in_edges(id)?.len() as Degree)
        }
    }

    fn get_out_degree(&self, id: NodeId) -> GraphResult<Degree> {
        if self.opts.read_optimize {
            Ok(self.get_node(id)?.out_degree)
        } else {
            Ok(self.get_out_edges(id)?.len() as Degree)
        }
    }

    fn get_in_edges(&self, id: NodeId) -> GraphResult<Vec<Edge>> {
        let txn = self.conn.cf().begin_read()?;
        let ix = txn.open_table(ix_dst_def())?;
        let edges = txn.open_table(edge_def())?;
        let start = (IdKey(id), IdKey(0));
        let end = (IdKey(id), IdKey(NodeId::MAX));
        let mut range = ix.range(start..=end)?;
        let mut out = Vec::new();
        while let Some(entry) = range.next() {
            let (key_guard, _) = entry?;
            let (_, edge_id) = key_guard.value();
            if let Some(guard) = edges.get(edge_id)? {
                let (src, dst, weight) = guard.value();
                out.push(Edge::new(src.0, dst.0, weight));
            }
        }
        Ok(out)
    }

    fn get_out_edges(&self, id: NodeId) -> GraphResult<Vec<Edge>> {
        let txn = self.conn.cf().begin_read()?;
        let ix = txn.open_table(ix_src_def())?;
        let edges = txn.open_table(edge_def())?;
        let start = (IdKey(id), IdKey(0));
        let end = (IdKey(id), IdKey(NodeId::MAX));
        let mut range = ix.range(start..=end)?;
        let mut out = Vec::new();
        while let Some(entry) = range.next() {
            let (key_guard, _) = entry?;
            let (_, edge_id) = key_guard.value();
            if let Some(guard) = edges.get(edge_id)? {
                let (src, dst, weight) = guard.value();
                out.push(Edge::new(src.0, dst.0, weight));
            }
        }
        Ok(out)
    }

    fn get_in_nodes(&self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        Ok(self.get_in_edges(id)?.into_iter().map(|e| e.src_id).collect())
    }

    fn get_out_nodes(&self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        Ok(self.get_out_edges(id)?.into_iter().map(|e| e.dst_id).collect())
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
        Ok(NodeCursor::Std(StdNodeCursor::new(table, KeyRange::full())))
    }

    fn get_edge_iter(&self) -> GraphResult<EdgeCursor> {
        let txn = self.conn.cf().begin_read()?;
        let ix = txn.open_table(ix_src_def())?;
        let edges = txn.open_table(edge_def())?;
        Ok(EdgeCursor::Std(StdEdgeCursor::new(ix, edges, KeyRange::full())))
    }

    fn get_outnbd_cursor(&self) -> GraphResult<OutCursor> {
        let txn = self.conn.cf().begin_read()?;
        let ix = txn.open_table(ix_src_def())?;
        let edges = txn.open_table(edge_def())?;
        Ok(OutCursor::Std(StdOutCursor::new(ix, edges, KeyRange::full())))
    }

    fn get_innbd_cursor(&self) -> GraphResult<InCursor> {
        let txn = self.conn.cf().begin_read()?;
        let ix = txn.open_table(ix_dst_def())?;
        let edges = txn.open_table(edge_def())?;
        Ok(InCursor::Std(StdInCursor::new(ix, edges, KeyRange::full())))
    }

    fn create_indices(&self) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        {
            let edges = txn.open_table(edge_def())?;
            let mut ix_src = txn.open_table(ix_src_def())?;
            let mut ix_dst = txn.open_table(ix_dst_def())?;
            let mut iter = edges.iter()?;
            while let Some(entry) = iter.next() {
                let (key_guard, val_guard) = entry?;
                let edge_id = key_guard.value();
                let (src, dst, _) = val_guard.value();
                ix_src.insert((src, edge_id), ())?;
                ix_dst.insert((dst, edge_id), ())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn drop_indices(&self) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        txn.delete_table(ix_src_def())?;
        txn.delete_table(ix_dst_def())?;
        txn.commit()?;
        Ok(())
    }

    fn repair(&self) -> GraphResult<()> {
        if !self.opts.read_optimize {
            return Ok(());
        }
        #[cfg(feature = "logging")]
        log::info!("repairing cached degrees for '{}' (std)", self.opts.db_name);
        let txn = self.conn.cf().begin_write()?;
        {
            let mut nodes = txn.open_table(node_def())?;
            let mut ids = Vec::new();
            {
                let mut iter = nodes.iter()?;
                while let Some(entry) = iter.next() {
                    let (key_guard, _) = entry?;
                    ids.push(key_guard.value().0);
                }
            }
            for id in &ids {
                nodes.insert(IdKey(*id), (0, 0))?;
            }
            let edges = txn.open_table(edge_def())?;
            let mut iter = edges.iter()?;
            while let Some(entry) = iter.next() {
                let (_, val_guard) = entry?;
                let (src, dst, _) = val_guard.value();
                Self::bump_degree(&mut nodes, src.0, 0, 1)?;
                Self::bump_degree(&mut nodes, dst.0, 1, 0)?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn close(self) -> GraphResult<()> {
        self.conn.checkpoint()
    }
}

/// Sweeps every node in key order.
pub struct StdNodeCursor {
    table: manifold::ReadOnlyTable<IdKey, NodeVal>,
    cursor: NodeId,
    range: KeyRange,
    done: bool,
}

impl StdNodeCursor {
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

impl Iterator for StdNodeCursor {
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

/// Sweeps every edge via the src index, in `(src, edge_id)` order.
pub struct StdEdgeCursor {
    ix: manifold::ReadOnlyTable<IndexKey, ()>,
    edges: manifold::ReadOnlyTable<IdKey, EdgeVal>,
    cursor: (NodeId, NodeId),
    range: KeyRange,
    done: bool,
}

impl StdEdgeCursor {
    fn new(
        ix: manifold::ReadOnlyTable<IndexKey, ()>,
        edges: manifold::ReadOnlyTable<IdKey, EdgeVal>,
        range: KeyRange,
    ) -> Self {
        Self {
            ix,
            edges,
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

impl Iterator for StdEdgeCursor {
    type Item = GraphResult<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let start = (IdKey(self.cursor.0), IdKey(self.cursor.1));
        let end = (IdKey(self.range.end), IdKey(0));
        let mut range = match self.ix.range(start..end) {
            Ok(r) => r,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        match range.next() {
            Some(Ok((key_guard, _))) => {
                let (src, edge_id) = key_guard.value();
                self.cursor = (src.0, edge_id.0.saturating_add(1));
                match self.edges.get(edge_id) {
                    Ok(Some(guard)) => {
                        let (s, d, w) = guard.value();
                        Some(Ok(Edge::new(s.0, d.0, w)))
                    }
                    Ok(None) => Some(Err(GraphError::InvariantViolation(format!(
                        "src index references missing edge {}",
                        edge_id.0
                    )))),
                    Err(e) => Some(Err(e.into())),
                }
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

/// Accumulates consecutive same-`src` index entries into an [`AdjList`]
/// per vertex (§4.5 OutCursor, Std/EKey path).
pub struct StdOutCursor {
    ix: manifold::ReadOnlyTable<IndexKey, ()>,
    edges: manifold::ReadOnlyTable<IdKey, EdgeVal>,
    cursor: (NodeId, NodeId),
    range: KeyRange,
    done: bool,
}

impl StdOutCursor {
    fn new(
        ix: manifold::ReadOnlyTable<IndexKey, ()>,
        edges: manifold::ReadOnlyTable<IdKey, EdgeVal>,
        range: KeyRange,
    ) -> Self {
        Self {
            ix,
            edges,
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

    /// Positions at a specific vertex and returns its adjacency (empty if
    /// it has no outgoing edges).
    pub fn seek(&mut self, node_id: NodeId) -> GraphResult<AdjList> {
        let start = (IdKey(node_id), IdKey(0));
        let end = (IdKey(node_id), IdKey(NodeId::MAX));
        let mut range = self.ix.range(start..=end)?;
        let mut neighbors = Vec::new();
        while let Some(entry) = range.next() {
            let (key_guard, _) = entry?;
            let (_, edge_id) = key_guard.value();
            if let Some(guard) = self.edges.get(edge_id)? {
                let (_, dst, _) = guard.value();
                neighbors.push(dst.0);
            }
        }
        Ok(AdjList::from_neighbors(node_id, neighbors))
    }
}

impl Iterator for StdOutCursor {
    type Item = GraphResult<AdjList>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let start = (IdKey(self.cursor.0), IdKey(self.cursor.1));
        let end = (IdKey(self.range.end), IdKey(0));
        let mut range = match self.ix.range(start..end) {
            Ok(r) => r,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        let mut current_src: Option<NodeId> = None;
        let mut neighbors = Vec::new();
        loop {
            match range.next() {
                Some(Ok((key_guard, _))) => {
                    let (src, edge_id) = key_guard.value();
                    match current_src {
                        None => current_src = Some(src.0),
                        Some(s) if s != src.0 => {
                            self.cursor = (src.0, edge_id.0);
                            return Some(Ok(AdjList::from_neighbors(s, neighbors)));
                        }
                        _ => {}
                    }
                    match self.edges.get(edge_id) {
                        Ok(Some(guard)) => {
                            let (_, dst, _) = guard.value();
                            neighbors.push(dst.0);
                        }
                        Ok(None) => return Some(Err(GraphError::InvariantViolation(
                            "src index references missing edge".to_string(),
                        ))),
                        Err(e) => return Some(Err(e.into())),
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.done = true;
                    return current_src.map(|s| Ok(AdjList::from_neighbors(s, neighbors)));
                }
            }
        }
    }
}

/// Dual of [`StdOutCursor`] over the dst axis.
pub struct StdInCursor {
    ix: manifold::ReadOnlyTable<IndexKey, ()>,
    edges: manifold::ReadOnlyTable<IdKey, EdgeVal>,
    cursor: (NodeId, NodeId),
    range: KeyRange,
    done: bool,
}

impl StdInCursor {
    fn new(
        ix: manifold::ReadOnlyTable<IndexKey, ()>,
        edges: manifold::ReadOnlyTable<IdKey, EdgeVal>,
        range: KeyRange,
    ) -> Self {
        Self {
            ix,
            edges,
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

    /// Positions at a specific vertex and returns its incoming adjacency.
    pub fn seek(&mut self, node_id: NodeId) -> GraphResult<AdjList> {
        let start = (IdKey(node_id), IdKey(0));
        let end = (IdKey(node_id), IdKey(NodeId::MAX));
        let mut range = self.ix.range(start..=end)?;
        let mut neighbors = Vec::new();
        while let Some(entry) = range.next() {
            let (key_guard, _) = entry?;
            let (_, edge_id) = key_guard.value();
            if let Some(guard) = self.edges.get(edge_id)? {
                let (src, _, _) = guard.value();
                neighbors.push(src.0);
            }
        }
        Ok(AdjList::from_neighbors(node_id, neighbors))
    }
}

impl Iterator for StdInCursor {
    type Item = GraphResult<AdjList>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let start = (IdKey(self.cursor.0), IdKey(self.cursor.1));
        let end = (IdKey(self.range.end), IdKey(0));
        let mut range = match self.ix.range(start..end) {
            Ok(r) => r,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        let mut current_dst: Option<NodeId> = None;
        let mut neighbors = Vec::new();
        loop {
            match range.next() {
                Some(Ok((key_guard, _))) => {
                    let (dst, edge_id) = key_guard.value();
                    match current_dst {
                        None => current_dst = Some(dst.0),
                        Some(d) if d != dst.0 => {
                            self.cursor = (dst.0, edge_id.0);
                            return Some(Ok(AdjList::from_neighbors(d, neighbors)));
                        }
                        _ => {}
                    }
                    match self.edges.get(edge_id) {
                        Ok(Some(guard)) => {
                            let (src, _, _) = guard.value();
                            neighbors.push(src.0);
                        }
                        Ok(None) => return Some(Err(GraphError::InvariantViolation(
                            "dst index references missing edge".to_string(),
                        ))),
                        Err(e) => return Some(Err(e.into())),
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.done = true;
                    return current_dst.map(|d| Ok(AdjList::from_neighbors(d, neighbors)));
                }
            }
        }
    }
}
