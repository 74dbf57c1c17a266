//! Edge-Key representation: a single `(src, dst)`-keyed table where a
//! sentinel `dst` value encodes a node record (§4.4).

use manifold::{ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::codec::{DstKey, IdKey};
use crate::error::{GraphError, GraphResult};
use crate::handle::GraphHandle;
use crate::iter::{EdgeCursor, InCursor, NodeCursor, OutCursor};
use crate::kvs::{tables, Connection};
use crate::model::{AdjList, Degree, Edge, KeyRange, Node, NodeId, Weight, SENTINEL};
use crate::options::GraphOpts;

type PrimaryKey = (IdKey, DstKey);
/// `(a, b)`: node record `(in_degree, out_degree)`; edge record `(weight, _)`.
type PrimaryVal = (i32, i32);
type DstIndexKey = (DstKey, IdKey);

fn primary_def() -> TableDefinition<'static, PrimaryKey, PrimaryVal> {
    TableDefinition::new(tables::EDGE)
}
fn ix_dst_def() -> TableDefinition<'static, DstIndexKey, ()> {
    TableDefinition::new(tables::IX_EDGE_DST)
}

/// The Edge-Key storage representation.
pub struct EKeyGraph {
    conn: Connection,
    opts: GraphOpts,
}

impl EKeyGraph {
    pub(crate) fn new(conn: Connection, opts: GraphOpts) -> Self {
        Self { conn, opts }
    }

    fn ensure_node(
        table: &mut manifold::Table<'_, PrimaryKey, PrimaryVal>,
        ix_dst: &mut manifold::Table<'_, DstIndexKey, ()>,
        id: NodeId,
    ) -> GraphResult<()> {
        let key = (IdKey(id), DstKey(SENTINEL));
        if table.get(key)?.is_none() {
            table.insert(key, (0, 0))?;
            ix_dst.insert((DstKey(SENTINEL), IdKey(id)), ())?;
        }
        Ok(())
    }

    fn bump_degree(
        table: &mut manifold::Table<'_, PrimaryKey, PrimaryVal>,
        id: NodeId,
        delta_in: i64,
        delta_out: i64,
    ) -> GraphResult<()> {
        let key = (IdKey(id), DstKey(SENTINEL));
        let (in_d, out_d) = table.get(key)?.map(|g| g.value()).unwrap_or((0, 0));
        let new_in = (in_d as i64 + delta_in).max(0) as i32;
        let new_out = (out_d as i64 + delta_out).max(0) as i32;
        table.insert(key, (new_in, new_out))?;
        Ok(())
    }
}

impl GraphHandle for EKeyGraph {
    fn add_node(&self, id: NodeId) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        {
            let mut table = txn.open_table(primary_def())?;
            let mut ix_dst = txn.open_table(ix_dst_def())?;
            Self::ensure_node(&mut table, &mut ix_dst, id)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn has_node(&self, id: NodeId) -> GraphResult<bool> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(primary_def())?;
        Ok(table.get((IdKey(id), DstKey(SENTINEL)))?.is_some())
    }

    fn get_node(&self, id: NodeId) -> GraphResult<Node> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(primary_def())?;
        let (in_degree, out_degree) = table
            .get((IdKey(id), DstKey(SENTINEL)))?
            .map(|g| g.value())
            .ok_or_else(|| GraphError::NotFound(format!("node {id}")))?;
        Ok(Node {
            id,
            in_degree: in_degree.max(0) as Degree,
            out_degree: out_degree.max(0) as Degree,
        })
    }

    fn get_random_node(&self) -> GraphResult<Node> {
        let mut iter = self.get_node_iter()?;
        iter.next()
            .ok_or_else(|| GraphError::NotFound("graph has no nodes".to_string()))?
    }

    fn delete_node(&self, id: NodeId) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        {
            let mut table = txn.open_table(primary_def())?;
            let mut ix_dst = txn.open_table(ix_dst_def())?;

            let mut touched: Vec<(NodeId, NodeId)> = Vec::new();
            {
                let start = (IdKey(id), DstKey(SENTINEL));
                let end = (IdKey(id.saturating_add(1)), DstKey(SENTINEL));
                let mut range = table.range(start..end)?;
                while let Some(entry) = range.next() {
                    let (key_guard, _) = entry?;
                    let (src, dst) = key_guard.value();
                    if dst.0 != SENTINEL {
                        touched.push((src.0, dst.0));
                    }
                }
            }
            {
                let start = (DstKey(id), IdKey(0));
                let end = (DstKey(id.saturating_add(1)), IdKey(0));
                let mut range = ix_dst.range(start..end)?;
                while let Some(entry) = range.next() {
                    let (key_guard, _) = entry?;
                    let (dst, src) = key_guard.value();
                    touched.push((src.0, dst.0));
                }
            }

            for (src, dst) in touched {
                if table.remove((IdKey(src), DstKey(dst)))?.is_none() {
                    continue;
                }
                ix_dst.remove((DstKey(dst), IdKey(src)))?;
                if self.opts.read_optimize {
                    let other = if src == id { dst } else { src };
                    if other != id {
                        if src == id {
                            Self::bump_degree(&mut table, other, -1, 0)?;
                        } else {
                            Self::bump_degree(&mut table, other, 0, -1)?;
                        }
                    }
                }
            }

            table.remove((IdKey(id), DstKey(SENTINEL)))?;
            ix_dst.remove((DstKey(SENTINEL), IdKey(id)))?;
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
            let mut table = txn.open_table(primary_def())?;
            let mut ix_dst = txn.open_table(ix_dst_def())?;
            Self::ensure_node(&mut table, &mut ix_dst, edge.src_id)?;
            Self::ensure_node(&mut table, &mut ix_dst, edge.dst_id)?;

            let weight = if self.opts.is_weighted { edge.weight } else { 0 };
            table.insert((IdKey(edge.src_id), DstKey(edge.dst_id)), (weight, 0))?;
            if !bulk {
                ix_dst.insert((DstKey(edge.dst_id), IdKey(edge.src_id)), ())?;
            }
            if !self.opts.is_directed {
                table.insert((IdKey(edge.dst_id), DstKey(edge.src_id)), (weight, 0))?;
                if !bulk {
                    ix_dst.insert((DstKey(edge.src_id), IdKey(edge.dst_id)), ())?;
                }
            }

            if self.opts.read_optimize {
                Self::bump_degree(&mut table, edge.src_id, 0, 1)?;
                Self::bump_degree(&mut table, edge.dst_id, 1, 0)?;
                if !self.opts.is_directed {
                    Self::bump_degree(&mut table, edge.dst_id, 0, 1)?;
                    Self::bump_degree(&mut table, edge.src_id, 1, 0)?;
                }
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn has_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<bool> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(primary_def())?;
        Ok(table.get((IdKey(src), DstKey(dst)))?.is_some())
    }

    fn get_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<Edge> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(primary_def())?;
        let (weight, _) = table
            .get((IdKey(src), DstKey(dst)))?
            .map(|g| g.value())
            .ok_or_else(|| GraphError::NotFound(format!("edge {src}->{dst}")))?;
        Ok(Edge::new(src, dst, weight))
    }

    fn delete_edge(&self, src: NodeId, dst: NodeId) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        {
            let mut table = txn.open_table(primary_def())?;
            let mut ix_dst = txn.open_table(ix_dst_def())?;
            if table.remove((IdKey(src), DstKey(dst)))?.is_none() {
                return Err(GraphError::NotFound(format!("edge {src}->{dst}")));
            }
            ix_dst.remove((DstKey(dst), IdKey(src)))?;
            if self.opts.read_optimize {
                Self::bump_degree(&mut table, src, 0, -1)?;
                Self::bump_degree(&mut table, dst, -1, 0)?;
            }
            if !self.opts.is_directed {
                table.remove((IdKey(dst), DstKey(src)))?;
                ix_dst.remove((DstKey(src), IdKey(dst)))?;
                if self.opts.read_optimize {
                    Self::bump_degree(&mut table, dst, 0, -1)?;
                    Self::bump_degree(&mut table, src, -1, 0)?;
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
            let mut table = txn.open_table(primary_def())?;
            if table.get((IdKey(src), DstKey(dst)))?.is_none() {
                return Err(GraphError::NotFound(format!("edge {src}->{dst}")));
            }
            table.insert((IdKey(src), DstKey(dst)), (weight, 0))?;
            if !self.opts.is_directed {
                table.insert((IdKey(dst), DstKey(src)), (weight, 0))?;
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
        let ix_dst = txn.open_table(ix_dst_def())?;
        let table = txn.open_table(primary_def())?;
        let start = (DstKey(id), IdKey(0));
        let end = (DstKey(id.saturating_add(1)), IdKey(0));
        let mut range = ix_dst.range(start..end)?;
        let mut out = Vec::new();
        while let Some(entry) = range.next() {
            let (key_guard, _) = entry?;
            let (_, src) = key_guard.value();
            if let Some(guard) = table.get((src, DstKey(id)))? {
                let (weight, _) = guard.value();
                out.push(Edge::new(src.0, id, weight));
            }
        }
        Ok(out)
    }

    fn get_out_edges(&self, id: NodeId) -> GraphResult<Vec<Edge>> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(primary_def())?;
        let start = (IdKey(id), DstKey(SENTINEL));
        let end = (IdKey(id.saturating_add(1)), DstKey(SENTINEL));
        let mut range = table.range(start..end)?;
        let mut out = Vec::new();
        while let Some(entry) = range.next() {
            let (key_guard, val_guard) = entry?;
            let (src, dst) = key_guard.value();
            if dst.0 == SENTINEL {
                continue;
            }
            let (weight, _) = val_guard.value();
            out.push(Edge::new(src.0, dst.0, weight));
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
        let ix_dst = txn.open_table(ix_dst_def())?;
        let start = (DstKey(SENTINEL), IdKey(0));
        let end = (DstKey(0), IdKey(0));
        Ok(ix_dst.range(start..end)?.count() as u64)
    }

    fn get_num_edges(&self) -> GraphResult<u64> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(primary_def())?;
        let total = table.len()?;
        let nodes = self.get_num_nodes()?;
        Ok(total.saturating_sub(nodes))
    }

    fn get_node_iter(&self) -> GraphResult<NodeCursor> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(primary_def())?;
        Ok(NodeCursor::EKey(EKeyNodeCursor::new(table, KeyRange::full())))
    }

    fn get_edge_iter(&self) -> GraphResult<EdgeCursor> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(primary_def())?;
        Ok(EdgeCursor::EKey(EKeyEdgeCursor::new(table, KeyRange::full())))
    }

    fn get_outnbd_cursor(&self) -> GraphResult<OutCursor> {
        let txn = self.conn.cf().begin_read()?;
        let table = txn.open_table(primary_def())?;
        Ok(OutCursor::EKey(EKeyOutCursor::new(table, KeyRange::full())))
    }

    fn get_innbd_cursor(&self) -> GraphResult<InCursor> {
        let txn = self.conn.cf().begin_read()?;
        let ix_dst = txn.open_table(ix_dst_def())?;
        Ok(InCursor::EKey(EKeyInCursor::new(ix_dst, KeyRange::full())))
    }

    fn create_indices(&self) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        {
            let table = txn.open_table(primary_def())?;
            let mut ix_dst = txn.open_table(ix_dst_def())?;
            let mut iter = table.iter()?;
            while let Some(entry) = iter.next() {
                let (key_guard, _) = entry?;
                let (src, dst) = key_guard.value();
                ix_dst.insert((dst, src), ())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn drop_indices(&self) -> GraphResult<()> {
        let txn = self.conn.cf().begin_write()?;
        txn.delete_table(ix_dst_def())?;
        txn.commit()?;
        Ok(())
    }

    fn repair(&self) -> GraphResult<()> {
        #[cfg(feature = "logging")]
        log::info!("rebuilding cached degrees for '{}' (ekey)", self.opts.db_name);
        let txn = self.conn.cf().begin_write()?;
        {
            let mut table = txn.open_table(primary_def())?;
            let mut ids = Vec::new();
            let mut in_counts: std::collections::HashMap<NodeId, i64> =
                std::collections::HashMap::new();
            let mut out_counts: std::collections::HashMap<NodeId, i64> =
                std::collections::HashMap::new();
            {
                let mut iter = table.iter()?;
                while let Some(entry) = iter.next() {
                    let (key_guard, _) = entry?;
                    let (src, dst) = key_guard.value();
                    if dst.0 == SENTINEL {
                        ids.push(src.0);
                    } else {
                        *out_counts.entry(src.0).or_insert(0) += 1;
                        *in_counts.entry(dst.0).or_insert(0) += 1;
                    }
                }
            }
            if self.opts.read_optimize {
                for id in ids {
                    let in_d = *in_counts.get(&id).unwrap_or(&0);
                    let out_d = *out_counts.get(&id).unwrap_or(&0);
                    table.insert((IdKey(id), DstKey(SENTINEL)), (in_d as i32, out_d as i32))?;
                }
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn close(self) -> GraphResult<()> {
        self.conn.checkpoint()
    }
}

/// Sweeps every node in key order, skipping the interleaved edge rows.
pub struct EKeyNodeCursor {
    table: manifold::ReadOnlyTable<PrimaryKey, PrimaryVal>,
    cursor: NodeId,
    range: KeyRange,
    done: bool,
}

impl EKeyNodeCursor {
    fn new(table: manifold::ReadOnlyTable<PrimaryKey, PrimaryVal>, range: KeyRange) -> Self {
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

impl Iterator for EKeyNodeCursor {
    type Item = GraphResult<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cursor >= self.range.end {
            self.done = true;
            return None;
        }
        let start = (IdKey(self.cursor), DstKey(SENTINEL));
        let end = (IdKey(self.range.end), DstKey(SENTINEL));
        let mut range = match self.table.range(start..end) {
            Ok(r) => r,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        match range.next() {
            Some(Ok((key_guard, val_guard))) => {
                let (src, _) = key_guard.value();
                self.cursor = src.0.saturating_add(1);
                let (in_degree, out_degree) = val_guard.value();
                Some(Ok(Node {
                    id: src.0,
                    in_degree: in_degree.max(0) as Degree,
                    out_degree: out_degree.max(0) as Degree,
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

/// Sweeps the primary table, skipping each vertex's own sentinel row.
pub struct EKeyEdgeCursor {
    table: manifold::ReadOnlyTable<PrimaryKey, PrimaryVal>,
    cursor: (NodeId, NodeId),
    range: KeyRange,
    done: bool,
}

impl EKeyEdgeCursor {
    fn new(table: manifold::ReadOnlyTable<PrimaryKey, PrimaryVal>, range: KeyRange) -> Self {
        Self {
            table,
            cursor: (range.start, SENTINEL),
            range,
            done: false,
        }
    }

    pub(crate) fn set_key_range(&mut self, range: KeyRange) {
        self.range = range;
        self.cursor = (range.start, SENTINEL);
        self.done = false;
    }
}

impl Iterator for EKeyEdgeCursor {
    type Item = GraphResult<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            let start = (IdKey(self.cursor.0), DstKey(self.cursor.1));
            let end = (IdKey(self.range.end), DstKey(SENTINEL));
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
                    self.cursor = if dst.0 == SENTINEL {
                        (src.0, 0)
                    } else {
                        (src.0, dst.0.saturating_add(1))
                    };
                    if dst.0 == SENTINEL {
                        continue;
                    }
                    let (weight, _) = val_guard.value();
                    return Some(Ok(Edge::new(src.0, dst.0, weight)));
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

/// Accumulates consecutive same-`src` rows into an [`AdjList`] per vertex,
/// skipping each vertex's own sentinel row.
pub struct EKeyOutCursor {
    table: manifold::ReadOnlyTable<PrimaryKey, PrimaryVal>,
    cursor: (NodeId, NodeId),
    range: KeyRange,
    done: bool,
}

impl EKeyOutCursor {
    fn new(table: manifold::ReadOnlyTable<PrimaryKey, PrimaryVal>, range: KeyRange) -> Self {
        Self {
            table,
            cursor: (range.start, SENTINEL),
            range,
            done: false,
        }
    }

    pub(crate) fn set_key_range(&mut self, range: KeyRange) {
        self.range = range;
        self.cursor = (range.start, SENTINEL);
        self.done = false;
    }

    /// Positions at a specific vertex and returns its outgoing adjacency.
    pub fn seek(&mut self, node_id: NodeId) -> GraphResult<AdjList> {
        let start = (IdKey(node_id), DstKey(SENTINEL));
        let end = (IdKey(node_id.saturating_add(1)), DstKey(SENTINEL));
        let mut range = self.table.range(start..end)?;
        let mut neighbors = Vec::new();
        while let Some(entry) = range.next() {
            let (key_guard, _) = entry?;
            let (_, dst) = key_guard.value();
            if dst.0 != SENTINEL {
                neighbors.push(dst.0);
            }
        }
        Ok(AdjList::from_neighbors(node_id, neighbors))
    }
}

impl Iterator for EKeyOutCursor {
    type Item = GraphResult<AdjList>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let start = (IdKey(self.cursor.0), DstKey(self.cursor.1));
        let end = (IdKey(self.range.end), DstKey(SENTINEL));
        let mut range = match self.table.range(start..end) {
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
                    let (src, dst) = key_guard.value();
                    match current_src {
                        None => current_src = Some(src.0),
                        Some(s) if s != src.0 => {
                            self.cursor = (src.0, SENTINEL);
                            return Some(Ok(AdjList::from_neighbors(s, neighbors)));
                        }
                        _ => {}
                    }
                    if dst.0 != SENTINEL {
                        neighbors.push(dst.0);
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

/// Dual of [`EKeyOutCursor`], accumulating over the dst index.
pub struct EKeyInCursor {
    ix_dst: manifold::ReadOnlyTable<DstIndexKey, ()>,
    cursor: (NodeId, NodeId),
    range: KeyRange,
    done: bool,
}

impl EKeyInCursor {
    fn new(ix_dst: manifold::ReadOnlyTable<DstIndexKey, ()>, range: KeyRange) -> Self {
        Self {
            ix_dst,
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
        let start = (DstKey(node_id), IdKey(0));
        let end = (DstKey(node_id.saturating_add(1)), IdKey(0));
        let mut range = self.ix_dst.range(start..end)?;
        let mut neighbors = Vec::new();
        while let Some(entry) = range.next() {
            let (key_guard, _) = entry?;
            let (_, src) = key_guard.value();
            neighbors.push(src.0);
        }
        Ok(AdjList::from_neighbors(node_id, neighbors))
    }
}

impl Iterator for EKeyInCursor {
    type Item = GraphResult<AdjList>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let start = (DstKey(self.cursor.0), IdKey(self.cursor.1));
        // Inclusive bound on the largest real dst in range; `DstKey` remaps
        // the sentinel to sort first, so an exclusive `DstKey(range.end)`
        // bound breaks when `range.end` is the sentinel itself.
        let last_dst = self.range.end.saturating_sub(1);
        let end = (DstKey(last_dst), IdKey(NodeId::MAX));
        let mut range = match self.ix_dst.range(start..=end) {
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
                    let (dst, src) = key_guard.value();
                    match current_dst {
                        None => current_dst = Some(dst.0),
                        Some(d) if d != dst.0 => {
                            self.cursor = (dst.0, src.0);
                            return Some(Ok(AdjList::from_neighbors(d, neighbors)));
                        }
                        _ => {}
                    }
                    neighbors.push(src.0);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kvs::{open_connection, write_metadata};
    use crate::options::{GraphOpts, GraphType};

    fn open_ekey(dir: &tempfile::TempDir, name: &str) -> EKeyGraph {
        let opts = GraphOpts::builder(name)
            .db_dir(dir.path().to_string_lossy().into_owned())
            .repr(GraphType::EKey)
            .build()
            .unwrap();
        let conn = open_connection(&opts).unwrap();
        let txn = conn.cf().begin_write().unwrap();
        write_metadata(&txn, &opts).unwrap();
        txn.commit().unwrap();
        EKeyGraph::new(conn, opts)
    }

    #[test]
    fn sentinel_sorts_before_out_edges() {
        let dir = tempfile::tempdir().unwrap();
        let g = open_ekey(&dir, "g");
        g.add_edge(Edge::new(1, 2, 10), false).unwrap();
        g.add_edge(Edge::new(1, 3, 20), false).unwrap();
        let edges: Vec<_> = g.get_outnbd_cursor().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].node_id, 1);
        assert!(edges[0].neighbors.contains(&2));
        assert!(edges[0].neighbors.contains(&3));
    }

    #[test]
    fn delete_cascade_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let g = open_ekey(&dir, "g");
        for id in [1, 2, 3] {
            g.add_node(id).unwrap();
        }
        g.add_edge(Edge::new(1, 2, 10), false).unwrap();
        g.add_edge(Edge::new(2, 3, 20), false).unwrap();
        g.add_edge(Edge::new(1, 3, 30), false).unwrap();

        g.delete_node(2).unwrap();

        assert_eq!(g.get_num_nodes().unwrap(), 2);
        assert_eq!(g.get_num_edges().unwrap(), 1);
        assert_eq!(g.get_in_degree(3).unwrap(), 1);
        assert_eq!(g.get_out_degree(1).unwrap(), 1);
    }
}
