//! Graph-engine façade: one shared KVS connection, per-worker handles, and
//! key-space partitioning for parallel read-only scans (§4.6).

use crate::error::GraphResult;
use crate::handle::GraphHandle;
use crate::kvs::{check_compatible, open_connection, read_metadata, write_metadata, Connection};
use crate::model::{EdgeRange, KeyRange, NodeId};
use crate::options::GraphOpts;
use crate::repr::Graph;

/// Owns the shared connection for one graph and hands out per-worker
/// [`Graph`] handles, each free to open its own transactions independently
/// (§5 "transactions and cursors are strictly per-worker").
pub struct GraphEngine {
    conn: Connection,
    opts: GraphOpts,
    num_threads: usize,
}

impl GraphEngine {
    /// Opens (or creates) the graph and prepares it to hand out
    /// `num_threads` worth of key-space partitions. `num_threads` of `0` is
    /// treated as `1`.
    pub fn open(opts: GraphOpts, num_threads: usize) -> GraphResult<Self> {
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

        let mut handle_opts = opts;
        handle_opts.create_new = false;

        Ok(Self {
            conn,
            opts: handle_opts,
            num_threads: num_threads.max(1),
        })
    }

    /// Builds a new handle onto the shared connection. Every call returns an
    /// independent handle; none of them share transactions or cursors.
    pub fn create_graph_handle(&self) -> GraphResult<Graph> {
        Ok(Graph::from_connection(self.conn.clone(), self.opts.clone()))
    }

    fn observed_node_range(&self) -> GraphResult<(NodeId, NodeId)> {
        let handle = self.create_graph_handle()?;
        let mut min = None;
        let mut max = None;
        for item in handle.get_node_iter()? {
            let node = item?;
            min.get_or_insert(node.id);
            max = Some(node.id);
        }
        match (min, max) {
            (Some(lo), Some(hi)) => Ok((lo, hi.saturating_add(1))),
            _ => Ok((1, 1)),
        }
    }

    /// The `[start, end)` node-id partition assigned to `worker_index`, one
    /// of `num_threads` equal-sized contiguous buckets over the graph's
    /// currently observed id range; the last bucket absorbs the remainder.
    pub fn get_key_range(&self, worker_index: usize) -> GraphResult<KeyRange> {
        let (lo, hi) = self.observed_node_range()?;
        let span = hi.saturating_sub(lo);
        let bucket_size = span / self.num_threads as u32;
        let start = lo.saturating_add(bucket_size.saturating_mul(worker_index as u32));
        let end = if worker_index + 1 == self.num_threads {
            hi
        } else {
            lo.saturating_add(bucket_size.saturating_mul((worker_index + 1) as u32))
        };
        Ok(KeyRange::new(start, end.max(start)))
    }

    /// Dual of [`Self::get_key_range`] over the `(src, dst)` edge-key space,
    /// partitioned by `src` using the same observed node-id range.
    pub fn get_edge_range(&self, worker_index: usize) -> GraphResult<EdgeRange> {
        let key_range = self.get_key_range(worker_index)?;
        Ok(EdgeRange {
            start: (key_range.start, 0),
            end: (key_range.end, 0),
        })
    }

    /// Flushes and releases the shared connection.
    pub fn close_graph(self) -> GraphResult<()> {
        self.conn.checkpoint()
    }
}
