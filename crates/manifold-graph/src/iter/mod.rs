//! The neighborhood iterator protocol (§4.5): four cursor kinds sharing a
//! common shape — a current position, a key range, and in-band exhaustion.
//!
//! Rather than the source's `next(out: &mut T) -> bool` signature, each
//! cursor here implements the standard [`Iterator`] trait with
//! `Item = GraphResult<T>`; end-of-range is simply [`Iterator::next`]
//! returning `None`, and storage failures surface as `Some(Err(_))` without
//! ever being confused with exhaustion (§7 "never mixed with failures").
//!
//! Each variant owns its `ReadOnlyTable`(s) outright rather than borrowing
//! from the transaction that opened them — `manifold::ReadOnlyTable` has no
//! lifetime parameter, so a cursor can outlive the `ReadTransaction` used to
//! construct it. `next()` re-seeks a fresh `Range` from the cursor's saved
//! position on every call instead of holding one across calls, trading the
//! O(1) amortized advance a live cursor would give for an O(log n) reseek,
//! in exchange for cursors that are not self-referential.

use crate::model::{AdjList, Edge, KeyRange, Node};
use crate::repr::adj_repr::{AdjInCursor, AdjNodeCursor, AdjOutCursor};
use crate::repr::ekey_repr::{EKeyEdgeCursor, EKeyInCursor, EKeyNodeCursor, EKeyOutCursor};
use crate::repr::std_repr::{StdEdgeCursor, StdInCursor, StdNodeCursor, StdOutCursor};
use crate::GraphResult;

/// Sweeps every node in key order (§4.5 NodeCursor).
pub enum NodeCursor {
    /// Std representation.
    Std(StdNodeCursor),
    /// Adjacency-List representation.
    Adj(AdjNodeCursor),
    /// Edge-Key representation.
    EKey(EKeyNodeCursor),
}

impl NodeCursor {
    /// Restricts the sweep to `range`, repositioning at `range.start`.
    pub fn set_key_range(&mut self, range: KeyRange) {
        match self {
            Self::Std(c) => c.set_key_range(range),
            Self::Adj(c) => c.set_key_range(range),
            Self::EKey(c) => c.set_key_range(range),
        }
    }
}

impl Iterator for NodeCursor {
    type Item = GraphResult<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Std(c) => c.next(),
            Self::Adj(c) => c.next(),
            Self::EKey(c) => c.next(),
        }
    }
}

/// Sweeps every edge in `(src, dst)` order (§4.5 EdgeCursor).
pub enum EdgeCursor {
    /// Std representation (walks the src index).
    Std(StdEdgeCursor),
    /// Adjacency-List representation (walks the edge table directly).
    Adj(crate::repr::adj_repr::AdjEdgeCursor),
    /// Edge-Key representation (walks the primary table, skipping sentinels).
    EKey(EKeyEdgeCursor),
}

impl EdgeCursor {
    /// Restricts the sweep to `range`, repositioning at `range.start`.
    pub fn set_key_range(&mut self, range: KeyRange) {
        match self {
            Self::Std(c) => c.set_key_range(range),
            Self::Adj(c) => c.set_key_range(range),
            Self::EKey(c) => c.set_key_range(range),
        }
    }
}

impl Iterator for EdgeCursor {
    type Item = GraphResult<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Std(c) => c.next(),
            Self::Adj(c) => c.next(),
            Self::EKey(c) => c.next(),
        }
    }
}

/// Yields the complete outgoing adjacency `(node_id, degree, neighbors)` of
/// each vertex with outgoing edges, in range order (§4.5 OutCursor).
pub enum OutCursor {
    /// Std representation (accumulates consecutive same-src index entries).
    Std(StdOutCursor),
    /// Adjacency-List representation (one side-table record per vertex).
    Adj(AdjOutCursor),
    /// Edge-Key representation (accumulates consecutive same-src rows,
    /// skipping each vertex's own sentinel node record).
    EKey(EKeyOutCursor),
}

impl OutCursor {
    /// Restricts the sweep to `range`, repositioning at `range.start`.
    pub fn set_key_range(&mut self, range: KeyRange) {
        match self {
            Self::Std(c) => c.set_key_range(range),
            Self::Adj(c) => c.set_key_range(range),
            Self::EKey(c) => c.set_key_range(range),
        }
    }

    /// Positions at a specific vertex and returns its adjacency directly,
    /// without advancing the sweep (§4.5 "per-node seek variant").
    pub fn seek(&mut self, node_id: crate::model::NodeId) -> GraphResult<AdjList> {
        match self {
            Self::Std(c) => c.seek(node_id),
            Self::Adj(c) => c.seek(node_id),
            Self::EKey(c) => c.seek(node_id),
        }
    }
}

impl Iterator for OutCursor {
    type Item = GraphResult<AdjList>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Std(c) => c.next(),
            Self::Adj(c) => c.next(),
            Self::EKey(c) => c.next(),
        }
    }
}

/// Dual of [`OutCursor`] over the dst axis (§4.5 InCursor).
pub enum InCursor {
    /// Std representation.
    Std(StdInCursor),
    /// Adjacency-List representation.
    Adj(AdjInCursor),
    /// Edge-Key representation.
    EKey(EKeyInCursor),
}

impl InCursor {
    /// Restricts the sweep to `range`, repositioning at `range.start`.
    pub fn set_key_range(&mut self, range: KeyRange) {
        match self {
            Self::Std(c) => c.set_key_range(range),
            Self::Adj(c) => c.set_key_range(range),
            Self::EKey(c) => c.set_key_range(range),
        }
    }

    /// Positions at a specific vertex and returns its incoming adjacency.
    pub fn seek(&mut self, node_id: crate::model::NodeId) -> GraphResult<AdjList> {
        match self {
            Self::Std(c) => c.seek(node_id),
            Self::Adj(c) => c.seek(node_id),
            Self::EKey(c) => c.seek(node_id),
        }
    }
}

impl Iterator for InCursor {
    type Item = GraphResult<AdjList>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Std(c) => c.next(),
            Self::Adj(c) => c.next(),
            Self::EKey(c) => c.next(),
        }
    }
}
