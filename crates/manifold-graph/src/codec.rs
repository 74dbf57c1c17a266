//! Key/value encoding for node ids and packed neighbor lists.
//!
//! All node identifiers transit the storage layer as 32-bit values in
//! network byte order so that Manifold's lexicographic key comparison
//! coincides with numeric order, matching the source engine's key
//! encoding contract. `manifold`'s own `u32: Value` impl already orders
//! correctly; the explicit big-endian transform here is kept anyway so the
//! on-disk layout and the sentinel-ordering invariant (Edge-Key's node
//! record sorting before its out-edges) hold independent of that impl.

#![allow(clippy::host_endian_bytes, clippy::big_endian_bytes)]

use std::cmp::Ordering;

use manifold::{Key, Value};

use crate::model::NodeId;

/// Newtype key wrapper performing the big-endian transform described above.
///
/// Stored as four bytes; comparing the byte strings lexicographically is
/// exactly comparing the wrapped `u32` numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdKey(pub NodeId);

impl From<NodeId> for IdKey {
    fn from(id: NodeId) -> Self {
        Self(id)
    }
}

impl From<IdKey> for NodeId {
    fn from(key: IdKey) -> Self {
        key.0
    }
}

impl Value for IdKey {
    type SelfType<'a> = IdKey;
    type AsBytes<'a> = [u8; 4];

    fn fixed_width() -> Option<usize> {
        Some(4)
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        let raw: [u8; 4] = data[..4].try_into().expect("IdKey is fixed width 4 bytes");
        IdKey(u32::from_be_bytes(raw))
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        value.0.to_be_bytes()
    }

    fn type_name() -> manifold::TypeName {
        manifold::TypeName::new("manifold_graph::IdKey")
    }
}

impl Key for IdKey {
    fn compare(data1: &[u8], data2: &[u8]) -> Ordering {
        data1.cmp(data2)
    }
}

/// Newtype key wrapper for the `dst` half of an Edge-Key composite key.
///
/// Encodes `id` as `id + 1`, and the dst-sentinel ([`crate::model::SENTINEL`])
/// as `0`, before applying the same big-endian transform as [`IdKey`]. This
/// keeps the encoding order-preserving on real ids while moving the
/// sentinel to sort strictly before every one of them, matching the
/// invariant that a node's own record (`(n, SENTINEL)`) precedes all of its
/// out-edges (`(n, v)`, `v != SENTINEL`) in key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DstKey(pub NodeId);

impl From<NodeId> for DstKey {
    fn from(id: NodeId) -> Self {
        Self(id)
    }
}

impl From<DstKey> for NodeId {
    fn from(key: DstKey) -> Self {
        key.0
    }
}

fn encode_dst(id: NodeId) -> u32 {
    if id == crate::model::SENTINEL {
        0
    } else {
        id + 1
    }
}

fn decode_dst(encoded: u32) -> NodeId {
    if encoded == 0 {
        crate::model::SENTINEL
    } else {
        encoded - 1
    }
}

impl Value for DstKey {
    type SelfType<'a> = DstKey;
    type AsBytes<'a> = [u8; 4];

    fn fixed_width() -> Option<usize> {
        Some(4)
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        let raw: [u8; 4] = data[..4].try_into().expect("DstKey is fixed width 4 bytes");
        DstKey(decode_dst(u32::from_be_bytes(raw)))
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        encode_dst(value.0).to_be_bytes()
    }

    fn type_name() -> manifold::TypeName {
        manifold::TypeName::new("manifold_graph::DstKey")
    }
}

impl Key for DstKey {
    fn compare(data1: &[u8], data2: &[u8]) -> Ordering {
        data1.cmp(data2)
    }
}

/// A packed, length-prefixed sequence of raw 32-bit vertex ids.
///
/// Used as the payload half of the adjacency-side-table value
/// `(degree, packed_neighbor_list)`. The prefix is redundant with the
/// sibling `degree` field in that tuple but is kept so the encoding is
/// self-describing on its own, matching the source format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NeighborList(pub Vec<NodeId>);

impl NeighborList {
    /// Wraps a neighbor vector.
    pub fn new(neighbors: Vec<NodeId>) -> Self {
        Self(neighbors)
    }

    /// Consumes the wrapper, returning the inner vector.
    pub fn into_inner(self) -> Vec<NodeId> {
        self.0
    }
}

impl Value for NeighborList {
    type SelfType<'a> = NeighborList;
    type AsBytes<'a> = Vec<u8>;

    fn fixed_width() -> Option<usize> {
        None
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        // An absent/empty payload decodes to an empty list, tolerating the
        // degree=0 placeholder written for nodes with no neighbors yet.
        if data.len() < 4 {
            return NeighborList(Vec::new());
        }
        let count = u32::from_be_bytes(data[0..4].try_into().unwrap()) as usize;
        let mut neighbors = Vec::with_capacity(count);
        let mut offset = 4usize;
        for _ in 0..count {
            if offset + 4 > data.len() {
                break;
            }
            let id = u32::from_be_bytes(data[offset..offset + 4].try_into().unwrap());
            neighbors.push(id);
            offset += 4;
        }
        NeighborList(neighbors)
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        let mut bytes = Vec::with_capacity(4 + value.0.len() * 4);
        bytes.extend_from_slice(&(value.0.len() as u32).to_be_bytes());
        for id in &value.0 {
            bytes.extend_from_slice(&id.to_be_bytes());
        }
        bytes
    }

    fn type_name() -> manifold::TypeName {
        manifold::TypeName::new("manifold_graph::NeighborList")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_key_round_trips() {
        for id in [0u32, 1, 42, 1_000_000, u32::MAX] {
            let bytes = IdKey::as_bytes(&IdKey(id));
            assert_eq!(IdKey::from_bytes(&bytes).0, id);
        }
    }

    #[test]
    fn id_key_byte_order_matches_numeric_order() {
        let small = IdKey::as_bytes(&IdKey(1));
        let large = IdKey::as_bytes(&IdKey(2));
        assert!(small.as_slice() < large.as_slice());
    }

    #[test]
    fn neighbor_list_round_trips_nonempty() {
        let list = NeighborList::new(vec![3, 1, 4, 1, 5]);
        let bytes = NeighborList::as_bytes(&list);
        assert_eq!(NeighborList::from_bytes(&bytes), list);
    }

    #[test]
    fn neighbor_list_empty_payload_decodes_to_empty_vec() {
        assert_eq!(NeighborList::from_bytes(&[]), NeighborList::default());
    }

    #[test]
    fn dst_key_round_trips() {
        for id in [1u32, 42, 1_000_000, crate::model::SENTINEL] {
            let bytes = DstKey::as_bytes(&DstKey(id));
            assert_eq!(DstKey::from_bytes(&bytes).0, id);
        }
    }

    #[test]
    fn dst_key_sentinel_sorts_before_every_real_id() {
        let sentinel = DstKey::as_bytes(&DstKey(crate::model::SENTINEL));
        for id in [1u32, 2, 1_000_000, u32::MAX - 1] {
            let real = DstKey::as_bytes(&DstKey(id));
            assert!(sentinel.as_slice() < real.as_slice());
        }
    }

    #[test]
    fn dst_key_preserves_order_among_real_ids() {
        let a = DstKey::as_bytes(&DstKey(5));
        let b = DstKey::as_bytes(&DstKey(6));
        assert!(a.as_slice() < b.as_slice());
    }
}
