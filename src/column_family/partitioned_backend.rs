use crate::StorageBackend;
use crate::column_family::header::Segment;
use std::fmt::{Debug, Formatter};
use std::io;
use std::sync::{Arc, RwLock};

/// A storage backend that operates on one or more segments within an underlying storage backend.
///
/// This backend supports multi-segment column families where data can be stored in non-contiguous
/// regions of the file. This enables instant growth without moving existing data - new segments
/// are simply appended at the end of the file.
///
/// # Virtual Offset Translation
///
/// The backend presents a continuous virtual address space to the caller, mapping it to
/// physical segments transparently:
/// - Virtual offset 0-1GB might map to physical offset 4KB-1GB (segment 1)
/// - Virtual offset 1GB-1.5GB might map to physical offset 5GB-5.5GB (segment 2)
///
/// # Auto-Expansion
///
/// When a write would exceed the total capacity of all segments, the backend can automatically
/// request a new segment via the expansion callback. This makes growth transparent to the
/// Database instance.
///
/// # Example
///
/// ```ignore
/// use redb::column_family::{PartitionedStorageBackend, Segment};
/// use redb::backends::FileBackend;
/// use std::sync::Arc;
///
/// let file_backend = Arc::new(FileBackend::new(file)?);
///
/// let segments = vec![
///     Segment::new(4096, 1024 * 1024 * 1024),  // 1GB at 4KB
///     Segment::new(5 * 1024 * 1024 * 1024, 512 * 1024 * 1024), // 512MB at 5GB
/// ];
///
/// let backend = PartitionedStorageBackend::with_segments(
///     file_backend,
///     segments,
///     None, // No auto-expansion
/// );
/// ```
pub struct PartitionedStorageBackend {
    inner: Arc<dyn StorageBackend>,
    segments: Arc<RwLock<Vec<Segment>>>,
    expansion_callback: Option<Arc<dyn Fn(u64) -> io::Result<Segment> + Send + Sync>>,
}

impl PartitionedStorageBackend {
    /// Creates a new partitioned storage backend with a single segment (for backward compatibility).
    ///
    /// # Arguments
    ///
    /// * `inner` - The underlying storage backend (wrapped in Arc for sharing)
    /// * `partition_offset` - The absolute byte offset where this partition begins
    /// * `partition_size` - The size of this partition in bytes
    ///
    /// # Panics
    ///
    /// Panics if `partition_offset + partition_size` would overflow `u64`.
    pub fn new(inner: Arc<dyn StorageBackend>, partition_offset: u64, partition_size: u64) -> Self {
        // Verify no overflow in partition bounds
        partition_offset
            .checked_add(partition_size)
            .expect("partition_offset + partition_size overflows u64");

        Self {
            inner,
            segments: Arc::new(RwLock::new(vec![Segment::new(
                partition_offset,
                partition_size,
            )])),
            expansion_callback: None,
        }
    }

    /// Creates a new partitioned storage backend with multiple segments.
    ///
    /// # Arguments
    ///
    /// * `inner` - The underlying storage backend (wrapped in Arc for sharing)
    /// * `segments` - Vector of segments making up this partition
    /// * `expansion_callback` - Optional callback to request new segments for auto-expansion
    pub fn with_segments(
        inner: Arc<dyn StorageBackend>,
        segments: Vec<Segment>,
        expansion_callback: Option<Arc<dyn Fn(u64) -> io::Result<Segment> + Send + Sync>>,
    ) -> Self {
        Self {
            inner,
            segments: Arc::new(RwLock::new(segments)),
            expansion_callback,
        }
    }

    /// Returns the total size of all segments (virtual address space size).
    fn total_size(&self) -> u64 {
        let segments = self.segments.read().unwrap();
        segments.iter().map(|s| s.size).sum()
    }

    /// Maps a virtual offset to a physical offset in a specific segment.
    ///
    /// Returns `(physical_offset, remaining_in_segment)` on success.
    fn virtual_to_physical(&self, virtual_offset: u64) -> io::Result<(u64, u64)> {
        let segments = self.segments.read().unwrap();
        let mut current_virtual = 0u64;

        for segment in segments.iter() {
            let segment_end = current_virtual + segment.size;

            if virtual_offset < segment_end {
                // Found the segment containing this virtual offset
                let offset_in_segment = virtual_offset - current_virtual;
                let physical_offset = segment.offset + offset_in_segment;
                let remaining_in_segment = segment.size - offset_in_segment;
                return Ok((physical_offset, remaining_in_segment));
            }

            current_virtual = segment_end;
        }

        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("virtual offset {virtual_offset} exceeds total size {current_virtual}"),
        ))
    }

    /// Attempts to expand the partition by requesting a new segment.
    fn try_expand(&self, requested_size: u64) -> io::Result<()> {
        if let Some(callback) = &self.expansion_callback {
            let new_segment = callback(requested_size)?;
            let mut segments = self.segments.write().unwrap();
            segments.push(new_segment);
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot expand partition: no expansion callback configured",
            ))
        }
    }
}

impl Debug for PartitionedStorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let segments = self.segments.read().unwrap();
        f.debug_struct("PartitionedStorageBackend")
            .field("segment_count", &segments.len())
            .field("total_size", &self.total_size())
            .finish_non_exhaustive()
    }
}

impl StorageBackend for PartitionedStorageBackend {
    fn len(&self) -> io::Result<u64> {
        // Return the actual allocated length across all segments
        let underlying_len = self.inner.len()?;
        let segments = self.segments.read().unwrap();

        let mut total_allocated = 0u64;

        for segment in segments.iter() {
            if underlying_len <= segment.offset {
                // This segment hasn't been allocated yet
                break;
            }

            let segment_allocated = (underlying_len - segment.offset).min(segment.size);
            total_allocated += segment_allocated;

            // If this segment isn't fully allocated, stop counting
            if segment_allocated < segment.size {
                break;
            }
        }

        Ok(total_allocated)
    }

    fn read(&self, offset: u64, out: &mut [u8]) -> io::Result<()> {
        let mut bytes_read = 0;
        let mut current_offset = offset;

        while bytes_read < out.len() {
            let (physical_offset, remaining_in_segment) =
                self.virtual_to_physical(current_offset)?;

            #[allow(clippy::cast_possible_truncation)]
            let bytes_to_read =
                (out.len() - bytes_read).min(remaining_in_segment.min(usize::MAX as u64) as usize);

            self.inner.read(
                physical_offset,
                &mut out[bytes_read..bytes_read + bytes_to_read],
            )?;

            bytes_read += bytes_to_read;
            current_offset += bytes_to_read as u64;
        }

        Ok(())
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        let current_total = self.total_size();

        // If requested length exceeds current capacity, try to expand
        if len > current_total {
            let needed = len - current_total;
            // Add 10% buffer to reduce frequent small expansions
            let allocation_size = needed + (needed / 10).max(1024 * 1024); // At least 1MB buffer
            self.try_expand(allocation_size)?;
        }

        // Calculate the maximum physical end we need to allocate
        let segments = self.segments.read().unwrap();
        let mut remaining = len;
        let mut max_physical_end = 0u64;

        for segment in segments.iter() {
            if remaining == 0 {
                break;
            }

            let used_in_segment = remaining.min(segment.size);
            let physical_end = segment.offset + used_in_segment;
            max_physical_end = max_physical_end.max(physical_end);

            remaining = remaining.saturating_sub(used_in_segment);
        }

        // Only grow the underlying storage if needed (no-shrink policy)
        let current_underlying_len = self.inner.len()?;
        if max_physical_end > current_underlying_len {
            self.inner.set_len(max_physical_end)?;
        }

        Ok(())
    }

    fn sync_data(&self) -> io::Result<()> {
        self.inner.sync_data()
    }

    fn write(&self, offset: u64, data: &[u8]) -> io::Result<()> {
        let mut bytes_written = 0;
        let mut current_offset = offset;

        while bytes_written < data.len() {
            let (physical_offset, remaining_in_segment) =
                self.virtual_to_physical(current_offset)?;

            #[allow(clippy::cast_possible_truncation)]
            let bytes_to_write = (data.len() - bytes_written)
                .min(remaining_in_segment.min(usize::MAX as u64) as usize);

            self.inner.write(
                physical_offset,
                &data[bytes_written..bytes_written + bytes_to_write],
            )?;

            bytes_written += bytes_to_write;
            current_offset += bytes_to_write as u64;
        }

        Ok(())
    }

    fn close(&self) -> io::Result<()> {
        // Do not close the underlying storage, as other partitions may still be using it
        Ok(())
    }
}
