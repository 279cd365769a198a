//! Segment bookkeeping for area buffers.
//!
//! An [`AreaBuffer`](crate::area_buffer::AreaBuffer) parcels one large
//! device buffer out into byte-range segments. The bookkeeping lives here,
//! separate from the GPU resource, so the readiness and reclamation logic
//! can be exercised without a device.
//!
//! Free space is a sorted list of ranges with first-fit allocation and
//! coalescing on free. Segments written during the current frame are
//! "pending" until the owning queue submission completes; the batch
//! builders skip pending segments and retry next frame.

use rustc_hash::FxHashSet;

use crate::error::DrawBufferError;

/// Handle to a byte range inside an area buffer.
///
/// A default segment is unassigned (no offset). The allocator is the only
/// owner of the underlying storage; a segment is just an index into it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Segment {
    offset: Option<u32>,
    size: u32,
}

impl Segment {
    pub fn offset(&self) -> Option<u32> {
        self.offset
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_assigned(&self) -> bool {
        self.offset.is_some()
    }
}

#[derive(Copy, Clone, Debug)]
struct FreeRange {
    offset: u32,
    length: u32,
}

/// First-fit sub-allocator over a fixed byte capacity.
pub struct SegmentAllocator {
    capacity: u32,
    element_size: u32,
    /// Free ranges, sorted by offset, never adjacent.
    free_ranges: Vec<FreeRange>,
    /// Offsets written this frame whose upload has not yet been submitted.
    pending: FxHashSet<u32>,
    used_bytes: u32,
}

impl SegmentAllocator {
    pub fn new(capacity: u32, element_size: u32) -> Self {
        debug_assert!(element_size > 0);
        Self {
            capacity,
            element_size,
            free_ranges: vec![FreeRange {
                offset: 0,
                length: capacity,
            }],
            pending: FxHashSet::default(),
            used_bytes: 0,
        }
    }

    /// Reserves a segment of at least `size` bytes, rounded up to the
    /// element stride so segment offsets stay element-aligned.
    ///
    /// The new segment starts out pending; it becomes ready once
    /// [`mark_uploads_complete`](Self::mark_uploads_complete) runs.
    pub fn allocate(&mut self, size: u32) -> Result<Segment, DrawBufferError> {
        let aligned = align_up(size, self.element_size);

        let fit = self
            .free_ranges
            .iter()
            .position(|range| range.length >= aligned);
        let Some(index) = fit else {
            return Err(DrawBufferError::OutOfCapacity {
                requested: aligned,
                free: self.free_bytes(),
            });
        };

        let range = &mut self.free_ranges[index];
        let offset = range.offset;
        range.offset += aligned;
        range.length -= aligned;
        if range.length == 0 {
            self.free_ranges.remove(index);
        }

        self.used_bytes += aligned;
        self.pending.insert(offset);

        Ok(Segment {
            offset: Some(offset),
            size: aligned,
        })
    }

    /// Returns a segment's bytes to the free list and clears the handle.
    /// Unassigned segments are ignored.
    pub fn free(&mut self, segment: &mut Segment) {
        let Some(offset) = segment.offset.take() else {
            return;
        };
        let length = segment.size;
        segment.size = 0;

        self.pending.remove(&offset);
        self.used_bytes -= length;
        self.insert_free_range(FreeRange { offset, length });
    }

    fn insert_free_range(&mut self, range: FreeRange) {
        let index = self
            .free_ranges
            .partition_point(|existing| existing.offset < range.offset);

        // Coalesce with the neighbor on each side when contiguous.
        let merges_prev = index > 0
            && self.free_ranges[index - 1].offset + self.free_ranges[index - 1].length
                == range.offset;
        let merges_next = index < self.free_ranges.len()
            && range.offset + range.length == self.free_ranges[index].offset;

        match (merges_prev, merges_next) {
            (true, true) => {
                let next = self.free_ranges.remove(index);
                self.free_ranges[index - 1].length += range.length + next.length;
            }
            (true, false) => self.free_ranges[index - 1].length += range.length,
            (false, true) => {
                self.free_ranges[index].offset = range.offset;
                self.free_ranges[index].length += range.length;
            }
            (false, false) => self.free_ranges.insert(index, range),
        }
    }

    /// Whether a segment's contents are fully written and visible to draws.
    /// Unassigned segments report ready (there is nothing to wait for).
    pub fn is_ready(&self, segment: &Segment) -> bool {
        match segment.offset {
            Some(offset) => !self.pending.contains(&offset),
            None => true,
        }
    }

    /// Promotes every pending segment to ready. Called once the queue
    /// submission carrying this frame's uploads has been issued.
    pub fn mark_uploads_complete(&mut self) {
        self.pending.clear();
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn element_size(&self) -> u32 {
        self.element_size
    }

    pub fn used_bytes(&self) -> u32 {
        self.used_bytes
    }

    pub fn free_bytes(&self) -> u32 {
        self.capacity - self.used_bytes
    }
}

fn align_up(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_element_aligned() {
        let mut alloc = SegmentAllocator::new(1000, 20);
        let a = alloc.allocate(30).expect("allocation should succeed");
        let b = alloc.allocate(20).expect("allocation should succeed");
        assert_eq!(a.offset(), Some(0));
        assert_eq!(a.size(), 40); // 30 rounded up to the 20-byte stride
        assert_eq!(b.offset(), Some(40));
    }

    #[test]
    fn free_restores_exact_capacity() {
        let mut alloc = SegmentAllocator::new(400, 4);
        let before = alloc.free_bytes();
        let mut segment = alloc.allocate(100).expect("allocation should succeed");
        assert_eq!(alloc.free_bytes(), before - 100);

        alloc.free(&mut segment);
        assert_eq!(alloc.free_bytes(), before);
        assert!(!segment.is_assigned());
        assert_eq!(segment.size(), 0);
    }

    #[test]
    fn freed_ranges_coalesce() {
        let mut alloc = SegmentAllocator::new(120, 4);
        let mut a = alloc.allocate(40).expect("allocation should succeed");
        let mut b = alloc.allocate(40).expect("allocation should succeed");
        let mut c = alloc.allocate(40).expect("allocation should succeed");

        // Free out of order; the three ranges must merge back into one so a
        // full-capacity allocation fits again.
        alloc.free(&mut a);
        alloc.free(&mut c);
        alloc.free(&mut b);
        let whole = alloc.allocate(120).expect("coalesced range should fit");
        assert_eq!(whole.offset(), Some(0));
    }

    #[test]
    fn out_of_capacity_is_an_error() {
        let mut alloc = SegmentAllocator::new(64, 4);
        let err = alloc.allocate(100).expect_err("should not fit");
        match err {
            DrawBufferError::OutOfCapacity { requested, free } => {
                assert_eq!(requested, 100);
                assert_eq!(free, 64);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fragmented_free_space_is_not_usable_as_one_block() {
        let mut alloc = SegmentAllocator::new(120, 4);
        let mut a = alloc.allocate(40).expect("allocation should succeed");
        let _b = alloc.allocate(40).expect("allocation should succeed");
        let mut c = alloc.allocate(40).expect("allocation should succeed");
        alloc.free(&mut a);
        alloc.free(&mut c);

        assert_eq!(alloc.free_bytes(), 80);
        assert!(alloc.allocate(80).is_err());
        assert!(alloc.allocate(40).is_ok());
    }

    #[test]
    fn segments_become_ready_after_submission() {
        let mut alloc = SegmentAllocator::new(200, 4);
        let segment = alloc.allocate(40).expect("allocation should succeed");
        assert!(!alloc.is_ready(&segment));

        alloc.mark_uploads_complete();
        assert!(alloc.is_ready(&segment));
    }

    #[test]
    fn unassigned_segment_reports_ready() {
        let alloc = SegmentAllocator::new(200, 4);
        assert!(alloc.is_ready(&Segment::default()));
    }
}
