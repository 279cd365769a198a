//! Per-mesh-slot draw records.

use std::cell::RefCell;
use std::rc::Rc;

use crate::draw_buffers::DrawBuffers;
use crate::suballoc::Segment;

/// Shared handle to a draw record.
///
/// The producing mesh slot owns the record's identity and lifetime; the
/// region manager and its queues hold clones of this handle. Everything
/// happens on the frame thread, so no locking.
pub type DrawParamsRef = Rc<RefCell<DrawParams>>;

/// Draw metadata for one region-local mesh batch.
///
/// Mutated only through [`DrawBuffers::upload`](crate::DrawBuffers::upload)
/// and [`reset`](Self::reset); the batch builders flip the ready latch.
#[derive(Debug)]
pub struct DrawParams {
    index_count: u32,
    first_index: u32,
    /// In vertex-stride units, not bytes.
    vertex_offset: i32,
    /// 24-bit encoded section offset, decoded by the vertex shader.
    base_instance: u32,
    ready: bool,
    vertex_segment: Segment,
    /// Present only for render types that carry explicit sorted indices.
    index_segment: Option<Segment>,
}

impl DrawParams {
    pub fn new(sorted_indices: bool) -> Self {
        Self {
            index_count: 0,
            first_index: 0,
            vertex_offset: 0,
            base_instance: 0,
            ready: false,
            vertex_segment: Segment::default(),
            index_segment: sorted_indices.then(Segment::default),
        }
    }

    pub fn new_shared(sorted_indices: bool) -> DrawParamsRef {
        Rc::new(RefCell::new(Self::new(sorted_indices)))
    }

    /// Records the result of one upload. Called by the region manager;
    /// the readiness latch is left untouched because readiness is observed
    /// later, during batch building.
    pub fn apply_upload(
        &mut self,
        base_instance: u32,
        index_count: u32,
        vertex_offset: i32,
        first_index: u32,
    ) {
        self.base_instance = base_instance;
        self.index_count = index_count;
        self.vertex_offset = vertex_offset;
        self.first_index = first_index;
    }

    /// Monotonic: once set, the record stays ready until [`reset`](Self::reset).
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Retires this record. Zeroes the draw fields and, when the owning
    /// region is still allocated and the vertex segment assigned, returns
    /// the segment to the region's vertex-buffer free list. This is the
    /// single release point for the GPU storage behind a mesh slot.
    pub fn reset(&mut self, region: Option<&mut DrawBuffers>) {
        self.index_count = 0;
        self.first_index = 0;
        self.vertex_offset = 0;
        self.ready = false;

        if let Some(region) = region {
            if region.is_allocated() && self.vertex_segment.is_assigned() {
                region.free_vertex_segment(&mut self.vertex_segment);
            }
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn first_index(&self) -> u32 {
        self.first_index
    }

    pub fn vertex_offset(&self) -> i32 {
        self.vertex_offset
    }

    pub fn base_instance(&self) -> u32 {
        self.base_instance
    }

    pub fn vertex_segment(&self) -> &Segment {
        &self.vertex_segment
    }

    /// Handle the upload path fills when writing vertex data.
    pub fn vertex_segment_mut(&mut self) -> &mut Segment {
        &mut self.vertex_segment
    }

    /// Handle the upload path fills when writing explicit indices.
    pub fn index_segment_mut(&mut self) -> &mut Option<Segment> {
        &mut self.index_segment
    }
}
