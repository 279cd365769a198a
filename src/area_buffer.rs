//! Device-side area buffer.
//!
//! One `AreaBuffer` owns a fixed-capacity `wgpu::Buffer` and hands out
//! reclaimable segments of it via a [`SegmentAllocator`]. Regions use one
//! area buffer for vertices and, lazily, one for indices.

use crate::error::DrawBufferError;
use crate::suballoc::{Segment, SegmentAllocator};

pub struct AreaBuffer {
    buffer: wgpu::Buffer,
    alloc: SegmentAllocator,
}

impl AreaBuffer {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        usage: wgpu::BufferUsages,
        capacity: u32,
        element_size: u32,
    ) -> Self {
        log::debug!(
            "[AreaBuffer] creating '{}' ({} bytes, {} byte elements)",
            label,
            capacity,
            element_size
        );

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity as u64,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            alloc: SegmentAllocator::new(capacity, element_size),
        }
    }

    /// Writes `payload` into a fresh segment and stores the placement in
    /// `segment`. A previously assigned segment is returned to the free
    /// list first; re-uploads of the same mesh slot always relocate.
    ///
    /// The write is staged on the queue; the segment stays pending until
    /// [`uploads_submitted`](Self::uploads_submitted).
    pub fn upload(
        &mut self,
        queue: &wgpu::Queue,
        payload: &[u8],
        segment: &mut Segment,
    ) -> Result<(), DrawBufferError> {
        if segment.is_assigned() {
            self.alloc.free(segment);
        }

        let new_segment = self.alloc.allocate(payload.len() as u32)?;
        if let Some(offset) = new_segment.offset() {
            queue.write_buffer(&self.buffer, offset as u64, payload);
        }
        *segment = new_segment;
        Ok(())
    }

    pub fn is_segment_ready(&self, segment: &Segment) -> bool {
        self.alloc.is_ready(segment)
    }

    pub fn free_segment(&mut self, segment: &mut Segment) {
        self.alloc.free(segment);
    }

    /// Promotes this frame's staged writes to ready. Call after submitting
    /// the queue that carries them.
    pub fn uploads_submitted(&mut self) {
        self.alloc.mark_uploads_complete();
    }

    /// Destroys the device buffer. Segment handles into it become dangling
    /// and must not be drawn afterwards.
    pub fn free(self) {
        self.buffer.destroy();
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn element_size(&self) -> u32 {
        self.alloc.element_size()
    }

    pub fn used_bytes(&self) -> u32 {
        self.alloc.used_bytes()
    }

    pub fn free_bytes(&self) -> u32 {
        self.alloc.free_bytes()
    }
}
