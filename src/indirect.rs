//! Indirect draw arguments and the device-visible ring that holds them.

use bytemuck::{Pod, Zeroable};

use crate::constants::draw::{INDIRECT_COMMAND_SIZE, INDIRECT_RING_DRAWS};

/// One indexed-indirect argument record, 20 bytes.
///
/// Matches the layout `multi_draw_indexed_indirect` consumes; the packed
/// section offset rides in `base_instance` and is decoded by the vertex
/// shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedIndirectArgs {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub base_instance: u32,
}

const _: () = assert!(
    std::mem::size_of::<DrawIndexedIndirectArgs>() == INDIRECT_COMMAND_SIZE as usize
);

/// Ring of packed argument blocks in a GPU-visible indirect buffer.
///
/// Each region's batch build records one block and immediately issues its
/// multi-draw against it; the write cursor only moves forward within a
/// frame and wraps when the ring runs out.
pub struct IndirectArgBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    write_offset: u64,
    block_offset: u64,
}

impl IndirectArgBuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        Self::with_capacity(device, INDIRECT_RING_DRAWS)
    }

    pub fn with_capacity(device: &wgpu::Device, max_draws: u32) -> Self {
        let capacity = max_draws as u64 * INDIRECT_COMMAND_SIZE as u64;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("indirect argument ring"),
            size: capacity,
            usage: wgpu::BufferUsages::INDIRECT | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            capacity,
            write_offset: 0,
            block_offset: 0,
        }
    }

    /// Records one argument block and returns its byte offset in the ring.
    pub fn record(&mut self, queue: &wgpu::Queue, args: &[DrawIndexedIndirectArgs]) -> u64 {
        let bytes: &[u8] = bytemuck::cast_slice(args);
        debug_assert!(bytes.len() as u64 <= self.capacity);

        if self.write_offset + bytes.len() as u64 > self.capacity {
            log::warn!(
                "[IndirectArgBuffer] ring wrapped mid-frame at {} bytes",
                self.write_offset
            );
            self.write_offset = 0;
        }

        queue.write_buffer(&self.buffer, self.write_offset, bytes);
        self.block_offset = self.write_offset;
        self.write_offset += bytes.len() as u64;
        self.block_offset
    }

    /// Rewinds the write cursor. Call once per frame before batch building.
    pub fn reset(&mut self) {
        self.write_offset = 0;
        self.block_offset = 0;
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Byte offset of the most recently recorded block.
    pub fn block_offset(&self) -> u64 {
        self.block_offset
    }
}
