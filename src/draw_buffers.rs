//! Region draw-buffer manager.
//!
//! One `DrawBuffers` owns the vertex and (lazily) index storage for a
//! region of the world plus one bounded render queue per terrain render
//! type. It accepts finished mesh uploads and, once per frame per render
//! type, emits either a single indirect multi-draw or a run of direct
//! draws.

use glam::{DVec3, IVec3, Mat4};

use crate::area_buffer::AreaBuffer;
use crate::batch;
use crate::constants::draw::QUEUE_CAPACITY;
use crate::constants::encoding::{SECTION_AXIS_MASK, SECTION_Y_SHIFT, SECTION_Z_SHIFT};
use crate::constants::terrain::{
    INDEX_BUFFER_CAPACITY, INDEX_SIZE, VERTEX_BUFFER_CAPACITY, VERTEX_SIZE,
};
use crate::draw_params::DrawParamsRef;
use crate::error::DrawBufferError;
use crate::indirect::{DrawIndexedIndirectArgs, IndirectArgBuffer};
use crate::queue::StaticQueue;
use crate::render_type::TerrainRenderType;
use crate::suballoc::Segment;
use crate::upload::UploadBuffer;

type SectionQueue = StaticQueue<DrawParamsRef>;

pub struct DrawBuffers {
    /// Stable region index, assigned at registration.
    pub index: usize,
    /// World-space region corner.
    origin: IVec3,
    /// Minimum world height, baseline for the encoded Y offset.
    min_height: i32,

    allocated: bool,
    vertex_buffer: Option<AreaBuffer>,
    /// Created on the first upload that carries explicit indices.
    index_buffer: Option<AreaBuffer>,

    queues: [Option<SectionQueue>; TerrainRenderType::COUNT],

    /// Reused per batch build; never reallocated in the frame loop.
    scratch: Vec<DrawIndexedIndirectArgs>,
}

impl DrawBuffers {
    pub fn new(index: usize, origin: IVec3, min_height: i32) -> Self {
        Self {
            index,
            origin,
            min_height,
            allocated: false,
            vertex_buffer: None,
            index_buffer: None,
            queues: std::array::from_fn(|_| None),
            scratch: Vec::with_capacity(QUEUE_CAPACITY),
        }
    }

    /// Creates the vertex buffer and one queue per active render type.
    /// The index buffer stays absent until a mesh actually needs explicit
    /// indices.
    pub fn allocate_buffers(&mut self, device: &wgpu::Device, active_types: &[TerrainRenderType]) {
        log::debug!(
            "[DrawBuffers] allocating region {} at {:?}",
            self.index,
            self.origin
        );

        self.vertex_buffer = Some(AreaBuffer::new(
            device,
            "region vertex buffer",
            wgpu::BufferUsages::VERTEX,
            VERTEX_BUFFER_CAPACITY,
            VERTEX_SIZE,
        ));
        self.add_render_types(active_types.iter().copied());
        self.allocated = true;
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Writes a finished mesh into this region's buffers and updates the
    /// draw record to address the new segments.
    ///
    /// `x`, `y`, `z` are section offsets local to the region; each axis is
    /// masked to 0..=127 by the encoding. The payload is a one-shot
    /// transfer source and is consumed here. Readiness is observed later,
    /// during batch building, not on upload.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        gpu_queue: &wgpu::Queue,
        x: i32,
        y: i32,
        z: i32,
        buffer: UploadBuffer,
        params: &DrawParamsRef,
    ) -> Result<(), DrawBufferError> {
        let base_instance = self.encode_section_offset(x, y, z);
        let mut params = params.borrow_mut();
        let mut vertex_offset = params.vertex_offset();
        let mut first_index = 0u32;

        if !buffer.index_only() {
            let vertex_buffer = self
                .vertex_buffer
                .as_mut()
                .ok_or(DrawBufferError::NotAllocated)?;
            vertex_buffer.upload(gpu_queue, buffer.vertex_data(), params.vertex_segment_mut())?;
            if let Some(offset) = params.vertex_segment().offset() {
                vertex_offset = (offset / VERTEX_SIZE) as i32;
            }
        }

        if !buffer.auto_indices() {
            let index_buffer = self.index_buffer.get_or_insert_with(|| {
                AreaBuffer::new(
                    device,
                    "region index buffer",
                    wgpu::BufferUsages::INDEX,
                    INDEX_BUFFER_CAPACITY,
                    INDEX_SIZE,
                )
            });
            let segment = params.index_segment_mut().get_or_insert_with(Segment::default);
            index_buffer.upload(gpu_queue, buffer.index_data(), segment)?;
            if let Some(offset) = segment.offset() {
                first_index = offset / INDEX_SIZE;
            }
        }

        params.apply_upload(base_instance, buffer.index_count(), vertex_offset, first_index);

        // `buffer` drops here: the transient mesh memory is released.
        Ok(())
    }

    /// Packs region-local section offsets into the 24-bit base-instance
    /// value the vertex shader decodes: `(y - min_height) << 16 | z << 8 | x`,
    /// each axis masked to 7 bits. Offsets past 127 wrap silently.
    pub fn encode_section_offset(&self, x: i32, y: i32, z: i32) -> u32 {
        let x = (x & SECTION_AXIS_MASK) as u32;
        let z = (z & SECTION_AXIS_MASK) as u32;
        let y = ((y - self.min_height) & SECTION_AXIS_MASK) as u32;
        y << SECTION_Y_SHIFT | z << SECTION_Z_SHIFT | x
    }

    /// Folds the camera-to-region-origin vector into the view-projection
    /// matrix. The subtraction happens in f64 so large world coordinates
    /// keep their precision; only the small relative offset reaches f32.
    pub fn camera_relative_transform(&self, view_proj: Mat4, camera: DVec3) -> Mat4 {
        let relative = (camera - self.origin.as_dvec3()).as_vec3();
        view_proj * Mat4::from_translation(-relative)
    }

    /// Appends a draw record to the matching render queue. The queue must
    /// have been created via `allocate_buffers` or `add_render_types`.
    pub fn add_draw_commands(&mut self, render_type: TerrainRenderType, params: &DrawParamsRef) {
        match self.queues[render_type.index()].as_mut() {
            Some(queue) => queue.push(params.clone()),
            None => log::warn!(
                "[DrawBuffers] region {}: no queue for {:?}, draw dropped",
                self.index,
                render_type
            ),
        }
    }

    /// Creates queues for any of `render_types` that lack one. Idempotent;
    /// existing queues are untouched.
    pub fn add_render_types(&mut self, render_types: impl IntoIterator<Item = TerrainRenderType>) {
        for render_type in render_types {
            let slot = &mut self.queues[render_type.index()];
            if slot.is_none() {
                *slot = Some(StaticQueue::new(QUEUE_CAPACITY));
            }
        }
    }

    /// Builds one indirect multi-draw covering every ready record of a
    /// render type.
    ///
    /// Packs the queue into a 20-byte-stride argument block, records it
    /// into `indirect`, binds this region's buffers, pushes the
    /// camera-relative transform, and issues a single
    /// `multi_draw_indexed_indirect`. Records whose uploads are still
    /// pending are deferred to a later frame.
    ///
    /// Returns the number of records drawn; 0 is a normal outcome and
    /// issues no GPU work at all.
    pub fn build_draw_batches_indirect<'a>(
        &'a mut self,
        pass: &mut wgpu::RenderPass<'a>,
        indirect: &'a mut IndirectArgBuffer,
        gpu_queue: &wgpu::Queue,
        render_type: TerrainRenderType,
        camera: DVec3,
        view_proj: Mat4,
    ) -> u32 {
        let draw_count = self.pack_render_type(render_type);
        if draw_count == 0 {
            return 0;
        }

        let block_offset = indirect.record(gpu_queue, &self.scratch[..draw_count as usize]);

        let this: &'a Self = self;
        if !this.bind_geometry(pass, render_type) {
            return 0;
        }
        this.push_transform(pass, camera, view_proj);

        let indirect: &'a IndirectArgBuffer = indirect;
        pass.multi_draw_indexed_indirect(indirect.buffer(), block_offset, draw_count);

        draw_count
    }

    /// Direct fallback for configurations without indirect-draw support:
    /// one `draw_indexed` per ready record, same ordering and the same
    /// readiness gate as the indirect path.
    pub fn build_draw_batches_direct<'a>(
        &'a mut self,
        pass: &mut wgpu::RenderPass<'a>,
        render_type: TerrainRenderType,
        camera: DVec3,
        view_proj: Mat4,
    ) -> u32 {
        let draw_count = self.pack_render_type(render_type);
        if draw_count == 0 {
            return 0;
        }

        let this: &'a Self = self;
        if !this.bind_geometry(pass, render_type) {
            return 0;
        }
        this.push_transform(pass, camera, view_proj);

        for args in &this.scratch[..draw_count as usize] {
            pass.draw_indexed(
                args.first_index..args.first_index + args.index_count,
                args.base_vertex,
                args.base_instance..args.base_instance + 1,
            );
        }

        draw_count
    }

    /// Readiness-gated packing of one render type's queue into `scratch`.
    fn pack_render_type(&mut self, render_type: TerrainRenderType) -> u32 {
        let Some(queue) = self.queues[render_type.index()].as_ref() else {
            return 0;
        };
        if queue.is_empty() {
            return 0;
        }
        let Some(vertex_buffer) = self.vertex_buffer.as_ref() else {
            return 0;
        };

        let ready = |segment: &Segment| vertex_buffer.is_segment_ready(segment);
        if render_type.uses_sorted_indices() {
            batch::pack_indirect_args(queue.iter_rev(), ready, &mut self.scratch)
        } else {
            batch::pack_indirect_args(queue.iter(), ready, &mut self.scratch)
        }
    }

    /// Binds the region's vertex buffer and, for sorted-index render
    /// types, its shared u16 index buffer. Returns false when a required
    /// buffer is missing.
    fn bind_geometry<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        render_type: TerrainRenderType,
    ) -> bool {
        let Some(vertex_buffer) = self.vertex_buffer.as_ref() else {
            return false;
        };

        if render_type.uses_sorted_indices() {
            let Some(index_buffer) = self.index_buffer.as_ref() else {
                log::warn!(
                    "[DrawBuffers] region {}: translucent batch without index buffer",
                    self.index
                );
                return false;
            };
            pass.set_index_buffer(index_buffer.buffer().slice(..), wgpu::IndexFormat::Uint16);
        }

        pass.set_vertex_buffer(0, vertex_buffer.buffer().slice(..));
        true
    }

    fn push_transform(&self, pass: &mut wgpu::RenderPass<'_>, camera: DVec3, view_proj: Mat4) {
        let transform = self.camera_relative_transform(view_proj, camera);
        let columns = transform.to_cols_array();
        pass.set_push_constants(wgpu::ShaderStages::VERTEX, 0, bytemuck::cast_slice(&columns));
    }

    /// Promotes this frame's staged uploads to ready. Call after the queue
    /// submission that carries them.
    pub fn uploads_submitted(&mut self) {
        if let Some(vertex_buffer) = self.vertex_buffer.as_mut() {
            vertex_buffer.uploads_submitted();
        }
        if let Some(index_buffer) = self.index_buffer.as_mut() {
            index_buffer.uploads_submitted();
        }
    }

    pub(crate) fn free_vertex_segment(&mut self, segment: &mut Segment) {
        if let Some(vertex_buffer) = self.vertex_buffer.as_mut() {
            vertex_buffer.free_segment(segment);
        }
    }

    /// Destroys both device buffers and returns to the unallocated state.
    /// Queues are left intact so the region can be repopulated after a
    /// re-allocation. No-op when not allocated.
    pub fn release_buffers(&mut self) {
        if !self.allocated {
            return;
        }
        log::debug!("[DrawBuffers] releasing region {}", self.index);

        if let Some(vertex_buffer) = self.vertex_buffer.take() {
            vertex_buffer.free();
        }
        if let Some(index_buffer) = self.index_buffer.take() {
            index_buffer.free();
        }
        self.allocated = false;
    }

    /// Empties every render queue without touching buffer allocations.
    pub fn clear(&mut self) {
        for queue in self.queues.iter_mut().flatten() {
            queue.clear();
        }
    }

    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    pub fn min_height(&self) -> i32 {
        self.min_height
    }

    pub fn vertex_buffer(&self) -> Option<&AreaBuffer> {
        self.vertex_buffer.as_ref()
    }

    pub fn index_buffer(&self) -> Option<&AreaBuffer> {
        self.index_buffer.as_ref()
    }

    pub fn has_queue(&self, render_type: TerrainRenderType) -> bool {
        self.queues[render_type.index()].is_some()
    }

    pub fn queue_len(&self, render_type: TerrainRenderType) -> usize {
        self.queues[render_type.index()]
            .as_ref()
            .map_or(0, StaticQueue::len)
    }
}
