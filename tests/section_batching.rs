//! End-to-end batching scenarios at the bookkeeping level.
//!
//! These tests drive the section-offset encoding, segment allocation,
//! readiness deferral and argument packing together, the way a frame loop
//! does, without touching a GPU device.

use glam::IVec3;
use strata_render::constants::terrain::VERTEX_SIZE;
use strata_render::{
    batch, DrawBuffers, DrawParams, SegmentAllocator, StaticQueue, TerrainRenderType,
    UploadBuffer, TerrainVertex,
};

fn quad_vertices() -> Vec<TerrainVertex> {
    vec![TerrainVertex::new([0.0, 0.0, 0.0], [0, 0], 15); 4]
}

#[test]
fn uploaded_section_produces_the_packed_argument_block() {
    // Region at the world origin, zero height baseline.
    let region = DrawBuffers::new(0, IVec3::ZERO, 0);
    let mut vertex_alloc = SegmentAllocator::new(4000, VERTEX_SIZE);

    // Something else already lives in the buffer so the section lands at a
    // non-zero offset.
    let _resident = vertex_alloc
        .allocate(35 * VERTEX_SIZE)
        .expect("allocation should succeed");

    // A 4-vertex quad mesh at local offset (5, 10, 3) with auto indices.
    let upload = UploadBuffer::new(&quad_vertices(), None);
    assert!(upload.auto_indices());
    assert_eq!(upload.index_count(), 6);

    let params = DrawParams::new_shared(false);
    {
        let mut p = params.borrow_mut();
        let segment = vertex_alloc
            .allocate(upload.vertex_data().len() as u32)
            .expect("allocation should succeed");
        let vertex_offset = segment.offset().map_or(0, |o| (o / VERTEX_SIZE) as i32);
        *p.vertex_segment_mut() = segment;
        p.apply_upload(
            region.encode_section_offset(5, 10, 3),
            upload.index_count(),
            vertex_offset,
            0,
        );
    }
    vertex_alloc.mark_uploads_complete();

    let mut queue = StaticQueue::new(8);
    queue.push(params);

    let mut args = Vec::new();
    let draw_count = batch::pack_indirect_args(queue.iter(), |s| vertex_alloc.is_ready(s), &mut args);
    assert_eq!(draw_count, 1);

    let block = args[0];
    assert_eq!(block.index_count, 6);
    assert_eq!(block.instance_count, 1);
    assert_eq!(block.first_index, 0);
    assert_eq!(block.base_vertex, 35);
    assert_eq!(block.base_instance, 10 << 16 | 3 << 8 | 5);

    // The packed record is exactly the 20-byte indirect layout.
    assert_eq!(bytemuck::bytes_of(&block).len(), 20);
}

#[test]
fn unready_sections_defer_until_the_next_frame() {
    let mut vertex_alloc = SegmentAllocator::new(4000, VERTEX_SIZE);

    let ready = DrawParams::new_shared(false);
    let pending = DrawParams::new_shared(false);
    {
        let mut p = ready.borrow_mut();
        *p.vertex_segment_mut() = vertex_alloc.allocate(80).expect("allocation should succeed");
        p.apply_upload(1, 6, 0, 0);
    }
    vertex_alloc.mark_uploads_complete();
    {
        let mut p = pending.borrow_mut();
        *p.vertex_segment_mut() = vertex_alloc.allocate(80).expect("allocation should succeed");
        p.apply_upload(2, 6, 4, 0);
    }

    let mut queue = StaticQueue::new(8);
    queue.push(ready.clone());
    queue.push(pending.clone());

    // Frame 1: only the submitted section draws.
    let mut args = Vec::new();
    let drawn = batch::pack_indirect_args(queue.iter(), |s| vertex_alloc.is_ready(s), &mut args);
    assert_eq!(drawn, 1);
    assert_eq!(args[0].base_instance, 1);
    assert!(!pending.borrow().is_ready());

    // Frame 2: the pending upload has been submitted, both draw.
    vertex_alloc.mark_uploads_complete();
    let drawn = batch::pack_indirect_args(queue.iter(), |s| vertex_alloc.is_ready(s), &mut args);
    assert_eq!(drawn, 2);
    assert!(pending.borrow().is_ready());
}

#[test]
fn translucent_sections_draw_back_to_front() {
    let mut queue = StaticQueue::new(8);
    for base_instance in [1u32, 2, 3] {
        let params = DrawParams::new_shared(true);
        params.borrow_mut().apply_upload(base_instance, 6, 0, 0);
        params.borrow_mut().mark_ready();
        queue.push(params);
    }

    let mut args = Vec::new();

    // Translucency iterates the queue reversed.
    batch::pack_indirect_args(queue.iter_rev(), |_| true, &mut args);
    let order: Vec<u32> = args.iter().map(|a| a.base_instance).collect();
    assert_eq!(order, vec![3, 2, 1]);

    // Every other render type draws in insertion order.
    batch::pack_indirect_args(queue.iter(), |_| true, &mut args);
    let order: Vec<u32> = args.iter().map(|a| a.base_instance).collect();
    assert_eq!(order, vec![1, 2, 3]);
}

#[test]
fn retired_sections_return_their_storage() {
    let mut vertex_alloc = SegmentAllocator::new(4000, VERTEX_SIZE);
    let params = DrawParams::new_shared(false);

    let before = vertex_alloc.free_bytes();
    {
        let mut p = params.borrow_mut();
        *p.vertex_segment_mut() = vertex_alloc.allocate(80).expect("allocation should succeed");
        p.apply_upload(5, 6, 0, 0);
        p.mark_ready();
    }
    assert_eq!(vertex_alloc.free_bytes(), before - 80);

    // Retirement frees the segment and clears every draw field.
    {
        let mut p = params.borrow_mut();
        p.reset(None);
        vertex_alloc.free(p.vertex_segment_mut());
    }
    assert_eq!(vertex_alloc.free_bytes(), before);
    let p = params.borrow();
    assert!(!p.vertex_segment().is_assigned());
    assert_eq!(p.index_count(), 0);
    assert!(!p.is_ready());
}

#[test]
fn render_type_queues_are_independent() {
    let mut region = DrawBuffers::new(7, IVec3::new(128, 0, 128), -64);
    region.add_render_types(TerrainRenderType::ALL);

    let solid = DrawParams::new_shared(false);
    let translucent = DrawParams::new_shared(true);
    region.add_draw_commands(TerrainRenderType::Solid, &solid);
    region.add_draw_commands(TerrainRenderType::Translucent, &translucent);

    assert_eq!(region.queue_len(TerrainRenderType::Solid), 1);
    assert_eq!(region.queue_len(TerrainRenderType::Translucent), 1);
    assert_eq!(region.queue_len(TerrainRenderType::Cutout), 0);

    region.clear();
    assert_eq!(region.queue_len(TerrainRenderType::Solid), 0);
    assert_eq!(region.queue_len(TerrainRenderType::Translucent), 0);
}
