//! Frame-synchronous batch building.
//!
//! The readiness-gated packing loop is kept free of GPU types so the gate,
//! the ordering rule, and the argument layout can be tested directly. The
//! region manager wraps it with buffer binds and the actual draw calls.

use crate::draw_params::DrawParamsRef;
use crate::indirect::DrawIndexedIndirectArgs;
use crate::suballoc::Segment;

/// Packs one indirect argument record per drawable entry of a queue.
///
/// A record that is not yet latched ready and whose vertex segment is
/// assigned is checked against the allocator; if the segment is still
/// pending the record is skipped this frame and retried on the next build.
/// Once observed ready the record is latched and never re-checked.
///
/// Iteration direction is the caller's: translucency passes the queue
/// reversed for approximate back-to-front order.
///
/// Returns the number of records packed into `out`.
pub fn pack_indirect_args<'q>(
    entries: impl Iterator<Item = &'q DrawParamsRef>,
    mut segment_ready: impl FnMut(&Segment) -> bool,
    out: &mut Vec<DrawIndexedIndirectArgs>,
) -> u32 {
    out.clear();
    let mut draw_count = 0u32;

    for entry in entries {
        let mut params = entry.borrow_mut();

        if !params.is_ready() && params.vertex_segment().is_assigned() {
            if !segment_ready(params.vertex_segment()) {
                continue;
            }
            params.mark_ready();
        }

        out.push(DrawIndexedIndirectArgs {
            index_count: params.index_count(),
            instance_count: 1,
            first_index: params.first_index(),
            base_vertex: params.vertex_offset(),
            base_instance: params.base_instance(),
        });
        draw_count += 1;
    }

    draw_count
}
