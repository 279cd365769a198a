//! Per-region GPU geometry buffer management for a voxel-world renderer.
//!
//! Each spatial region of the world owns a [`DrawBuffers`] instance: the
//! vertex (and lazily, index) storage for every mesh section inside it,
//! plus one bounded render queue per terrain render type. Finished meshes
//! are uploaded into reclaimable segments of the region's area buffers;
//! once per frame the queues are packed into either a single indirect
//! multi-draw or a run of direct draw calls.
//!
//! The embedding renderer drives the flow:
//!
//! 1. `upload()` finished meshes as they arrive (frame thread).
//! 2. Enqueue visible sections with `add_draw_commands()`.
//! 3. `build_draw_batches_indirect()` (or `_direct`) per render type
//!    inside the frame's render pass.
//! 4. After `queue.submit()`, call `uploads_submitted()` so deferred
//!    sections become drawable next frame.
//!
//! Indirect batching requires `wgpu::Features::MULTI_DRAW_INDIRECT` and
//! `PUSH_CONSTANTS` (64-byte vertex-stage range) on the device.

pub mod area_buffer;
pub mod batch;
pub mod constants;
pub mod draw_buffers;
pub mod draw_params;
pub mod error;
pub mod indirect;
pub mod queue;
pub mod render_type;
pub mod suballoc;
pub mod upload;
pub mod vertex;

pub use area_buffer::AreaBuffer;
pub use draw_buffers::DrawBuffers;
pub use draw_params::{DrawParams, DrawParamsRef};
pub use error::{DrawBufferError, DrawBufferResult};
pub use indirect::{DrawIndexedIndirectArgs, IndirectArgBuffer};
pub use queue::StaticQueue;
pub use render_type::TerrainRenderType;
pub use suballoc::{Segment, SegmentAllocator};
pub use upload::UploadBuffer;
pub use vertex::TerrainVertex;
