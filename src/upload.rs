//! Finished mesh payloads handed to a region for upload.

use crate::vertex::TerrainVertex;

/// One-shot transfer source produced by meshing.
///
/// Consumed by value by [`DrawBuffers::upload`](crate::DrawBuffers::upload);
/// dropping it releases the transient memory.
pub struct UploadBuffer {
    vertex_data: Vec<u8>,
    index_data: Vec<u8>,
    index_count: u32,
    index_only: bool,
    auto_indices: bool,
}

impl UploadBuffer {
    /// Payload for a full mesh. Pass `indices` for geometry that needs an
    /// explicit index order (translucency); `None` means the fixed
    /// auto-generated quad pattern, where four vertices yield six indices.
    pub fn new(vertices: &[TerrainVertex], indices: Option<&[u16]>) -> Self {
        let vertex_data = bytemuck::cast_slice(vertices).to_vec();
        match indices {
            Some(indices) => Self {
                vertex_data,
                index_data: bytemuck::cast_slice(indices).to_vec(),
                index_count: indices.len() as u32,
                index_only: false,
                auto_indices: false,
            },
            None => Self {
                vertex_data,
                index_data: Vec::new(),
                index_count: vertices.len() as u32 * 3 / 2,
                index_only: false,
                auto_indices: true,
            },
        }
    }

    /// Payload carrying only a re-sorted index order; the vertex data of
    /// the mesh slot is already resident.
    pub fn index_update(indices: &[u16]) -> Self {
        Self {
            vertex_data: Vec::new(),
            index_data: bytemuck::cast_slice(indices).to_vec(),
            index_count: indices.len() as u32,
            index_only: true,
            auto_indices: false,
        }
    }

    pub fn vertex_data(&self) -> &[u8] {
        &self.vertex_data
    }

    pub fn index_data(&self) -> &[u8] {
        &self.index_data
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Vertex data already resident; only indices changed.
    pub fn index_only(&self) -> bool {
        self.index_only
    }

    /// Indices follow the fixed auto-generated pattern; no explicit index
    /// buffer is needed.
    pub fn auto_indices(&self) -> bool {
        self.auto_indices
    }
}
