use bytemuck::{Pod, Zeroable};

use crate::constants::terrain::VERTEX_SIZE;

/// Packed terrain vertex, 20 bytes.
///
/// Positions are region-local; the vertex shader adds the section offset it
/// decodes from the per-draw base instance (see `DrawBuffers`).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    /// Texture coordinates, normalized u16.
    pub uv: [u16; 2],
    /// Packed block light + sky light + AO.
    pub light: u32,
}

impl TerrainVertex {
    pub fn new(position: [f32; 3], uv: [u16; 2], light: u32) -> Self {
        Self {
            position,
            uv,
            light,
        }
    }

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: VERTEX_SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // UV
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Unorm16x2,
                },
                // Light
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Uint32,
                },
            ],
        }
    }
}

// The stride constant and the struct must agree; everything downstream
// (segment offsets, indirect vertex offsets) divides by VERTEX_SIZE.
const _: () = assert!(std::mem::size_of::<TerrainVertex>() == VERTEX_SIZE as usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_stride_matches_layout() {
        assert_eq!(
            TerrainVertex::desc().array_stride,
            std::mem::size_of::<TerrainVertex>() as u64
        );
    }
}
