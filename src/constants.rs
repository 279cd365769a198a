// Strata render constants - SINGLE SOURCE OF TRUTH
//
// Buffer capacities, strides and encoding masks shared by every module in
// this crate. Do NOT redefine these anywhere else.

/// Terrain geometry layout constants.
pub mod terrain {
    /// Stride of one packed terrain vertex in bytes.
    pub const VERTEX_SIZE: u32 = 20;

    /// Terrain meshes index with u16.
    pub const INDEX_SIZE: u32 = 2;

    /// Initial capacity of one region's vertex buffer in bytes.
    pub const VERTEX_BUFFER_CAPACITY: u32 = 3_500_000;

    /// Initial capacity of one region's index buffer in bytes.
    /// Only translucent geometry needs explicit (sorted) indices, so this
    /// is much smaller than the vertex buffer.
    pub const INDEX_BUFFER_CAPACITY: u32 = 1_000_000;
}

/// Per-region draw submission constants.
pub mod draw {
    /// Capacity of one render-type's section queue. Hardcoded to the
    /// maximum number of sections one region can hold.
    pub const QUEUE_CAPACITY: usize = 512;

    /// Size of one packed indexed-indirect argument record in bytes.
    pub const INDIRECT_COMMAND_SIZE: u32 = 20;

    /// Default capacity of the shared indirect argument ring, in draws.
    pub const INDIRECT_RING_DRAWS: u32 = 4096;
}

/// Section-offset encoding constants.
pub mod encoding {
    /// Each axis of a section offset is masked to 7 bits before packing,
    /// limiting region-local offsets to 0..=127. Larger offsets wrap.
    pub const SECTION_AXIS_MASK: i32 = 127;

    /// Bit position of the height-relative Y component.
    pub const SECTION_Y_SHIFT: u32 = 16;

    /// Bit position of the Z component.
    pub const SECTION_Z_SHIFT: u32 = 8;
}
