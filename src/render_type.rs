//! Terrain render types.
//!
//! A closed enumeration: per-region render queues are stored in an array
//! indexed by this enum, never in an open-ended map.

/// The render passes terrain geometry can belong to.
#[repr(usize)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TerrainRenderType {
    Solid,
    CutoutMipped,
    Cutout,
    Translucent,
}

impl TerrainRenderType {
    pub const COUNT: usize = 4;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Solid,
        Self::CutoutMipped,
        Self::Cutout,
        Self::Translucent,
    ];

    #[inline]
    pub fn is_translucent(self) -> bool {
        self == Self::Translucent
    }

    /// Translucent geometry carries explicit, distance-sorted indices;
    /// everything else uses the auto-generated quad index pattern.
    #[inline]
    pub fn uses_sorted_indices(self) -> bool {
        self.is_translucent()
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}
