//! Per-triangle collision attributes
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.8: collision
//! primitives carry game-defined material information (footstep sounds,
//! damage zones, climbable surfaces) alongside their geometry.
//!
//! The 64 bits are split into two 32-bit groups. The upper group holds
//! flags, the lower group holds game-defined values. Importers can encode
//! either group in a triangle's texture coordinates: the first vertex UV of
//! each UV set picks one cell of a 3x3 grid over the unit square.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec2;

/// Attribute bits attached to a collision triangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollisionAttributes(u64);

impl CollisionAttributes {
    /// No attributes
    pub const NONE: Self = Self(0);

    /// Cells per UV axis when encoding attributes in texture coordinates
    pub const UV_GRID: u32 = 3;

    /// Wrap raw bits
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw bits
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Combine a flag group and a value group
    pub const fn from_groups(flags: u32, values: u32) -> Self {
        Self(((flags as u64) << 32) | values as u64)
    }

    /// Decode both groups from a triangle's UV sets
    pub fn from_uv_sets(uv_sets: &[[Vec2; 3]]) -> Self {
        let group = Self::parse_uv_sets(uv_sets);
        Self::from_groups(group, group)
    }

    /// Flag group (upper 32 bits)
    #[allow(clippy::cast_possible_truncation)]
    pub const fn flags(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Value group (lower 32 bits)
    #[allow(clippy::cast_possible_truncation)]
    pub const fn values(self) -> u32 {
        self.0 as u32
    }

    /// Whether every bit of `mask` is set in the flag group
    pub const fn has_flags(self, mask: u32) -> bool {
        self.flags() & mask == mask
    }

    /// Builder pattern: Set bits in the flag group
    pub const fn with_flags(self, mask: u32) -> Self {
        Self::from_groups(self.flags() | mask, self.values())
    }

    /// Boolean stored at `index` of the value group
    pub const fn value_bit(self, index: u32) -> bool {
        index < 32 && self.values() & (1 << index) != 0
    }

    /// Store a boolean at `index` of the value group; indices past 31 are ignored
    pub fn set_value_bit(&mut self, index: u32, value: bool) {
        if index >= 32 {
            return;
        }
        let bit = 1 << index;
        let values = if value { self.values() | bit } else { self.values() & !bit };
        *self = Self::from_groups(self.flags(), values);
    }

    /// One 32-bit group from UV sets.
    ///
    /// UV set `i` sets bit `9 * i + row * 3 + column + 1`, where the cell is
    /// taken from the first vertex UV. UVs outside the unit square and bits
    /// past the group width are ignored.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn parse_uv_sets(uv_sets: &[[Vec2; 3]]) -> u32 {
        let range = Self::UV_GRID as f32;
        let mut group = 0u32;
        for (set, uvs) in uv_sets.iter().enumerate() {
            let column = (uvs[0].x * range).floor();
            let row = (uvs[0].y * range).floor();
            if !(0.0..range).contains(&column) || !(0.0..range).contains(&row) {
                continue;
            }
            let Ok(set) = u32::try_from(set) else {
                break;
            };
            let shift = Self::UV_GRID * Self::UV_GRID * set + row as u32 * Self::UV_GRID + column as u32 + 1;
            if shift < 32 {
                group |= 1 << shift;
            }
        }
        group
    }
}

impl From<u64> for CollisionAttributes {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}
