//! Hex coordinate system for the campaign map (axial coordinates)
//!
//! Uses axial coordinates (q, r) for easy neighbor calculation.

use serde::{Deserialize, Serialize};

/// Axial hex coordinate on the campaign map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Manhattan distance in hex space
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Get all 6 neighboring hex coordinates
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),
            HexCoord::new(self.q + 1, self.r - 1),
            HexCoord::new(self.q, self.r - 1),
            HexCoord::new(self.q - 1, self.r),
            HexCoord::new(self.q - 1, self.r + 1),
            HexCoord::new(self.q, self.r + 1),
        ]
    }

    /// Neighbor that brings us closest to `target` (self if already there)
    pub fn step_toward(&self, target: &Self) -> HexCoord {
        if self == target {
            return *self;
        }
        *self
            .neighbors()
            .iter()
            .min_by_key(|n| n.distance(target))
            .expect("neighbors is never empty")
    }
}
