use crate::error::Error;
use coord_2d::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// An element of the symmetry group of the square. Each variant is described by where the
/// top row of a pattern `##.` ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Orientation {
    /// ##.
    /// ...
    /// ...
    Original,
    /// .##
    /// ...
    /// ...
    Reflected,
    /// ...
    /// #..
    /// #..
    Rotated90,
    /// ...
    /// ..#
    /// ..#
    ReflectedRotated90,
    /// ...
    /// ...
    /// .##
    Rotated180,
    /// ...
    /// ...
    /// ##.
    ReflectedRotated180,
    /// ..#
    /// ..#
    /// ...
    Rotated270,
    /// #..
    /// #..
    /// ...
    ReflectedRotated270,
}

use self::Orientation::*;

/// Every orientation, in the order variants of a sampled window are generated. Each odd entry is
/// the reflection of the entry before it, and each even entry is the rotation of the even entry
/// before it.
pub const ALL: [Orientation; 8] = [
    Original,
    Reflected,
    Rotated90,
    ReflectedRotated90,
    Rotated180,
    ReflectedRotated180,
    Rotated270,
    ReflectedRotated270,
];

impl Orientation {
    /// Maps a coordinate of the transformed pattern to the coordinate of the original pattern
    /// it reads from.
    pub fn transform_coord(self, pattern_size: u32, coord: Coord) -> Coord {
        let n = pattern_size as i32 - 1;
        let Coord { x, y } = coord;
        match self {
            Original => coord,
            Reflected => Coord::new(n - x, y),
            Rotated90 => Coord::new(n - y, x),
            ReflectedRotated90 => Coord::new(n - y, n - x),
            Rotated180 => Coord::new(n - x, n - y),
            ReflectedRotated180 => Coord::new(x, n - y),
            Rotated270 => Coord::new(y, n - x),
            ReflectedRotated270 => Coord::new(y, x),
        }
    }
}

/// How many of the orientations in `ALL` are sampled from each window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub enum Symmetry {
    None,
    Reflect,
    All,
}

impl Symmetry {
    pub fn count(self) -> usize {
        match self {
            Symmetry::None => 1,
            Symmetry::Reflect => 2,
            Symmetry::All => 8,
        }
    }

    pub fn orientations(self) -> &'static [Orientation] {
        &ALL[..self.count()]
    }
}

impl TryFrom<u32> for Symmetry {
    type Error = Error;
    fn try_from(count: u32) -> Result<Self, Self::Error> {
        match count {
            1 => Ok(Symmetry::None),
            2 => Ok(Symmetry::Reflect),
            8 => Ok(Symmetry::All),
            other => Err(Error::invalid_config(format!(
                "symmetry must be 1, 2 or 8 (got {})",
                other
            ))),
        }
    }
}

impl From<Symmetry> for u32 {
    fn from(symmetry: Symmetry) -> u32 {
        symmetry.count() as u32
    }
}
