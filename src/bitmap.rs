use crate::error::{Error, Result};
use coord_2d::{Coord, Size};
use grid_2d::Grid;

/// A colour packed into 32 bits, one byte per RGBA channel with red in the lowest byte.
pub type Rgba32 = u32;

pub fn pack_rgba([r, g, b, a]: [u8; 4]) -> Rgba32 {
    u32::from_le_bytes([r, g, b, a])
}

pub fn unpack_rgba(colour: Rgba32) -> [u8; 4] {
    colour.to_le_bytes()
}

/// A decoded source image.
#[derive(Debug, Clone)]
pub struct Bitmap {
    grid: Grid<Rgba32>,
}

impl Bitmap {
    /// `pixels` is row-major, `width * height` long.
    pub fn new(width: u32, height: u32, pixels: Vec<Rgba32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyBitmap);
        }
        let size = Size::new(width, height);
        if pixels.len() != size.count() {
            return Err(Error::InvalidBitmap {
                expected: size.count(),
                actual: pixels.len(),
            });
        }
        let grid = Grid::new_fn(size, |Coord { x, y }| {
            pixels[x as usize + y as usize * width as usize]
        });
        Ok(Self { grid })
    }

    /// Builds a bitmap from a row-major buffer of 4 bytes per pixel.
    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 4 != 0 {
            return Err(Error::InvalidBitmap {
                expected: (width as usize) * (height as usize),
                actual: bytes.len() / 4,
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|p| pack_rgba([p[0], p[1], p[2], p[3]]))
            .collect();
        Self::new(width, height, pixels)
    }

    pub fn size(&self) -> Size {
        self.grid.size()
    }

    pub fn grid(&self) -> &Grid<Rgba32> {
        &self.grid
    }

    pub fn pixels(&self) -> impl Iterator<Item = Rgba32> + '_ {
        self.grid.iter().copied()
    }
}
