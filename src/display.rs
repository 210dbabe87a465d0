use crate::config::SpriteEdge;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// Cells are full-width colours so the buffer uploads straight to a texture.
pub const PIXEL_ON: u32 = 0xFFFF_FFFF;
pub const PIXEL_OFF: u32 = 0;

/// 64x32 monochrome screen, row-major (`y * WIDTH + x`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixel_buffer: Vec<u32>,
    edge: SpriteEdge,
}

impl FrameBuffer {
    pub fn new(edge: SpriteEdge) -> Self {
        Self {
            pixel_buffer: vec![PIXEL_OFF; WIDTH * HEIGHT],
            edge,
        }
    }

    pub fn clear_buffer(&mut self) {
        self.pixel_buffer.fill(PIXEL_OFF);
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixel_buffer
    }

    /// Off-screen coordinates read as unlit.
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.pixel_buffer[y * WIDTH + x] == PIXEL_ON
    }

    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if x < WIDTH && y < HEIGHT {
            self.pixel_buffer[y * WIDTH + x] = if on { PIXEL_ON } else { PIXEL_OFF };
        }
    }

    /// Where sprite pixel `(j, i)` lands when the sprite starts at `(x, y)`.
    fn target(&self, x: usize, y: usize, j: usize, i: usize) -> Option<usize> {
        let (nx, ny) = (x + j, y + i);
        match self.edge {
            SpriteEdge::Clip if nx < WIDTH && ny < HEIGHT => Some(ny * WIDTH + nx),
            SpriteEdge::Clip => None,
            SpriteEdge::Wrap => Some((ny % HEIGHT) * WIDTH + nx % WIDTH),
            SpriteEdge::Spill => Some(ny * WIDTH + nx).filter(|&index| index < WIDTH * HEIGHT),
        }
    }

    /// XORs `sprite` (one byte per row, MSB leftmost) onto the screen.
    ///
    /// Returns whether any lit pixel was switched off.
    pub fn paint(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let (x, y) = (x as usize % WIDTH, y as usize % HEIGHT);
        let mut vf = false;
        for (i, row) in sprite.iter().enumerate() {
            for j in 0..8 {
                if (row >> (7 - j)) & 1 == 0 {
                    continue;
                }
                let Some(index) = self.target(x, y, j, i) else {
                    continue;
                };
                if self.pixel_buffer[index] == PIXEL_ON {
                    vf = true;
                }
                self.pixel_buffer[index] ^= PIXEL_ON;
            }
        }
        vf
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(SpriteEdge::default())
    }
}
