/// What happens when a program reaches outside memory, the call stack or the
/// key pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsPolicy {
    /// Addresses wrap at 4 KB, the stack pointer cycles through the 16 frames
    /// and key indices keep their low nibble. Never faults.
    #[default]
    Lenient,
    /// Any such access fails the step with a `MachineError`.
    Strict,
}

/// How sprite pixels past the right or bottom edge of the screen are drawn.
///
/// The starting coordinate always wraps (`x mod 64`, `y mod 32`); this only
/// decides the fate of the pixels that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpriteEdge {
    /// Pixels off the edge are dropped.
    #[default]
    Clip,
    /// Each pixel wraps around to the opposite edge.
    Wrap,
    /// Pixels are placed at the raw row-major index `y * 64 + x`, so columns
    /// past the right edge spill onto the next row. Indices past the end of
    /// the buffer are dropped.
    Spill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub bounds: BoundsPolicy,
    pub sprite_edge: SpriteEdge,
    /// Seed for the `Cxkk` byte source, `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Config {
    pub fn with_bounds(mut self, bounds: BoundsPolicy) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_sprite_edge(mut self, sprite_edge: SpriteEdge) -> Self {
        self.sprite_edge = sprite_edge;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn is_strict(&self) -> bool {
        self.bounds == BoundsPolicy::Strict
    }
}
