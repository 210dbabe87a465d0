//! CHIP-8 interpreter core.
//!
//! [`Emulator`] owns the whole machine. Feed it a ROM with
//! [`Emulator::load`], then drive it with [`Emulator::step`]; between steps
//! write key states with [`Emulator::set_key`] and read the screen with
//! [`Emulator::pixels`] and the buzzer with [`Emulator::is_beeping`].

pub use config::{BoundsPolicy, Config, SpriteEdge};
pub use decode::OpCodes;
pub use emulator::{Emulator, KEY_COUNT};
pub use error::MachineError;

pub mod config;
pub mod decode;
pub mod display;
pub mod emulator;
pub mod error;
pub mod memory;
pub mod registers;
pub mod timer;
