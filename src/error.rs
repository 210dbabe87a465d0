use crate::memory::TypeAddr;

/// Faults the machine can report.
///
/// Under `BoundsPolicy::Lenient` only `RomTooLarge` is ever produced; the
/// remaining variants are raised by `BoundsPolicy::Strict`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("stack overflow: call at {pc:#06X} with every frame in use")]
    StackOverflow { pc: TypeAddr },

    #[error("stack underflow: return at {pc:#06X} with an empty call stack")]
    StackUnderflow { pc: TypeAddr },

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("key {key:#04X} is outside the 16-key pad")]
    KeyOutOfRange { key: u8 },
}
