use log::{debug, warn};

use crate::config::BoundsPolicy;
use crate::error::MachineError;
use crate::registers::{IndexRegister, ProgramCounter};

pub type TypeAddr = u16; // in reality u12
type FontBytes = [u8; FONT_SIZE];

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: usize = 0x200;
/// Largest ROM that fits between `PROGRAM_START` and the end of memory.
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START;
pub const FONT_ADDRESS: usize = 0x50;
pub const FONT_SIZE: usize = 5 * 16;
/// Bytes per hex digit glyph.
pub const GLYPH_HEIGHT: usize = 5;
pub const STACK_DEPTH: usize = 16;

pub const DEFAULT_FONT: FontBytes = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Address of the glyph for the low nibble of `digit`.
pub fn glyph_address(digit: u8) -> TypeAddr {
    (FONT_ADDRESS + GLYPH_HEIGHT * (digit & 0x0F) as usize) as TypeAddr
}

#[derive(Debug, Clone)]
pub struct Memory {
    // 4k bytes
    // font data stored from 050 -> 09F (000 -> 04F is empty by convention)
    bytes: [u8; MEMORY_SIZE],
    pub pc: ProgramCounter,
    pub index: IndexRegister,
    pub stack: Stack,
    bounds: BoundsPolicy,
}

impl Memory {
    pub fn new(bounds: BoundsPolicy) -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        bytes[FONT_ADDRESS..FONT_ADDRESS + FONT_SIZE].copy_from_slice(&DEFAULT_FONT);
        Self {
            bytes,
            pc: ProgramCounter(PROGRAM_START as TypeAddr),
            index: IndexRegister(0x0),
            stack: Stack::new(),
            bounds,
        }
    }

    /// Resolves an address under the bounds policy.
    fn resolve(&self, addr: usize) -> Result<usize, MachineError> {
        match self.bounds {
            BoundsPolicy::Lenient => Ok(addr % MEMORY_SIZE),
            BoundsPolicy::Strict if addr < MEMORY_SIZE => Ok(addr),
            BoundsPolicy::Strict => Err(MachineError::MemoryOutOfBounds { address: addr }),
        }
    }

    /// Fails if any of `len` bytes starting at `start` cannot be reached.
    pub fn check_range(&self, start: usize, len: usize) -> Result<(), MachineError> {
        if len == 0 {
            return Ok(());
        }
        self.resolve(start)?;
        self.resolve(start + len - 1)?;
        Ok(())
    }

    pub fn set(&mut self, addr: usize, val: u8) -> Result<(), MachineError> {
        let addr = self.resolve(addr)?;
        self.bytes[addr] = val;
        Ok(())
    }

    pub fn get(&self, addr: usize) -> Result<u8, MachineError> {
        Ok(self.bytes[self.resolve(addr)?])
    }

    /// Byte at `I + offset`.
    pub fn get_indexed(&self, offset: usize) -> Result<u8, MachineError> {
        self.get(self.index.0 as usize + offset)
    }

    pub fn set_indexed(&mut self, offset: usize, val: u8) -> Result<(), MachineError> {
        self.set(self.index.0 as usize + offset, val)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Reads the big-endian word at pc and steps over it.
    pub fn next_instruction(&mut self) -> Result<u16, MachineError> {
        let pc = self.pc.0 as usize;
        let (l, r) = (self.get(pc)?, self.get(pc + 1)?);
        self.pc.increment();
        Ok(((l as u16) << 8) | r as u16)
    }

    /// Skips the instruction after the current one.
    pub fn skip(&mut self) {
        self.pc.increment();
    }

    /// Re-runs the instruction just fetched on the next step.
    pub fn rewind(&mut self) {
        self.pc.decrement();
    }

    pub fn set_pc(&mut self, addr: TypeAddr) {
        self.pc.set_addr(addr);
    }

    pub fn set_index(&mut self, addr: TypeAddr) {
        self.index.set_addr(addr);
    }

    /// Pushes the return address (the already advanced pc) and jumps.
    pub fn call(&mut self, addr: TypeAddr) -> Result<(), MachineError> {
        if self.stack.is_full() && self.bounds == BoundsPolicy::Strict {
            return Err(MachineError::StackOverflow {
                pc: self.pc.0.wrapping_sub(2),
            });
        }
        self.stack.push(self.pc.0);
        self.set_pc(addr);
        Ok(())
    }

    pub fn ret(&mut self) -> Result<(), MachineError> {
        if self.stack.is_empty() && self.bounds == BoundsPolicy::Strict {
            return Err(MachineError::StackUnderflow {
                pc: self.pc.0.wrapping_sub(2),
            });
        }
        let addr = self.stack.pop();
        self.set_pc(addr);
        Ok(())
    }

    // loads program instructions starting at address 0x200
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), MachineError> {
        if bytes.len() > MAX_ROM_SIZE {
            warn!(
                "rejecting {} byte ROM, only {} bytes of program space",
                bytes.len(),
                MAX_ROM_SIZE
            );
            return Err(MachineError::RomTooLarge {
                size: bytes.len(),
                max: MAX_ROM_SIZE,
            });
        }
        self.bytes[PROGRAM_START..PROGRAM_START + bytes.len()].copy_from_slice(bytes);
        debug!("loaded {} byte ROM at {:#05X}", bytes.len(), PROGRAM_START);
        Ok(())
    }
}

/// Return addresses for up to 16 nested calls.
///
/// Overrunning either end cycles through the frames; the caller decides
/// beforehand whether that is allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    addresses: [TypeAddr; STACK_DEPTH],
    sp: u8,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            addresses: [0; STACK_DEPTH],
            sp: 0,
        }
    }

    pub fn push(&mut self, addr: TypeAddr) {
        self.addresses[self.sp as usize % STACK_DEPTH] = addr;
        self.sp = self.sp.wrapping_add(1);
    }

    pub fn pop(&mut self) -> TypeAddr {
        self.sp = self.sp.wrapping_sub(1);
        self.addresses[self.sp as usize % STACK_DEPTH]
    }

    pub fn sp(&self) -> u8 {
        self.sp
    }

    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }

    pub fn is_full(&self) -> bool {
        self.sp as usize >= STACK_DEPTH
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_is_seeded_at_construction() {
        let mem = Memory::new(BoundsPolicy::Lenient);
        assert_eq!(&mem.as_slice()[0x50..0xA0], &DEFAULT_FONT[..]);
        assert_eq!(mem.pc.0, 0x200);
        assert_eq!(mem.index.0, 0);
    }

    #[test]
    fn glyph_address_uses_low_nibble() {
        assert_eq!(glyph_address(0x0), 0x50);
        assert_eq!(glyph_address(0xA), 0x50 + 50);
        assert_eq!(glyph_address(0x1A), 0x50 + 50);
    }

    #[test]
    fn load_rom_copies_from_program_start() {
        let mut mem = Memory::new(BoundsPolicy::Lenient);
        mem.load_rom(&[0xAB, 0xCD, 0xEF]).unwrap();
        assert_eq!(&mem.as_slice()[0x200..0x203], &[0xAB, 0xCD, 0xEF]);
    }

    #[test]
    fn load_rom_accepts_exact_capacity() {
        let mut mem = Memory::new(BoundsPolicy::Strict);
        let rom = vec![0x11; MAX_ROM_SIZE];
        mem.load_rom(&rom).unwrap();
        assert_eq!(mem.as_slice()[0xFFF], 0x11);
    }

    #[test]
    fn load_rom_rejects_oversized_without_writing() {
        let mut mem = Memory::new(BoundsPolicy::Lenient);
        let rom = vec![0x11; MAX_ROM_SIZE + 1];
        assert_eq!(
            mem.load_rom(&rom),
            Err(MachineError::RomTooLarge {
                size: 3585,
                max: 3584
            })
        );
        assert_eq!(mem.as_slice()[0x200], 0);
        assert_eq!(&mem.as_slice()[0x50..0xA0], &DEFAULT_FONT[..]);
    }

    #[test]
    fn next_instruction_is_big_endian_and_advances() {
        let mut mem = Memory::new(BoundsPolicy::Lenient);
        mem.load_rom(&[0x12, 0x34]).unwrap();
        assert_eq!(mem.next_instruction(), Ok(0x1234));
        assert_eq!(mem.pc.0, 0x202);
    }

    #[test]
    fn lenient_access_wraps_at_four_kilobytes() {
        let mut mem = Memory::new(BoundsPolicy::Lenient);
        mem.set(0x1000, 0x42).unwrap();
        assert_eq!(mem.get(0x0), Ok(0x42));
        mem.set_pc(0xFFF);
        mem.set(0xFFF, 0x00).unwrap();
        assert_eq!(mem.next_instruction(), Ok(0x0042));
    }

    #[test]
    fn strict_access_faults_past_the_end() {
        let mut mem = Memory::new(BoundsPolicy::Strict);
        assert_eq!(
            mem.set(0x1000, 1),
            Err(MachineError::MemoryOutOfBounds { address: 0x1000 })
        );
        assert_eq!(
            mem.check_range(0xFFE, 3),
            Err(MachineError::MemoryOutOfBounds { address: 0x1000 })
        );
        assert!(mem.check_range(0xFFD, 3).is_ok());
        assert!(mem.check_range(0x2000, 0).is_ok());
    }

    #[test]
    fn call_then_ret_restores_pc() {
        let mut mem = Memory::new(BoundsPolicy::Strict);
        mem.set_pc(0x202);
        mem.call(0x300).unwrap();
        assert_eq!(mem.pc.0, 0x300);
        assert_eq!(mem.stack.sp(), 1);
        mem.ret().unwrap();
        assert_eq!(mem.pc.0, 0x202);
        assert!(mem.stack.is_empty());
    }

    #[test]
    fn strict_stack_reports_overflow_and_underflow() {
        let mut mem = Memory::new(BoundsPolicy::Strict);
        mem.set_pc(0x202);
        assert_eq!(mem.ret(), Err(MachineError::StackUnderflow { pc: 0x200 }));
        for _ in 0..STACK_DEPTH {
            mem.call(0x202).unwrap();
        }
        assert_eq!(
            mem.call(0x400),
            Err(MachineError::StackOverflow { pc: 0x200 })
        );
        assert_eq!(mem.pc.0, 0x202);
    }

    #[test]
    fn lenient_stack_cycles_through_frames() {
        let mut mem = Memory::new(BoundsPolicy::Lenient);
        for frame in 0..=STACK_DEPTH as TypeAddr {
            mem.set_pc(0x200 + frame * 2);
            mem.call(0x300).unwrap();
        }
        assert_eq!(mem.stack.sp(), 17);
        mem.ret().unwrap();
        assert_eq!(mem.pc.0, 0x220);
        for _ in 0..STACK_DEPTH {
            mem.ret().unwrap();
        }
        // the 17th push overwrote the first frame
        assert_eq!(mem.pc.0, 0x220);
        assert!(mem.stack.is_empty());
    }

    #[test]
    fn lenient_pop_on_empty_reads_last_frame() {
        let mut stack = Stack::new();
        let addr = stack.pop();
        assert_eq!(addr, 0);
        assert_eq!(stack.sp(), 0xFF);
    }
}
