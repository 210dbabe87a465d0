use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::{
    config::Config,
    decode::OpCodes,
    display::FrameBuffer,
    error::MachineError,
    memory::{glyph_address, Memory, TypeAddr},
    registers::{Registers, FLAG},
    timer::Timer,
};

pub const KEY_COUNT: usize = 16;

/// The whole CHIP-8 machine: CPU, memory and the state its peripherals read.
///
/// A driver loads a ROM once, then calls [`Emulator::step`] once per cycle,
/// writing key states between steps and reading the pixels and timers after.
pub struct Emulator<R: RngCore = StdRng> {
    fb: FrameBuffer,
    pub regs: Registers,
    pub mem: Memory,
    pub delay_timer: Timer,
    pub sound_timer: Timer,
    keys: [bool; KEY_COUNT],
    opcode: u16,
    cycles: u64,
    config: Config,
    rng: R,
}

impl Emulator<StdRng> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Seeds the `Cxkk` byte source from `config.seed`, or from the OS.
    pub fn with_config(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl Default for Emulator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> Emulator<R> {
    pub fn with_rng(config: Config, rng: R) -> Self {
        Self {
            fb: FrameBuffer::new(config.sprite_edge),
            regs: Registers::new(),
            mem: Memory::new(config.bounds),
            delay_timer: Timer::default(),
            sound_timer: Timer::default(),
            keys: [false; KEY_COUNT],
            opcode: 0,
            cycles: 0,
            config,
            rng,
        }
    }

    /// Copies `rom` into memory from 0x200.
    ///
    /// Meant to be called once before the first step; loading into a running
    /// machine leaves its state up to the caller.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), MachineError> {
        if self.cycles > 0 {
            warn!("loading a ROM after {} steps", self.cycles);
        }
        self.mem.load_rom(rom)
    }

    /// One fetch, decode and execute, then both timers tick once.
    ///
    /// On error the timers and cycle count are left alone. A fault while
    /// fetching leaves the pc on the unreadable word; a fault while executing
    /// comes after the pc has moved past the instruction.
    pub fn step(&mut self) -> Result<(), MachineError> {
        let pc = self.mem.pc.0;
        let operation = self.fetch_decode()?;
        trace!(
            "{:04X}: {:04X} {:?} v{:02X?} i{:04X}",
            pc,
            self.opcode,
            operation,
            self.regs.as_array(),
            self.mem.index.0
        );
        self.execute_ins(operation)?;
        self.sync_timers();
        self.cycles += 1;
        Ok(())
    }

    pub fn fetch_decode(&mut self) -> Result<OpCodes, MachineError> {
        self.opcode = self.mem.next_instruction()?;
        Ok(OpCodes::decode_raw(self.opcode))
    }

    pub fn execute_ins(&mut self, ins: OpCodes) -> Result<(), MachineError> {
        match ins {
            OpCodes::ClearScreen => {
                self.fb.clear_buffer();
            }
            OpCodes::PopSubroutine => self.mem.ret()?,
            OpCodes::Jump(addr) => {
                self.mem.set_pc(addr);
            }
            OpCodes::PushSubroutine(addr) => self.mem.call(addr)?,
            OpCodes::SkipEqualConstant(vx, nn) => {
                if self.regs.get(vx) == nn {
                    self.mem.skip();
                }
            }
            OpCodes::SkipNotEqualConstant(vx, nn) => {
                if self.regs.get(vx) != nn {
                    self.mem.skip();
                }
            }
            OpCodes::SkipEqualRegister(vx, vy) => {
                if self.regs.get(vx) == self.regs.get(vy) {
                    self.mem.skip();
                }
            }
            OpCodes::SkipNotEqualRegister(vx, vy) => {
                if self.regs.get(vx) != self.regs.get(vy) {
                    self.mem.skip();
                }
            }
            OpCodes::SetRegister(vx, nn) => {
                self.regs.set_register(vx, nn);
            }
            OpCodes::AddToRegister(vx, nn) => {
                self.regs.add_to_register(vx, nn);
            }
            OpCodes::CopyRegister(vx, vy) => {
                self.regs.set_register(vx, self.regs.get(vy));
            }
            OpCodes::Or(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) | self.regs.get(vy));
            }
            OpCodes::And(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) & self.regs.get(vy));
            }
            OpCodes::XOr(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) ^ self.regs.get(vy));
            }
            // VF is written first, so VX is computed from the registers after it
            OpCodes::Add(vx, vy) => {
                let (sum, carry) = self.regs.get(vx).overflowing_add(self.regs.get(vy));
                self.regs.set_flag(carry);
                self.regs.set_register(vx, sum);
            }
            OpCodes::SubtractForward(vx, vy) => {
                self.regs.set_flag(self.regs.get(vx) > self.regs.get(vy)); // no borrow
                let diff = self.regs.get(vx).wrapping_sub(self.regs.get(vy));
                self.regs.set_register(vx, diff);
            }
            OpCodes::RightShift(vx, _) => {
                self.regs.set_register(FLAG, self.regs.get(vx) & 1);
                self.regs.set_register(vx, self.regs.get(vx) >> 1);
            }
            OpCodes::SubtractBackward(vx, vy) => {
                self.regs.set_flag(self.regs.get(vy) > self.regs.get(vx)); // no borrow
                let diff = self.regs.get(vy).wrapping_sub(self.regs.get(vx));
                self.regs.set_register(vx, diff);
            }
            OpCodes::LeftShift(vx, _) => {
                self.regs.set_register(FLAG, (self.regs.get(vx) & 0x80) >> 7);
                self.regs.set_register(vx, self.regs.get(vx) << 1);
            }
            OpCodes::SetIndexRegister(addr) => self.mem.set_index(addr),
            OpCodes::JumpWithOffset(addr) => {
                self.mem
                    .set_pc(addr.wrapping_add(self.regs.get(0) as TypeAddr));
            }
            OpCodes::Random(vx, nn) => {
                let mut byte = [0u8; 1];
                self.rng.fill_bytes(&mut byte);
                self.regs.set_register(vx, byte[0] & nn);
            }
            OpCodes::Display(reg_x, reg_y, height) => {
                let (x, y) = (self.regs.get(reg_x), self.regs.get(reg_y));
                // rows are read before anything is drawn
                let sprite = (0..height as usize)
                    .map(|row| self.mem.get_indexed(row))
                    .collect::<Result<Vec<u8>, _>>()?;
                let vf = self.fb.paint(x, y, &sprite);
                self.regs.set_flag(vf);
            }
            OpCodes::SkipIfPressed(vx) => {
                if self.key(self.regs.get(vx))? {
                    self.mem.skip();
                }
            }
            OpCodes::SkipIfNotPressed(vx) => {
                if !self.key(self.regs.get(vx))? {
                    self.mem.skip();
                }
            }
            OpCodes::CopyDelayToRegister(vx) => self.regs.set_register(vx, self.delay_timer.get()),
            OpCodes::GetKey(vx) => match self.keys.iter().position(|&pressed| pressed) {
                Some(key) => self.regs.set_register(vx, key as u8),
                None => {
                    debug!("waiting for a key into v{:X}", vx);
                    self.mem.rewind();
                }
            },
            OpCodes::CopyRegisterToDelay(vx) => self.delay_timer.set(self.regs.get(vx)),
            OpCodes::CopyRegisterToSound(vx) => self.sound_timer.set(self.regs.get(vx)),
            OpCodes::AddToIndex(vx) => self.mem.index.offset(self.regs.get(vx)),
            OpCodes::PointChar(vx) => {
                self.mem.set_index(glyph_address(self.regs.get(vx)));
            }
            OpCodes::ToDecimal(vx) => {
                let value = self.regs.get(vx);
                self.mem.check_range(self.mem.index.0 as usize, 3)?;
                let digits = [value / 100, value / 10 % 10, value % 10];
                for (i, digit) in digits.into_iter().enumerate() {
                    self.mem.set_indexed(i, digit)?;
                }
            }
            OpCodes::StoreRegisterToMemory(vx) => {
                self.mem
                    .check_range(self.mem.index.0 as usize, vx as usize + 1)?;
                for reg in 0..=vx {
                    self.mem.set_indexed(reg as usize, self.regs.get(reg))?;
                }
            }
            OpCodes::LoadRegisterFromMemory(vx) => {
                self.mem
                    .check_range(self.mem.index.0 as usize, vx as usize + 1)?;
                for reg in 0..=vx {
                    let reg_val = self.mem.get_indexed(reg as usize)?;
                    self.regs.set_register(reg, reg_val);
                }
            }
            OpCodes::Unimplemented(raw) => {
                debug!("ignoring unknown opcode {:04X}", raw);
            }
        }
        Ok(())
    }

    fn key(&self, key: u8) -> Result<bool, MachineError> {
        if key as usize >= KEY_COUNT && self.config.is_strict() {
            return Err(MachineError::KeyOutOfRange { key });
        }
        Ok(self.keys[(key & 0x0F) as usize])
    }

    pub fn sync_timers(&mut self) {
        self.delay_timer.tick();
        self.sound_timer.tick();
    }

    /// Records a key press or release from the input layer.
    ///
    /// Keys past 0xF are not on the pad and are ignored.
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        match self.keys.get_mut(key as usize) {
            Some(slot) => *slot = pressed,
            None => debug!("ignoring key {:#04X} outside the pad", key),
        }
    }

    pub fn keys(&self) -> &[bool; KEY_COUNT] {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut [bool; KEY_COUNT] {
        &mut self.keys
    }

    pub fn pixels(&self) -> &[u32] {
        self.fb.pixels()
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.fb.is_set(x, y)
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer.get()
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer.get()
    }

    pub fn set_delay_timer(&mut self, value: u8) {
        self.delay_timer.set(value);
    }

    pub fn set_sound_timer(&mut self, value: u8) {
        self.sound_timer.set(value);
    }

    /// The buzzer should sound while this holds.
    pub fn is_beeping(&self) -> bool {
        self.sound_timer.is_running()
    }

    pub fn registers(&self) -> &[u8; 16] {
        self.regs.as_array()
    }

    pub fn registers_mut(&mut self) -> &mut [u8; 16] {
        self.regs.as_mut_array()
    }

    pub fn pc(&self) -> u16 {
        self.mem.pc.0
    }

    pub fn index(&self) -> u16 {
        self.mem.index.0
    }

    pub fn set_index(&mut self, addr: u16) {
        self.mem.set_index(addr);
    }

    pub fn sp(&self) -> u8 {
        self.mem.stack.sp()
    }

    pub fn memory(&self) -> &[u8] {
        self.mem.as_slice()
    }

    /// The word fetched by the latest step.
    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    /// Steps completed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
