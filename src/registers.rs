use crate::memory::TypeAddr;

pub const REGISTER_COUNT: usize = 16;
/// VF doubles as the carry, borrow and collision flag.
pub const FLAG: u8 = 0xF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    registers: [u8; REGISTER_COUNT],
}

impl Registers {
    pub fn new() -> Self {
        Self {
            registers: [0; REGISTER_COUNT],
        }
    }

    pub fn set_register(&mut self, reg_num: u8, value: u8) {
        self.registers[Self::slot(reg_num)] = value;
    }

    /// Adds without touching VF, dropping anything past 8 bits.
    pub fn add_to_register(&mut self, reg_num: u8, value: u8) {
        let slot = Self::slot(reg_num);
        self.registers[slot] = self.registers[slot].wrapping_add(value);
    }

    pub fn set_flag(&mut self, on: bool) {
        self.set_register(FLAG, on as u8);
    }

    pub fn get(&self, reg_num: u8) -> u8 {
        self.registers[Self::slot(reg_num)]
    }

    pub fn as_array(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }

    pub fn as_mut_array(&mut self) -> &mut [u8; REGISTER_COUNT] {
        &mut self.registers
    }

    // register operands are a single nibble of the opcode
    fn slot(reg_num: u8) -> usize {
        (reg_num & 0x0F) as usize
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

// Special registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCounter(pub TypeAddr);

impl ProgramCounter {
    /// Steps over one instruction word.
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(2);
    }

    pub fn decrement(&mut self) {
        self.0 = self.0.wrapping_sub(2);
    }

    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRegister(pub TypeAddr);

impl IndexRegister {
    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }

    /// 16-bit add, no flag.
    pub fn offset(&mut self, by: u8) {
        self.0 = self.0.wrapping_add(by as TypeAddr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_to_register_wraps_without_flag() {
        let mut regs = Registers::new();
        regs.set_register(0x3, 0xF0);
        regs.add_to_register(0x3, 0x20);
        assert_eq!(regs.get(0x3), 0x10);
        assert_eq!(regs.get(FLAG), 0);
    }

    #[test]
    fn set_flag_writes_vf() {
        let mut regs = Registers::new();
        regs.set_flag(true);
        assert_eq!(regs.get(0xF), 1);
        regs.set_flag(false);
        assert_eq!(regs.get(0xF), 0);
    }

    #[test]
    fn program_counter_wraps_at_sixteen_bits() {
        let mut pc = ProgramCounter(0xFFFE);
        pc.increment();
        assert_eq!(pc.0, 0x0000);
        pc.decrement();
        assert_eq!(pc.0, 0xFFFE);
    }

    #[test]
    fn index_offset_is_sixteen_bit() {
        let mut index = IndexRegister(0xFFFF);
        index.offset(0x02);
        assert_eq!(index.0, 0x0001);
    }
}
