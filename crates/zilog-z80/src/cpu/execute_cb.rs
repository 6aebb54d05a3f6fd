//! CB-prefixed bit instructions, plain and indexed (DDCB/FDCB).

use emu_core::Bus;

use crate::alu;
use crate::flags::{CF, HF, PF, SF, XF, YF, ZF};
use crate::registers::Index;

use super::Z80;

impl Z80 {
    /// Execute a CB-prefixed opcode.
    pub(super) fn execute_cb<B: Bus>(&mut self, bus: &mut B, op: u8) {
        let r = op & 7;
        if r == 6 {
            let address = self.regs.hl();
            let value = self.read(bus, address);
            self.internal(1);
            // BIT n,(HL) leaks WZ into X/Y.
            let xy = (self.regs.wz >> 8) as u8;
            if let Some(result) = self.bit_operation(op, value, xy) {
                self.write(bus, address, result);
            }
        } else {
            let value = self.reg8(r, None);
            if let Some(result) = self.bit_operation(op, value, value) {
                self.set_reg8(r, None, result);
            }
        }
    }

    /// Execute DD CB d op / FD CB d op.
    ///
    /// The opcode is read as a plain memory operand, not fetched by an M1
    /// cycle, so R advances only for the two prefix bytes. Every form
    /// except BIT writes the result back to memory and, undocumented, to
    /// register `op & 7` unless that is the `(HL)` slot.
    pub(super) fn execute_index_cb<B: Bus>(&mut self, bus: &mut B, index: Index) {
        let d = self.fetch_displacement(bus);
        let op = self.fetch_byte(bus);
        self.internal(2);
        let address = self.regs.index(index).wrapping_add_signed(i16::from(d));
        self.regs.wz = address;
        let value = self.read(bus, address);
        self.internal(1);
        if let Some(result) = self.bit_operation(op, value, (address >> 8) as u8) {
            self.write(bus, address, result);
            let r = op & 7;
            if r != 6 {
                self.set_reg8(r, None, result);
            }
        }
    }

    /// Shift/rotate, BIT, RES or SET by CB opcode. Returns the value to
    /// store, or `None` for BIT, which only sets flags.
    ///
    /// `xy` supplies X/Y for BIT.
    fn bit_operation(&mut self, op: u8, value: u8, xy: u8) -> Option<u8> {
        let bit = (op >> 3) & 7;
        let mask = 1u8 << bit;
        match op >> 6 {
            0 => {
                let result = alu::shift(bit, value, self.regs.flag(CF));
                self.set_f(result.flags);
                Some(result.value)
            }
            1 => {
                let tested = value & mask;
                let mut f = (self.regs.f & CF) | HF | (xy & (XF | YF)) | (tested & SF);
                if tested == 0 {
                    f |= ZF | PF;
                }
                self.set_f(f);
                None
            }
            2 => Some(value & !mask),
            _ => Some(value | mask),
        }
    }
}
