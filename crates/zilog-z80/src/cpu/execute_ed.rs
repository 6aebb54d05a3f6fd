//! ED-prefixed instructions.
//!
//! Opcodes with no documented meaning execute as 8 T-state NOPs. The
//! undocumented mirrors of NEG, RETN and IM behave like the documented opcodes.

use emu_core::Bus;

use crate::alu;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, flag_if, sz53, sz53p};
use crate::interrupt::InterruptMode;

use super::Z80;

/// Direction of a block instruction.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Increment,
    Decrement,
}

impl Direction {
    fn apply(self, value: u16) -> u16 {
        match self {
            Self::Increment => value.wrapping_add(1),
            Self::Decrement => value.wrapping_sub(1),
        }
    }
}

impl Z80 {
    /// Execute an ED-prefixed opcode.
    pub(super) fn execute_ed<B: Bus>(&mut self, bus: &mut B, op: u8) {
        use Direction::{Decrement, Increment};

        match op {
            // IN r, (C) (ED 70 = IN F,(C): flags only)
            0x40 | 0x48 | 0x50 | 0x58 | 0x60 | 0x68 | 0x70 | 0x78 => {
                let port = self.regs.bc();
                let value = self.io_read(bus, port);
                self.regs.wz = port.wrapping_add(1);
                if op != 0x70 {
                    self.set_reg8(op >> 3, None, value);
                }
                self.set_f((self.regs.f & CF) | sz53p(value));
            }

            // OUT (C), r (ED 71 = OUT (C),0)
            0x41 | 0x49 | 0x51 | 0x59 | 0x61 | 0x69 | 0x71 | 0x79 => {
                let port = self.regs.bc();
                let value = if op == 0x71 {
                    0
                } else {
                    self.reg8(op >> 3, None)
                };
                self.io_write(bus, port, value);
                self.regs.wz = port.wrapping_add(1);
            }

            // SBC HL, rr
            0x42 | 0x52 | 0x62 | 0x72 => {
                let hl = self.regs.hl();
                let rr = self.rp(op >> 4, None);
                self.internal(7);
                self.regs.wz = hl.wrapping_add(1);
                let (value, flags) = alu::sbc16(hl, rr, self.regs.flag(CF));
                self.regs.set_hl(value);
                self.set_f(flags);
            }

            // ADC HL, rr
            0x4A | 0x5A | 0x6A | 0x7A => {
                let hl = self.regs.hl();
                let rr = self.rp(op >> 4, None);
                self.internal(7);
                self.regs.wz = hl.wrapping_add(1);
                let (value, flags) = alu::adc16(hl, rr, self.regs.flag(CF));
                self.regs.set_hl(value);
                self.set_f(flags);
            }

            // LD (nn), rr
            0x43 | 0x53 | 0x63 | 0x73 => {
                let address = self.fetch_word(bus);
                let value = self.rp(op >> 4, None);
                self.write_word(bus, address, value);
                self.regs.wz = address.wrapping_add(1);
            }

            // LD rr, (nn)
            0x4B | 0x5B | 0x6B | 0x7B => {
                let address = self.fetch_word(bus);
                let value = self.read_word(bus, address);
                self.set_rp(op >> 4, None, value);
                self.regs.wz = address.wrapping_add(1);
            }

            // NEG (and undocumented mirrors)
            0x44 | 0x4C | 0x54 | 0x5C | 0x64 | 0x6C | 0x74 | 0x7C => {
                let result = alu::sub8(0, self.regs.a, false);
                self.regs.a = result.value;
                self.set_f(result.flags);
            }

            // RETN / RETI (and undocumented mirrors)
            0x45 | 0x4D | 0x55 | 0x5D | 0x65 | 0x6D | 0x75 | 0x7D => {
                self.regs.iff1 = self.regs.iff2;
                self.regs.pc = self.pop(bus);
                self.regs.wz = self.regs.pc;
            }

            // IM 0 (4E and 6E set an undefined mode that acts as 0)
            0x46 | 0x4E | 0x66 | 0x6E => self.regs.im = InterruptMode::Mode0,

            // IM 1
            0x56 | 0x76 => self.regs.im = InterruptMode::Mode1,

            // IM 2
            0x5E | 0x7E => self.regs.im = InterruptMode::Mode2,

            // LD I, A
            0x47 => {
                self.internal(1);
                self.regs.i = self.regs.a;
            }

            // LD R, A
            0x4F => {
                self.internal(1);
                self.regs.r = self.regs.a;
            }

            // LD A, I / LD A, R
            0x57 | 0x5F => {
                self.internal(1);
                self.regs.a = if op == 0x57 { self.regs.i } else { self.regs.r };
                self.set_f((self.regs.f & CF) | sz53(self.regs.a) | flag_if(self.regs.iff2, PF));
                self.irq.ld_a_ir = true;
            }

            // RRD
            0x67 => {
                let address = self.regs.hl();
                let mem = self.read(bus, address);
                self.internal(4);
                let a = self.regs.a;
                self.write(bus, address, (a << 4) | (mem >> 4));
                self.regs.a = (a & 0xF0) | (mem & 0x0F);
                self.regs.wz = address.wrapping_add(1);
                self.set_f((self.regs.f & CF) | sz53p(self.regs.a));
            }

            // RLD
            0x6F => {
                let address = self.regs.hl();
                let mem = self.read(bus, address);
                self.internal(4);
                let a = self.regs.a;
                self.write(bus, address, (mem << 4) | (a & 0x0F));
                self.regs.a = (a & 0xF0) | (mem >> 4);
                self.regs.wz = address.wrapping_add(1);
                self.set_f((self.regs.f & CF) | sz53p(self.regs.a));
            }

            // LDI, LDD, LDIR, LDDR
            0xA0 => self.block_load(bus, Increment, false),
            0xA8 => self.block_load(bus, Decrement, false),
            0xB0 => self.block_load(bus, Increment, true),
            0xB8 => self.block_load(bus, Decrement, true),

            // CPI, CPD, CPIR, CPDR
            0xA1 => self.block_compare(bus, Increment, false),
            0xA9 => self.block_compare(bus, Decrement, false),
            0xB1 => self.block_compare(bus, Increment, true),
            0xB9 => self.block_compare(bus, Decrement, true),

            // INI, IND, INIR, INDR
            0xA2 => self.block_in(bus, Increment, false),
            0xAA => self.block_in(bus, Decrement, false),
            0xB2 => self.block_in(bus, Increment, true),
            0xBA => self.block_in(bus, Decrement, true),

            // OUTI, OUTD, OTIR, OTDR
            0xA3 => self.block_out(bus, Increment, false),
            0xAB => self.block_out(bus, Decrement, false),
            0xB3 => self.block_out(bus, Increment, true),
            0xBB => self.block_out(bus, Decrement, true),

            // Everything else: 8 T-state NOP
            _ => {}
        }
    }

    /// Rewind PC onto the ED prefix so the block instruction runs again.
    /// Returns the high byte of the new PC, which supplies X/Y.
    fn repeat_block(&mut self) -> u8 {
        self.internal(5);
        self.regs.pc = self.regs.pc.wrapping_sub(2);
        self.regs.wz = self.regs.pc.wrapping_add(1);
        (self.regs.pc >> 8) as u8
    }

    fn block_load<B: Bus>(&mut self, bus: &mut B, direction: Direction, repeat: bool) {
        let value = self.read(bus, self.regs.hl());
        self.write(bus, self.regs.de(), value);
        self.internal(2);
        self.regs.set_hl(direction.apply(self.regs.hl()));
        self.regs.set_de(direction.apply(self.regs.de()));
        self.regs.set_bc(self.regs.bc().wrapping_sub(1));

        let n = value.wrapping_add(self.regs.a);
        let base = (self.regs.f & (SF | ZF | CF)) | flag_if(self.regs.bc() != 0, PF);
        if repeat && self.regs.bc() != 0 {
            let pch = self.repeat_block();
            self.set_f(base | (pch & (XF | YF)));
        } else {
            self.set_f(base | (n & XF) | flag_if(n & 0x02 != 0, YF));
        }
    }

    fn block_compare<B: Bus>(&mut self, bus: &mut B, direction: Direction, repeat: bool) {
        let value = self.read(bus, self.regs.hl());
        self.internal(5);
        self.regs.wz = direction.apply(self.regs.wz);
        self.regs.set_hl(direction.apply(self.regs.hl()));
        self.regs.set_bc(self.regs.bc().wrapping_sub(1));

        let result = self.regs.a.wrapping_sub(value);
        let half = (self.regs.a & 0x0F) < (value & 0x0F);
        let n = result.wrapping_sub(u8::from(half));
        let base = (self.regs.f & CF)
            | NF
            | (result & SF)
            | flag_if(result == 0, ZF)
            | flag_if(half, HF)
            | flag_if(self.regs.bc() != 0, PF);
        if repeat && self.regs.bc() != 0 && result != 0 {
            let pch = self.repeat_block();
            self.set_f(base | (pch & (XF | YF)));
        } else {
            self.set_f(base | (n & XF) | flag_if(n & 0x02 != 0, YF));
        }
    }

    fn block_in<B: Bus>(&mut self, bus: &mut B, direction: Direction, repeat: bool) {
        self.internal(1);
        let port = self.regs.bc();
        let value = self.io_read(bus, port);
        self.regs.wz = direction.apply(port);
        self.regs.b = self.regs.b.wrapping_sub(1);
        self.write(bus, self.regs.hl(), value);
        self.regs.set_hl(direction.apply(self.regs.hl()));

        let c = direction.apply(u16::from(self.regs.c)) as u8;
        let k = u16::from(value) + u16::from(c);
        self.block_io_flags(value, k, repeat);
    }

    fn block_out<B: Bus>(&mut self, bus: &mut B, direction: Direction, repeat: bool) {
        self.internal(1);
        let value = self.read(bus, self.regs.hl());
        self.regs.b = self.regs.b.wrapping_sub(1);
        let port = self.regs.bc();
        self.io_write(bus, port, value);
        self.regs.wz = direction.apply(port);
        self.regs.set_hl(direction.apply(self.regs.hl()));

        let k = u16::from(value) + u16::from(self.regs.l);
        self.block_io_flags(value, k, repeat);
    }

    /// Flags shared by INI/OUTI and friends. `k` is the transferred byte
    /// plus the adjusted C (input) or the updated L (output).
    fn block_io_flags(&mut self, value: u8, k: u16, repeat: bool) {
        let b = self.regs.b;
        let carry = k > 0xFF;
        let negative = value & 0x80 != 0;
        let p = ((k as u8) & 7) ^ b;

        if repeat && b != 0 {
            // Repeat: HF/PF recomputed, XF/YF from PCH.
            let pch = self.repeat_block();
            let (hf, pf) = match (carry, negative) {
                (true, true) => (
                    flag_if(b & 0x0F == 0, HF),
                    sz53p(p ^ (b.wrapping_sub(1) & 7)) & PF,
                ),
                (true, false) => (
                    flag_if(b & 0x0F == 0x0F, HF),
                    sz53p(p ^ (b.wrapping_add(1) & 7)) & PF,
                ),
                (false, _) => (0, sz53p(p ^ (b & 7)) & PF),
            };
            self.set_f(
                (b & SF)
                    | (pch & (XF | YF))
                    | flag_if(negative, NF)
                    | flag_if(carry, CF)
                    | hf
                    | pf,
            );
        } else {
            self.set_f(
                sz53(b)
                    | flag_if(negative, NF)
                    | flag_if(carry, HF | CF)
                    | (sz53p(p) & PF),
            );
        }
    }
}
