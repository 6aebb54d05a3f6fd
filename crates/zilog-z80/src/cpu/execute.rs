//! Base-page instruction execution, with optional DD/FD index substitution.

use emu_core::Bus;

use crate::alu;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, flag_if};
use crate::registers::Index;

use super::Z80;

impl Z80 {
    /// Execute an unprefixed opcode. With `index` set, HL, H and L (and
    /// `(HL)` as `(IX+d)`) refer to the selected index register instead.
    pub(super) fn execute_main<B: Bus>(&mut self, bus: &mut B, op: u8, index: Option<Index>) {
        match op {
            // NOP
            0x00 => {}

            // LD rr, nn (01=BC, 11=DE, 21=HL, 31=SP)
            0x01 | 0x11 | 0x21 | 0x31 => {
                let value = self.fetch_word(bus);
                self.set_rp(op >> 4, index, value);
            }

            // LD (BC), A / LD (DE), A
            0x02 | 0x12 => {
                let address = if op == 0x02 {
                    self.regs.bc()
                } else {
                    self.regs.de()
                };
                self.write(bus, address, self.regs.a);
                self.regs.wz = u16::from(self.regs.a) << 8 | (address.wrapping_add(1) & 0xFF);
            }

            // INC rr
            0x03 | 0x13 | 0x23 | 0x33 => {
                self.internal(2);
                let value = self.rp(op >> 4, index).wrapping_add(1);
                self.set_rp(op >> 4, index, value);
            }

            // DEC rr
            0x0B | 0x1B | 0x2B | 0x3B => {
                self.internal(2);
                let value = self.rp(op >> 4, index).wrapping_sub(1);
                self.set_rp(op >> 4, index, value);
            }

            // INC r
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x3C => {
                let r = op >> 3;
                let result = alu::inc8(self.reg8(r, index));
                self.set_reg8(r, index, result.value);
                self.set_f((self.regs.f & CF) | result.flags);
            }

            // DEC r
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x3D => {
                let r = op >> 3;
                let result = alu::dec8(self.reg8(r, index));
                self.set_reg8(r, index, result.value);
                self.set_f((self.regs.f & CF) | result.flags);
            }

            // INC (HL)
            0x34 => {
                let address = self.memory_operand(bus, index);
                let value = self.read(bus, address);
                self.internal(1);
                let result = alu::inc8(value);
                self.write(bus, address, result.value);
                self.set_f((self.regs.f & CF) | result.flags);
            }

            // DEC (HL)
            0x35 => {
                let address = self.memory_operand(bus, index);
                let value = self.read(bus, address);
                self.internal(1);
                let result = alu::dec8(value);
                self.write(bus, address, result.value);
                self.set_f((self.regs.f & CF) | result.flags);
            }

            // LD r, n
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x3E => {
                let value = self.fetch_byte(bus);
                self.set_reg8(op >> 3, index, value);
            }

            // LD (HL), n
            0x36 => {
                let address = match index {
                    None => self.regs.hl(),
                    Some(idx) => {
                        let d = self.fetch_displacement(bus);
                        let address = self.regs.index(idx).wrapping_add_signed(i16::from(d));
                        self.regs.wz = address;
                        address
                    }
                };
                let value = self.fetch_byte(bus);
                if index.is_some() {
                    self.internal(2);
                }
                self.write(bus, address, value);
            }

            // RLCA, RRCA, RLA, RRA
            0x07 | 0x0F | 0x17 | 0x1F => {
                let result = alu::shift(op >> 3, self.regs.a, self.regs.flag(CF));
                self.regs.a = result.value;
                self.set_f(
                    (self.regs.f & (SF | ZF | PF))
                        | (result.value & (YF | XF))
                        | (result.flags & CF),
                );
            }

            // EX AF, AF'
            0x08 => self.regs.ex_af(),

            // ADD HL, rr
            0x09 | 0x19 | 0x29 | 0x39 => {
                let hl = self.hl_or_index(index);
                let rr = self.rp(op >> 4, index);
                self.internal(7);
                self.regs.wz = hl.wrapping_add(1);
                let (value, flags) = alu::add16(hl, rr);
                self.set_hl_or_index(index, value);
                self.set_f((self.regs.f & (SF | ZF | PF)) | flags);
            }

            // LD A, (BC) / LD A, (DE)
            0x0A | 0x1A => {
                let address = if op == 0x0A {
                    self.regs.bc()
                } else {
                    self.regs.de()
                };
                self.regs.a = self.read(bus, address);
                self.regs.wz = address.wrapping_add(1);
            }

            // DJNZ e
            0x10 => {
                self.internal(1);
                let e = self.fetch_displacement(bus);
                self.regs.b = self.regs.b.wrapping_sub(1);
                if self.regs.b != 0 {
                    self.internal(5);
                    self.jump_relative(e);
                }
            }

            // JR e
            0x18 => {
                let e = self.fetch_displacement(bus);
                self.internal(5);
                self.jump_relative(e);
            }

            // JR cc, e (NZ, Z, NC, C)
            0x20 | 0x28 | 0x30 | 0x38 => {
                let e = self.fetch_displacement(bus);
                if self.condition((op >> 3) & 3) {
                    self.internal(5);
                    self.jump_relative(e);
                }
            }

            // LD (nn), HL
            0x22 => {
                let address = self.fetch_word(bus);
                let value = self.hl_or_index(index);
                self.write_word(bus, address, value);
                self.regs.wz = address.wrapping_add(1);
            }

            // LD HL, (nn)
            0x2A => {
                let address = self.fetch_word(bus);
                let value = self.read_word(bus, address);
                self.set_hl_or_index(index, value);
                self.regs.wz = address.wrapping_add(1);
            }

            // DAA
            0x27 => {
                let result = alu::daa(self.regs.a, self.regs.f);
                self.regs.a = result.value;
                self.set_f(result.flags);
            }

            // CPL
            0x2F => {
                self.regs.a = !self.regs.a;
                self.set_f(
                    (self.regs.f & (SF | ZF | PF | CF))
                        | HF
                        | NF
                        | (self.regs.a & (XF | YF)),
                );
            }

            // LD (nn), A
            0x32 => {
                let address = self.fetch_word(bus);
                self.write(bus, address, self.regs.a);
                self.regs.wz = u16::from(self.regs.a) << 8 | (address.wrapping_add(1) & 0xFF);
            }

            // LD A, (nn)
            0x3A => {
                let address = self.fetch_word(bus);
                self.regs.a = self.read(bus, address);
                self.regs.wz = address.wrapping_add(1);
            }

            // SCF
            0x37 => {
                // Undocumented: X/Y flags from (prev_Q XOR F) OR A
                let q_xor_f = self.prev_q ^ self.regs.f;
                self.set_f(
                    (self.regs.f & (SF | ZF | PF)) | CF | ((q_xor_f | self.regs.a) & (XF | YF)),
                );
            }

            // CCF
            0x3F => {
                let carry = self.regs.flag(CF);
                let q_xor_f = self.prev_q ^ self.regs.f;
                self.set_f(
                    (self.regs.f & (SF | ZF | PF))
                        | ((q_xor_f | self.regs.a) & (XF | YF))
                        | flag_if(carry, HF)
                        | flag_if(!carry, CF),
                );
            }

            // HALT
            0x76 => self.halt(),

            // LD r, r' / LD r, (HL) / LD (HL), r
            0x40..=0x7F => {
                let dst = (op >> 3) & 7;
                let src = op & 7;
                if src == 6 {
                    // The register operand is never substituted here.
                    let address = self.memory_operand(bus, index);
                    let value = self.read(bus, address);
                    self.set_reg8(dst, None, value);
                } else if dst == 6 {
                    let address = self.memory_operand(bus, index);
                    let value = self.reg8(src, None);
                    self.write(bus, address, value);
                } else {
                    let value = self.reg8(src, index);
                    self.set_reg8(dst, index, value);
                }
            }

            // ADD/ADC/SUB/SBC/AND/XOR/OR/CP A, r
            0x80..=0xBF => {
                let src = op & 7;
                let value = if src == 6 {
                    let address = self.memory_operand(bus, index);
                    self.read(bus, address)
                } else {
                    self.reg8(src, index)
                };
                self.accumulate(op >> 3, value);
            }

            // RET cc
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                self.internal(1);
                if self.condition(op >> 3) {
                    self.regs.pc = self.pop(bus);
                    self.regs.wz = self.regs.pc;
                }
            }

            // POP rr (C1=BC, D1=DE, E1=HL, F1=AF)
            0xC1 | 0xD1 | 0xE1 | 0xF1 => {
                let value = self.pop(bus);
                match op {
                    0xC1 => self.regs.set_bc(value),
                    0xD1 => self.regs.set_de(value),
                    0xE1 => self.set_hl_or_index(index, value),
                    _ => self.regs.set_af(value),
                }
            }

            // JP cc, nn
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                let address = self.fetch_word(bus);
                self.regs.wz = address;
                if self.condition(op >> 3) {
                    self.regs.pc = address;
                }
            }

            // JP nn
            0xC3 => {
                let address = self.fetch_word(bus);
                self.regs.wz = address;
                self.regs.pc = address;
            }

            // CALL cc, nn
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                let address = self.fetch_word(bus);
                self.regs.wz = address;
                if self.condition(op >> 3) {
                    self.internal(1);
                    self.push(bus, self.regs.pc);
                    self.regs.pc = address;
                }
            }

            // CALL nn
            0xCD => {
                let address = self.fetch_word(bus);
                self.regs.wz = address;
                self.internal(1);
                self.push(bus, self.regs.pc);
                self.regs.pc = address;
            }

            // PUSH rr (C5=BC, D5=DE, E5=HL, F5=AF)
            0xC5 | 0xD5 | 0xE5 | 0xF5 => {
                let value = match op {
                    0xC5 => self.regs.bc(),
                    0xD5 => self.regs.de(),
                    0xE5 => self.hl_or_index(index),
                    _ => self.regs.af(),
                };
                self.internal(1);
                self.push(bus, value);
            }

            // ADD/ADC/SUB/SBC/AND/XOR/OR/CP A, n
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                let value = self.fetch_byte(bus);
                self.accumulate(op >> 3, value);
            }

            // RST p
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                self.internal(1);
                self.push(bus, self.regs.pc);
                self.regs.pc = u16::from(op & 0x38);
                self.regs.wz = self.regs.pc;
            }

            // RET
            0xC9 => {
                self.regs.pc = self.pop(bus);
                self.regs.wz = self.regs.pc;
            }

            // OUT (n), A
            0xD3 => {
                let n = self.fetch_byte(bus);
                let a = self.regs.a;
                let port = u16::from(a) << 8 | u16::from(n);
                self.io_write(bus, port, a);
                self.regs.wz = u16::from(a) << 8 | u16::from(n.wrapping_add(1));
            }

            // EXX
            0xD9 => self.regs.exx(),

            // IN A, (n)
            0xDB => {
                let n = self.fetch_byte(bus);
                let port = u16::from(self.regs.a) << 8 | u16::from(n);
                self.regs.a = self.io_read(bus, port);
                self.regs.wz = port.wrapping_add(1);
            }

            // EX (SP), HL
            0xE3 => {
                let sp = self.regs.sp;
                let lo = self.read(bus, sp);
                let hi = self.read(bus, sp.wrapping_add(1));
                self.internal(1);
                let [old_lo, old_hi] = self.hl_or_index(index).to_le_bytes();
                self.write(bus, sp.wrapping_add(1), old_hi);
                self.write(bus, sp, old_lo);
                self.internal(2);
                let value = u16::from_le_bytes([lo, hi]);
                self.set_hl_or_index(index, value);
                self.regs.wz = value;
            }

            // JP (HL)
            0xE9 => self.regs.pc = self.hl_or_index(index),

            // EX DE, HL
            0xEB => self.regs.ex_de_hl(),

            // DI
            0xF3 => {
                self.regs.iff1 = false;
                self.regs.iff2 = false;
            }

            // LD SP, HL
            0xF9 => {
                self.internal(2);
                self.regs.sp = self.hl_or_index(index);
            }

            // EI
            0xFB => {
                self.regs.iff1 = true;
                self.regs.iff2 = true;
                self.irq.after_ei = true;
            }

            // CB, DD, ED and FD are decoded before reaching this table.
            0xCB | 0xDD | 0xED | 0xFD => {}
        }
    }

    /// Apply an accumulator operation (ADD..CP by 3-bit code) with `value`.
    fn accumulate(&mut self, code: u8, value: u8) {
        let result = alu::accumulate(code, self.regs.a, value, self.regs.flag(CF));
        if code & 7 != 7 {
            self.regs.a = result.value;
        }
        self.set_f(result.flags);
    }

    fn jump_relative(&mut self, offset: i8) {
        self.regs.pc = self.regs.pc.wrapping_add_signed(i16::from(offset));
        self.regs.wz = self.regs.pc;
    }
}
