//! ALU operations for the Z80.
//!
//! Every function returns the complete flag byte it defines. Callers merge
//! in the bits an instruction preserves.

use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, flag_if, sz53, sz53p};

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

/// Add two bytes with optional carry.
#[must_use]
pub fn add8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u16::from(carry);
    let wide = u16::from(a) + u16::from(b) + c;
    let value = wide as u8;
    let half = (a & 0x0F) + (b & 0x0F) + c as u8 > 0x0F;
    // Both operands same sign, result different sign.
    let overflow = (a ^ b) & 0x80 == 0 && (a ^ value) & 0x80 != 0;
    AluResult {
        value,
        flags: sz53(value) | flag_if(half, HF) | flag_if(overflow, PF) | flag_if(wide > 0xFF, CF),
    }
}

/// Subtract with optional borrow.
#[must_use]
pub fn sub8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u16::from(carry);
    let value = a.wrapping_sub(b).wrapping_sub(c as u8);
    let half = u16::from(a & 0x0F) < u16::from(b & 0x0F) + c;
    let overflow = (a ^ b) & 0x80 != 0 && (a ^ value) & 0x80 != 0;
    let borrow = u16::from(a) < u16::from(b) + c;
    AluResult {
        value,
        flags: sz53(value) | NF | flag_if(half, HF) | flag_if(overflow, PF) | flag_if(borrow, CF),
    }
}

/// Compare: flags of `a - b`, but X/Y come from the operand.
#[must_use]
pub fn cp8(a: u8, b: u8) -> AluResult {
    let diff = sub8(a, b, false);
    AluResult {
        value: a,
        flags: (diff.flags & !(YF | XF)) | (b & (YF | XF)),
    }
}

#[must_use]
pub fn and8(a: u8, b: u8) -> AluResult {
    let value = a & b;
    AluResult { value, flags: sz53p(value) | HF }
}

#[must_use]
pub fn or8(a: u8, b: u8) -> AluResult {
    let value = a | b;
    AluResult { value, flags: sz53p(value) }
}

#[must_use]
pub fn xor8(a: u8, b: u8) -> AluResult {
    let value = a ^ b;
    AluResult { value, flags: sz53p(value) }
}

/// The eight accumulator operations in opcode order:
/// ADD, ADC, SUB, SBC, AND, XOR, OR, CP.
#[must_use]
pub fn accumulate(op: u8, a: u8, b: u8, carry: bool) -> AluResult {
    match op & 7 {
        0 => add8(a, b, false),
        1 => add8(a, b, carry),
        2 => sub8(a, b, false),
        3 => sub8(a, b, carry),
        4 => and8(a, b),
        5 => xor8(a, b),
        6 => or8(a, b),
        _ => cp8(a, b),
    }
}

/// Increment. Carry is not affected and must be merged by the caller.
#[must_use]
pub fn inc8(a: u8) -> AluResult {
    let value = a.wrapping_add(1);
    AluResult {
        value,
        flags: sz53(value) | flag_if(a & 0x0F == 0x0F, HF) | flag_if(a == 0x7F, PF),
    }
}

/// Decrement. Carry is not affected and must be merged by the caller.
#[must_use]
pub fn dec8(a: u8) -> AluResult {
    let value = a.wrapping_sub(1);
    AluResult {
        value,
        flags: sz53(value) | NF | flag_if(a & 0x0F == 0, HF) | flag_if(a == 0x80, PF),
    }
}

/// CB-space rotates and shifts in opcode order:
/// RLC, RRC, RL, RR, SLA, SRA, SLL, SRL.
///
/// SLL is undocumented and shifts a 1 into bit 0.
#[must_use]
pub fn shift(op: u8, a: u8, carry: bool) -> AluResult {
    let (value, out) = match op & 7 {
        0 => (a.rotate_left(1), a & 0x80 != 0),
        1 => (a.rotate_right(1), a & 0x01 != 0),
        2 => (a << 1 | u8::from(carry), a & 0x80 != 0),
        3 => (a >> 1 | u8::from(carry) << 7, a & 0x01 != 0),
        4 => (a << 1, a & 0x80 != 0),
        5 => (a >> 1 | (a & 0x80), a & 0x01 != 0),
        6 => (a << 1 | 1, a & 0x80 != 0),
        _ => (a >> 1, a & 0x01 != 0),
    };
    AluResult { value, flags: sz53p(value) | flag_if(out, CF) }
}

/// 16-bit add for HL/IX/IY. Only H, C, X and Y are produced; S, Z and P/V
/// are preserved by the instruction.
#[must_use]
pub fn add16(a: u16, b: u16) -> (u16, u8) {
    let wide = u32::from(a) + u32::from(b);
    let value = wide as u16;
    let flags = ((value >> 8) as u8 & (YF | XF))
        | flag_if((a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF, HF)
        | flag_if(wide > 0xFFFF, CF);
    (value, flags)
}

/// `ADC HL,rr`
#[must_use]
pub fn adc16(a: u16, b: u16, carry: bool) -> (u16, u8) {
    let c = u32::from(carry);
    let wide = u32::from(a) + u32::from(b) + c;
    let value = wide as u16;
    let high = (value >> 8) as u8;
    let overflow = (a ^ b) & 0x8000 == 0 && (a ^ value) & 0x8000 != 0;
    let flags = (high & (SF | YF | XF))
        | flag_if(value == 0, ZF)
        | flag_if(u32::from(a & 0x0FFF) + u32::from(b & 0x0FFF) + c > 0x0FFF, HF)
        | flag_if(overflow, PF)
        | flag_if(wide > 0xFFFF, CF);
    (value, flags)
}

/// `SBC HL,rr`
#[must_use]
pub fn sbc16(a: u16, b: u16, carry: bool) -> (u16, u8) {
    let c = u32::from(carry);
    let value = a.wrapping_sub(b).wrapping_sub(c as u16);
    let high = (value >> 8) as u8;
    let overflow = (a ^ b) & 0x8000 != 0 && (a ^ value) & 0x8000 != 0;
    let flags = NF
        | (high & (SF | YF | XF))
        | flag_if(value == 0, ZF)
        | flag_if(u32::from(a & 0x0FFF) < u32::from(b & 0x0FFF) + c, HF)
        | flag_if(overflow, PF)
        | flag_if(u32::from(a) < u32::from(b) + c, CF);
    (value, flags)
}

/// Decimal adjust after BCD add or subtract, given the flags left by it.
#[must_use]
pub fn daa(a: u8, f: u8) -> AluResult {
    let subtract = f & NF != 0;
    let half = f & HF != 0;
    let mut correction = 0;
    let mut carry = f & CF != 0;
    if half || a & 0x0F > 9 {
        correction |= 0x06;
    }
    if carry || a > 0x99 {
        correction |= 0x60;
        carry = true;
    }
    let (value, new_half) = if subtract {
        (a.wrapping_sub(correction), half && a & 0x0F < 6)
    } else {
        (a.wrapping_add(correction), a & 0x0F > 9)
    };
    AluResult {
        value,
        flags: sz53p(value) | (f & NF) | flag_if(carry, CF) | flag_if(new_half, HF),
    }
}
