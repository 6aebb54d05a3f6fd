//! T-state counts for every instruction space.
//!
//! Each case runs one instruction from a fixed register state with no
//! wait states and compares the cycles reported by `execute`.
//!
//! Initial state: A=0, F=0 (so NZ, NC, PO and P hold), BC=0x0001,
//! DE=0x8000, HL=0x9000, IX=0xA000, IY=0xB000, SP=0xF000.

use emu_core::{Cpu, SimpleBus};
use zilog_z80::{StepKind, Z80, Z80Config};

fn setup(program: &[u8]) -> (Z80, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, program);
    let mut cpu = Z80::with_config(Z80Config::no_wait()).expect("valid config");
    let regs = cpu.registers_mut();
    regs.a = 0;
    regs.f = 0;
    regs.set_bc(0x0001);
    regs.set_de(0x8000);
    regs.set_hl(0x9000);
    regs.ix = 0xA000;
    regs.iy = 0xB000;
    regs.sp = 0xF000;
    regs.pc = 0x0000;
    (cpu, bus)
}

fn check(table: &[(&str, &[u8], u32)]) {
    let mut failures = Vec::new();
    for &(name, program, expected) in table {
        let (mut cpu, mut bus) = setup(program);
        let step = cpu.execute(&mut bus);
        assert_eq!(step.kind, StepKind::Instruction, "{name}");
        if step.cycles != expected {
            failures.push(format!("{name}: got {}, want {expected}", step.cycles));
        }
    }
    assert!(failures.is_empty(), "timing mismatches:\n{}", failures.join("\n"));
}

#[test]
fn base_instructions() {
    #[rustfmt::skip]
    let table: &[(&str, &[u8], u32)] = &[
        ("NOP",            &[0x00], 4),
        ("LD BC,nn",       &[0x01, 0x34, 0x12], 10),
        ("LD (BC),A",      &[0x02], 7),
        ("INC BC",         &[0x03], 6),
        ("INC B",          &[0x04], 4),
        ("LD B,n",         &[0x06, 0x55], 7),
        ("RLCA",           &[0x07], 4),
        ("EX AF,AF'",      &[0x08], 4),
        ("ADD HL,BC",      &[0x09], 11),
        ("LD A,(BC)",      &[0x0A], 7),
        ("DJNZ taken",     &[0x10, 0xFE], 13),
        ("JR e",           &[0x18, 0x00], 12),
        ("JR NZ taken",    &[0x20, 0x00], 12),
        ("JR Z not taken", &[0x28, 0x00], 7),
        ("LD (nn),HL",     &[0x22, 0x00, 0x40], 16),
        ("LD HL,(nn)",     &[0x2A, 0x00, 0x40], 16),
        ("LD (nn),A",      &[0x32, 0x00, 0x40], 13),
        ("LD A,(nn)",      &[0x3A, 0x00, 0x40], 13),
        ("INC (HL)",       &[0x34], 11),
        ("LD (HL),n",      &[0x36, 0x12], 10),
        ("LD B,C",         &[0x41], 4),
        ("LD B,(HL)",      &[0x46], 7),
        ("LD (HL),B",      &[0x70], 7),
        ("HALT",           &[0x76], 4),
        ("ADD A,(HL)",     &[0x86], 7),
        ("RET NZ taken",   &[0xC0], 11),
        ("RET Z not taken",&[0xC8], 5),
        ("POP BC",         &[0xC1], 10),
        ("JP NZ,nn",       &[0xC2, 0x00, 0x10], 10),
        ("JP Z,nn",        &[0xCA, 0x00, 0x10], 10),
        ("JP nn",          &[0xC3, 0x00, 0x10], 10),
        ("CALL NZ taken",  &[0xC4, 0x00, 0x10], 17),
        ("CALL Z skipped", &[0xCC, 0x00, 0x10], 10),
        ("PUSH BC",        &[0xC5], 11),
        ("ADD A,n",        &[0xC6, 0x01], 7),
        ("RST 00",         &[0xC7], 11),
        ("RET",            &[0xC9], 10),
        ("CALL nn",        &[0xCD, 0x00, 0x10], 17),
        ("OUT (n),A",      &[0xD3, 0x98], 11),
        ("EXX",            &[0xD9], 4),
        ("IN A,(n)",       &[0xDB, 0x98], 11),
        ("EX (SP),HL",     &[0xE3], 19),
        ("JP (HL)",        &[0xE9], 4),
        ("EX DE,HL",       &[0xEB], 4),
        ("DI",             &[0xF3], 4),
        ("LD SP,HL",       &[0xF9], 6),
        ("EI",             &[0xFB], 4),
    ];
    check(table);
}

#[test]
fn cb_instructions() {
    #[rustfmt::skip]
    let table: &[(&str, &[u8], u32)] = &[
        ("RLC B",          &[0xCB, 0x00], 8),
        ("SRL A",          &[0xCB, 0x3F], 8),
        ("RLC (HL)",       &[0xCB, 0x06], 15),
        ("BIT 0,B",        &[0xCB, 0x40], 8),
        ("BIT 0,(HL)",     &[0xCB, 0x46], 12),
        ("RES 0,(HL)",     &[0xCB, 0x86], 15),
        ("SET 0,(HL)",     &[0xCB, 0xC6], 15),
    ];
    check(table);
}

#[test]
fn ed_instructions() {
    #[rustfmt::skip]
    let table: &[(&str, &[u8], u32)] = &[
        ("IN B,(C)",       &[0xED, 0x40], 12),
        ("OUT (C),B",      &[0xED, 0x41], 12),
        ("SBC HL,BC",      &[0xED, 0x42], 15),
        ("ADC HL,BC",      &[0xED, 0x4A], 15),
        ("LD (nn),BC",     &[0xED, 0x43, 0x00, 0x40], 20),
        ("LD BC,(nn)",     &[0xED, 0x4B, 0x00, 0x40], 20),
        ("NEG",            &[0xED, 0x44], 8),
        ("RETN",           &[0xED, 0x45], 14),
        ("RETI",           &[0xED, 0x4D], 14),
        ("IM 1",           &[0xED, 0x56], 8),
        ("LD I,A",         &[0xED, 0x47], 9),
        ("LD A,R",         &[0xED, 0x5F], 9),
        ("RRD",            &[0xED, 0x67], 18),
        ("RLD",            &[0xED, 0x6F], 18),
        ("LDI",            &[0xED, 0xA0], 16),
        ("CPI",            &[0xED, 0xA1], 16),
        ("INI",            &[0xED, 0xA2], 16),
        ("OUTI",           &[0xED, 0xA3], 16),
        ("LDIR last",      &[0xED, 0xB0], 16),
        ("CPIR match",     &[0xED, 0xB1], 16),
        ("INIR repeat",    &[0xED, 0xB2], 21),
        ("OTIR repeat",    &[0xED, 0xB3], 21),
        ("LDDR last",      &[0xED, 0xB8], 16),
        ("undefined ED00", &[0xED, 0x00], 8),
        ("undefined EDFF", &[0xED, 0xFF], 8),
    ];
    check(table);
}

#[test]
fn ldir_repeat_costs_21() {
    let (mut cpu, mut bus) = setup(&[0xED, 0xB0]);
    cpu.registers_mut().set_bc(0x0002);
    assert_eq!(cpu.step(&mut bus), 21);
    assert_eq!(cpu.pc(), 0x0000);
    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(cpu.pc(), 0x0002);
}

#[test]
fn indexed_instructions() {
    #[rustfmt::skip]
    let table: &[(&str, &[u8], u32)] = &[
        ("LD IX,nn",       &[0xDD, 0x21, 0x00, 0x10], 14),
        ("ADD IX,BC",      &[0xDD, 0x09], 15),
        ("INC IX",         &[0xDD, 0x23], 10),
        ("LD IXH,n",       &[0xDD, 0x26, 0x12], 11),
        ("LD B,IXH",       &[0xDD, 0x44], 8),
        ("INC (IX+d)",     &[0xDD, 0x34, 0x05], 23),
        ("LD (IX+d),n",    &[0xDD, 0x36, 0x05, 0x12], 19),
        ("LD B,(IX+d)",    &[0xDD, 0x46, 0x05], 19),
        ("LD (IX+d),B",    &[0xDD, 0x70, 0x05], 19),
        ("ADD A,(IX+d)",   &[0xDD, 0x86, 0x05], 19),
        ("POP IX",         &[0xDD, 0xE1], 14),
        ("EX (SP),IX",     &[0xDD, 0xE3], 23),
        ("PUSH IX",        &[0xDD, 0xE5], 15),
        ("JP (IX)",        &[0xDD, 0xE9], 8),
        ("LD SP,IX",       &[0xDD, 0xF9], 10),
        ("DD NOP",         &[0xDD, 0x00], 8),
        ("LD IY,nn",       &[0xFD, 0x21, 0x00, 0x10], 14),
        ("LD A,(IY+d)",    &[0xFD, 0x7E, 0xFF], 19),
        ("DD ED NEG",      &[0xDD, 0xED, 0x44], 12),
    ];
    check(table);
}

#[test]
fn indexed_bit_instructions() {
    #[rustfmt::skip]
    let table: &[(&str, &[u8], u32)] = &[
        ("RLC (IX+d)",     &[0xDD, 0xCB, 0x05, 0x06], 23),
        ("BIT 0,(IX+d)",   &[0xDD, 0xCB, 0x05, 0x46], 20),
        ("RES 0,(IX+d)",   &[0xDD, 0xCB, 0x05, 0x86], 23),
        ("SET 0,(IX+d),B", &[0xDD, 0xCB, 0x05, 0xC0], 23),
        ("BIT 7,(IY+d)",   &[0xFD, 0xCB, 0xFF, 0x7E], 20),
        ("SRL (IY+d),A",   &[0xFD, 0xCB, 0x01, 0x3F], 23),
    ];
    check(table);
}

#[test]
fn refresh_counts_m1_cycles_only() {
    // DD CB d op: two M1 fetches; d and op are memory reads.
    let (mut cpu, mut bus) = setup(&[0xDD, 0xCB, 0x05, 0x06]);
    cpu.registers_mut().r = 0;
    cpu.step(&mut bus);
    assert_eq!(cpu.r(), 2);

    let (mut cpu, mut bus) = setup(&[0xED, 0xB0]);
    cpu.registers_mut().r = 0x7F;
    cpu.registers_mut().set_bc(0x0002);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    // Bit 7 is never touched by the increment.
    assert_eq!(cpu.r(), 0x03);
}

#[test]
fn cycles_match_master_clock() {
    let (mut cpu, mut bus) = setup(&[0xDD, 0x34, 0x05]);
    let start = cpu.current_time();
    let cycles = cpu.step(&mut bus);
    let elapsed = cpu.current_time() - start;
    assert_eq!(elapsed.get(), u64::from(cycles) * 6);
}

/// Base page costs from the fixed initial state. Prefix slots are 0.
#[rustfmt::skip]
const BASE: [u32; 256] = [
//   0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
     4, 10,  7,  6,  4,  4,  7,  4,  4, 11,  7,  6,  4,  4,  7,  4, // 0x
    13, 10,  7,  6,  4,  4,  7,  4, 12, 11,  7,  6,  4,  4,  7,  4, // 1x
    12, 10, 16,  6,  4,  4,  7,  4,  7, 11, 16,  6,  4,  4,  7,  4, // 2x
    12, 10, 13,  6, 11, 11, 10,  4,  7, 11, 13,  6,  4,  4,  7,  4, // 3x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 4x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 5x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 6x
     7,  7,  7,  7,  7,  7,  4,  7,  4,  4,  4,  4,  4,  4,  7,  4, // 7x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 8x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 9x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // Ax
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // Bx
    11, 10, 10, 10, 17, 11,  7, 11,  5, 10, 10,  0, 10, 17,  7, 11, // Cx
    11, 10, 10, 11, 17, 11,  7, 11,  5,  4, 10, 11, 10,  0,  7, 11, // Dx
    11, 10, 10, 19, 17, 11,  7, 11,  5,  4, 10,  4, 10,  0,  7, 11, // Ex
    11, 10, 10,  4, 17, 11,  7, 11,  5,  6, 10,  4, 10,  0,  7, 11, // Fx
];

fn is_prefix(op: u8) -> bool {
    matches!(op, 0xCB | 0xDD | 0xED | 0xFD)
}

/// Base opcodes whose `(HL)` operand becomes `(IX+d)`.
fn uses_memory_operand(op: u8) -> bool {
    match op {
        0x34 | 0x35 | 0x36 => true,
        0x76 => false,
        0x40..=0xBF => op & 7 == 6 || (0x70..=0x77).contains(&op),
        _ => false,
    }
}

fn cb_cost(op: u8) -> u32 {
    match (op & 7, op >> 6) {
        (6, 1) => 12,
        (6, _) => 15,
        _ => 8,
    }
}

fn ed_cost(op: u8) -> u32 {
    match op {
        0x47 | 0x4F | 0x57 | 0x5F => 9,
        0x67 | 0x6F => 18,
        0x77 | 0x7F => 8,
        0x40..=0x7F => match op & 7 {
            0 | 1 => 12,
            2 => 15,
            3 => 20,
            5 => 14,
            _ => 8,
        },
        // INIR/INDR/OTIR/OTDR repeat because B wraps from 0; the
        // LD and CP forms finish because BC runs out or A matches.
        0xB2 | 0xB3 | 0xBA | 0xBB => 21,
        0xA0..=0xA3 | 0xA8..=0xAB | 0xB0 | 0xB1 | 0xB8 | 0xB9 => 16,
        _ => 8,
    }
}

fn indexed_cost(op: u8) -> u32 {
    match op {
        0x36 => 19,
        _ if uses_memory_operand(op) => BASE[usize::from(op)] + 12,
        _ => BASE[usize::from(op)] + 4,
    }
}

#[test]
fn every_opcode_in_every_space() {
    let mut table: Vec<(String, Vec<u8>, u32)> = Vec::new();
    for op in 0..=0xFFu8 {
        if !is_prefix(op) {
            table.push((format!("{op:02X}"), vec![op, 0, 0, 0], BASE[usize::from(op)]));
        }
        table.push((format!("CB {op:02X}"), vec![0xCB, op], cb_cost(op)));
        table.push((format!("ED {op:02X}"), vec![0xED, op, 0, 0], ed_cost(op)));
        table.push((format!("DDCB 05 {op:02X}"), vec![0xDD, 0xCB, 0x05, op], if op >> 6 == 1 { 20 } else { 23 }));
        table.push((format!("FDCB 05 {op:02X}"), vec![0xFD, 0xCB, 0x05, op], if op >> 6 == 1 { 20 } else { 23 }));
        let indexed = match op {
            0xCB => None,
            // A second index prefix ends the step after both prefix fetches.
            0xDD | 0xFD => Some(8),
            0xED => Some(4 + ed_cost(0x00)),
            _ => Some(indexed_cost(op)),
        };
        if let Some(cost) = indexed {
            let operands = if op == 0xED { vec![0x00] } else { vec![0x05, 0, 0] };
            for prefix in [0xDD, 0xFD] {
                let mut program = vec![prefix, op];
                program.extend(&operands);
                table.push((format!("{prefix:02X} {op:02X}"), program, cost));
            }
        }
    }

    let borrowed: Vec<(&str, &[u8], u32)> = table
        .iter()
        .map(|(name, program, cost)| (name.as_str(), program.as_slice(), *cost))
        .collect();
    assert_eq!(borrowed.len(), 252 + 256 * 4 + 255 * 2);
    check(&borrowed);
}
