//! Z80 CPU core with instruction-stepped, cycle-exact execution.

mod execute;
mod execute_cb;
mod execute_ed;

use std::collections::BTreeSet;

use emu_core::{Access, Bus, Clock, Cpu, EmuTime, InterruptLine, RunExit};
use tracing::{debug, trace};

use crate::config::Z80Config;
use crate::error::ConfigError;
use crate::flags::{CF, PF, SF, ZF};
use crate::interrupt::{CpuState, InterruptLatch, InterruptMode, Step, StepKind};
use crate::registers::{Index, Registers};
use crate::snapshot::Z80State;

/// Where instruction bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feed {
    /// Memory at PC.
    Memory,
    /// The data bus during a mode 0 interrupt acknowledge.
    InterruptAck,
}

/// Z80 CPU.
///
/// The CPU does not own the bus. Instead, the bus is passed to every
/// [`execute`](Self::execute) call so it can be shared with other
/// components (VDP, PSG, slot logic) that insert wait states or raise
/// interrupts.
///
/// Each call runs one complete instruction or interrupt response. Every
/// bus access is stamped with the exact time it happens on the real chip,
/// and the CPU clock moves past each access before the next one starts.
#[derive(Debug, Clone)]
pub struct Z80 {
    pub(crate) regs: Registers,
    state: CpuState,
    clock: Clock,
    config: Z80Config,
    irq: InterruptLatch,
    /// DD/FD prefix fetched at the end of the previous step, still
    /// waiting for its opcode.
    prefix: Option<Index>,
    /// Flags written by the current instruction (0 if it left F alone).
    q: u8,
    /// `q` of the previous instruction; feeds X/Y of SCF and CCF.
    prev_q: u8,
    feed: Feed,
    breakpoints: BTreeSet<u16>,
}

impl Z80 {
    /// Create a Z80 with MSX timing, at time zero, in power-on state.
    #[must_use]
    pub fn new() -> Self {
        Self::build(Z80Config::msx())
    }

    /// Create a Z80 with custom timing.
    pub fn with_config(config: Z80Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: Z80Config) -> Self {
        Self {
            regs: Registers::power_on(),
            state: CpuState::Running,
            clock: Clock::new(EmuTime::ZERO, config.cpu_divider),
            config,
            irq: InterruptLatch::default(),
            prefix: None,
            q: 0,
            prev_q: 0,
            feed: Feed::Memory,
            breakpoints: BTreeSet::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Z80Config {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> CpuState {
        self.state
    }

    /// Mutable register access for debuggers and snapshot loaders.
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    /// Set the program counter.
    pub fn set_pc(&mut self, value: u16) {
        self.regs.pc = value;
    }

    /// Set the stack pointer.
    pub fn set_sp(&mut self, value: u16) {
        self.regs.sp = value;
    }

    #[must_use]
    pub const fn a(&self) -> u8 {
        self.regs.a
    }

    #[must_use]
    pub const fn f(&self) -> u8 {
        self.regs.f
    }

    #[must_use]
    pub const fn bc(&self) -> u16 {
        self.regs.bc()
    }

    #[must_use]
    pub const fn de(&self) -> u16 {
        self.regs.de()
    }

    #[must_use]
    pub const fn hl(&self) -> u16 {
        self.regs.hl()
    }

    #[must_use]
    pub const fn ix(&self) -> u16 {
        self.regs.ix
    }

    #[must_use]
    pub const fn iy(&self) -> u16 {
        self.regs.iy
    }

    #[must_use]
    pub const fn sp(&self) -> u16 {
        self.regs.sp
    }

    #[must_use]
    pub const fn wz(&self) -> u16 {
        self.regs.wz
    }

    #[must_use]
    pub const fn i(&self) -> u8 {
        self.regs.i
    }

    #[must_use]
    pub const fn r(&self) -> u8 {
        self.regs.r
    }

    #[must_use]
    pub const fn iff1(&self) -> bool {
        self.regs.iff1
    }

    #[must_use]
    pub const fn im(&self) -> InterruptMode {
        self.regs.im
    }

    // === Breakpoints ===

    /// Stop [`run_until`](Cpu::run_until) when PC reaches `address`.
    pub fn add_breakpoint(&mut self, address: u16) {
        self.breakpoints.insert(address);
    }

    pub fn remove_breakpoint(&mut self, address: u16) -> bool {
        self.breakpoints.remove(&address)
    }

    pub fn clear_breakpoints(&mut self) {
        self.breakpoints.clear();
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = u16> + '_ {
        self.breakpoints.iter().copied()
    }

    // === Persistence ===

    /// Capture the complete CPU state, time included.
    #[must_use]
    pub fn save_state(&self) -> Z80State {
        let mut state = Z80State {
            registers: self.regs,
            state: self.state,
            q: self.q,
            int_requests: 0,
            nmi_held: false,
            nmi_edge: false,
            nmi_bus_level: false,
            after_ei: false,
            ld_a_ir: false,
            prefix: self.prefix,
            time: self.clock.time(),
        };
        state.set_latch(self.irq);
        state
    }

    /// Restore a state captured by [`save_state`](Self::save_state).
    ///
    /// Timing configuration and breakpoints are kept.
    pub fn load_state(&mut self, state: &Z80State) {
        self.regs = state.registers;
        self.state = state.state;
        self.q = state.q;
        self.prev_q = 0;
        self.irq = state.latch();
        self.prefix = state.prefix;
        self.feed = Feed::Memory;
        self.clock.set_time(state.time);
        debug!(
            pc = self.regs.pc,
            time = state.time.master_ticks(),
            "Z80 state restored"
        );
    }

    // === Stepping ===

    /// Execute one instruction, one halted M1 cycle, or one interrupt
    /// acknowledge sequence.
    ///
    /// Interrupts are sampled only here, between instructions. They are
    /// not sampled directly after EI or after a dangling DD/FD prefix.
    pub fn execute<B: Bus>(&mut self, bus: &mut B) -> Step {
        let start = self.clock.time();
        let kind = self.dispatch(bus);
        let cycles = self.clock.ticks_since(start) as u32;
        Step { kind, cycles }
    }

    fn dispatch<B: Bus>(&mut self, bus: &mut B) -> StepKind {
        self.irq.sample_nmi_line(bus.nmi_line());

        if self.prefix.is_none() {
            if self.irq.take_nmi() {
                self.accept_nmi(bus);
                return StepKind::Nmi;
            }
            let int_pending = self.irq.int_requests > 0 || bus.int_line();
            if int_pending && self.regs.iff1 && !self.irq.after_ei {
                let mode = self.regs.im;
                self.accept_int(bus);
                return StepKind::Interrupt(mode);
            }
        }

        self.irq.after_ei = false;
        self.irq.ld_a_ir = false;
        self.prev_q = self.q;
        self.q = 0;

        if self.state == CpuState::Halted {
            self.dummy_m1(bus);
            return StepKind::Halted;
        }

        match self.prefix.take() {
            Some(index) => {
                let op = self.fetch_opcode(bus);
                self.execute_indexed(bus, index, op);
            }
            None => {
                let op = self.fetch_opcode(bus);
                self.execute_opcode(bus, op);
            }
        }
        StepKind::Instruction
    }

    /// Dispatch an opcode byte already fetched in the base space.
    fn execute_opcode<B: Bus>(&mut self, bus: &mut B, op: u8) {
        match op {
            0xCB => {
                let op = self.fetch_opcode(bus);
                self.execute_cb(bus, op);
            }
            0xED => {
                let op = self.fetch_opcode(bus);
                self.execute_ed(bus, op);
            }
            0xDD => {
                let op = self.fetch_opcode(bus);
                self.execute_indexed(bus, Index::Ix, op);
            }
            0xFD => {
                let op = self.fetch_opcode(bus);
                self.execute_indexed(bus, Index::Iy, op);
            }
            _ => self.execute_main(bus, op, None),
        }
    }

    /// Dispatch the opcode following a DD or FD prefix.
    fn execute_indexed<B: Bus>(&mut self, bus: &mut B, index: Index, op: u8) {
        match op {
            // Another index prefix: the first one acted as a NOP. The new
            // one waits for its opcode in the next step.
            0xDD => self.prefix = Some(Index::Ix),
            0xFD => self.prefix = Some(Index::Iy),
            // ED ignores a preceding index prefix.
            0xED => {
                let op = self.fetch_opcode(bus);
                self.execute_ed(bus, op);
            }
            0xCB => self.execute_index_cb(bus, index),
            _ => self.execute_main(bus, op, Some(index)),
        }
    }

    // === Interrupt acknowledge ===

    fn leave_halt(&mut self) {
        self.state = CpuState::Running;
    }

    fn accept_nmi<B: Bus>(&mut self, bus: &mut B) {
        self.leave_halt();
        self.q = 0;
        trace!(pc = self.regs.pc, "NMI accepted");
        self.dummy_m1(bus);
        self.internal(1);
        self.regs.iff1 = false;
        self.push(bus, self.regs.pc);
        self.regs.pc = 0x0066;
        self.regs.wz = 0x0066;
    }

    fn accept_int<B: Bus>(&mut self, bus: &mut B) {
        self.leave_halt();
        self.q = 0;
        if self.irq.ld_a_ir {
            // LD A,I / LD A,R sampled IFF2 after the interrupt cleared it.
            self.regs.f &= !PF;
            self.irq.ld_a_ir = false;
        }
        self.irq.after_ei = false;
        self.regs.iff1 = false;
        self.regs.iff2 = false;

        match self.regs.im {
            InterruptMode::Mode0 => {
                trace!(pc = self.regs.pc, "interrupt accepted (IM 0)");
                self.feed = Feed::InterruptAck;
                let op = self.m1_cycle(bus, 2);
                self.execute_opcode(bus, op);
                self.feed = Feed::Memory;
            }
            InterruptMode::Mode1 => {
                trace!(pc = self.regs.pc, "interrupt accepted (IM 1)");
                self.feed = Feed::InterruptAck;
                self.m1_cycle(bus, 2);
                self.feed = Feed::Memory;
                self.internal(1);
                self.push(bus, self.regs.pc);
                self.regs.pc = 0x0038;
                self.regs.wz = 0x0038;
            }
            InterruptMode::Mode2 => {
                self.feed = Feed::InterruptAck;
                let vector = self.m1_cycle(bus, 2);
                self.feed = Feed::Memory;
                self.internal(1);
                self.push(bus, self.regs.pc);
                let table = u16::from(self.regs.i) << 8 | u16::from(vector);
                let target = self.read_word(bus, table);
                trace!(pc = self.regs.pc, table, target, "interrupt accepted (IM 2)");
                self.regs.pc = target;
                self.regs.wz = target;
            }
        }
    }

    // === Bus cycles ===

    /// Internal cycles with no bus activity.
    fn internal(&mut self, t_states: u32) {
        self.clock.advance(t_states);
    }

    fn insert_waits<B: Bus>(&mut self, bus: &mut B, access: Access, address: u16) {
        let waits = bus.wait_states(access, address, self.clock.time());
        self.clock.advance(u32::from(waits));
    }

    /// Opcode fetch: 4 T-states plus M1 and device waits, then refresh.
    ///
    /// `extra` adds the automatic waits of an interrupt acknowledge cycle.
    fn m1_cycle<B: Bus>(&mut self, bus: &mut B, extra: u32) -> u8 {
        let delay = self.config.mem_delay;
        let address = self.regs.pc;
        self.clock.advance(delay.before);
        self.insert_waits(bus, Access::OpcodeFetch, address);
        self.clock.advance(self.config.m1_wait + extra);
        let op = match self.feed {
            Feed::Memory => {
                self.regs.pc = address.wrapping_add(1);
                bus.read(address, self.clock.time())
            }
            Feed::InterruptAck => bus.acknowledge_interrupt(self.clock.time()),
        };
        self.clock.advance(delay.after + 1);
        self.regs.inc_r();
        op
    }

    fn fetch_opcode<B: Bus>(&mut self, bus: &mut B) -> u8 {
        self.m1_cycle(bus, 0)
    }

    /// M1 cycle whose opcode is discarded and PC kept (HALT, NMI).
    fn dummy_m1<B: Bus>(&mut self, bus: &mut B) {
        let pc = self.regs.pc;
        self.m1_cycle(bus, 0);
        self.regs.pc = pc;
    }

    /// Operand byte at PC (or from the data bus in mode 0).
    fn fetch_byte<B: Bus>(&mut self, bus: &mut B) -> u8 {
        match self.feed {
            Feed::Memory => {
                let pc = self.regs.pc;
                self.regs.pc = pc.wrapping_add(1);
                self.read(bus, pc)
            }
            Feed::InterruptAck => {
                let delay = self.config.mem_delay;
                self.clock.advance(delay.before);
                self.insert_waits(bus, Access::MemoryRead, self.regs.pc);
                let value = bus.acknowledge_interrupt(self.clock.time());
                self.clock.advance(delay.after);
                value
            }
        }
    }

    fn fetch_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch_byte(bus);
        let hi = self.fetch_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    fn fetch_displacement<B: Bus>(&mut self, bus: &mut B) -> i8 {
        self.fetch_byte(bus) as i8
    }

    fn read<B: Bus>(&mut self, bus: &mut B, address: u16) -> u8 {
        let delay = self.config.mem_delay;
        self.clock.advance(delay.before);
        self.insert_waits(bus, Access::MemoryRead, address);
        let value = bus.read(address, self.clock.time());
        self.clock.advance(delay.after);
        value
    }

    fn write<B: Bus>(&mut self, bus: &mut B, address: u16, value: u8) {
        let delay = self.config.mem_delay;
        self.clock.advance(delay.before);
        self.insert_waits(bus, Access::MemoryWrite, address);
        bus.write(address, value, self.clock.time());
        self.clock.advance(delay.after);
    }

    fn read_word<B: Bus>(&mut self, bus: &mut B, address: u16) -> u16 {
        let lo = self.read(bus, address);
        let hi = self.read(bus, address.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    fn write_word<B: Bus>(&mut self, bus: &mut B, address: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(bus, address, lo);
        self.write(bus, address.wrapping_add(1), hi);
    }

    fn io_read<B: Bus>(&mut self, bus: &mut B, port: u16) -> u8 {
        let delay = self.config.io_delay;
        self.clock.advance(delay.before);
        self.insert_waits(bus, Access::IoRead, port);
        let value = bus.io_read(port, self.clock.time());
        self.clock.advance(delay.after);
        value
    }

    fn io_write<B: Bus>(&mut self, bus: &mut B, port: u16, value: u8) {
        let delay = self.config.io_delay;
        self.clock.advance(delay.before);
        self.insert_waits(bus, Access::IoWrite, port);
        bus.io_write(port, value, self.clock.time());
        self.clock.advance(delay.after);
    }

    fn push<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write(bus, self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write(bus, self.regs.sp, lo);
    }

    fn pop<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.read(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = self.read(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    // === Register decoding ===

    /// Write F from an ALU result, recording it for SCF/CCF.
    fn set_f(&mut self, value: u8) {
        self.regs.f = value;
        self.q = value;
    }

    /// 8-bit register by its 3-bit code. Code 6 is never passed here;
    /// with an index prefix H and L become the index register halves.
    fn reg8(&self, code: u8, index: Option<Index>) -> u8 {
        match (code & 7, index) {
            (0, _) => self.regs.b,
            (1, _) => self.regs.c,
            (2, _) => self.regs.d,
            (3, _) => self.regs.e,
            (4, None) => self.regs.h,
            (4, Some(idx)) => self.regs.index_high(idx),
            (5, None) => self.regs.l,
            (5, Some(idx)) => self.regs.index_low(idx),
            _ => self.regs.a,
        }
    }

    fn set_reg8(&mut self, code: u8, index: Option<Index>, value: u8) {
        match (code & 7, index) {
            (0, _) => self.regs.b = value,
            (1, _) => self.regs.c = value,
            (2, _) => self.regs.d = value,
            (3, _) => self.regs.e = value,
            (4, None) => self.regs.h = value,
            (4, Some(idx)) => self.regs.set_index_high(idx, value),
            (5, None) => self.regs.l = value,
            (5, Some(idx)) => self.regs.set_index_low(idx, value),
            _ => self.regs.a = value,
        }
    }

    /// HL, or the index register selected by a prefix.
    fn hl_or_index(&self, index: Option<Index>) -> u16 {
        index.map_or(self.regs.hl(), |idx| self.regs.index(idx))
    }

    fn set_hl_or_index(&mut self, index: Option<Index>, value: u16) {
        match index {
            Some(idx) => self.regs.set_index(idx, value),
            None => self.regs.set_hl(value),
        }
    }

    /// BC, DE, HL/IX/IY, SP by 2-bit code.
    fn rp(&self, code: u8, index: Option<Index>) -> u16 {
        match code & 3 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.hl_or_index(index),
            _ => self.regs.sp,
        }
    }

    fn set_rp(&mut self, code: u8, index: Option<Index>, value: u16) {
        match code & 3 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.set_hl_or_index(index, value),
            _ => self.regs.sp = value,
        }
    }

    /// Condition code: NZ, Z, NC, C, PO, PE, P, M.
    fn condition(&self, code: u8) -> bool {
        let f = self.regs.f;
        match code & 7 {
            0 => f & ZF == 0,
            1 => f & ZF != 0,
            2 => f & CF == 0,
            3 => f & CF != 0,
            4 => f & PF == 0,
            5 => f & PF != 0,
            6 => f & SF == 0,
            _ => f & SF != 0,
        }
    }

    /// Effective address of an `(HL)` operand, or `(IX+d)` / `(IY+d)`
    /// including the displacement fetch and its 5 internal T-states.
    fn memory_operand<B: Bus>(&mut self, bus: &mut B, index: Option<Index>) -> u16 {
        match index {
            None => self.regs.hl(),
            Some(idx) => {
                let d = self.fetch_displacement(bus);
                self.internal(5);
                let address = self.regs.index(idx).wrapping_add_signed(i16::from(d));
                self.regs.wz = address;
                address
            }
        }
    }

    /// Enter HALT. PC already points past the HALT opcode.
    fn halt(&mut self) {
        trace!(pc = self.regs.pc, "HALT");
        self.state = CpuState::Halted;
    }
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu for Z80 {
    type Registers = Registers;

    fn reset(&mut self) {
        self.regs = Registers::power_on();
        self.state = CpuState::Running;
        self.irq.reset();
        self.prefix = None;
        self.q = 0;
        self.prev_q = 0;
        self.feed = Feed::Memory;
        debug!(time = self.clock.time().master_ticks(), "Z80 reset");
    }

    fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        self.execute(bus).cycles
    }

    /// Steps until `target` is reached or a breakpoint is hit.
    ///
    /// A step can end after a redundant DD/FD prefix (`DD DD`, `DD FD`),
    /// so the returned boundary may fall inside an instruction. The held
    /// prefix survives in [`Z80::save_state`] and the next call finishes
    /// the instruction.
    fn run_until<B: Bus>(&mut self, bus: &mut B, target: EmuTime) -> RunExit {
        assert!(
            target >= self.clock.time(),
            "run_until target {target:?} is before current time {:?}",
            self.clock.time()
        );
        while self.clock.time() < target {
            let step = self.execute(bus);
            if step.kind != StepKind::Halted
                && self.prefix.is_none()
                && self.breakpoints.contains(&self.regs.pc)
            {
                trace!(pc = self.regs.pc, "breakpoint hit");
                return RunExit::Breakpoint(u32::from(self.regs.pc));
            }
        }
        RunExit::TargetReached
    }

    fn request_interrupt(&mut self, line: InterruptLine) {
        match line {
            InterruptLine::Maskable => self.irq.raise_int(),
            InterruptLine::NonMaskable => self.irq.raise_nmi(),
        }
    }

    fn clear_interrupt(&mut self, line: InterruptLine) {
        match line {
            InterruptLine::Maskable => self.irq.lower_int(),
            InterruptLine::NonMaskable => self.irq.lower_nmi(),
        }
    }

    fn current_time(&self) -> EmuTime {
        self.clock.time()
    }

    fn set_current_time(&mut self, time: EmuTime) {
        debug!(
            from = self.clock.time().master_ticks(),
            to = time.master_ticks(),
            "Z80 time resynchronised"
        );
        self.clock.set_time(time);
    }

    fn pc(&self) -> u32 {
        u32::from(self.regs.pc)
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }
}

#[cfg(test)]
mod tests {
    use emu_core::SimpleBus;

    use super::*;

    fn cpu() -> Z80 {
        let mut cpu = Z80::with_config(Z80Config::no_wait()).expect("valid config");
        cpu.set_sp(0xF000);
        cpu
    }

    #[test]
    fn nop_takes_4_cycles() {
        let mut cpu = cpu();
        let mut bus = SimpleBus::new();
        assert_eq!(cpu.step(&mut bus), 4);
        assert_eq!(cpu.pc(), 1);
        assert_eq!(cpu.current_time().master_ticks(), 24);
    }

    #[test]
    fn msx_m1_wait_makes_nop_5_cycles() {
        let mut cpu = Z80::new();
        let mut bus = SimpleBus::new();
        assert_eq!(cpu.step(&mut bus), 5);
    }

    #[test]
    fn device_waits_add_to_base_cost() {
        let mut cpu = cpu();
        let mut bus = SimpleBus::new();
        bus.load(0, &[0x3E, 0x42]); // LD A,0x42
        bus.set_wait_states(Access::OpcodeFetch, 2);
        bus.set_wait_states(Access::MemoryRead, 1);
        assert_eq!(cpu.step(&mut bus), 7 + 2 + 1);
        assert_eq!(cpu.a(), 0x42);
    }

    #[test]
    fn reset_keeps_time_and_restores_power_on_registers() {
        let mut cpu = cpu();
        let mut bus = SimpleBus::new();
        bus.load(0, &[0xFB, 0xED, 0x5E]); // EI; IM 2
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        let now = cpu.current_time();
        cpu.reset();
        assert_eq!(cpu.current_time(), now);
        assert_eq!(cpu.pc(), 0);
        assert!(!cpu.iff1());
        assert_eq!(cpu.im(), InterruptMode::Mode0);
        assert_eq!(cpu.registers().af(), 0xFFFF);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = Z80Config {
            cpu_divider: 0,
            ..Z80Config::msx()
        };
        assert_eq!(Z80::with_config(config).err(), Some(ConfigError::ZeroDivider));
    }

    #[test]
    fn dangling_prefix_blocks_interrupts() {
        let mut cpu = cpu();
        let mut bus = SimpleBus::new();
        // DD; FD; LD IY,0x1234
        bus.load(0, &[0xDD, 0xFD, 0x21, 0x34, 0x12]);
        cpu.regs.iff1 = true;
        cpu.regs.iff2 = true;
        cpu.regs.im = InterruptMode::Mode1;
        assert_eq!(cpu.step(&mut bus), 8);
        cpu.request_interrupt(InterruptLine::Maskable);
        let step = cpu.execute(&mut bus);
        assert_eq!(step.kind, StepKind::Instruction);
        assert_eq!(step.cycles, 10);
        assert_eq!(cpu.iy(), 0x1234);
        assert_eq!(cpu.execute(&mut bus).kind, StepKind::Interrupt(InterruptMode::Mode1));
    }
}
