//! CPU core trait.

use crate::{Bus, EmuTime};

/// Interrupt inputs a CPU can be asked to raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterruptLine {
    /// Level-triggered, honoured only while interrupts are enabled.
    Maskable,
    /// Edge-triggered, always honoured.
    NonMaskable,
}

/// Why a call to [`Cpu::run_until`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// Emulated time reached or passed the target.
    TargetReached,
    /// The program counter landed on a breakpoint at this address.
    Breakpoint(u32),
}

/// A CPU core.
///
/// CPUs execute whole instructions and access memory through a bus. The
/// bus is passed in, not owned, so it can be shared with other components.
/// Each CPU keeps its own clock; every bus access is stamped with the time
/// at which it happens.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Reset the CPU to its power-on state. Emulated time is unchanged.
    fn reset(&mut self);

    /// Execute one instruction or one interrupt response.
    ///
    /// Returns the number of CPU clock cycles consumed, wait states
    /// included.
    fn step<B: Bus>(&mut self, bus: &mut B) -> u32;

    /// Run whole instructions until emulated time reaches `target`.
    ///
    /// May overshoot by at most one instruction.
    fn run_until<B: Bus>(&mut self, bus: &mut B, target: EmuTime) -> RunExit;

    /// Raise an interrupt input.
    fn request_interrupt(&mut self, line: InterruptLine);

    /// Withdraw a previously raised interrupt input.
    fn clear_interrupt(&mut self, line: InterruptLine);

    /// Current emulated time of this CPU.
    fn current_time(&self) -> EmuTime;

    /// Resynchronise this CPU's clock.
    fn set_current_time(&mut self, time: EmuTime);

    /// Returns the current program counter.
    ///
    /// Returns `u32` to support all CPU address widths. Narrower CPUs
    /// zero-extend.
    fn pc(&self) -> u32;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;
}
