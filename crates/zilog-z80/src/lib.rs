//! Cycle-exact Z80 CPU core.
//!
//! Each call to [`Z80::execute`] runs one whole instruction (or one
//! interrupt response) and advances the CPU clock through every bus
//! access at the T-state where the real chip performs it. Machines drive
//! the core through the [`emu_core::Cpu`] trait, usually with
//! [`run_until`](emu_core::Cpu::run_until).

mod alu;
mod config;
mod cpu;
mod error;
mod flags;
mod interrupt;
mod registers;
mod snapshot;

pub use config::{AccessDelay, MSX_CPU_DIVIDER, MSX_MASTER_CLOCK_HZ, Z80Config};
pub use cpu::Z80;
pub use error::{ConfigError, SnapshotError};
pub use flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
pub use interrupt::{CpuState, InterruptMode, Step, StepKind};
pub use registers::{Index, Registers};
pub use snapshot::{STATE_LEN, STATE_VERSION, Z80State};
