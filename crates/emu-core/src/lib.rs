//! Core traits and types for cycle-accurate emulation.
//!
//! Everything is timed against the master crystal. All component timing
//! derives from it.

mod bus;
mod cpu;
mod time;

pub use bus::{Access, Bus, SimpleBus};
pub use cpu::{Cpu, InterruptLine, RunExit};
pub use time::{Clock, EmuTime, MasterClock, Ticks};
