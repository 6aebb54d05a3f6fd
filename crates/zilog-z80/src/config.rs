//! CPU timing configuration.

use emu_core::MasterClock;

use crate::error::ConfigError;

/// NTSC MSX master crystal.
pub const MSX_MASTER_CLOCK_HZ: u64 = 21_477_270;

/// Master ticks per Z80 T-state on an MSX (3.58 MHz CPU).
pub const MSX_CPU_DIVIDER: u64 = 6;

/// Split of a bus cycle around the moment the access is performed.
///
/// `before` T-states elapse before the device sees the access, `after`
/// T-states complete the cycle. Device wait states are inserted between
/// the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessDelay {
    pub before: u32,
    pub after: u32,
}

impl AccessDelay {
    #[must_use]
    pub const fn new(before: u32, after: u32) -> Self {
        Self { before, after }
    }

    #[must_use]
    pub const fn total(self) -> u32 {
        self.before + self.after
    }
}

/// Timing parameters of a Z80 in a particular machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Z80Config {
    pub master: MasterClock,
    /// Master ticks per T-state.
    pub cpu_divider: u64,
    /// Memory read/write cycle (3 T-states).
    pub mem_delay: AccessDelay,
    /// I/O read/write cycle (4 T-states, including the automatic wait).
    pub io_delay: AccessDelay,
    /// Extra T-states the machine adds to every M1 cycle.
    pub m1_wait: u32,
}

impl Z80Config {
    /// MSX timing: 3.58 MHz with one wait state on every M1 cycle.
    #[must_use]
    pub const fn msx() -> Self {
        Self {
            master: MasterClock::new(MSX_MASTER_CLOCK_HZ),
            cpu_divider: MSX_CPU_DIVIDER,
            mem_delay: AccessDelay::new(1, 2),
            io_delay: AccessDelay::new(1, 3),
            m1_wait: 1,
        }
    }

    /// MSX clock without the M1 wait: datasheet T-state counts.
    #[must_use]
    pub const fn no_wait() -> Self {
        Self {
            m1_wait: 0,
            ..Self::msx()
        }
    }

    /// Check the parameters describe a real Z80 bus cycle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cpu_divider == 0 {
            return Err(ConfigError::ZeroDivider);
        }
        if self.mem_delay.total() != 3 {
            return Err(ConfigError::MemoryDelay {
                before: self.mem_delay.before,
                after: self.mem_delay.after,
            });
        }
        if self.io_delay.total() != 4 {
            return Err(ConfigError::IoDelay {
                before: self.io_delay.before,
                after: self.io_delay.after,
            });
        }
        Ok(())
    }

    /// CPU frequency in Hz.
    #[must_use]
    pub const fn cpu_frequency(&self) -> u64 {
        self.master.frequency_hz / self.cpu_divider
    }
}

impl Default for Z80Config {
    fn default() -> Self {
        Self::msx()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msx_runs_at_3_58_mhz() {
        assert_eq!(Z80Config::msx().cpu_frequency(), 3_579_545);
    }

    #[test]
    fn defaults_validate() {
        assert_eq!(Z80Config::default().validate(), Ok(()));
        assert_eq!(Z80Config::no_wait().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_splits() {
        let config = Z80Config {
            cpu_divider: 0,
            ..Z80Config::msx()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDivider));

        let config = Z80Config {
            mem_delay: AccessDelay::new(2, 2),
            ..Z80Config::msx()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::MemoryDelay { before: 2, after: 2 })
        );

        let config = Z80Config {
            io_delay: AccessDelay::new(1, 2),
            ..Z80Config::msx()
        };
        assert!(matches!(config.validate(), Err(ConfigError::IoDelay { .. })));
    }
}
