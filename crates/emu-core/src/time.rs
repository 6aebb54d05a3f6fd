//! Emulated time.
//!
//! Every component of a machine shares one time base: the master crystal.
//! [`EmuTime`] is an absolute point on that time base. A [`Clock`] is one
//! component's view of it, counting in the component's own divided ticks.

use core::ops::{Add, AddAssign, Sub};

/// A count of clock ticks.
///
/// Whose ticks depends on context: master crystal ticks when added to an
/// [`EmuTime`], CPU T-states when reported by a [`Clock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Add for Ticks {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Ticks {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Ticks {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

/// An absolute point in emulated time, in master crystal ticks.
///
/// Never decreases while a machine runs. The only operations that move it
/// backwards are explicit resynchronisations (snapshot restore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmuTime(u64);

impl EmuTime {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_master_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    #[must_use]
    pub const fn master_ticks(self) -> u64 {
        self.0
    }

    /// Master ticks elapsed since `earlier`, or zero if `earlier` is later.
    #[must_use]
    pub const fn saturating_since(self, earlier: Self) -> Ticks {
        Ticks(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Ticks> for EmuTime {
    type Output = Self;

    fn add(self, rhs: Ticks) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign<Ticks> for EmuTime {
    fn add_assign(&mut self, rhs: Ticks) {
        self.0 += rhs.0;
    }
}

/// Master clock configuration for a system.
///
/// Each system has a master crystal that drives all timing. Components run
/// at divided rates, but everything derives from this frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MasterClock {
    /// Crystal frequency in Hz (e.g., `21_477_270` for an NTSC MSX).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Ticks per frame at the given frame rate (integer division).
    #[must_use]
    pub const fn ticks_per_frame(&self, frames_per_second: u64) -> Ticks {
        Ticks::new(self.frequency_hz / frames_per_second)
    }
}

/// A clock derived from the master crystal by an integer divider.
///
/// Advancing by one tick of this clock moves [`EmuTime`] forward by
/// `divider` master ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    time: EmuTime,
    divider: u64,
}

impl Clock {
    /// Create a clock at `time` running at master frequency / `divider`.
    ///
    /// # Panics
    ///
    /// Panics if `divider` is zero.
    #[must_use]
    pub const fn new(time: EmuTime, divider: u64) -> Self {
        assert!(divider != 0, "clock divider must be non-zero");
        Self { time, divider }
    }

    #[must_use]
    pub const fn time(&self) -> EmuTime {
        self.time
    }

    #[must_use]
    pub const fn divider(&self) -> u64 {
        self.divider
    }

    /// Move the clock to an arbitrary time (resynchronisation only).
    pub fn set_time(&mut self, time: EmuTime) {
        self.time = time;
    }

    /// Advance by `ticks` of this clock.
    pub fn advance(&mut self, ticks: u32) {
        self.time += Ticks(u64::from(ticks) * self.divider);
    }

    /// Whole ticks of this clock elapsed since `earlier`.
    #[must_use]
    pub const fn ticks_since(&self, earlier: EmuTime) -> u64 {
        self.time.saturating_since(earlier).get() / self.divider
    }
}

impl Sub for EmuTime {
    type Output = Ticks;

    fn sub(self, rhs: Self) -> Ticks {
        self.saturating_since(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_advances_in_divided_ticks() {
        let mut clock = Clock::new(EmuTime::ZERO, 6);
        clock.advance(4);
        assert_eq!(clock.time().master_ticks(), 24);
        assert_eq!(clock.ticks_since(EmuTime::ZERO), 4);
    }

    #[test]
    fn time_ordering_and_difference() {
        let a = EmuTime::from_master_ticks(100);
        let b = a + Ticks::new(50);
        assert!(b > a);
        assert_eq!(b - a, Ticks::new(50));
        assert_eq!(a - b, Ticks::ZERO);
    }

    #[test]
    fn master_clock_conversions() {
        let msx = MasterClock::new(21_477_270);
        assert_eq!(msx.ticks_per_frame(60).get(), 357_954);
    }

    #[test]
    #[should_panic(expected = "divider")]
    fn zero_divider_is_rejected() {
        let _ = Clock::new(EmuTime::ZERO, 0);
    }
}
