//! Complete CPU state for save/restore.
//!
//! The binary layout is little-endian and fixed-size:
//!
//! | offset | size | field |
//! |-------:|-----:|-------|
//! | 0 | 1 | format version (1) |
//! | 1 | 8 | A F B C D E H L |
//! | 9 | 8 | A' F' B' C' D' E' H' L' |
//! | 17 | 10 | IX IY SP PC WZ |
//! | 27 | 2 | I R |
//! | 29 | 3 | IFF1 IFF2 IM |
//! | 32 | 1 | state (0 running, 1 halted) |
//! | 33 | 1 | Q (flags written by the last instruction) |
//! | 34 | 1 | maskable request count |
//! | 35 | 1 | latch bits: NMI held, NMI edge, NMI bus level, after EI, after LD A,I/R |
//! | 36 | 1 | pending index prefix (0 none, 1 IX, 2 IY) |
//! | 37 | 8 | time in master ticks |

use emu_core::EmuTime;

use crate::error::SnapshotError;
use crate::interrupt::{CpuState, InterruptLatch, InterruptMode};
use crate::registers::{Index, Registers};

/// Current binary format version.
pub const STATE_VERSION: u8 = 1;

/// Encoded size of a [`Z80State`].
pub const STATE_LEN: usize = 45;

/// Everything needed to resume a Z80 exactly where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Z80State {
    pub registers: Registers,
    pub state: CpuState,
    pub q: u8,
    pub int_requests: u8,
    pub nmi_held: bool,
    pub nmi_edge: bool,
    pub nmi_bus_level: bool,
    pub after_ei: bool,
    pub ld_a_ir: bool,
    pub prefix: Option<Index>,
    pub time: EmuTime,
}

impl Z80State {
    pub(crate) fn latch(&self) -> InterruptLatch {
        InterruptLatch {
            int_requests: self.int_requests,
            nmi_held: self.nmi_held,
            nmi_edge: self.nmi_edge,
            nmi_bus_level: self.nmi_bus_level,
            after_ei: self.after_ei,
            ld_a_ir: self.ld_a_ir,
        }
    }

    pub(crate) fn set_latch(&mut self, latch: InterruptLatch) {
        self.int_requests = latch.int_requests;
        self.nmi_held = latch.nmi_held;
        self.nmi_edge = latch.nmi_edge;
        self.nmi_bus_level = latch.nmi_bus_level;
        self.after_ei = latch.after_ei;
        self.ld_a_ir = latch.ld_a_ir;
    }

    /// Encode to the fixed binary layout.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; STATE_LEN] {
        let r = &self.registers;
        let mut out = [0u8; STATE_LEN];
        out[0] = STATE_VERSION;
        out[1..9].copy_from_slice(&[r.a, r.f, r.b, r.c, r.d, r.e, r.h, r.l]);
        out[9..17].copy_from_slice(&[
            r.a_alt, r.f_alt, r.b_alt, r.c_alt, r.d_alt, r.e_alt, r.h_alt, r.l_alt,
        ]);
        for (slot, word) in [r.ix, r.iy, r.sp, r.pc, r.wz].into_iter().enumerate() {
            let at = 17 + slot * 2;
            out[at..at + 2].copy_from_slice(&word.to_le_bytes());
        }
        out[27] = r.i;
        out[28] = r.r;
        out[29] = u8::from(r.iff1);
        out[30] = u8::from(r.iff2);
        out[31] = r.im.as_u8();
        out[32] = match self.state {
            CpuState::Running => 0,
            CpuState::Halted => 1,
        };
        out[33] = self.q;
        out[34] = self.int_requests;
        out[35] = self.latch().to_bits();
        out[36] = match self.prefix {
            None => 0,
            Some(Index::Ix) => 1,
            Some(Index::Iy) => 2,
        };
        out[37..45].copy_from_slice(&self.time.master_ticks().to_le_bytes());
        out
    }

    /// Decode and validate the fixed binary layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let bytes: &[u8; STATE_LEN] = bytes.try_into().map_err(|_| SnapshotError::Length {
            expected: STATE_LEN,
            actual: bytes.len(),
        })?;
        if bytes[0] != STATE_VERSION {
            return Err(SnapshotError::Version(bytes[0]));
        }
        let word = |slot: usize| {
            let at = 17 + slot * 2;
            u16::from_le_bytes([bytes[at], bytes[at + 1]])
        };
        let im = InterruptMode::from_u8(bytes[31]).ok_or(SnapshotError::InterruptMode(bytes[31]))?;
        let state = match bytes[32] {
            0 => CpuState::Running,
            1 => CpuState::Halted,
            tag => return Err(SnapshotError::CpuState(tag)),
        };
        let prefix = match bytes[36] {
            0 => None,
            1 => Some(Index::Ix),
            2 => Some(Index::Iy),
            tag => return Err(SnapshotError::Prefix(tag)),
        };
        let registers = Registers {
            a: bytes[1],
            f: bytes[2],
            b: bytes[3],
            c: bytes[4],
            d: bytes[5],
            e: bytes[6],
            h: bytes[7],
            l: bytes[8],
            a_alt: bytes[9],
            f_alt: bytes[10],
            b_alt: bytes[11],
            c_alt: bytes[12],
            d_alt: bytes[13],
            e_alt: bytes[14],
            h_alt: bytes[15],
            l_alt: bytes[16],
            ix: word(0),
            iy: word(1),
            sp: word(2),
            pc: word(3),
            wz: word(4),
            i: bytes[27],
            r: bytes[28],
            iff1: bytes[29] != 0,
            iff2: bytes[30] != 0,
            im,
        };
        let mut time = [0u8; 8];
        time.copy_from_slice(&bytes[37..45]);

        let mut decoded = Self {
            registers,
            state,
            q: bytes[33],
            int_requests: 0,
            nmi_held: false,
            nmi_edge: false,
            nmi_bus_level: false,
            after_ei: false,
            ld_a_ir: false,
            prefix,
            time: EmuTime::from_master_ticks(u64::from_le_bytes(time)),
        };
        decoded.set_latch(InterruptLatch::from_bits(bytes[34], bytes[35]));
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Z80State {
        let mut registers = Registers::power_on();
        registers.set_af(0x1234);
        registers.set_hl(0xBEEF);
        registers.ix = 0xA000;
        registers.pc = 0x4321;
        registers.r = 0x85;
        registers.iff2 = true;
        registers.im = InterruptMode::Mode2;
        Z80State {
            registers,
            state: CpuState::Halted,
            q: 0x28,
            int_requests: 2,
            nmi_held: true,
            nmi_edge: false,
            nmi_bus_level: false,
            after_ei: true,
            ld_a_ir: false,
            prefix: Some(Index::Iy),
            time: EmuTime::from_master_ticks(0x0123_4567_89AB),
        }
    }

    #[test]
    fn binary_layout_round_trips() {
        let state = sample();
        let bytes = state.to_bytes();
        assert_eq!(bytes[0], STATE_VERSION);
        assert_eq!(&bytes[23..25], &[0x21, 0x43]);
        assert_eq!(Z80State::from_bytes(&bytes), Ok(state));
    }

    #[test]
    fn rejects_wrong_length_and_version() {
        let bytes = sample().to_bytes();
        assert_eq!(
            Z80State::from_bytes(&bytes[..44]),
            Err(SnapshotError::Length { expected: STATE_LEN, actual: 44 })
        );
        let mut bad = bytes;
        bad[0] = 9;
        assert_eq!(Z80State::from_bytes(&bad), Err(SnapshotError::Version(9)));
    }

    #[test]
    fn rejects_invalid_tags() {
        let bytes = sample().to_bytes();
        let mut bad = bytes;
        bad[31] = 3;
        assert_eq!(Z80State::from_bytes(&bad), Err(SnapshotError::InterruptMode(3)));
        let mut bad = bytes;
        bad[32] = 7;
        assert_eq!(Z80State::from_bytes(&bad), Err(SnapshotError::CpuState(7)));
        let mut bad = bytes;
        bad[36] = 5;
        assert_eq!(Z80State::from_bytes(&bad), Err(SnapshotError::Prefix(5)));
    }
}
