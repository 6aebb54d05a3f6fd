//! Z80 register set.

use crate::interrupt::InterruptMode;

/// Which index register a DD or FD prefix selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Index {
    Ix,
    Iy,
}

/// Z80 register file.
///
/// 8-bit halves are the storage; 16-bit pairs are composed on access, so a
/// pair and its halves can never disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    // Main registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    // Alternate registers
    pub a_alt: u8,
    pub f_alt: u8,
    pub b_alt: u8,
    pub c_alt: u8,
    pub d_alt: u8,
    pub e_alt: u8,
    pub h_alt: u8,
    pub l_alt: u8,

    // Index registers
    pub ix: u16,
    pub iy: u16,

    pub sp: u16,
    pub pc: u16,
    /// Interrupt page.
    pub i: u8,
    /// Memory refresh counter. Bit 7 only changes through `LD R,A`.
    pub r: u8,

    /// WZ/MEMPTR - internal temporary register.
    /// Leaks into the undocumented X/Y flags of `BIT n,(HL)`.
    pub wz: u16,

    // Interrupt state
    pub iff1: bool,
    pub iff2: bool,
    pub im: InterruptMode,
}

impl Registers {
    /// Register contents after power-on or `/RESET`.
    ///
    /// Pairs come up as `0xFFFF`; PC, I and R are cleared, interrupts are
    /// disabled and mode 0 is selected.
    #[must_use]
    pub fn power_on() -> Self {
        Self {
            a: 0xFF,
            f: 0xFF,
            b: 0xFF,
            c: 0xFF,
            d: 0xFF,
            e: 0xFF,
            h: 0xFF,
            l: 0xFF,
            a_alt: 0xFF,
            f_alt: 0xFF,
            b_alt: 0xFF,
            c_alt: 0xFF,
            d_alt: 0xFF,
            e_alt: 0xFF,
            h_alt: 0xFF,
            l_alt: 0xFF,
            ix: 0xFFFF,
            iy: 0xFFFF,
            sp: 0xFFFF,
            pc: 0,
            i: 0,
            r: 0,
            wz: 0xFFFF,
            iff1: false,
            iff2: false,
            im: InterruptMode::Mode0,
        }
    }

    /// Get AF register pair.
    #[must_use]
    pub const fn af(&self) -> u16 {
        (self.a as u16) << 8 | self.f as u16
    }

    /// Get BC register pair.
    #[must_use]
    pub const fn bc(&self) -> u16 {
        (self.b as u16) << 8 | self.c as u16
    }

    /// Get DE register pair.
    #[must_use]
    pub const fn de(&self) -> u16 {
        (self.d as u16) << 8 | self.e as u16
    }

    /// Get HL register pair.
    #[must_use]
    pub const fn hl(&self) -> u16 {
        (self.h as u16) << 8 | self.l as u16
    }

    pub fn set_af(&mut self, value: u16) {
        self.a = (value >> 8) as u8;
        self.f = value as u8;
    }

    pub fn set_bc(&mut self, value: u16) {
        self.b = (value >> 8) as u8;
        self.c = value as u8;
    }

    pub fn set_de(&mut self, value: u16) {
        self.d = (value >> 8) as u8;
        self.e = value as u8;
    }

    pub fn set_hl(&mut self, value: u16) {
        self.h = (value >> 8) as u8;
        self.l = value as u8;
    }

    #[must_use]
    pub const fn index(&self, index: Index) -> u16 {
        match index {
            Index::Ix => self.ix,
            Index::Iy => self.iy,
        }
    }

    pub fn set_index(&mut self, index: Index, value: u16) {
        match index {
            Index::Ix => self.ix = value,
            Index::Iy => self.iy = value,
        }
    }

    /// High half of IX or IY (undocumented `IXH`/`IYH`).
    #[must_use]
    pub const fn index_high(&self, index: Index) -> u8 {
        (self.index(index) >> 8) as u8
    }

    /// Low half of IX or IY (undocumented `IXL`/`IYL`).
    #[must_use]
    pub const fn index_low(&self, index: Index) -> u8 {
        self.index(index) as u8
    }

    pub fn set_index_high(&mut self, index: Index, value: u8) {
        let low = self.index(index) & 0x00FF;
        self.set_index(index, u16::from(value) << 8 | low);
    }

    pub fn set_index_low(&mut self, index: Index, value: u8) {
        let high = self.index(index) & 0xFF00;
        self.set_index(index, high | u16::from(value));
    }

    /// Test a flag bit.
    #[must_use]
    pub const fn flag(&self, mask: u8) -> bool {
        self.f & mask != 0
    }

    /// `EX AF,AF'`
    pub fn ex_af(&mut self) {
        std::mem::swap(&mut self.a, &mut self.a_alt);
        std::mem::swap(&mut self.f, &mut self.f_alt);
    }

    /// `EXX`: swap BC, DE and HL with their shadows.
    pub fn exx(&mut self) {
        std::mem::swap(&mut self.b, &mut self.b_alt);
        std::mem::swap(&mut self.c, &mut self.c_alt);
        std::mem::swap(&mut self.d, &mut self.d_alt);
        std::mem::swap(&mut self.e, &mut self.e_alt);
        std::mem::swap(&mut self.h, &mut self.h_alt);
        std::mem::swap(&mut self.l, &mut self.l_alt);
    }

    /// `EX DE,HL`. The index registers have no shadow copies, so this is
    /// the only pair exchange the hardware offers; a DD/FD prefix does not
    /// redirect it.
    pub fn ex_de_hl(&mut self) {
        std::mem::swap(&mut self.d, &mut self.h);
        std::mem::swap(&mut self.e, &mut self.l);
    }

    /// Bump the low seven bits of R, as every M1 cycle does.
    pub fn inc_r(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
    }
}
