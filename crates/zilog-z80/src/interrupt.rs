//! Interrupt and halt state.

/// How a maskable interrupt is acknowledged (`IM 0`, `IM 1`, `IM 2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterruptMode {
    /// The device supplies an instruction on the data bus.
    #[default]
    Mode0,
    /// Fixed `RST 38h`.
    Mode1,
    /// Vector byte from the device indexes a table at `I * 256`.
    Mode2,
}

impl InterruptMode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Mode0 => 0,
            Self::Mode1 => 1,
            Self::Mode2 => 2,
        }
    }

    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Mode0),
            1 => Some(Self::Mode1),
            2 => Some(Self::Mode2),
            _ => None,
        }
    }
}

/// Execution state between steps.
///
/// Interrupt acknowledgement is never observable from outside a step: a
/// step either runs an instruction, idles in HALT, or performs a complete
/// acknowledge sequence (see [`StepKind`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CpuState {
    #[default]
    Running,
    /// Executing dummy M1 cycles until an interrupt is accepted.
    Halted,
}

/// What a single step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// One instruction executed (a dangling DD/FD prefix counts as one).
    Instruction,
    /// One idle M1 cycle while halted.
    Halted,
    /// Non-maskable interrupt acknowledged; PC is now 0x0066.
    Nmi,
    /// Maskable interrupt acknowledged in the given mode.
    Interrupt(InterruptMode),
}

/// Result of [`Z80::execute`](crate::Z80::execute).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    /// T-states consumed, wait states included.
    pub cycles: u32,
}

/// Interrupt inputs and the latches that gate their sampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct InterruptLatch {
    /// Devices currently holding the maskable line through the CPU API.
    pub int_requests: u8,
    /// NMI held through the CPU API.
    pub nmi_held: bool,
    /// Unserviced NMI edge.
    pub nmi_edge: bool,
    /// Last sampled level of [`Bus::nmi_line`](emu_core::Bus::nmi_line).
    pub nmi_bus_level: bool,
    /// The previous instruction was EI.
    pub after_ei: bool,
    /// The previous instruction was `LD A,I` or `LD A,R`.
    pub ld_a_ir: bool,
}

impl InterruptLatch {
    pub fn raise_int(&mut self) {
        self.int_requests = self.int_requests.saturating_add(1);
    }

    pub fn lower_int(&mut self) {
        self.int_requests = self.int_requests.saturating_sub(1);
    }

    pub fn raise_nmi(&mut self) {
        if !self.nmi_held {
            self.nmi_held = true;
            self.nmi_edge = true;
        }
    }

    pub fn lower_nmi(&mut self) {
        self.nmi_held = false;
    }

    /// Latch a rising edge on the bus NMI line.
    pub fn sample_nmi_line(&mut self, level: bool) {
        if level && !self.nmi_bus_level {
            self.nmi_edge = true;
        }
        self.nmi_bus_level = level;
    }

    /// Consume a pending NMI edge.
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_edge)
    }

    /// Forget boundary latches; line levels belong to the devices.
    pub fn reset(&mut self) {
        self.nmi_edge = false;
        self.after_ei = false;
        self.ld_a_ir = false;
    }

    pub fn to_bits(self) -> u8 {
        u8::from(self.nmi_held)
            | u8::from(self.nmi_edge) << 1
            | u8::from(self.nmi_bus_level) << 2
            | u8::from(self.after_ei) << 3
            | u8::from(self.ld_a_ir) << 4
    }

    pub fn from_bits(int_requests: u8, bits: u8) -> Self {
        Self {
            int_requests,
            nmi_held: bits & 0x01 != 0,
            nmi_edge: bits & 0x02 != 0,
            nmi_bus_level: bits & 0x04 != 0,
            after_ei: bits & 0x08 != 0,
            ld_a_ir: bits & 0x10 != 0,
        }
    }
}
