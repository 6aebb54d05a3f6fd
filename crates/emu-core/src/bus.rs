//! Memory and I/O bus interface.

use std::collections::HashMap;

use crate::EmuTime;

/// The kind of bus cycle a CPU is performing.
///
/// Devices use this to decide how many wait states to insert. Opcode
/// fetches are separated from plain reads because many machines add an
/// extra wait to every M1 cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Access {
    /// M1 opcode fetch (includes prefix bytes).
    OpcodeFetch,
    /// Operand, data or stack read.
    MemoryRead,
    /// Data or stack write.
    MemoryWrite,
    /// Port read.
    IoRead,
    /// Port write.
    IoWrite,
}

/// Memory and I/O bus interface.
///
/// Every access carries the emulated time at which it happens, so devices
/// can catch up to that point before answering. The bus never advances the
/// CPU clock itself; it only reports extra wait states through
/// [`Bus::wait_states`].
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16, time: EmuTime) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8, time: EmuTime);

    /// Read a byte from the given I/O port.
    ///
    /// The full 16-bit port is passed; most devices decode only the low byte.
    fn io_read(&mut self, port: u16, time: EmuTime) -> u8;

    /// Write a byte to the given I/O port.
    fn io_write(&mut self, port: u16, value: u8, time: EmuTime);

    /// Extra wait states for the access about to be made.
    ///
    /// Asked before every memory and I/O access. Defaults to none.
    fn wait_states(&mut self, _access: Access, _address: u16, _time: EmuTime) -> u8 {
        0
    }

    /// Byte placed on the data bus during an interrupt acknowledge cycle.
    ///
    /// Mode 0 executes it (and any bytes that follow), mode 2 uses it as the
    /// low half of the vector table address. An idle bus floats to `0xFF`.
    fn acknowledge_interrupt(&mut self, _time: EmuTime) -> u8 {
        0xFF
    }

    /// Level of the maskable interrupt line (`true` = asserted).
    fn int_line(&self) -> bool {
        false
    }

    /// Level of the non-maskable interrupt line (`true` = asserted).
    fn nmi_line(&self) -> bool {
        false
    }
}

/// Flat 64K RAM with scriptable ports, for tests and simple hosts.
///
/// Port reads answer from a table (unset ports float to `0xFF`) and every
/// port write is logged with its time.
#[derive(Debug, Clone)]
pub struct SimpleBus {
    memory: Vec<u8>,
    ports: HashMap<u16, u8>,
    io_writes: Vec<(u16, u8, EmuTime)>,
    waits: HashMap<Access, u8>,
    vector: u8,
    int_line: bool,
    nmi_line: bool,
    acknowledged: u32,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: vec![0; 0x1_0000],
            ports: HashMap::new(),
            io_writes: Vec::new(),
            waits: HashMap::new(),
            vector: 0xFF,
            int_line: false,
            nmi_line: false,
            acknowledged: 0,
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at 64K.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.memory[usize::from(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.memory[usize::from(address)]
    }

    pub fn poke(&mut self, address: u16, value: u8) {
        self.memory[usize::from(address)] = value;
    }

    /// Value returned by reads from `port` (full 16-bit match).
    pub fn set_port(&mut self, port: u16, value: u8) {
        self.ports.insert(port, value);
    }

    /// Every port write so far, oldest first.
    #[must_use]
    pub fn io_writes(&self) -> &[(u16, u8, EmuTime)] {
        &self.io_writes
    }

    /// Wait states inserted for every access of the given kind.
    pub fn set_wait_states(&mut self, access: Access, waits: u8) {
        self.waits.insert(access, waits);
    }

    /// Byte supplied on interrupt acknowledge.
    pub fn set_vector(&mut self, vector: u8) {
        self.vector = vector;
    }

    pub fn set_int_line(&mut self, asserted: bool) {
        self.int_line = asserted;
    }

    pub fn set_nmi_line(&mut self, asserted: bool) {
        self.nmi_line = asserted;
    }

    /// Number of interrupt acknowledge cycles seen.
    #[must_use]
    pub fn acknowledged(&self) -> u32 {
        self.acknowledged
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16, _time: EmuTime) -> u8 {
        self.memory[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8, _time: EmuTime) {
        self.memory[usize::from(address)] = value;
    }

    fn io_read(&mut self, port: u16, _time: EmuTime) -> u8 {
        self.ports.get(&port).copied().unwrap_or(0xFF)
    }

    fn io_write(&mut self, port: u16, value: u8, time: EmuTime) {
        self.io_writes.push((port, value, time));
    }

    fn wait_states(&mut self, access: Access, _address: u16, _time: EmuTime) -> u8 {
        self.waits.get(&access).copied().unwrap_or(0)
    }

    fn acknowledge_interrupt(&mut self, _time: EmuTime) -> u8 {
        self.acknowledged += 1;
        self.vector
    }

    fn int_line(&self) -> bool {
        self.int_line
    }

    fn nmi_line(&self) -> bool {
        self.nmi_line
    }
}
