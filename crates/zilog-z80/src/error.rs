//! Error types.

use thiserror::Error;

/// Rejected [`Z80Config`](crate::Z80Config).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("CPU clock divider must be non-zero")]
    ZeroDivider,

    #[error("memory access split {before}+{after} must total 3 T-states")]
    MemoryDelay { before: u32, after: u32 },

    #[error("I/O access split {before}+{after} must total 4 T-states")]
    IoDelay { before: u32, after: u32 },
}

/// Failure decoding a binary [`Z80State`](crate::Z80State).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("snapshot is {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },

    #[error("unsupported snapshot version {0}")]
    Version(u8),

    #[error("invalid interrupt mode {0}")]
    InterruptMode(u8),

    #[error("invalid CPU state tag {0}")]
    CpuState(u8),

    #[error("invalid index prefix tag {0}")]
    Prefix(u8),
}
