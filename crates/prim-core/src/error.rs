use std::fmt;

/// Programmer-facing failures raised by the CPU/memory core.
///
/// Runtime conditions (wrap-around, empty UART reads, unused opcode
/// slots) are all defined behavior per §4.3 and never produce this type;
/// it exists for the handful of invariants a caller can actually violate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimError {
    /// An immediate-execution burst exceeded the 0xF0-byte limit (§4.7).
    ImmediateBurstTooLarge(usize),
    /// A write at or beyond `DICT` would clobber the dictionary table.
    EmitPastDictionary(u16),
}

impl fmt::Display for PrimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImmediateBurstTooLarge(len) => {
                write!(f, "immediate execution burst of {len} bytes exceeds 0xF0")
            }
            Self::EmitPastDictionary(addr) => {
                write!(f, "emit at ${addr:04X} would overlap the dictionary table")
            }
        }
    }
}

impl std::error::Error for PrimError {}
