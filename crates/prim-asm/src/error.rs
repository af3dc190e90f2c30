//! Errors surfaced by the assembler and disassembler (§4.9).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// A token was neither a known mnemonic (plus alias) nor a number.
    UnknownMnemonic(String),
    /// A token looked like a number literal but didn't parse as one.
    BadNumber(String),
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMnemonic(tok) => write!(f, "unknown mnemonic: {tok}"),
            Self::BadNumber(tok) => write!(f, "bad number literal: {tok}"),
        }
    }
}

impl std::error::Error for AsmError {}
