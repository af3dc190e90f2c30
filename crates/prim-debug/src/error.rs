//! Errors raised by command parsing and dispatch (§4.8, §7).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugError {
    /// An empty line was submitted as a command.
    EmptyCommand,
    /// A command's argument was missing or didn't parse.
    BadArgument(String),
    /// The token after `break` resolved to neither a known name nor a
    /// parseable address.
    UnknownBreakTarget(String),
    /// The direct-execution token was neither a mnemonic nor a number.
    UnknownDirectToken(String),
}

impl fmt::Display for DebugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCommand => write!(f, "empty command"),
            Self::BadArgument(msg) => write!(f, "{msg}"),
            Self::UnknownBreakTarget(tok) => {
                write!(f, "unknown breakpoint target: {tok}")
            }
            Self::UnknownDirectToken(tok) => {
                write!(f, "not a mnemonic or number: {tok}")
            }
        }
    }
}

impl std::error::Error for DebugError {}
