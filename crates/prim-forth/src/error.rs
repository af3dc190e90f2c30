//! Errors surfaced by the tokenizer and the token interpreter (§4.9, §7).

use std::fmt;

/// Source errors: abort tokenization with a message naming the fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    UnterminatedString,
    UnknownWord(String),
    DefinitionInImmediateMode(String),
    LiteralInImmediateMode(String),
    StringInImmediateMode(String),
    BadNumber(String),
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::UnknownWord(w) => write!(f, "unknown word: {w}"),
            Self::DefinitionInImmediateMode(w) => {
                write!(f, "definition in immediate mode: {w}")
            }
            Self::LiteralInImmediateMode(w) => write!(f, "literal in immediate mode: {w}"),
            Self::StringInImmediateMode(w) => write!(f, "string in immediate mode: {w}"),
            Self::BadNumber(w) => write!(f, "bad number literal: {w}"),
        }
    }
}

impl std::error::Error for TokenizeError {}

/// Programmer errors: abort interpretation with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpretError {
    UnknownTag(u8),
    UnknownOrdinal(u16),
    ImmediateBurstTooLarge(usize),
    DictionaryOverflow,
    TruncatedToken,
}

impl fmt::Display for InterpretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTag(tag) => write!(f, "unknown token tag: {tag}"),
            Self::UnknownOrdinal(ord) => write!(f, "dictionary ordinal out of range: {ord}"),
            Self::ImmediateBurstTooLarge(len) => {
                write!(f, "immediate execution burst too large: {len} bytes")
            }
            Self::DictionaryOverflow => write!(f, "emitted code past the dictionary table"),
            Self::TruncatedToken => write!(f, "token stream ends mid-token"),
        }
    }
}

impl std::error::Error for InterpretError {}
