//! The persisted TOML document shared by every `prim-*` binary (§6,
//! ambient per §4 of the expanded design: the wire format itself is out
//! of scope, but the tools still need one place to read/write it).

mod codec;
mod document;
mod error;

pub use document::{Document, TYPE_TOKENFORTH, TYPE_TOKENIZER};
pub use error::FormatError;
