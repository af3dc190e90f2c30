//! Opcode table, memory image, and CPU core for the Prim stack processor.
//!
//! `Bus` and `Memory` model the 64 KiB byte-addressable image (§3 of the
//! design); `opcode` is the closed mnemonic set (§4.1); `cpu` is the
//! fetch/decode/execute loop (§4.3); `dict` holds the fixed pointer cells
//! and literal-address sets shared with the tokenizer/token interpreter.

mod bus;
mod cpu;
pub mod dict;
mod error;
mod memory;
pub mod opcode;
pub mod text;

pub use bus::Bus;
pub use cpu::Cpu;
pub use dict::{Dictionary, LiteralMaps, AREA, CODE_START, DICT, HERE, LATEST};
pub use error::PrimError;
pub use memory::{Memory, SIZE};
pub use opcode::Op;
