//! Line-oriented assembler and symbol-aware disassembler for Prim (§4.4,
//! §4.5).

mod assembler;
mod disassembler;
mod error;

pub use assembler::{assemble_file, assemble_line};
pub use disassembler::{disassemble, render, DisasmLine};
pub use error::AsmError;
pub use prim_core::text::parse_number;
