//! The token interpreter (§4.7): consumes a token stream, compiling code
//! into the shared memory image and driving the CPU to execute immediate
//! fragments against that same image.

use prim_core::{dict, Bus, Cpu, Dictionary, LiteralMaps, Memory, Op};

use crate::error::InterpretError;
use crate::token::{Mode, Token};

/// Opcode sequences longer than this cannot fit in the `AREA` scratch
/// region used for immediate execution (§4.7).
const MAX_IMMEDIATE_BURST: usize = 0xF0;

/// Owns the live `(Cpu, Memory)` pair plus the dictionary and literal maps
/// that grow as tokens are consumed (§9: "a re-implementation should pass
/// that pair as an explicit argument, not a process global").
pub struct TokenInterpreter {
    pub cpu: Cpu,
    pub memory: Memory,
    pub dictionary: Dictionary,
    pub literals: LiteralMaps,
    mode: Mode,
}

impl TokenInterpreter {
    /// A fresh interpreter with `H` (ordinal 0) and `LATEST` (ordinal 1)
    /// pre-seeded: their dictionary addresses are pinned to the `HERE`/
    /// `LATEST` pointer cells themselves, not to whatever `HERE` holds at
    /// definition time (ground truth: the original `Dictionary.add`
    /// special-cases `name == "H"` exactly this way).
    #[must_use]
    pub fn new() -> Self {
        let mut memory = Memory::new();
        dict::append_entry(&mut memory, dict::HERE);
        dict::append_entry(&mut memory, dict::LATEST);
        Self {
            cpu: Cpu::new(),
            memory,
            dictionary: Dictionary::seeded(),
            literals: LiteralMaps::new(),
            mode: Mode::Compile,
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Append bytes at `HERE`, bumping it (§4.7 `comma`).
    fn comma(&mut self, bytes: &[u8]) -> Result<(), InterpretError> {
        let mut here = dict::here(&mut self.memory);
        for &b in bytes {
            if here >= dict::DICT {
                return Err(InterpretError::DictionaryOverflow);
            }
            self.memory.write8(here, b);
            here = here.wrapping_add(1);
        }
        self.memory.write16(dict::HERE, here);
        Ok(())
    }

    /// `push_ops(n, shrink=true)`: `PUSH8 n` if it fits a byte, else
    /// `PUSH lo hi`.
    fn push_ops(value: u16) -> Vec<u8> {
        if value < 0x100 {
            vec![Op::Push8.encode(false), value as u8]
        } else {
            vec![Op::Push.encode(false), (value & 0xFF) as u8, (value >> 8) as u8]
        }
    }

    /// Fixed-width `PUSH lo hi`, used only for the string-literal preamble
    /// (see [`Self::emit_string`]), where the preamble's own length must
    /// not depend on the magnitude of the address it pushes.
    fn push_ops_fixed(value: u16) -> [u8; 3] {
        [Op::Push.encode(false), (value & 0xFF) as u8, (value >> 8) as u8]
    }

    /// Run a short opcode sequence to completion on the live CPU (§4.7):
    /// copy it plus a trailing `BREAK` into `AREA`, point `PC` there, and
    /// step until the fetched opcode byte is `BREAK`. `PC` is restored
    /// afterwards so immediate bursts never disturb top-level control
    /// flow.
    fn execute_immediate(&mut self, ops: &[u8]) -> Result<(), InterpretError> {
        if ops.len() > MAX_IMMEDIATE_BURST {
            return Err(InterpretError::ImmediateBurstTooLarge(ops.len()));
        }
        let saved_pc = self.cpu.pc();
        let mut addr = dict::AREA;
        for &b in ops {
            self.memory.write8(addr, b);
            addr = addr.wrapping_add(1);
        }
        self.memory.write8(addr, Op::Break.encode(false));
        self.cpu.set_pc(dict::AREA);
        let break_byte = Op::Break.encode(false);
        loop {
            if self.cpu.step(&mut self.memory) == break_byte {
                break;
            }
        }
        self.cpu.set_pc(saved_pc);
        Ok(())
    }

    /// Compile-mode tokens append to memory; immediate-mode tokens run on
    /// the live CPU instead (§4.7: "this is the mechanism by which
    /// immediate-mode tokens take effect on the live data stack").
    fn emit_or_execute(&mut self, ops: &[u8]) -> Result<(), InterpretError> {
        match self.mode {
            Mode::Compile => self.comma(ops),
            Mode::Immediate => self.execute_immediate(ops),
        }
    }

    fn resolve(&mut self, ordinal: u16) -> Result<u16, InterpretError> {
        dict::lookup(&mut self.memory, ordinal).ok_or(InterpretError::UnknownOrdinal(ordinal))
    }

    /// Interpret one token, mutating the live dictionary/memory/CPU state.
    pub fn interpret_token(&mut self, token: &Token) -> Result<(), InterpretError> {
        match token {
            Token::WordCall(ordinal) => {
                let addr = self.resolve(*ordinal)?;
                let mut ops = Self::push_ops(addr);
                ops.push(Op::Call.encode(false));
                self.emit_or_execute(&ops)
            }
            Token::WordAddress(ordinal) => {
                let addr = self.resolve(*ordinal)?;
                let ops = Self::push_ops(addr);
                self.emit_or_execute(&ops)
            }
            Token::Number(value) => {
                let ops = Self::push_ops(*value);
                self.emit_or_execute(&ops)
            }
            Token::String(s) => self.emit_string(s),
            Token::Mnemonic(byte) => self.emit_or_execute(&[*byte]),
            Token::Builtin(0) => self.emit_or_execute(&[Op::Nop.encode(true)]),
            Token::Builtin(other) => Err(InterpretError::UnknownOrdinal(u16::from(*other))),
            Token::LitNumber(value) => self.emit_lit_number(*value),
            Token::LitString(s) => self.emit_lit_string(s),
            Token::Definition(name) => self.define(name),
            Token::Mode(m) => {
                self.mode = *m;
                Ok(())
            }
            Token::CommentBraces(_) | Token::CommentBackslash(_) | Token::Whitespace(_) => Ok(()),
        }
    }

    /// Interpret a whole token stream in order.
    pub fn interpret(&mut self, tokens: &[Token]) -> Result<(), InterpretError> {
        for token in tokens {
            self.interpret_token(token)?;
        }
        Ok(())
    }

    /// `STRING(s)` compile action (§4.7): a fixed-width preamble of two
    /// full `PUSH` instructions and a `JP` — `push(addr_of_payload) ;
    /// push(addr_after_payload) ; JP` — followed by the length-prefixed
    /// payload. At runtime the first push's value survives the `JP`
    /// (which only consumes the second), leaving the payload address on
    /// the data stack while control skips past the bytes.
    ///
    /// Both pushes are deliberately the fixed 3-byte `PUSH` form rather
    /// than the shrink-folding `push_ops`: `addr_of_payload` is computed
    /// from the preamble's own length, so that length must be a
    /// compile-time constant, not dependent on the magnitude of the
    /// address being pushed (ground truth: the original `compile_string`
    /// passes `shrink=False` to both calls for the same reason).
    ///
    /// Tokenization already rejects `STRING` in immediate mode (§4.6 rule
    /// 7), so this is only ever reached in compile mode.
    fn emit_string(&mut self, s: &str) -> Result<(), InterpretError> {
        const PREAMBLE_LEN: u16 = 3 + 3 + 1;
        let bytes = s.as_bytes();
        let len = u8::try_from(bytes.len()).unwrap_or(u8::MAX);
        let here = dict::here(&mut self.memory);
        let payload_addr = here.wrapping_add(PREAMBLE_LEN);
        let after_addr = payload_addr.wrapping_add(1).wrapping_add(u16::from(len));

        let mut ops = Vec::with_capacity(PREAMBLE_LEN as usize + 1 + bytes.len());
        ops.extend(Self::push_ops_fixed(payload_addr));
        ops.extend(Self::push_ops_fixed(after_addr));
        ops.push(Op::Jp.encode(false));
        ops.push(len);
        ops.extend_from_slice(bytes);
        self.comma(&ops)?;
        self.literals.strings.insert(payload_addr);
        Ok(())
    }

    /// `LIT_NUMBER(v)`: record `HERE` in `NumberLiterals`, then emit the
    /// value as two in-line bytes (no preamble — these sit directly in
    /// the enclosing definition's body).
    fn emit_lit_number(&mut self, value: u16) -> Result<(), InterpretError> {
        let here = dict::here(&mut self.memory);
        self.literals.numbers.insert(here);
        self.comma(&value.to_le_bytes())
    }

    /// `LIT_STRING(s)`: emit a length byte then the UTF-8 bytes, with no
    /// skip-over preamble (unlike `STRING`, this literal is meant to be
    /// read as in-line data by surrounding code, not jumped over).
    fn emit_lit_string(&mut self, s: &str) -> Result<(), InterpretError> {
        let bytes = s.as_bytes();
        let len = u8::try_from(bytes.len()).unwrap_or(u8::MAX);
        let mut payload = Vec::with_capacity(1 + bytes.len());
        payload.push(len);
        payload.extend_from_slice(bytes);
        self.comma(&payload)
    }

    /// `DEFINITION(name)`: register `name` for the next ordinal and point
    /// its dictionary entry at the current `HERE`.
    fn define(&mut self, name: &str) -> Result<(), InterpretError> {
        let here = dict::here(&mut self.memory);
        self.dictionary.register(name);
        dict::append_entry(&mut self.memory, here);
        Ok(())
    }
}

impl Default for TokenInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn run_source(source: &str) -> TokenInterpreter {
        let mut interp = TokenInterpreter::new();
        let tokens = tokenize(source, &mut interp.dictionary.clone()).unwrap();
        interp.interpret(&tokens).unwrap();
        interp
    }

    #[test]
    fn seeding_pins_h_and_latest_to_their_pointer_cells() {
        let interp = TokenInterpreter::new();
        assert_eq!(interp.dictionary.name_of(0), Some("H"));
        assert_eq!(interp.dictionary.name_of(1), Some("LATEST"));
    }

    #[test]
    fn word_call_compiles_push_and_call() {
        let mut interp = TokenInterpreter::new();
        let mut dict = interp.dictionary.clone();
        let tokens = tokenize(": FOO NOP ; : BAR FOO", &mut dict).unwrap();
        interp.interpret(&tokens).unwrap();
        let foo_addr = dict::lookup(&mut interp.memory, 2).unwrap();
        let bar_addr = dict::lookup(&mut interp.memory, 3).unwrap();
        let bytes = interp.memory.as_bytes();
        assert_eq!(bytes[bar_addr as usize], Op::Push8.encode(false));
        assert_eq!(bytes[bar_addr as usize + 1] as u16, foo_addr);
        assert_eq!(bytes[bar_addr as usize + 2], Op::Call.encode(false));
    }

    #[test]
    fn number_token_compiles_push8_for_small_values() {
        let mut interp = TokenInterpreter::new();
        let start = dict::here(&mut interp.memory);
        interp.interpret_token(&Token::Number(5)).unwrap();
        let bytes = interp.memory.as_bytes();
        assert_eq!(bytes[start as usize], Op::Push8.encode(false));
        assert_eq!(bytes[start as usize + 1], 5);
    }

    #[test]
    fn immediate_number_lands_on_the_data_stack() {
        let mut interp = TokenInterpreter::new();
        interp.interpret_token(&Token::Mode(Mode::Immediate)).unwrap();
        interp.interpret_token(&Token::Number(9)).unwrap();
        assert_eq!(interp.cpu.t(), 9);
    }

    #[test]
    fn immediate_add_executes_on_the_live_cpu() {
        let mut interp = TokenInterpreter::new();
        interp.interpret_token(&Token::Mode(Mode::Immediate)).unwrap();
        interp.interpret_token(&Token::Number(2)).unwrap();
        interp.interpret_token(&Token::Number(3)).unwrap();
        interp
            .interpret_token(&Token::Mnemonic(Op::Add.encode(false)))
            .unwrap();
        assert_eq!(interp.cpu.t(), 5);
    }

    #[test]
    fn builtin_semicolon_emits_nop_with_return_bit() {
        let mut interp = TokenInterpreter::new();
        let start = dict::here(&mut interp.memory);
        interp.interpret_token(&Token::Builtin(0)).unwrap();
        assert_eq!(interp.memory.as_bytes()[start as usize], Op::Nop.encode(true));
    }

    #[test]
    fn lit_number_records_address_and_emits_both_bytes() {
        let mut interp = TokenInterpreter::new();
        let start = dict::here(&mut interp.memory);
        interp.interpret_token(&Token::LitNumber(0x1234)).unwrap();
        assert!(interp.literals.is_number_literal(start));
        let bytes = interp.memory.as_bytes();
        assert_eq!(
            u16::from_le_bytes([bytes[start as usize], bytes[start as usize + 1]]),
            0x1234
        );
    }

    #[test]
    fn lit_string_emits_length_and_bytes_with_no_preamble() {
        let mut interp = TokenInterpreter::new();
        let start = dict::here(&mut interp.memory);
        interp
            .interpret_token(&Token::LitString("hi".to_string()))
            .unwrap();
        let bytes = interp.memory.as_bytes();
        assert_eq!(bytes[start as usize], 2);
        assert_eq!(&bytes[start as usize + 1..start as usize + 3], b"hi");
        assert_eq!(dict::here(&mut interp.memory), start + 3);
    }

    #[test]
    fn string_token_records_payload_address_and_skips_past_it() {
        let mut interp = TokenInterpreter::new();
        let start = dict::here(&mut interp.memory);
        interp
            .interpret_token(&Token::String("hi".to_string()))
            .unwrap();
        let payload_addr = start + 7;
        assert!(interp.literals.is_string_literal(payload_addr));
        let bytes = interp.memory.as_bytes();
        assert_eq!(bytes[payload_addr as usize], 2);
        assert_eq!(
            &bytes[payload_addr as usize + 1..payload_addr as usize + 3],
            b"hi"
        );
        assert_eq!(dict::here(&mut interp.memory), start + 7 + 1 + 2);
    }

    #[test]
    fn unknown_word_call_ordinal_is_fatal() {
        let mut interp = TokenInterpreter::new();
        assert_eq!(
            interp.interpret_token(&Token::WordCall(99)),
            Err(InterpretError::UnknownOrdinal(99))
        );
    }

    #[test]
    fn immediate_burst_over_the_limit_is_fatal() {
        let mut interp = TokenInterpreter::new();
        interp.interpret_token(&Token::Mode(Mode::Immediate)).unwrap();
        let ops = vec![Op::Nop.encode(false); MAX_IMMEDIATE_BURST + 1];
        assert_eq!(
            interp.execute_immediate(&ops),
            Err(InterpretError::ImmediateBurstTooLarge(MAX_IMMEDIATE_BURST + 1))
        );
    }

    #[test]
    fn tokenize_then_interpret_matches_a_reference_program() {
        let mut interp = run_source(": FOO 1 2 + ;");
        let foo_addr = dict::lookup(&mut interp.memory, 2);
        assert_eq!(foo_addr, Some(prim_core::CODE_START));
    }
}
