//! The debugger shell's non-terminal core (§4.8): a `(Cpu, Memory)` pair
//! plus breakpoints, a view origin, and a highlight range, driven by the
//! parsed [`Command`] grammar from `command`. Keypress polling and
//! rendering live in the `prim-debug` binary, where a real terminal is
//! available; everything here is plain state transitions so it can be
//! exercised without one.

mod command;
mod error;

use std::collections::BTreeSet;

use prim_core::{dict, text::parse_number, Bus, Cpu, Dictionary, LiteralMaps, Memory, Op};
use prim_format::Document;

pub use command::{parse_command, Command};
pub use error::DebugError;

/// Why a `run`/step-over loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A user-set breakpoint's address was reached.
    Breakpoint(u16),
    /// A step-over's self-clearing breakpoint was reached.
    SilentBreakpoint(u16),
    /// The CPU retired a `BREAK` opcode.
    BreakOpcode,
    /// The caller's `should_stop` predicate requested a stop (e.g. a
    /// keypress was observed).
    Requested,
}

/// What `step_over` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOverOutcome {
    /// The next instruction wasn't a `CALL`; one plain step was taken.
    Stepped(u8),
    /// The next instruction was a `CALL`; ran until the silent breakpoint
    /// placed right after it was hit (or some other stop fired first).
    Called(StopReason),
}

/// What a direct mnemonic-or-number command did (§4.8, §6: "plus any
/// mnemonic or hex number for direct push/execute").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectOutcome {
    /// The token was a mnemonic; it ran once on the live CPU.
    Executed(Op),
    /// The token was a number; it landed on top of the data stack.
    Pushed(u16),
}

/// The debugger's state: the live CPU/memory pair, the dictionary and
/// literal maps needed to resolve names and print listings, and the
/// purely cosmetic view-origin/highlight fields a terminal front end
/// reads back to render itself.
pub struct Debugger {
    pub cpu: Cpu,
    pub memory: Memory,
    pub dictionary: Dictionary,
    pub literals: LiteralMaps,
    breakpoints: BTreeSet<u16>,
    silent_breakpoints: BTreeSet<u16>,
    view_origin: u16,
    highlight: Option<(u16, u16)>,
}

impl Debugger {
    #[must_use]
    pub fn new(memory: Memory, dictionary: Dictionary, literals: LiteralMaps) -> Self {
        Self {
            cpu: Cpu::new(),
            memory,
            dictionary,
            literals,
            breakpoints: BTreeSet::new(),
            silent_breakpoints: BTreeSet::new(),
            view_origin: 0,
            highlight: None,
        }
    }

    /// Build a debugger from a persisted document (§6): its memory image,
    /// symbol table, and literal-address maps.
    pub fn from_document(doc: &Document) -> Result<Self, prim_format::FormatError> {
        let memory = doc.to_memory()?;
        let mut dictionary = Dictionary::new();
        for name in &doc.symbols {
            dictionary.register(name.clone());
        }
        let literals = LiteralMaps {
            numbers: doc.num_literals.iter().copied().collect(),
            strings: doc.string_literals.iter().copied().collect(),
        };
        Ok(Self::new(memory, dictionary, literals))
    }

    /// Restore the memory snapshot taken at load time and reset the CPU
    /// to its power-on state (`reset`, §6).
    pub fn reset(&mut self) {
        self.memory.reset();
        self.cpu = Cpu::new();
    }

    /// Execute exactly one instruction.
    pub fn step(&mut self) -> u8 {
        self.cpu.step(&mut self.memory)
    }

    /// Step over the next instruction (§4.8): if it's a `CALL`, plant a
    /// silent breakpoint right after it and run until hit; otherwise take
    /// one plain step. `should_stop` is polled once per instruction, the
    /// same hook `run_until` uses, so a terminal front end can interrupt
    /// a runaway call the same way it interrupts `run`.
    pub fn step_over(&mut self, should_stop: impl FnMut(&Self) -> bool) -> StepOverOutcome {
        let pc = self.cpu.pc();
        let byte = self.memory.as_bytes()[pc as usize];
        let (op, _) = Op::decode(byte);
        if op == Op::Call {
            let after = pc.wrapping_add(op.len());
            self.silent_breakpoints.insert(after);
            StepOverOutcome::Called(self.run_until(should_stop))
        } else {
            StepOverOutcome::Stepped(self.step())
        }
    }

    /// Run until a user breakpoint, a `BREAK` opcode, a hit silent
    /// breakpoint, or `should_stop` returns `true` (§4.8, §5: "yields
    /// between steps only to check for a keypress").
    pub fn run_until(&mut self, mut should_stop: impl FnMut(&Self) -> bool) -> StopReason {
        loop {
            let byte = self.step();
            let pc = self.cpu.pc();
            if self.silent_breakpoints.remove(&pc) {
                return StopReason::SilentBreakpoint(pc);
            }
            if self.breakpoints.contains(&pc) {
                return StopReason::Breakpoint(pc);
            }
            let (op, _) = Op::decode(byte);
            if op == Op::Break {
                return StopReason::BreakOpcode;
            }
            if should_stop(self) {
                return StopReason::Requested;
            }
        }
    }

    /// Resolve a dictionary name to the address its entry holds, or parse
    /// `token` as a number directly — the two forms `break`'s argument
    /// accepts (§6: "`break [addr|name]`").
    pub fn resolve_target(&mut self, token: &str) -> Result<u16, DebugError> {
        if let Some(ordinal) = self.dictionary.ordinal_of(token) {
            if let Some(addr) = dict::lookup(&mut self.memory, ordinal) {
                return Ok(addr);
            }
        }
        parse_number(token).ok_or_else(|| DebugError::UnknownBreakTarget(token.to_string()))
    }

    /// Toggle a breakpoint at `addr`, returning whether it's now set.
    pub fn toggle_breakpoint(&mut self, addr: u16) -> bool {
        if !self.breakpoints.remove(&addr) {
            self.breakpoints.insert(addr);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn breakpoints(&self) -> &BTreeSet<u16> {
        &self.breakpoints
    }

    pub fn set_view_origin(&mut self, addr: u16) {
        self.view_origin = addr;
    }

    #[must_use]
    pub const fn view_origin(&self) -> u16 {
        self.view_origin
    }

    pub fn set_highlight(&mut self, range: Option<(u16, u16)>) {
        self.highlight = range;
    }

    #[must_use]
    pub const fn highlight(&self) -> Option<(u16, u16)> {
        self.highlight
    }

    /// Read `len` bytes starting at `addr`, without the side effects a
    /// live `Bus::read8` would have on the two UART cells — the same
    /// peek/read distinction the host project draws between inspection
    /// and execution.
    #[must_use]
    pub fn read(&self, addr: u16, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| self.memory.as_bytes()[addr.wrapping_add(i as u16) as usize])
            .collect()
    }

    /// Write `bytes` starting at `addr`, through the live bus (so a write
    /// to a UART cell behaves like a program's own store would).
    pub fn write(&mut self, addr: u16, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.memory.write8(addr.wrapping_add(i as u16), b);
        }
    }

    /// Queue `text` for the next UART reads (`uart <text>`, §6).
    pub fn uart_inject(&mut self, text: &str) {
        self.memory.uart_inject_text(text);
    }

    /// Execute a mnemonic once, or push a number, directly on the live
    /// CPU (§4.8, §6). Mnemonics run through the same `AREA`/`BREAK`
    /// immediate-execution scratch region the token interpreter uses for
    /// its own immediate bursts.
    pub fn execute_direct(&mut self, token: &str) -> Result<DirectOutcome, DebugError> {
        if let Some(op) = Op::from_mnemonic(&token.to_ascii_uppercase()) {
            self.memory.write8(dict::AREA, op.encode(false));
            self.memory
                .write8(dict::AREA.wrapping_add(op.len()), Op::Break.encode(false));
            let saved_pc = self.cpu.pc();
            self.cpu.set_pc(dict::AREA);
            loop {
                let byte = self.step();
                if byte == Op::Break.encode(false) {
                    break;
                }
            }
            self.cpu.set_pc(saved_pc);
            return Ok(DirectOutcome::Executed(op));
        }
        if let Some(value) = parse_number(token) {
            self.cpu.data_push(value);
            return Ok(DirectOutcome::Pushed(value));
        }
        Err(DebugError::UnknownDirectToken(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(value: u16) -> Vec<u8> {
        if value < 0x100 {
            vec![Op::Push8.encode(false), value as u8]
        } else {
            vec![Op::Push.encode(false), (value & 0xFF) as u8, (value >> 8) as u8]
        }
    }

    fn debugger_with_program(program: &[u8]) -> Debugger {
        let mut memory = Memory::new();
        for (i, &b) in program.iter().enumerate() {
            memory.write8(i as u16, b);
        }
        Debugger::new(memory, Dictionary::new(), LiteralMaps::new())
    }

    #[test]
    fn step_advances_pc_by_instruction_length() {
        let mut dbg = debugger_with_program(&[Op::Nop.encode(false), Op::Push8.encode(false), 5]);
        dbg.step();
        assert_eq!(dbg.cpu.pc(), 1);
        dbg.step();
        assert_eq!(dbg.cpu.pc(), 3);
        assert_eq!(dbg.cpu.t(), 5);
    }

    #[test]
    fn step_over_a_non_call_is_a_plain_step() {
        let mut dbg = debugger_with_program(&[Op::Nop.encode(false), Op::Simend.encode(false)]);
        let outcome = dbg.step_over(|_| false);
        assert!(matches!(outcome, StepOverOutcome::Stepped(_)));
        assert_eq!(dbg.cpu.pc(), 1);
    }

    #[test]
    fn step_over_a_call_runs_to_just_after_it() {
        // 0: PUSH8 5  (target)
        // 2: CALL
        // 3: SIMEND   <- step-over should land here
        // 4: NOP
        // 5: NOP.RET  (the "subroutine")
        let mut program = push(5);
        program.push(Op::Call.encode(false));
        program.push(Op::Simend.encode(false));
        program.push(Op::Nop.encode(false));
        program.push(Op::Nop.encode(true));
        let mut dbg = debugger_with_program(&program);
        dbg.step(); // PUSH8 5
        assert_eq!(dbg.cpu.pc(), 2);
        let outcome = dbg.step_over(|_| false);
        assert_eq!(dbg.cpu.pc(), 3);
        assert!(matches!(
            outcome,
            StepOverOutcome::Called(StopReason::SilentBreakpoint(3))
        ));
        // The silent breakpoint self-cleared.
        assert!(dbg.breakpoints().is_empty());
    }

    #[test]
    fn run_until_stops_on_a_user_breakpoint() {
        let program = vec![
            Op::Nop.encode(false),
            Op::Nop.encode(false),
            Op::Nop.encode(false),
            Op::Simend.encode(false),
        ];
        let mut dbg = debugger_with_program(&program);
        dbg.toggle_breakpoint(2);
        let reason = dbg.run_until(|_| false);
        assert_eq!(reason, StopReason::Breakpoint(2));
        assert_eq!(dbg.cpu.pc(), 2);
    }

    #[test]
    fn run_until_stops_on_break_opcode() {
        let program = vec![Op::Nop.encode(false), Op::Break.encode(false), Op::Nop.encode(false)];
        let mut dbg = debugger_with_program(&program);
        let reason = dbg.run_until(|_| false);
        assert_eq!(reason, StopReason::BreakOpcode);
    }

    #[test]
    fn run_until_honors_the_should_stop_predicate() {
        let program = vec![Op::Nop.encode(false); 10];
        let mut dbg = debugger_with_program(&program);
        let mut count = 0;
        let reason = dbg.run_until(|_| {
            count += 1;
            count >= 3
        });
        assert_eq!(reason, StopReason::Requested);
        assert_eq!(dbg.cpu.pc(), 3);
    }

    #[test]
    fn toggle_breakpoint_sets_then_clears() {
        let mut dbg = debugger_with_program(&[Op::Simend.encode(false)]);
        assert!(dbg.toggle_breakpoint(0x10));
        assert!(dbg.breakpoints().contains(&0x10));
        assert!(!dbg.toggle_breakpoint(0x10));
        assert!(dbg.breakpoints().is_empty());
    }

    #[test]
    fn resolve_target_prefers_a_dictionary_name_then_falls_back_to_a_number() {
        let mut dbg = debugger_with_program(&[Op::Simend.encode(false)]);
        dbg.dictionary.register("MAIN");
        dict::append_entry(&mut dbg.memory, 0x1234);
        assert_eq!(dbg.resolve_target("MAIN"), Ok(0x1234));
        assert_eq!(dbg.resolve_target("$20"), Ok(0x20));
        assert!(dbg.resolve_target("NOPE").is_err());
    }

    #[test]
    fn read_does_not_pop_the_uart_queue() {
        let mut dbg = debugger_with_program(&[0; 4]);
        dbg.memory.uart_inject(0x41);
        let bytes = dbg.read(0xFFFE, 2);
        assert_eq!(bytes, vec![0, 0], "peeking must not drain the UART queue");
        assert!(dbg.memory.uart_rx_pending());
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut dbg = debugger_with_program(&[0; 4]);
        dbg.write(0x10, &[0xAA, 0xBB]);
        assert_eq!(dbg.read(0x10, 2), vec![0xAA, 0xBB]);
    }

    #[test]
    fn uart_inject_is_visible_to_the_cpu() {
        let mut dbg = debugger_with_program(&[0; 4]);
        dbg.uart_inject("A");
        assert!(dbg.memory.uart_rx_pending());
    }

    #[test]
    fn view_origin_and_highlight_are_plain_state() {
        let mut dbg = debugger_with_program(&[0; 4]);
        assert_eq!(dbg.view_origin(), 0);
        dbg.set_view_origin(0x200);
        assert_eq!(dbg.view_origin(), 0x200);
        assert_eq!(dbg.highlight(), None);
        dbg.set_highlight(Some((0x10, 4)));
        assert_eq!(dbg.highlight(), Some((0x10, 4)));
        dbg.set_highlight(None);
        assert_eq!(dbg.highlight(), None);
    }

    #[test]
    fn execute_direct_runs_a_mnemonic_without_moving_pc() {
        let mut dbg = debugger_with_program(&[Op::Simend.encode(false)]);
        dbg.cpu.data_push(3);
        dbg.cpu.data_push(4);
        let saved_pc = dbg.cpu.pc();
        let outcome = dbg.execute_direct("ADD").unwrap();
        assert_eq!(outcome, DirectOutcome::Executed(Op::Add));
        assert_eq!(dbg.cpu.t(), 7);
        assert_eq!(dbg.cpu.pc(), saved_pc);
    }

    #[test]
    fn execute_direct_pushes_a_number() {
        let mut dbg = debugger_with_program(&[Op::Simend.encode(false)]);
        let outcome = dbg.execute_direct("$2A").unwrap();
        assert_eq!(outcome, DirectOutcome::Pushed(0x2A));
        assert_eq!(dbg.cpu.t(), 0x2A);
    }

    #[test]
    fn execute_direct_rejects_garbage() {
        let mut dbg = debugger_with_program(&[Op::Simend.encode(false)]);
        assert!(dbg.execute_direct("NOTANOPCODE").is_err());
    }

    #[test]
    fn reset_restores_the_snapshot_and_a_fresh_cpu() {
        let mut dbg = debugger_with_program(&[Op::Push8.encode(false), 9]);
        dbg.step();
        dbg.step();
        assert_ne!(dbg.cpu.pc(), 0);
        dbg.reset();
        assert_eq!(dbg.cpu.pc(), 0);
        assert_eq!(dbg.cpu.t(), 0);
    }
}
