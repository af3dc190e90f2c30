//! Byte sequence + symbol/literal metadata to annotated listing (§4.5).

use prim_core::{Bus, Dictionary, Op, DICT};

/// One reconstructed line of the listing: the address it starts at and
/// its rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisasmLine {
    pub addr: u16,
    pub text: String,
}

/// Walk `[start, end)` (typically `HERE` at capture time, to the current
/// `HERE`) reconstructing source-level lines.
pub fn disassemble(
    bus: &mut impl Bus,
    start: u16,
    end: u16,
    literals: &prim_core::LiteralMaps,
    dict: &Dictionary,
) -> Vec<DisasmLine> {
    let mut lines = Vec::new();
    let mut addr = start;

    while addr < end {
        if literals.is_string_literal(addr) {
            let (line, next) = read_string_literal(bus, addr);
            lines.push(line);
            addr = next;
            continue;
        }
        if literals.is_number_literal(addr) {
            let value = bus.read16(addr);
            lines.push(DisasmLine {
                addr,
                text: format!("Literal ${value:04X}"),
            });
            addr = addr.wrapping_add(2);
            continue;
        }

        let (line, next) = decode_instruction(bus, addr, dict);
        lines.push(line);
        addr = next;
    }

    lines
}

/// Render a listing produced by [`disassemble`] as text, one line per
/// entry, address-prefixed.
#[must_use]
pub fn render(lines: &[DisasmLine]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&format!("{:04X}: {}\n", line.addr, line.text));
    }
    out
}

fn read_string_literal(bus: &mut impl Bus, addr: u16) -> (DisasmLine, u16) {
    let len = bus.read8(addr);
    let mut bytes = Vec::with_capacity(len as usize);
    for i in 0..u16::from(len) {
        bytes.push(bus.read8(addr.wrapping_add(1).wrapping_add(i)));
    }
    let text = String::from_utf8_lossy(&bytes);
    let line = DisasmLine {
        addr,
        text: format!("\"{text}\""),
    };
    (line, addr.wrapping_add(1).wrapping_add(u16::from(len)))
}

fn decode_instruction(bus: &mut impl Bus, addr: u16, dict: &Dictionary) -> (DisasmLine, u16) {
    let byte = bus.read8(addr);
    let (op, with_return) = Op::decode(byte);
    let after = addr.wrapping_add(op.len());

    if matches!(op, Op::Push8 | Op::Push) {
        let value = if op == Op::Push8 {
            u16::from(bus.read8(addr.wrapping_add(1)))
        } else {
            bus.read16(addr.wrapping_add(1))
        };

        let (next_op, next_return) = Op::decode(bus.read8(after));
        if next_op == Op::Call {
            if let Some(name) = symbol_at(dict, bus, value) {
                let line = DisasmLine {
                    addr,
                    text: render_token(&name, next_return),
                };
                return (line, after.wrapping_add(next_op.len()));
            }
        } else if is_memory_op(next_op) {
            if let Some(name) = symbol_at(dict, bus, value) {
                let line = DisasmLine {
                    addr,
                    text: format!("'{name} {}", render_mnemonic(next_op, next_return)),
                };
                return (line, after.wrapping_add(next_op.len()));
            }
        }

        let line = DisasmLine {
            addr,
            text: render_token(&format!("${value:X}"), with_return),
        };
        return (line, after);
    }

    let line = DisasmLine {
        addr,
        text: render_mnemonic(op, with_return),
    };
    (line, after)
}

/// Find the name whose dictionary entry address equals `value`, by
/// scanning the descending table the same way the token interpreter's
/// `append_entry` wrote it (§3).
fn symbol_at(dict: &Dictionary, bus: &mut impl Bus, value: u16) -> Option<String> {
    (0..dict.len() as u16)
        .find(|&ordinal| bus.read16(DICT - 2 * ordinal) == value)
        .and_then(|ordinal| dict.name_of(ordinal))
        .map(str::to_string)
}

fn is_memory_op(op: Op) -> bool {
    matches!(op, Op::Fetch | Op::ByteFetch | Op::Store | Op::ByteStore)
}

fn render_mnemonic(op: Op, with_return: bool) -> String {
    render_token(op.mnemonic(), with_return)
}

fn render_token(body: &str, with_return: bool) -> String {
    if with_return {
        format!("{body}.RET")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble_line;
    use prim_core::{Memory, LiteralMaps};

    #[test]
    fn plain_instructions_round_trip_through_reassembly() {
        let bytes = assemble_line("1 2 +").unwrap();
        let mut mem = Memory::new();
        for (i, b) in bytes.iter().enumerate() {
            mem.write8(12 + i as u16, *b);
        }
        let lines = disassemble(
            &mut mem,
            12,
            12 + bytes.len() as u16,
            &LiteralMaps::new(),
            &Dictionary::new(),
        );
        let text: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(text, vec!["$1", "$2", "ADD"]);

        let reassembled: Vec<u8> = text
            .iter()
            .flat_map(|t| assemble_line(t).unwrap())
            .collect();
        assert_eq!(reassembled, bytes);
    }

    #[test]
    fn return_bit_is_rendered_and_reassembles() {
        let bytes = assemble_line("NOP.RET").unwrap();
        let mut mem = Memory::new();
        mem.write8(12, bytes[0]);
        let lines = disassemble(&mut mem, 12, 13, &LiteralMaps::new(), &Dictionary::new());
        assert_eq!(lines[0].text, "NOP.RET");
        assert_eq!(assemble_line(&lines[0].text).unwrap(), bytes);
    }

    #[test]
    fn push_then_call_renders_as_symbol_and_consumes_both_instructions() {
        let mut mem = Memory::new();
        let mut dict = Dictionary::new();
        dict.register("GREET");
        // Dictionary entry 0 lives at DICT - 0 = DICT, pointing at address 50.
        mem.write16(DICT, 50);

        let bytes = assemble_line("50 call").unwrap();
        for (i, b) in bytes.iter().enumerate() {
            mem.write8(12 + i as u16, *b);
        }

        let lines = disassemble(
            &mut mem,
            12,
            12 + bytes.len() as u16,
            &LiteralMaps::new(),
            &dict,
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "GREET");
    }

    #[test]
    fn string_literal_is_reconstructed_with_quotes() {
        let mut mem = Memory::new();
        mem.write8(12, 2);
        mem.write8(13, b'h');
        mem.write8(14, b'i');
        let mut literals = LiteralMaps::new();
        literals.strings.insert(12);

        let lines = disassemble(&mut mem, 12, 15, &literals, &Dictionary::new());
        assert_eq!(lines, vec![DisasmLine { addr: 12, text: "\"hi\"".to_string() }]);
    }

    #[test]
    fn number_literal_is_reconstructed() {
        let mut mem = Memory::new();
        mem.write16(12, 0x00FE);
        let mut literals = LiteralMaps::new();
        literals.numbers.insert(12);

        let lines = disassemble(&mut mem, 12, 14, &literals, &Dictionary::new());
        assert_eq!(lines[0].text, "Literal $00FE");
    }
}
