//! Line-oriented text to byte sequence, with literal folding and the
//! `.RET` suffix (§4.4).

use prim_core::text::{parse_number, split_return_suffix};
use prim_core::Op;

use crate::error::AsmError;

/// Assemble a whole source file: one call to [`assemble_line`] per line,
/// concatenated in order.
pub fn assemble_file(source: &str) -> Result<Vec<u8>, AsmError> {
    let mut out = Vec::new();
    for line in source.lines() {
        out.extend(assemble_line(line)?);
    }
    Ok(out)
}

/// Assemble one line: whitespace-separated tokens, a `;`/`#` token
/// consuming the rest of the line as a comment.
pub fn assemble_line(line: &str) -> Result<Vec<u8>, AsmError> {
    let mut out = Vec::new();
    for token in line.split_whitespace() {
        if token.starts_with(';') || token.starts_with('#') {
            break;
        }
        out.extend(assemble_token(token)?);
    }
    Ok(out)
}

/// Assemble a single non-comment token: a mnemonic (alias or canonical,
/// case-insensitive) or a number literal, either optionally suffixed
/// `.RET`.
fn assemble_token(token: &str) -> Result<Vec<u8>, AsmError> {
    let (base, with_return) = split_return_suffix(token);

    // The assembler (unlike the tokenizer, §4.6) case-folds mnemonics.
    if let Some(op) = Op::from_mnemonic(&base.to_ascii_uppercase()) {
        return Ok(vec![op.encode(with_return)]);
    }

    let value = parse_number(base).ok_or_else(|| AsmError::UnknownMnemonic(token.to_string()))?;
    Ok(if value < 0x100 {
        vec![Op::Push8.encode(with_return), value as u8]
    } else {
        vec![
            Op::Push.encode(with_return),
            (value & 0xFF) as u8,
            (value >> 8) as u8,
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_mnemonics_assemble_to_one_byte() {
        assert_eq!(assemble_line("ADD").unwrap(), vec![Op::Add.encode(false)]);
        assert_eq!(assemble_line("add").unwrap(), vec![Op::Add.encode(false)]);
    }

    #[test]
    fn return_suffix_sets_bit_seven() {
        assert_eq!(
            assemble_line("NOP.RET").unwrap(),
            vec![Op::Nop.encode(true)]
        );
    }

    #[test]
    fn aliases_assemble_through_the_same_path() {
        assert_eq!(assemble_line("+").unwrap(), vec![Op::Add.encode(false)]);
        assert_eq!(assemble_line("<U").unwrap(), vec![Op::Ltu.encode(false)]);
    }

    #[test]
    fn small_number_folds_to_push8() {
        assert_eq!(
            assemble_line("5").unwrap(),
            vec![Op::Push8.encode(false), 5]
        );
    }

    #[test]
    fn large_number_folds_to_push_little_endian() {
        assert_eq!(
            assemble_line("0x1234").unwrap(),
            vec![Op::Push.encode(false), 0x34, 0x12]
        );
    }

    #[test]
    fn number_literal_can_carry_the_return_suffix() {
        // §8 scenario 2: "5 call SIMEND nop 2.ret"
        assert_eq!(
            assemble_line("2.ret").unwrap(),
            vec![Op::Push8.encode(true), 2]
        );
    }

    #[test]
    fn negative_number_wraps_to_sixteen_bits() {
        assert_eq!(
            assemble_line("-1").unwrap(),
            vec![Op::Push.encode(false), 0xFF, 0xFF]
        );
    }

    #[test]
    fn dollar_and_0x_hex_prefixes_agree() {
        assert_eq!(parse_number("$FE"), parse_number("0xFE"));
    }

    #[test]
    fn comment_token_discards_rest_of_line() {
        assert_eq!(
            assemble_line("ADD ; push the answer").unwrap(),
            vec![Op::Add.encode(false)]
        );
        assert_eq!(
            assemble_line("ADD # also a comment marker").unwrap(),
            vec![Op::Add.encode(false)]
        );
    }

    #[test]
    fn end_to_end_scenario_one_assembles() {
        // §8 scenario 1: "1 2 +"
        let bytes = assemble_line("1 2 +").unwrap();
        assert_eq!(
            bytes,
            vec![Op::Push8.encode(false), 1, Op::Push8.encode(false), 2, Op::Add.encode(false)]
        );
    }

    #[test]
    fn unknown_token_is_reported() {
        assert_eq!(
            assemble_line("FROBNICATE"),
            Err(AsmError::UnknownMnemonic("FROBNICATE".to_string()))
        );
    }
}
