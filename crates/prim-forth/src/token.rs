//! The typed token stream and its flat wire encoding (§4.6 table, §9:
//! "model them as a tagged variant, not as a class hierarchy").

use crate::error::InterpretError;

/// Compile vs. immediate mode, switched by the `[`/`]` fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compile,
    Immediate,
}

/// One token of the stream C6 produces and C7 consumes. Tag numbers are
/// the wire values from §4.6's table; decoding is a single switch on the
/// tag byte, never a class hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Tag 0: call a dictionary word by ordinal.
    WordCall(u16),
    /// Tag 1: push a dictionary word's address by ordinal.
    WordAddress(u16),
    /// Tag 2: a bare numeric literal.
    Number(u16),
    /// Tag 3: a string literal that compiles its own skip-over preamble.
    String(String),
    /// Tag 4: one opcode byte, return bit included.
    Mnemonic(u8),
    /// Tag 5: an ordinal into the built-in table (§9c: only `;` today).
    Builtin(u8),
    /// Tag 6: a number embedded directly into the current definition body.
    LitNumber(u16),
    /// Tag 7: a string embedded directly, with no skip-over preamble.
    LitString(String),
    /// Tag 8: begin a new dictionary entry.
    Definition(String),
    /// Tag 9: switch compile/immediate mode.
    Mode(Mode),
    /// Tag 10: a `( ... )` comment.
    CommentBraces(String),
    /// Tag 11: a `\ ...` comment, to end of line.
    CommentBackslash(String),
    /// Tag 12: a preserved run of separator characters.
    Whitespace(Vec<u8>),
}

/// Flatten a token stream to its wire form (§6: the `tokens` document
/// field).
#[must_use]
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::new();
    for token in tokens {
        match token {
            Token::WordCall(ord) => encode_u16(&mut out, 0, *ord),
            Token::WordAddress(ord) => encode_u16(&mut out, 1, *ord),
            Token::Number(v) => encode_u16(&mut out, 2, *v),
            Token::String(s) => encode_bytes(&mut out, 3, s.as_bytes()),
            Token::Mnemonic(b) => {
                out.push(4);
                out.push(*b);
            }
            Token::Builtin(i) => {
                out.push(5);
                out.push(*i);
            }
            Token::LitNumber(v) => encode_u16(&mut out, 6, *v),
            Token::LitString(s) => encode_bytes(&mut out, 7, s.as_bytes()),
            Token::Definition(name) => encode_bytes(&mut out, 8, name.as_bytes()),
            Token::Mode(m) => {
                out.push(9);
                out.push(match m {
                    Mode::Compile => 0,
                    Mode::Immediate => 1,
                });
            }
            Token::CommentBraces(s) => encode_bytes(&mut out, 10, s.as_bytes()),
            Token::CommentBackslash(s) => encode_bytes(&mut out, 11, s.as_bytes()),
            Token::Whitespace(bytes) => encode_bytes(&mut out, 12, bytes),
        }
    }
    out
}

/// Parse a flattened token stream back into [`Token`]s.
pub fn decode(bytes: &[u8]) -> Result<Vec<Token>, InterpretError> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let tag = bytes[i];
        i += 1;
        let token = match tag {
            0 => Token::WordCall(read_u16(bytes, &mut i)?),
            1 => Token::WordAddress(read_u16(bytes, &mut i)?),
            2 => Token::Number(read_u16(bytes, &mut i)?),
            3 => Token::String(read_text(bytes, &mut i)?),
            4 => Token::Mnemonic(read_u8(bytes, &mut i)?),
            5 => Token::Builtin(read_u8(bytes, &mut i)?),
            6 => Token::LitNumber(read_u16(bytes, &mut i)?),
            7 => Token::LitString(read_text(bytes, &mut i)?),
            8 => Token::Definition(read_text(bytes, &mut i)?),
            9 => Token::Mode(match read_u8(bytes, &mut i)? {
                0 => Mode::Compile,
                _ => Mode::Immediate,
            }),
            10 => Token::CommentBraces(read_text(bytes, &mut i)?),
            11 => Token::CommentBackslash(read_text(bytes, &mut i)?),
            12 => Token::Whitespace(read_bytes(bytes, &mut i)?.to_vec()),
            other => return Err(InterpretError::UnknownTag(other)),
        };
        tokens.push(token);
    }
    Ok(tokens)
}

fn encode_u16(out: &mut Vec<u8>, tag: u8, value: u16) {
    out.push(tag);
    out.extend_from_slice(&value.to_le_bytes());
}

fn encode_bytes(out: &mut Vec<u8>, tag: u8, bytes: &[u8]) {
    out.push(tag);
    out.push(bytes.len() as u8);
    out.extend_from_slice(bytes);
}

fn read_u8(bytes: &[u8], i: &mut usize) -> Result<u8, InterpretError> {
    let b = *bytes.get(*i).ok_or(InterpretError::TruncatedToken)?;
    *i += 1;
    Ok(b)
}

fn read_u16(bytes: &[u8], i: &mut usize) -> Result<u16, InterpretError> {
    let lo = read_u8(bytes, i)?;
    let hi = read_u8(bytes, i)?;
    Ok(u16::from_le_bytes([lo, hi]))
}

fn read_bytes<'a>(bytes: &'a [u8], i: &mut usize) -> Result<&'a [u8], InterpretError> {
    let len = read_u8(bytes, i)? as usize;
    let slice = bytes
        .get(*i..*i + len)
        .ok_or(InterpretError::TruncatedToken)?;
    *i += len;
    Ok(slice)
}

fn read_text(bytes: &[u8], i: &mut usize) -> Result<String, InterpretError> {
    Ok(String::from_utf8_lossy(read_bytes(bytes, i)?).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_token_kind() {
        let tokens = vec![
            Token::WordCall(3),
            Token::WordAddress(4),
            Token::Number(0x1234),
            Token::String("hi".to_string()),
            Token::Mnemonic(0x81),
            Token::Builtin(0),
            Token::LitNumber(7),
            Token::LitString("yo".to_string()),
            Token::Definition("FOO".to_string()),
            Token::Mode(Mode::Immediate),
            Token::Mode(Mode::Compile),
            Token::CommentBraces("note".to_string()),
            Token::CommentBackslash("line note".to_string()),
            Token::Whitespace(b"  \n".to_vec()),
        ];
        let bytes = encode(&tokens);
        assert_eq!(decode(&bytes).unwrap(), tokens);
    }

    #[test]
    fn truncated_stream_is_reported() {
        assert_eq!(decode(&[0, 1]), Err(InterpretError::TruncatedToken));
    }

    #[test]
    fn unknown_tag_is_reported() {
        assert_eq!(decode(&[200]), Err(InterpretError::UnknownTag(200)));
    }
}
