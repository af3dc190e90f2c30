//! Forth-like text to a typed token stream (§4.6).

use prim_core::text::{parse_number, split_return_suffix};
use prim_core::{Dictionary, Op};

use crate::error::TokenizeError;
use crate::token::{Mode, Token};

/// Split `source` on runs of characters with code point below 33,
/// preserving the separator runs themselves as fragments so the stream
/// round-trips back to text.
fn split_fragments(source: &str) -> Vec<String> {
    let mut frags = Vec::new();
    let mut current = String::new();
    let mut current_is_ws: Option<bool> = None;

    for ch in source.chars() {
        let is_ws = (ch as u32) < 33;
        match current_is_ws {
            Some(prev) if prev == is_ws => current.push(ch),
            _ => {
                if !current.is_empty() {
                    frags.push(std::mem::take(&mut current));
                }
                current.push(ch);
                current_is_ws = Some(is_ws);
            }
        }
    }
    if !current.is_empty() {
        frags.push(current);
    }
    frags
}

/// A fragment after the comment/string merge passes: either ordinary
/// text or one already-classified multi-fragment span.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Frag {
    Plain(String),
    CommentBackslash(String),
    CommentBraces(String),
    StringLiteral(String),
}

impl Frag {
    fn text(&self) -> &str {
        match self {
            Self::Plain(s)
            | Self::CommentBackslash(s)
            | Self::CommentBraces(s)
            | Self::StringLiteral(s) => s,
        }
    }
}

fn is_newline_fragment(fragment: &str) -> bool {
    fragment.contains('\n')
}

/// Pass 1 (§4.6): join `\` fragments up to (not including) the next
/// newline fragment into one backslash comment; join a `(` fragment
/// through its matching `)` fragment into one braces comment. A single
/// forward scan, no repeated list searches (§9).
fn merge_comments(raw: Vec<String>) -> Vec<Frag> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == "\\" {
            let mut buf = String::new();
            let mut j = i;
            while j < raw.len() && !is_newline_fragment(&raw[j]) {
                buf.push_str(&raw[j]);
                j += 1;
            }
            out.push(Frag::CommentBackslash(buf));
            i = j;
            continue;
        }
        if raw[i] == "(" {
            if let Some(offset) = raw[i..].iter().position(|f| f == ")") {
                let close = i + offset;
                let buf = raw[i..=close].concat();
                out.push(Frag::CommentBraces(buf));
                i = close + 1;
                continue;
            }
        }
        out.push(Frag::Plain(raw[i].clone()));
        i += 1;
    }
    out
}

/// Pass 2 (§4.6): any fragment starting with `"` begins a string literal
/// that swallows fragments (including whitespace) up to and including
/// one ending with `"`.
fn merge_strings(frags: Vec<Frag>) -> Result<Vec<Frag>, TokenizeError> {
    let mut out = Vec::with_capacity(frags.len());
    let mut i = 0;
    while i < frags.len() {
        if frags[i].text().starts_with('"') {
            let mut buf = String::new();
            let mut j = i;
            loop {
                if j >= frags.len() {
                    return Err(TokenizeError::UnterminatedString);
                }
                buf.push_str(frags[j].text());
                if frags[j].text().ends_with('"') && (j > i || buf.chars().count() > 1) {
                    break;
                }
                j += 1;
            }
            out.push(Frag::StringLiteral(buf));
            i = j + 1;
            continue;
        }
        out.push(frags[i].clone());
        i += 1;
    }
    Ok(out)
}

/// Turn source text into a token stream, using and extending `dict` as
/// `DEFINITION`/word-reference fragments are seen (§9: the dictionary is
/// the shared, append-only table both phases reference by ordinal).
pub fn tokenize(source: &str, dict: &mut Dictionary) -> Result<Vec<Token>, TokenizeError> {
    let raw = split_fragments(source);
    let commented = merge_comments(raw);
    let fragments = merge_strings(commented)?;

    let mut tokens = Vec::with_capacity(fragments.len());
    let mut mode = Mode::Compile;
    for frag in &fragments {
        let token = classify(frag, dict, mode)?;
        if let Token::Mode(m) = token {
            mode = m;
        }
        tokens.push(token);
    }
    Ok(tokens)
}

fn classify(frag: &Frag, dict: &mut Dictionary, mode: Mode) -> Result<Token, TokenizeError> {
    match frag {
        Frag::CommentBackslash(s) => Ok(Token::CommentBackslash(s.clone())),
        Frag::CommentBraces(s) => Ok(Token::CommentBraces(s.clone())),
        Frag::StringLiteral(s) => {
            if mode == Mode::Immediate {
                return Err(TokenizeError::StringInImmediateMode(s.clone()));
            }
            Ok(Token::String(strip_quotes(s)))
        }
        Frag::Plain(text) => classify_plain(text, dict, mode),
    }
}

fn classify_plain(text: &str, dict: &mut Dictionary, mode: Mode) -> Result<Token, TokenizeError> {
    if text.chars().all(|c| (c as u32) < 33) {
        return Ok(Token::Whitespace(text.as_bytes().to_vec()));
    }

    // Rule 1: mode switches.
    if text == "[" {
        return Ok(Token::Mode(Mode::Immediate));
    }
    if text == "]" {
        return Ok(Token::Mode(Mode::Compile));
    }

    // Rule 2: definitions.
    if let Some(name) = text.strip_prefix(':') {
        if mode == Mode::Immediate {
            return Err(TokenizeError::DefinitionInImmediateMode(text.to_string()));
        }
        dict.register(name);
        return Ok(Token::Definition(name.to_string()));
    }

    // Rule 3: mnemonics (uppercase match, `.RET` suffix allowed).
    let (base, with_return) = split_return_suffix(text);
    if let Some(op) = Op::from_mnemonic(base) {
        return Ok(Token::Mnemonic(op.encode(with_return)));
    }

    // Rule 4: the one built-in, `;` => NOP.RET.
    if text == ";" {
        return Ok(Token::Builtin(0));
    }

    // Rule 5: literals into the current definition body.
    if let Some(rest) = text.strip_prefix('#') {
        if mode == Mode::Immediate {
            return Err(TokenizeError::LiteralInImmediateMode(text.to_string()));
        }
        if let Some(quoted) = rest.strip_prefix('"') {
            return Ok(Token::LitString(strip_quotes(quoted)));
        }
        if let Some(ordinal) = dict.ordinal_of(rest) {
            return Ok(Token::WordAddress(ordinal));
        }
        return parse_number(rest)
            .map(Token::LitNumber)
            .ok_or_else(|| TokenizeError::BadNumber(text.to_string()));
    }

    // Rule 6: `'name` => the named entry's address.
    if text.starts_with('\'') && text.chars().count() > 2 {
        let name = &text[1..];
        return dict
            .ordinal_of(name)
            .map(Token::WordAddress)
            .ok_or_else(|| TokenizeError::UnknownWord(text.to_string()));
    }

    // Rule 9: a known name, else a number, else fatal.
    if let Some(ordinal) = dict.ordinal_of(text) {
        return Ok(Token::WordCall(ordinal));
    }
    parse_number(text)
        .map(Token::Number)
        .ok_or_else(|| TokenizeError::UnknownWord(text.to_string()))
}

fn strip_quotes(text: &str) -> String {
    let inner = text.strip_prefix('"').unwrap_or(text);
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    inner.to_string()
}
