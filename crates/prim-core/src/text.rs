//! Small text helpers shared by the assembler and the tokenizer: number
//! literal parsing and the `.RET` suffix convention (§4.4, §4.6).

/// Parse a number literal: optional leading sign, then `$hex`, `0xhex`,
/// or decimal.
#[must_use]
pub fn parse_number(token: &str) -> Option<u16> {
    let (negative, rest) = match *token.as_bytes().first()? {
        b'+' => (false, &token[1..]),
        b'-' => (true, &token[1..]),
        _ => (false, token),
    };
    let magnitude: u32 = if let Some(hex) = rest.strip_prefix('$') {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        rest.parse().ok()?
    };
    let value = u16::try_from(magnitude).ok()?;
    Some(if negative { value.wrapping_neg() } else { value })
}

/// Strip a trailing `.RET` suffix (case-insensitive, per the worked
/// examples in §8 which use `2.ret`), returning the base token and
/// whether the suffix was present.
#[must_use]
pub fn split_return_suffix(token: &str) -> (&str, bool) {
    const SUFFIX_LEN: usize = 4; // ".RET"
    if token.len() > SUFFIX_LEN {
        let (head, tail) = token.split_at(token.len() - SUFFIX_LEN);
        if tail.eq_ignore_ascii_case(".ret") {
            return (head, true);
        }
    }
    (token, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_prefixes_agree_with_decimal() {
        assert_eq!(parse_number("$1A"), Some(26));
        assert_eq!(parse_number("0x1A"), Some(26));
        assert_eq!(parse_number("26"), Some(26));
    }

    #[test]
    fn leading_sign_is_honored() {
        assert_eq!(parse_number("-1"), Some(0xFFFF));
        assert_eq!(parse_number("+5"), Some(5));
    }

    #[test]
    fn suffix_strip_is_case_insensitive() {
        assert_eq!(split_return_suffix("NOP.RET"), ("NOP", true));
        assert_eq!(split_return_suffix("2.ret"), ("2", true));
        assert_eq!(split_return_suffix("NOP"), ("NOP", false));
    }
}
