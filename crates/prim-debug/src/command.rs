//! The plain-text command grammar (§6): parsing only, no execution — the
//! debugger shell dispatches a parsed [`Command`] against a [`crate::Debugger`].

use prim_core::text::parse_number;

use crate::error::DebugError;

/// One parsed line of debugger input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// No argument lists breakpoints; an argument toggles one by address
    /// or dictionary name.
    Break(Option<String>),
    Reset,
    Run,
    View(u16),
    /// No argument clears the highlight; `(addr, len)` sets it.
    Highlight(Option<(u16, u16)>),
    Read(u16, usize),
    Write(u16, Vec<u8>),
    Uart(String),
    Help,
    /// A mnemonic or number literal, executed/pushed directly (§4.8).
    Direct(String),
}

fn parse_addr(tok: &str) -> Result<u16, DebugError> {
    parse_number(tok).ok_or_else(|| DebugError::BadArgument(format!("not a number: {tok}")))
}

/// Parse one line of debugger input into a [`Command`].
///
/// Returns [`DebugError::EmptyCommand`] for blank/whitespace-only input;
/// the shell should simply ignore that rather than report it.
pub fn parse_command(line: &str) -> Result<Command, DebugError> {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    let head = parts.next().ok_or(DebugError::EmptyCommand)?;

    match head {
        "break" => Ok(Command::Break(parts.next().map(str::to_string))),
        "reset" => Ok(Command::Reset),
        "run" => Ok(Command::Run),
        "view" => {
            let tok = parts
                .next()
                .ok_or_else(|| DebugError::BadArgument("view requires an address".to_string()))?;
            Ok(Command::View(parse_addr(tok)?))
        }
        "hl" => match parts.next() {
            None => Ok(Command::Highlight(None)),
            Some(addr_tok) => {
                let addr = parse_addr(addr_tok)?;
                let len = match parts.next() {
                    Some(len_tok) => parse_addr(len_tok)?,
                    None => 1,
                };
                Ok(Command::Highlight(Some((addr, len))))
            }
        },
        "r" => {
            let tok = parts
                .next()
                .ok_or_else(|| DebugError::BadArgument("r requires an address".to_string()))?;
            let addr = parse_addr(tok)?;
            let len = match parts.next() {
                Some(len_tok) => parse_addr(len_tok)? as usize,
                None => 1,
            };
            Ok(Command::Read(addr, len))
        }
        "w" => {
            let tok = parts
                .next()
                .ok_or_else(|| DebugError::BadArgument("w requires an address".to_string()))?;
            let addr = parse_addr(tok)?;
            let bytes = parts
                .map(|t| parse_addr(t).map(|v| v as u8))
                .collect::<Result<Vec<u8>, DebugError>>()?;
            if bytes.is_empty() {
                return Err(DebugError::BadArgument(
                    "w requires at least one byte".to_string(),
                ));
            }
            Ok(Command::Write(addr, bytes))
        }
        "uart" => {
            let rest = line.get(head.len()..).unwrap_or("").trim_start();
            Ok(Command::Uart(rest.to_string()))
        }
        "help" => Ok(Command::Help),
        token => Ok(Command::Direct(token.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_with_no_argument_lists() {
        assert_eq!(parse_command("break"), Ok(Command::Break(None)));
    }

    #[test]
    fn break_with_name_or_address() {
        assert_eq!(
            parse_command("break MAIN"),
            Ok(Command::Break(Some("MAIN".to_string())))
        );
        assert_eq!(
            parse_command("break $100"),
            Ok(Command::Break(Some("$100".to_string())))
        );
    }

    #[test]
    fn reset_and_run_and_help_take_no_arguments() {
        assert_eq!(parse_command("reset"), Ok(Command::Reset));
        assert_eq!(parse_command("run"), Ok(Command::Run));
        assert_eq!(parse_command("help"), Ok(Command::Help));
    }

    #[test]
    fn view_requires_an_address() {
        assert_eq!(parse_command("view $1A00"), Ok(Command::View(0x1A00)));
        assert!(parse_command("view").is_err());
    }

    #[test]
    fn highlight_defaults_len_to_one_and_clears_on_no_args() {
        assert_eq!(parse_command("hl"), Ok(Command::Highlight(None)));
        assert_eq!(
            parse_command("hl $10"),
            Ok(Command::Highlight(Some((0x10, 1))))
        );
        assert_eq!(
            parse_command("hl $10 4"),
            Ok(Command::Highlight(Some((0x10, 4))))
        );
    }

    #[test]
    fn read_defaults_len_to_one() {
        assert_eq!(parse_command("r $10"), Ok(Command::Read(0x10, 1)));
        assert_eq!(parse_command("r $10 8"), Ok(Command::Read(0x10, 8)));
    }

    #[test]
    fn write_collects_every_trailing_byte() {
        assert_eq!(
            parse_command("w $10 $1A $1B"),
            Ok(Command::Write(0x10, vec![0x1A, 0x1B]))
        );
        assert!(parse_command("w $10").is_err());
    }

    #[test]
    fn uart_keeps_the_remainder_of_the_line_verbatim() {
        assert_eq!(
            parse_command("uart hello world"),
            Ok(Command::Uart("hello world".to_string()))
        );
    }

    #[test]
    fn unrecognized_token_is_direct_execution() {
        assert_eq!(parse_command("ADD"), Ok(Command::Direct("ADD".to_string())));
        assert_eq!(parse_command("$1A"), Ok(Command::Direct("$1A".to_string())));
    }

    #[test]
    fn blank_line_is_an_empty_command() {
        assert_eq!(parse_command(""), Err(DebugError::EmptyCommand));
        assert_eq!(parse_command("   "), Err(DebugError::EmptyCommand));
    }
}
