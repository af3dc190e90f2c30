//! Debugger shell (§6): `-i` TOML document, `-u` UART-input file queued
//! before the session starts. Text commands (§6 grammar) are read a line
//! at a time; the right/down arrows additionally step/step-over without
//! needing Enter. `ESC` or ctrl-D exits.

use std::io::Write;
use std::path::PathBuf;
use std::process;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use prim_debug::{parse_command, Command, DebugError, Debugger, DirectOutcome};
use prim_format::Document;

struct CliArgs {
    input: Option<PathBuf>,
    uart_input: Option<PathBuf>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        input: None,
        uart_input: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-i" => {
                i += 1;
                cli.input = args.get(i).map(PathBuf::from);
            }
            "-u" => {
                i += 1;
                cli.uart_input = args.get(i).map(PathBuf::from);
            }
            other => {
                eprintln!("unrecognized argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }
    cli
}

fn main() {
    let cli = parse_args();
    let Some(input) = cli.input else {
        eprintln!("missing required -i <document.toml>");
        process::exit(1);
    };

    let text = match std::fs::read_to_string(&input) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("could not read {}: {e}", input.display());
            process::exit(1);
        }
    };

    let doc = match Document::from_toml(&text) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("could not parse document: {e}");
            process::exit(1);
        }
    };

    let mut dbg = match Debugger::from_document(&doc) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("malformed document: {e}");
            process::exit(1);
        }
    };

    if let Some(path) = &cli.uart_input {
        match std::fs::read_to_string(path) {
            Ok(contents) => dbg.uart_inject(&contents),
            Err(e) => {
                eprintln!("could not read {}: {e}", path.display());
                process::exit(1);
            }
        }
    }

    if let Err(e) = run_shell(&mut dbg) {
        eprintln!("debugger error: {e}");
        process::exit(1);
    }
}

fn print_status(dbg: &Debugger) {
    println!("{}", dbg.cpu.trace_line());
}

/// The interactive read-dispatch loop. Raw mode is needed so the arrow
/// keys (§6: "right = step, down = step-over") can be read without the
/// user pressing Enter; ordinary commands are still built up a line at a
/// time and dispatched on Enter.
fn run_shell(dbg: &mut Debugger) -> std::io::Result<()> {
    println!("prim-debug — {}", help_text());
    print_status(dbg);

    enable_raw_mode()?;
    let result = shell_loop(dbg);
    disable_raw_mode()?;
    result
}

fn shell_loop(dbg: &mut Debugger) -> std::io::Result<()> {
    let mut line = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Esc => return Ok(()),
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
            KeyCode::Right => {
                let byte = dbg.step();
                print!("\r\nstep: opcode ${byte:02X}\r\n");
                print_status(dbg);
            }
            KeyCode::Down => {
                let outcome = dbg.step_over(|_| should_interrupt());
                print!("\r\nstep-over: {outcome:?}\r\n");
                print_status(dbg);
            }
            KeyCode::Enter => {
                print!("\r\n");
                let submitted = std::mem::take(&mut line);
                dispatch_line(dbg, &submitted);
            }
            KeyCode::Backspace => {
                line.pop();
                print!("\u{8} \u{8}");
            }
            KeyCode::Char(c) => {
                line.push(c);
                print!("{c}");
            }
            _ => {}
        }
        std::io::stdout().flush()?;
    }
}

/// Polled once per instruction during `run`/step-over so a keypress can
/// interrupt a runaway program (§5: "yields between steps only to check
/// for a keypress").
fn should_interrupt() -> bool {
    matches!(event::poll(std::time::Duration::from_millis(0)), Ok(true))
}

fn dispatch_line(dbg: &mut Debugger, line: &str) {
    let command = match parse_command(line) {
        Ok(c) => c,
        Err(DebugError::EmptyCommand) => return,
        Err(e) => {
            print!("error: {e}\r\n");
            return;
        }
    };

    match command {
        Command::Break(None) => {
            let points: Vec<String> = dbg.breakpoints().iter().map(|a| format!("${a:04X}")).collect();
            print!("breakpoints: {}\r\n", points.join(", "));
        }
        Command::Break(Some(token)) => match dbg.resolve_target(&token) {
            Ok(addr) => {
                let now_set = dbg.toggle_breakpoint(addr);
                print!("breakpoint ${addr:04X} {}\r\n", if now_set { "set" } else { "cleared" });
            }
            Err(e) => print!("error: {e}\r\n"),
        },
        Command::Reset => {
            dbg.reset();
            print!("reset\r\n");
        }
        Command::Run => {
            let reason = dbg.run_until(|_| should_interrupt());
            print!("stopped: {reason:?}\r\n");
        }
        Command::View(addr) => {
            dbg.set_view_origin(addr);
            print_memory_view(dbg);
        }
        Command::Highlight(range) => {
            dbg.set_highlight(range);
            print_memory_view(dbg);
        }
        Command::Read(addr, len) => {
            let bytes = dbg.read(addr, len);
            let rendered: Vec<String> = bytes.iter().map(|b| format!("{b:02X}")).collect();
            print!("${addr:04X}: {}\r\n", rendered.join(" "));
        }
        Command::Write(addr, bytes) => {
            dbg.write(addr, &bytes);
            print!("wrote {} byte(s) at ${addr:04X}\r\n", bytes.len());
        }
        Command::Uart(text) => {
            dbg.uart_inject(&text);
            print!("queued {} byte(s) of UART input\r\n", text.len());
        }
        Command::Help => print!("{}\r\n", help_text()),
        Command::Direct(token) => match dbg.execute_direct(&token) {
            Ok(DirectOutcome::Executed(op)) => print!("executed {}\r\n", op.mnemonic()),
            Ok(DirectOutcome::Pushed(value)) => print!("pushed ${value:04X}\r\n"),
            Err(e) => print!("error: {e}\r\n"),
        },
    }
    print_status(dbg);
}

/// A simple hex dump of 8 bytes per row starting at the view origin,
/// marking any byte inside the current highlight range.
fn print_memory_view(dbg: &Debugger) {
    const ROWS: u16 = 8;
    const COLS: u16 = 8;
    let origin = dbg.view_origin();
    for row in 0..ROWS {
        let base = origin.wrapping_add(row * COLS);
        let bytes = dbg.read(base, COLS as usize);
        let mut line = format!("{base:04X}: ");
        for (i, b) in bytes.iter().enumerate() {
            let addr = base.wrapping_add(i as u16);
            let marked = dbg
                .highlight()
                .is_some_and(|(start, len)| addr.wrapping_sub(start) < len);
            if marked {
                line.push_str(&format!("[{b:02X}]"));
            } else {
                line.push_str(&format!(" {b:02X} "));
            }
        }
        print!("{line}\r\n");
    }
}

fn help_text() -> &'static str {
    "break [addr|name], reset, run, view <hex-addr>, hl [addr [len]], \
     r <addr> [len], w <addr> <byte>..., uart <text>, help, \
     or a mnemonic/hex number for direct push/execute. \
     Right = step, Down = step-over, Esc/ctrl-D = quit."
}

