//! Assembler/disassembler CLI (§6): `-i` source, `-o` binary, `-d`
//! disassemble a binary input instead of assembling.

use std::path::PathBuf;
use std::process;

struct CliArgs {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    disassemble: bool,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        input: None,
        output: None,
        disassemble: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-i" => {
                i += 1;
                cli.input = args.get(i).map(PathBuf::from);
            }
            "-o" => {
                i += 1;
                cli.output = args.get(i).map(PathBuf::from);
            }
            "-d" => {
                cli.disassemble = true;
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
        eprintln!("missing required -i <input>");
        process::exit(1);
    };

    let bytes = if cli.disassemble {
        match std::fs::read(&input) {
            Ok(bytes) => disassemble_raw(&bytes),
            Err(e) => {
                eprintln!("could not read {}: {e}", input.display());
                process::exit(1);
            }
        }
    } else {
        let source = match std::fs::read_to_string(&input) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("could not read {}: {e}", input.display());
                process::exit(1);
            }
        };
        match prim_asm::assemble_file(&source) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("assembly failed: {e}");
                process::exit(1);
            }
        }
    };

    match cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, &bytes) {
                eprintln!("could not write {}: {e}", path.display());
                process::exit(1);
            }
        }
        None => {
            use std::io::Write as _;
            std::io::stdout().write_all(&bytes).ok();
        }
    }
}

/// `-d` mode has no literal/symbol metadata to work with, so it renders a
/// flat listing (one raw instruction per line) rather than the
/// symbol-aware listing `prim-disasm` produces from a full document.
fn disassemble_raw(bytes: &[u8]) -> Vec<u8> {
    use prim_core::{Bus, Memory};

    let mut mem = Memory::new();
    for (i, b) in bytes.iter().enumerate() {
        mem.write8(i as u16, *b);
    }
    let lines = prim_asm::disassemble(
        &mut mem,
        0,
        bytes.len() as u16,
        &prim_core::LiteralMaps::new(),
        &prim_core::Dictionary::new(),
    );
    prim_asm::render(&lines).into_bytes()
}
