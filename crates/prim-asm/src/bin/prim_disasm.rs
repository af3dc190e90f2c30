//! Disassembler CLI (§6): `-i` TOML document, `-o` listing.

use std::path::PathBuf;
use std::process;

use prim_core::{Bus, CODE_START, Dictionary, LiteralMaps, HERE};
use prim_format::Document;

struct CliArgs {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        input: None,
        output: None,
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

    let mut mem = match doc.to_memory() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("malformed document: {e}");
            process::exit(1);
        }
    };

    let literals = LiteralMaps {
        numbers: doc.num_literals.iter().copied().collect(),
        strings: doc.string_literals.iter().copied().collect(),
    };
    let mut dict = Dictionary::new();
    for name in &doc.symbols {
        dict.register(name.clone());
    }

    let end = mem.read16(HERE);
    let lines = prim_asm::disassemble(&mut mem, CODE_START, end, &literals, &dict);
    let listing = prim_asm::render(&lines);

    match cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, listing) {
                eprintln!("could not write {}: {e}", path.display());
                process::exit(1);
            }
        }
        None => print!("{listing}"),
    }
}
