//! Token interpreter CLI (§6): `-i` input TOML with tokens, `-o` output
//! TOML with the resulting memory image.

use std::path::PathBuf;
use std::process;

use prim_format::{Document, TYPE_TOKENFORTH};
use prim_forth::{decode, TokenInterpreter};

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

    let Some(token_bytes) = &doc.tokens else {
        eprintln!("input document has no tokens field");
        process::exit(1);
    };

    let tokens = match decode(token_bytes) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("token decode error: {e}");
            process::exit(1);
        }
    };

    let mut interp = TokenInterpreter::new();
    if let Err(e) = interp.interpret(&tokens) {
        eprintln!("interpret error: {e}");
        process::exit(1);
    }

    let mut out = Document {
        memory: Vec::new(),
        symbols: interp.dictionary.names().to_vec(),
        num_literals: interp.literals.numbers.iter().copied().collect(),
        string_literals: interp.literals.strings.iter().copied().collect(),
        tokens: None,
        doc_type: TYPE_TOKENFORTH.to_string(),
        title: doc.title.clone(),
        date: doc.date.clone(),
        input_toml: Some(input.display().to_string()),
    };
    out.set_memory(&interp.memory);

    let rendered = match out.to_toml() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("could not serialize document: {e}");
            process::exit(1);
        }
    };

    match cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, rendered) {
                eprintln!("could not write {}: {e}", path.display());
                process::exit(1);
            }
        }
        None => print!("{rendered}"),
    }
}
