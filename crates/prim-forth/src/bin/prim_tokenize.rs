//! Tokenizer CLI (§6): `-i` source, `-it` input TOML for a cumulative
//! dictionary, `-o` output TOML.

use std::path::PathBuf;
use std::process;

use prim_core::{Dictionary, Memory};
use prim_format::{Document, TYPE_TOKENIZER};

struct CliArgs {
    input: Option<PathBuf>,
    input_toml: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        input: None,
        input_toml: None,
        output: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-i" => {
                i += 1;
                cli.input = args.get(i).map(PathBuf::from);
            }
            "-it" => {
                i += 1;
                cli.input_toml = args.get(i).map(PathBuf::from);
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
        eprintln!("missing required -i <source file>");
        process::exit(1);
    };

    let source = match std::fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("could not read {}: {e}", input.display());
            process::exit(1);
        }
    };

    // With no prior document, a fresh source starts from the two
    // pre-seeded names every Prim image requires (§4.6).
    let mut dict = Dictionary::seeded();
    if let Some(path) = &cli.input_toml {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("could not read {}: {e}", path.display());
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
        dict = Dictionary::new();
        for name in &doc.symbols {
            dict.register(name.clone());
        }
    }

    let tokens = match prim_forth::tokenize(&source, &mut dict) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("tokenize error: {e}");
            process::exit(1);
        }
    };

    let doc = Document {
        memory: Memory::new().as_bytes().to_vec(),
        symbols: dict.names().to_vec(),
        num_literals: Vec::new(),
        string_literals: Vec::new(),
        tokens: Some(prim_forth::encode(&tokens)),
        doc_type: TYPE_TOKENIZER.to_string(),
        title: input.display().to_string(),
        date: String::new(),
        input_toml: cli.input_toml.map(|p| p.display().to_string()),
    };

    let text = match doc.to_toml() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("could not serialize document: {e}");
            process::exit(1);
        }
    };

    match cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, text) {
                eprintln!("could not write {}: {e}", path.display());
                process::exit(1);
            }
        }
        None => print!("{text}"),
    }
}
