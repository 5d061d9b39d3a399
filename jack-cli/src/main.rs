//! Entrypoint for CLI
use std::{
    env,
    error::Error,
    fs, io,
    path::{Path, PathBuf},
};

use jack::{
    lex::{Lexer, TokenKind},
    prelude::*,
};
use log::{debug, error, info};

static USAGE: &str = r#"
usage: jackc CMD PATH

commands:
    build   Compile a .jack file, or every .jack file in a directory,
            into .vm files next to the sources
    tokens  Print the token stream of a .jack file

examples:
    jackc build Main.jack
    jackc build Pong/
    jackc tokens Main.jack
"#;

const SOURCE_EXT: &str = "jack";
const OUTPUT_EXT: &str = "vm";

fn run_build(path: impl AsRef<Path>) -> JackResult<bool> {
    let sources = find_sources(path.as_ref())?;
    info!("compiling {} source file(s)", sources.len());

    let mut failed = 0;
    for source_path in &sources {
        // Each unit gets its own compiler, a failure doesn't affect the others.
        match compile_file(source_path) {
            Ok(output_path) => info!("{} -> {}", source_path.display(), output_path.display()),
            Err(err) => {
                error!("{}: {}", source_path.display(), err);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        error!("{} of {} source file(s) failed", failed, sources.len());
    }

    Ok(failed == 0)
}

/// Compile one file, only writing the output when compilation succeeds.
fn compile_file(source_path: &Path) -> JackResult<PathBuf> {
    let source_code = fs::read_to_string(source_path)?;
    let program = jack::compile(&source_code)?;
    debug!("{} instructions", program.instructions().len());

    let output_path = source_path.with_extension(OUTPUT_EXT);
    fs::write(&output_path, program.to_string())?;

    Ok(output_path)
}

/// Source files of a path that's either a single file or a directory.
///
/// Directories are not searched recursively.
fn find_sources(path: &Path) -> JackResult<Vec<PathBuf>> {
    if path.is_dir() {
        let mut sources = vec![];
        for entry in fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.is_file() && is_source(&entry_path) {
                sources.push(entry_path);
            }
        }
        sources.sort();
        Ok(sources)
    } else if is_source(path) {
        Ok(vec![path.to_path_buf()])
    } else {
        let message = format!("{} is not a .{} source file", path.display(), SOURCE_EXT);
        Err(io::Error::new(io::ErrorKind::InvalidInput, message).into())
    }
}

fn is_source(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == SOURCE_EXT)
}

fn run_tokens(path: impl AsRef<Path>) -> JackResult<()> {
    let source_code = fs::read_to_string(path.as_ref())?;
    let lexer = Lexer::new(source_code.as_str());

    println!(" offset | len | token                | fragment ");
    for result in lexer {
        let token = result?;
        let offset = token.span.index;
        let len = token.span.size;
        let kind = format!("{:?}", token.kind); // cannot format debug print {:?} into columns

        match token.kind {
            TokenKind::EOF => println!("{offset:7}:{len: <3} {kind: <20}"),
            _ => {
                let fragment = token.span.fragment(source_code.as_str());
                println!("{offset:7}:{len: <3} {kind: <20} \"{fragment}\"")
            }
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    match parse_args() {
        Some(Cmd::Build { path }) => {
            if !run_build(path)? {
                std::process::exit(1)
            }
        }
        Some(Cmd::Tokens { path }) => run_tokens(path)?,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    match args.next()?.as_str() {
        "build" => Some(Cmd::Build { path: args.next()? }),
        "tokens" => Some(Cmd::Tokens { path: args.next()? }),
        _ => None,
    }
}

fn print_usage() {
    println!("jackc v{}", env!("CARGO_PKG_VERSION"));
    println!("{USAGE}");
}

enum Cmd {
    /// Compile file or directory
    Build { path: String },
    /// Dump tokens
    Tokens { path: String },
}
