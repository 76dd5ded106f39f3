//! tagmend - parse, repair and re-serialize messy markup
//!
//! Usage: tagmend [OPTIONS] <file|->

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use tagmend_parser::MarkupParser;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut show_tree = false;
    let mut strip_whitespace = false;
    let mut line_breaks = false;
    let mut input_path: Option<&str> = None;

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage(&args[0]);
                return ExitCode::SUCCESS;
            }
            "--version" | "-V" => {
                println!("tagmend {}", VERSION);
                return ExitCode::SUCCESS;
            }
            "--tree" => show_tree = true,
            "--strip-whitespace" => strip_whitespace = true,
            "--line-breaks" => line_breaks = true,
            path if input_path.is_none() => input_path = Some(path),
            extra => {
                eprintln!("Unexpected argument: {}", extra);
                print_usage(&args[0]);
                return ExitCode::FAILURE;
            }
        }
    }

    let input_path = match input_path {
        Some(path) => path,
        None => {
            print_usage(&args[0]);
            return ExitCode::FAILURE;
        }
    };

    let input = match read_input(input_path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path, e);
            return ExitCode::FAILURE;
        }
    };

    log::debug!("parsing {} bytes from {}", input.len(), input_path);

    let tree = MarkupParser::new()
        .preserve_whitespace(!strip_whitespace)
        .add_line_breaks(line_breaks)
        .parse(&input);

    log::debug!("built {} nodes, {} roots", tree.len(), tree.roots().len());

    if show_tree {
        print!("{}", tree.pretty_print());
    } else {
        print!("{}", tree.markup());
    }

    ExitCode::SUCCESS
}

fn read_input(path: &str) -> io::Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(path)
    }
}

fn print_usage(program: &str) {
    println!("tagmend {} - parse, repair and re-serialize markup", VERSION);
    println!();
    println!("Usage: {} [OPTIONS] <file|->", program);
    println!();
    println!("Options:");
    println!("  --tree              Print an indented tree dump instead of markup");
    println!("  --strip-whitespace  Drop whitespace-only text runs");
    println!("  --line-breaks       Emit CRLF after tags when serializing");
    println!("  -h, --help          Show this help");
    println!("  -V, --version       Show version");
}
