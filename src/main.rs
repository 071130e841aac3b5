use clap::Parser as _;
use emojiscript::evaluator::DEFAULT_MAX_CALL_DEPTH;
use emojiscript::{runner, symbols, RunOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(clap::Parser, Debug)]
#[command(name = "emojiscript", version, about = "An interpreter for a language written in emoji")]
struct Args {
    /// The script file to execute
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Evaluate the given source instead of a file
    #[arg(short, long, value_name = "SOURCE", conflicts_with = "file")]
    eval: Option<String>,

    /// Start in interactive REPL mode
    #[arg(short, long)]
    interactive: bool,

    /// Print the errors, rendered program and result as JSON
    #[arg(long)]
    json: bool,

    /// Print the canonical render of the parsed program
    #[arg(long)]
    ast: bool,

    /// Print the symbol keyboard and exit
    #[arg(long)]
    symbols: bool,

    /// Maximum number of nested function calls
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,
}

fn main() {
    let args = Args::parse();

    // EMOJISCRIPT_LOG takes precedence over RUST_LOG; default to warnings only
    let filter = EnvFilter::try_from_env("EMOJISCRIPT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if args.symbols {
        print_symbols();
        return;
    }

    let options = RunOptions {
        json: args.json,
        show_ast: args.ast,
        max_call_depth: args.max_call_depth,
    };

    if args.interactive {
        emojiscript::start_repl(&options);
    } else if let Some(source) = args.eval.as_deref() {
        runner::run(source, Some("<eval>"), &options);
    } else if let Some(path) = args.file.as_deref() {
        run_file(path, &options);
    } else {
        emojiscript::start_repl(&options);
    }
}

fn run_file(path: &Path, options: &RunOptions) {
    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        std::process::exit(1);
    }

    match fs::read_to_string(path) {
        Ok(source) => {
            let filename = path.to_string_lossy();
            runner::run(&source, Some(filename.as_ref()), options);
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn print_symbols() {
    for (section, table) in symbols::keyboard_sections() {
        println!("{}:", section);
        for (name, symbol) in table.entries() {
            println!("  {}  {}", symbol, name);
        }
    }
}
