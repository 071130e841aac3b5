use crate::evaluator::Evaluator;
use crate::lexer::{Lexer, TokenType};
use crate::runner::{self, RunOptions};
use std::io::{self, BufRead, Write};
use tracing::debug;

const PROMPT: &str = "🤖 ";
const CONTINUATION_PROMPT: &str = "⋯  ";

enum Command {
    Quit,
    Bindings,
    Reset,
}

impl Command {
    fn parse(line: &str) -> Option<Command> {
        match line {
            "exit" | "quit" | ":exit" | ":quit" => Some(Command::Quit),
            ":env" => Some(Command::Bindings),
            ":reset" => Some(Command::Reset),
            _ => None,
        }
    }
}

/// Interactive session over one [`Evaluator`]. Unlike [`runner::interpret`],
/// bindings made by one entry stay visible to the next. An entry that leaves a
/// block or call open keeps reading lines until it is closed.
pub fn start(options: &RunOptions) {
    println!("emojiscript v{}", env!("CARGO_PKG_VERSION"));
    println!(":env lists bindings, :reset clears them, :exit quits");
    println!();

    let new_evaluator = || Evaluator::new().with_max_call_depth(options.max_call_depth);
    let mut evaluator = new_evaluator();
    let mut entry = String::new();
    let mut lines = io::stdin().lock().lines();

    loop {
        print!("{}", if entry.is_empty() { PROMPT } else { CONTINUATION_PROMPT });
        if io::stdout().flush().is_err() {
            break;
        }

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(error)) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
            None => {
                println!();
                break;
            }
        };

        if entry.is_empty() {
            match Command::parse(line.trim()) {
                Some(Command::Quit) => break,
                Some(Command::Bindings) => {
                    print_bindings(&evaluator);
                    continue;
                }
                Some(Command::Reset) => {
                    // Dropping the old evaluator frees its closures.
                    evaluator = new_evaluator();
                    continue;
                }
                None => {}
            }
        }

        entry.push_str(&line);
        entry.push('\n');
        if needs_more_input(&entry) {
            continue;
        }

        let source = std::mem::take(&mut entry);
        if source.trim().is_empty() {
            continue;
        }
        let outcome = runner::execute(&source, &mut evaluator);
        runner::report(&source, None, &outcome, options);
    }

    debug!(
        bindings = evaluator.environment().borrow().entries().len(),
        "session ended"
    );
}

fn print_bindings(evaluator: &Evaluator) {
    let environment = evaluator.environment();
    let entries = environment.borrow().entries();
    if entries.is_empty() {
        println!("(no bindings)");
    }
    for (name, value) in entries {
        println!("{} ➡️ {}", name, value);
    }
}

/// Whether `source` still has a block or call group open. Surplus closers
/// count as complete so the parser can report them.
pub fn needs_more_input(source: &str) -> bool {
    let mut blocks = 0i64;
    let mut calls = 0i64;

    for token in Lexer::new(source) {
        match token.token_type {
            TokenType::BlockStart => blocks += 1,
            TokenType::BlockEnd => blocks -= 1,
            TokenType::CallStart => calls += 1,
            TokenType::CallEnd => calls -= 1,
            _ => {}
        }
    }
    blocks > 0 || calls > 0
}
