use crate::ast::Program;
use crate::error::SyntaxError;
use crate::evaluator::{Evaluator, DEFAULT_MAX_CALL_DEPTH};
use crate::lexer::Lexer;
use crate::parser::Parser;
use serde::Serialize;
use tracing::warn;

/// What the host gets back from one lex → parse → evaluate cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Output {
    pub errors: Vec<String>,
    pub program: String,
    /// `None` when syntax errors kept the evaluator from running.
    pub result: Option<String>,
}

/// Structured form of [`Output`], kept around for diagnostics rendering.
#[derive(Debug)]
pub struct Outcome {
    pub program: Program,
    pub syntax_errors: Vec<SyntaxError>,
    pub result: Option<String>,
}

impl Outcome {
    pub fn output(&self) -> Output {
        Output {
            errors: self
                .syntax_errors
                .iter()
                .map(|error| error.message.clone())
                .collect(),
            program: self.program.to_string(),
            result: self.result.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub json: bool,
    pub show_ast: bool,
    pub max_call_depth: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            json: false,
            show_ast: false,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Lexes, parses and, if parsing was clean, evaluates `source` against the
/// evaluator's environment.
pub fn execute(source: &str, evaluator: &mut Evaluator) -> Outcome {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();
    let syntax_errors = parser.errors().to_vec();

    let result = if syntax_errors.is_empty() {
        let display = match evaluator.evaluate_program(&program) {
            Ok(value) => value.to_string(),
            Err(error) => {
                warn!(%error, "evaluation aborted");
                format!("internal error: {}", error)
            }
        };
        Some(display)
    } else {
        None
    };

    Outcome {
        program,
        syntax_errors,
        result,
    }
}

/// One stateless cycle with a fresh environment.
pub fn interpret(source: &str) -> Output {
    execute(source, &mut Evaluator::new()).output()
}

pub fn run(source: &str, filename: Option<&str>, options: &RunOptions) {
    let mut evaluator = Evaluator::new().with_max_call_depth(options.max_call_depth);
    let outcome = execute(source, &mut evaluator);
    report(source, filename, &outcome, options);
}

pub fn report(source: &str, filename: Option<&str>, outcome: &Outcome, options: &RunOptions) {
    if options.json {
        match serde_json::to_string_pretty(&outcome.output()) {
            Ok(json) => println!("{}", json),
            Err(error) => eprintln!("Error serializing output: {}", error),
        }
        return;
    }

    for error in &outcome.syntax_errors {
        error.report(source, filename);
    }

    if options.show_ast {
        println!("{}", outcome.program);
    }

    if let Some(ref result) = outcome.result {
        println!("{}", result);
    }
}
