// emojiscript interpreter library
//
// A small expression language spelled entirely in emoji: a grapheme-aware
// lexer, a Pratt parser and a tree-walking evaluator with closures.

// Public modules
pub mod ast;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod symbols;
pub mod value;

// Re-export commonly used items
pub use ast::{Expression, Program, Statement};
pub use environment::Environment;
pub use error::{EvalError, Span, SyntaxError};
pub use evaluator::Evaluator;
pub use lexer::{Lexer, Token, TokenType};
pub use parser::Parser;
pub use value::Object;

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::{interpret, run, Output, RunOptions};
