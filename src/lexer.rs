use crate::error::Span;
use crate::symbols::{self, DATA_STRUCTURES, DELIMITERS, KEYWORDS, OPERATORS};
use std::fmt;
use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Literals
    Identifier,
    Number,

    // Keywords
    True,
    False,
    Let,
    If,
    Else,
    Function,
    While,
    For,
    Break,
    Continue,
    Return,

    // Delimiters
    DecimalSeparator,
    ArgumentSeparator,
    EndOfLine,
    BlockStart,
    BlockEnd,
    CallStart,
    CallEnd,

    // Operators
    Plus,
    Minus,
    Times,
    Division,
    Bang,
    And,
    Or,
    Eq,
    Gt,
    Lt,
    Assign,
    Lookup,

    // Data structures
    List,
    Hash,
    Key,

    // Special
    EndOfFile,
    Illegal,
}

impl TokenType {
    /// The internal category label, as used by the symbol tables.
    pub fn name(self) -> &'static str {
        match self {
            TokenType::Identifier => "IDENTIFIER",
            TokenType::Number => "NUMBER",
            TokenType::True => "TRUE",
            TokenType::False => "FALSE",
            TokenType::Let => "LET",
            TokenType::If => "IF",
            TokenType::Else => "ELSE",
            TokenType::Function => "FUNCTION",
            TokenType::While => "WHILE",
            TokenType::For => "FOR",
            TokenType::Break => "BREAK",
            TokenType::Continue => "CONTINUE",
            TokenType::Return => "RETURN",
            TokenType::DecimalSeparator => "DECIMAL_SEPARATOR",
            TokenType::ArgumentSeparator => "ARGUMENT_SEPARATOR",
            TokenType::EndOfLine => "END_OF_LINE",
            TokenType::BlockStart => "BLOCK_START",
            TokenType::BlockEnd => "BLOCK_END",
            TokenType::CallStart => "CALL_START",
            TokenType::CallEnd => "CALL_END",
            TokenType::Plus => "PLUS",
            TokenType::Minus => "MINUS",
            TokenType::Times => "TIMES",
            TokenType::Division => "DIVISION",
            TokenType::Bang => "BANG",
            TokenType::And => "AND",
            TokenType::Or => "OR",
            TokenType::Eq => "EQ",
            TokenType::Gt => "GT",
            TokenType::Lt => "LT",
            TokenType::Assign => "ASSIGN",
            TokenType::Lookup => "LOOKUP",
            TokenType::List => "LIST",
            TokenType::Hash => "HASH",
            TokenType::Key => "KEY",
            TokenType::EndOfFile => "END_OF_FILE",
            TokenType::Illegal => "ILLEGAL",
        }
    }

    /// Inverse of [`TokenType::name`] for the single-symbol categories.
    pub fn from_name(name: &str) -> Option<TokenType> {
        let token_type = match name {
            "TRUE" => TokenType::True,
            "FALSE" => TokenType::False,
            "LET" => TokenType::Let,
            "IF" => TokenType::If,
            "ELSE" => TokenType::Else,
            "FUNCTION" => TokenType::Function,
            "WHILE" => TokenType::While,
            "FOR" => TokenType::For,
            "BREAK" => TokenType::Break,
            "CONTINUE" => TokenType::Continue,
            "RETURN" => TokenType::Return,
            "DECIMAL_SEPARATOR" => TokenType::DecimalSeparator,
            "ARGUMENT_SEPARATOR" => TokenType::ArgumentSeparator,
            "END_OF_LINE" => TokenType::EndOfLine,
            "BLOCK_START" => TokenType::BlockStart,
            "BLOCK_END" => TokenType::BlockEnd,
            "CALL_START" => TokenType::CallStart,
            "CALL_END" => TokenType::CallEnd,
            "PLUS" => TokenType::Plus,
            "MINUS" => TokenType::Minus,
            "TIMES" => TokenType::Times,
            "DIVISION" => TokenType::Division,
            "BANG" => TokenType::Bang,
            "AND" => TokenType::And,
            "OR" => TokenType::Or,
            "EQ" => TokenType::Eq,
            "GT" => TokenType::Gt,
            "LT" => TokenType::Lt,
            "ASSIGN" => TokenType::Assign,
            "LOOKUP" => TokenType::Lookup,
            "LIST" => TokenType::List,
            "HASH" => TokenType::Hash,
            "KEY" => TokenType::Key,
            _ => return None,
        };
        Some(token_type)
    }

    /// The emoji spelling of a single-symbol category, if it has one.
    pub fn symbol(self) -> Option<&'static str> {
        let name = self.name();
        KEYWORDS
            .symbol(name)
            .or_else(|| DELIMITERS.symbol(name))
            .or_else(|| OPERATORS.symbol(name))
            .or_else(|| DATA_STRUCTURES.symbol(name))
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.symbol() {
            Some(symbol) => write!(f, "{} ({})", self.name(), symbol),
            None => write!(f, "{}", self.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, literal: String, span: Span) -> Self {
        Self {
            token_type,
            literal,
            span,
        }
    }
}

/// Produces tokens one at a time from input split into grapheme clusters.
///
/// Spans are measured in characters, not bytes or segments, so they line up
/// with what `ariadne` expects when rendering diagnostics.
pub struct Lexer<'a> {
    segments: Vec<&'a str>,
    offsets: Vec<usize>,
    current: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut segments = Vec::new();
        let mut offsets = Vec::new();
        let mut offset = 0;
        for segment in source.graphemes(true) {
            segments.push(segment);
            offsets.push(offset);
            offset += segment.chars().count();
        }
        offsets.push(offset);

        Self {
            segments,
            offsets,
            current: 0,
            finished: false,
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let start = self.current;
        let Some(segment) = self.advance() else {
            return Token::new(
                TokenType::EndOfFile,
                String::new(),
                Span::single(self.offsets[self.current]),
            );
        };

        let token_type = if symbols::is_digit(segment) {
            self.number();
            TokenType::Number
        } else if let Some(token_type) = Self::single_symbol(segment) {
            token_type
        } else if symbols::is_character(segment) {
            self.identifier();
            TokenType::Identifier
        } else {
            TokenType::Illegal
        };

        let token = self.make_token(token_type, start);
        trace!(token_type = token.token_type.name(), literal = %token.literal, "scanned token");
        token
    }

    fn single_symbol(segment: &str) -> Option<TokenType> {
        // Probed in lexing priority order.
        OPERATORS
            .name(segment)
            .or_else(|| DELIMITERS.name(segment))
            .or_else(|| KEYWORDS.name(segment))
            .or_else(|| DATA_STRUCTURES.name(segment))
            .and_then(TokenType::from_name)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(segment) if is_whitespace(segment) => {
                    self.advance();
                }
                Some(segment) if symbols::is_comment(segment) => {
                    // Comment goes until end of line
                    while let Some(segment) = self.advance() {
                        if segment.contains('\n') {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn number(&mut self) {
        // Extra separators are kept; the parser rejects them.
        while let Some(segment) = self.peek() {
            if symbols::is_digit(segment) || symbols::is_decimal_separator(segment) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn identifier(&mut self) {
        while let Some(segment) = self.peek() {
            if symbols::is_character(segment) || symbols::is_digit(segment) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn advance(&mut self) -> Option<&'a str> {
        let segment = self.segments.get(self.current).copied()?;
        self.current += 1;
        Some(segment)
    }

    fn peek(&self) -> Option<&'a str> {
        self.segments.get(self.current).copied()
    }

    fn make_token(&self, token_type: TokenType, start: usize) -> Token {
        let literal = self.segments[start..self.current].concat();
        Token::new(
            token_type,
            literal,
            Span::new(self.offsets[start], self.offsets[self.current]),
        )
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields END_OF_FILE once, then stops.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.token_type == TokenType::EndOfFile {
            self.finished = true;
        }
        Some(token)
    }
}

fn is_whitespace(segment: &str) -> bool {
    segment.contains(&[' ', '\t', '\n', '\r'][..])
}
