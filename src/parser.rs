use crate::ast::{
    BlockStatement, Expression, Identifier, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::error::{Span, SyntaxError};
use crate::lexer::{Lexer, Token, TokenType};
use crate::symbols::{self, DIGITS};
use std::rc::Rc;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

/// Binding power of infix operators, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Or,
    And,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

impl Precedence {
    fn of(token_type: TokenType) -> Precedence {
        match token_type {
            TokenType::Or => Precedence::Or,
            TokenType::And => Precedence::And,
            TokenType::Eq => Precedence::Equals,
            TokenType::Gt | TokenType::Lt => Precedence::LessGreater,
            TokenType::Plus | TokenType::Minus => Precedence::Sum,
            TokenType::Times | TokenType::Division => Precedence::Product,
            TokenType::CallStart => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

/// Deepest expression nesting accepted. Anything deeper is reported as a
/// syntax error instead of being handed to the recursive evaluator.
pub const MAX_NESTING_DEPTH: usize = 256;

type PrefixParseFn<'a> = fn(&mut Parser<'a>) -> Option<Expression>;
type InfixParseFn<'a> = fn(&mut Parser<'a>, Expression) -> Option<Expression>;

/// Pratt parser over a lazily lexed token stream with one token of lookahead.
///
/// Syntax errors are collected rather than returned; a construct that fails
/// to parse is dropped (or left as a `None` placeholder) and parsing resumes
/// at the next token. Check [`Parser::errors`] before trusting the program.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    /// Span of the token before `current`, for errors found at end of input.
    previous: Span,
    nesting: usize,
    /// Set once nesting overflows and the rest of the input is skipped.
    abandoned: bool,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            lexer,
            previous: current.span,
            current,
            peek,
            nesting: 0,
            abandoned: false,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|error| error.message.clone()).collect()
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.current_is(TokenType::EndOfFile) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.advance();
        }

        debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        Program { statements }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.token_type {
            TokenType::Let => self.parse_let_statement(),
            TokenType::Return => self.parse_return_statement(),
            // Empty statement
            TokenType::EndOfLine => None,
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();

        if !self.expect_peek(TokenType::Identifier) {
            return None;
        }
        let name = Identifier::new(self.current.clone());

        if !self.expect_peek(TokenType::Assign) {
            return None;
        }
        self.advance();

        let value = self.parse_expression(Precedence::Lowest);
        self.skip_end_of_line();

        Some(Statement::Let { token, name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();

        let value = if matches!(
            self.peek.token_type,
            TokenType::EndOfLine | TokenType::BlockEnd | TokenType::EndOfFile
        ) {
            None
        } else {
            self.advance();
            Some(self.parse_expression(Precedence::Lowest)?)
        };
        self.skip_end_of_line();

        Some(Statement::Return { token, value })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.skip_end_of_line();

        Some(Statement::Expression { token, expression })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let nesting = self.nesting;
        let expression = self.parse_nested_expression(precedence);
        self.nesting = nesting;
        expression
    }

    /// Every prefix rule and every infix operator applied counts as one level,
    /// so long operator chains are bounded as well as deep groupings.
    fn parse_nested_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        self.enter_nesting()?;

        let Some(prefix) = Self::prefix_rule(self.current.token_type) else {
            self.no_prefix_parse_error();
            return None;
        };
        let mut left = prefix(self)?;

        while !self.peek_is(TokenType::EndOfLine) && precedence < self.peek_precedence() {
            let Some(infix) = Self::infix_rule(self.peek.token_type) else {
                return Some(left);
            };
            self.enter_nesting()?;
            self.advance();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn prefix_rule(token_type: TokenType) -> Option<PrefixParseFn<'a>> {
        let rule: PrefixParseFn<'a> = match token_type {
            TokenType::Identifier => Self::parse_identifier,
            TokenType::Number => Self::parse_number_literal,
            TokenType::Minus | TokenType::Bang => Self::parse_prefix_expression,
            TokenType::True | TokenType::False => Self::parse_boolean,
            TokenType::BlockStart | TokenType::CallStart => Self::parse_grouped_expression,
            TokenType::If => Self::parse_if_expression,
            TokenType::Function => Self::parse_function_literal,
            _ => return None,
        };
        Some(rule)
    }

    fn infix_rule(token_type: TokenType) -> Option<InfixParseFn<'a>> {
        let rule: InfixParseFn<'a> = match token_type {
            TokenType::Plus
            | TokenType::Minus
            | TokenType::Times
            | TokenType::Division
            | TokenType::Eq
            | TokenType::Gt
            | TokenType::Lt
            | TokenType::And
            | TokenType::Or => Self::parse_infix_expression,
            TokenType::CallStart => Self::parse_call_expression,
            _ => return None,
        };
        Some(rule)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(Identifier::new(self.current.clone())))
    }

    fn parse_number_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        match number_literal_value(&token.literal) {
            Some(value) => Some(Expression::Number { token, value }),
            None => {
                self.errors.push(SyntaxError::with_help(
                    token.span,
                    format!("invalid number: could not parse {} to a number", token.literal),
                    format!(
                        "a number is a run of digits with at most one decimal separator {}",
                        symbols::DECIMAL_SEPARATOR
                    ),
                ));
                None
            }
        }
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::Boolean {
            token: self.current.clone(),
            value: self.current_is(TokenType::True),
        })
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let operator = PrefixOperator::from_token_type(token.token_type)?;

        self.advance();
        let right = self.parse_expression(Precedence::Prefix)?;

        Some(Expression::Prefix {
            token,
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.current.clone();
        let operator = InfixOperator::from_token_type(token.token_type)?;
        let precedence = self.current_precedence();

        self.advance();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix {
            token,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        let closer = match self.current.token_type {
            TokenType::CallStart => TokenType::CallEnd,
            _ => TokenType::BlockEnd,
        };
        self.advance();

        let expression = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(closer) {
            return None;
        }
        Some(expression)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();

        self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenType::BlockStart) {
            return None;
        }
        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_is(TokenType::Else) {
            self.advance();
            if !self.expect_peek(TokenType::BlockStart) {
                return None;
            }
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Some(Expression::If {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    /// Expects the current token to be the block opener; leaves the parser on
    /// the matching closer.
    fn parse_block_statement(&mut self) -> Option<BlockStatement> {
        let token = self.current.clone();
        let mut statements = Vec::new();
        self.advance();

        while !self.current_is(TokenType::BlockEnd) {
            if self.current_is(TokenType::EndOfFile) {
                if self.abandoned {
                    return None;
                }
                self.errors.push(SyntaxError::with_help(
                    self.previous,
                    format!("expected {} before end of input", TokenType::BlockEnd),
                    format!("the block opened here by {} is never closed", token.literal),
                ));
                return None;
            }
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.advance();
        }

        Some(BlockStatement { token, statements })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(TokenType::BlockStart) {
            return None;
        }
        let body = self.parse_block_statement()?;

        Some(Expression::Function {
            token,
            parameters,
            body: Rc::new(body),
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();

        if self.peek_is(TokenType::BlockStart) {
            return Some(parameters);
        }

        if !self.expect_peek(TokenType::Identifier) {
            return None;
        }
        parameters.push(Identifier::new(self.current.clone()));

        while self.peek_is(TokenType::ArgumentSeparator) {
            self.advance();
            if !self.expect_peek(TokenType::Identifier) {
                return None;
            }
            parameters.push(Identifier::new(self.current.clone()));
        }

        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let token = self.current.clone();
        let arguments = self.parse_call_arguments()?;

        Some(Expression::Call {
            token,
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_call_arguments(&mut self) -> Option<Vec<Expression>> {
        let mut arguments = Vec::new();

        if self.peek_is(TokenType::CallEnd) {
            self.advance();
            return Some(arguments);
        }

        self.advance();
        arguments.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_is(TokenType::ArgumentSeparator) {
            self.advance();
            self.advance();
            arguments.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(TokenType::CallEnd) {
            return None;
        }
        Some(arguments)
    }

    fn advance(&mut self) {
        let next = self.lexer.next_token();
        self.previous = self.current.span;
        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn enter_nesting(&mut self) -> Option<()> {
        self.nesting += 1;
        if self.nesting <= MAX_NESTING_DEPTH {
            return Some(());
        }

        self.errors.push(SyntaxError::with_help(
            self.current.span,
            "expression nested too deeply".to_string(),
            format!("at most {} levels of nesting are allowed", MAX_NESTING_DEPTH),
        ));
        self.abandoned = true;
        while !self.peek_is(TokenType::EndOfFile) {
            self.advance();
        }
        None
    }

    fn current_is(&self, token_type: TokenType) -> bool {
        self.current.token_type == token_type
    }

    fn peek_is(&self, token_type: TokenType) -> bool {
        self.peek.token_type == token_type
    }

    fn skip_end_of_line(&mut self) {
        if self.peek_is(TokenType::EndOfLine) {
            self.advance();
        }
    }

    fn expect_peek(&mut self, token_type: TokenType) -> bool {
        if self.peek_is(token_type) {
            self.advance();
            true
        } else {
            self.peek_error(token_type);
            false
        }
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::of(self.current.token_type)
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek.token_type)
    }

    fn peek_error(&mut self, expected: TokenType) {
        let span = match self.peek.token_type {
            // Underline the last real token.
            TokenType::EndOfFile => self.current.span,
            _ => self.peek.span,
        };
        self.errors.push(SyntaxError::new(
            span,
            format!(
                "expected next token to be {}, got {} instead",
                expected, self.peek.token_type
            ),
        ));
    }

    fn no_prefix_parse_error(&mut self) {
        let token = &self.current;
        let message = format!("no prefix parse function for {}", token.token_type);
        let error = match token.token_type {
            TokenType::Illegal => SyntaxError::with_help(
                token.span,
                message,
                format!("'{}' is not a symbol of the language", token.literal),
            ),
            TokenType::EndOfFile => SyntaxError::with_help(
                self.previous,
                message,
                "reached end of input while expecting an expression".to_string(),
            ),
            _ => SyntaxError::new(token.span, message),
        };
        self.errors.push(error);
    }
}

/// Converts a NUMBER literal (emoji digits and decimal separators) into its
/// value. More than one separator, or no digits at all, is rejected.
fn number_literal_value(literal: &str) -> Option<f64> {
    let mut seen_separator = false;
    let mut digits = String::new();

    for segment in literal.graphemes(true) {
        if let Some(digit) = DIGITS.name(segment) {
            digits.push_str(digit);
        } else if symbols::is_decimal_separator(segment) {
            if seen_separator {
                return None;
            }
            seen_separator = true;
            digits.push('.');
        }
    }

    digits.parse::<f64>().ok()
}
