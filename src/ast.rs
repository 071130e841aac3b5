use crate::lexer::{Token, TokenType};
use crate::symbols::OPERATORS;
use std::fmt;
use std::rc::Rc;

/// Every node keeps the token that introduced it. The `Display` impls give
/// the canonical render used for diagnostics; it is not meant to be re-parsed.

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let {
        token: Token,
        name: Identifier,
        /// `None` only when the value failed to parse.
        value: Option<Expression>,
    },
    Return {
        token: Token,
        /// `None` for a bare return.
        value: Option<Expression>,
    },
    Expression {
        token: Token,
        expression: Expression,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl Identifier {
    pub fn new(token: Token) -> Self {
        let value = token.literal.clone();
        Self { token, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Boolean {
        token: Token,
        value: bool,
    },
    Number {
        token: Token,
        value: f64,
    },
    Prefix {
        token: Token,
        operator: PrefixOperator,
        right: Box<Expression>,
    },
    Infix {
        token: Token,
        operator: InfixOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        token: Token,
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    /// The body is shared with every function value created from this literal.
    Function {
        token: Token,
        parameters: Vec<Identifier>,
        body: Rc<BlockStatement>,
    },
    Call {
        token: Token,
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Bang,
    Minus,
}

impl PrefixOperator {
    pub fn from_token_type(token_type: TokenType) -> Option<Self> {
        match token_type {
            TokenType::Bang => Some(PrefixOperator::Bang),
            TokenType::Minus => Some(PrefixOperator::Minus),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        let name = match self {
            PrefixOperator::Bang => "BANG",
            PrefixOperator::Minus => "MINUS",
        };
        OPERATORS.symbol(name).unwrap_or(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Plus,
    Minus,
    Times,
    Division,
    Eq,
    Gt,
    Lt,
    And,
    Or,
}

impl InfixOperator {
    pub fn from_token_type(token_type: TokenType) -> Option<Self> {
        let operator = match token_type {
            TokenType::Plus => InfixOperator::Plus,
            TokenType::Minus => InfixOperator::Minus,
            TokenType::Times => InfixOperator::Times,
            TokenType::Division => InfixOperator::Division,
            TokenType::Eq => InfixOperator::Eq,
            TokenType::Gt => InfixOperator::Gt,
            TokenType::Lt => InfixOperator::Lt,
            TokenType::And => InfixOperator::And,
            TokenType::Or => InfixOperator::Or,
            _ => return None,
        };
        Some(operator)
    }

    pub fn symbol(self) -> &'static str {
        let name = match self {
            InfixOperator::Plus => "PLUS",
            InfixOperator::Minus => "MINUS",
            InfixOperator::Times => "TIMES",
            InfixOperator::Division => "DIVISION",
            InfixOperator::Eq => "EQ",
            InfixOperator::Gt => "GT",
            InfixOperator::Lt => "LT",
            InfixOperator::And => "AND",
            InfixOperator::Or => "OR",
        };
        OPERATORS.symbol(name).unwrap_or(name)
    }
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Statement::Let { token, name, value } => {
                let assign = OPERATORS.symbol("ASSIGN").unwrap_or("=");
                write!(f, "{} {} {} ", token.literal, name, assign)?;
                if let Some(value) = value {
                    write!(f, "{}", value)?;
                }
                write!(f, ";")
            }
            Statement::Return { token, value } => {
                write!(f, "{}", token.literal)?;
                if let Some(value) = value {
                    write!(f, " {}", value)?;
                }
                write!(f, ";")
            }
            Statement::Expression { expression, .. } => write!(f, "{}", expression),
        }
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.token.literal)?;
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        let block_end = TokenType::BlockEnd.symbol().unwrap_or("}");
        write!(f, "{}", block_end)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Identifier(identifier) => write!(f, "{}", identifier),
            Expression::Boolean { value, .. } => write!(f, "{}", value),
            Expression::Number { value, .. } => write!(f, "{}", value),
            Expression::Prefix {
                operator, right, ..
            } => write!(f, "({}{})", operator, right),
            Expression::Infix {
                operator,
                left,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::If {
                token,
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "{} {} {}", token.literal, condition, consequence)?;
                if let Some(alternative) = alternative {
                    let keyword = TokenType::Else.symbol().unwrap_or("else");
                    write!(f, " {} {}", keyword, alternative)?;
                }
                Ok(())
            }
            Expression::Function {
                token,
                parameters,
                body,
            } => {
                let params: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();
                write!(f, "{}({}) {}", token.literal, params.join(", "), body)
            }
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                let args: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", function, args.join(", "))
            }
        }
    }
}
