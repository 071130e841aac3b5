use crate::ast::{BlockStatement, Identifier};
use crate::environment::Environment;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Runtime values are always handled through `Rc` so that `⚖️` on anything
/// but numbers can compare identity. `true`, `false` and `null` are interned;
/// use [`Object::boolean`] and [`Object::null`] rather than building them.
#[derive(Debug)]
pub enum Object {
    Number(f64),
    Boolean(bool),
    Null,
    /// Control-flow signal carrying a `🔙` value up to the call boundary.
    ReturnValue(Rc<Object>),
    Error(String),
    Function(Function),
}

pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: Rc<BlockStatement>,
    pub environment: Rc<RefCell<Environment>>,
}

// The captured environment can contain the function itself.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

thread_local! {
    static TRUE: Rc<Object> = Rc::new(Object::Boolean(true));
    static FALSE: Rc<Object> = Rc::new(Object::Boolean(false));
    static NULL: Rc<Object> = Rc::new(Object::Null);
}

impl Object {
    pub fn boolean(value: bool) -> Rc<Object> {
        if value {
            TRUE.with(Rc::clone)
        } else {
            FALSE.with(Rc::clone)
        }
    }

    pub fn null() -> Rc<Object> {
        NULL.with(Rc::clone)
    }

    pub fn number(value: f64) -> Rc<Object> {
        Rc::new(Object::Number(value))
    }

    pub fn error(message: impl Into<String>) -> Rc<Object> {
        Rc::new(Object::Error(message.into()))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// Numbers are always truthy, `null` never is.
    pub fn is_truthy(&self) -> bool {
        match self {
            Object::Number(_) => true,
            Object::Boolean(b) => *b,
            Object::Null => false,
            Object::ReturnValue(inner) => inner.is_truthy(),
            Object::Error(_) | Object::Function(_) => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Number(_) => "NUMBER",
            Object::Boolean(_) => "BOOLEAN",
            Object::Null => "NULL",
            Object::ReturnValue(_) => "RETURN_VALUE",
            Object::Error(_) => "ERROR",
            Object::Function(_) => "FUNCTION",
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Object::Number(n) => write!(f, "{}", n),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::Null => write!(f, "null"),
            Object::ReturnValue(inner) => write!(f, "{}", inner),
            Object::Error(message) => write!(f, "ERROR: {}", message),
            Object::Function(function) => {
                let params: Vec<String> =
                    function.parameters.iter().map(|p| p.to_string()).collect();
                let keyword = crate::lexer::TokenType::Function
                    .symbol()
                    .unwrap_or("fn");
                write!(f, "{}({}) {}", keyword, params.join(", "), function.body)
            }
        }
    }
}
