use crate::ast::{
    BlockStatement, Expression, Identifier, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::environment::Environment;
use crate::error::EvalError;
use crate::value::{Function, Object};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace};

pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

type Env = Rc<RefCell<Environment>>;

/// Returns early with the value if it is a runtime `Error`.
macro_rules! propagate {
    ($object:expr) => {{
        let object = $object;
        if object.is_error() {
            return Ok(object);
        }
        object
    }};
}

/// Tree-walking evaluator.
///
/// User-level failures come back as `Object::Error` values inside `Ok`;
/// `Err(EvalError)` is reserved for trees the parser would never hand over
/// without also reporting syntax errors.
pub struct Evaluator {
    environment: Env,
    max_call_depth: usize,
    depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

// A function bound in the frame it captured keeps that frame alive through an
// `Rc` cycle; dropping the evaluator releases its bindings to cut those cycles.
impl Drop for Evaluator {
    fn drop(&mut self) {
        if let Ok(mut environment) = self.environment.try_borrow_mut() {
            environment.release();
        }
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_environment(Environment::new_shared())
    }

    /// Evaluates against an existing frame. Its bindings are released when
    /// the evaluator is dropped.
    pub fn with_environment(environment: Env) -> Self {
        Self {
            environment,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            depth: 0,
        }
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn environment(&self) -> Env {
        Rc::clone(&self.environment)
    }

    /// Runs every statement in the global environment. A top-level `🔙`
    /// ends the program with its unwrapped value; an `Error` ends it as is.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate_program(&mut self, program: &Program) -> Result<Rc<Object>, EvalError> {
        let environment = Rc::clone(&self.environment);
        let mut result = Object::null();

        for statement in &program.statements {
            result = self.eval_statement(statement, &environment)?;

            match &*result {
                Object::ReturnValue(value) => return Ok(Rc::clone(value)),
                Object::Error(message) => {
                    debug!(%message, "program stopped on runtime error");
                    return Ok(result);
                }
                _ => {}
            }
        }

        Ok(result)
    }

    /// Unlike a program, a block hands `ReturnValue` back still wrapped so it
    /// can travel up to the enclosing call.
    fn eval_block(&mut self, block: &BlockStatement, env: &Env) -> Result<Rc<Object>, EvalError> {
        let mut result = Object::null();

        for statement in &block.statements {
            result = self.eval_statement(statement, env)?;

            if matches!(&*result, Object::ReturnValue(_) | Object::Error(_)) {
                return Ok(result);
            }
        }

        Ok(result)
    }

    fn eval_statement(&mut self, statement: &Statement, env: &Env) -> Result<Rc<Object>, EvalError> {
        match statement {
            Statement::Let { name, value, .. } => {
                let Some(value) = value else {
                    return Err(EvalError::IncompleteNode("let statement"));
                };
                let value = propagate!(self.eval_expression(value, env)?);
                env.borrow_mut().set(&name.value, value);
                Ok(Object::null())
            }
            Statement::Return { value, .. } => {
                let value = match value {
                    Some(expression) => propagate!(self.eval_expression(expression, env)?),
                    None => Object::null(),
                };
                Ok(Rc::new(Object::ReturnValue(value)))
            }
            Statement::Expression { expression, .. } => self.eval_expression(expression, env),
        }
    }

    pub fn eval_expression(
        &mut self,
        expression: &Expression,
        env: &Env,
    ) -> Result<Rc<Object>, EvalError> {
        match expression {
            Expression::Number { value, .. } => Ok(Object::number(*value)),
            Expression::Boolean { value, .. } => Ok(Object::boolean(*value)),
            Expression::Identifier(identifier) => Ok(self.eval_identifier(identifier, env)),
            Expression::Prefix {
                operator, right, ..
            } => {
                let right = propagate!(self.eval_expression(right, env)?);
                Ok(self.eval_prefix(*operator, right))
            }
            Expression::Infix {
                operator,
                left,
                right,
                ..
            } => {
                let left = propagate!(self.eval_expression(left, env)?);
                let right = propagate!(self.eval_expression(right, env)?);
                Ok(self.eval_infix(*operator, left, right))
            }
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                let condition = propagate!(self.eval_expression(condition, env)?);

                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Ok(Object::null())
                }
            }
            Expression::Function {
                parameters, body, ..
            } => Ok(Rc::new(Object::Function(Function {
                parameters: parameters.clone(),
                body: Rc::clone(body),
                environment: Rc::clone(env),
            }))),
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                let function = propagate!(self.eval_expression(function, env)?);

                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(propagate!(self.eval_expression(argument, env)?));
                }

                self.apply_function(function, args)
            }
        }
    }

    fn eval_identifier(&self, identifier: &Identifier, env: &Env) -> Rc<Object> {
        env.borrow()
            .get(&identifier.value)
            .unwrap_or_else(|| Object::error(format!("identifier not found: {}", identifier.value)))
    }

    fn eval_prefix(&self, operator: PrefixOperator, right: Rc<Object>) -> Rc<Object> {
        match operator {
            PrefixOperator::Bang => match &*right {
                Object::Number(_) | Object::Null => Object::boolean(true),
                Object::Boolean(b) => Object::boolean(!b),
                _ => Object::error(format!("unknown operator: {}{}", operator, right.type_name())),
            },
            PrefixOperator::Minus => match &*right {
                Object::Number(n) => Object::number(-n),
                _ => Object::error(format!("unknown operator: {}{}", operator, right.type_name())),
            },
        }
    }

    fn eval_infix(&self, operator: InfixOperator, left: Rc<Object>, right: Rc<Object>) -> Rc<Object> {
        match (&*left, &*right) {
            (Object::Number(l), Object::Number(r)) => self.eval_number_infix(operator, *l, *r),
            // Identity, not structure: two distinct function values never compare equal.
            _ if operator == InfixOperator::Eq => Object::boolean(Rc::ptr_eq(&left, &right)),
            _ if left.type_name() != right.type_name() => Object::error(format!(
                "type mismatch: {} {} {}",
                left.type_name(),
                operator,
                right.type_name()
            )),
            _ => Object::error(format!(
                "unknown operator: {} {} {}",
                left.type_name(),
                operator,
                right.type_name()
            )),
        }
    }

    fn eval_number_infix(&self, operator: InfixOperator, left: f64, right: f64) -> Rc<Object> {
        match operator {
            InfixOperator::Plus => Object::number(left + right),
            InfixOperator::Minus => Object::number(left - right),
            InfixOperator::Times => Object::number(left * right),
            InfixOperator::Division => {
                if right == 0.0 {
                    Object::error("division by zero")
                } else {
                    Object::number(left / right)
                }
            }
            InfixOperator::Gt => Object::boolean(left > right),
            InfixOperator::Lt => Object::boolean(left < right),
            InfixOperator::Eq => Object::boolean(left == right),
            InfixOperator::And | InfixOperator::Or => {
                Object::error(format!("unknown operator: NUMBER {} NUMBER", operator))
            }
        }
    }

    fn apply_function(
        &mut self,
        function: Rc<Object>,
        args: Vec<Rc<Object>>,
    ) -> Result<Rc<Object>, EvalError> {
        let Object::Function(function) = &*function else {
            return Ok(Object::error(format!(
                "not a function: {}",
                function.type_name()
            )));
        };

        if args.len() != function.parameters.len() {
            return Ok(Object::error(format!(
                "wrong number of arguments: expected {}, got {}",
                function.parameters.len(),
                args.len()
            )));
        }

        if self.depth >= self.max_call_depth {
            return Ok(Object::error(format!(
                "maximum call depth exceeded ({})",
                self.max_call_depth
            )));
        }

        let call_env = Environment::enclosed(Rc::clone(&function.environment));
        {
            let mut frame = call_env.borrow_mut();
            for (parameter, arg) in function.parameters.iter().zip(args) {
                frame.set(&parameter.value, arg);
            }
        }

        self.depth += 1;
        trace!(depth = self.depth, "applying function");
        let result = self.eval_block(&function.body, &call_env);
        self.depth -= 1;

        let result = result?;
        match &*result {
            Object::ReturnValue(value) => Ok(Rc::clone(value)),
            _ => Ok(result),
        }
    }
}
