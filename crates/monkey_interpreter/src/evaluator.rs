use std::{cell::RefCell, rc::Rc};

use tracing::trace;

use crate::{
    builtin::Builtin,
    environment::Environment,
    error::RuntimeError,
    object::{Array, Function, Object},
};

use monkey_parser::{
    ast::{BlockStatement, Expression, Program, Statement},
    token::Token,
};

/// Active Monkey call frames allowed before evaluation gives up with an
/// error instead of exhausting the host stack.
const MAX_CALL_DEPTH: usize = 1000;

pub struct Evaluator {
    env: Rc<RefCell<Environment>>,
    call_depth: usize,

    // Singleton objects, allocated once per evaluator and handed out by handle
    null_obj: Rc<Object>,
    true_obj: Rc<Object>,
    false_obj: Rc<Object>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::new_with_env(Rc::new(RefCell::new(Environment::new())))
    }

    pub fn new_with_env(env: Rc<RefCell<Environment>>) -> Self {
        Evaluator {
            env,
            call_depth: 0,
            null_obj: Rc::new(Object::Null),
            true_obj: Rc::new(Object::Boolean(true)),
            false_obj: Rc::new(Object::Boolean(false)),
        }
    }

    /// Evaluate a whole program. A `ReturnValue` reaching this boundary is
    /// unwrapped; an `Error` is the final result, never a panic.
    pub fn eval(&mut self, prog: &Program) -> Rc<Object> {
        let mut result = self.null();

        for stmt in &prog.statements {
            let val = self.eval_statement(stmt);

            match val.as_ref() {
                Object::ReturnValue(inner_value) => return Rc::clone(inner_value),
                Object::Error(_) => return val,
                _ => result = val,
            }
        }

        result
    }

    // Similar to eval (for programs) but doesn't unwrap return values:
    // we might be in a nested block whose enclosing call needs to see them
    fn eval_block_statement(&mut self, block: &BlockStatement) -> Rc<Object> {
        let mut result = self.null();

        for stmt in &block.statements {
            let val = self.eval_statement(stmt);

            match val.as_ref() {
                Object::ReturnValue(_) => return val,
                Object::Error(_) => return val,
                _ => result = val,
            }
        }

        result
    }

    fn eval_statement(&mut self, stmt: &Statement) -> Rc<Object> {
        match stmt {
            Statement::Expression { expression } => self.eval_expression(expression),
            Statement::Return { value } => {
                let obj = self.eval_expression(value);

                // No need to encapsulate an Error with a ReturnValue since
                // they both bubble up the same way
                if obj.is_error() {
                    return obj;
                }

                Rc::new(Object::ReturnValue(obj))
            }
            Statement::Let { name, value } => {
                let obj = self.eval_expression(value);
                // Propagate without binding
                if obj.is_error() {
                    return obj;
                }

                self.env.borrow_mut().set(name.to_owned(), obj);

                self.null()
            }
        }
    }

    fn eval_expression(&mut self, expr: &Expression) -> Rc<Object> {
        match expr {
            Expression::Integer(value) => Rc::new(Object::Integer(*value)),
            Expression::Boolean(value) => self.boolean(*value),
            Expression::String(value) => Rc::new(Object::String(value.clone())),
            Expression::Identifier(identifier) => self.eval_identifier_expression(&identifier.name),

            Expression::Prefix(prefix) => {
                let right = self.eval_expression(&prefix.right);
                if right.is_error() {
                    return right;
                }
                self.eval_prefix_expression(&prefix.operator, right)
            }
            Expression::Infix(infix) => {
                let left = self.eval_expression(&infix.left);
                if left.is_error() {
                    return left;
                }
                let right = self.eval_expression(&infix.right);
                if right.is_error() {
                    return right;
                }
                self.eval_infix_expression(&infix.operator, left, right)
            }

            Expression::If(if_expr) => self.eval_if_expression(
                &if_expr.condition,
                &if_expr.consequence,
                &if_expr.alternative,
            ),
            Expression::While(while_expr) => {
                self.eval_while_expression(&while_expr.condition, &while_expr.body)
            }

            Expression::Array(arr) => {
                let elements = self.eval_expressions(&arr.elements);
                if elements.len() == 1 && elements[0].is_error() {
                    return Rc::clone(&elements[0]);
                }
                Rc::new(Object::Array(Array::new(elements)))
            }
            Expression::Index(expr) => {
                let left = self.eval_expression(&expr.left);
                if left.is_error() {
                    return left;
                }
                let index = self.eval_expression(&expr.index);
                if index.is_error() {
                    return index;
                }
                self.eval_index_expression(left, index)
            }

            Expression::Function(func) => Rc::new(Object::Function(Function {
                parameters: func.parameters.clone(),
                body: Rc::clone(&func.body),
                // Captured by reference: later bindings in this environment
                // stay visible through outward lookup
                env: Rc::clone(&self.env),
            })),
            Expression::Call(call) => {
                let func = self.eval_expression(&call.function);
                if func.is_error() {
                    return func;
                }
                let args = self.eval_expressions(&call.arguments);
                if args.len() == 1 && args[0].is_error() {
                    return Rc::clone(&args[0]);
                }

                self.apply_function(func, args)
            }
        }
    }

    /// Left-to-right, stopping at the first error; an error comes back as
    /// a single-element list
    fn eval_expressions(&mut self, exprs: &[Expression]) -> Vec<Rc<Object>> {
        let mut result = Vec::new();
        for expr in exprs {
            let evaluated = self.eval_expression(expr);
            if evaluated.is_error() {
                return vec![evaluated];
            }
            result.push(evaluated);
        }
        result
    }

    fn eval_identifier_expression(&self, name: &str) -> Rc<Object> {
        let result = self.env.borrow().get(name);

        match result {
            Some(obj) => obj,
            // If we don't find the identifier, look it up as a builtin.
            // Builtins are not "in environment/scope" like other variables,
            // so any binding of the same name shadows them.
            None => match Builtin::lookup(name) {
                Some(builtin) => Rc::new(Object::Builtin(builtin)),
                None => Rc::new(Object::Error(RuntimeError::IdentifierNotFound(
                    name.to_owned(),
                ))),
            },
        }
    }

    fn eval_prefix_expression(&self, operator: &Token, right: Rc<Object>) -> Rc<Object> {
        match operator {
            Token::Bang => self.boolean(!is_truthy(&right)),
            Token::Minus => match right.as_ref() {
                Object::Integer(value) => match value.checked_neg() {
                    Some(value) => Rc::new(Object::Integer(value)),
                    None => Rc::new(Object::Error(RuntimeError::IntegerOverflow(Token::Minus))),
                },
                _ => Rc::new(Object::Error(RuntimeError::InvalidPrefixOperand {
                    operator: Token::Minus,
                    right: right.typename(),
                })),
            },
            // The parser never hands any other operator to a prefix node
            _ => unreachable!("unknown prefix operator {}", operator),
        }
    }

    fn eval_infix_expression(
        &self,
        operator: &Token,
        left: Rc<Object>,
        right: Rc<Object>,
    ) -> Rc<Object> {
        match (left.as_ref(), right.as_ref()) {
            (Object::Integer(left_value), Object::Integer(right_value)) => {
                self.eval_integer_infix_expression(operator, *left_value, *right_value)
            }
            (Object::String(left_value), Object::String(right_value)) => {
                self.eval_string_infix_expression(operator, left_value, right_value)
            }

            // Everything else is always comparable (by value within a
            // variant, by identity across variants) but supports nothing
            // beyond equality
            (_, _) => match operator {
                Token::EqualEqual => self.boolean(objects_equal(&left, &right)),
                Token::BangEqual => self.boolean(!objects_equal(&left, &right)),
                _ => Rc::new(Object::Error(RuntimeError::InvalidInfixOperands {
                    operator: operator.clone(),
                    left: left.typename(),
                    right: right.typename(),
                })),
            },
        }
    }

    fn eval_integer_infix_expression(
        &self,
        operator: &Token,
        left_value: i64,
        right_value: i64,
    ) -> Rc<Object> {
        let overflow = |op: &Token| Rc::new(Object::Error(RuntimeError::IntegerOverflow(op.clone())));

        match operator {
            Token::Plus => match left_value.checked_add(right_value) {
                Some(value) => Rc::new(Object::Integer(value)),
                None => overflow(operator),
            },
            Token::Minus => match left_value.checked_sub(right_value) {
                Some(value) => Rc::new(Object::Integer(value)),
                None => overflow(operator),
            },
            Token::Star => match left_value.checked_mul(right_value) {
                Some(value) => Rc::new(Object::Integer(value)),
                None => overflow(operator),
            },
            Token::Slash => {
                if right_value == 0 {
                    return Rc::new(Object::Error(RuntimeError::DivisionByZero));
                }
                // Truncating division; i64::MIN / -1 is the one overflow case
                match left_value.checked_div(right_value) {
                    Some(value) => Rc::new(Object::Integer(value)),
                    None => overflow(operator),
                }
            }

            Token::LessThan => self.boolean(left_value < right_value),
            Token::GreaterThan => self.boolean(left_value > right_value),
            Token::EqualEqual => self.boolean(left_value == right_value),
            Token::BangEqual => self.boolean(left_value != right_value),

            operator => Rc::new(Object::Error(RuntimeError::InvalidInfixOperands {
                operator: operator.clone(),
                left: "integer".into(),
                right: "integer".into(),
            })),
        }
    }

    fn eval_string_infix_expression(
        &self,
        operator: &Token,
        left_value: &str,
        right_value: &str,
    ) -> Rc<Object> {
        match operator {
            Token::Plus => Rc::new(Object::String(left_value.to_owned() + right_value)),
            Token::EqualEqual => self.boolean(left_value == right_value),
            Token::BangEqual => self.boolean(left_value != right_value),

            operator => Rc::new(Object::Error(RuntimeError::InvalidInfixOperands {
                operator: operator.clone(),
                left: "string".into(),
                right: "string".into(),
            })),
        }
    }

    fn eval_index_expression(&self, left: Rc<Object>, index: Rc<Object>) -> Rc<Object> {
        match (left.as_ref(), index.as_ref()) {
            (Object::Array(array), Object::Integer(i)) => {
                if *i < 0 {
                    return Rc::new(Object::Error(RuntimeError::NegativeIndex));
                }

                let elements = array.elements.borrow();
                match elements.get(*i as usize) {
                    Some(el) => Rc::clone(el),
                    None => Rc::new(Object::Error(RuntimeError::IndexOutOfRange(*i))),
                }
            }
            _ => Rc::new(Object::Error(RuntimeError::NotSubscriptable(
                left.typename(),
            ))),
        }
    }

    fn eval_if_expression(
        &mut self,
        condition: &Expression,
        consequence: &BlockStatement,
        alternative: &Option<BlockStatement>,
    ) -> Rc<Object> {
        let evaluated_condition = self.eval_expression(condition);
        if evaluated_condition.is_error() {
            return evaluated_condition;
        }

        if is_truthy(&evaluated_condition) {
            self.eval_block_statement(consequence)
        } else if let Some(alternative) = alternative {
            self.eval_block_statement(alternative)
        } else {
            self.null()
        }
    }

    /// Re-test the condition before each iteration; the body runs in the
    /// current environment (blocks do not open scopes), and a return or
    /// error from it stops the loop.
    fn eval_while_expression(
        &mut self,
        condition: &Expression,
        body: &BlockStatement,
    ) -> Rc<Object> {
        loop {
            let evaluated_condition = self.eval_expression(condition);
            if evaluated_condition.is_error() {
                return evaluated_condition;
            }
            if !is_truthy(&evaluated_condition) {
                return self.null();
            }

            let result = self.eval_block_statement(body);
            match result.as_ref() {
                Object::ReturnValue(_) => return result,
                Object::Error(_) => return result,
                _ => {}
            }
        }
    }

    fn apply_function(&mut self, func: Rc<Object>, args: Vec<Rc<Object>>) -> Rc<Object> {
        match func.as_ref() {
            Object::Function(func) => {
                if args.len() != func.parameters.len() {
                    return Rc::new(Object::Error(RuntimeError::BadArity {
                        expected: func.parameters.len(),
                        got: args.len(),
                    }));
                }

                if self.call_depth >= MAX_CALL_DEPTH {
                    return Rc::new(Object::Error(RuntimeError::RecursionLimitExceeded));
                }

                trace!(depth = self.call_depth, params = func.parameters.len(), "apply function");

                // The call frame's outer scope is the function's *captured*
                // environment, never the caller's
                let mut scoped_env = Environment::new_enclosed(Rc::clone(&func.env));
                for (ident, obj) in func.parameters.iter().zip(args.iter()) {
                    scoped_env.set(ident.name.clone(), Rc::clone(obj));
                }

                // Remember the caller's environment to restore on exit
                let current_env = std::mem::replace(&mut self.env, Rc::new(RefCell::new(scoped_env)));
                self.call_depth += 1;

                let result = self.eval_block_statement(&func.body);

                self.call_depth -= 1;
                self.env = current_env;

                // A return inside the body ends at this call boundary
                match result.as_ref() {
                    Object::ReturnValue(inner_value) => Rc::clone(inner_value),
                    _ => result,
                }
            }
            // Builtins handle their own argument checking
            Object::Builtin(builtin) => match builtin.apply(args) {
                Ok(obj) => obj,
                Err(err) => Rc::new(Object::Error(err)),
            },
            _ => Rc::new(Object::Error(RuntimeError::NotCallable(func.typename()))),
        }
    }

    fn null(&self) -> Rc<Object> {
        Rc::clone(&self.null_obj)
    }

    fn boolean(&self, value: bool) -> Rc<Object> {
        if value {
            Rc::clone(&self.true_obj)
        } else {
            Rc::clone(&self.false_obj)
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new()
    }
}

/// `Boolean` by its value, `Null` never, `Integer` unless zero,
/// everything else always.
fn is_truthy(obj: &Object) -> bool {
    match obj {
        Object::Boolean(value) => *value,
        Object::Null => false,
        Object::Integer(value) => *value != 0,
        _ => true,
    }
}

/// Equality across arbitrary objects: by value within a scalar variant,
/// by reference identity for arrays and functions, false across variants.
fn objects_equal(left: &Rc<Object>, right: &Rc<Object>) -> bool {
    match (left.as_ref(), right.as_ref()) {
        (Object::Boolean(left_value), Object::Boolean(right_value)) => left_value == right_value,
        (Object::Null, Object::Null) => true,
        _ => Rc::ptr_eq(left, right),
    }
}
