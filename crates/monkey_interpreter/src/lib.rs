pub mod builtin;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod object;

pub use environment::Environment;
pub use error::RuntimeError;
pub use evaluator::Evaluator;

use std::cell::RefCell;
use std::rc::Rc;

use monkey_parser::{lexer::Lexer, parser::Parser, parser::ParseError};

/// Lex, parse and evaluate a source string against an existing environment.
///
/// Parse failures come back as `Err`; evaluation failures come back as an
/// `Ok` holding an `Object::Error`, the same way any Monkey value does.
pub fn evaluate_source(
    source: &str,
    env: &Rc<RefCell<Environment>>,
) -> Result<Rc<object::Object>, ParseError> {
    let lexer = Lexer::new(source);
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program()?;

    let mut evaluator = Evaluator::new_with_env(Rc::clone(env));
    Ok(evaluator.eval(&program))
}
