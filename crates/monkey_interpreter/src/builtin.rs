use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;

/// The fixed name -> callable table consulted when identifier resolution
/// falls off the end of the environment chain.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Builtin {
    Len,
    Puts,
    Append,
    Input,
    RawInput,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "len" => Some(Builtin::Len),
            "puts" => Some(Builtin::Puts),
            "append" => Some(Builtin::Append),
            "input" => Some(Builtin::Input),
            "raw_input" => Some(Builtin::RawInput),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::Puts => "puts",
            Builtin::Append => "append",
            Builtin::Input => "input",
            Builtin::RawInput => "raw_input",
        }
    }

    pub fn apply(&self, args: Vec<Rc<Object>>) -> Result<Rc<Object>, RuntimeError> {
        match self {
            Builtin::Len => {
                let arg = exactly_one(self.name(), &args)?;
                match arg.as_ref() {
                    // Characters, not bytes; string contents are not
                    // restricted to ASCII
                    Object::String(value) => {
                        Ok(Rc::new(Object::Integer(value.chars().count() as i64)))
                    }
                    Object::Array(array) => Ok(Rc::new(Object::Integer(array.len() as i64))),
                    _ => Err(RuntimeError::NoLen(arg.typename())),
                }
            }
            Builtin::Puts => {
                let line = args
                    .iter()
                    .map(|arg| arg.to_string())
                    .collect::<Vec<String>>()
                    .join(" ");
                println!("{}", line);
                Ok(Rc::new(Object::Null))
            }
            Builtin::Append => {
                if args.len() != 2 {
                    return Err(RuntimeError::BuiltinExactArgs {
                        name: self.name(),
                        expected: 2,
                        got: args.len(),
                    });
                }
                let array = Rc::clone(&args[0]);
                let value = Rc::clone(&args[1]);
                match array.as_ref() {
                    Object::Array(array) => {
                        // In-place: every binding sharing this array sees the push
                        array.elements.borrow_mut().push(value);
                        Ok(Rc::new(Object::Null))
                    }
                    _ => Err(RuntimeError::NoAppend(array.typename())),
                }
            }
            Builtin::Input => {
                let line = read_line(self.name(), &args)?;
                match line.parse() {
                    Ok(value) => Ok(Rc::new(Object::Integer(value))),
                    Err(_) => Err(RuntimeError::InvalidIntegerLiteral(line)),
                }
            }
            Builtin::RawInput => {
                let line = read_line(self.name(), &args)?;
                Ok(Rc::new(Object::String(line)))
            }
        }
    }
}

fn exactly_one<'a>(
    name: &'static str,
    args: &'a [Rc<Object>],
) -> Result<&'a Rc<Object>, RuntimeError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(RuntimeError::BuiltinExactArgs {
            name,
            expected: 1,
            got: args.len(),
        }),
    }
}

/// Print the optional prompt without a newline, then read one console line
fn read_line(name: &'static str, args: &[Rc<Object>]) -> Result<String, RuntimeError> {
    if args.len() > 1 {
        return Err(RuntimeError::BuiltinAtMostOneArg {
            name,
            got: args.len(),
        });
    }

    if let Some(prompt) = args.first() {
        print!("{}", prompt);
        io::stdout()
            .flush()
            .map_err(|err| RuntimeError::InputFailed(err.to_string()))?;
    }

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|err| RuntimeError::InputFailed(err.to_string()))?;

    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }

    Ok(line)
}

impl Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "builtin function {}", self.name())
    }
}
