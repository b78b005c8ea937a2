use std::fmt::Display;

use monkey_parser::token::Token;

/// Every evaluation failure class. These travel inside `Object::Error`
/// values, never as host panics.
#[derive(Debug, PartialEq)]
pub enum RuntimeError {
    /// When attempting a prefix operation on an invalid type (e.g. -bool)
    InvalidPrefixOperand { operator: Token, right: String },
    /// When attempting an infix operation on types that do not support it
    /// (e.g. bool + bool, int + bool)
    InvalidInfixOperands {
        operator: Token,
        left: String,
        right: String,
    },
    /// When referencing an identifier that has not been defined
    IdentifierNotFound(String),
    /// When an object that is not a function is used with call syntax
    NotCallable(String),
    /// When a call's argument count does not match the parameter count
    BadArity { expected: usize, got: usize },
    /// When indexing an object that does not support it, or with a
    /// non-integer index
    NotSubscriptable(String),
    /// When indexing an array with a negative integer
    NegativeIndex,
    /// When indexing an array past its last element
    IndexOutOfRange(i64),
    /// Integer division by zero
    DivisionByZero,
    /// Arithmetic left the i64 range
    IntegerOverflow(Token),
    /// Too many active function calls
    RecursionLimitExceeded,

    /// A builtin was called with the wrong number of arguments
    BuiltinExactArgs {
        name: &'static str,
        expected: usize,
        got: usize,
    },
    /// A builtin taking an optional argument was given more than one
    BuiltinAtMostOneArg { name: &'static str, got: usize },
    /// `len` on an object with no length
    NoLen(String),
    /// `append` on something that is not an array
    NoAppend(String),
    /// `input` read something that is not an integer literal
    InvalidIntegerLiteral(String),
    /// The console went away mid-read
    InputFailed(String),
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use RuntimeError::*;

        match self {
            InvalidPrefixOperand { operator, right } => {
                write!(f, "unsupported operand type for {}: '{}'", operator, right)
            }
            InvalidInfixOperands {
                operator,
                left,
                right,
            } => write!(
                f,
                "unsupported operand type(s) for {}: '{}' and '{}'",
                operator, left, right
            ),
            IdentifierNotFound(name) => write!(f, "name '{}' is not defined", name),
            NotCallable(typename) => write!(f, "'{}' object is not callable", typename),
            BadArity { expected, got } => write!(
                f,
                "function expected {} arguments but {} were given",
                expected, got
            ),
            NotSubscriptable(typename) => {
                write!(f, "'{}' object is not subscriptable", typename)
            }
            NegativeIndex => write!(f, "negative indexes are not supported"),
            IndexOutOfRange(index) => write!(f, "array index({}) out of range", index),
            DivisionByZero => write!(f, "division by zero"),
            IntegerOverflow(operator) => write!(f, "integer overflow in {}", operator),
            RecursionLimitExceeded => write!(f, "maximum recursion depth exceeded"),

            BuiltinExactArgs {
                name,
                expected,
                got,
            } => {
                if *expected == 1 {
                    write!(f, "{} takes exactly one argument ({} given)", name, got)
                } else {
                    write!(
                        f,
                        "{} takes exactly {} arguments ({} given)",
                        name, expected, got
                    )
                }
            }
            BuiltinAtMostOneArg { name, got } => {
                write!(f, "{} takes at most one argument ({} given)", name, got)
            }
            NoLen(typename) => write!(f, "object of type '{}' has no len()", typename),
            NoAppend(typename) => write!(f, "object of type '{}' has no append()", typename),
            InvalidIntegerLiteral(value) => {
                write!(f, "invalid literal for integer: '{}'", value)
            }
            InputFailed(reason) => write!(f, "could not read input: {}", reason),
        }
    }
}
