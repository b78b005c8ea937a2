use std::{cell::RefCell, fmt::Display, rc::Rc};

use crate::{builtin::Builtin, environment::Environment, error::RuntimeError};

use monkey_parser::ast::{BlockStatement, IdentifierLiteral};

#[derive(Debug, PartialEq)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    Array(Array),
    Function(Function),
    Builtin(Builtin),
    /// Special object to encapsulate a return-ed value while it goes up scopes.
    /// This is never seen by the user.
    ReturnValue(Rc<Object>),
    /// A first-class failure value; checked and propagated like any result
    Error(RuntimeError),
}

impl Object {
    pub fn typename(&self) -> String {
        use Object::*;

        match self {
            Integer(_) => "integer".into(),
            Boolean(_) => "boolean".into(),
            String(_) => "string".into(),
            Null => "null".into(),
            Array(_) => "array".into(),
            Function(_) => "function".into(),
            Builtin(_) => "builtin".into(),
            ReturnValue(obj) => obj.typename(),
            Error(_) => "error".into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Converts the given value to a string (in the format of a code object).
    ///
    /// Use this anywhere a programmer expects to see the code-version of an
    /// object (e.g. in the REPL).
    /// # Examples
    /// ```rust
    /// use monkey_interpreter::object::Object;
    ///
    /// let obj = Object::String("hello world".to_string());
    ///
    /// assert_eq!(obj.to_code_string(), "\"hello world\"");
    /// ```
    pub fn to_code_string(&self) -> String {
        use Object::*;

        match self {
            String(value) => format!("\"{}\"", value),
            value => value.to_string(),
        }
    }
}

impl Display for Object {
    /// toString() form at runtime
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Object::*;

        match self {
            Integer(value) => write!(f, "{}", value),
            Boolean(value) => write!(f, "{}", value),
            String(value) => write!(f, "{}", value),
            Null => write!(f, "null"),
            Array(array) => write!(f, "{}", array),
            Function(func) => write!(f, "{}", func),
            Builtin(builtin) => write!(f, "{}", builtin),
            ReturnValue(obj) => write!(f, "{}", obj),
            Error(error) => write!(f, "ERROR: {}", error),
        }
    }
}

/// Arrays are mutated in place (`append`) and shared by reference, so the
/// element list lives behind a `RefCell` while the `Rc<Object>` wrapper is
/// the identity that bindings share.
#[derive(Debug)]
pub struct Array {
    pub elements: RefCell<Vec<Rc<Object>>>,
}

impl Array {
    pub fn new(elements: Vec<Rc<Object>>) -> Array {
        Array {
            elements: RefCell::new(elements),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Array) -> bool {
        *self.elements.borrow() == *other.elements.borrow()
    }
}

impl Display for Array {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let elements: Vec<String> = self
            .elements
            .borrow()
            .iter()
            .map(|e| e.to_code_string())
            .collect();
        write!(f, "[{}]", elements.join(", "))
    }
}

#[derive(Debug)]
pub struct Function {
    pub parameters: Vec<IdentifierLiteral>,
    /// Shared with the AST literal this function was created from
    pub body: Rc<BlockStatement>,
    /// The environment active at the definition site, held by reference
    pub env: Rc<RefCell<Environment>>,
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();

        write!(f, "fn({}) {}", params.join(", "), self.body)
    }
}

impl PartialEq for Function {
    /// Functions compare by identity: same body, same captured environment
    fn eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.body, &other.body) && Rc::ptr_eq(&self.env, &other.env)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::object::{Array, Object};

    #[test]
    fn test_display() {
        assert_eq!(Object::Integer(42).to_string(), "42");
        assert_eq!(Object::Boolean(true).to_string(), "true");
        assert_eq!(Object::Null.to_string(), "null");
        assert_eq!(Object::String("hi".to_string()).to_string(), "hi");
        assert_eq!(Object::String("hi".to_string()).to_code_string(), "\"hi\"");

        let array = Object::Array(Array::new(vec![
            Rc::new(Object::Integer(1)),
            Rc::new(Object::String("two".to_string())),
        ]));
        assert_eq!(array.to_string(), "[1, \"two\"]");
    }

    #[test]
    fn test_typename() {
        assert_eq!(Object::Integer(1).typename(), "integer");
        assert_eq!(Object::Null.typename(), "null");
        assert_eq!(
            Object::ReturnValue(Rc::new(Object::Boolean(false))).typename(),
            "boolean"
        );
    }
}
