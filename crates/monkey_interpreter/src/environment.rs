use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::object::Object;

/// A single scope: a name table plus an optional handle to the enclosing
/// scope. Closures keep the handle of their defining scope alive.
#[derive(Debug)]
pub struct Environment {
    store: HashMap<String, Rc<Object>>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            store: HashMap::new(),
            outer: None,
        }
    }

    /// Create a new environment that is enclosed by a given outer environment
    pub fn new_enclosed(outer: Rc<RefCell<Environment>>) -> Self {
        Environment {
            store: HashMap::new(),
            outer: Some(outer),
        }
    }

    /// Resolve a name, walking the scope chain outward
    pub fn get(&self, name: &str) -> Option<Rc<Object>> {
        match self.store.get(name) {
            Some(obj) => Some(Rc::clone(obj)),
            None => match self.outer {
                Some(ref outer) => outer.borrow().get(name),
                None => None,
            },
        }
    }

    /// Bind a name in this scope, shadowing any outer binding
    pub fn set(&mut self, name: String, value: Rc<Object>) {
        self.store.insert(name, value);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use crate::environment::Environment;
    use crate::object::Object;

    #[test]
    fn test_get_set() {
        let mut env = Environment::new();
        assert!(env.get("a").is_none());

        env.set("a".to_string(), Rc::new(Object::Integer(1)));
        assert_eq!(env.get("a"), Some(Rc::new(Object::Integer(1))));

        env.set("a".to_string(), Rc::new(Object::Integer(2)));
        assert_eq!(env.get("a"), Some(Rc::new(Object::Integer(2))));
    }

    #[test]
    fn test_chain_lookup() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        outer
            .borrow_mut()
            .set("a".to_string(), Rc::new(Object::Integer(1)));
        outer
            .borrow_mut()
            .set("b".to_string(), Rc::new(Object::Integer(2)));

        let mut inner = Environment::new_enclosed(Rc::clone(&outer));
        inner.set("b".to_string(), Rc::new(Object::Integer(20)));

        // Inner binding shadows, outer still reachable
        assert_eq!(inner.get("a"), Some(Rc::new(Object::Integer(1))));
        assert_eq!(inner.get("b"), Some(Rc::new(Object::Integer(20))));
        assert_eq!(outer.borrow().get("b"), Some(Rc::new(Object::Integer(2))));

        // Bindings added to the outer scope later are visible through
        // the chain (capture by reference, not by copy)
        outer
            .borrow_mut()
            .set("c".to_string(), Rc::new(Object::Integer(3)));
        assert_eq!(inner.get("c"), Some(Rc::new(Object::Integer(3))));
    }
}
