use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::statements::{FunctionDef, Prototype},
    errors::errors::{Error, ErrorImpl},
    MK_ERROR,
};

use super::natives;

#[derive(Debug, Clone)]
pub enum Function {
    /// Declared with `extern`, no body yet. Calls resolve to a host
    /// function of the same name, or fail if there is none.
    Extern(Prototype),
    Defined(Rc<FunctionDef>),
}

impl Function {
    pub fn proto(&self) -> &Prototype {
        match self {
            Function::Extern(proto) => proto,
            Function::Defined(def) => &def.proto,
        }
    }

    pub fn arity(&self) -> usize {
        self.proto().arity()
    }
}

/// Every function a session knows about, keyed by name.
#[derive(Debug, Default)]
pub struct SymbolTable {
    functions: HashMap<String, Function>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn arity_of(&self, name: &str) -> Option<usize> {
        self.functions.get(name).map(Function::arity)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Records an `extern`. Repeating a known signature is allowed; changing
    /// its arity is not.
    pub fn declare(&mut self, proto: Prototype) -> Result<(), Error> {
        if let Some(existing) = self.functions.get(&proto.name) {
            return check_arity(&proto, existing.arity());
        }

        if let Some(native) = natives::lookup(&proto.name) {
            check_arity(&proto, native.arity())?;
        }

        self.functions
            .insert(proto.name.clone(), Function::Extern(proto));
        Ok(())
    }

    /// Fails if `def` may not be added: its name already has a body, or an
    /// earlier `extern` disagrees on arity.
    pub fn check_definable(&self, def: &FunctionDef) -> Result<(), Error> {
        match self.functions.get(&def.proto.name) {
            Some(Function::Defined(_)) => Err(MK_ERROR!(
                ErrorImpl::Redefinition {
                    name: def.proto.name.clone()
                },
                def.proto.position
            )),
            Some(Function::Extern(proto)) => check_arity(&def.proto, proto.arity()),
            None => Ok(()),
        }
    }

    /// Stores a definition that has passed `check_definable` and the body check.
    pub fn insert_definition(&mut self, def: FunctionDef) -> Rc<FunctionDef> {
        let def = Rc::new(def);
        self.functions
            .insert(def.proto.name.clone(), Function::Defined(Rc::clone(&def)));
        def
    }
}

fn check_arity(proto: &Prototype, expected: usize) -> Result<(), Error> {
    if proto.arity() == expected {
        Ok(())
    } else {
        Err(MK_ERROR!(
            ErrorImpl::ArgumentCountMismatch {
                name: proto.name.clone(),
                expected,
                received: proto.arity(),
            },
            proto.position
        ))
    }
}
