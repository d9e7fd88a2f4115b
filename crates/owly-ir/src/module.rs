//! IR modules (§3 "IRModule"): the compilation unit that owns functions,
//! top-level globals, and promoted constants.

use owly_core::TypeId;
use serde::{Deserialize, Serialize};

use crate::function::IRFunction;
use crate::value::IRValue;

/// A whole translation unit's worth of IR (§3, §4.4 "create_module").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IRModule {
    pub source_file: String,
    pub functions: Vec<IRFunction>,
    /// Top-level variable declarations (§4.5 "program" contract).
    pub globals: Vec<IRValue>,
    /// Promoted string literals and other module-level constants.
    pub constants: Vec<IRValue>,
}

impl IRModule {
    pub fn new(source_file: impl Into<String>) -> Self {
        IRModule {
            source_file: source_file.into(),
            functions: Vec::new(),
            globals: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Adopts a fully-lowered, standalone function into the module. Kept as
    /// a separate step from [`IRFunction::new`] so a function is always
    /// built to completion before it becomes part of the module's list
    /// (see `function.rs`'s module doc).
    pub fn add_function(&mut self, func: IRFunction) {
        self.functions.push(func);
    }

    pub fn add_global(&mut self, global: IRValue) {
        self.globals.push(global);
    }

    pub fn const_int(&mut self, value: i64, ty: Option<TypeId>) -> IRValue {
        let v = IRValue::const_int(value, ty);
        self.constants.push(v.clone());
        v
    }

    pub fn const_float(&mut self, value: f64, ty: Option<TypeId>) -> IRValue {
        let v = IRValue::const_float(value, ty);
        self.constants.push(v.clone());
        v
    }

    /// Promotes a string literal to a module-global constant, naming it
    /// `.str.<n>` by counting off `self.globals.len()` so names stay
    /// distinct across the whole module rather than colliding whenever two
    /// string literals are promoted from different functions.
    pub fn const_string(&mut self, value: impl Into<String>) -> IRValue {
        let name = format!(".str.{}", self.globals.len());
        let v = IRValue::const_string(name, value);
        self.globals.push(v.clone());
        v
    }

    pub fn function(&self, name: &str) -> Option<&IRFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_function_appends() {
        let mut module = IRModule::new("a.owly");
        module.add_function(IRFunction::new("main", TypeId::INT, vec![]));
        assert_eq!(module.functions.len(), 1);
        assert!(module.function("main").is_some());
    }

    #[test]
    fn const_string_names_are_distinct_across_the_module() {
        let mut module = IRModule::new("a.owly");
        let a = module.const_string("hello");
        let b = module.const_string("world");
        assert_ne!(a.name, b.name);
        assert_eq!(a.name.as_deref(), Some(".str.0"));
        assert_eq!(b.name.as_deref(), Some(".str.1"));
    }

    #[test]
    fn const_int_is_tracked_in_constants() {
        let mut module = IRModule::new("a.owly");
        module.const_int(42, Some(TypeId::INT));
        assert_eq!(module.constants.len(), 1);
    }
}
