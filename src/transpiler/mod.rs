pub mod ast;
pub mod mapper;

use crate::{generator, parser};
use ast::Diagnostic;
use mapper::TypeRegistry;

/// Generated source together with every fragment that was left out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub code: String,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct Transpiler {
    types: TypeRegistry,
}

impl Transpiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(types: TypeRegistry) -> Self {
        Transpiler { types }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    pub fn convert(&self, source: &str) -> Conversion {
        let extraction = parser::extract(source, &self.types);
        let code = generator::generate(&extraction.contract, &self.types);
        Conversion {
            code,
            diagnostics: extraction.diagnostics,
        }
    }
}

/// Converts Solidity source to a MultiversX skeleton with the default type mappings.
pub fn convert(source: &str) -> String {
    Transpiler::new().convert(source).code
}
