use std::fmt;
use thiserror::Error;

pub const DEFAULT_CONTRACT_NAME: &str = "Contract";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractModel {
    pub name: String,
    pub structs: Vec<StructDecl>,
    pub events: Vec<EventDecl>,
    pub functions: Vec<FunctionDecl>,
    pub storage_vars: Vec<StorageVarDecl>,
}

impl Default for ContractModel {
    fn default() -> Self {
        ContractModel {
            name: DEFAULT_CONTRACT_NAME.to_string(),
            structs: Vec::new(),
            events: Vec::new(),
            functions: Vec::new(),
            storage_vars: Vec::new(),
        }
    }
}

impl ContractModel {
    pub fn constructor(&self) -> Option<&FunctionDecl> {
        self.functions.iter().find(|f| f.is_constructor())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub field_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDecl {
    pub name: String,
    pub params: Vec<EventParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventParameter {
    pub name: String,
    pub param_type: String,
    pub indexed: bool,
}

/// A function header. An empty `name` marks the contract initializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Parameter>,
    pub is_view: bool,
    pub return_type: Option<String>,
}

impl FunctionDecl {
    pub fn is_constructor(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub param_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageVarDecl {
    pub name: String,
    pub var_type: String,
}

/// Why a source fragment did not make it into the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("source could not be tokenized: {0}")]
    Unlexable(String),
    #[error("expected {expected} after `{after}`")]
    MalformedHeader { expected: &'static str, after: String },
    #[error("unbalanced `{0}`")]
    UnterminatedBlock(&'static str),
    #[error("struct field needs a type and a name")]
    MalformedField,
    #[error("parameter needs a type and a name")]
    MalformedParameter,
    #[error("empty parameter")]
    EmptyParameter,
    #[error("declaration needs a type and a name")]
    MalformedDeclaration,
    #[error("`{0}` is not a recognized storage type")]
    UnrecognizedStorageType(String),
    #[error("constant `{0}` is not a storage variable")]
    ConstantVariable(String),
    #[error("function `{0}` has no body")]
    MissingBody(String),
    #[error("`{0}` is already declared")]
    DuplicateDeclaration(String),
    #[error("only the first constructor is kept")]
    DuplicateConstructor,
    #[error("{0} declarations are not supported")]
    Unsupported(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub fragment: String,
    pub reason: SkipReason,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fragment.is_empty() {
            write!(f, "line {}: skipped: {}", self.line, self.reason)
        } else {
            write!(f, "line {}: skipped `{}`: {}", self.line, self.fragment, self.reason)
        }
    }
}

/// The extractor's result: everything recognized, plus everything that was not.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    pub contract: ContractModel,
    pub diagnostics: Vec<Diagnostic>,
}
