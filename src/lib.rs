//! Solidity to MultiversX contract skeleton transpiler.
//!
//! Declarations (storage, structs, events, function headers) are carried over;
//! function bodies become placeholders.

pub mod generator;
pub mod parser;
pub mod transpiler;


pub use transpiler::ast::{ContractModel, Diagnostic, Extraction, SkipReason};
pub use transpiler::mapper::{to_snake_case, TypeRegistry};
pub use transpiler::{convert, Conversion, Transpiler};
