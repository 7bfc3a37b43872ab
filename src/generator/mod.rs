use crate::transpiler::ast::*;
use crate::transpiler::mapper::{to_snake_case, TypeRegistry, STRUCT_API};

const HEADER: &str = "#![no_std]\n\nuse multiversx_sc::imports::*;\nuse multiversx_sc::derive_imports::*;\n";
const STRUCT_DERIVES: &str =
    "#[derive(TypeAbi, TopEncode, TopDecode, NestedEncode, NestedDecode, ManagedVecItem)]";
const INDENT: &str = "    ";
const BODY_PLACEHOLDER: &str = "// TODO: body";

/// Renders the MultiversX contract skeleton for `contract`.
///
/// Output is a pure function of the model and the registry.
pub fn generate(contract: &ContractModel, types: &TypeRegistry) -> String {
    let mut output = String::new();

    // Module header and imports
    output.push_str(HEADER);
    output.push('\n');

    // Generate structs ahead of the contract trait
    for decl in &contract.structs {
        output.push_str(&generate_struct(decl, types));
        output.push('\n');
    }

    // Generate contract trait
    output.push_str("#[multiversx_sc::contract]\n");
    output.push_str(&format!("pub trait {} {{\n", contract.name));

    let mut members = Vec::new();

    // Generate storage mappers
    for var in &contract.storage_vars {
        members.push(generate_storage(var, types));
    }

    // Generate events
    for event in &contract.events {
        members.push(generate_event(event, types));
    }

    // Declared constructor, or an empty init
    members.push(match contract.constructor() {
        Some(constructor) => generate_init(constructor, types),
        None => format!("{INDENT}#[init]\n{INDENT}fn init(&self) {{}}\n"),
    });

    // Generate endpoints and views
    for func in contract.functions.iter().filter(|f| !f.is_constructor()) {
        members.push(generate_function(func, types));
    }

    output.push_str(&members.join("\n"));
    output.push_str("}\n");
    output
}

fn generate_struct(decl: &StructDecl, types: &TypeRegistry) -> String {
    let fields: Vec<(String, String)> = decl
        .fields
        .iter()
        .map(|f| (f.name.clone(), types.map_field_type(&f.field_type)))
        .collect();

    // A type parameter nothing refers to does not compile
    let generics = if fields.iter().any(|(_, t)| t.contains(STRUCT_API)) {
        "<M: ManagedTypeApi>"
    } else {
        ""
    };

    let mut output = String::new();
    output.push_str(STRUCT_DERIVES);
    output.push('\n');

    if fields.is_empty() {
        output.push_str(&format!("pub struct {}{} {{}}\n", decl.name, generics));
        return output;
    }

    output.push_str(&format!("pub struct {}{} {{\n", decl.name, generics));
    for (name, field_type) in &fields {
        output.push_str(&format!("{INDENT}pub {}: {},\n", name, field_type));
    }
    output.push_str("}\n");
    output
}

fn generate_storage(var: &StorageVarDecl, types: &TypeRegistry) -> String {
    let mut output = String::new();
    output.push_str(&format!("{INDENT}#[storage_mapper(\"{}\")]\n", var.name));
    output.push_str(&format!(
        "{INDENT}fn {}(&self) -> SingleValueMapper<{}>;\n",
        to_snake_case(&var.name),
        types.map_type(&var.var_type)
    ));
    output
}

fn generate_event(event: &EventDecl, types: &TypeRegistry) -> String {
    let params: Vec<String> = event
        .params
        .iter()
        .map(|p| {
            let marker = if p.indexed { "#[indexed] " } else { "" };
            format!("{}{}: {}", marker, p.name, types.map_type(&p.param_type))
        })
        .collect();

    let mut output = String::new();
    output.push_str(&format!("{INDENT}#[event(\"{}\")]\n", event.name));
    output.push_str(&format!(
        "{INDENT}fn {}_event({});\n",
        to_snake_case(&event.name),
        receiver_and(&params)
    ));
    output
}

fn generate_init(constructor: &FunctionDecl, types: &TypeRegistry) -> String {
    let mut output = format!("{INDENT}#[init]\n");
    output.push_str(&signature("init", &constructor.params, None, types));
    output
}

fn generate_function(func: &FunctionDecl, types: &TypeRegistry) -> String {
    let mut output = if func.is_view {
        format!("{INDENT}#[view({})]\n", func.name)
    } else {
        format!("{INDENT}#[endpoint]\n")
    };
    output.push_str(&signature(
        &to_snake_case(&func.name),
        &func.params,
        func.return_type.as_deref(),
        types,
    ));
    output
}

/// A method with a placeholder body.
fn signature(name: &str, params: &[Parameter], return_type: Option<&str>, types: &TypeRegistry) -> String {
    let params: Vec<String> = params
        .iter()
        .map(|p| format!("{}: {}", p.name, types.map_type(&p.param_type)))
        .collect();
    let returns = return_type
        .map(|t| format!(" -> {}", types.map_type(t)))
        .unwrap_or_default();

    format!(
        "{INDENT}fn {}({}){} {{\n{INDENT}{INDENT}{BODY_PLACEHOLDER}\n{INDENT}}}\n",
        name,
        receiver_and(&params),
        returns
    )
}

fn receiver_and(params: &[String]) -> String {
    let mut all = vec!["&self".to_string()];
    all.extend(params.iter().cloned());
    all.join(", ")
}
