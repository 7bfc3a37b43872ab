use anyhow::{anyhow, bail, Context, Result};
use clap::{App, Arg};
use sol2mvx::{Conversion, Transpiler};
use std::fs;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let matches = App::new("sol2mvx")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Converts Solidity smart contracts to MultiversX contract skeletons")
        .arg(
            Arg::with_name("INPUT")
                .help("Input Solidity file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .help("Output Rust file, defaults to INPUT with an .rs extension")
                .index(2),
        )
        .arg(
            Arg::with_name("map-type")
                .short("t")
                .long("map-type")
                .value_name("SOLIDITY=RUST")
                .help("Adds or overrides a type mapping, e.g. uint64=u64")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Prints every declaration that was skipped"),
        )
        .arg(
            Arg::with_name("strict")
                .long("strict")
                .help("Fails when any declaration was skipped"),
        )
        .get_matches();

    let input = PathBuf::from(
        matches
            .value_of("INPUT")
            .context("Input file not specified")?,
    );
    let output = matches
        .value_of("OUTPUT")
        .map(PathBuf::from)
        .unwrap_or_else(|| input.with_extension("rs"));
    let verbose = matches.is_present("verbose");

    // Extend the default type mappings
    let mut transpiler = Transpiler::new();
    for mapping in matches.values_of("map-type").into_iter().flatten() {
        let (solidity_type, rust_type) = parse_type_mapping(mapping)?;
        transpiler.types_mut().register(solidity_type, rust_type);
    }

    if verbose {
        for (solidity_type, rust_type) in transpiler.types().iter() {
            eprintln!("note: mapping {} => {}", solidity_type, rust_type);
        }
    }

    // Read and convert the input file
    let conversion = transpile(&transpiler, &input)?;

    // Report skipped declarations
    if verbose {
        for diagnostic in &conversion.diagnostics {
            eprintln!("warning: {}: {}", input.display(), diagnostic);
        }
    } else if !conversion.diagnostics.is_empty() {
        eprintln!(
            "warning: {} declaration(s) skipped, rerun with --verbose for details",
            conversion.diagnostics.len()
        );
    }

    // Nothing is written when strict mode rejects the conversion
    if matches.is_present("strict") && !conversion.diagnostics.is_empty() {
        bail!(
            "{} declaration(s) could not be converted",
            conversion.diagnostics.len()
        );
    }

    // Write output file
    fs::write(&output, &conversion.code)
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;

    println!("Wrote {}", output.display());
    Ok(())
}

fn transpile(transpiler: &Transpiler, input: &Path) -> Result<Conversion> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;

    Ok(transpiler.convert(&source))
}

fn parse_type_mapping(mapping: &str) -> Result<(&str, &str)> {
    let (solidity_type, rust_type) = mapping
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid type mapping `{}`, expected SOLIDITY=RUST", mapping))?;

    if solidity_type.trim().is_empty() || rust_type.trim().is_empty() {
        bail!("Invalid type mapping `{}`, both sides must be non-empty", mapping);
    }
    Ok((solidity_type, rust_type))
}
