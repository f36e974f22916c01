//! # Schema Catalog
//!
//! Prints the unified attribute catalog the connector exposes: the built-in
//! provider schemas, merged with any schema files given on the command line
//! in the order they are given.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin schema-catalog
//! cargo run --bin schema-catalog schemas/UserExtension.json
//! cargo run --bin schema-catalog -- --json schemas/UserExtension.json
//! ```
//!
//! ## Output Example
//!
//! ```text
//! __ACCOUNT__ (12 attributes)
//!   __GROUP__            embedded __GROUP__    multi
//!   active               boolean
//!   emails               embedded __ACCOUNT__.emails multi
//!   ...
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: The catalog was printed
//! - `1`: A schema file could not be read or parsed

use pcf_connector::schema::{Catalog, SchemaIntrospector, SchemaResource, ValueType};
use pcf_connector::{ConnectorError, ConnectorResult};
use std::env;
use std::fs;
use std::process;

fn main() {
    let mut json = false;
    let mut files = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => {
                println!("Usage: schema-catalog [--json] [schema.json ...]");
                return;
            }
            _ => files.push(arg),
        }
    }

    let catalog = match build_catalog(&files) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&catalog) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Cannot serialize catalog: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_catalog(&catalog);
    }
}

fn build_catalog(files: &[String]) -> ConnectorResult<Catalog> {
    let mut catalog = SchemaIntrospector::builtin()?;
    let mut loaded = Vec::new();
    for file in files {
        let text = fs::read_to_string(file).map_err(|e| {
            ConnectorError::configuration(format!("cannot read {file}: {e}"))
        })?;
        loaded.push(SchemaResource::from_json(&text)?);
    }
    catalog.extend(SchemaIntrospector::build(loaded.iter()));
    Ok(catalog)
}

fn print_catalog(catalog: &Catalog) {
    for class in catalog.object_classes() {
        let marker = if class.embedded { ", embedded" } else { "" };
        println!("{} ({} attributes{})", class.name, class.attributes.len(), marker);
        for attribute in class.attributes.values() {
            let value_type = match &attribute.value_type {
                ValueType::String => "string".to_string(),
                ValueType::Boolean => "boolean".to_string(),
                ValueType::Integer => "integer".to_string(),
                ValueType::Long => "long".to_string(),
                ValueType::Embedded { object_class } => format!("embedded {object_class}"),
            };
            let mut flags = Vec::new();
            if attribute.multi_valued {
                flags.push("multi");
            }
            if attribute.required {
                flags.push("required");
            }
            if !attribute.createable {
                flags.push("read-only");
            }
            if !attribute.readable {
                flags.push("write-only");
            }
            if !attribute.returned_by_default {
                flags.push("on-request");
            }
            println!("  {:<28} {:<30} {}", attribute.name, value_type, flags.join(" "));
        }
        println!();
    }
    println!("Object classes: {}", catalog.len());
}
