//! Introspection commands: what a source offers, what the remote accepts
//!
//! These are the building blocks for writing a field mapping by hand.

use colored::Colorize;
use serde_json::Value;

use recsync_core::{HttpRemote, RemoteApi, Target};

use crate::context::{Context, target_structure};
use crate::error::{CliError, Result};

/// Sample values shown per field
const SHOWN_SAMPLES: usize = 3;

/// List the collections of the source configured for `target`
pub fn run_collections(ctx: &Context, target: Target) -> Result<()> {
    let config = ctx.load_config()?;
    let structure = target_structure(&config, target)?;

    let names = structure
        .connection_type
        .resolve()?
        .collections(&structure.connection_info)?;

    println!(
        "{} Collections in {} source:",
        "=>".blue().bold(),
        structure.connection_type
    );
    for name in &names {
        println!("   {} {}", "-".dimmed(), name.cyan());
    }
    if names.is_empty() {
        println!("   {} none", "-".dimmed());
    }
    Ok(())
}

/// List the fields of `collection` with a few sample values each
pub fn run_fields(ctx: &Context, target: Target, collection: &str) -> Result<()> {
    let config = ctx.load_config()?;
    let structure = target_structure(&config, target)?;

    let listing = structure
        .connection_type
        .resolve()?
        .fields(&structure.connection_info, collection)?;

    println!("{} Fields of {}:", "=>".blue().bold(), collection.cyan());
    for name in &listing.names {
        let samples: Vec<String> = listing
            .samples
            .get(name)
            .map(|values| {
                values
                    .iter()
                    .take(SHOWN_SAMPLES)
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();
        println!(
            "   {} {} {}",
            "-".dimmed(),
            name.cyan(),
            format!("e.g. {}", samples.join(", ")).dimmed()
        );
    }
    Ok(())
}

/// Show the remote schema for `target`
pub fn run_schema(ctx: &Context, target: Target) -> Result<()> {
    let config = ctx.load_config()?;
    let remote = HttpRemote::healthy(&config.remote).map_err(CliError::RemoteUnavailable)?;

    let schema = remote.field_schema(target)?;

    println!("{} Fields accepted for {}:", "=>".blue().bold(), target.to_string().cyan());
    for (name, spec) in &schema {
        if spec.get("read_only").and_then(Value::as_bool).unwrap_or(false) {
            continue;
        }
        let field_type = spec.get("type").and_then(Value::as_str).unwrap_or("?");
        let mut details = vec![field_type.to_string()];
        if spec.get("required").and_then(Value::as_bool).unwrap_or(false) {
            details.push("required".to_string());
        }
        if let Some(max) = spec.get("max_length").and_then(Value::as_u64) {
            details.push(format!("max {max}"));
        }
        println!(
            "   {} {} {}",
            "-".dimmed(),
            name.cyan(),
            format!("({})", details.join(", ")).dimmed()
        );
    }
    Ok(())
}
