//! Preset validation command

use crate::preset::Preset;
use anyhow::Result;
use std::path::Path;

pub fn run(path: &str, format: &str) -> Result<()> {
    let outcome = Preset::load(Path::new(path));

    let (error, clamped) = match &outcome {
        Ok(preset) => (None, preset.clamped_fields()),
        Err(e) => (Some(e.to_string()), Vec::new()),
    };

    if format == "json" {
        let report = serde_json::json!({
            "preset": path,
            "valid": error.is_none(),
            "error": error,
            "clamped": clamped,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &error {
            Some(e) => println!("{}: invalid\n  {}", path, e),
            None if clamped.is_empty() => println!("{}: ok", path),
            None => {
                println!("{}: ok, with {} clamped value(s)", path, clamped.len());
                for field in &clamped {
                    println!("  {} is out of range and will be clamped", field);
                }
            }
        }
    }

    if error.is_some() {
        std::process::exit(1);
    }
    Ok(())
}
