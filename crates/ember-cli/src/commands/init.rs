//! Preset scaffolding command

use crate::preset::Preset;
use anyhow::Result;
use std::fs;
use std::path::Path;

pub fn run(path: &str, force: bool) -> Result<()> {
    let target = Path::new(path);

    if target.exists() && !force {
        anyhow::bail!("'{}' already exists (use --force to overwrite)", path);
    }

    let body = Preset::default().to_toml_string()?;
    fs::write(target, format!("# Ember particle preset\n\n{body}"))?;

    println!("Wrote default preset to {}", path);
    println!("Run it with: ember run {}", path);
    Ok(())
}
