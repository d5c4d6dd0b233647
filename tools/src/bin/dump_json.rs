use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use demo::Demo;
use tools::demo_json;

/// Export a demo's instruction stream as JSON.
#[derive(Parser)]
#[command(name = "dump_json", version, about = "Export a dm_26 demo to JSON")]
struct Cli {
    /// Path to the input demo file.
    input: PathBuf,
    /// Path to the JSON output file.
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut demo = Demo::new();
    if !demo.open(&cli.input, true) {
        bail!("failed to open demo file: {}", cli.input.display());
    }

    let value = demo_json(&mut demo);
    let rendered = serde_json::to_string_pretty(&value).context("serialize json")?;
    fs::write(&cli.output, rendered)
        .with_context(|| format!("write json to {}", cli.output.display()))?;

    println!("Exported demo JSON to {}", cli.output.display());
    Ok(())
}
