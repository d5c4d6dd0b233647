use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use demo::Demo;
use tools::instruction_summary;

/// Print the message and instruction structure of a demo file.
#[derive(Parser)]
#[command(name = "dump_info", version, about = "Inspect a dm_26 demo recording")]
struct Cli {
    /// Path to the demo file.
    demo: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut demo = Demo::new();
    if !demo.open(&cli.demo, true) {
        bail!("failed to open demo file: {}", cli.demo.display());
    }

    println!("Loaded: {}", cli.demo.display());
    println!("Messages: {}", demo.message_count());
    println!("Maps: {}", demo.maps_count());

    for map in 0..demo.maps_count() {
        let restart = if demo.is_map_restart(map) { " (restart)" } else { "" };
        println!(
            "Map #{map}: {}{restart} start={} end={}",
            demo.map_name(map).unwrap_or("?"),
            demo.map_start_time(map).map_or("?".to_string(), |t| t.to_string()),
            demo.map_end_time(map).map_or("?".to_string(), |t| t.to_string()),
        );
    }

    for index in 0..demo.message_count() {
        let sequence = demo.sequence(index).unwrap_or(0);
        let Some(instructions) = demo.message(index).map(<[_]>::to_vec) else {
            continue;
        };
        println!(
            "Message #{index} (seq={sequence}, instr={})",
            instructions.len()
        );
        for instruction in &instructions {
            println!("  {}", instruction_summary(instruction));
        }
    }

    demo.close();
    Ok(())
}
