//! `planproof-map`: map a layout JSON file to cited fields.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use planproof_lib::config::{self, MapperConfig};
use planproof_lib::pipeline::extraction::{build_extraction, load_layout};
use planproof_lib::pipeline::mapping::map_fields;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "planproof-map", version)]
#[command(about = "Map planning-document layout blocks to fields with confidences and evidence")]
struct Args {
    /// Layout JSON produced by the layout-analysis backend
    layout: PathBuf,

    /// Mapper config JSON; omitted keys keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the full extraction (blocks, tables, general evidence index)
    #[arg(long)]
    full: bool,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    planproof_lib::init_tracing();
    let args = Args::parse();

    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let mapper_config = match &args.config {
        Some(path) => MapperConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MapperConfig::default(),
    };

    let mut layout = load_layout(&args.layout)
        .with_context(|| format!("Failed to read layout {}", args.layout.display()))?;

    if args.full {
        print_json(&build_extraction(layout, &mapper_config), args.compact)
    } else {
        layout.assign_block_indices();
        print_json(&map_fields(&layout, &mapper_config), args.compact)
    }
}
