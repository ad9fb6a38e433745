use crate::config::{load_config, merge_inline_config};
use crate::ir::parse_diagram;
use crate::layout::{layout_diagram, place_diagram};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use anyhow::Result;
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sflayout", version, about = "Stock-and-flow diagram layout and edge routing")]
pub struct Args {
    /// Input diagram (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout JSON. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file (`layout` / `routing` sections)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Place nodes only; skip edge routing
    #[arg(long = "layout-only")]
    pub layout_only: bool,

    /// Emit single-line JSON
    #[arg(long = "compact")]
    pub compact: bool,
}

pub fn run() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let diagram = parse_diagram(&input)?;
    if let Some(inline) = &diagram.config {
        config = merge_inline_config(config, inline)?;
    }

    let layout = if args.layout_only {
        place_diagram(&diagram, &config)?
    } else {
        layout_diagram(&diagram, &config)?
    };
    tracing::info!(
        nodes = layout.placements.len(),
        routes = layout.routes.len(),
        "diagram laid out"
    );

    let pretty = !args.compact;
    match args.output.as_deref() {
        Some(path) => write_layout_dump(path, &layout, pretty)?,
        None => {
            let json = LayoutDump::from_layout(&layout).to_json(pretty)?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
