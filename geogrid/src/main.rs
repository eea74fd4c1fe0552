use geogrid::{dump, info, render};
use std::path::PathBuf;
use tracing::Level;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[cfg(not(debug_assertions))]
const DEFAULT_DEBUG_LEVEL: u8 = 1;
#[cfg(debug_assertions)]
const DEFAULT_DEBUG_LEVEL: u8 = 99;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Turn debugging information on
    #[arg(short, long, default_value_t = DEFAULT_DEBUG_LEVEL, action = clap::ArgAction::Count)]
    verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// prints a summary of a raster file
    Info {
        /// The raster file (.asc grid or .xpm pixel map)
        file: PathBuf,
    },

    /// renders a raster file to a PNG image
    Render {
        /// The raster file (.asc grid or .xpm pixel map)
        file: PathBuf,

        /// The output file name
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pixels per cell
        #[arg(short, long, default_value_t = 1)]
        zoom: u32,
    },

    /// writes a raster file as x,y,value lines
    Dump {
        /// The raster file (.asc grid or .xpm pixel map)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_file(true)
        .with_line_number(true)
        .init();

    match cli.command {
        Commands::Info { file } => info(&file),
        Commands::Render { file, output, zoom } => {
            let output = output.unwrap_or_else(|| file.with_extension("png"));
            render(&file, &output, zoom)
        }
        Commands::Dump { file } => dump(&file),
    }
}
