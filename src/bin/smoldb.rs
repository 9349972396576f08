//! SmolDB CLI
//!
//! Inspects and edits a store file from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use smoldb::codec;
use smoldb::{SmolError, Store, Value, ValueKind};
use tracing_subscriber::{fmt, EnvFilter};

/// SmolDB CLI
#[derive(Parser, Debug)]
#[command(name = "smoldb")]
#[command(about = "Inspect and edit a SmolDB store file")]
#[command(version)]
struct Args {
    /// Store file
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty store file (overwrites)
    Init {
        /// Compress the file at this zlib level (0-9)
        #[arg(short, long)]
        level: Option<u32>,
    },

    /// Add a new key
    Add {
        key: String,

        /// Literal: null, true/false, integer, float, otherwise text
        value: String,
    },

    /// Replace the value of an existing key
    Set {
        key: String,

        /// Literal: null, true/false, integer, float, otherwise text
        value: String,
    },

    /// Print a value
    Get { key: String },

    /// Delete a key
    Del { key: String },

    /// List entries in insertion order
    List {
        /// Only entries of this kind (null, bool, int, float, text, bytes, list, map)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Compress future saves at the given level and rewrite the file
    Compress {
        #[arg(short, long, default_value = "6")]
        level: u32,
    },

    /// Rewrite the file uncompressed
    Decompress,

    /// Show the file header and entry count
    Inspect,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,smoldb=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> smoldb::Result<()> {
    match args.command {
        Commands::Init { level } => {
            let mut store = Store::create(&args.file);
            if let Some(level) = level {
                store.enable_compression(level);
            }
            store.save()?;
            tracing::info!("Created {}", args.file.display());
        }
        Commands::Add { key, value } => {
            let mut store = Store::load(&args.file)?;
            store.add(key, Value::parse_literal(&value))?;
            store.save_to(&args.file)?;
        }
        Commands::Set { key, value } => {
            let mut store = Store::load(&args.file)?;
            store.set(&key, Value::parse_literal(&value))?;
            store.save_to(&args.file)?;
        }
        Commands::Get { key } => {
            let store = Store::load(&args.file)?;
            println!("{}", store.get(&key)?.value());
        }
        Commands::Del { key } => {
            let mut store = Store::load(&args.file)?;
            store.delete(&key)?;
            store.save_to(&args.file)?;
        }
        Commands::List { kind } => {
            let store = Store::load(&args.file)?;
            let kind = kind.as_deref().map(parse_kind).transpose()?;
            for entry in store.iter() {
                if kind.map_or(true, |k| entry.value().kind() == k) {
                    println!("{}\t{}\t{}", entry.key(), entry.value().kind(), entry.value());
                }
            }
        }
        Commands::Compress { level } => {
            let mut store = Store::load(&args.file)?;
            store.enable_compression(level);
            store.save_to(&args.file)?;
        }
        Commands::Decompress => {
            let mut store = Store::load(&args.file)?;
            store.disable_compression();
            store.save_to(&args.file)?;
        }
        Commands::Inspect => {
            let header = codec::read_header(&args.file)?;
            let store = Store::load(&args.file)?;
            println!("format version: {}", header.version());
            if header.is_compressed() {
                println!("compression:    zlib level {}", header.compression().level);
            } else {
                println!("compression:    none");
            }
            println!("stored name:    {}", store.filename().display());
            println!("entries:        {}", store.len());
        }
    }
    Ok(())
}

fn parse_kind(name: &str) -> smoldb::Result<ValueKind> {
    ValueKind::from_name(name)
        .ok_or_else(|| SmolError::Config(format!("unknown kind: {}", name)))
}
