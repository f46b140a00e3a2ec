use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cumulus::config;
use cumulus::storage::{Content, Storage, StorageManager};

/// Read buffer for `get` / 下载分块大小
const CHUNK_SIZE: usize = 4 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "cumulus")]
#[command(about = "Rackspace Cloud Files storage from the command line")]
struct Args {
    /// Config file (defaults to ./cumulus.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Container, overrides the config file
    #[arg(long)]
    container: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List objects under a path
    Ls {
        #[arg(default_value = "")]
        path: String,
        /// Reconstruct one level of directories
        #[arg(long)]
        full: bool,
    },
    /// Upload a local file
    Put {
        local: PathBuf,
        /// Object name (defaults to the file name)
        name: Option<String>,
        /// Pick a free name instead of overwriting
        #[arg(long)]
        keep: bool,
    },
    /// Print (part of) an object to stdout
    Cat {
        name: String,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long)]
        length: Option<usize>,
    },
    /// Download an object to a local file
    Get { name: String, dest: PathBuf },
    /// Delete an object (missing objects are fine)
    Rm { name: String },
    /// Check whether an object exists
    Exists { name: String },
    /// Print object size in bytes
    Size { name: String },
    /// Print the public URL of an object
    Url { name: String },
    /// Print version and build time
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cumulus=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if let Command::Version = args.command {
        println!("cumulus {} (built {})", env!("CARGO_PKG_VERSION"), env!("BUILD_TIME"));
        return Ok(());
    }

    // Load configuration / 加载配置
    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let settings = config::load_config(&config_path).map_err(|e| anyhow!(e))?;

    let manager = StorageManager::new();
    cumulus::register_storage_drivers(&manager, &settings).await?;

    let options = match args.container {
        Some(ref container) => json!({ "container": container }),
        None => serde_json::Value::Null,
    };
    let storage = manager.create_storage("default", "cloudfiles", options).await?;

    run(storage.as_ref(), args.command).await
}

async fn run(storage: &dyn Storage, command: Command) -> Result<()> {
    match command {
        Command::Ls { path, full } => {
            let listing = if full {
                storage.full_listdir(&path).await?
            } else {
                storage.listdir(&path).await?
            };
            for dir in &listing.dirs {
                println!("{}", dir);
            }
            for file in &listing.files {
                println!("{}", file);
            }
        }
        Command::Put { local, name, keep } => {
            let name = match name {
                Some(n) => n,
                None => local
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.to_string())
                    .ok_or_else(|| anyhow!("Cannot derive object name from {:?}", local))?,
            };
            let content = Content::from_path(&local)
                .await
                .with_context(|| format!("Failed to read {:?}", local))?;
            let saved = if keep {
                storage.save_available(&name, content).await?
            } else {
                storage.save(&name, content).await?
            };
            tracing::info!("Uploaded {:?} as {}", local, saved);
            println!("{}", saved);
        }
        Command::Cat { name, offset, length } => {
            let mut file = storage.open(&name);
            file.seek(offset);
            let data = file.read(length).await?;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&data).await?;
            stdout.flush().await?;
        }
        Command::Get { name, dest } => {
            let mut file = storage.open(&name);
            let total = file.size().await?;
            let mut out = tokio::fs::File::create(&dest)
                .await
                .with_context(|| format!("Failed to create {:?}", dest))?;
            while file.tell() < total {
                let chunk = file.read(Some(CHUNK_SIZE)).await?;
                if chunk.is_empty() {
                    break;
                }
                out.write_all(&chunk).await?;
            }
            out.flush().await?;
            file.close();
            tracing::info!("Downloaded {} ({} bytes) to {:?}", name, total, dest);
        }
        Command::Rm { name } => {
            storage.delete(&name).await?;
        }
        Command::Exists { name } => {
            let exists = storage.exists(&name).await?;
            println!("{}", exists);
            if !exists {
                std::process::exit(1);
            }
        }
        Command::Size { name } => {
            println!("{}", storage.size(&name).await?);
        }
        Command::Url { name } => {
            println!("{}", storage.url(&name).await?);
        }
        Command::Version => {}
    }
    Ok(())
}
