//! blobstate: inspect and bootstrap the layout of a local state directory.

use anyhow::Context;
use blobstate_layout::{KeyLayout, ResolvedStore, StoreConfig, META_KEY};
use blobstate_store::ProcessEnv;
use blobstate_store_fs::FsContainer;
use blobstate_utils::LogFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blobstate", about = "Inspect and bootstrap blobstate container layouts")]
struct Cli {
    /// Root directory of the state container.
    #[arg(long, default_value = ".", env = "BLOBSTATE_ROOT")]
    root: PathBuf,

    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BLOBSTATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BLOBSTATE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Give up on layout resolution after this many milliseconds.
    #[arg(long, env = "BLOBSTATE_RESOLVE_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the resolved layout version and how it was decided.
    Resolve,
    /// Record the resolved layout in the container's metadata file.
    Init,
    /// Print the keys a stack uses under the resolved layout.
    Key {
        #[arg(long, default_value = "")]
        project: String,
        #[arg(long)]
        stack: String,
    },
}

fn layout_name(store: &ResolvedStore<FsContainer>) -> String {
    match store.layout() {
        Ok(KeyLayout::Legacy) => "legacy".to_string(),
        Ok(KeyLayout::Project) => "project".to_string(),
        Err(e) => format!("unknown ({e})"),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => StoreConfig::from_toml_file(&path.to_string_lossy())
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StoreConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if cli.timeout_ms.is_some() {
        config.resolve_timeout_ms = cli.timeout_ms;
    }

    let format: LogFormat = config
        .log_format
        .parse()
        .map_err(anyhow::Error::msg)?;
    blobstate_utils::init_logging(format, &config.log_level);

    let container = FsContainer::open(&cli.root)
        .with_context(|| format!("opening {}", cli.root.display()))?;
    let store = ResolvedStore::open_with(container, &ProcessEnv, &config)
        .with_context(|| format!("resolving layout of {}", cli.root.display()))?;

    match cli.command {
        Command::Resolve => {
            println!("version: {}", store.version());
            println!("source: {}", store.source());
            println!("layout: {}", layout_name(&store));
        }
        Command::Init => {
            store.persist_meta()?;
            if store.is_legacy() {
                println!("legacy layout: no metadata written");
            } else {
                println!("wrote {META_KEY} (version {})", store.version());
            }
        }
        Command::Key { project, stack } => {
            let layout = store.layout()?;
            println!("checkpoint: {}", layout.checkpoint_key(&project, &stack)?);
            println!("history: {}", layout.history_prefix(&project, &stack)?);
            println!("backups: {}", layout.backup_prefix(&project, &stack)?);
        }
    }

    tracing::debug!("done");
    Ok(())
}
