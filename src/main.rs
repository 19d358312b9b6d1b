use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use companion::{Companion, Config, HistoryStore, voice};

/// Companion - voice chat buddy backed by a local LLM
#[derive(Parser)]
#[command(name = "companion", version, about)]
struct Cli {
    /// Audio file to process
    #[arg(value_name = "AUDIO")]
    audio_file: Option<PathBuf>,

    /// Audio file to process (alternative to the positional argument)
    #[arg(short, long, value_name = "PATH", conflicts_with = "audio_file")]
    audio: Option<PathBuf>,

    /// Delete the conversation history and exit
    #[arg(long)]
    clear_history: bool,

    /// Show conversation history statistics and exit
    #[arg(long)]
    stats: bool,

    /// Delete generated reply audio and exit
    #[arg(long)]
    clear_audio: bool,

    /// Skip speech synthesis for this run
    #[arg(long)]
    no_tts: bool,

    /// Config file (defaults to ~/.config/companion/config.toml)
    #[arg(short, long, env = "COMPANION_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn,companion=info",
        1 => "info,companion=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref());
    if cli.no_tts {
        config.tts.enabled = false;
    }
    tracing::debug!(?config, "loaded configuration");

    if cli.clear_history || cli.stats || cli.clear_audio {
        let history = HistoryStore::new(&config.history_path);
        if cli.clear_history {
            clear_history(&history)?;
        }
        if cli.clear_audio {
            clear_audio(&config.audio_dir)?;
        }
        if cli.stats {
            show_stats(&history);
        }
        return Ok(());
    }

    let Some(audio) = cli.audio.or(cli.audio_file) else {
        anyhow::bail!("no audio file given (usage: companion <AUDIO> or --audio <PATH>)");
    };
    if !audio.is_file() {
        anyhow::bail!("audio file not found: {}", audio.display());
    }

    let companion = Companion::from_config(&config)?;

    tracing::info!(
        audio = %audio.display(),
        model = %config.llm.model,
        "processing recording"
    );

    let exchange = tokio::select! {
        result = companion.process_file(&audio) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted, exchange discarded");
            anyhow::bail!("interrupted");
        }
    };

    println!("{}", exchange.reply);
    if let Some(path) = &exchange.audio {
        tracing::info!(path = %path.display(), "reply audio ready");
    }

    Ok(())
}

fn clear_history(history: &HistoryStore) -> anyhow::Result<()> {
    let removed = history
        .clear()
        .context("failed to clear conversation history")?;
    if removed {
        println!("Conversation history cleared.");
    } else {
        println!("No conversation history to clear.");
    }
    Ok(())
}

fn clear_audio(dir: &Path) -> anyhow::Result<()> {
    let removed = voice::clear_audio(dir)
        .with_context(|| format!("failed to clear audio in {}", dir.display()))?;
    println!("Removed {removed} generated audio file(s).");
    Ok(())
}

fn show_stats(history: &HistoryStore) {
    let stats = history.stats();
    println!("Conversation history: {}", history.path().display());
    println!("  Exchanges:    {}", stats.exchange_count);
    println!("  Messages:     {}", stats.message_count);
    println!(
        "  Last updated: {}",
        stats
            .last_updated
            .map_or_else(|| "never".to_string(), |t| t.to_rfc3339())
    );
    println!("  Size:         {} bytes", stats.byte_size);
}
