mod alignment;
mod config;
mod storage;
mod suno;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use alignment::{AlignedWord, LyricLine};
use suno::api::TimestampedLyricsResponse;

#[derive(Debug, Parser)]
#[command(name = "melodia", version, about = "Convert word-aligned song lyrics into timed display lines")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert an aligned-words JSON file and print the display lines.
    Convert {
        /// Word array or full API response; "-" reads stdin.
        input: PathBuf,
        /// Reject corrupt word timing instead of warning.
        #[arg(long)]
        strict: bool,
        /// Print compact JSON instead of pretty.
        #[arg(long)]
        compact: bool,
    },
    /// Fetch timestamped lyrics for a variant, convert, persist and print.
    Fetch {
        task_id: String,
        audio_id: String,
        #[arg(long)]
        strict: bool,
    },
    /// Re-run the conversion from the cached raw response, without refetching.
    Reconvert {
        variant_id: String,
        #[arg(long)]
        strict: bool,
    },
    /// Dump the raw timestamped-lyrics JSON to stdout.
    FetchJson {
        task_id: String,
        audio_id: String,
    },
    /// Convert a file and persist the lines under a variant id.
    Import {
        variant_id: String,
        input: PathBuf,
        #[arg(long)]
        strict: bool,
    },
    /// Print the stored display lines for a variant.
    Show {
        variant_id: String,
    },
    /// Print the stored line under the playhead, if any.
    Active {
        variant_id: String,
        position_ms: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;

    match cli.command {
        Command::Convert {
            input,
            strict,
            compact,
        } => {
            let words = read_words(&input)?;
            let lines = convert(&cfg, &words, strict)?;
            print_lines(&lines, compact)?;
        }
        Command::Fetch {
            task_id,
            audio_id,
            strict,
        } => {
            let client = make_client(&cfg);
            let raw = client.get_timestamped_lyrics_raw(&task_id, &audio_id).await?;
            let store = open_storage(&cfg)?;
            store.cache_alignment(&audio_id, &serde_json::to_string(&raw)?, now_unix())?;

            let parsed: TimestampedLyricsResponse =
                serde_json::from_value(raw).context("decode timestamped lyrics response")?;
            let data = parsed.into_data()?;
            let lines = convert(&cfg, &data.aligned_words, strict)?;
            store.save_lines(&audio_id, &serde_json::to_string(&lines)?, now_unix())?;
            print_lines(&lines, false)?;
        }
        Command::Reconvert { variant_id, strict } => {
            let store = open_storage(&cfg)?;
            let raw = store
                .get_cached_alignment(&variant_id)?
                .with_context(|| format!("no cached alignment for {variant_id}"))?;
            let words = parse_words(&raw)?;
            let lines = convert(&cfg, &words, strict)?;
            store.save_lines(&variant_id, &serde_json::to_string(&lines)?, now_unix())?;
            print_lines(&lines, false)?;
        }
        Command::FetchJson { task_id, audio_id } => {
            let client = make_client(&cfg);
            let raw = client.get_timestamped_lyrics_raw(&task_id, &audio_id).await?;
            println!("{}", serde_json::to_string_pretty(&raw)?);
        }
        Command::Import {
            variant_id,
            input,
            strict,
        } => {
            let words = read_words(&input)?;
            let lines = convert(&cfg, &words, strict)?;
            let store = open_storage(&cfg)?;
            store.save_lines(&variant_id, &serde_json::to_string(&lines)?, now_unix())?;
            println!("Stored {} lines for {}.", lines.len(), variant_id);
        }
        Command::Show { variant_id } => {
            let store = open_storage(&cfg)?;
            let raw = store
                .get_lines(&variant_id)?
                .with_context(|| format!("no stored lines for {variant_id}"))?;
            let lines: Vec<LyricLine> =
                serde_json::from_str(&raw).context("decode stored lines")?;
            print_lines(&lines, false)?;
        }
        Command::Active {
            variant_id,
            position_ms,
        } => {
            let store = open_storage(&cfg)?;
            let raw = store
                .get_lines(&variant_id)?
                .with_context(|| format!("no stored lines for {variant_id}"))?;
            let lines: Vec<LyricLine> =
                serde_json::from_str(&raw).context("decode stored lines")?;
            match alignment::find_active_line(&lines, position_ms) {
                Some(i) => println!("{}", serde_json::to_string(&lines[i])?),
                None => println!("null"),
            }
        }
    }

    Ok(())
}

fn convert(
    cfg: &config::Config,
    words: &[AlignedWord],
    strict: bool,
) -> anyhow::Result<Vec<LyricLine>> {
    if strict {
        alignment::convert_alignment_strict(words, &cfg.segmenter)
            .context("alignment timing check failed")
    } else {
        Ok(alignment::convert_alignment(words, &cfg.segmenter))
    }
}

fn make_client(cfg: &config::Config) -> suno::SunoClient {
    suno::SunoClient::new(&cfg.suno.api_base, cfg.suno.api_token.clone())
}

fn open_storage(cfg: &config::Config) -> anyhow::Result<storage::Storage> {
    storage::Storage::open(&cfg.paths.data_dir.join("melodia.db"))
}

fn read_words(input: &Path) -> anyhow::Result<Vec<AlignedWord>> {
    let raw = if input.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("read stdin")?
    } else {
        std::fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?
    };
    parse_words(&raw)
}

/// Accept either a bare word array or a full API response envelope.
fn parse_words(raw: &str) -> anyhow::Result<Vec<AlignedWord>> {
    if let Ok(words) = serde_json::from_str::<Vec<AlignedWord>>(raw) {
        return Ok(words);
    }
    let envelope: TimestampedLyricsResponse =
        serde_json::from_str(raw).context("input is neither a word array nor an API response")?;
    Ok(envelope.into_data()?.aligned_words)
}

fn print_lines(lines: &[LyricLine], compact: bool) -> anyhow::Result<()> {
    let rendered = if compact {
        serde_json::to_string(lines)?
    } else {
        serde_json::to_string_pretty(lines)?
    };
    println!("{rendered}");
    Ok(())
}

fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
