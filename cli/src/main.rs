#![allow(missing_docs)]

use std::{
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use env_logger::Env;
use log::{error, info, warn};
use slackmoji::{
    AssetFetcher, AssetSource, DEFAULT_BASE_URL, EMOJI_DATA_FILE, EmojiIndex,
    FetchReport, HttpSource, INDEX_FILE, SlackcodeTable, Theme, ThemeHeader,
    load_records,
};

fn main() -> ExitCode {
    match _main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(why) => {
            error!("{why:#}");
            ExitCode::FAILURE
        },
    }
}

// Default to debug logs on debug builds, info otherwise
#[cfg(debug_assertions)]
type SlackmojiVerbosity = Verbosity<clap_verbosity_flag::DebugLevel>;
#[cfg(not(debug_assertions))]
type SlackmojiVerbosity = Verbosity<clap_verbosity_flag::InfoLevel>;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: SlackmojiVerbosity,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the emoji records keyed by short name, with zero-padded code
    /// points
    Index {
        /// Slack's emoji metadata
        #[arg(short, long, default_value = EMOJI_DATA_FILE)]
        input: PathBuf,

        /// Where to write the index
        #[arg(short, long, default_value = INDEX_FILE)]
        output: PathBuf,
    },
    /// Write a Pidgin smiley theme into the medium/ and large/ directories
    Theme {
        /// Slack's emoji metadata
        #[arg(short, long, default_value = EMOJI_DATA_FILE)]
        input: PathBuf,

        /// The directory holding medium/ and large/
        #[arg(short = 'd', long, default_value = ".")]
        out_dir: PathBuf,

        /// A TOML file overriding the theme's name, description, icon, or
        /// author
        #[arg(long)]
        header: Option<PathBuf>,
    },
    /// Download any emoji images missing from medium/ and large/
    Fetch {
        /// Slack's emoji metadata
        #[arg(short, long, default_value = EMOJI_DATA_FILE)]
        input: PathBuf,

        /// The directory holding medium/ and large/
        #[arg(short = 'd', long, default_value = ".")]
        out_dir: PathBuf,

        /// Where the google-medium/ and google-large/ image sets are served
        /// from
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Seconds to wait for each image before giving up on it
        #[arg(long, default_value_t = HttpSource::DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },
    /// Turn :short_name: codes into emoji, or back with --reverse
    Translate {
        /// An index written by the `index` command
        #[arg(long, default_value = INDEX_FILE)]
        index: PathBuf,

        /// Turn emoji into :short_name: codes instead
        #[arg(short, long)]
        reverse: bool,

        /// The text to translate [default: read from stdin]
        text: Vec<String>,
    },
}

fn _main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(args.verbosity.into())
        .parse_env(Env::new().filter("SLACKMOJI_LOG"))
        .init();

    let start = Instant::now();
    match args.command {
        Command::Index { input, output } => {
            let records = load_records(&input)?;
            let index = EmojiIndex::build(records).with_context(|| {
                format!("failed to index {}", input.display())
            })?;
            index.save(&output)?;
        },
        Command::Theme {
            input,
            out_dir,
            header,
        } => {
            let header = header
                .map(ThemeHeader::load)
                .transpose()?
                .unwrap_or_default();
            let records = load_records(&input)?;
            let theme = Theme::build(header, &records).with_context(|| {
                format!("failed to build theme from {}", input.display())
            })?;
            theme.write(&out_dir)?;
        },
        Command::Fetch {
            input,
            out_dir,
            base_url,
            timeout,
        } => {
            let fetcher =
                AssetFetcher::new(HttpSource::with_timeout(timeout), out_dir)
                    .with_base_url(base_url);
            fetch(fetcher, &input)?;
        },
        Command::Translate {
            index,
            reverse,
            text,
        } => {
            let index = EmojiIndex::load(&index)?;
            let table = SlackcodeTable::from_index(&index)?;
            let text = if text.is_empty() {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read text from stdin")?;
                buf
            } else {
                text.join(" ")
            };
            let translated = if reverse {
                table.to_slackcode(&text)
            } else {
                table.to_unicode(&text)
            };
            print!("{translated}");
            if !translated.ends_with('\n') {
                println!();
            }
        },
    }
    info!("Took {:?}", start.elapsed());
    Ok(())
}

/// Fetch every image missing for the records in `input`.
///
/// Images that couldn't be downloaded are retried on the next run, so they
/// don't fail this one.
fn fetch<S: AssetSource>(
    mut fetcher: AssetFetcher<S>,
    input: &Path,
) -> anyhow::Result<FetchReport> {
    let records = load_records(input)?;
    let report = fetcher.run(&records)?;
    if report.failed() > 0 {
        warn!(
            "{} images could not be downloaded, run again to retry",
            report.failed(),
        );
    }
    Ok(report)
}
