use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};

use crate::config::PublishConfig;
use crate::constants::shard;
use crate::hub::HubClient;
use crate::pipeline;
use crate::splits::{SplitLabel, SplitSource};

#[derive(Debug, Parser)]
#[command(
    name = "corpus-shards",
    disable_help_subcommand = true,
    about = "Publish a speech corpus as WebDataset TAR shards",
    long_about = "Stream a speech corpus archive, repackage it into fixed-size WebDataset TAR shards with JSON metadata sidecars, and upload each shard to a dataset repository.",
    after_help = "The hub auth token is read from the HF_TOKEN environment variable, falling back to the shared hub token cache."
)]
struct PublishCli {
    #[arg(help = "Destination dataset repository, e.g. owner/name")]
    repo_id: String,
    #[arg(long, help = "Create the dataset repository as private")]
    private: bool,
    #[arg(
        long = "shard-size",
        default_value_t = shard::SHARD_SIZE,
        value_parser = parse_positive_usize,
        help = "Records per TAR shard"
    )]
    shard_size: usize,
    #[arg(
        long = "work-dir",
        value_name = "DIR",
        help = "Directory for in-flight shard files (default: scoped temp dir)"
    )]
    work_dir: Option<PathBuf>,
    #[arg(long, value_name = "URL", help = "Hub API endpoint override")]
    endpoint: Option<String>,
    #[arg(
        long = "source",
        value_name = "SPLIT=LOCATOR",
        value_parser = parse_split_source,
        help = "Split archive override, repeat as needed (e.g. train=https://…)"
    )]
    sources: Vec<SplitSource>,
}

/// Run the publish app with CLI-style arguments (without the program name).
pub fn run_publish<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<PublishCli, _>(
        std::iter::once("corpus-shards".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut config = PublishConfig {
        repo_id: cli.repo_id,
        private: cli.private,
        shard_size: cli.shard_size,
        work_dir: cli.work_dir,
        ..PublishConfig::default()
    };
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint.trim_end_matches('/').to_string();
    }
    for source in cli.sources {
        match config
            .splits
            .iter_mut()
            .find(|existing| existing.label == source.label)
        {
            Some(existing) => existing.locator = source.locator,
            None => config.splits.push(source),
        }
    }

    println!("=== corpus shard publish ===");
    println!("repository : {}", config.repo_id);
    println!("shard size : {} files per TAR", config.shard_size);
    println!(
        "speaker    : {} ({}, {})",
        config.speaker.speaker_id, config.speaker.speaker_gender, config.speaker.speaker_age
    );

    let hub = HubClient::new(config.endpoint.clone(), config.resolve_token());
    let stats = pipeline::run(&config, &hub)?;

    println!();
    println!("=== publish complete ===");
    for split_stats in &stats {
        println!(
            "  {}: {} files in {} shards ({:.1} MB)",
            split_stats.split,
            split_stats.records,
            split_stats.shards,
            split_stats.bytes as f64 / 1024.0 / 1024.0
        );
    }
    println!(
        "View at: {}/datasets/{}",
        config.endpoint, config.repo_id
    );
    Ok(())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw.parse::<usize>().map_err(|_| {
        format!("Could not parse --shard-size value '{raw}' as a positive integer")
    })?;
    if parsed == 0 {
        return Err("--shard-size must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_split_source(raw: &str) -> Result<SplitSource, String> {
    let Some((split, locator)) = raw.split_once('=') else {
        return Err("--source expects SPLIT=LOCATOR".to_string());
    };
    let label = SplitLabel::from_name(split.trim())
        .ok_or_else(|| format!("unknown split '{}': expected train or test", split.trim()))?;
    let locator = locator.trim();
    if locator.is_empty() {
        return Err("--source locator must not be empty".to_string());
    }
    Ok(SplitSource {
        label,
        locator: locator.to_string(),
    })
}
