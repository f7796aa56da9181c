mod cli;

use hlsrec::ingest;
use hr_core::config::RecorderConfig;
use hr_core::events::EventBus;
use hr_hls::manifest::manifest_file_name;
use hr_hls::{generate_media_playlist, MediaPlaylist, SegmentSequencer, SequencerOptions};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "hlsrec=trace,hr_hls=trace,hr_core=debug".to_string()
        } else {
            "hlsrec=debug,hr_hls=debug,hr_core=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ingest {
            events,
            output,
            prefix,
            interval,
            no_manifest,
            print_events,
        } => {
            let mut config = RecorderConfig::load_or_default(cli.config.as_deref());
            if let Some(output) = output {
                config.output_dir = output;
            }
            if let Some(prefix) = prefix {
                config.file_name_prefix = prefix;
            }
            if let Some(interval) = interval {
                config.segment_interval_secs = interval;
            }
            if no_manifest {
                config.create_manifest = false;
            }
            run_ingest(&events, &config, print_events)
        }
        Commands::Render { playlist } => render_playlist(&playlist),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("hlsrec {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_ingest(events: &Path, config: &RecorderConfig, print_events: bool) -> Result<()> {
    if !events.exists() {
        anyhow::bail!("Event log does not exist: {:?}", events);
    }

    for warning in config.validate() {
        tracing::warn!("Config: {}", warning);
    }

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", config.output_dir))?;

    let bus = Arc::new(EventBus::new(config.event_capacity));
    let mut rx = bus.subscribe();

    let mut sequencer = SegmentSequencer::new(SequencerOptions::from(config), Some(bus.clone()));
    tracing::info!("Replaying {:?} into {:?}", events, config.output_dir);
    let result = ingest::ingest_event_log(events, &mut sequencer);

    if print_events {
        loop {
            match rx.try_recv() {
                Ok(event) => println!("{}", serde_json::to_string(&event)?),
                Err(TryRecvError::Lagged(n)) => {
                    tracing::warn!("{} events dropped from the event stream", n);
                }
                Err(_) => break,
            }
        }
    }

    let summary = result?;
    println!("Records: {}", summary.records);
    println!("Accepted: {}", summary.accepted);
    println!("Skipped: {}", summary.skipped);
    match summary.manifest {
        Some(path) => println!("Manifest: {}", path.display()),
        None => println!("Manifest: none"),
    }

    Ok(())
}

fn render_playlist(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read playlist description: {:?}", path))?;
    let playlist: MediaPlaylist = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse playlist description: {:?}", path))?;

    print!("{}", generate_media_playlist(&playlist));
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let content = std::fs::read_to_string(p)
                .with_context(|| format!("Failed to read config file: {:?}", p))?;
            RecorderConfig::from_json(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", p))?
        }
        None => {
            println!("No config file specified, using defaults");
            RecorderConfig::default()
        }
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        for warning in &warnings {
            println!("⚠ {}", warning);
        }
    }
    println!("  Output: {}", config.output_dir.display());
    println!("  Prefix: {}", config.file_name_prefix);
    println!("  Segment interval: {}s", config.segment_interval_secs);
    println!("  MP4 version: {}", config.mp4_version);
    println!(
        "  Manifest: {}",
        if config.creates_manifest() {
            manifest_file_name(&config.file_name_prefix)
        } else {
            "disabled".to_string()
        }
    );

    Ok(())
}
