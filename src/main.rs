// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use padseq::{
    ChannelObserver, KitEvent, KitLibrary, KitSource, KitWatcher, LogSink, SequencerConfig,
    TransportController, MAX_PADS, MAX_STEPS,
};

fn print_usage() {
    println!("PADSEQ - Pad Step Sequencer");
    println!();
    println!("Usage: padseq [--config <FILE>] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  --list-kits [DIR]        List kits (built-in plus DIR, default from config)");
    println!("  --demo [BPM] [BARS]      Play a demo beat through the log sink (default 120, 2)");
    println!("  --help                   Show this help message");
    println!();
    println!("Options:");
    println!("  --config <FILE>          Load settings from a TOML file");
}

fn init_logging(config: &SequencerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Pull `--config <FILE>` out of the argument list
fn take_config_arg(args: &mut Vec<String>) -> Result<Option<PathBuf>> {
    let Some(pos) = args.iter().position(|a| a == "--config") else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        return Err(anyhow!("--config requires a file path"));
    }
    let path = PathBuf::from(args.remove(pos + 1));
    args.remove(pos);
    Ok(Some(path))
}

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, what: &str) -> Result<Option<T>> {
    match args.get(index) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("Invalid {}: {}", what, raw)),
    }
}

fn list_kits(library: &KitLibrary) {
    println!("{} kits:", library.kit_count());
    for kit in library.kits() {
        let marker = if kit.name == library.current_kit().name { "*" } else { " " };
        println!("{} {} - {} ({} pads)", marker, kit.name, kit.description, kit.pad_count());
        for (index, pad) in kit.pads().iter().enumerate() {
            println!("    {}: {:<12} {}", index, pad.display_text(), pad.file_path);
        }
    }
}

fn load_library(config: &SequencerConfig) -> KitLibrary {
    let mut library = KitLibrary::load_dir(&config.kits_dir);
    if let Some(name) = &config.default_kit {
        if let Err(e) = library.switch_to(name) {
            warn!("{}, keeping '{}'", e, library.current_kit().name);
        }
    }
    library
}

fn render_step(engine: &TransportController, playing_step: usize) -> String {
    let pattern = engine.pattern();
    let length = engine.pattern_length();
    let mut line = String::with_capacity(MAX_STEPS * 2);
    for step in 0..length {
        let hit = (0..MAX_PADS).any(|pad| pattern.get_step(pad, step));
        line.push(match (step == playing_step, hit) {
            (true, _) => '>',
            (false, true) => 'x',
            (false, false) => '.',
        });
    }
    line
}

async fn run_demo(config: &SequencerConfig, bpm: u32, bars: u32) -> Result<()> {
    let mut library = load_library(config);
    let kit_name = library.current_kit().name.clone();

    let engine = TransportController::new(Arc::new(LogSink), Some(&library as &dyn KitSource));
    engine.configure(config);
    engine.set_tempo(bpm);

    for step in [0, 4, 8, 12] {
        engine.set_step(0, step, true);
    }
    engine.set_step(1, 2, true);

    let (observer, steps) = ChannelObserver::new();
    engine.set_step_observer(Some(Arc::new(observer)));

    let watcher = if config.watch_kits {
        Some(KitWatcher::new(&config.kits_dir, None).context("Failed to watch kits directory")?)
    } else {
        None
    };

    let run_for = engine.step_interval() * (engine.pattern_length() as u32 * bars);
    println!(
        "Playing kit '{}' at {} BPM ({} ms/step) for {} bars",
        kit_name,
        engine.tempo(),
        engine.step_interval().as_millis(),
        bars
    );

    engine.play();
    let deadline = Instant::now() + run_for;
    while Instant::now() < deadline {
        for step in steps.try_iter() {
            // Observer reports the step about to play next; show the one just played
            let length = engine.pattern_length();
            let played = (step + length - 1) % length;
            println!("{}", render_step(&engine, played));
        }

        if let Some(watcher) = &watcher {
            for event in watcher.recv_all() {
                match event {
                    KitEvent::Reloaded(kit) => {
                        info!("Kit '{}' reloaded", kit.name);
                        let rebind = kit.name == kit_name;
                        library.upsert_kit(*kit);
                        if rebind {
                            engine.set_current_kit(Some(&library as &dyn KitSource));
                        }
                    }
                    KitEvent::Error(e) => warn!("{}", e),
                    KitEvent::FileCreated(_) | KitEvent::FileDeleted(_) => {}
                }
            }
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    engine.dispose();
    println!("Demo complete!");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().collect();
    let config_path = take_config_arg(&mut args)?;
    let config = match &config_path {
        Some(path) => SequencerConfig::load(path)?,
        None => SequencerConfig::default(),
    };
    init_logging(&config);

    if args.len() < 2 {
        println!("PADSEQ - Pad Step Sequencer");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--list-kits" => {
            let mut config = config;
            if let Some(dir) = args.get(2) {
                config.kits_dir = PathBuf::from(dir);
            }
            list_kits(&load_library(&config));
        }
        "--demo" => {
            let bpm = parse_arg(&args, 2, "BPM")?.unwrap_or(config.effective_tempo());
            let bars = parse_arg(&args, 3, "bar count")?.unwrap_or(2u32).max(1);
            run_demo(&config, bpm, bars).await?;
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
