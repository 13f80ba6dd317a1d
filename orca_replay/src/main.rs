//! Orca Replay CLI
//!
//! Resolve whale positions for a day, or play the sighting timeline.

use chrono::NaiveDate;
use clap::Parser;
use orca_core::{
    FamilyClassifier, JsonFileSource, PathConfig, PlaybackFrame, PlaybackSession, PlaybackSpeed,
    PositionResolver, ReplayView, ResolverConfig, SightingSource, WaterRegions,
};
use orca_env::TokioContext;
use orca_replay::report::{day_lines, frame_lines, frames_json, unindexed_json};
use orca_replay::ReplayError;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Orca sighting replay
#[derive(Parser, Debug)]
#[command(name = "orca-replay")]
#[command(about = "Resolve and play back orca matriline positions", long_about = None)]
struct Args {
    /// JSON file containing an array of sighting records
    #[arg(short = 'f', long)]
    sightings: PathBuf,

    /// Day to resolve or to start playback from (YYYY-MM-DD; default: start of timeline)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Individuals or matrilines to follow, comma separated (default: all tracked families)
    #[arg(short, long, value_delimiter = ',')]
    select: Vec<String>,

    /// Tracked family keys, comma separated
    #[arg(long, value_delimiter = ',', default_value = "T18,T19")]
    families: Vec<String>,

    /// Play this many timeline ticks instead of resolving a single day
    #[arg(short, long)]
    play: Option<usize>,

    /// Playback speed (0.5x, 1x, 2x, 4x)
    #[arg(long, default_value = "1x")]
    speed: PlaybackSpeed,

    /// Interpolation steps between two sightings
    #[arg(long, default_value = "20")]
    steps: NonZeroUsize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if let Err(e) = run(args).await {
        error!("✗ {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ReplayError> {
    let source = JsonFileSource::new(&args.sightings);
    let records = source.load()?;
    let total = records.len();
    info!("Loaded {} sightings from {}", total, args.sightings.display());

    let resolver = PositionResolver::new(
        ResolverConfig {
            interpolation_steps: args.steps.get(),
            path: PathConfig::default(),
        },
        FamilyClassifier::new(&args.families),
        WaterRegions::salish_sea(),
    );
    let view = ReplayView::new(records, args.select.clone(), resolver.clone());
    let days = view.timeline().len();

    if view.timeline().is_empty() {
        info!("No sightings to show");
        emit(&args, &[], total, days)?;
        return Ok(());
    }

    if let Some(date) = args.date {
        if view.timeline().index_of(date).is_none() {
            warn!(
                %date,
                first = ?view.timeline().first(),
                last = ?view.timeline().last(),
                "date is outside the sighting timeline"
            );
        }
    }

    let Some(ticks) = args.play else {
        let date = args.date.or(view.timeline().first()).unwrap_or_default();
        let positions = resolver.resolve(&view.query_for(date), view.sightings());
        let Some(index) = view.timeline().index_of(date) else {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&unindexed_json(date, &positions, total, days))?);
            } else {
                for line in day_lines(date, None, &positions) {
                    println!("{}", line);
                }
            }
            return Ok(());
        };
        let frame = PlaybackFrame { index, date, positions };
        return emit(&args, &[frame], total, days);
    };

    let (tx, mut rx) = mpsc::channel(64);
    let mut session = PlaybackSession::new(TokioContext::shared(), view, tx);
    if let Some(date) = args.date {
        session.seek_date(date);
    }
    debug!(session = %session.id(), cursor = session.cursor(), "playback session ready");

    let mut frames: Vec<PlaybackFrame> = session.current_frame().into_iter().collect();
    if !args.json {
        print_frames(&frames);
    }

    session.start(args.speed);
    while frames.len() <= ticks {
        let Some(frame) = rx.recv().await else {
            return Err(ReplayError::PlaybackEnded(frames.len()));
        };
        if !args.json {
            print_frames(std::slice::from_ref(&frame));
        }
        frames.push(frame);
    }
    session.stop();

    if args.json {
        emit(&args, &frames, total, days)?;
    }
    info!("✓ Played {} day(s) at {}", ticks, args.speed);
    Ok(())
}

fn emit(args: &Args, frames: &[PlaybackFrame], total: usize, days: usize) -> Result<(), ReplayError> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&frames_json(frames, total, days))?);
    } else {
        print_frames(frames);
    }
    Ok(())
}

fn print_frames(frames: &[PlaybackFrame]) {
    for frame in frames {
        for line in frame_lines(frame) {
            println!("{}", line);
        }
    }
}
