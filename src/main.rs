// B-Sides - command line front end for the recommendation engine
// Handy for checking what a catalog dump + user state would put on each shelf

use anyhow::{Context, Result};
use bsides::{
    catalog::{self, Track, UserState},
    config::Config,
    ListeningProfile, RecommendationEngine, Shelves,
};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Shelf {
    Recommend,
    Trending,
    NewReleases,
    Featured,
    Home,
}

#[derive(Parser)]
#[command(name = "bsides")]
#[command(about = "Rank a track catalog into recommendation shelves")]
struct Args {
    /// Which shelf to build
    #[arg(value_enum)]
    shelf: Shelf,

    /// Catalog snapshot (JSON array of tracks)
    #[arg(long)]
    catalog: PathBuf,

    /// User state (JSON with `history` and `likes`)
    #[arg(long)]
    user: Option<PathBuf>,

    /// Tracks per shelf (defaults to the config value)
    #[arg(long)]
    count: Option<usize>,

    /// Seed for the shuffles, for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Config file (defaults to the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print JSON instead of a listing
    #[arg(long)]
    json: bool,

    /// Enable developer logging (stderr + debug output)
    #[arg(long)]
    dev: bool,
}

fn init_logging(config: &Config, dev: bool) -> Result<()> {
    let log_dir = &config.logging.directory;
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    // Daily rotating file appender
    let file_appender = tracing_appender::rolling::daily(log_dir, "bsides.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let base_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    // Dev mode mirrors everything to stderr as well
    let stderr_layer = dev.then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(base_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    // Keep the writer alive for the life of the process
    std::mem::forget(guard);

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

fn print_shelf(name: &str, tracks: &[Track]) {
    println!("{} ({})", name, tracks.len());
    for (idx, track) in tracks.iter().enumerate() {
        println!(
            "  {:>2}. {:<12} {} - {}",
            idx + 1,
            track.id,
            track.display_title(),
            track.display_artist()
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_logging(&config, args.dev)?;

    info!("B-Sides engine starting up");

    let engine = RecommendationEngine::new(config.engine.clone())?;
    let tracks = catalog::load_catalog(&args.catalog)?;
    let user = match &args.user {
        Some(path) => catalog::load_user_state(path)?,
        None => UserState::default(),
    };
    let profile = ListeningProfile::new(&user.history, &user.likes);
    info!(
        "Listening profile: {} plays across {} tracks, {} likes",
        profile.total_plays(),
        profile.distinct_tracks(),
        profile.like_count()
    );
    let count = args.count.unwrap_or(config.default_count);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    debug!("Building {:?} with count={} seed={:?}", args.shelf, count, args.seed);
    debug!("Engine config: {:?}", engine.config());

    let shelves = match args.shelf {
        Shelf::Recommend => Shelves {
            recommended: engine.recommend(&tracks, &profile, count, &mut rng),
            ..Shelves::default()
        },
        Shelf::Trending => Shelves {
            trending: engine.trending(&tracks, count),
            ..Shelves::default()
        },
        Shelf::NewReleases => Shelves {
            new_releases: engine.new_releases(&tracks, count),
            ..Shelves::default()
        },
        Shelf::Featured => Shelves {
            featured: engine.featured(&tracks, count, &mut rng),
            ..Shelves::default()
        },
        Shelf::Home => engine.build_shelves(&tracks, &profile, count, &mut rng),
    };

    if args.json {
        let out = match args.shelf {
            Shelf::Recommend => serde_json::to_string_pretty(&shelves.recommended)?,
            Shelf::Trending => serde_json::to_string_pretty(&shelves.trending)?,
            Shelf::NewReleases => serde_json::to_string_pretty(&shelves.new_releases)?,
            Shelf::Featured => serde_json::to_string_pretty(&shelves.featured)?,
            Shelf::Home => serde_json::to_string_pretty(&shelves)?,
        };
        println!("{}", out);
        return Ok(());
    }

    let listing = [
        (Shelf::Recommend, "Recommended for you", &shelves.recommended),
        (Shelf::Trending, "Trending", &shelves.trending),
        (Shelf::NewReleases, "New releases", &shelves.new_releases),
        (Shelf::Featured, "Featured", &shelves.featured),
    ];
    for (shelf, name, tracks) in listing {
        if args.shelf == shelf || args.shelf == Shelf::Home {
            print_shelf(name, tracks);
        }
    }

    Ok(())
}
