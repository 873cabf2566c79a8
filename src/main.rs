//! Strata model viewer
//!
//! Usage:
//!   strata                          # show the demo model
//!   strata model.glb                # load a file
//!   strata https://host/model.gltf  # load a URL
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};

use strata::{LoadOrdering, StrataApp, ViewerConfig};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Interactive 3D model viewer with layer toggles and mesh picking")]
struct Cli {
    /// Model to load: a path, file:// URL or http(s) URL (.glb, .gltf, .obj)
    source: Option<String>,

    /// Start with an empty viewport instead of the demo model
    #[arg(long)]
    no_demo: bool,

    /// Synchronize presentation with the display refresh rate
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    vsync: bool,

    /// Which of several overlapping loads ends up on screen
    #[arg(long, value_enum, default_value_t = Ordering::LastCompletion)]
    ordering: Ordering,
}

#[derive(Clone, Copy, ValueEnum)]
enum Ordering {
    /// The load that finishes last wins
    LastCompletion,
    /// Only the most recently requested load may win
    LatestRequest,
}

impl From<Ordering> for LoadOrdering {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::LastCompletion => LoadOrdering::LastCompletionWins,
            Ordering::LatestRequest => LoadOrdering::LatestRequestWins,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = ViewerConfig::default()
        .with_vsync(cli.vsync)
        .with_load_ordering(cli.ordering.into());

    let mut app = StrataApp::new(config);
    match cli.source {
        Some(source) => app = app.with_source(source),
        None if !cli.no_demo => app = app.with_demo(),
        None => log::info!("starting with an empty viewport"),
    }
    app.run()
}
