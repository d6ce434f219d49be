use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use artisan_map::api::AppState;
use artisan_map::{
    ArtisanMapConfig, FeatureRenderer, FileLocationSource, JsonFileRenderer, LocationSource,
    LocationWeatherFeed, OpenMeteoClient, PresentationMode, RpcLocationSource, SnapshotRenderer,
    WeatherEnricher, logging, web,
};

#[derive(Debug, Parser)]
#[command(name = "artisan-map", version, about = "Artisan locations with live weather overlays")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the map API and serve the front-end
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one fetch cycle and write GeoJSON plus render config files
    Snapshot {
        #[arg(short, long, default_value = "map-snapshot")]
        out: PathBuf,
        #[arg(short, long, default_value = "cluster")]
        mode: PresentationMode,
        /// Read locations from a JSON file instead of the backend
        #[arg(short, long)]
        locations: Option<PathBuf>,
    },
    /// Run one fetch cycle and print the summary panel
    Summary {
        #[arg(short, long)]
        locations: Option<PathBuf>,
    },
}

fn location_source(
    config: &ArtisanMapConfig,
    file: Option<PathBuf>,
) -> Result<Arc<dyn LocationSource>> {
    let source: Arc<dyn LocationSource> = match file {
        Some(path) => Arc::new(FileLocationSource::new(path)),
        None => Arc::new(RpcLocationSource::new(&config.backend)?),
    };
    Ok(source)
}

fn enricher(config: &ArtisanMapConfig) -> Result<WeatherEnricher> {
    let client = OpenMeteoClient::new(&config.weather)?;
    Ok(WeatherEnricher::new(Arc::new(client))
        .with_max_concurrent(config.weather.max_concurrent_requests))
}

fn feed<R: FeatureRenderer>(
    config: &ArtisanMapConfig,
    locations: Option<PathBuf>,
    renderer: R,
) -> Result<LocationWeatherFeed<R>> {
    Ok(LocationWeatherFeed::new(
        location_source(config, locations)?,
        enricher(config)?,
        renderer,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ArtisanMapConfig::load_from_path(cli.config.clone())
        .with_context(|| "Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let snapshot = SnapshotRenderer::new();
            let mut feed = feed(&config, None, snapshot.clone())?;
            feed.refresh().await?;
            let state = AppState::new(feed, snapshot, config.map.clone());
            web::run(&config.server, state).await?;
        }
        Command::Snapshot {
            out,
            mode,
            locations,
        } => {
            let renderer = JsonFileRenderer::new(&out)?;
            let mut feed = feed(&config, locations, renderer)?;
            feed.set_mode(mode)?;
            let features = feed.refresh().await?;
            println!(
                "Wrote {} features to {} ({} mode)",
                features.len(),
                out.display(),
                mode
            );
            feed.shutdown()?;
        }
        Command::Summary { locations } => {
            let mut feed = feed(&config, locations, SnapshotRenderer::new())?;
            let features = feed.refresh().await?;
            for line in features.summary.panel_lines() {
                println!("{line}");
            }
            feed.shutdown()?;
        }
    }

    Ok(())
}
