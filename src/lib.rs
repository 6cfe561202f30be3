// Asset resolution for audio locators in artwork data
pub mod assets;

// Adaptive audio: ambient loop, segment layers, fades, master volume
pub mod audio;

pub mod config;
pub mod error;

// Artwork data model and catalog
pub mod gallery;

pub mod prefs;

// Scroll visibility and the triggers driving audio layers
pub mod scroll;

// Audio for a mounted artwork page
pub mod session;

// Terminal reader
pub mod viewer;

pub use assets::{AssetInfo, AssetLoader};
pub use audio::{AudioEngine, AudioState, AudioSystem, FadeDriver};
pub use config::AppConfig;
pub use error::GalleryError;
pub use session::{ArtworkAudio, AudioOptions};

use gallery::Catalog;
use prefs::{AudioPreferences, JsonFileStore};
use std::path::PathBuf;
use viewer::Viewer;

/// Command-line arguments: `gallery-audio [--config <path>] <artwork-id>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub artwork_id: Option<String>,
}

impl Args {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, GalleryError> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--config" || arg == "-c" {
                let path = args
                    .next()
                    .ok_or_else(|| GalleryError::Usage("--config needs a path".into()))?;
                parsed.config = Some(PathBuf::from(path));
            } else if arg.starts_with('-') {
                return Err(GalleryError::Usage(format!("unknown option {}", arg)));
            } else if parsed.artwork_id.is_none() {
                parsed.artwork_id = Some(arg);
            } else {
                return Err(GalleryError::Usage(format!("unexpected argument {}", arg)));
            }
        }
        Ok(parsed)
    }
}

fn init_logging(config: &AppConfig) -> Result<(), GalleryError> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = &config.paths.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    // A second init (tests, embedding) keeps the first logger.
    let _ = builder.try_init();
    Ok(())
}

pub fn run() -> Result<(), GalleryError> {
    let args = Args::parse(std::env::args().skip(1))?;
    let config = AppConfig::discover(args.config.as_deref())?;
    init_logging(&config)?;

    let catalog = Catalog::load_from_file(&config.paths.catalog)?;
    let artwork_id = match args.artwork_id {
        Some(id) => id,
        None => {
            let ids = catalog.ids().join(", ");
            return Err(GalleryError::Usage(format!(
                "gallery-audio [--config <path>] <artwork-id>\navailable: {}",
                ids
            )));
        }
    };
    let artwork = catalog.require(&artwork_id)?.clone();

    let store = JsonFileStore::new(&config.paths.preferences);
    let prefs = AudioPreferences::load(&store);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let _guard = runtime.enter();

    // We must keep _stream alive, even though we don't use it directly, else audio stops.
    let (audio, _stream) = AudioSystem::open(config.audio.fade_duration());
    let _driver = FadeDriver::spawn(audio.clone(), config.audio.tick());

    let loader = AssetLoader::new(&config.paths.assets_dir, &config.paths.cache_dir);
    let options = AudioOptions::from_config(&config.audio, prefs.auto_play_audio);
    let mut session = runtime.block_on(ArtworkAudio::mount(&artwork, audio, &loader, options));
    session.set_volume(prefs.gain());

    Viewer::new(&artwork, &mut session, &store, prefs, &config.scroll).run()?;
    Ok(())
}
