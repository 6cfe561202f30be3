use gallery_audio_lib::audio::silent::{SilentBackend, SilentProbe};
use gallery_audio_lib::audio::LayerState;
use gallery_audio_lib::gallery::{Artwork, Catalog};
use gallery_audio_lib::scroll::{Edge, SegmentTriggers};
use gallery_audio_lib::{ArtworkAudio, AssetLoader, AudioEngine, AudioOptions, AudioState};
use std::path::Path;
use std::time::Duration;

const CATALOG: &str = r#"[
  {
    "id": "art_real_01",
    "title": "Harbor at Dusk",
    "artist": "M. Okafor",
    "audioAmbient": "/audio/amb.mp3",
    "storySegments": [
      { "id": "seg1", "text": "Boats come in.", "audioLayer": "/audio/l1.mp3" },
      { "id": "seg2", "text": "The lights go on." },
      { "id": "seg3", "text": "Gulls.", "audioLayer": "/audio/missing.mp3" }
    ]
  },
  {
    "id": "art_real_02",
    "title": "Salt Flats",
    "artist": "J. Varga",
    "audioAmbient": "/audio/wind.mp3",
    "storySegments": [
      { "id": "segB", "text": "Nothing moves.", "audioLayer": "/audio/l2.mp3" }
    ]
  }
]"#;

struct Fixture {
    _dir: tempfile::TempDir,
    artwork: Artwork,
    next_artwork: Artwork,
    loader: AssetLoader,
    audio: AudioState,
    probe: SilentProbe,
    ambient_path: String,
    layer_path: String,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let audio_dir = dir.path().join("audio");
    std::fs::create_dir_all(&audio_dir).unwrap();
    std::fs::write(audio_dir.join("amb.mp3"), b"id3").unwrap();
    std::fs::write(audio_dir.join("l1.mp3"), b"id3").unwrap();
    std::fs::write(audio_dir.join("l2.mp3"), b"id3").unwrap();
    std::fs::write(audio_dir.join("wind.mp3"), b"id3").unwrap();

    let catalog = Catalog::from_json(CATALOG).unwrap();
    let artwork = catalog.require("art_real_01").unwrap().clone();
    let next_artwork = catalog.require("art_real_02").unwrap().clone();
    let loader = AssetLoader::new(dir.path(), dir.path().join("cache"));

    let backend = SilentBackend::new();
    let probe = backend.probe();
    let audio = AudioState::new(AudioEngine::new(
        Box::new(backend),
        Duration::from_millis(1500),
    ));

    Fixture {
        ambient_path: path_string(&audio_dir.join("amb.mp3")),
        layer_path: path_string(&audio_dir.join("l1.mp3")),
        _dir: dir,
        artwork,
        next_artwork,
        loader,
        audio,
        probe,
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn advance(audio: &AudioState, ms: u64) {
    audio
        .with(|engine| engine.advance(Duration::from_millis(ms)))
        .unwrap();
}

#[tokio::test]
async fn scrolling_through_an_artwork_drives_its_layers() {
    let fx = fixture();
    let mut session =
        ArtworkAudio::mount(&fx.artwork, fx.audio.clone(), &fx.loader, AudioOptions::default())
            .await;
    assert!(session.is_ready());
    assert!(session.has_ambient());
    assert!(session.has_layer("seg1"));
    assert!(!session.has_layer("seg2"));

    // Preloaded but silent until something asks for it.
    assert!(fx.probe.live(&fx.ambient_path).is_empty());
    assert!(!fx.probe.latest(&fx.layer_path).unwrap().playing);

    session.play_ambient();
    assert!(fx.probe.latest(&fx.ambient_path).unwrap().playing);
    advance(&fx.audio, 1500);
    let ambient = fx.probe.latest(&fx.ambient_path).unwrap();
    approx::assert_abs_diff_eq!(ambient.volume, 0.3, epsilon = 1e-4);
    assert!(ambient.looping);

    let mut triggers = SegmentTriggers::for_artwork(&fx.artwork);
    let edges = triggers.update(&[true, false, false], &mut session);
    assert_eq!(edges, vec![("seg1".to_string(), Edge::Entered)]);
    assert_eq!(session.active_layers(), vec!["seg1".to_string()]);

    advance(&fx.audio, 1500);
    let layer = fx.probe.latest(&fx.layer_path).unwrap();
    assert!(layer.playing);
    approx::assert_abs_diff_eq!(layer.volume, 0.5, epsilon = 1e-4);

    // seg1 scrolls out while seg2 (no layer) scrolls in.
    triggers.update(&[false, true, false], &mut session);
    assert_eq!(session.active_layers(), vec!["seg1".to_string()]);
    advance(&fx.audio, 1499);
    assert!(fx.probe.latest(&fx.layer_path).unwrap().playing);
    advance(&fx.audio, 1);
    assert!(session.active_layers().is_empty());
    assert!(!fx.probe.latest(&fx.layer_path).unwrap().playing);

    // The ambient keeps looping underneath.
    assert!(fx.probe.latest(&fx.ambient_path).unwrap().playing);
}

#[tokio::test]
async fn segments_without_a_layer_are_ignored() {
    let fx = fixture();
    let session =
        ArtworkAudio::mount(&fx.artwork, fx.audio.clone(), &fx.loader, AudioOptions::default())
            .await;

    assert!(!session.play_layer("seg2"));
    assert!(!session.play_layer("nope"));
    assert!(session.active_layers().is_empty());
}

#[tokio::test]
async fn missing_assets_are_skipped() {
    let fx = fixture();
    let session =
        ArtworkAudio::mount(&fx.artwork, fx.audio.clone(), &fx.loader, AudioOptions::default())
            .await;

    assert!(!session.has_layer("seg3"));
    assert!(!session.play_layer("seg3"));
    // Only the one resolvable layer reached the backend.
    assert_eq!(fx.probe.loaded_count(), 1);
    let has_seg3 = fx.audio.with(|engine| engine.has_layer("seg3")).unwrap();
    assert!(!has_seg3);
}

#[tokio::test]
async fn autoplay_starts_the_ambient_on_mount() {
    let fx = fixture();
    let options = AudioOptions {
        autoplay: true,
        ..AudioOptions::default()
    };
    let _session = ArtworkAudio::mount(&fx.artwork, fx.audio.clone(), &fx.loader, options).await;

    let ambient = fx.probe.latest(&fx.ambient_path).unwrap();
    assert!(ambient.playing);
    assert_eq!(ambient.play_count, 1);
}

#[tokio::test]
async fn unmount_releases_every_sound() {
    let fx = fixture();
    let options = AudioOptions {
        autoplay: true,
        ..AudioOptions::default()
    };
    let session = ArtworkAudio::mount(&fx.artwork, fx.audio.clone(), &fx.loader, options).await;
    session.play_layer("seg1");
    assert!(!fx.probe.live(&fx.layer_path).is_empty());

    drop(session);

    assert!(fx.probe.live(&fx.ambient_path).is_empty());
    assert!(fx.probe.live(&fx.layer_path).is_empty());
    let layer_count = fx.audio.with(|engine| engine.registry().layer_count()).unwrap();
    assert_eq!(layer_count, 0);
    assert!(fx.audio.with(|engine| engine.ambient().is_none()).unwrap());
}

#[tokio::test]
async fn remounting_replaces_the_previous_artwork() {
    let fx = fixture();
    let first =
        ArtworkAudio::mount(&fx.artwork, fx.audio.clone(), &fx.loader, AudioOptions::default())
            .await;
    first.play_layer("seg1");
    let second =
        ArtworkAudio::mount(&fx.artwork, fx.audio.clone(), &fx.loader, AudioOptions::default())
            .await;

    // The old layer handle was released, a fresh idle one took its place.
    assert_eq!(fx.probe.live(&fx.layer_path).len(), 1);
    assert_eq!(
        fx.audio.with(|engine| engine.layer_state("seg1")).unwrap(),
        Some(LayerState::Idle)
    );
    assert!(second.active_layers().is_empty());

    // Closing the replaced page must not touch the new one.
    drop(first);
    assert_eq!(fx.probe.live(&fx.layer_path).len(), 1);
    assert!(second.play_layer("seg1"));
    assert_eq!(second.active_layers(), vec!["seg1".to_string()]);
}

#[tokio::test]
async fn loading_the_next_artwork_keeps_its_audio() {
    let fx = fixture();
    let options = AudioOptions {
        autoplay: true,
        ..AudioOptions::default()
    };
    let mut session = ArtworkAudio::mount(&fx.artwork, fx.audio.clone(), &fx.loader, options).await;
    session.play_layer("seg1");
    assert_eq!(session.artwork_id(), "art_real_01");

    // The old session is dropped only after the new one has mounted.
    session = ArtworkAudio::mount(&fx.next_artwork, fx.audio.clone(), &fx.loader, options).await;

    assert_eq!(session.artwork_id(), "art_real_02");
    assert!(fx.audio.with(|engine| engine.has_layer("segB")).unwrap());
    assert!(!fx.audio.with(|engine| engine.has_layer("seg1")).unwrap());
    assert!(session.play_layer("segB"));

    let snapshot = session.snapshot();
    assert!(snapshot.ambient_playing);
    assert_eq!(snapshot.active_layers, vec!["segB".to_string()]);
    assert_eq!(snapshot.total_layers, 1);

    // The first artwork's sounds are gone; the second's are live.
    assert!(fx.probe.live(&fx.ambient_path).is_empty());
    assert!(fx.probe.live(&fx.layer_path).is_empty());
    let wind = fx
        .probe
        .sounds()
        .into_iter()
        .filter(|s| s.uri.ends_with("wind.mp3") && !s.released)
        .count();
    assert_eq!(wind, 1);

    drop(session);
    assert_eq!(fx.audio.with(|engine| engine.registry().layer_count()), Some(0));
}

#[tokio::test]
async fn master_volume_and_mute_reach_the_sounds() {
    let fx = fixture();
    let session =
        ArtworkAudio::mount(&fx.artwork, fx.audio.clone(), &fx.loader, AudioOptions::default())
            .await;
    session.play_ambient();
    advance(&fx.audio, 1500);

    assert_eq!(session.set_volume(0.5), 0.5);
    let ambient = fx.probe.latest(&fx.ambient_path).unwrap();
    approx::assert_abs_diff_eq!(ambient.volume, 0.15, epsilon = 1e-4);

    assert!(session.toggle_mute());
    assert!(session.is_muted());
    assert_eq!(fx.probe.latest(&fx.ambient_path).unwrap().volume, 0.0);

    assert!(!session.toggle_mute());
    assert_eq!(session.volume(), 0.5);
    let ambient = fx.probe.latest(&fx.ambient_path).unwrap();
    approx::assert_abs_diff_eq!(ambient.volume, 0.15, epsilon = 1e-4);
}
