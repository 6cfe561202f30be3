fn main() {
    if let Err(e) = gallery_audio_lib::run() {
        eprintln!("gallery-audio: {}", e);
        std::process::exit(1);
    }
}
