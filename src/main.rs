mod audio;
mod cli;
mod config;
mod encode;
mod error;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Config file values fill in whatever the command line left at default
    if let Some(path) = config::find_config(cli.config.clone()) {
        match config::load_config(&path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cli.apply_config(cfg);
            }
            Err(err) => log::warn!("Ignoring config: {:#}", err),
        }
    }

    let input = cli.input_path();
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let output = encode::json::output_path(&cli.output_dir, &cli.audio);
    let params = cli.analysis_params();

    log::info!("notefft - note level analysis");
    log::info!("Input: {}", input.display());
    log::info!("Output: {}", output.display());
    log::info!(
        "Window: {} samples @ {}fps, band {}-{} Hz",
        params.window_size,
        params.fps,
        params.min_freq,
        params.max_freq
    );

    // 1. Decode audio
    log::info!("Decoding audio...");
    let audio_data = audio::decode::decode_audio(&input)?;

    // 2. Analyze (per-frame pass, then global normalization)
    log::info!("Analyzing audio...");
    let frames = audio::analysis::analyze(&audio_data, &params)?;
    log::info!("Total frames: {}, Duration: {:.1}s", frames.len(), audio_data.duration());

    // 3. Emit
    encode::json::write_frames(&output, &frames)?;

    println!("Output complete: {}", output.display());
    Ok(())
}
