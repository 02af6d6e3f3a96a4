use clap::Parser;
use std::path::PathBuf;

use crate::audio::analysis::{
    AnalysisParams, DEFAULT_FPS, DEFAULT_MAX_FREQ, DEFAULT_MIN_FREQ, DEFAULT_WINDOW_SIZE,
};
use crate::audio::weighting::DEFAULT_DB_REFERENCE;
use crate::config::{Config, DEFAULT_OUTPUT_DIR};

#[derive(Parser, Debug)]
#[command(name = "notefft", about = "Per-frame A-weighted note levels for audio-synced visuals")]
pub struct Cli {
    /// Input audio, without extension (e.g. `music/song` reads `music/song.wav`)
    pub audio: String,

    /// Extension appended to the input identifier
    #[arg(long, default_value = "wav")]
    pub ext: String,

    /// Directory the `<name>_fft.json` file is written to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Output frames per second (sets the hop length)
    #[arg(long, default_value_t = DEFAULT_FPS)]
    pub fps: u32,

    /// FFT window length in samples
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    pub window_size: usize,

    /// Lowest frequency (Hz) that contributes to notes
    #[arg(long, default_value_t = DEFAULT_MIN_FREQ)]
    pub min_freq: f64,

    /// Highest frequency (Hz) that contributes to notes
    #[arg(long, default_value_t = DEFAULT_MAX_FREQ)]
    pub max_freq: f64,

    /// Amplitude that maps to 0 dB
    #[arg(long, default_value_t = DEFAULT_DB_REFERENCE)]
    pub db_reference: f64,

    /// Config file (defaults to notefft.toml or the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn input_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.audio, self.ext))
    }

    /// Config values apply only where the flag was left at its default.
    pub fn apply_config(&mut self, cfg: Config) {
        if self.fps == DEFAULT_FPS { self.fps = cfg.analysis.fps; }
        if self.window_size == DEFAULT_WINDOW_SIZE { self.window_size = cfg.analysis.window_size; }
        if self.min_freq == DEFAULT_MIN_FREQ { self.min_freq = cfg.analysis.min_freq; }
        if self.max_freq == DEFAULT_MAX_FREQ { self.max_freq = cfg.analysis.max_freq; }
        if self.db_reference == DEFAULT_DB_REFERENCE { self.db_reference = cfg.analysis.db_reference; }
        if self.output_dir == PathBuf::from(DEFAULT_OUTPUT_DIR) { self.output_dir = cfg.output.dir; }
    }

    pub fn analysis_params(&self) -> AnalysisParams {
        AnalysisParams {
            window_size: self.window_size,
            fps: self.fps,
            min_freq: self.min_freq,
            max_freq: self.max_freq,
            db_reference: self.db_reference,
        }
    }
}
