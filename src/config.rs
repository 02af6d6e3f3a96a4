use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::analysis::{DEFAULT_FPS, DEFAULT_MAX_FREQ, DEFAULT_MIN_FREQ, DEFAULT_WINDOW_SIZE};
use crate::audio::weighting::DEFAULT_DB_REFERENCE;

pub const DEFAULT_OUTPUT_DIR: &str = "../public/fft";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_min_freq")]
    pub min_freq: f64,
    #[serde(default = "default_max_freq")]
    pub max_freq: f64,
    #[serde(default = "default_db_reference")]
    pub db_reference: f64,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            fps: default_fps(),
            min_freq: default_min_freq(),
            max_freq: default_max_freq(),
            db_reference: default_db_reference(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_window_size() -> usize { DEFAULT_WINDOW_SIZE }
fn default_fps() -> u32 { DEFAULT_FPS }
fn default_min_freq() -> f64 { DEFAULT_MIN_FREQ }
fn default_max_freq() -> f64 { DEFAULT_MAX_FREQ }
fn default_db_reference() -> f64 { DEFAULT_DB_REFERENCE }
fn default_output_dir() -> PathBuf { PathBuf::from(DEFAULT_OUTPUT_DIR) }

/// Explicit path, else `notefft.toml` in the working directory, else the
/// per-user config file.
pub fn find_config(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    let local = PathBuf::from("notefft.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("notefft").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("notefft").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config: {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}
