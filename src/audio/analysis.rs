use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashMap;

use super::decode::AudioData;
use super::features::{note_key, NoteFrame};
use super::normalize::normalize;
use super::pitch::PitchMap;
use super::stft::{hop_length, SpectralEngine};
use super::weighting::DEFAULT_DB_REFERENCE;
use crate::error::AnalysisError;

pub const DEFAULT_WINDOW_SIZE: usize = 16384;
pub const DEFAULT_FPS: u32 = 60;
pub const DEFAULT_MIN_FREQ: f64 = 50.0;
pub const DEFAULT_MAX_FREQ: f64 = 4000.0;

#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisParams {
    pub window_size: usize,
    pub fps: u32,
    pub min_freq: f64,
    pub max_freq: f64,
    pub db_reference: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            fps: DEFAULT_FPS,
            min_freq: DEFAULT_MIN_FREQ,
            max_freq: DEFAULT_MAX_FREQ,
            db_reference: DEFAULT_DB_REFERENCE,
        }
    }
}

impl AnalysisParams {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.window_size < 2 {
            return Err(AnalysisError::WindowTooSmall(self.window_size));
        }
        if self.fps == 0 {
            return Err(AnalysisError::ZeroFps);
        }
        if !(self.min_freq > 0.0 && self.min_freq <= self.max_freq && self.max_freq.is_finite()) {
            return Err(AnalysisError::InvalidBand {
                min: self.min_freq,
                max: self.max_freq,
            });
        }
        if !(self.db_reference > 0.0 && self.db_reference.is_finite()) {
            return Err(AnalysisError::InvalidReference(self.db_reference));
        }
        Ok(())
    }
}

/// Turn a waveform into normalized per-frame note levels.
///
/// Pass 1 analyzes every frame independently (in parallel, order kept by
/// frame index). Pass 2 needs all of pass 1 to find the global note range,
/// then rescales each frame's notes against it.
pub fn analyze(audio: &AudioData, params: &AnalysisParams) -> Result<Vec<NoteFrame>, AnalysisError> {
    params.validate()?;
    if audio.sample_rate == 0 {
        return Err(AnalysisError::ZeroSampleRate);
    }

    let hop = hop_length(audio.sample_rate, params.fps);
    let engine = SpectralEngine::new(&audio.samples, params.window_size, hop);
    let pitch_map = PitchMap::new(audio.sample_rate, params.window_size, params.min_freq, params.max_freq);

    log::debug!(
        "window={} hop={} bins={} in-band={} ({:?} .. {:?} Hz) semitones={:?}",
        params.window_size,
        engine.hop(),
        engine.num_bins(),
        pitch_map.bins().len(),
        pitch_map.bins().first().map(|b| b.freq),
        pitch_map.bins().last().map(|b| b.freq),
        pitch_map.midi_range()
    );
    if pitch_map.bins().is_empty() {
        log::warn!(
            "No spectral bin falls within {}-{} Hz at {}Hz; every frame will be empty",
            params.min_freq,
            params.max_freq,
            audio.sample_rate
        );
    }

    log::info!("Pass 1: Per-frame pitch analysis ({} frames)...", engine.num_frames());
    let mut frames = pass1_frames(&engine, &pitch_map, params.db_reference);

    log::info!("Pass 2: Global normalization...");
    match normalize(&mut frames) {
        Some(bounds) => log::info!("Note level range: {:.3} - {:.3} dB", bounds.min, bounds.max),
        None => log::info!("No note levels found, nothing to normalize"),
    }
    log_dominant_note(&frames);

    Ok(frames)
}

fn log_dominant_note(frames: &[NoteFrame]) {
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for (midi, _) in frames.iter().filter_map(|f| f.notes.loudest()) {
        *counts.entry(midi).or_default() += 1;
    }
    // Lowest note wins a tie so the log line is stable between runs
    if let Some((midi, count)) = counts.into_iter().max_by_key(|&(midi, count)| (count, -midi)) {
        log::info!(
            "Most frequent dominant note: {} ({}/{} frames)",
            note_key(midi),
            count,
            frames.len()
        );
    }
}

fn pass1_frames(engine: &SpectralEngine<'_>, pitch_map: &PitchMap, db_reference: f64) -> Vec<NoteFrame> {
    let total = engine.num_frames();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let frames: Vec<NoteFrame> = (0..total)
        .into_par_iter()
        .map(|frame_idx| {
            let magnitudes = engine.magnitudes(frame_idx);
            let frame = pitch_map.analyze_frame(&magnitudes, db_reference);
            pb.inc(1);
            frame
        })
        .collect();

    pb.finish_and_clear();
    frames
}
