use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Samples advanced between windows so that frames land at `fps`.
pub fn hop_length(sample_rate: u32, fps: u32) -> usize {
    let hop = (sample_rate as f64 / fps.max(1) as f64).round() as usize;
    hop.max(1)
}

/// Number of full windows over the waveform padded by `window_size / 2` on
/// each side. For even windows this is `1 + num_samples / hop`; odd windows
/// lose one sample of padding and can lose the last frame.
pub fn frame_count(num_samples: usize, window_size: usize, hop: usize) -> usize {
    if num_samples == 0 {
        return 0;
    }
    let padded = num_samples + 2 * (window_size / 2);
    match padded.checked_sub(window_size) {
        Some(room) => 1 + room / hop.max(1),
        None => 0,
    }
}

/// Periodic Hann window (the FFT-friendly variant, no repeated endpoint).
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / size as f64).cos()) as f32
        })
        .collect()
}

/// Short-time magnitude spectra over a fully loaded waveform.
///
/// The waveform is conceptually zero-padded by `window_size / 2` samples on
/// both ends; frame `t` covers padded samples `[t * hop, t * hop + window_size)`.
/// Frames are computed on demand and independently, so callers may fan out
/// over frame indices in any order.
pub struct SpectralEngine<'a> {
    samples: &'a [f32],
    window_size: usize,
    hop: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl<'a> SpectralEngine<'a> {
    pub fn new(samples: &'a [f32], window_size: usize, hop: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(window_size);
        Self {
            samples,
            window_size,
            hop: hop.max(1),
            window: hann_window(window_size),
            fft,
        }
    }

    pub fn num_frames(&self) -> usize {
        frame_count(self.samples.len(), self.window_size, self.hop)
    }

    /// Bins per spectrum: `window_size / 2 + 1`.
    pub fn num_bins(&self) -> usize {
        self.window_size / 2 + 1
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Magnitude spectrum of frame `frame_idx`.
    pub fn magnitudes(&self, frame_idx: usize) -> Vec<f32> {
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.window_size];

        // Window start in original sample coordinates (may be negative).
        let start = (frame_idx * self.hop) as isize - (self.window_size / 2) as isize;
        let first = (-start).max(0) as usize;
        let last = (self.samples.len() as isize - start).clamp(0, self.window_size as isize) as usize;

        for i in first..last {
            let sample = self.samples[(start + i as isize) as usize];
            buffer[i] = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut buffer);

        buffer[..self.num_bins()].iter().map(|c| c.norm()).collect()
    }
}
