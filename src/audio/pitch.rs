use super::features::{round_to, NoteFrame, NoteLevels, PitchBucket};
use super::weighting::{a_weighting_db, weighted_level};

/// Fractional MIDI note number; 69 is A4 (440 Hz).
pub fn hz_to_midi(freq: f64) -> f64 {
    69.0 + 12.0 * (freq / 440.0).log2()
}

/// Nearest semitone, ties to even.
pub fn round_semitone(midi: f64) -> i32 {
    midi.round_ties_even() as i32
}

pub fn midi_key(freq: f64) -> i32 {
    round_semitone(hz_to_midi(freq))
}

/// Everything about a spectral bin that depends only on the window layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinPitch {
    pub index: usize,
    pub freq: f64,
    pub midi: i32,
    pub weight_db: f64,
}

/// In-band bins of one (sample rate, window size) layout, with their
/// semitone and A-weighting precomputed. Bins are stored in ascending
/// frequency order.
#[derive(Clone, Debug)]
pub struct PitchMap {
    bins: Vec<BinPitch>,
}

impl PitchMap {
    pub fn new(sample_rate: u32, window_size: usize, min_freq: f64, max_freq: f64) -> Self {
        let resolution = sample_rate as f64 / window_size as f64;
        let bins = (0..=window_size / 2)
            .filter_map(|index| {
                let freq = index as f64 * resolution;
                if freq < min_freq || freq > max_freq || freq <= 0.0 {
                    return None;
                }
                Some(BinPitch {
                    index,
                    freq,
                    midi: midi_key(freq),
                    weight_db: a_weighting_db(freq),
                })
            })
            .collect();
        Self { bins }
    }

    pub fn bins(&self) -> &[BinPitch] {
        &self.bins
    }

    /// Lowest and highest semitone reachable from this layout.
    pub fn midi_range(&self) -> Option<(i32, i32)> {
        Some((self.bins.first()?.midi, self.bins.last()?.midi))
    }

    /// Accumulate one magnitude spectrum into per-semitone buckets.
    ///
    /// Buckets come back in first-insertion order.
    pub fn accumulate(&self, magnitudes: &[f32], db_reference: f64) -> Vec<(i32, PitchBucket)> {
        let mut buckets: Vec<(i32, PitchBucket)> = Vec::new();
        for bin in &self.bins {
            let Some(&amplitude) = magnitudes.get(bin.index) else {
                continue;
            };
            let Some(level) = weighted_level(amplitude as f64, bin.weight_db, db_reference) else {
                continue;
            };
            // Bins arrive in ascending pitch, so the open bucket is nearly always last.
            match buckets.iter_mut().rev().find(|(midi, _)| *midi == bin.midi) {
                Some((_, bucket)) => bucket.add(level),
                None => {
                    let mut bucket = PitchBucket::default();
                    bucket.add(level);
                    buckets.push((bin.midi, bucket));
                }
            }
        }
        buckets
    }

    pub fn analyze_frame(&self, magnitudes: &[f32], db_reference: f64) -> NoteFrame {
        summarize(&self.accumulate(magnitudes, db_reference))
    }
}

/// Collapse a frame's buckets into per-semitone means plus overall volume.
///
/// Volume is taken from the raw sums and counts, so semitones covering more
/// bins weigh more than in a plain mean of the note levels.
pub fn summarize(buckets: &[(i32, PitchBucket)]) -> NoteFrame {
    let mut notes = NoteLevels::new();
    let mut total = 0.0;
    let mut count = 0u64;

    for (midi, bucket) in buckets {
        if let Some(mean) = bucket.mean() {
            notes.insert(*midi, round_to(mean, 3));
            total += bucket.sum;
            count += bucket.count as u64;
        }
    }

    let volume = if count == 0 {
        0.0
    } else {
        round_to((total / count as f64).max(0.0), 3)
    };

    NoteFrame { volume, notes }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semitone_mapping() {
        assert_eq!(midi_key(440.0), 69);
        assert_eq!(midi_key(880.0), 81);
        assert_eq!(midi_key(220.0), 57);
        assert_eq!(midi_key(261.63), 60);
        assert_eq!(midi_key(50.0), 31);
        assert_eq!(midi_key(4000.0), 107);
    }

    #[test]
    fn ties_round_to_even() {
        assert_eq!(round_semitone(68.5), 68);
        assert_eq!(round_semitone(69.5), 70);
        assert_eq!(round_semitone(69.49), 69);
        assert_eq!(round_semitone(69.51), 70);
    }

    #[test]
    fn map_keeps_only_band() {
        let map = PitchMap::new(44100, 16384, 50.0, 4000.0);
        assert!(!map.bins().is_empty());
        for bin in map.bins() {
            assert!(bin.freq >= 50.0 && bin.freq <= 4000.0);
            assert!(bin.weight_db.is_finite());
        }
        assert!(map.bins().windows(2).all(|w| w[0].index < w[1].index));
        // First in-band bin is 51.1 Hz, last is 3999.8 Hz
        assert_eq!(map.midi_range(), Some((32, 107)));
    }

    #[test]
    fn map_empty_when_band_unreachable() {
        // Nyquist at 40 Hz: no bin reaches 50 Hz.
        let map = PitchMap::new(80, 1024, 50.0, 4000.0);
        assert!(map.bins().is_empty());
        assert_eq!(map.midi_range(), None);
        let frame = map.analyze_frame(&vec![1.0; 513], 1.0);
        assert_eq!(frame, NoteFrame::default());
    }

    #[test]
    fn silent_spectrum_reports_every_key_at_zero() {
        let map = PitchMap::new(44100, 4096, 50.0, 4000.0);
        let frame = map.analyze_frame(&vec![0.0; 2049], 1.0);
        assert_eq!(frame.volume, 0.0);
        let mut expected: Vec<i32> = map.bins().iter().map(|b| b.midi).collect();
        expected.dedup();
        let keys: Vec<i32> = frame.notes.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, expected);
        assert!(frame.notes.values().all(|v| v == 0.0));
    }

    #[test]
    fn zero_bins_count_toward_the_mean() {
        let map = PitchMap::new(1000, 1000, 435.0, 445.0);
        let mut mags = vec![0.0f32; 501];
        for bin in map.bins().iter().take(5) {
            mags[bin.index] = 1000.0;
        }
        let buckets = map.accumulate(&mags, 1.0);
        assert_eq!(buckets.len(), 1);
        let (_, bucket) = buckets[0];
        assert_eq!(bucket.count, 11);

        let expected_sum: f64 = map
            .bins()
            .iter()
            .take(5)
            .map(|b| 60.0 + b.weight_db)
            .sum();
        assert!((bucket.sum - expected_sum).abs() < 1e-6);
        assert!((bucket.mean().unwrap() - expected_sum / 11.0).abs() < 1e-9);
    }

    #[test]
    fn accumulates_per_semitone() {
        // 1 Hz bins make the arithmetic easy to follow.
        let map = PitchMap::new(1000, 1000, 435.0, 445.0);
        let mut mags = vec![0.0f32; 501];
        for bin in map.bins() {
            mags[bin.index] = 1000.0;
        }
        let buckets = map.accumulate(&mags, 1.0);
        assert_eq!(buckets.len(), 1);
        let (midi, bucket) = buckets[0];
        assert_eq!(midi, 69);
        assert_eq!(bucket.count, 11);
        // 60 dB plus a few dB of negative weighting, never below 0
        let mean = bucket.mean().unwrap();
        assert!(mean > 50.0 && mean < 60.0);
    }

    #[test]
    fn negative_levels_are_clipped() {
        let map = PitchMap::new(1000, 1000, 435.0, 445.0);
        let mags = vec![1e-6f32; 501];
        let frame = map.analyze_frame(&mags, 1.0);
        assert_eq!(frame.notes.get(69), Some(0.0));
        assert_eq!(frame.volume, 0.0);
    }

    #[test]
    fn volume_uses_raw_sums() {
        let mut a = PitchBucket::default();
        a.add(10.0);
        a.add(20.0);
        a.add(30.0);
        let mut b = PitchBucket::default();
        b.add(2.0);
        let frame = summarize(&[(60, a), (61, b)]);
        assert_eq!(frame.notes.get(60), Some(20.0));
        assert_eq!(frame.notes.get(61), Some(2.0));
        // (60 + 2) / 4, not (20 + 2) / 2
        assert_eq!(frame.volume, 15.5);
    }

    #[test]
    fn note_means_are_rounded() {
        let mut bucket = PitchBucket::default();
        bucket.add(1.0);
        bucket.add(1.0);
        bucket.add(2.0);
        let frame = summarize(&[(69, bucket)]);
        assert_eq!(frame.notes.get(69), Some(1.333));
        assert_eq!(frame.volume, 1.333);
    }
}
