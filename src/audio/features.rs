use serde::ser::{Serialize, SerializeMap, Serializer};

/// Running weighted-level sum for one semitone while a single frame is aggregated.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PitchBucket {
    pub sum: f64,
    pub count: u32,
}

impl PitchBucket {
    pub fn add(&mut self, level: f64) {
        self.sum += level;
        self.count += 1;
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Sparse semitone -> level map for one frame.
///
/// Entries keep their first-insertion order, which is also the order they
/// are written out in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteLevels(Vec<(i32, f64)>);

impl NoteLevels {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Set the level for `midi`, appending a new entry if the key is unseen.
    pub fn insert(&mut self, midi: i32, level: f64) {
        match self.0.iter_mut().find(|(key, _)| *key == midi) {
            Some(entry) => entry.1 = level,
            None => self.0.push((midi, level)),
        }
    }

    #[allow(dead_code)]
    pub fn get(&self, midi: i32) -> Option<f64> {
        self.0.iter().find(|(key, _)| *key == midi).map(|&(_, level)| level)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.0.iter().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|&(_, level)| level)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut f64> + '_ {
        self.0.iter_mut().map(|(_, level)| level)
    }

    /// Key with the highest level (first one wins on ties).
    pub fn loudest(&self) -> Option<(i32, f64)> {
        self.iter().fold(None, |best, (key, level)| match best {
            Some((_, top)) if top >= level => best,
            _ => Some((key, level)),
        })
    }
}

impl Serialize for NoteLevels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for &(midi, level) in &self.0 {
            map.serialize_entry(&note_key(midi), &level)?;
        }
        map.end()
    }
}

/// One output record: frame loudness plus normalized per-semitone levels.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct NoteFrame {
    /// Mean weighted level over every contributing bin (dB, clipped at 0)
    pub volume: f64,
    /// Per-semitone levels; weighted dB before normalization, 0.0-1.0 after
    pub notes: NoteLevels,
}

/// Serialized key for a semitone, e.g. `n69` for A4.
pub fn note_key(midi: i32) -> String {
    format!("n{}", midi)
}

/// Round to a fixed number of decimal digits.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_insertion_order() {
        let mut notes = NoteLevels::new();
        notes.insert(72, 1.0);
        notes.insert(60, 2.0);
        notes.insert(72, 3.0);
        let keys: Vec<i32> = notes.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![72, 60]);
        assert_eq!(notes.get(72), Some(3.0));
        assert_eq!(notes.get(61), None);
    }

    #[test]
    fn serializes_as_prefixed_map() {
        let mut notes = NoteLevels::new();
        notes.insert(69, 1.0);
        notes.insert(57, 0.25);
        let frame = NoteFrame { volume: 12.5, notes };
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"{"volume":12.5,"notes":{"n69":1.0,"n57":0.25}}"#);
    }

    #[test]
    fn empty_frame_serializes_empty_notes() {
        let json = serde_json::to_string(&NoteFrame::default()).unwrap();
        assert_eq!(json, r#"{"volume":0.0,"notes":{}}"#);
    }

    #[test]
    fn bucket_mean() {
        let mut bucket = PitchBucket::default();
        assert_eq!(bucket.mean(), None);
        bucket.add(2.0);
        bucket.add(4.0);
        assert_eq!(bucket.mean(), Some(3.0));
    }

    #[test]
    fn loudest_picks_max() {
        let mut notes = NoteLevels::new();
        notes.insert(60, 0.5);
        notes.insert(69, 0.9);
        notes.insert(70, 0.9);
        assert_eq!(notes.loudest(), Some((69, 0.9)));
        assert_eq!(NoteLevels::new().loudest(), None);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(0.99996, 4), 1.0);
        assert_eq!(round_to(-0.0001, 3), 0.0);
    }
}
