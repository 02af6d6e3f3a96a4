use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::audio::features::NoteFrame;

/// `<output_dir>/<name>_fft.json`, where `name` is the last component of the
/// input identifier so the file always lands inside `output_dir`.
pub fn output_path(output_dir: &Path, audio_id: &str) -> PathBuf {
    let name = Path::new(audio_id)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(audio_id);
    output_dir.join(format!("{}_fft.json", name))
}

/// Compact JSON array of frame records.
pub fn encode_frames(frames: &[NoteFrame]) -> Result<Vec<u8>> {
    serde_json::to_vec(frames).context("Failed to serialize frames")
}

/// Serialize fully in memory, then write the file in one go.
pub fn write_frames(path: &Path, frames: &[NoteFrame]) -> Result<()> {
    let bytes = encode_frames(frames)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    std::fs::write(path, &bytes)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;

    log::info!("Wrote {} frames ({} bytes) to {}", frames.len(), bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::features::NoteLevels;

    #[test]
    fn output_path_stays_in_dir() {
        let dir = Path::new("../public/fft");
        assert_eq!(output_path(dir, "song"), PathBuf::from("../public/fft/song_fft.json"));
        assert_eq!(output_path(dir, "music/song"), PathBuf::from("../public/fft/song_fft.json"));
    }

    #[test]
    fn writes_compact_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out_fft.json");

        let mut notes = NoteLevels::new();
        notes.insert(69, 1.0);
        notes.insert(70, 0.1234);
        let frames = vec![
            NoteFrame { volume: 3.712, notes },
            NoteFrame::default(),
        ];

        write_frames(&path, &frames).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            r#"[{"volume":3.712,"notes":{"n69":1.0,"n70":0.1234}},{"volume":0.0,"notes":{}}]"#
        );

        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed[0]["notes"]["n69"], 1.0);
    }

    #[test]
    fn empty_sequence_is_empty_array() {
        assert_eq!(encode_frames(&[]).unwrap(), b"[]".to_vec());
    }
}
