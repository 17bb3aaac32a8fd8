//! Audio extraction and processing utilities.
//!
//! Uses ffmpeg to pull the audio track out of media files and ffprobe to
//! measure durations before splitting long recordings.

use crate::error::{QuizError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Extracts the audio track of a media file as MP3.
///
/// The output is named after the source file stem and written to `output_dir`.
#[instrument(skip(output_dir), fields(source = %source.display()))]
pub async fn extract_audio(source: &Path, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    let target_path = output_dir.join(format!("{}.mp3", stem));

    info!("Extracting audio track to {:?}", target_path);

    let result = Command::new("ffmpeg")
        .arg("-i").arg(source)
        .arg("-vn")
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("4")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(&target_path)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(target_path),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(QuizError::Audio(format!("ffmpeg audio extraction failed: {err}")))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(QuizError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(QuizError::Audio(format!("ffmpeg error: {e}"))),
    }
}

/// Segments a long audio file into smaller pieces for transcription.
///
/// Each piece will be approximately `chunk_seconds` long. Returns tuples of
/// (piece_path, offset_seconds) for each piece.
#[instrument(skip_all)]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    chunk_seconds: u32,
) -> Result<Vec<(PathBuf, f64)>> {
    std::fs::create_dir_all(output_dir)?;

    let total_duration = probe_duration(source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    let chunk_len = chunk_seconds.max(1) as f64;

    if total_duration <= chunk_len {
        return Ok(vec![(source.to_path_buf(), 0.0)]);
    }

    let base_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");

    let mut pieces = Vec::new();
    let mut offset = 0.0;
    let mut idx = 0u32;

    while offset < total_duration {
        let piece_path = output_dir.join(format!("{}_{:04}.mp3", base_name, idx));
        let piece_len = chunk_len.min(total_duration - offset);

        extract_segment(source, &piece_path, offset, piece_len).await?;

        debug!("Created piece {} at offset {:.1}s", idx, offset);
        pieces.push((piece_path, offset));

        offset += chunk_len;
        idx += 1;
    }

    info!("Created {} audio pieces", pieces.len());
    Ok(pieces)
}

/// Extracts a time segment from an audio file.
async fn extract_segment(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    let copy_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("warning")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if let Ok(status) = copy_result {
        if status.success() && dest.exists() {
            return Ok(());
        }
    }

    warn!("Stream copy failed, re-encoding segment");

    let encode_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("4")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match encode_result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(QuizError::Audio(format!("Segment extraction failed: {err}")))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(QuizError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(QuizError::Audio(format!("ffmpeg error: {e}"))),
    }
}

/// Queries the duration of an audio file using ffprobe with JSON output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(QuizError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(QuizError::Audio(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(QuizError::Audio("ffprobe returned error".into()));
    }

    parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
}

/// Reads `format.duration` out of ffprobe's JSON output.
fn parse_probe_duration(json_str: &str) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|_| QuizError::Audio("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| QuizError::Audio("Could not determine audio duration".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_duration() {
        let json = r#"{"format": {"filename": "a.mp3", "duration": "125.480000"}}"#;
        assert!((parse_probe_duration(json).unwrap() - 125.48).abs() < 1e-6);
    }

    #[test]
    fn test_parse_probe_duration_missing() {
        assert!(parse_probe_duration(r#"{"format": {}}"#).is_err());
        assert!(parse_probe_duration("not json").is_err());
    }
}
