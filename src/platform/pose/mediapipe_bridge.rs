// MediaPipe integration bridge
// Abstracts over whatever produces body landmarks: a live detector, or a
// recording of one replayed from disk.

use crate::models::pose::{BodyLandmark, Keypoint3D, PoseError, PoseFrame, PoseResult};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Detector output for a single video frame
#[derive(Debug, Clone)]
pub struct MediaPipeResult {
    pub timestamp: i64,
    pub body_pose: Option<PoseFrame>, // None when no person was found
    pub processing_time_ms: u64,
}

/// MediaPipe bridge trait
/// Implement this for each landmark backend
pub trait MediaPipeBridge: Send {
    /// Landmarks for the next frame, or `None` once the source is exhausted
    fn next_result(&mut self) -> PoseResult<Option<MediaPipeResult>>;

    /// Check if the backend is ready to produce results
    fn is_initialized(&self) -> bool;

    /// Get model info
    fn get_model_info(&self) -> String;
}

// ==============================================================================
// Replay Implementation (recorded landmark JSON lines)
// ==============================================================================

/// Replays detector output recorded as JSON lines, one frame per line:
///
/// ```text
/// {"timestamp": 1000, "keypoints": [{"x": 0.5, "y": 0.2, "visibility": 0.99}, null, ...]}
/// {"timestamp": 1033}
/// ```
///
/// Keypoints are in MediaPipe index order. A missing or null `keypoints`
/// field means no person was detected in that frame. Lines that fail to
/// parse are logged and skipped.
pub struct ReplayMediaPipe<R> {
    reader: R,
    source_name: String,
    line_number: usize,
    skipped_lines: usize,
}

impl ReplayMediaPipe<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> PoseResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| PoseError::SourceFailed(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_reader(BufReader::new(file), path.display().to_string()))
    }
}

impl<R: BufRead> ReplayMediaPipe<R> {
    pub fn from_reader(reader: R, source_name: impl Into<String>) -> Self {
        Self {
            reader,
            source_name: source_name.into(),
            line_number: 0,
            skipped_lines: 0,
        }
    }

    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }
}

impl<R: BufRead + Send> MediaPipeBridge for ReplayMediaPipe<R> {
    fn next_result(&mut self) -> PoseResult<Option<MediaPipeResult>> {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| PoseError::SourceFailed(format!("{}: {}", self.source_name, e)))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            // A corrupt line is one bad record, not the end of the recording
            let parsed = std::str::from_utf8(&buf)
                .map_err(|e| PoseError::InvalidLandmarks(e.to_string()))
                .map(str::trim)
                .and_then(|line| {
                    if line.is_empty() {
                        return Ok(None);
                    }
                    let value = serde_json::from_str::<Value>(line)
                        .map_err(|e| PoseError::InvalidLandmarks(e.to_string()))?;
                    parse_result(&value).map(Some)
                });

            match parsed {
                Ok(Some(result)) => return Ok(Some(result)),
                Ok(None) => continue,
                Err(e) => {
                    self.skipped_lines += 1;
                    tracing::warn!(
                        source = %self.source_name,
                        line = self.line_number,
                        "skipping landmark record: {}",
                        e
                    );
                }
            }
        }
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn get_model_info(&self) -> String {
        format!("Recorded MediaPipe Pose landmarks ({})", self.source_name)
    }
}

// ==============================================================================
// Parsing
// ==============================================================================

/// Parse one recorded detector result
pub fn parse_result(data: &Value) -> PoseResult<MediaPipeResult> {
    let timestamp = data
        .get("timestamp")
        .and_then(|t| t.as_i64())
        .ok_or_else(|| PoseError::InvalidLandmarks("Missing timestamp".to_string()))?;

    let processing_time_ms = data
        .get("processing_time_ms")
        .and_then(|t| t.as_u64())
        .unwrap_or(0);

    let body_pose = match data.get("keypoints") {
        None | Some(Value::Null) => None,
        Some(keypoints) => Some(parse_body_pose(timestamp, keypoints)?),
    };

    Ok(MediaPipeResult {
        timestamp,
        body_pose,
        processing_time_ms,
    })
}

/// Parse an index-ordered keypoint array into a frame
pub fn parse_body_pose(timestamp: i64, keypoints: &Value) -> PoseResult<PoseFrame> {
    let keypoints = keypoints
        .as_array()
        .ok_or_else(|| PoseError::InvalidLandmarks("keypoints must be an array".to_string()))?;

    if keypoints.len() > BodyLandmark::COUNT {
        return Err(PoseError::InvalidLandmarks(format!(
            "expected at most {} keypoints, got {}",
            BodyLandmark::COUNT,
            keypoints.len()
        )));
    }

    let points = keypoints
        .iter()
        .map(|kp| match kp {
            Value::Null => Ok(None),
            kp => parse_keypoint(kp).map(Some),
        })
        .collect::<PoseResult<Vec<_>>>()?;

    Ok(PoseFrame::from_indexed(timestamp, &points))
}

fn parse_keypoint(data: &Value) -> PoseResult<Keypoint3D> {
    let coord = |name: &str| -> PoseResult<f32> {
        data.get(name)
            .and_then(|v| v.as_f64())
            .map(|v| v as f32)
            .ok_or_else(|| PoseError::InvalidLandmarks(format!("keypoint missing {}", name)))
    };

    Ok(Keypoint3D {
        x: coord("x")?,
        y: coord("y")?,
        z: data.get("z").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
        visibility: data.get("visibility").and_then(|v| v.as_f64()).map(|v| v as f32),
    })
}
