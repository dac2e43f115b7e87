// Data models for body landmarks, pose frames, and pose labels

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;

// ==============================================================================
// Pose Frame (per-frame landmark mapping)
// ==============================================================================

/// Landmarks of a single detected person in a single frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub timestamp: i64,
    pub landmarks: HashMap<BodyLandmark, Keypoint3D>,
}

impl PoseFrame {
    pub fn new(timestamp: i64, landmarks: HashMap<BodyLandmark, Keypoint3D>) -> Self {
        Self {
            timestamp,
            landmarks,
        }
    }

    /// Build a frame from a MediaPipe index-ordered landmark list.
    /// `None` entries (points the detector did not report) are left out,
    /// as is anything past the 33rd index.
    pub fn from_indexed(timestamp: i64, keypoints: &[Option<Keypoint3D>]) -> Self {
        let landmarks = keypoints
            .iter()
            .enumerate()
            .filter_map(|(index, kp)| {
                let landmark = BodyLandmark::from_index(index)?;
                kp.map(|kp| (landmark, kp))
            })
            .collect();

        Self {
            timestamp,
            landmarks,
        }
    }

    pub fn get(&self, landmark: BodyLandmark) -> Option<&Keypoint3D> {
        self.landmarks.get(&landmark)
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }
}

// ==============================================================================
// Body Landmarks (33 keypoints)
// ==============================================================================

/// MediaPipe Pose Landmark indices (33 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    pub const COUNT: usize = 33;

    pub const ALL: [BodyLandmark; Self::COUNT] = [
        BodyLandmark::Nose,
        BodyLandmark::LeftEyeInner,
        BodyLandmark::LeftEye,
        BodyLandmark::LeftEyeOuter,
        BodyLandmark::RightEyeInner,
        BodyLandmark::RightEye,
        BodyLandmark::RightEyeOuter,
        BodyLandmark::LeftEar,
        BodyLandmark::RightEar,
        BodyLandmark::MouthLeft,
        BodyLandmark::MouthRight,
        BodyLandmark::LeftShoulder,
        BodyLandmark::RightShoulder,
        BodyLandmark::LeftElbow,
        BodyLandmark::RightElbow,
        BodyLandmark::LeftWrist,
        BodyLandmark::RightWrist,
        BodyLandmark::LeftPinky,
        BodyLandmark::RightPinky,
        BodyLandmark::LeftIndex,
        BodyLandmark::RightIndex,
        BodyLandmark::LeftThumb,
        BodyLandmark::RightThumb,
        BodyLandmark::LeftHip,
        BodyLandmark::RightHip,
        BodyLandmark::LeftKnee,
        BodyLandmark::RightKnee,
        BodyLandmark::LeftAnkle,
        BodyLandmark::RightAnkle,
        BodyLandmark::LeftHeel,
        BodyLandmark::RightHeel,
        BodyLandmark::LeftFootIndex,
        BodyLandmark::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

// ==============================================================================
// Landmark coordinates
// ==============================================================================

/// A landmark position as reported by the detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint3D {
    pub x: f32, // Normalized [0, 1] for image coordinates
    pub y: f32, // Normalized [0, 1] for image coordinates, grows downward
    #[serde(default)]
    pub z: f32, // Depth relative to the hip midpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>, // Detector confidence [0, 1], if supplied
}

impl Keypoint3D {
    pub fn new(x: f32, y: f32, z: f32, visibility: Option<f32>) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }

    /// 2-D point without a visibility score
    pub fn xy(x: f32, y: f32) -> Self {
        Self::new(x, y, 0.0, None)
    }

    /// A point with no visibility score counts as fully visible
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility.map_or(true, |v| v >= threshold)
    }

    pub fn in_normalized_range(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && (0.0..=1.0).contains(&self.x)
            && (0.0..=1.0).contains(&self.y)
    }
}

// ==============================================================================
// Pose Labels
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseLabel {
    TPose,
    Heart,
    HandsUp,
    Waving,
    FoldedHands,
    ArmsCrossed,
    BendingDown,
    Sitting,
    Standing,
    HandsOnHips,
}

impl PoseLabel {
    /// Text shown when a frame has landmarks but no pose matched
    pub const UNKNOWN_TEXT: &'static str = "Unknown Pose";

    pub fn as_str(&self) -> &'static str {
        match self {
            PoseLabel::TPose => "T-Pose",
            PoseLabel::Heart => "Heart",
            PoseLabel::HandsUp => "Hands Up",
            PoseLabel::Waving => "Waving",
            PoseLabel::FoldedHands => "Folded Hands",
            PoseLabel::ArmsCrossed => "Arms Crossed",
            PoseLabel::BendingDown => "Bending Down",
            PoseLabel::Sitting => "Sitting",
            PoseLabel::Standing => "Standing",
            PoseLabel::HandsOnHips => "Hands on Hips",
        }
    }
}

impl fmt::Display for PoseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// Classification thresholds
// ==============================================================================

/// Margins used by the pose rules. Distances are in normalized image units,
/// angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseThresholds {
    pub min_visibility: f32,             // Landmarks below this are ignored
    pub raise_margin: f32,               // Wrist above shoulder by at least this (inclusive)
    pub level_tolerance: f32,            // |wrist - shoulder| strictly below this is "level"
    pub extended_elbow_deg: RangeInclusive<f32>, // Straight-arm elbow angle
    pub heart_wrist_gap: f32,
    pub forearm_vertical_tolerance: f32,
    pub folded_wrist_gap: f32,
    pub torso_fold: f32,                 // Shoulder/hip height gap separating bent from upright
    pub hip_tilt_tolerance: f32,
    pub wrist_hip_tolerance: f32,
}

impl Default for PoseThresholds {
    fn default() -> Self {
        Self {
            min_visibility: 0.5,
            raise_margin: 0.05,
            level_tolerance: 0.1,
            extended_elbow_deg: 160.0..=180.0,
            heart_wrist_gap: 0.3,
            forearm_vertical_tolerance: 0.1,
            folded_wrist_gap: 0.05,
            torso_fold: 0.2,
            hip_tilt_tolerance: 0.5,
            wrist_hip_tolerance: 0.1,
        }
    }
}

impl PoseThresholds {
    pub fn validate(&self) -> PoseResult<()> {
        let fractions = [
            ("min_visibility", self.min_visibility),
            ("raise_margin", self.raise_margin),
            ("level_tolerance", self.level_tolerance),
            ("heart_wrist_gap", self.heart_wrist_gap),
            ("forearm_vertical_tolerance", self.forearm_vertical_tolerance),
            ("folded_wrist_gap", self.folded_wrist_gap),
            ("torso_fold", self.torso_fold),
            ("hip_tilt_tolerance", self.hip_tilt_tolerance),
            ("wrist_hip_tolerance", self.wrist_hip_tolerance),
        ];

        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(PoseError::InvalidConfig(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }

        let (lo, hi) = (*self.extended_elbow_deg.start(), *self.extended_elbow_deg.end());
        if !(0.0..=180.0).contains(&lo) || !(0.0..=180.0).contains(&hi) || lo > hi {
            return Err(PoseError::InvalidConfig(format!(
                "extended_elbow_deg must be an ordered range within 0..=180, got {}..={}",
                lo, hi
            )));
        }

        Ok(())
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("Pose tracking not initialized")]
    NotInitialized,

    #[error("Pose tracking already running")]
    AlreadyRunning,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid landmark data: {0}")]
    InvalidLandmarks(String),

    #[error("Landmark source failed: {0}")]
    SourceFailed(String),
}

pub type PoseResult<T> = Result<T, PoseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypoint_visibility() {
        let keypoint = Keypoint3D::new(0.5, 0.5, 0.0, Some(0.8));
        assert!(keypoint.is_visible(0.5));
        assert!(keypoint.is_visible(0.8));
        assert!(!keypoint.is_visible(0.9));

        // No score from the detector means visible
        assert!(Keypoint3D::xy(0.5, 0.5).is_visible(1.0));
    }

    #[test]
    fn test_keypoint_range() {
        assert!(Keypoint3D::xy(0.0, 1.0).in_normalized_range());
        assert!(!Keypoint3D::xy(-0.01, 0.5).in_normalized_range());
        assert!(!Keypoint3D::xy(0.5, 1.2).in_normalized_range());
        assert!(!Keypoint3D::xy(f32::NAN, 0.5).in_normalized_range());
    }

    #[test]
    fn test_landmark_indices() {
        assert_eq!(BodyLandmark::from_index(0), Some(BodyLandmark::Nose));
        assert_eq!(BodyLandmark::from_index(15), Some(BodyLandmark::LeftWrist));
        assert_eq!(BodyLandmark::from_index(32), Some(BodyLandmark::RightFootIndex));
        assert_eq!(BodyLandmark::from_index(33), None);

        for (i, landmark) in BodyLandmark::ALL.iter().enumerate() {
            assert_eq!(landmark.index(), i);
        }
    }

    #[test]
    fn test_frame_from_indexed_skips_missing() {
        let mut points = vec![None; BodyLandmark::COUNT];
        points[BodyLandmark::LeftWrist.index()] = Some(Keypoint3D::xy(0.2, 0.3));
        points[BodyLandmark::RightWrist.index()] = Some(Keypoint3D::xy(0.8, 0.3));

        let frame = PoseFrame::from_indexed(42, &points);
        assert_eq!(frame.timestamp, 42);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.get(BodyLandmark::LeftWrist).map(|p| p.x), Some(0.2));
        assert!(frame.get(BodyLandmark::Nose).is_none());
    }

    #[test]
    fn test_frame_json_uses_landmark_names() {
        let json = r#"{"timestamp": 7, "landmarks": {"left_wrist": {"x": 0.25, "y": 0.5}}}"#;
        let frame: PoseFrame = serde_json::from_str(json).unwrap();
        let wrist = frame.get(BodyLandmark::LeftWrist).unwrap();
        assert_eq!(wrist.x, 0.25);
        assert_eq!(wrist.z, 0.0);
        assert_eq!(wrist.visibility, None);
    }

    #[test]
    fn test_label_strings() {
        assert_eq!(PoseLabel::TPose.as_str(), "T-Pose");
        assert_eq!(PoseLabel::HandsOnHips.to_string(), "Hands on Hips");
        assert_eq!(PoseLabel::UNKNOWN_TEXT, "Unknown Pose");
    }

    #[test]
    fn test_thresholds_validation() {
        let mut thresholds = PoseThresholds::default();
        assert!(thresholds.validate().is_ok());

        thresholds.raise_margin = 1.5;
        assert!(thresholds.validate().is_err());
        thresholds.raise_margin = 0.05;

        thresholds.extended_elbow_deg = 170.0..=150.0;
        assert!(thresholds.validate().is_err());

        thresholds.extended_elbow_deg = 160.0..=190.0;
        assert!(thresholds.validate().is_err());
    }
}
