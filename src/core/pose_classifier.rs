// Pose classification - maps one frame of body landmarks to a named pose
//
// Rules are evaluated in declaration order and the first match wins. When
// several poses hold at once (a raised T-Pose also satisfies "Hands Up"),
// the earlier rule is the answer.

use crate::core::geometry::{height_above, horizontal_gap, joint_angle, mean_y, vertical_gap};
use crate::models::pose::{BodyLandmark, Keypoint3D, PoseFrame, PoseLabel, PoseThresholds};

/// A pose test over one frame. `None` means a landmark it needs is
/// unusable, which counts as "not matched".
pub type PosePredicate = fn(&Body<'_>) -> Option<bool>;

/// One recognizable pose: its label and the geometric test defining it
#[derive(Clone, Copy)]
pub struct PoseRule {
    pub label: PoseLabel,
    pub predicate: PosePredicate,
}

impl std::fmt::Debug for PoseRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseRule").field("label", &self.label).finish()
    }
}

/// Built-in poses, most specific first
pub const DEFAULT_RULES: &[PoseRule] = &[
    PoseRule { label: PoseLabel::TPose, predicate: t_pose },
    PoseRule { label: PoseLabel::Heart, predicate: heart },
    PoseRule { label: PoseLabel::HandsUp, predicate: hands_up },
    PoseRule { label: PoseLabel::Waving, predicate: waving },
    PoseRule { label: PoseLabel::FoldedHands, predicate: folded_hands },
    PoseRule { label: PoseLabel::ArmsCrossed, predicate: arms_crossed },
    PoseRule { label: PoseLabel::BendingDown, predicate: bending_down },
    PoseRule { label: PoseLabel::Sitting, predicate: sitting },
    PoseRule { label: PoseLabel::Standing, predicate: standing },
    PoseRule { label: PoseLabel::HandsOnHips, predicate: hands_on_hips },
];

// ==============================================================================
// Classifier
// ==============================================================================

#[derive(Debug, Clone)]
pub struct PoseClassifier {
    thresholds: PoseThresholds,
    rules: Vec<PoseRule>,
}

impl Default for PoseClassifier {
    fn default() -> Self {
        Self::new(PoseThresholds::default())
    }
}

impl PoseClassifier {
    pub fn new(thresholds: PoseThresholds) -> Self {
        Self::with_rules(thresholds, DEFAULT_RULES.to_vec())
    }

    /// Classifier over a custom rule list; order is priority
    pub fn with_rules(thresholds: PoseThresholds, rules: Vec<PoseRule>) -> Self {
        Self { thresholds, rules }
    }

    pub fn thresholds(&self) -> &PoseThresholds {
        &self.thresholds
    }

    pub fn rules(&self) -> &[PoseRule] {
        &self.rules
    }

    /// Label of the first rule the frame satisfies, or `None`
    pub fn classify(&self, frame: &PoseFrame) -> Option<PoseLabel> {
        classify_with(&self.rules, &self.thresholds, frame)
    }
}

/// Classify with the built-in rules and default thresholds
pub fn classify(frame: &PoseFrame) -> Option<PoseLabel> {
    classify_with(DEFAULT_RULES, &PoseThresholds::default(), frame)
}

fn classify_with(
    rules: &[PoseRule],
    thresholds: &PoseThresholds,
    frame: &PoseFrame,
) -> Option<PoseLabel> {
    if frame.is_empty() {
        return None;
    }

    let body = Body::new(frame, thresholds);
    rules
        .iter()
        .find(|rule| (rule.predicate)(&body) == Some(true))
        .map(|rule| rule.label)
}

// ==============================================================================
// Body view
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn shoulder(self) -> BodyLandmark {
        match self {
            Side::Left => BodyLandmark::LeftShoulder,
            Side::Right => BodyLandmark::RightShoulder,
        }
    }

    fn elbow(self) -> BodyLandmark {
        match self {
            Side::Left => BodyLandmark::LeftElbow,
            Side::Right => BodyLandmark::RightElbow,
        }
    }

    fn wrist(self) -> BodyLandmark {
        match self {
            Side::Left => BodyLandmark::LeftWrist,
            Side::Right => BodyLandmark::RightWrist,
        }
    }

    fn hip(self) -> BodyLandmark {
        match self {
            Side::Left => BodyLandmark::LeftHip,
            Side::Right => BodyLandmark::RightHip,
        }
    }
}

/// Read-only view of a frame that only hands out usable landmarks:
/// present, inside the normalized image, and visible enough.
pub struct Body<'a> {
    frame: &'a PoseFrame,
    thresholds: &'a PoseThresholds,
}

impl<'a> Body<'a> {
    pub fn new(frame: &'a PoseFrame, thresholds: &'a PoseThresholds) -> Self {
        Self { frame, thresholds }
    }

    pub fn thresholds(&self) -> &PoseThresholds {
        self.thresholds
    }

    pub fn point(&self, landmark: BodyLandmark) -> Option<&'a Keypoint3D> {
        self.frame.get(landmark).filter(|kp| {
            kp.in_normalized_range() && kp.is_visible(self.thresholds.min_visibility)
        })
    }

    pub fn elbow_angle(&self, side: Side) -> Option<f32> {
        joint_angle(
            self.point(side.shoulder())?,
            self.point(side.elbow())?,
            self.point(side.wrist())?,
        )
    }

    /// Wrist above its shoulder by at least the raise margin
    pub fn wrist_raised(&self, side: Side) -> Option<bool> {
        let wrist = self.point(side.wrist())?;
        let shoulder = self.point(side.shoulder())?;
        Some(height_above(wrist, shoulder) >= self.thresholds.raise_margin)
    }

    /// Wrist at shoulder height, within the level tolerance
    pub fn wrist_level(&self, side: Side) -> Option<bool> {
        let wrist = self.point(side.wrist())?;
        let shoulder = self.point(side.shoulder())?;
        Some(vertical_gap(wrist, shoulder) < self.thresholds.level_tolerance)
    }

    pub fn wrist_below_shoulder(&self, side: Side) -> Option<bool> {
        Some(self.point(side.wrist())?.y > self.point(side.shoulder())?.y)
    }

    pub fn wrist_over_elbow(&self, side: Side) -> Option<bool> {
        Some(self.point(side.wrist())?.y < self.point(side.elbow())?.y)
    }

    pub fn arm_extended(&self, side: Side) -> Option<bool> {
        let angle = self.elbow_angle(side)?;
        Some(self.thresholds.extended_elbow_deg.contains(&angle))
    }

    /// Forearm leaning sideways rather than pointing straight up or down
    pub fn forearm_slanted(&self, side: Side) -> Option<bool> {
        let gap = horizontal_gap(self.point(side.wrist())?, self.point(side.elbow())?);
        Some(gap >= self.thresholds.forearm_vertical_tolerance)
    }

    pub fn hand_up(&self, side: Side) -> Option<bool> {
        Some(self.wrist_raised(side)? && self.wrist_over_elbow(side)?)
    }

    pub fn wrist_gap(&self) -> Option<f32> {
        Some(horizontal_gap(
            self.point(BodyLandmark::LeftWrist)?,
            self.point(BodyLandmark::RightWrist)?,
        ))
    }

    pub fn shoulder_y(&self) -> Option<f32> {
        self.mean_y(BodyLandmark::LeftShoulder, BodyLandmark::RightShoulder)
    }

    pub fn hip_y(&self) -> Option<f32> {
        self.mean_y(BodyLandmark::LeftHip, BodyLandmark::RightHip)
    }

    pub fn knee_y(&self) -> Option<f32> {
        self.mean_y(BodyLandmark::LeftKnee, BodyLandmark::RightKnee)
    }

    fn mean_y(&self, a: BodyLandmark, b: BodyLandmark) -> Option<f32> {
        Some(mean_y(self.point(a)?, self.point(b)?))
    }

    /// Same test on both sides
    pub fn both(&self, test: impl Fn(Side) -> Option<bool>) -> Option<bool> {
        Some(test(Side::Left)? && test(Side::Right)?)
    }

    /// Test holds on at least one side. A side with unusable landmarks
    /// doesn't block the other.
    pub fn either(&self, test: impl Fn(Side) -> Option<bool>) -> Option<bool> {
        match (test(Side::Left), test(Side::Right)) {
            (None, None) => None,
            (left, right) => Some(left == Some(true) || right == Some(true)),
        }
    }
}

// ==============================================================================
// Built-in pose predicates
// ==============================================================================

fn t_pose(body: &Body<'_>) -> Option<bool> {
    body.both(|side| {
        let spread = body.wrist_raised(side)? || body.wrist_level(side)?;
        Some(body.arm_extended(side)? && spread)
    })
}

fn heart(body: &Body<'_>) -> Option<bool> {
    let close = body.wrist_gap()? < body.thresholds().heart_wrist_gap;
    Some(
        close
            && body.both(|side| body.hand_up(side))?
            && body.both(|side| body.forearm_slanted(side))?,
    )
}

fn hands_up(body: &Body<'_>) -> Option<bool> {
    body.both(|side| body.hand_up(side))
}

fn waving(body: &Body<'_>) -> Option<bool> {
    body.either(|side| body.hand_up(side))
}

fn folded_hands(body: &Body<'_>) -> Option<bool> {
    let together = body.wrist_gap()? < body.thresholds().folded_wrist_gap;
    Some(
        together
            && body.both(|side| body.wrist_over_elbow(side))?
            && body.both(|side| body.wrist_below_shoulder(side))?,
    )
}

fn arms_crossed(body: &Body<'_>) -> Option<bool> {
    let left_wrist = body.point(BodyLandmark::LeftWrist)?;
    let right_wrist = body.point(BodyLandmark::RightWrist)?;
    let left_shoulder = body.point(BodyLandmark::LeftShoulder)?;
    let right_shoulder = body.point(BodyLandmark::RightShoulder)?;

    let crossed = left_wrist.x > right_shoulder.x && right_wrist.x < left_shoulder.x;
    Some(crossed && body.both(|side| body.wrist_over_elbow(side))?)
}

fn bending_down(body: &Body<'_>) -> Option<bool> {
    let (shoulder_y, hip_y, knee_y) = (body.shoulder_y()?, body.hip_y()?, body.knee_y()?);
    Some((shoulder_y - hip_y).abs() <= body.thresholds().torso_fold && hip_y < knee_y)
}

fn sitting(body: &Body<'_>) -> Option<bool> {
    let hip_tilt = vertical_gap(
        body.point(BodyLandmark::LeftHip)?,
        body.point(BodyLandmark::RightHip)?,
    );
    Some(body.hip_y()? > body.knee_y()? && hip_tilt < body.thresholds().hip_tilt_tolerance)
}

fn standing(body: &Body<'_>) -> Option<bool> {
    let at_hips = body.both(|side| {
        let gap = vertical_gap(body.point(side.wrist())?, body.point(side.hip())?);
        Some(gap < body.thresholds().wrist_hip_tolerance)
    })?;

    // Wrists tucked inside the elbows (left side has the smaller x)
    let left_inside =
        body.point(BodyLandmark::LeftElbow)?.x < body.point(BodyLandmark::LeftWrist)?.x;
    let right_inside =
        body.point(BodyLandmark::RightElbow)?.x > body.point(BodyLandmark::RightWrist)?.x;

    Some(at_hips && left_inside && right_inside)
}

fn hands_on_hips(body: &Body<'_>) -> Option<bool> {
    let (shoulder_y, hip_y, knee_y) = (body.shoulder_y()?, body.hip_y()?, body.knee_y()?);
    Some((shoulder_y - hip_y).abs() > body.thresholds().torso_fold && hip_y < knee_y)
}
