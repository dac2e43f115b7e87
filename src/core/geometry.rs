//! Geometric quantities derived from landmark positions.
//!
//! All calculations work in the image plane (x, y). Depth is too noisy
//! from a single camera to help the threshold rules.

use crate::models::pose::Keypoint3D;

const MIN_BONE_LENGTH: f32 = 1e-4;

/// Angle at `joint` formed by the segments joint→`a` and joint→`b`, in degrees.
///
/// Uses cos(θ) = (v1 · v2) / (|v1| × |v2|):
/// - 180° = segments in a straight line (arm fully extended)
/// - 90°  = right angle at the joint
///
/// Returns `None` when either segment has (near) zero length.
pub fn joint_angle(a: &Keypoint3D, joint: &Keypoint3D, b: &Keypoint3D) -> Option<f32> {
    let v1 = (a.x - joint.x, a.y - joint.y);
    let v2 = (b.x - joint.x, b.y - joint.y);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    if mag1 < MIN_BONE_LENGTH || mag2 < MIN_BONE_LENGTH {
        return None;
    }

    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    Some(cos_angle.acos().to_degrees().min(180.0))
}

/// How far `upper` sits above `lower`. Positive when `upper` is higher in
/// the image (image y grows downward).
pub fn height_above(upper: &Keypoint3D, lower: &Keypoint3D) -> f32 {
    lower.y - upper.y
}

pub fn vertical_gap(a: &Keypoint3D, b: &Keypoint3D) -> f32 {
    (a.y - b.y).abs()
}

pub fn horizontal_gap(a: &Keypoint3D, b: &Keypoint3D) -> f32 {
    (a.x - b.x).abs()
}

pub fn mean_y(a: &Keypoint3D, b: &Keypoint3D) -> f32 {
    (a.y + b.y) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Keypoint3D {
        Keypoint3D::xy(x, y)
    }

    #[test]
    fn test_straight_angle() {
        let angle = joint_angle(&p(0.0, 0.0), &p(0.5, 0.0), &p(1.0, 0.0)).unwrap();
        assert!((angle - 180.0).abs() < 1.0);
    }

    #[test]
    fn test_right_angle() {
        let angle = joint_angle(&p(0.0, 0.0), &p(0.5, 0.0), &p(0.5, 0.5)).unwrap();
        assert!((angle - 90.0).abs() < 1.0);
    }

    #[test]
    fn test_degenerate_segment() {
        assert_eq!(joint_angle(&p(0.5, 0.5), &p(0.5, 0.5), &p(0.9, 0.5)), None);
    }

    #[test]
    fn test_angle_ignores_depth() {
        let a = Keypoint3D::new(0.0, 0.0, -3.0, None);
        let b = Keypoint3D::new(1.0, 0.0, 5.0, None);
        let angle = joint_angle(&a, &p(0.5, 0.0), &b).unwrap();
        assert!((angle - 180.0).abs() < 1.0);
    }

    #[test]
    fn test_offsets() {
        let wrist = p(0.2, 0.3);
        let shoulder = p(0.4, 0.5);
        assert!((height_above(&wrist, &shoulder) - 0.2).abs() < 1e-6);
        assert!(height_above(&shoulder, &wrist) < 0.0);
        assert!((vertical_gap(&shoulder, &wrist) - 0.2).abs() < 1e-6);
        assert!((horizontal_gap(&wrist, &shoulder) - 0.2).abs() < 1e-6);
        assert!((mean_y(&wrist, &shoulder) - 0.4).abs() < 1e-6);
    }
}
