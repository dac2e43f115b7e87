/// Example program that classifies a few hand-built poses
/// Run with: cargo run --example classify_pose

use posecam_lib::{classify, BodyLandmark, Keypoint3D, PoseFrame, PoseLabel};
use std::collections::HashMap;

fn frame(points: &[(BodyLandmark, (f32, f32))]) -> PoseFrame {
    let landmarks: HashMap<_, _> = points
        .iter()
        .map(|&(landmark, (x, y))| (landmark, Keypoint3D::xy(x, y)))
        .collect();
    PoseFrame::new(chrono::Utc::now().timestamp_millis(), landmarks)
}

fn main() {
    println!("=== Pose Classification ===\n");

    let poses = [
        (
            "arms raised straight",
            frame(&[
                (BodyLandmark::LeftShoulder, (0.4, 0.5)),
                (BodyLandmark::LeftElbow, (0.3, 0.4)),
                (BodyLandmark::LeftWrist, (0.2, 0.3)),
                (BodyLandmark::RightShoulder, (0.6, 0.5)),
                (BodyLandmark::RightElbow, (0.7, 0.4)),
                (BodyLandmark::RightWrist, (0.8, 0.3)),
            ]),
        ),
        (
            "both hands up, elbows bent",
            frame(&[
                (BodyLandmark::LeftShoulder, (0.4, 0.5)),
                (BodyLandmark::LeftElbow, (0.25, 0.5)),
                (BodyLandmark::LeftWrist, (0.25, 0.3)),
                (BodyLandmark::RightShoulder, (0.6, 0.5)),
                (BodyLandmark::RightElbow, (0.75, 0.5)),
                (BodyLandmark::RightWrist, (0.75, 0.3)),
            ]),
        ),
        (
            "one hand up",
            frame(&[
                (BodyLandmark::LeftShoulder, (0.4, 0.5)),
                (BodyLandmark::LeftElbow, (0.25, 0.5)),
                (BodyLandmark::LeftWrist, (0.25, 0.3)),
                (BodyLandmark::RightShoulder, (0.6, 0.5)),
                (BodyLandmark::RightElbow, (0.65, 0.65)),
                (BodyLandmark::RightWrist, (0.65, 0.8)),
            ]),
        ),
        ("nothing detected", PoseFrame::default()),
    ];

    for (description, pose) in &poses {
        let text = classify(pose)
            .map(|label| label.as_str())
            .unwrap_or(PoseLabel::UNKNOWN_TEXT);
        println!("  {:<28} -> {}", description, text);
    }
}
