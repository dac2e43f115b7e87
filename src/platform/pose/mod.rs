// Pose landmark sources
// Provides the MediaPipe bridge and a replay backend for recorded landmarks

pub mod mediapipe_bridge;

pub use mediapipe_bridge::{MediaPipeBridge, MediaPipeResult, ReplayMediaPipe};
