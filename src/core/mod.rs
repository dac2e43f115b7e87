pub mod config;

// Pose recognition
pub mod geometry;
pub mod pose_classifier;
pub mod annotation;
pub mod pose_tracker;
