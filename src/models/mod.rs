// Data models for body landmarks and pose labels

pub mod pose;
