// External collaborators: landmark sources upstream, display downstream

pub mod display;
pub mod pose;
