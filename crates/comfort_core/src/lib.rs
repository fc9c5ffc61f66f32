pub mod dashboard;
pub mod domain;
pub mod ports;
pub mod scoring;

pub use domain::{FeedbackSubmission, SensorReading, VoiceNote};
pub use ports::{FeedbackStore, ObjectStore, PortError, PortResult, SensorStore, VoiceNoteStore};
