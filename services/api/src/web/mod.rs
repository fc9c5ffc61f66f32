pub mod cache;
pub mod dashboard;
pub mod feedback;
pub mod html;
pub mod rest;
pub mod sensors;
pub mod state;
pub mod voice;

// Re-export the page handlers to make them easily accessible
// to the binary that will build the web server router.
pub use dashboard::dashboard_page;
pub use feedback::{form_page, submit_handler};
pub use rest::{ingest_reading_handler, list_readings_handler};
pub use sensors::{insert_handler, sensors_page};
pub use voice::{playback_page, recorder_page, save_handler};
