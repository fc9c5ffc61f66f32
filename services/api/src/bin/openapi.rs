//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI 3.0 specification for the sensor-ingestion API to
//! `openapi.json`, for device-firmware and integration work that wants the
//! contract without running the server.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = "openapi.json";
    std::fs::write(path, ApiDoc::openapi().to_pretty_json()?)?;
    println!("OpenAPI specification written to {}", path);
    Ok(())
}
