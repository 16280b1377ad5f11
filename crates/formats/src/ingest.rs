//! GeoJSON route ingestion.
//!
//! Accepts a `FeatureCollection` whose first feature is a `LineString` and
//! turns it into a [`Route`]. Later features are ignored. Every structural
//! problem collapses into one user-facing message; the detailed reason is
//! logged and kept on the error for callers that want it.

use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::geojson::Geometry;
use crate::route::Route;

/// Shown to the user for malformed JSON or a non-LineString input.
pub const INVALID_GEOMETRY_MESSAGE: &str = "Should be a GeoJSON with LineString.";
/// Shown to the user when the file could not be read.
pub const READ_FAILURE_MESSAGE: &str = "Failed to read the file.";

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("GeoJSON parse error: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("invalid route geometry: {reason}")]
    InvalidGeometry { reason: String },
    #[error("failed to read route file: {0}")]
    Read(#[source] std::io::Error),
}

impl IngestError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// The message surfaced to end users. Never contains the underlying cause.
    pub fn user_message(&self) -> &'static str {
        match self {
            IngestError::Parse(_) | IngestError::InvalidGeometry { .. } => {
                INVALID_GEOMETRY_MESSAGE
            }
            IngestError::Read(_) => READ_FAILURE_MESSAGE,
        }
    }
}

/// Parses raw file contents into a validated route.
pub fn ingest(bytes: &[u8]) -> Result<Route, IngestError> {
    let result = serde_json::from_slice::<Value>(bytes)
        .map_err(IngestError::Parse)
        .and_then(|value| route_from_value(&value));
    match &result {
        Ok(route) => debug!(coords = route.len(), "ingested route"),
        Err(err) => warn!(error = %err, "rejected GeoJSON input"),
    }
    result
}

pub fn ingest_str(payload: &str) -> Result<Route, IngestError> {
    ingest(payload.as_bytes())
}

/// Reads everything from `reader` and ingests it.
pub fn ingest_reader<R: Read>(mut reader: R) -> Result<Route, IngestError> {
    let mut bytes = Vec::new();
    if let Err(err) = reader.read_to_end(&mut bytes) {
        warn!(error = %err, "failed to read GeoJSON input");
        return Err(IngestError::Read(err));
    }
    ingest(&bytes)
}

/// Reads and ingests a file without blocking the executor.
pub async fn read_route_file(path: impl AsRef<Path>) -> Result<Route, IngestError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|err| {
        warn!(path = %path.display(), error = %err, "failed to read GeoJSON file");
        IngestError::Read(err)
    })?;
    ingest(&bytes)
}

fn route_from_value(value: &Value) -> Result<Route, IngestError> {
    let features = value
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| IngestError::invalid("missing features array"))?;
    let first = features
        .first()
        .ok_or_else(|| IngestError::invalid("features array is empty"))?;
    let geometry = first
        .get("geometry")
        .ok_or_else(|| IngestError::invalid("first feature has no geometry"))?;

    match geometry.get("type").and_then(Value::as_str) {
        Some("LineString") => {}
        Some(other) => {
            return Err(IngestError::invalid(format!(
                "first feature is a {other}, expected LineString"
            )));
        }
        None => return Err(IngestError::invalid("first feature geometry has no type")),
    }

    let Geometry::LineString(coords) = Geometry::from_geojson_value(geometry)
        .map_err(|err| IngestError::invalid(err.to_string()))?
    else {
        return Err(IngestError::invalid("expected LineString geometry"));
    };
    Route::new(coords).map_err(|e| IngestError::invalid(e.to_string()))
}
