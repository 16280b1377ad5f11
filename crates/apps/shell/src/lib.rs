//! Presentation shell: owns the upload/map view state and turns user
//! commands into ingestion, animation and recording runs.

pub mod config;
pub mod error;
pub mod host;
pub mod shell;
pub mod telemetry;

pub use config::*;
pub use error::*;
pub use host::*;
pub use shell::*;
