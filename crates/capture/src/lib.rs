//! Recording the map's render stream around a route animation.
//!
//! ```text
//! start_recording ──► pre-roll ──► animate ──► on_complete ──► post-roll ──► stop
//!        │                                                                    │
//!   recorder emits ordered chunks ─────────────────────► collector ──► artifact URL
//! ```
//!
//! The host supplies a [`CaptureSource`] (its map surface) and an
//! [`ArtifactStore`]; [`record_route`] enforces the ordering above.

pub mod config;
pub mod error;
pub mod record;
pub mod recorder;
pub mod session;
pub mod store;
pub mod synthetic;

pub use config::*;
pub use error::*;
pub use record::*;
pub use recorder::*;
pub use session::*;
pub use store::*;
pub use synthetic::*;
