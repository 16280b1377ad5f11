//! Progressive route reveal on a map surface.
//!
//! [`RouteAnimator`] is the synchronous state machine; [`animate`] and
//! [`spawn_animation`] drive it from a [`runtime::Ticker`] with cancellation.

pub mod animator;
pub mod config;
pub mod error;
pub mod run;
pub mod state;

pub use animator::*;
pub use config::*;
pub use error::*;
pub use run::*;
pub use state::*;
