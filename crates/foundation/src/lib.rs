pub mod bounds;
pub mod coord;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use coord::*;
