pub mod cancel;
pub mod ticker;
pub mod timeline;

pub use cancel::*;
pub use ticker::*;
pub use timeline::*;
