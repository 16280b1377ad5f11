pub mod headless;
pub mod layer;
pub mod surface;
pub mod symbology;

pub use headless::*;
pub use layer::*;
pub use surface::*;
pub use symbology::*;
