pub mod geojson;
pub mod ingest;
pub mod route;

pub use geojson::*;
pub use ingest::*;
pub use route::*;
