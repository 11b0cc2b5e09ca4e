pub mod blocks;
pub mod editing;
pub mod error;
pub mod ids;
pub mod io;
pub mod options;
pub mod registry;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{editor::*, focus::*, regions::*, render::*, selection::*, store::*};
pub use error::EditorError;
pub use ids::{BlockId, SurfaceId};
pub use io::*;
pub use options::*;
pub use registry::*;
