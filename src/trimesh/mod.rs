pub mod dedup;
pub mod triangle;
pub mod triangle_mesh;

pub use dedup::{dedupe, VertexDeduplicator};
pub use triangle::{Triangle, Vertex};
pub use triangle_mesh::{IndexedMesh, Truncation};
