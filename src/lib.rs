//! Reading and writing STL triangle meshes.
//!
//! Both the binary and the ASCII encodings are supported. Reading yields an
//! [`IndexedMesh`] whose coincident vertices have been merged, writing takes
//! any sequence of raw [`Triangle`]s.

pub mod bridge;
pub mod error;
pub mod stl;
pub mod trimesh;

pub use error::{Result, StlError};
pub use stl::{
    detect_format, read_stl, read_stl_file, read_stl_with, write_stl, write_stl_file, ReadOptions,
    StlFormat, WriteOptions,
};
pub use trimesh::{dedupe, IndexedMesh, Triangle, Truncation, Vertex, VertexDeduplicator};
