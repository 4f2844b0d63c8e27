use crate::trimesh::{Triangle, Vertex};

/// Records a binary file that ended before its declared triangle count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Truncation {
    /// Triangle count from the file header.
    pub declared: usize,
    /// Triangles actually decoded.
    pub decoded: usize,
}

/// Indexed Triangle Mesh.
/// Tracks triangle -> node topology over a list of unique node positions.
///
/// This is what reading an STL file produces: every position appears once in
/// `node_positions`, in the order it was first seen, and each triangle refers
/// to its corners by index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexedMesh {
    pub node_positions: Vec<Vertex>,
    pub triangle_indices: Vec<[usize; 3]>,
    /// One normal per triangle, exactly as stored in the file.
    pub face_normals: Vec<Vertex>,
    /// Set when a binary file was shorter than its header claimed.
    pub truncation: Option<Truncation>,
}

impl IndexedMesh {
    pub fn new() -> IndexedMesh {
        IndexedMesh::default()
    }

    pub fn with_capacity(node_len: usize, triangle_len: usize) -> IndexedMesh {
        IndexedMesh {
            node_positions: Vec::with_capacity(node_len),
            triangle_indices: Vec::with_capacity(triangle_len),
            face_normals: Vec::with_capacity(triangle_len),
            truncation: None,
        }
    }

    pub fn node_len(&self) -> usize {
        self.node_positions.len()
    }

    pub fn triangle_len(&self) -> usize {
        self.triangle_indices.len()
    }

    /// Append a node without checking for duplicates. Returns its index.
    pub fn add_node(&mut self, position: Vertex) -> usize {
        let result = self.node_len();
        self.node_positions.push(position);
        result
    }

    pub fn node(&self, index: usize) -> &Vertex {
        &self.node_positions[index]
    }

    /// Append a triangle. The indices must refer to existing nodes.
    pub fn add_triangle(&mut self, indices: [usize; 3], normal: Vertex) -> usize {
        debug_assert!(indices.iter().all(|&i| i < self.node_len()));
        let result = self.triangle_len();
        self.triangle_indices.push(indices);
        self.face_normals.push(normal);
        result
    }

    pub fn triangle(&self, index: usize) -> &[usize; 3] {
        &self.triangle_indices[index]
    }

    pub fn face_normal(&self, index: usize) -> &Vertex {
        &self.face_normals[index]
    }

    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }

    /// Expand back into raw triangles, e.g. to write the mesh out again.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_len()).map(move |t| {
            let &[n0, n1, n2] = self.triangle(t);
            Triangle::with_normal(
                *self.face_normal(t),
                [*self.node(n0), *self.node(n1), *self.node(n2)],
            )
        })
    }
}
