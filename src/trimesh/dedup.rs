use crate::trimesh::{IndexedMesh, Triangle, Vertex};
use std::collections::HashMap;

/// Bit pattern of a position. `-0.0` and `0.0` are different keys.
type PositionKey = [u32; 3];

fn position_key(v: &Vertex) -> PositionKey {
    [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()]
}

/// Collapses coincident vertex positions into shared indices.
///
/// Positions are merged only when their bits are identical, there is no
/// distance tolerance. Indices are handed out in first-seen order.
#[derive(Debug, Default)]
pub struct VertexDeduplicator {
    indices: HashMap<PositionKey, usize>,
    vertices: Vec<Vertex>,
}

impl VertexDeduplicator {
    pub fn new() -> VertexDeduplicator {
        VertexDeduplicator::default()
    }

    pub fn with_capacity(capacity: usize) -> VertexDeduplicator {
        VertexDeduplicator {
            indices: HashMap::with_capacity(capacity),
            vertices: Vec::with_capacity(capacity),
        }
    }

    /// Index of `position`, appending it if it has not been seen yet.
    pub fn insert(&mut self, position: Vertex) -> usize {
        let vertices = &mut self.vertices;
        *self
            .indices
            .entry(position_key(&position))
            .or_insert_with(|| {
                vertices.push(position);
                vertices.len() - 1
            })
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn into_vertices(self) -> Vec<Vertex> {
        self.vertices
    }
}

/// Build an indexed mesh from raw triangles, merging identical positions.
pub fn dedupe<I>(triangles: I) -> IndexedMesh
where
    I: IntoIterator<Item = Triangle>,
{
    let triangles = triangles.into_iter();
    let (lower, _) = triangles.size_hint();
    let mut dedup = VertexDeduplicator::with_capacity(lower * 3);
    let mut mesh = IndexedMesh::with_capacity(lower * 3, lower);

    for triangle in triangles {
        let mut indices = [0; 3];
        for (index, position) in indices.iter_mut().zip(triangle.vertices) {
            *index = dedup.insert(position);
            if *index == mesh.node_len() {
                mesh.add_node(position);
            }
        }
        mesh.add_triangle(indices, triangle.normal_or_zero());
    }
    mesh
}
